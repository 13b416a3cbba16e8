// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 行为（behavior）：挂载在状态定义上的封闭能力目录
/// - 状态（status）：工单/巡检结果状态定义与设备状态
/// - 设备（machine）与工单（ticket）及其时间线
/// - 标签（tag）：带来源的生命周期标记
/// - 停机（downtime）：按原因分类的停机区间
/// - 计划维护（maintenance）与巡检（inspection）
/// - 通知（notification）：领域事件与渠道偏好
pub mod behavior;
pub mod downtime;
pub mod inspection;
pub mod machine;
pub mod maintenance;
pub mod notification;
pub mod status;
pub mod tag;
pub mod ticket;
