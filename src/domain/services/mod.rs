// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 状态目录（status_catalog）：行为注册表与状态定义
/// - 状态迁移（status_transition）：工单状态变更及行为副作用
/// - 标签管理（tag_manager）：按来源幂等施加、移除设备标签
/// - 停机协调（downtime_resolver）：由标签推导停机日志
/// - 设备状态（machine_state）：设备显示状态的唯一写入口
/// - 计划维护（maintenance_service）与巡检（inspection_service）
/// - 通知派发接口（notification_dispatcher）
pub mod downtime_resolver;
pub mod inspection_service;
pub mod machine_state;
pub mod maintenance_service;
pub mod notification_dispatcher;
pub mod status_catalog;
pub mod status_transition;
pub mod tag_manager;
