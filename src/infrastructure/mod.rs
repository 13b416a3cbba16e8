// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 数据库（database）：连接池与实体映射
/// - 指标（metrics）：计数器说明
/// - 通知（notifications）：发件箱派发器
/// - 仓库实现（repositories）：领域仓库接口的 SeaORM 实现
///
/// 基础设施层依赖领域层的抽象接口，领域层不感知具体技术实现。
pub mod database;
pub mod metrics;
pub mod notifications;
pub mod repositories;
