// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：行为目录、状态、工单、标签、停机日志等
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：状态迁移、停机协调和通知派发
pub mod models;
pub mod repositories;
pub mod services;
