// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 除通知仓库外，所有接口都接收调用方打开的事务，
/// 使一次用户操作中的全部写入共享同一个事务。
pub mod downtime_repository;
pub mod inspection_repository;
pub mod machine_repository;
pub mod maintenance_repository;
pub mod notification_repository;
pub mod status_repository;
pub mod tag_repository;
pub mod ticket_repository;
