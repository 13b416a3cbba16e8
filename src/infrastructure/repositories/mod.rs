// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的 SeaORM 实现
pub mod downtime_repo_impl;
pub mod inspection_repo_impl;
pub mod machine_repo_impl;
pub mod maintenance_repo_impl;
pub mod notification_repo_impl;
pub mod status_repo_impl;
pub mod tag_repo_impl;
pub mod ticket_repo_impl;
