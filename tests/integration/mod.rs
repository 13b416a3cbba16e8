// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 集成测试
///
/// 每个测试使用独立的内存 SQLite 数据库并执行全部迁移
pub mod concurrency_test;
pub mod downtime_test;
pub mod helpers;
pub mod inspection_test;
pub mod maintenance_test;
pub mod notification_test;
pub mod status_catalog_test;
pub mod ticket_workflow_test;
