// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据库表对应的实体结构
/// 使用SeaORM框架进行对象关系映射
pub mod behavior;
pub mod downtime_log;
pub mod exclusive_behavior;
pub mod inspection;
pub mod inspection_item;
pub mod machine;
pub mod machine_status;
pub mod machine_tag;
pub mod notification_outbox;
pub mod notification_preference;
pub mod scheduled_maintenance;
pub mod sea_orm_active_enums;
pub mod status_behavior;
pub mod status_definition;
pub mod tag;
pub mod ticket;
pub mod ticket_update;
