// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const UNDER_MAINTENANCE: &str = "under-maintenance";
pub const OUT_OF_SERVICE: &str = "out-of-service";
pub const MAINTENANCE_OVERDUE: &str = "maintenance-overdue";
pub const MAINTENANCE_DUE: &str = "maintenance-due";
pub const AWAITING_PARTS: &str = "awaiting-parts";

/// 生命周期标签目录项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// 标签来源
///
/// 记录是哪个实体导致了标签的存在，用于安全地按来源移除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum TagSource {
    Ticket(Uuid),
    ScheduledMaintenance(Uuid),
    Manual,
}

impl TagSource {
    pub fn source_type(&self) -> &'static str {
        match self {
            TagSource::Ticket(_) => "ticket",
            TagSource::ScheduledMaintenance(_) => "scheduled_maintenance",
            TagSource::Manual => "manual",
        }
    }

    /// 手工标签以 nil uuid 存储
    pub fn source_id(&self) -> Uuid {
        match self {
            TagSource::Ticket(id) | TagSource::ScheduledMaintenance(id) => *id,
            TagSource::Manual => Uuid::nil(),
        }
    }

    pub fn from_parts(source_type: &str, source_id: Uuid) -> Option<Self> {
        match source_type {
            "ticket" => Some(TagSource::Ticket(source_id)),
            "scheduled_maintenance" => Some(TagSource::ScheduledMaintenance(source_id)),
            "manual" => Some(TagSource::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagSource::Manual => write!(f, "manual"),
            other => write!(f, "{}:{}", other.source_type(), other.source_id()),
        }
    }
}

/// 已应用到设备上的标签实例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineTag {
    pub machine_id: Uuid,
    pub tag_id: i32,
    pub tag_name: String,
    pub source: TagSource,
    pub applied_at: DateTime<FixedOffset>,
}
