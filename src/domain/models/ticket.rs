// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::behavior::Severity;
use super::machine::Actor;

/// 工单实体
///
/// 工单以"开启"状态创建，之后只能经由状态迁移服务修改状态，
/// 以保证行为求值不会被绕过。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub machine_id: Uuid,
    pub status_id: Uuid,
    pub priority: TicketPriority,
    pub description: String,
    pub created_by: Uuid,
    /// 由巡检发现触发创建时关联的巡检项
    pub inspection_item_id: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 工单优先级 (0..2)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl TicketPriority {
    pub fn as_i16(&self) -> i16 {
        match self {
            TicketPriority::Low => 0,
            TicketPriority::Medium => 1,
            TicketPriority::High => 2,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(TicketPriority::Low),
            1 => Some(TicketPriority::Medium),
            2 => Some(TicketPriority::High),
            _ => None,
        }
    }
}

impl From<Severity> for TicketPriority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Sev1 => TicketPriority::High,
            Severity::Sev2 => TicketPriority::Medium,
        }
    }
}

/// 时间线条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketUpdateKind {
    Created,
    StatusChange,
    PriorityChange,
    Comment,
    Attachment,
    /// 系统产生的记录，例如设备状态被行为修改
    System,
}

impl fmt::Display for TicketUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TicketUpdateKind::Created => write!(f, "created"),
            TicketUpdateKind::StatusChange => write!(f, "status_change"),
            TicketUpdateKind::PriorityChange => write!(f, "priority_change"),
            TicketUpdateKind::Comment => write!(f, "comment"),
            TicketUpdateKind::Attachment => write!(f, "attachment"),
            TicketUpdateKind::System => write!(f, "system"),
        }
    }
}

impl FromStr for TicketUpdateKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(TicketUpdateKind::Created),
            "status_change" => Ok(TicketUpdateKind::StatusChange),
            "priority_change" => Ok(TicketUpdateKind::PriorityChange),
            "comment" => Ok(TicketUpdateKind::Comment),
            "attachment" => Ok(TicketUpdateKind::Attachment),
            "system" => Ok(TicketUpdateKind::System),
            _ => Err(()),
        }
    }
}

/// 工单时间线条目
///
/// 只追加；除随工单级联删除外从不修改或删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub kind: TicketUpdateKind,
    pub author: Actor,
    pub old_status_id: Option<Uuid>,
    pub new_status_id: Option<Uuid>,
    pub old_priority: Option<TicketPriority>,
    pub new_priority: Option<TicketPriority>,
    pub comment: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl TicketUpdate {
    pub fn new(ticket_id: Uuid, kind: TicketUpdateKind, author: Actor) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            kind,
            author,
            old_status_id: None,
            new_status_id: None,
            old_priority: None,
            new_priority: None,
            comment: None,
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }

    pub fn with_status(mut self, old: Option<Uuid>, new: Option<Uuid>) -> Self {
        self.old_status_id = old;
        self.new_status_id = new;
        self
    }

    pub fn with_priority(mut self, old: TicketPriority, new: TicketPriority) -> Self {
        self.old_priority = Some(old);
        self.new_priority = Some(new);
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.trim().is_empty());
        self
    }
}
