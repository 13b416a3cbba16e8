// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::machine::Actor;
use super::ticket::TicketPriority;

/// 领域事件
///
/// 每个事件携带完整的类型化负载；渲染由外部完成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    TicketCreated {
        ticket_id: Uuid,
        machine_id: Uuid,
        status_id: Uuid,
        priority: TicketPriority,
        inspection_item_id: Option<Uuid>,
    },
    TicketClosed {
        ticket_id: Uuid,
        machine_id: Uuid,
        old_status_id: Uuid,
        new_status_id: Uuid,
    },
    TicketEscalated {
        ticket_id: Uuid,
        machine_id: Uuid,
        old_priority: TicketPriority,
        new_priority: TicketPriority,
    },
    TicketDowngraded {
        ticket_id: Uuid,
        machine_id: Uuid,
        old_priority: TicketPriority,
        new_priority: TicketPriority,
    },
    TicketDiscarded {
        ticket_id: Uuid,
        machine_id: Uuid,
    },
    MaintenanceOverdue {
        maintenance_id: Uuid,
        machine_id: Uuid,
        title: String,
    },
    InspectionCompleted {
        inspection_id: Uuid,
        machine_id: Uuid,
    },
    InspectionFailed {
        inspection_id: Uuid,
        machine_id: Uuid,
        ticket_ids: Vec<Uuid>,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::TicketCreated { .. } => EventKind::TicketCreated,
            DomainEvent::TicketClosed { .. } => EventKind::TicketClosed,
            DomainEvent::TicketEscalated { .. } => EventKind::TicketEscalated,
            DomainEvent::TicketDowngraded { .. } => EventKind::TicketDowngraded,
            DomainEvent::TicketDiscarded { .. } => EventKind::TicketDiscarded,
            DomainEvent::MaintenanceOverdue { .. } => EventKind::MaintenanceOverdue,
            DomainEvent::InspectionCompleted { .. } => EventKind::InspectionCompleted,
            DomainEvent::InspectionFailed { .. } => EventKind::InspectionFailed,
        }
    }

    /// 事件所针对的设备，用于解析按设备设置的偏好
    pub fn machine_id(&self) -> Uuid {
        match self {
            DomainEvent::TicketCreated { machine_id, .. }
            | DomainEvent::TicketClosed { machine_id, .. }
            | DomainEvent::TicketEscalated { machine_id, .. }
            | DomainEvent::TicketDowngraded { machine_id, .. }
            | DomainEvent::TicketDiscarded { machine_id, .. }
            | DomainEvent::MaintenanceOverdue { machine_id, .. }
            | DomainEvent::InspectionCompleted { machine_id, .. }
            | DomainEvent::InspectionFailed { machine_id, .. } => *machine_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TicketCreated,
    TicketClosed,
    TicketEscalated,
    TicketDowngraded,
    TicketDiscarded,
    MaintenanceOverdue,
    InspectionCompleted,
    InspectionFailed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EventKind::TicketCreated => "ticket_created",
            EventKind::TicketClosed => "ticket_closed",
            EventKind::TicketEscalated => "ticket_escalated",
            EventKind::TicketDowngraded => "ticket_downgraded",
            EventKind::TicketDiscarded => "ticket_discarded",
            EventKind::MaintenanceOverdue => "maintenance_overdue",
            EventKind::InspectionCompleted => "inspection_completed",
            EventKind::InspectionFailed => "inspection_failed",
        };
        f.write_str(name)
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket_created" => Ok(EventKind::TicketCreated),
            "ticket_closed" => Ok(EventKind::TicketClosed),
            "ticket_escalated" => Ok(EventKind::TicketEscalated),
            "ticket_downgraded" => Ok(EventKind::TicketDowngraded),
            "ticket_discarded" => Ok(EventKind::TicketDiscarded),
            "maintenance_overdue" => Ok(EventKind::MaintenanceOverdue),
            "inspection_completed" => Ok(EventKind::InspectionCompleted),
            "inspection_failed" => Ok(EventKind::InspectionFailed),
            _ => Err(()),
        }
    }
}

/// 通知渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Chat,
    InApp,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Chat => write!(f, "chat"),
            Channel::InApp => write!(f, "in_app"),
        }
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "chat" => Ok(Channel::Chat),
            "in_app" => Ok(Channel::InApp),
            _ => Err(()),
        }
    }
}

/// 用户的渠道偏好
///
/// `machine_id` 为空时为全局偏好，否则仅针对该设备
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_kind: EventKind,
    pub machine_id: Option<Uuid>,
    pub channels: BTreeSet<Channel>,
}

/// 一次通知派发请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event: DomainEvent,
    pub actor: Actor,
    pub recipients: Vec<Uuid>,
}

impl Notification {
    /// 构造通知，接收人按首次出现顺序去重
    pub fn new(event: DomainEvent, actor: Actor, recipients: impl IntoIterator<Item = Uuid>) -> Self {
        let mut unique = Vec::new();
        for recipient in recipients {
            if !unique.contains(&recipient) {
                unique.push(recipient);
            }
        }
        Self {
            event,
            actor,
            recipients: unique,
        }
    }
}

/// 解析一个接收者的生效渠道
///
/// 同时存在全局与按设备偏好时取交集；只有其一时取其一；都没有时为空
pub fn resolve_channels(
    global: Option<&BTreeSet<Channel>>,
    scoped: Option<&BTreeSet<Channel>>,
) -> BTreeSet<Channel> {
    match (global, scoped) {
        (Some(global), Some(scoped)) => global.intersection(scoped).copied().collect(),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => BTreeSet::new(),
    }
}
