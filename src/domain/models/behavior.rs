// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 行为作用域
///
/// 决定行为可以挂载到哪一类状态定义上
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorScope {
    /// 仅工单状态
    Ticket,
    /// 仅设备状态
    Machine,
    /// 工单状态与巡检结果状态
    Universal,
}

impl fmt::Display for BehaviorScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BehaviorScope::Ticket => write!(f, "ticket"),
            BehaviorScope::Machine => write!(f, "machine"),
            BehaviorScope::Universal => write!(f, "universal"),
        }
    }
}

/// 行为目录键
///
/// 目录是封闭的；字符串形式是持久化和其他代码依赖的稳定契约，
/// 绝不能依赖数据库中的序号或 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKey {
    IsOpeningStatus,
    IsInProgressStatus,
    IsTicketClosingStatus,
    SetsMachineStatus,
    AwaitsCriticalParts,
    AwaitsNonCriticalParts,
    CreatesTicketSev1,
    CreatesTicketSev2,
    IsDefaultInServiceStatus,
    IsUnderMaintenanceStatus,
}

impl BehaviorKey {
    pub const ALL: [BehaviorKey; 10] = [
        BehaviorKey::IsOpeningStatus,
        BehaviorKey::IsInProgressStatus,
        BehaviorKey::IsTicketClosingStatus,
        BehaviorKey::SetsMachineStatus,
        BehaviorKey::AwaitsCriticalParts,
        BehaviorKey::AwaitsNonCriticalParts,
        BehaviorKey::CreatesTicketSev1,
        BehaviorKey::CreatesTicketSev2,
        BehaviorKey::IsDefaultInServiceStatus,
        BehaviorKey::IsUnderMaintenanceStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKey::IsOpeningStatus => "is_opening_status",
            BehaviorKey::IsInProgressStatus => "is_in_progress_status",
            BehaviorKey::IsTicketClosingStatus => "is_ticket_closing_status",
            BehaviorKey::SetsMachineStatus => "sets_machine_status",
            BehaviorKey::AwaitsCriticalParts => "awaits_critical_parts",
            BehaviorKey::AwaitsNonCriticalParts => "awaits_non_critical_parts",
            BehaviorKey::CreatesTicketSev1 => "creates_ticket_sev1",
            BehaviorKey::CreatesTicketSev2 => "creates_ticket_sev2",
            BehaviorKey::IsDefaultInServiceStatus => "is_default_in_service_status",
            BehaviorKey::IsUnderMaintenanceStatus => "is_under_maintenance_status",
        }
    }

    pub fn scope(&self) -> BehaviorScope {
        match self {
            BehaviorKey::IsOpeningStatus
            | BehaviorKey::IsInProgressStatus
            | BehaviorKey::IsTicketClosingStatus
            | BehaviorKey::AwaitsCriticalParts
            | BehaviorKey::AwaitsNonCriticalParts => BehaviorScope::Ticket,
            BehaviorKey::SetsMachineStatus
            | BehaviorKey::CreatesTicketSev1
            | BehaviorKey::CreatesTicketSev2 => BehaviorScope::Universal,
            BehaviorKey::IsDefaultInServiceStatus | BehaviorKey::IsUnderMaintenanceStatus => {
                BehaviorScope::Machine
            }
        }
    }

    /// 独占行为在全系统范围内最多只能挂载到一个状态上
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            BehaviorKey::IsOpeningStatus
                | BehaviorKey::IsTicketClosingStatus
                | BehaviorKey::IsDefaultInServiceStatus
                | BehaviorKey::IsUnderMaintenanceStatus
        )
    }

    pub fn requires_machine_status(&self) -> bool {
        matches!(self, BehaviorKey::SetsMachineStatus)
    }
}

impl fmt::Display for BehaviorKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BehaviorKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown behavior: {}", s))
    }
}

/// 备件紧急程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCriticality {
    Critical,
    NonCritical,
}

/// 巡检发现的严重等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// 严重：设备必须停机
    Sev1,
    Sev2,
}

/// 已解析的行为
///
/// 由链接行（行为名 + 参数）解码而来，状态迁移时对其做穷尽匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Opens,
    InProgress,
    Closes,
    SetsMachineStatus(Uuid),
    AwaitsParts(PartCriticality),
    CreatesTicket(Severity),
    DefaultInService,
    UnderMaintenance,
}

impl Behavior {
    /// 解码链接行；返回 `None` 表示带参数的行为缺少参数
    pub fn from_link(key: BehaviorKey, target_machine_status_id: Option<Uuid>) -> Option<Self> {
        let behavior = match key {
            BehaviorKey::IsOpeningStatus => Behavior::Opens,
            BehaviorKey::IsInProgressStatus => Behavior::InProgress,
            BehaviorKey::IsTicketClosingStatus => Behavior::Closes,
            BehaviorKey::SetsMachineStatus => {
                Behavior::SetsMachineStatus(target_machine_status_id?)
            }
            BehaviorKey::AwaitsCriticalParts => Behavior::AwaitsParts(PartCriticality::Critical),
            BehaviorKey::AwaitsNonCriticalParts => {
                Behavior::AwaitsParts(PartCriticality::NonCritical)
            }
            BehaviorKey::CreatesTicketSev1 => Behavior::CreatesTicket(Severity::Sev1),
            BehaviorKey::CreatesTicketSev2 => Behavior::CreatesTicket(Severity::Sev2),
            BehaviorKey::IsDefaultInServiceStatus => Behavior::DefaultInService,
            BehaviorKey::IsUnderMaintenanceStatus => Behavior::UnderMaintenance,
        };
        Some(behavior)
    }

    pub fn key(&self) -> BehaviorKey {
        match self {
            Behavior::Opens => BehaviorKey::IsOpeningStatus,
            Behavior::InProgress => BehaviorKey::IsInProgressStatus,
            Behavior::Closes => BehaviorKey::IsTicketClosingStatus,
            Behavior::SetsMachineStatus(_) => BehaviorKey::SetsMachineStatus,
            Behavior::AwaitsParts(PartCriticality::Critical) => BehaviorKey::AwaitsCriticalParts,
            Behavior::AwaitsParts(PartCriticality::NonCritical) => {
                BehaviorKey::AwaitsNonCriticalParts
            }
            Behavior::CreatesTicket(Severity::Sev1) => BehaviorKey::CreatesTicketSev1,
            Behavior::CreatesTicket(Severity::Sev2) => BehaviorKey::CreatesTicketSev2,
            Behavior::DefaultInService => BehaviorKey::IsDefaultInServiceStatus,
            Behavior::UnderMaintenance => BehaviorKey::IsUnderMaintenanceStatus,
        }
    }
}
