// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::behavior::{Behavior, BehaviorScope};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 状态定义类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// 工单状态
    Ticket,
    /// 巡检结果状态
    InspectionOutcome,
}

impl StatusKind {
    /// 该类别的状态能否挂载给定作用域的行为
    pub fn accepts(&self, scope: BehaviorScope) -> bool {
        match (self, scope) {
            (_, BehaviorScope::Machine) => false,
            (StatusKind::Ticket, _) => true,
            (StatusKind::InspectionOutcome, BehaviorScope::Universal) => true,
            (StatusKind::InspectionOutcome, BehaviorScope::Ticket) => false,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StatusKind::Ticket => write!(f, "ticket"),
            StatusKind::InspectionOutcome => write!(f, "inspection_outcome"),
        }
    }
}

impl FromStr for StatusKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket" => Ok(StatusKind::Ticket),
            "inspection_outcome" => Ok(StatusKind::InspectionOutcome),
            _ => Err(()),
        }
    }
}

/// 状态定义
///
/// 由配置管理员维护的命名、带颜色的状态记录。工单与巡检结果共用此结构，
/// 其行为通过链接表挂载。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: Uuid,
    pub kind: StatusKind,
    pub name: String,
    /// 可选的严重等级，仅用于展示排序
    pub severity: Option<i32>,
    pub color: String,
    pub text_color: String,
    pub created_at: DateTime<FixedOffset>,
}

/// 设备粗粒度显示状态，例如 "In Service"、"Under Maintenance"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineStatus {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<FixedOffset>,
}

/// 状态定义及其已解析的行为
#[derive(Debug, Clone, PartialEq)]
pub struct StatusWithBehaviors {
    pub status: StatusDefinition,
    pub behaviors: Vec<Behavior>,
}

impl StatusWithBehaviors {
    pub fn has(&self, behavior: Behavior) -> bool {
        self.behaviors.contains(&behavior)
    }

    pub fn is_closing(&self) -> bool {
        self.has(Behavior::Closes)
    }
}
