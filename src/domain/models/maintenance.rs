// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 计划维护
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMaintenance {
    pub id: Uuid,
    pub machine_id: Uuid,
    pub title: String,
    /// 为 true 时，维护期间设备计入预防性停机
    pub log_downtime: bool,
    pub state: MaintenanceState,
    pub assigned_to: Option<Uuid>,
    pub due_at: DateTime<FixedOffset>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

/// 维护状态
///
/// Scheduled → InProgress → Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceState {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

impl fmt::Display for MaintenanceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MaintenanceState::Scheduled => write!(f, "scheduled"),
            MaintenanceState::InProgress => write!(f, "in_progress"),
            MaintenanceState::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for MaintenanceState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MaintenanceState::Scheduled),
            "in_progress" => Ok(MaintenanceState::InProgress),
            "completed" => Ok(MaintenanceState::Completed),
            _ => Err(()),
        }
    }
}
