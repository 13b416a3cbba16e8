// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ScheduleMaintenanceRequest {
    pub machine_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub due_at: DateTime<FixedOffset>,
    /// 维护期间是否计入预防性停机
    #[serde(default)]
    pub log_downtime: bool,
    pub assigned_to: Option<Uuid>,
}
