// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 停机原因分类
///
/// 这是外部报表（可用率/MTBF/MTTR）依赖的稳定契约，不得随意改名。
/// 声明顺序即优先级顺序（越靠前优先级越高）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DowntimeCategory {
    Corrective,
    Preventive,
    AwaitingParts,
    Other,
}

impl fmt::Display for DowntimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DowntimeCategory::Corrective => write!(f, "Corrective"),
            DowntimeCategory::Preventive => write!(f, "Preventive"),
            DowntimeCategory::AwaitingParts => write!(f, "AwaitingParts"),
            DowntimeCategory::Other => write!(f, "Other"),
        }
    }
}

/// 停机日志
///
/// 同一设备任意时刻至多一条 `end_time` 为空的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeLog {
    pub id: Uuid,
    pub machine_id: Uuid,
    pub category: DowntimeCategory,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: Option<DateTime<FixedOffset>>,
}

impl DowntimeLog {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
