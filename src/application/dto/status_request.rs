// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::behavior::BehaviorKey;
use crate::domain::models::status::StatusKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_behavior_name(name: &str) -> Result<(), ValidationError> {
    name.parse::<BehaviorKey>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_behavior"))
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateStatusRequest {
    pub kind: StatusKind,
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    pub severity: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub color: String,
    #[validate(length(min = 1, max = 20))]
    pub text_color: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateMachineStatusRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub color: String,
}

/// 为状态挂载行为
///
/// `target_machine_status_id` 仅用于 `sets_machine_status`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AttachBehaviorRequest {
    #[validate(custom(function = "validate_behavior_name"))]
    pub behavior: String,
    pub target_machine_status_id: Option<Uuid>,
}

impl AttachBehaviorRequest {
    pub fn key(&self) -> Option<BehaviorKey> {
        self.behavior.parse().ok()
    }
}
