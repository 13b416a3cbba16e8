// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateInspectionRequest {
    pub machine_id: Uuid,
    #[validate(length(min = 1, message = "an inspection needs at least one item"))]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RecordOutcomeRequest {
    pub outcome_status_id: Uuid,
}
