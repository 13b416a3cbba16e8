// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 开单请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct OpenTicketRequest {
    pub machine_id: Uuid,
    /// 0 = 低, 1 = 中, 2 = 高
    #[validate(range(min = 0, max = 2, message = "priority must be between 0 and 2"))]
    pub priority: i16,
    #[validate(length(min = 1, max = 4000, message = "description must be 1-4000 characters"))]
    pub description: String,
    /// 设备是否已停机；为 true 时施加来自该工单的 out-of-service 标签
    #[serde(default)]
    pub machine_down: bool,
    /// 由巡检发现创建时关联的巡检项
    #[serde(default)]
    pub inspection_item_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ChangeStatusRequest {
    pub new_status_id: Uuid,
    #[validate(length(max = 4000, message = "comment must be at most 4000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ChangePriorityRequest {
    #[validate(range(min = 0, max = 2, message = "priority must be between 0 and 2"))]
    pub priority: i16,
    #[validate(length(max = 4000, message = "comment must be at most 4000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, max = 4000, message = "comment must be 1-4000 characters"))]
    pub comment: String,
}
