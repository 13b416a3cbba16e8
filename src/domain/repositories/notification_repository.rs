// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::notification::{
    Channel, DomainEvent, EventKind, NotificationPreference,
};
use crate::utils::errors::RepositoryError;

/// 通知偏好与发件箱仓库
///
/// 在核心事务提交之后使用，因此直接持有连接而不是事务
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn save_preference(
        &self,
        preference: &NotificationPreference,
    ) -> Result<(), RepositoryError>;

    /// 某用户针对某类事件的全局偏好与设备级偏好
    async fn preferences_for(
        &self,
        user_id: Uuid,
        event_kind: EventKind,
        machine_id: Uuid,
    ) -> Result<Vec<NotificationPreference>, RepositoryError>;

    async fn enqueue(
        &self,
        recipient_id: Uuid,
        channel: Channel,
        event: &DomainEvent,
    ) -> Result<(), RepositoryError>;

    /// 待发送的发件箱条目，形如 (接收人, 渠道, 事件类型)
    async fn pending(&self) -> Result<Vec<(Uuid, Channel, String)>, RepositoryError>;
}
