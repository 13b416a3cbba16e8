// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::{
    Channel, DomainEvent, EventKind, NotificationPreference,
};
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::infrastructure::database::entities::{notification_outbox, notification_preference};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

const OUTBOX_PENDING: &str = "pending";

/// 通知仓库实现
#[derive(Clone)]
pub struct NotificationRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl NotificationRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<notification_preference::Model> for NotificationPreference {
    type Error = RepositoryError;

    fn try_from(model: notification_preference::Model) -> Result<Self, Self::Error> {
        let event_kind = model.event_kind.parse::<EventKind>().map_err(|_| {
            RepositoryError::Corrupt(format!("unknown event kind '{}'", model.event_kind))
        })?;
        let channels: BTreeSet<Channel> = serde_json::from_value(model.channels)
            .map_err(|e| RepositoryError::Corrupt(format!("invalid channel list: {}", e)))?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            event_kind,
            machine_id: model.machine_id,
            channels,
        })
    }
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn save_preference(
        &self,
        preference: &NotificationPreference,
    ) -> Result<(), RepositoryError> {
        let channels = serde_json::to_value(&preference.channels)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        notification_preference::ActiveModel {
            id: Set(preference.id),
            user_id: Set(preference.user_id),
            event_kind: Set(preference.event_kind.to_string()),
            machine_id: Set(preference.machine_id),
            channels: Set(channels),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(())
    }

    async fn preferences_for(
        &self,
        user_id: Uuid,
        event_kind: EventKind,
        machine_id: Uuid,
    ) -> Result<Vec<NotificationPreference>, RepositoryError> {
        notification_preference::Entity::find()
            .filter(notification_preference::Column::UserId.eq(user_id))
            .filter(notification_preference::Column::EventKind.eq(event_kind.to_string()))
            .filter(
                Condition::any()
                    .add(notification_preference::Column::MachineId.is_null())
                    .add(notification_preference::Column::MachineId.eq(machine_id)),
            )
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(NotificationPreference::try_from)
            .collect()
    }

    async fn enqueue(
        &self,
        recipient_id: Uuid,
        channel: Channel,
        event: &DomainEvent,
    ) -> Result<(), RepositoryError> {
        let payload =
            serde_json::to_value(event).map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        notification_outbox::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_kind: Set(event.kind().to_string()),
            recipient_id: Set(recipient_id),
            channel: Set(channel.to_string()),
            payload: Set(payload),
            status: Set(OUTBOX_PENDING.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<(Uuid, Channel, String)>, RepositoryError> {
        notification_outbox::Entity::find()
            .filter(notification_outbox::Column::Status.eq(OUTBOX_PENDING))
            .order_by_asc(notification_outbox::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|row| {
                let channel = row.channel.parse::<Channel>().map_err(|_| {
                    RepositoryError::Corrupt(format!("unknown channel '{}'", row.channel))
                })?;
                Ok((row.recipient_id, channel, row.event_kind))
            })
            .collect()
    }
}
