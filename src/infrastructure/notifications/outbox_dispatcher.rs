// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::{resolve_channels, Notification};
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::services::notification_dispatcher::NotificationDispatcher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 发件箱派发器
///
/// 按接收者偏好解析渠道，每个 (接收者, 渠道) 写一条待发送记录；
/// 渲染与投递由外部进程完成
pub struct OutboxNotificationDispatcher {
    repo: Arc<dyn NotificationRepository>,
}

impl OutboxNotificationDispatcher {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl NotificationDispatcher for OutboxNotificationDispatcher {
    async fn dispatch(&self, notification: &Notification) -> anyhow::Result<()> {
        let kind = notification.event.kind();
        let machine_id = notification.event.machine_id();

        for recipient in &notification.recipients {
            let preferences = self.repo.preferences_for(*recipient, kind, machine_id).await?;
            let global = preferences.iter().find(|p| p.machine_id.is_none());
            let scoped = preferences.iter().find(|p| p.machine_id == Some(machine_id));
            let channels = resolve_channels(
                global.map(|p| &p.channels),
                scoped.map(|p| &p.channels),
            );

            if channels.is_empty() {
                debug!(recipient = %recipient, event = %kind, "No channels resolved for recipient");
                continue;
            }
            for channel in channels {
                self.repo.enqueue(*recipient, channel, &notification.event).await?;
            }
        }
        Ok(())
    }
}
