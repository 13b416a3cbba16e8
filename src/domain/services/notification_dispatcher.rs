// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::Notification;
use async_trait::async_trait;

/// 通知派发接口
///
/// 在核心事务提交之后调用。实现负责按接收者偏好解析渠道并投递，
/// 领域服务只保证事件负载完整、派发时机正确。
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// 关闭通知时使用的空实现
#[derive(Debug, Clone, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl NotificationDispatcher for NoopDispatcher {
    async fn dispatch(&self, notification: &Notification) -> anyhow::Result<()> {
        tracing::trace!(event = %notification.event.kind(), "Notifications disabled, dropping event");
        Ok(())
    }
}

/// 依次派发通知；失败只记录日志和计数，不向调用方传播
pub async fn dispatch_all(dispatcher: &dyn NotificationDispatcher, notifications: Vec<Notification>) {
    for notification in notifications {
        if notification.recipients.is_empty() {
            tracing::debug!(event = %notification.event.kind(), "No recipients, skipping notification");
            continue;
        }
        if let Err(e) = dispatcher.dispatch(&notification).await {
            metrics::counter!("uptrack_notifications_failed_total", "event" => notification.event.kind().to_string())
                .increment(1);
            tracing::warn!(
                event = %notification.event.kind(),
                recipients = notification.recipients.len(),
                "Failed to dispatch notification: {}",
                e
            );
        }
    }
}
