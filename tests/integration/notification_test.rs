// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use std::collections::BTreeSet;
use std::sync::Arc;
use uptrack::domain::models::machine::Actor;
use uptrack::domain::models::notification::{
    Channel, DomainEvent, EventKind, Notification, NotificationPreference,
};
use uptrack::domain::repositories::notification_repository::NotificationRepository;
use uptrack::domain::services::notification_dispatcher::NotificationDispatcher;
use uptrack::infrastructure::notifications::outbox_dispatcher::OutboxNotificationDispatcher;
use uptrack::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
use uuid::Uuid;

fn preference(
    user_id: Uuid,
    machine_id: Option<Uuid>,
    channels: &[Channel],
) -> NotificationPreference {
    NotificationPreference {
        id: Uuid::new_v4(),
        user_id,
        event_kind: EventKind::TicketClosed,
        machine_id,
        channels: channels.iter().copied().collect::<BTreeSet<_>>(),
    }
}

/// 全局与按设备偏好取交集，仅有一方时直接使用
#[tokio::test]
async fn test_outbox_resolves_channels_per_recipient() {
    let app = create_test_app().await;
    let machine = app.create_machine("Packer 1").await;
    let repo = Arc::new(NotificationRepositoryImpl::new(app.db.clone()));

    let scoped_user = Uuid::new_v4();
    let global_user = Uuid::new_v4();
    let silent_user = Uuid::new_v4();
    repo.save_preference(&preference(scoped_user, None, &[Channel::Email, Channel::InApp]))
        .await
        .unwrap();
    repo.save_preference(&preference(
        scoped_user,
        Some(machine.id),
        &[Channel::InApp, Channel::Chat],
    ))
    .await
    .unwrap();
    repo.save_preference(&preference(global_user, None, &[Channel::Email, Channel::Chat]))
        .await
        .unwrap();

    let dispatcher = OutboxNotificationDispatcher::new(repo.clone());
    let notification = Notification::new(
        DomainEvent::TicketClosed {
            ticket_id: Uuid::new_v4(),
            machine_id: machine.id,
            old_status_id: Uuid::new_v4(),
            new_status_id: Uuid::new_v4(),
        },
        Actor::User(scoped_user),
        [scoped_user, global_user, silent_user],
    );
    dispatcher.dispatch(&notification).await.unwrap();

    let mut pending = repo.pending().await.unwrap();
    pending.sort();
    let mut expected = vec![
        (scoped_user, Channel::InApp, "ticket_closed".to_string()),
        (global_user, Channel::Email, "ticket_closed".to_string()),
        (global_user, Channel::Chat, "ticket_closed".to_string()),
    ];
    expected.sort();
    assert_eq!(pending, expected);
}

/// 其他设备的偏好不影响本设备
#[tokio::test]
async fn test_other_machine_preferences_are_ignored() {
    let app = create_test_app().await;
    let machine = app.create_machine("Packer 2").await;
    let other = app.create_machine("Packer 3").await;
    let repo = Arc::new(NotificationRepositoryImpl::new(app.db.clone()));
    let user = Uuid::new_v4();

    repo.save_preference(&preference(user, Some(other.id), &[Channel::Chat]))
        .await
        .unwrap();
    let preferences = repo
        .preferences_for(user, EventKind::TicketClosed, machine.id)
        .await
        .unwrap();
    assert!(preferences.is_empty());

    let preferences = repo
        .preferences_for(user, EventKind::TicketClosed, other.id)
        .await
        .unwrap();
    assert_eq!(preferences.len(), 1);
}
