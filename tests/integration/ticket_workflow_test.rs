// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_bare_app, create_test_app};
use uptrack::application::dto::ticket_request::{
    AddCommentRequest, ChangePriorityRequest, ChangeStatusRequest, OpenTicketRequest,
};
use uptrack::domain::models::downtime::DowntimeCategory;
use uptrack::domain::models::machine::Actor;
use uptrack::domain::models::notification::{DomainEvent, EventKind};
use uptrack::domain::models::tag::{TagSource, OUT_OF_SERVICE};
use uptrack::domain::models::ticket::{TicketPriority, TicketUpdateKind};
use uptrack::utils::errors::ServiceError;
use uuid::Uuid;

fn move_to(status_id: Uuid) -> ChangeStatusRequest {
    ChangeStatusRequest {
        new_status_id: status_id,
        comment: None,
    }
}

/// 开单停机、处理中切换设备状态、关闭后恢复在役并关闭停机日志
#[tokio::test]
async fn test_ticket_round_trip() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("CNC 1").await;

    let ticket = app.open_ticket(machine.id, true).await;
    assert_eq!(ticket.status_id, catalog.open.id);
    assert_eq!(ticket.created_by, app.user);
    assert_eq!(
        app.tags(machine.id).await,
        vec![(OUT_OF_SERVICE.to_string(), TagSource::Ticket(ticket.id))]
    );
    let open = app.open_logs(machine.id).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].category, DowntimeCategory::Corrective);

    app.services
        .transitions
        .change_status(ticket.id, move_to(catalog.in_progress.id), app.actor())
        .await
        .unwrap();
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.down.id)
    );

    let update = app
        .services
        .transitions
        .change_status(
            ticket.id,
            ChangeStatusRequest {
                new_status_id: catalog.closed.id,
                comment: Some("Replaced bearing".to_string()),
            },
            app.actor(),
        )
        .await
        .unwrap();
    assert_eq!(update.old_status_id, Some(catalog.in_progress.id));
    assert_eq!(update.new_status_id, Some(catalog.closed.id));
    assert_eq!(update.comment.as_deref(), Some("Replaced bearing"));

    assert!(app.tags(machine.id).await.is_empty());
    assert!(app.open_logs(machine.id).await.is_empty());
    assert_eq!(app.history(machine.id).await.len(), 1);
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.in_service.id)
    );

    let timeline = app.services.transitions.timeline(ticket.id).await.unwrap();
    let kinds: Vec<_> = timeline.iter().map(|u| u.kind).collect();
    assert_eq!(kinds[0], TicketUpdateKind::Created);
    assert_eq!(
        kinds.iter().filter(|k| **k == TicketUpdateKind::StatusChange).count(),
        2
    );
    // 切到 Down 与恢复在役各一条系统记录
    let system: Vec<_> = timeline
        .iter()
        .filter(|u| u.kind == TicketUpdateKind::System)
        .collect();
    assert_eq!(system.len(), 2);
    assert!(system.iter().all(|u| u.author == Actor::System));

    assert_eq!(
        app.dispatcher.kinds(),
        vec![EventKind::TicketCreated, EventKind::TicketClosed]
    );
}

#[tokio::test]
async fn test_machine_stays_down_while_other_tickets_open() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("CNC 2").await;

    let first = app.open_ticket(machine.id, true).await;
    let second = app.open_ticket(machine.id, true).await;
    app.services
        .transitions
        .change_status(first.id, move_to(catalog.in_progress.id), app.actor())
        .await
        .unwrap();

    app.services
        .transitions
        .change_status(first.id, move_to(catalog.closed.id), app.actor())
        .await
        .unwrap();

    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.down.id)
    );
    assert_eq!(
        app.tags(machine.id).await,
        vec![(OUT_OF_SERVICE.to_string(), TagSource::Ticket(second.id))]
    );
    assert_eq!(app.open_logs(machine.id).await.len(), 1);

    // 另一张工单上记录了设备状态变化
    let timeline = app.services.transitions.timeline(second.id).await.unwrap();
    assert!(timeline.iter().any(|u| u.kind == TicketUpdateKind::System));
}

#[tokio::test]
async fn test_change_status_rejects_invalid_targets() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("CNC 3").await;
    let ticket = app.open_ticket(machine.id, false).await;

    let same = app
        .services
        .transitions
        .change_status(ticket.id, move_to(catalog.open.id), app.actor())
        .await
        .unwrap_err();
    assert!(matches!(same, ServiceError::Validation { .. }));

    let outcome = app
        .services
        .transitions
        .change_status(ticket.id, move_to(catalog.pass.id), app.actor())
        .await
        .unwrap_err();
    assert!(matches!(outcome, ServiceError::Validation { .. }));

    let unknown = app
        .services
        .transitions
        .change_status(Uuid::new_v4(), move_to(catalog.closed.id), app.actor())
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound { .. }));

    let timeline = app.services.transitions.timeline(ticket.id).await.unwrap();
    assert_eq!(timeline.len(), 1);
}

#[tokio::test]
async fn test_priority_changes_dispatch_direction() {
    let app = create_test_app().await;
    let machine = app.create_machine("CNC 4").await;
    let ticket = app.open_ticket(machine.id, false).await;

    let escalate = ChangePriorityRequest {
        priority: 2,
        comment: None,
    };
    let update = app
        .services
        .transitions
        .change_priority(ticket.id, escalate, app.actor())
        .await
        .unwrap();
    assert_eq!(update.old_priority, Some(TicketPriority::Low));
    assert_eq!(update.new_priority, Some(TicketPriority::High));

    let downgrade = ChangePriorityRequest {
        priority: 1,
        comment: Some("Workaround in place".to_string()),
    };
    app.services
        .transitions
        .change_priority(ticket.id, downgrade, app.actor())
        .await
        .unwrap();

    let unchanged = ChangePriorityRequest {
        priority: 1,
        comment: None,
    };
    let err = app
        .services
        .transitions
        .change_priority(ticket.id, unchanged, app.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    assert_eq!(
        app.dispatcher.kinds(),
        vec![
            EventKind::TicketCreated,
            EventKind::TicketEscalated,
            EventKind::TicketDowngraded
        ]
    );
    let ticket = app.services.transitions.find_ticket(ticket.id).await.unwrap();
    assert_eq!(ticket.priority, TicketPriority::Medium);
}

#[tokio::test]
async fn test_discard_restores_machine_and_removes_ticket() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("CNC 5").await;
    let ticket = app.open_ticket(machine.id, true).await;
    app.services
        .transitions
        .change_status(ticket.id, move_to(catalog.in_progress.id), app.actor())
        .await
        .unwrap();

    app.services
        .transitions
        .discard_ticket(ticket.id, app.actor())
        .await
        .unwrap();

    assert!(app.tags(machine.id).await.is_empty());
    assert!(app.open_logs(machine.id).await.is_empty());
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.in_service.id)
    );
    let err = app.services.transitions.find_ticket(ticket.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    let sent = app.dispatcher.sent();
    let last = sent.last().expect("discard notification");
    assert_eq!(
        last.event,
        DomainEvent::TicketDiscarded {
            ticket_id: ticket.id,
            machine_id: machine.id,
        }
    );
}

#[tokio::test]
async fn test_comments_are_appended_to_timeline() {
    let app = create_test_app().await;
    let machine = app.create_machine("CNC 6").await;
    let ticket = app.open_ticket(machine.id, false).await;

    let blank = app
        .services
        .transitions
        .add_comment(
            ticket.id,
            AddCommentRequest {
                comment: "   ".to_string(),
            },
            app.actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(blank, ServiceError::Validation { .. }));

    app.services
        .transitions
        .add_comment(
            ticket.id,
            AddCommentRequest {
                comment: "Ordered new belt".to_string(),
            },
            app.actor(),
        )
        .await
        .unwrap();

    let timeline = app.services.transitions.timeline(ticket.id).await.unwrap();
    let comment = timeline
        .iter()
        .find(|u| u.kind == TicketUpdateKind::Comment)
        .expect("comment entry");
    assert_eq!(comment.comment.as_deref(), Some("Ordered new belt"));
    assert_eq!(comment.author, app.actor());
}

/// 缺少开启状态配置时整个操作中止，不留下任何部分修改
#[tokio::test]
async fn test_missing_opening_status_aborts_without_side_effects() {
    let app = create_bare_app().await;
    let machine = app.create_machine("Unconfigured").await;

    let err = app
        .services
        .transitions
        .open_ticket(
            OpenTicketRequest {
                machine_id: machine.id,
                priority: 1,
                description: "Leaking coolant".to_string(),
                machine_down: true,
                inspection_item_id: None,
            },
            app.actor(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Configuration(_)));
    assert!(err.to_string().contains("is_opening_status"));
    assert!(app.tags(machine.id).await.is_empty());
    assert!(app.history(machine.id).await.is_empty());
    assert!(app.dispatcher.kinds().is_empty());
}

#[tokio::test]
async fn test_open_ticket_validates_request() {
    let app = create_test_app().await;
    let machine = app.create_machine("CNC 7").await;

    let err = app
        .services
        .transitions
        .open_ticket(
            OpenTicketRequest {
                machine_id: machine.id,
                priority: 7,
                description: "Out of range".to_string(),
                machine_down: false,
                inspection_item_id: None,
            },
            app.actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "priority"));

    let err = app
        .services
        .transitions
        .open_ticket(
            OpenTicketRequest {
                machine_id: Uuid::new_v4(),
                priority: 0,
                description: "Ghost machine".to_string(),
                machine_down: false,
                inspection_item_id: None,
            },
            app.actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}
