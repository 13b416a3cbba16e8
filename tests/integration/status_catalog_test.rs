// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use uptrack::application::dto::status_request::{
    AttachBehaviorRequest, CreateMachineStatusRequest, CreateStatusRequest,
};
use uptrack::application::dto::ticket_request::ChangeStatusRequest;
use uptrack::domain::models::behavior::{Behavior, BehaviorKey};
use uptrack::domain::models::status::StatusKind;
use uptrack::domain::models::tag::{TagSource, OUT_OF_SERVICE};
use uptrack::utils::errors::ServiceError;

fn ticket_status(name: &str) -> CreateStatusRequest {
    CreateStatusRequest {
        kind: StatusKind::Ticket,
        name: name.to_string(),
        severity: Some(2),
        color: "#f0ad4e".to_string(),
        text_color: "#000000".to_string(),
    }
}

fn behavior(name: &str, target: Option<uuid::Uuid>) -> AttachBehaviorRequest {
    AttachBehaviorRequest {
        behavior: name.to_string(),
        target_machine_status_id: target,
    }
}

/// 独占行为移交给新状态后，旧持有者不再具有该行为
#[tokio::test]
async fn test_exclusive_behavior_moves_to_new_holder() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let resolved = app
        .services
        .catalog
        .create_status(ticket_status("Resolved"))
        .await
        .unwrap();

    app.services
        .catalog
        .attach_behavior(resolved.id, behavior("is_ticket_closing_status", None))
        .await
        .unwrap();

    let closed = app.services.catalog.behaviors_of(catalog.closed.id).await.unwrap();
    assert!(!closed.is_closing());
    let resolved = app.services.catalog.behaviors_of(resolved.id).await.unwrap();
    assert!(resolved.is_closing());

    // 新的关闭状态生效
    let machine = app.create_machine("Mixer 1").await;
    let ticket = app.open_ticket(machine.id, true).await;
    app.services
        .transitions
        .change_status(
            ticket.id,
            ChangeStatusRequest {
                new_status_id: resolved.status.id,
                comment: None,
            },
            app.actor(),
        )
        .await
        .unwrap();
    assert!(app.tags(machine.id).await.is_empty());
}

#[tokio::test]
async fn test_scope_and_parameter_rules() {
    let app = create_test_app().await;
    let catalog = app.catalog();

    let cases = [
        (catalog.open.id, behavior("is_default_in_service_status", None)),
        (catalog.pass.id, behavior("is_opening_status", None)),
        (catalog.in_progress.id, behavior("sets_machine_status", None)),
        (
            catalog.closed.id,
            behavior("is_in_progress_status", Some(catalog.down.id)),
        ),
        (catalog.open.id, behavior("closes_everything", None)),
    ];
    for (status_id, request) in cases {
        let name = request.behavior.clone();
        let err = app
            .services
            .catalog
            .attach_behavior(status_id, request)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::Validation { .. }),
            "{} should be rejected, got {:?}",
            name,
            err
        );
    }
}

#[tokio::test]
async fn test_attach_is_idempotent_and_detach_reports() {
    let app = create_test_app().await;
    let catalog = app.catalog();

    app.services
        .catalog
        .attach_behavior(catalog.in_progress.id, behavior("awaits_critical_parts", None))
        .await
        .unwrap();
    app.services
        .catalog
        .attach_behavior(catalog.in_progress.id, behavior("awaits_critical_parts", None))
        .await
        .unwrap();

    let status = app
        .services
        .catalog
        .behaviors_of(catalog.in_progress.id)
        .await
        .unwrap();
    let parts = status
        .behaviors
        .iter()
        .filter(|b| matches!(b, Behavior::AwaitsParts(_)))
        .count();
    assert_eq!(parts, 1);
    assert!(status.has(Behavior::SetsMachineStatus(catalog.down.id)));

    assert!(app
        .services
        .catalog
        .detach_behavior(catalog.in_progress.id, BehaviorKey::AwaitsCriticalParts)
        .await
        .unwrap());
    assert!(!app
        .services
        .catalog
        .detach_behavior(catalog.in_progress.id, BehaviorKey::AwaitsCriticalParts)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_duplicate_names_are_rejected() {
    let app = create_test_app().await;
    let err = app
        .services
        .catalog
        .create_status(ticket_status("open"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "name"));

    let statuses = app.services.catalog.list_statuses(StatusKind::Ticket).await.unwrap();
    assert_eq!(statuses.len(), 3);

    let err = app
        .services
        .catalog
        .create_machine_status(CreateMachineStatusRequest {
            name: " in service ".to_string(),
            color: "#5cb85c".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "name"));
}

/// 删除状态时工单与独占行为都改指向替代状态
#[tokio::test]
async fn test_delete_status_reassigns_references() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Mixer 2").await;
    let ticket = app.open_ticket(machine.id, false).await;
    let new = app
        .services
        .catalog
        .create_status(ticket_status("New"))
        .await
        .unwrap();

    let err = app
        .services
        .catalog
        .delete_status(catalog.open.id, catalog.pass.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    let moved = app
        .services
        .catalog
        .delete_status(catalog.open.id, new.id)
        .await
        .unwrap();
    assert!(moved >= 2);

    let ticket = app.services.transitions.find_ticket(ticket.id).await.unwrap();
    assert_eq!(ticket.status_id, new.id);
    let new = app.services.catalog.behaviors_of(new.id).await.unwrap();
    assert!(new.has(Behavior::Opens));

    let err = app.services.catalog.behaviors_of(catalog.open.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    let second = app.open_ticket(machine.id, false).await;
    assert_eq!(second.status_id, new.status.id);
}

#[tokio::test]
async fn test_delete_machine_status_reassigns_machines_and_targets() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Mixer 3").await;
    let ticket = app.open_ticket(machine.id, false).await;
    app.services
        .transitions
        .change_status(
            ticket.id,
            ChangeStatusRequest {
                new_status_id: catalog.in_progress.id,
                comment: None,
            },
            app.actor(),
        )
        .await
        .unwrap();

    app.services
        .catalog
        .delete_machine_status(catalog.down.id, catalog.under_maintenance.id)
        .await
        .unwrap();

    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.under_maintenance.id)
    );
    let in_progress = app
        .services
        .catalog
        .behaviors_of(catalog.in_progress.id)
        .await
        .unwrap();
    assert!(in_progress.has(Behavior::SetsMachineStatus(catalog.under_maintenance.id)));
}

/// 不能通过删除状态把工单改指向关闭状态，否则会绕过关闭时的标签与停机处理
#[tokio::test]
async fn test_delete_status_refuses_closing_replacement() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Mixer 4").await;
    let ticket = app.open_ticket(machine.id, true).await;
    app.services
        .transitions
        .change_status(
            ticket.id,
            ChangeStatusRequest {
                new_status_id: catalog.in_progress.id,
                comment: None,
            },
            app.actor(),
        )
        .await
        .unwrap();

    let err = app
        .services
        .catalog
        .delete_status(catalog.in_progress.id, catalog.closed.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "replacement_id"));

    let ticket = app.services.transitions.find_ticket(ticket.id).await.unwrap();
    assert_eq!(ticket.status_id, catalog.in_progress.id);
    assert!(app
        .services
        .catalog
        .behaviors_of(catalog.in_progress.id)
        .await
        .is_ok());
    assert_eq!(
        app.tags(machine.id).await,
        vec![(OUT_OF_SERVICE.to_string(), TagSource::Ticket(ticket.id))]
    );
    assert_eq!(app.open_logs(machine.id).await.len(), 1);

    // 关闭状态本身可以被替换，独占行为随之移交
    let done = app
        .services
        .catalog
        .create_status(ticket_status("Done"))
        .await
        .unwrap();
    app.services
        .catalog
        .delete_status(catalog.closed.id, done.id)
        .await
        .unwrap();
    assert!(app.services.catalog.behaviors_of(done.id).await.unwrap().is_closing());
}
