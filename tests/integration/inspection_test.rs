// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{attach, create_test_app};
use uptrack::application::dto::inspection_request::{CreateInspectionRequest, RecordOutcomeRequest};
use uptrack::domain::models::downtime::DowntimeCategory;
use uptrack::domain::models::machine::Actor;
use uptrack::domain::models::notification::{DomainEvent, EventKind};
use uptrack::domain::models::tag::{TagSource, OUT_OF_SERVICE};
use uptrack::domain::models::ticket::TicketPriority;
use uptrack::utils::errors::ServiceError;

fn outcome(status_id: uuid::Uuid) -> RecordOutcomeRequest {
    RecordOutcomeRequest {
        outcome_status_id: status_id,
    }
}

/// 严重发现自动开高优先级工单并使设备停机
#[tokio::test]
async fn test_sev1_finding_opens_ticket_and_downtime() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Conveyor 1").await;

    let (inspection, items) = app
        .services
        .inspections
        .create(
            CreateInspectionRequest {
                machine_id: machine.id,
                items: vec!["Belt tension".to_string(), "Guard rails".to_string()],
            },
            app.actor(),
        )
        .await
        .unwrap();
    assert_eq!(items.len(), 2);

    let item = app
        .services
        .inspections
        .record_outcome(items[0].id, outcome(catalog.fail_sev1.id), app.actor())
        .await
        .unwrap();
    let ticket_id = item.ticket_id.expect("finding opened a ticket");

    let ticket = app.services.transitions.find_ticket(ticket_id).await.unwrap();
    assert_eq!(ticket.priority, TicketPriority::High);
    assert_eq!(ticket.status_id, catalog.open.id);
    assert_eq!(ticket.inspection_item_id, Some(item.id));
    assert!(ticket.description.contains("Belt tension"));
    assert_eq!(
        app.tags(machine.id).await,
        vec![(OUT_OF_SERVICE.to_string(), TagSource::Ticket(ticket_id))]
    );
    let open = app.open_logs(machine.id).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].category, DowntimeCategory::Corrective);

    // 同一检查项不会重复开单
    let again = app
        .services
        .inspections
        .record_outcome(items[0].id, outcome(catalog.fail_sev1.id), app.actor())
        .await
        .unwrap();
    assert_eq!(again.ticket_id, Some(ticket_id));

    app.services
        .inspections
        .record_outcome(items[1].id, outcome(catalog.pass.id), app.actor())
        .await
        .unwrap();
    let completed = app
        .services
        .inspections
        .complete(inspection.id, app.actor())
        .await
        .unwrap();
    assert!(completed.completed_at.is_some());

    assert_eq!(
        app.dispatcher.kinds(),
        vec![EventKind::TicketCreated, EventKind::InspectionFailed]
    );
    let sent = app.dispatcher.sent();
    assert_eq!(
        sent[1].event,
        DomainEvent::InspectionFailed {
            inspection_id: inspection.id,
            machine_id: machine.id,
            ticket_ids: vec![ticket_id],
        }
    );
}

#[tokio::test]
async fn test_sev2_finding_keeps_machine_running() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Conveyor 2").await;
    let (_, items) = app
        .services
        .inspections
        .create(
            CreateInspectionRequest {
                machine_id: machine.id,
                items: vec!["Lubrication".to_string()],
            },
            app.actor(),
        )
        .await
        .unwrap();

    let item = app
        .services
        .inspections
        .record_outcome(items[0].id, outcome(catalog.fail_sev2.id), app.actor())
        .await
        .unwrap();
    let ticket = app
        .services
        .transitions
        .find_ticket(item.ticket_id.expect("ticket"))
        .await
        .unwrap();

    assert_eq!(ticket.priority, TicketPriority::Medium);
    assert!(app.tags(machine.id).await.is_empty());
    assert!(app.history(machine.id).await.is_empty());
}

#[tokio::test]
async fn test_outcome_can_set_machine_status() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    attach(
        &app.services,
        catalog.pass.id,
        "sets_machine_status",
        Some(catalog.under_maintenance.id),
    )
    .await;
    let machine = app.create_machine("Conveyor 3").await;
    let (inspection, items) = app
        .services
        .inspections
        .create(
            CreateInspectionRequest {
                machine_id: machine.id,
                items: vec!["Emergency stop".to_string()],
            },
            app.actor(),
        )
        .await
        .unwrap();

    app.services
        .inspections
        .record_outcome(items[0].id, outcome(catalog.pass.id), app.actor())
        .await
        .unwrap();
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.under_maintenance.id)
    );

    app.services
        .inspections
        .complete(inspection.id, app.actor())
        .await
        .unwrap();
    assert_eq!(app.dispatcher.kinds(), vec![EventKind::InspectionCompleted]);
}

#[tokio::test]
async fn test_outcome_validation() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Conveyor 4").await;

    let err = app
        .services
        .inspections
        .create(
            CreateInspectionRequest {
                machine_id: machine.id,
                items: vec![],
            },
            app.actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    let err = app
        .services
        .inspections
        .create(
            CreateInspectionRequest {
                machine_id: machine.id,
                items: vec!["Noise".to_string()],
            },
            Actor::System,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    let (inspection, items) = app
        .services
        .inspections
        .create(
            CreateInspectionRequest {
                machine_id: machine.id,
                items: vec!["Noise".to_string()],
            },
            app.actor(),
        )
        .await
        .unwrap();

    // 工单状态不能作为巡检结果
    let err = app
        .services
        .inspections
        .record_outcome(items[0].id, outcome(catalog.closed.id), app.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    app.services
        .inspections
        .complete(inspection.id, app.actor())
        .await
        .unwrap();
    let err = app
        .services
        .inspections
        .record_outcome(items[0].id, outcome(catalog.pass.id), app.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));
}
