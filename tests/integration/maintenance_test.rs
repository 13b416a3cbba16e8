// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{at, create_test_app, TestApp};
use uptrack::application::dto::maintenance_request::ScheduleMaintenanceRequest;
use uptrack::application::dto::ticket_request::ChangeStatusRequest;
use uptrack::domain::models::downtime::DowntimeCategory;
use uptrack::domain::models::maintenance::{MaintenanceState, ScheduledMaintenance};
use uptrack::domain::models::notification::{DomainEvent, EventKind};
use uptrack::domain::models::tag::{
    TagSource, MAINTENANCE_DUE, MAINTENANCE_OVERDUE, OUT_OF_SERVICE, UNDER_MAINTENANCE,
};
use uptrack::utils::errors::ServiceError;
use uuid::Uuid;

async fn schedule(
    app: &TestApp,
    machine_id: Uuid,
    log_downtime: bool,
    assigned_to: Option<Uuid>,
) -> ScheduledMaintenance {
    app.services
        .maintenance
        .schedule(ScheduleMaintenanceRequest {
            machine_id,
            title: "Quarterly lubrication".to_string(),
            due_at: at(12, 0),
            log_downtime,
            assigned_to,
        })
        .await
        .unwrap()
}

/// 提交一项维护后，仍在进行的另一项维护的 under-maintenance 标签保留
#[tokio::test]
async fn test_submit_keeps_tags_of_other_maintenance() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Boiler 1").await;
    let first = schedule(&app, machine.id, true, None).await;
    let second = schedule(&app, machine.id, false, None).await;

    let started = app
        .services
        .maintenance
        .start(first.id, app.actor())
        .await
        .unwrap();
    assert_eq!(started.state, MaintenanceState::InProgress);
    assert!(started.started_at.is_some());
    app.services
        .maintenance
        .start(second.id, app.actor())
        .await
        .unwrap();

    let tags = app.tags(machine.id).await;
    assert!(tags.contains(&(
        OUT_OF_SERVICE.to_string(),
        TagSource::ScheduledMaintenance(first.id)
    )));
    assert!(tags.contains(&(
        UNDER_MAINTENANCE.to_string(),
        TagSource::ScheduledMaintenance(second.id)
    )));
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.under_maintenance.id)
    );
    let open = app.open_logs(machine.id).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].category, DowntimeCategory::Preventive);

    let submitted = app
        .services
        .maintenance
        .submit(first.id, app.actor())
        .await
        .unwrap();
    assert_eq!(submitted.state, MaintenanceState::Completed);

    assert_eq!(
        app.tags(machine.id).await,
        vec![(
            UNDER_MAINTENANCE.to_string(),
            TagSource::ScheduledMaintenance(second.id)
        )]
    );
    assert!(app.open_logs(machine.id).await.is_empty());
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.in_service.id)
    );
}

#[tokio::test]
async fn test_maintenance_without_downtime_keeps_machine_running() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Boiler 2").await;
    let maintenance = schedule(&app, machine.id, false, None).await;

    app.services
        .maintenance
        .start(maintenance.id, app.actor())
        .await
        .unwrap();

    assert!(app.history(machine.id).await.is_empty());
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.in_service.id)
    );
}

#[tokio::test]
async fn test_state_machine_rejects_out_of_order_steps() {
    let app = create_test_app().await;
    let machine = app.create_machine("Boiler 3").await;
    let maintenance = schedule(&app, machine.id, true, None).await;

    let err = app
        .services
        .maintenance
        .submit(maintenance.id, app.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    app.services
        .maintenance
        .start(maintenance.id, app.actor())
        .await
        .unwrap();
    let err = app
        .services
        .maintenance
        .start(maintenance.id, app.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));

    app.services
        .maintenance
        .submit(maintenance.id, app.actor())
        .await
        .unwrap();
    let err = app
        .services
        .maintenance
        .mark_overdue(maintenance.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));
}

/// 纠正性停机优先于预防性停机，工单关闭后回到预防性停机
#[tokio::test]
async fn test_corrective_downtime_preempts_preventive() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Boiler 4").await;
    let maintenance = schedule(&app, machine.id, true, None).await;
    app.services
        .maintenance
        .start(maintenance.id, app.actor())
        .await
        .unwrap();

    let ticket = app.open_ticket(machine.id, true).await;
    let open = app.open_logs(machine.id).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].category, DowntimeCategory::Corrective);

    app.services
        .transitions
        .change_status(
            ticket.id,
            ChangeStatusRequest {
                new_status_id: catalog.closed.id,
                comment: None,
            },
            app.actor(),
        )
        .await
        .unwrap();

    let history = app.history(machine.id).await;
    let categories: Vec<_> = history.iter().map(|l| l.category).collect();
    assert_eq!(
        categories,
        vec![
            DowntimeCategory::Preventive,
            DowntimeCategory::Corrective,
            DowntimeCategory::Preventive
        ]
    );
    for pair in history.windows(2) {
        assert_eq!(pair[0].end_time, Some(pair[1].start_time));
    }
    assert!(history[2].is_open());
}

#[tokio::test]
async fn test_overdue_replaces_due_and_notifies_once() {
    let app = create_test_app().await;
    let machine = app.create_machine("Boiler 5").await;
    let engineer = Uuid::new_v4();
    let maintenance = schedule(&app, machine.id, false, Some(engineer)).await;

    assert!(app.services.maintenance.mark_due(maintenance.id).await.unwrap());
    assert!(!app.services.maintenance.mark_due(maintenance.id).await.unwrap());
    assert!(app.services.maintenance.mark_overdue(maintenance.id).await.unwrap());
    assert!(!app.services.maintenance.mark_overdue(maintenance.id).await.unwrap());

    let source = TagSource::ScheduledMaintenance(maintenance.id);
    let tags = app.tags(machine.id).await;
    assert_eq!(tags, vec![(MAINTENANCE_OVERDUE.to_string(), source)]);
    assert!(!tags.contains(&(MAINTENANCE_DUE.to_string(), source)));

    let sent = app.dispatcher.sent();
    assert_eq!(app.dispatcher.kinds(), vec![EventKind::MaintenanceOverdue]);
    assert_eq!(sent[0].recipients, vec![engineer]);
    assert!(matches!(
        sent[0].event,
        DomainEvent::MaintenanceOverdue { maintenance_id, .. } if maintenance_id == maintenance.id
    ));

    // 提交后逾期标签随维护一起清理
    app.services
        .maintenance
        .start(maintenance.id, app.actor())
        .await
        .unwrap();
    app.services
        .maintenance
        .submit(maintenance.id, app.actor())
        .await
        .unwrap();
    assert!(app.tags(machine.id).await.is_empty());
}

/// 提交维护时设备上仍有未关闭工单，设备状态回到工单设定的状态而不是在役
#[tokio::test]
async fn test_submit_keeps_machine_status_of_open_ticket() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Boiler 6").await;
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
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.down.id)
    );

    let maintenance = schedule(&app, machine.id, true, None).await;
    app.services
        .maintenance
        .start(maintenance.id, app.actor())
        .await
        .unwrap();
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.under_maintenance.id)
    );

    app.services
        .maintenance
        .submit(maintenance.id, app.actor())
        .await
        .unwrap();
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.down.id)
    );
    let ticket = app.services.transitions.find_ticket(ticket.id).await.unwrap();
    assert_eq!(ticket.status_id, catalog.in_progress.id);

    // 工单关闭后才恢复在役
    app.services
        .transitions
        .change_status(
            ticket.id,
            ChangeStatusRequest {
                new_status_id: catalog.closed.id,
                comment: None,
            },
            app.actor(),
        )
        .await
        .unwrap();
    assert_eq!(
        app.machine(machine.id).await.machine_status_id,
        Some(catalog.in_service.id)
    );
}
