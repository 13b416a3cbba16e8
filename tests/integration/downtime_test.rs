// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{at, create_test_app, TestApp};
use sea_orm::TransactionTrait;
use uptrack::domain::models::downtime::DowntimeCategory;
use uptrack::domain::models::tag::{TagSource, AWAITING_PARTS, OUT_OF_SERVICE, UNDER_MAINTENANCE};
use uptrack::domain::repositories::downtime_repository::DowntimeRepository;
use uptrack::domain::services::downtime_resolver::ResolveOutcome;
use uptrack::infrastructure::repositories::downtime_repo_impl::DowntimeRepositoryImpl;
use uptrack::utils::errors::ServiceError;
use uuid::Uuid;

async fn apply(app: &TestApp, machine_id: Uuid, tag: &str, source: TagSource) -> bool {
    let txn = app.db.begin().await.unwrap();
    let applied = app
        .services
        .tags
        .apply_tag(&txn, machine_id, tag, source)
        .await
        .unwrap();
    txn.commit().await.unwrap();
    applied
}

async fn remove(app: &TestApp, machine_id: Uuid, tag: &str, source: TagSource) -> u64 {
    let txn = app.db.begin().await.unwrap();
    let removed = app
        .services
        .tags
        .remove_tag(&txn, machine_id, tag, source)
        .await
        .unwrap();
    txn.commit().await.unwrap();
    removed
}

async fn resolve_at(app: &TestApp, machine_id: Uuid, hour: u32, minute: u32) -> ResolveOutcome {
    let txn = app.db.begin().await.unwrap();
    let outcome = app
        .services
        .resolver
        .resolve_at(&txn, machine_id, at(hour, minute))
        .await
        .unwrap();
    txn.commit().await.unwrap();
    outcome
}

/// 施加停机标签后开启纠正性停机，移除后在移除时刻关闭，且不再开启新日志
#[tokio::test]
async fn test_ticket_downtime_opens_and_closes_at_boundaries() {
    let app = create_test_app().await;
    let machine = app.create_machine("Lathe 1").await;
    let ticket = TagSource::Ticket(Uuid::new_v4());

    apply(&app, machine.id, OUT_OF_SERVICE, ticket).await;
    let outcome = resolve_at(&app, machine.id, 8, 0).await;
    assert_eq!(outcome.opened, 1);
    assert_eq!(outcome.category, Some(DowntimeCategory::Corrective));

    let history = app.history(machine.id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category, DowntimeCategory::Corrective);
    assert_eq!(history[0].start_time, at(8, 0));
    assert!(history[0].is_open());

    remove(&app, machine.id, OUT_OF_SERVICE, ticket).await;
    let outcome = resolve_at(&app, machine.id, 9, 30).await;
    assert_eq!(outcome.closed, 1);
    assert_eq!(outcome.opened, 0);

    let history = app.history(machine.id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].end_time, Some(at(9, 30)));
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let app = create_test_app().await;
    let machine = app.create_machine("Press 2").await;

    apply(&app, machine.id, OUT_OF_SERVICE, TagSource::Manual).await;
    assert!(!resolve_at(&app, machine.id, 8, 0).await.is_noop());

    let again = resolve_at(&app, machine.id, 8, 5).await;
    assert!(again.is_noop());
    assert_eq!(again.category, Some(DowntimeCategory::Other));
    assert_eq!(app.history(machine.id).await.len(), 1);
}

#[tokio::test]
async fn test_apply_tag_is_idempotent_per_source() {
    let app = create_test_app().await;
    let machine = app.create_machine("Mill 3").await;
    let first = TagSource::Ticket(Uuid::new_v4());
    let second = TagSource::Ticket(Uuid::new_v4());

    assert!(apply(&app, machine.id, OUT_OF_SERVICE, first).await);
    assert!(!apply(&app, machine.id, OUT_OF_SERVICE, first).await);
    assert!(apply(&app, machine.id, OUT_OF_SERVICE, second).await);
    assert_eq!(app.tags(machine.id).await.len(), 2);

    // 另一个来源仍然使设备停机
    assert_eq!(remove(&app, machine.id, OUT_OF_SERVICE, first).await, 1);
    resolve_at(&app, machine.id, 10, 0).await;
    assert_eq!(app.open_logs(machine.id).await.len(), 1);
}

#[tokio::test]
async fn test_informational_tags_do_not_open_downtime() {
    let app = create_test_app().await;
    let machine = app.create_machine("Saw 4").await;

    apply(&app, machine.id, UNDER_MAINTENANCE, TagSource::Manual).await;
    let outcome = resolve_at(&app, machine.id, 8, 0).await;

    assert!(outcome.is_noop());
    assert_eq!(outcome.category, None);
    assert!(app.history(machine.id).await.is_empty());
}

/// 类别变化时旧日志关闭与新日志开启共用同一边界
#[tokio::test]
async fn test_category_change_is_gapless() {
    let app = create_test_app().await;
    let machine = app.create_machine("Robot 5").await;

    apply(&app, machine.id, AWAITING_PARTS, TagSource::Manual).await;
    apply(&app, machine.id, OUT_OF_SERVICE, TagSource::Manual).await;
    let outcome = resolve_at(&app, machine.id, 8, 0).await;
    assert_eq!(outcome.category, Some(DowntimeCategory::AwaitingParts));

    apply(&app, machine.id, OUT_OF_SERVICE, TagSource::Ticket(Uuid::new_v4())).await;
    let outcome = resolve_at(&app, machine.id, 11, 15).await;
    assert_eq!(outcome.closed, 1);
    assert_eq!(outcome.opened, 1);

    let history = app.history(machine.id).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].category, DowntimeCategory::AwaitingParts);
    assert_eq!(history[0].end_time, Some(at(11, 15)));
    assert_eq!(history[1].category, DowntimeCategory::Corrective);
    assert_eq!(history[1].start_time, at(11, 15));
    assert!(history[1].is_open());
}

#[tokio::test]
async fn test_overlapping_open_logs_are_repaired() {
    let app = create_test_app().await;
    let machine = app.create_machine("Oven 6").await;
    let logs = DowntimeRepositoryImpl::new();

    let txn = app.db.begin().await.unwrap();
    logs.open(&txn, machine.id, DowntimeCategory::Other, at(7, 0))
        .await
        .unwrap();
    logs.open(&txn, machine.id, DowntimeCategory::Corrective, at(7, 30))
        .await
        .unwrap();
    txn.commit().await.unwrap();

    apply(&app, machine.id, OUT_OF_SERVICE, TagSource::Ticket(Uuid::new_v4())).await;
    resolve_at(&app, machine.id, 8, 0).await;

    let history = app.history(machine.id).await;
    let open: Vec<_> = history.iter().filter(|l| l.is_open()).collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].category, DowntimeCategory::Corrective);
    assert_eq!(history[0].end_time, Some(at(7, 30)));
}

#[tokio::test]
async fn test_reconcile_all_repairs_drift_once() {
    let app = create_test_app().await;
    let drifted = app.create_machine("Drifted").await;
    app.create_machine("Healthy").await;

    // 标签写入后未协调
    apply(&app, drifted.id, OUT_OF_SERVICE, TagSource::Manual).await;

    let summary = app.services.resolver.reconcile_all().await.unwrap();
    assert_eq!(summary.machines, 2);
    assert_eq!(summary.changed, 1);
    assert_eq!(summary.opened, 1);
    assert_eq!(summary.down, 1);

    let summary = app.services.resolver.reconcile_all().await.unwrap();
    assert_eq!(summary.changed, 0);
    assert_eq!(app.open_logs(drifted.id).await.len(), 1);
}

#[tokio::test]
async fn test_resolve_unknown_machine_is_not_found() {
    let app = create_test_app().await;
    let err = app
        .services
        .resolver
        .resolve_machine(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn test_unknown_tag_is_configuration_error() {
    let app = create_test_app().await;
    let machine = app.create_machine("Lathe 7").await;

    let txn = app.db.begin().await.unwrap();
    let err = app
        .services
        .tags
        .apply_tag(&txn, machine.id, "on-fire", TagSource::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Configuration(_)));
}

/// 不限来源的移除会删掉所有来源的同名标签，其他标签不受影响
#[tokio::test]
async fn test_remove_tag_all_sources_clears_every_source() {
    let app = create_test_app().await;
    let machine = app.create_machine("Mill 9").await;
    let ticket = TagSource::Ticket(Uuid::new_v4());
    let maintenance = TagSource::ScheduledMaintenance(Uuid::new_v4());

    assert!(apply(&app, machine.id, OUT_OF_SERVICE, ticket).await);
    assert!(apply(&app, machine.id, OUT_OF_SERVICE, TagSource::Manual).await);
    assert!(apply(&app, machine.id, UNDER_MAINTENANCE, maintenance).await);

    let txn = app.db.begin().await.unwrap();
    let removed = app
        .services
        .tags
        .remove_tag_all_sources(&txn, machine.id, OUT_OF_SERVICE, app.actor())
        .await
        .unwrap();
    txn.commit().await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(
        app.tags(machine.id).await,
        vec![(UNDER_MAINTENANCE.to_string(), maintenance)]
    );
}
