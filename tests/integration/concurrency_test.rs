// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use sea_orm::TransactionTrait;
use uptrack::application::dto::ticket_request::ChangePriorityRequest;
use uptrack::domain::repositories::machine_repository::MachineRepository;
use uptrack::domain::repositories::ticket_repository::TicketRepository;
use uptrack::infrastructure::repositories::machine_repo_impl::MachineRepositoryImpl;
use uptrack::infrastructure::repositories::ticket_repo_impl::TicketRepositoryImpl;
use uptrack::utils::errors::RepositoryError;

/// 使用过期版本号更新工单会得到冲突，且不修改任何数据
#[tokio::test]
async fn test_stale_ticket_version_is_a_conflict() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let machine = app.create_machine("Press 1").await;
    let stale = app.open_ticket(machine.id, false).await;

    app.services
        .transitions
        .change_priority(
            stale.id,
            ChangePriorityRequest {
                priority: 2,
                comment: None,
            },
            app.actor(),
        )
        .await
        .unwrap();
    let current = app.services.transitions.find_ticket(stale.id).await.unwrap();
    assert!(current.version > stale.version);

    let repo = TicketRepositoryImpl::new();
    let txn = app.db.begin().await.unwrap();
    let err = repo
        .update_status(&txn, &stale, catalog.closed.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    txn.rollback().await.unwrap();

    let after = app.services.transitions.find_ticket(stale.id).await.unwrap();
    assert_eq!(after.status_id, catalog.open.id);
    assert_eq!(after.version, current.version);

    // 使用最新版本号则更新成功并递增版本
    let txn = app.db.begin().await.unwrap();
    let updated = repo
        .update_status(&txn, &current, catalog.in_progress.id)
        .await
        .unwrap();
    txn.commit().await.unwrap();
    assert_eq!(updated.status_id, catalog.in_progress.id);
    assert_eq!(updated.version, current.version + 1);
}

#[tokio::test]
async fn test_stale_machine_version_is_a_conflict() {
    let app = create_test_app().await;
    let catalog = app.catalog();
    let stale = app.create_machine("Press 2").await;

    let repo = MachineRepositoryImpl::new();
    let txn = app.db.begin().await.unwrap();
    repo.set_status(&txn, &stale, catalog.down.id).await.unwrap();
    txn.commit().await.unwrap();

    let txn = app.db.begin().await.unwrap();
    let err = repo
        .set_status(&txn, &stale, catalog.under_maintenance.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    txn.rollback().await.unwrap();

    let machine = app.machine(stale.id).await;
    assert_eq!(machine.machine_status_id, Some(catalog.down.id));
    assert_eq!(machine.version, stale.version + 1);
}
