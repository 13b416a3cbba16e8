// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::maintenance_request::ScheduleMaintenanceRequest;
use crate::domain::models::behavior::BehaviorKey;
use crate::domain::models::machine::Actor;
use crate::domain::models::maintenance::{MaintenanceState, ScheduledMaintenance};
use crate::domain::models::notification::{DomainEvent, Notification};
use crate::domain::models::tag::{
    TagSource, MAINTENANCE_DUE, MAINTENANCE_OVERDUE, OUT_OF_SERVICE, UNDER_MAINTENANCE,
};
use crate::domain::repositories::maintenance_repository::MaintenanceRepository;
use crate::domain::services::downtime_resolver::DowntimeResolver;
use crate::domain::services::machine_state::MachineStateService;
use crate::domain::services::notification_dispatcher::{dispatch_all, NotificationDispatcher};
use crate::domain::services::status_catalog::StatusCatalog;
use crate::domain::services::tag_manager::TagManager;
use crate::utils::errors::{ServiceError, ServiceResult};
use crate::utils::retry_policy::ConflictRetry;
use chrono::Utc;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// 维护结束时清理的、由该维护施加的标签
const MAINTENANCE_TAGS: [&str; 4] = [
    UNDER_MAINTENANCE,
    OUT_OF_SERVICE,
    MAINTENANCE_DUE,
    MAINTENANCE_OVERDUE,
];

/// 计划维护服务
pub struct MaintenanceService {
    db: Arc<DatabaseConnection>,
    repo: Arc<dyn MaintenanceRepository>,
    catalog: Arc<StatusCatalog>,
    machine_state: Arc<MachineStateService>,
    tags: Arc<TagManager>,
    resolver: Arc<DowntimeResolver>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    retry: ConflictRetry,
}

impl MaintenanceService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<DatabaseConnection>,
        repo: Arc<dyn MaintenanceRepository>,
        catalog: Arc<StatusCatalog>,
        machine_state: Arc<MachineStateService>,
        tags: Arc<TagManager>,
        resolver: Arc<DowntimeResolver>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        retry: ConflictRetry,
    ) -> Self {
        Self {
            db,
            repo,
            catalog,
            machine_state,
            tags,
            resolver,
            dispatcher,
            retry,
        }
    }

    async fn load(
        &self,
        txn: &DatabaseTransaction,
        maintenance_id: Uuid,
    ) -> ServiceResult<ScheduledMaintenance> {
        self.repo
            .find_by_id(txn, maintenance_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("scheduled maintenance", maintenance_id))
    }

    pub async fn find(&self, maintenance_id: Uuid) -> ServiceResult<ScheduledMaintenance> {
        let txn = self.db.begin().await?;
        let maintenance = self.load(&txn, maintenance_id).await?;
        txn.commit().await?;
        Ok(maintenance)
    }

    pub async fn schedule(
        &self,
        request: ScheduleMaintenanceRequest,
    ) -> ServiceResult<ScheduledMaintenance> {
        request.validate()?;
        let txn = self.db.begin().await?;
        // 只校验设备存在
        self.machine_state.lock(&txn, request.machine_id).await?;

        let maintenance = ScheduledMaintenance {
            id: Uuid::new_v4(),
            machine_id: request.machine_id,
            title: request.title.trim().to_string(),
            log_downtime: request.log_downtime,
            state: MaintenanceState::Scheduled,
            assigned_to: request.assigned_to,
            due_at: request.due_at,
            started_at: None,
            completed_at: None,
            created_at: Utc::now().fixed_offset(),
        };
        let maintenance = self.repo.create(&txn, &maintenance).await?;
        txn.commit().await?;

        info!(
            maintenance_id = %maintenance.id,
            machine_id = %maintenance.machine_id,
            due_at = %maintenance.due_at,
            log_downtime = maintenance.log_downtime,
            "Maintenance scheduled"
        );
        Ok(maintenance)
    }

    /// 开始维护
    ///
    /// 总是施加 under-maintenance；计入停机时再施加 out-of-service
    /// 并把设备切到维护中状态
    pub async fn start(&self, maintenance_id: Uuid, actor: Actor) -> ServiceResult<ScheduledMaintenance> {
        self.retry
            .run("start_maintenance", move || async move {
                let txn = self.db.begin().await?;
                let mut maintenance = self.load(&txn, maintenance_id).await?;
                if maintenance.state != MaintenanceState::Scheduled {
                    return Err(ServiceError::validation(
                        "state",
                        format!("maintenance is {}, expected scheduled", maintenance.state),
                    ));
                }

                let machine = self.machine_state.lock(&txn, maintenance.machine_id).await?;
                let source = TagSource::ScheduledMaintenance(maintenance.id);
                self.tags
                    .apply_tag(&txn, machine.id, UNDER_MAINTENANCE, source)
                    .await?;

                if maintenance.log_downtime {
                    self.tags.apply_tag(&txn, machine.id, OUT_OF_SERVICE, source).await?;
                    let under_maintenance = self
                        .catalog
                        .find_machine_status_by_behavior(&txn, BehaviorKey::IsUnderMaintenanceStatus)
                        .await?;
                    self.machine_state
                        .set_status(&txn, machine, under_maintenance.id, None, "maintenance started")
                        .await?;
                }

                maintenance.state = MaintenanceState::InProgress;
                maintenance.started_at = Some(Utc::now().fixed_offset());
                let maintenance = self.repo.update(&txn, &maintenance).await?;
                self.resolver.resolve(&txn, maintenance.machine_id).await?;
                txn.commit().await?;

                info!(maintenance_id = %maintenance.id, machine_id = %maintenance.machine_id, actor = %actor, "Maintenance started");
                Ok(maintenance)
            })
            .await
    }

    /// 提交维护
    ///
    /// 移除本次维护施加的全部标签，为仍在进行的其他维护重新施加
    /// under-maintenance；没有 out-of-service 标签剩余时按未关闭工单重新确定设备状态
    pub async fn submit(&self, maintenance_id: Uuid, actor: Actor) -> ServiceResult<ScheduledMaintenance> {
        self.retry
            .run("submit_maintenance", move || async move {
                let txn = self.db.begin().await?;
                let mut maintenance = self.load(&txn, maintenance_id).await?;
                if maintenance.state != MaintenanceState::InProgress {
                    return Err(ServiceError::validation(
                        "state",
                        format!("maintenance is {}, expected in_progress", maintenance.state),
                    ));
                }

                let machine = self.machine_state.lock(&txn, maintenance.machine_id).await?;
                let source = TagSource::ScheduledMaintenance(maintenance.id);
                for tag in MAINTENANCE_TAGS {
                    self.tags.remove_tag(&txn, machine.id, tag, source).await?;
                }

                let others = self
                    .repo
                    .find_in_progress_for_machine(&txn, machine.id, Some(maintenance.id))
                    .await?;
                for other in &others {
                    self.tags
                        .apply_tag(
                            &txn,
                            machine.id,
                            UNDER_MAINTENANCE,
                            TagSource::ScheduledMaintenance(other.id),
                        )
                        .await?;
                }

                let still_down = self
                    .tags
                    .active_tags(&txn, machine.id)
                    .await?
                    .iter()
                    .any(|t| t.tag_name == OUT_OF_SERVICE);
                if !still_down {
                    self.machine_state
                        .settle_after_maintenance(&txn, machine)
                        .await?;
                }

                maintenance.state = MaintenanceState::Completed;
                maintenance.completed_at = Some(Utc::now().fixed_offset());
                let maintenance = self.repo.update(&txn, &maintenance).await?;
                self.resolver.resolve(&txn, maintenance.machine_id).await?;
                txn.commit().await?;

                info!(
                    maintenance_id = %maintenance.id,
                    machine_id = %maintenance.machine_id,
                    other_in_progress = others.len(),
                    still_down,
                    actor = %actor,
                    "Maintenance submitted"
                );
                Ok(maintenance)
            })
            .await
    }

    /// 外部定时扫描的入口：维护即将到期
    pub async fn mark_due(&self, maintenance_id: Uuid) -> ServiceResult<bool> {
        let txn = self.db.begin().await?;
        let maintenance = self.open_maintenance(&txn, maintenance_id).await?;
        let applied = self
            .tags
            .apply_tag(
                &txn,
                maintenance.machine_id,
                MAINTENANCE_DUE,
                TagSource::ScheduledMaintenance(maintenance.id),
            )
            .await?;
        self.resolver.resolve(&txn, maintenance.machine_id).await?;
        txn.commit().await?;
        Ok(applied)
    }

    /// 外部定时扫描的入口：维护已逾期
    ///
    /// 以 overdue 取代 due；仅在首次标记时通知负责人
    pub async fn mark_overdue(&self, maintenance_id: Uuid) -> ServiceResult<bool> {
        let txn = self.db.begin().await?;
        let maintenance = self.open_maintenance(&txn, maintenance_id).await?;
        let source = TagSource::ScheduledMaintenance(maintenance.id);
        self.tags
            .remove_tag(&txn, maintenance.machine_id, MAINTENANCE_DUE, source)
            .await?;
        let applied = self
            .tags
            .apply_tag(&txn, maintenance.machine_id, MAINTENANCE_OVERDUE, source)
            .await?;
        self.resolver.resolve(&txn, maintenance.machine_id).await?;
        txn.commit().await?;

        if applied {
            dispatch_all(
                self.dispatcher.as_ref(),
                vec![Notification::new(
                    DomainEvent::MaintenanceOverdue {
                        maintenance_id: maintenance.id,
                        machine_id: maintenance.machine_id,
                        title: maintenance.title.clone(),
                    },
                    Actor::System,
                    maintenance.assigned_to,
                )],
            )
            .await;
        }
        Ok(applied)
    }

    async fn open_maintenance(
        &self,
        txn: &DatabaseTransaction,
        maintenance_id: Uuid,
    ) -> ServiceResult<ScheduledMaintenance> {
        let maintenance = self.load(txn, maintenance_id).await?;
        if maintenance.state == MaintenanceState::Completed {
            return Err(ServiceError::validation(
                "state",
                "maintenance is already completed",
            ));
        }
        Ok(maintenance)
    }
}
