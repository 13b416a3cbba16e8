// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::inspection_request::{CreateInspectionRequest, RecordOutcomeRequest};
use crate::application::dto::ticket_request::OpenTicketRequest;
use crate::domain::models::behavior::{Behavior, Severity};
use crate::domain::models::inspection::{Inspection, InspectionItem};
use crate::domain::models::machine::Actor;
use crate::domain::models::notification::{DomainEvent, Notification};
use crate::domain::models::status::StatusKind;
use crate::domain::models::ticket::TicketPriority;
use crate::domain::repositories::inspection_repository::InspectionRepository;
use crate::domain::services::downtime_resolver::DowntimeResolver;
use crate::domain::services::machine_state::MachineStateService;
use crate::domain::services::notification_dispatcher::{dispatch_all, NotificationDispatcher};
use crate::domain::services::status_catalog::StatusCatalog;
use crate::domain::services::status_transition::StatusTransitionService;
use crate::utils::errors::{ServiceError, ServiceResult};
use crate::utils::retry_policy::ConflictRetry;
use chrono::Utc;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// 巡检服务
///
/// 巡检结果状态上的行为在记录结果时求值：严重发现开单，
/// `sets_machine_status` 修改设备状态
pub struct InspectionService {
    db: Arc<DatabaseConnection>,
    repo: Arc<dyn InspectionRepository>,
    catalog: Arc<StatusCatalog>,
    machine_state: Arc<MachineStateService>,
    transitions: Arc<StatusTransitionService>,
    resolver: Arc<DowntimeResolver>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    retry: ConflictRetry,
}

impl InspectionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<DatabaseConnection>,
        repo: Arc<dyn InspectionRepository>,
        catalog: Arc<StatusCatalog>,
        machine_state: Arc<MachineStateService>,
        transitions: Arc<StatusTransitionService>,
        resolver: Arc<DowntimeResolver>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        retry: ConflictRetry,
    ) -> Self {
        Self {
            db,
            repo,
            catalog,
            machine_state,
            transitions,
            resolver,
            dispatcher,
            retry,
        }
    }

    async fn load(&self, txn: &DatabaseTransaction, inspection_id: Uuid) -> ServiceResult<Inspection> {
        self.repo
            .find_by_id(txn, inspection_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("inspection", inspection_id))
    }

    /// 创建巡检及其检查项
    pub async fn create(
        &self,
        request: CreateInspectionRequest,
        inspector: Actor,
    ) -> ServiceResult<(Inspection, Vec<InspectionItem>)> {
        request.validate()?;
        let inspector_id = inspector
            .user_id()
            .ok_or_else(|| ServiceError::validation("inspector", "inspections need a user"))?;

        let txn = self.db.begin().await?;
        self.machine_state.lock(&txn, request.machine_id).await?;

        let inspection = Inspection {
            id: Uuid::new_v4(),
            machine_id: request.machine_id,
            inspector_id,
            completed_at: None,
            created_at: Utc::now().fixed_offset(),
        };
        let inspection = self.repo.create(&txn, &inspection).await?;

        let mut items = Vec::with_capacity(request.items.len());
        for name in &request.items {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::validation("items", "item names must not be blank"));
            }
            let item = InspectionItem {
                id: Uuid::new_v4(),
                inspection_id: inspection.id,
                name: name.to_string(),
                outcome_status_id: None,
                ticket_id: None,
            };
            items.push(self.repo.create_item(&txn, &item).await?);
        }
        txn.commit().await?;

        info!(inspection_id = %inspection.id, machine_id = %inspection.machine_id, items = items.len(), "Inspection created");
        Ok((inspection, items))
    }

    /// 记录检查项结果并执行结果状态上的行为
    ///
    /// 每个检查项最多生成一张工单
    pub async fn record_outcome(
        &self,
        item_id: Uuid,
        request: RecordOutcomeRequest,
        actor: Actor,
    ) -> ServiceResult<InspectionItem> {
        request.validate()?;
        let request = &request;
        self.retry
            .run("record_outcome", move || async move {
                let txn = self.db.begin().await?;
                let (item, notifications) = self.record_outcome_in(&txn, item_id, request, actor).await?;
                txn.commit().await?;
                dispatch_all(self.dispatcher.as_ref(), notifications).await;
                Ok(item)
            })
            .await
    }

    async fn record_outcome_in(
        &self,
        txn: &DatabaseTransaction,
        item_id: Uuid,
        request: &RecordOutcomeRequest,
        actor: Actor,
    ) -> ServiceResult<(InspectionItem, Vec<Notification>)> {
        let mut item = self
            .repo
            .find_item(txn, item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("inspection item", item_id))?;
        let inspection = self.load(txn, item.inspection_id).await?;
        if inspection.completed_at.is_some() {
            return Err(ServiceError::validation(
                "inspection",
                "inspection is already completed",
            ));
        }

        let outcome = self
            .catalog
            .load_status(txn, request.outcome_status_id)
            .await?
            .ok_or_else(|| ServiceError::validation("outcome_status_id", "unknown status"))?;
        if outcome.status.kind != StatusKind::InspectionOutcome {
            return Err(ServiceError::validation(
                "outcome_status_id",
                "status is not an inspection outcome",
            ));
        }
        item.outcome_status_id = Some(outcome.status.id);

        let mut notifications = Vec::new();
        for behavior in &outcome.behaviors {
            match *behavior {
                Behavior::CreatesTicket(severity) => {
                    if let Some(existing) = item.ticket_id {
                        debug!(item_id = %item.id, ticket_id = %existing, "Finding already has a ticket");
                        continue;
                    }
                    let ticket_request = OpenTicketRequest {
                        machine_id: inspection.machine_id,
                        priority: TicketPriority::from(severity).as_i16(),
                        description: format!("Inspection finding: {}", item.name),
                        machine_down: severity == Severity::Sev1,
                        inspection_item_id: Some(item.id),
                    };
                    let (ticket, mut created) = self
                        .transitions
                        .open_ticket_in(txn, &ticket_request, actor)
                        .await?;
                    item.ticket_id = Some(ticket.id);
                    notifications.append(&mut created);
                }
                Behavior::SetsMachineStatus(target) => {
                    let machine = self.machine_state.lock(txn, inspection.machine_id).await?;
                    self.machine_state
                        .set_status(txn, machine, target, None, &format!("inspection item '{}'", item.name))
                        .await?;
                }
                Behavior::Opens
                | Behavior::InProgress
                | Behavior::Closes
                | Behavior::AwaitsParts(_)
                | Behavior::DefaultInService
                | Behavior::UnderMaintenance => {
                    debug!(item_id = %item.id, behavior = %behavior.key(), "Behavior has no effect on inspection outcomes");
                }
            }
        }

        let item = self.repo.update_item(txn, &item).await?;
        self.resolver.resolve(txn, inspection.machine_id).await?;

        info!(
            inspection_id = %inspection.id,
            item_id = %item.id,
            outcome = %outcome.status.name,
            ticket_id = ?item.ticket_id,
            "Inspection outcome recorded"
        );
        Ok((item, notifications))
    }

    /// 完成巡检；任何检查项生成过工单即视为未通过
    pub async fn complete(&self, inspection_id: Uuid, actor: Actor) -> ServiceResult<Inspection> {
        let txn = self.db.begin().await?;
        let inspection = self.load(&txn, inspection_id).await?;
        if inspection.completed_at.is_some() {
            return Err(ServiceError::validation(
                "inspection",
                "inspection is already completed",
            ));
        }

        let completed_at = Utc::now().fixed_offset();
        self.repo.mark_completed(&txn, inspection.id, completed_at).await?;
        let ticket_ids: Vec<Uuid> = self
            .repo
            .items_for(&txn, inspection.id)
            .await?
            .into_iter()
            .filter_map(|item| item.ticket_id)
            .collect();
        txn.commit().await?;

        let event = if ticket_ids.is_empty() {
            DomainEvent::InspectionCompleted {
                inspection_id: inspection.id,
                machine_id: inspection.machine_id,
            }
        } else {
            DomainEvent::InspectionFailed {
                inspection_id: inspection.id,
                machine_id: inspection.machine_id,
                ticket_ids: ticket_ids.clone(),
            }
        };
        info!(inspection_id = %inspection.id, findings = ticket_ids.len(), "Inspection completed");

        let recipients = [Some(inspection.inspector_id), actor.user_id()];
        dispatch_all(
            self.dispatcher.as_ref(),
            vec![Notification::new(event, actor, recipients.into_iter().flatten())],
        )
        .await;

        Ok(Inspection {
            completed_at: Some(completed_at),
            ..inspection
        })
    }

    pub async fn items(&self, inspection_id: Uuid) -> ServiceResult<Vec<InspectionItem>> {
        let txn = self.db.begin().await?;
        let items = self.repo.items_for(&txn, inspection_id).await?;
        txn.commit().await?;
        Ok(items)
    }
}
