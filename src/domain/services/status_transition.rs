// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::ticket_request::{
    AddCommentRequest, ChangePriorityRequest, ChangeStatusRequest, OpenTicketRequest,
};
use crate::domain::models::behavior::{Behavior, BehaviorKey};
use crate::domain::models::machine::{Actor, Machine};
use crate::domain::models::notification::{DomainEvent, Notification};
use crate::domain::models::status::StatusKind;
use crate::domain::models::tag::{TagSource, OUT_OF_SERVICE};
use crate::domain::models::ticket::{Ticket, TicketPriority, TicketUpdate, TicketUpdateKind};
use crate::domain::repositories::ticket_repository::TicketRepository;
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
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// 工单状态迁移服务
///
/// 工单状态只能经由此服务修改。每个公开操作是一个事务：
/// 写时间线、更新工单、对新状态的每个行为执行副作用、协调停机日志，
/// 提交后再派发通知。
pub struct StatusTransitionService {
    db: Arc<DatabaseConnection>,
    catalog: Arc<StatusCatalog>,
    tickets: Arc<dyn TicketRepository>,
    machine_state: Arc<MachineStateService>,
    tags: Arc<TagManager>,
    resolver: Arc<DowntimeResolver>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    retry: ConflictRetry,
}

fn ticket_recipients(ticket: &Ticket, actor: Actor) -> Vec<Uuid> {
    [Some(ticket.created_by), actor.user_id()]
        .into_iter()
        .flatten()
        .filter(|id| !id.is_nil())
        .collect()
}

impl StatusTransitionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<DatabaseConnection>,
        catalog: Arc<StatusCatalog>,
        tickets: Arc<dyn TicketRepository>,
        machine_state: Arc<MachineStateService>,
        tags: Arc<TagManager>,
        resolver: Arc<DowntimeResolver>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        retry: ConflictRetry,
    ) -> Self {
        Self {
            db,
            catalog,
            tickets,
            machine_state,
            tags,
            resolver,
            dispatcher,
            retry,
        }
    }

    async fn load_ticket(&self, txn: &DatabaseTransaction, ticket_id: Uuid) -> ServiceResult<Ticket> {
        self.tickets
            .find_by_id(txn, ticket_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ticket", ticket_id))
    }

    /// 以配置的开启状态创建工单
    pub async fn open_ticket(&self, request: OpenTicketRequest, actor: Actor) -> ServiceResult<Ticket> {
        request.validate()?;
        let request = &request;
        self.retry
            .run("open_ticket", move || async move {
                let txn = self.db.begin().await?;
                let (ticket, notifications) = self.open_ticket_in(&txn, request, actor).await?;
                txn.commit().await?;
                dispatch_all(self.dispatcher.as_ref(), notifications).await;
                Ok(ticket)
            })
            .await
    }

    /// 在调用方事务中开单；返回待提交后派发的通知
    pub(crate) async fn open_ticket_in(
        &self,
        txn: &DatabaseTransaction,
        request: &OpenTicketRequest,
        actor: Actor,
    ) -> ServiceResult<(Ticket, Vec<Notification>)> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(ServiceError::validation("description", "description must not be blank"));
        }
        let priority = TicketPriority::from_i16(request.priority)
            .ok_or_else(|| ServiceError::validation("priority", "priority must be between 0 and 2"))?;

        let machine = self.machine_state.lock(txn, request.machine_id).await?;
        let opening = self
            .catalog
            .find_status_by_behavior(txn, BehaviorKey::IsOpeningStatus)
            .await?;

        let now = Utc::now().fixed_offset();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            machine_id: machine.id,
            status_id: opening.id,
            priority,
            description: description.to_string(),
            created_by: actor.user_id().unwrap_or(Uuid::nil()),
            inspection_item_id: request.inspection_item_id,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let ticket = self.tickets.create(txn, &ticket).await?;

        let created = TicketUpdate::new(ticket.id, TicketUpdateKind::Created, actor)
            .with_status(None, Some(opening.id));
        self.tickets.append_update(txn, &created).await?;

        if request.machine_down {
            self.tags
                .apply_tag(txn, machine.id, OUT_OF_SERVICE, TagSource::Ticket(ticket.id))
                .await?;
        }

        let behaviors = self.catalog.load_status(txn, opening.id).await?.map(|s| s.behaviors);
        self.apply_behaviors(txn, &ticket, machine, behaviors.unwrap_or_default(), actor)
            .await?;
        self.resolver.resolve(txn, ticket.machine_id).await?;

        info!(
            ticket_id = %ticket.id,
            machine_id = %ticket.machine_id,
            priority = ?ticket.priority,
            machine_down = request.machine_down,
            actor = %actor,
            "Ticket opened"
        );

        let notification = Notification::new(
            DomainEvent::TicketCreated {
                ticket_id: ticket.id,
                machine_id: ticket.machine_id,
                status_id: ticket.status_id,
                priority: ticket.priority,
                inspection_item_id: ticket.inspection_item_id,
            },
            actor,
            ticket_recipients(&ticket, actor),
        );
        Ok((ticket, vec![notification]))
    }

    /// 修改工单状态并执行新状态上的所有行为
    pub async fn change_status(
        &self,
        ticket_id: Uuid,
        request: ChangeStatusRequest,
        actor: Actor,
    ) -> ServiceResult<TicketUpdate> {
        request.validate()?;
        let request = &request;
        self.retry
            .run("change_status", move || async move {
                let txn = self.db.begin().await?;
                let (update, notifications) =
                    self.change_status_in(&txn, ticket_id, request, actor).await?;
                txn.commit().await?;
                dispatch_all(self.dispatcher.as_ref(), notifications).await;
                Ok(update)
            })
            .await
    }

    async fn change_status_in(
        &self,
        txn: &DatabaseTransaction,
        ticket_id: Uuid,
        request: &ChangeStatusRequest,
        actor: Actor,
    ) -> ServiceResult<(TicketUpdate, Vec<Notification>)> {
        let ticket = self.load_ticket(txn, ticket_id).await?;
        let target = self
            .catalog
            .load_status(txn, request.new_status_id)
            .await?
            .ok_or_else(|| ServiceError::validation("new_status_id", "unknown status"))?;
        if target.status.kind != StatusKind::Ticket {
            return Err(ServiceError::validation(
                "new_status_id",
                "status is not a ticket status",
            ));
        }
        if target.status.id == ticket.status_id {
            return Err(ServiceError::validation(
                "new_status_id",
                "ticket is already in this status",
            ));
        }

        let machine = self.machine_state.lock(txn, ticket.machine_id).await?;
        let old_status_id = ticket.status_id;

        let update = TicketUpdate::new(ticket.id, TicketUpdateKind::StatusChange, actor)
            .with_status(Some(old_status_id), Some(target.status.id))
            .with_comment(request.comment.clone());
        let update = self.tickets.append_update(txn, &update).await?;
        let ticket = self.tickets.update_status(txn, &ticket, target.status.id).await?;

        let mut notifications = Vec::new();
        self.apply_behaviors(txn, &ticket, machine, target.behaviors.clone(), actor)
            .await?;
        if target.is_closing() {
            notifications.push(Notification::new(
                DomainEvent::TicketClosed {
                    ticket_id: ticket.id,
                    machine_id: ticket.machine_id,
                    old_status_id,
                    new_status_id: ticket.status_id,
                },
                actor,
                ticket_recipients(&ticket, actor),
            ));
        }

        self.resolver.resolve(txn, ticket.machine_id).await?;

        metrics::counter!("uptrack_status_transitions_total").increment(1);
        info!(
            ticket_id = %ticket.id,
            from = %old_status_id,
            to = %ticket.status_id,
            status = %target.status.name,
            closing = target.is_closing(),
            actor = %actor,
            "Ticket status changed"
        );
        Ok((update, notifications))
    }

    /// 对状态行为逐一执行副作用
    ///
    /// 独占行为排在参数化链接之前，因此关闭时的恢复在役可被显式的
    /// `sets_machine_status` 覆盖
    async fn apply_behaviors(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
        mut machine: Machine,
        behaviors: Vec<Behavior>,
        actor: Actor,
    ) -> ServiceResult<Machine> {
        for behavior in behaviors {
            match behavior {
                Behavior::Opens | Behavior::InProgress | Behavior::AwaitsParts(_) => {}
                Behavior::SetsMachineStatus(target) => {
                    machine = self
                        .machine_state
                        .set_status(
                            txn,
                            machine,
                            target,
                            Some(ticket.id),
                            &format!("ticket {} moved by {}", ticket.id, actor),
                        )
                        .await?;
                }
                Behavior::Closes => {
                    self.tags
                        .clear_source(txn, ticket.machine_id, TagSource::Ticket(ticket.id))
                        .await?;
                    machine = self
                        .machine_state
                        .return_to_service(txn, machine, ticket.id)
                        .await?;
                }
                Behavior::CreatesTicket(_) => {
                    debug!(ticket_id = %ticket.id, "Ticket creation behavior only applies to inspection outcomes");
                }
                Behavior::DefaultInService | Behavior::UnderMaintenance => {
                    debug!(ticket_id = %ticket.id, behavior = %behavior.key(), "Machine status behavior ignored on ticket status");
                }
            }
        }
        Ok(machine)
    }

    /// 修改优先级；提升派发 TicketEscalated，降低派发 TicketDowngraded
    pub async fn change_priority(
        &self,
        ticket_id: Uuid,
        request: ChangePriorityRequest,
        actor: Actor,
    ) -> ServiceResult<TicketUpdate> {
        request.validate()?;
        let request = &request;
        self.retry
            .run("change_priority", move || async move {
                let txn = self.db.begin().await?;
                let ticket = self.load_ticket(&txn, ticket_id).await?;
                let priority = TicketPriority::from_i16(request.priority).ok_or_else(|| {
                    ServiceError::validation("priority", "priority must be between 0 and 2")
                })?;
                if priority == ticket.priority {
                    return Err(ServiceError::validation(
                        "priority",
                        "ticket already has this priority",
                    ));
                }

                let update = TicketUpdate::new(ticket.id, TicketUpdateKind::PriorityChange, actor)
                    .with_priority(ticket.priority, priority)
                    .with_comment(request.comment.clone());
                let update = self.tickets.append_update(&txn, &update).await?;
                let updated = self.tickets.update_priority(&txn, &ticket, priority).await?;
                txn.commit().await?;

                let event = if priority > ticket.priority {
                    DomainEvent::TicketEscalated {
                        ticket_id: ticket.id,
                        machine_id: ticket.machine_id,
                        old_priority: ticket.priority,
                        new_priority: priority,
                    }
                } else {
                    DomainEvent::TicketDowngraded {
                        ticket_id: ticket.id,
                        machine_id: ticket.machine_id,
                        old_priority: ticket.priority,
                        new_priority: priority,
                    }
                };
                info!(ticket_id = %ticket.id, from = ?ticket.priority, to = ?priority, actor = %actor, "Ticket priority changed");
                dispatch_all(
                    self.dispatcher.as_ref(),
                    vec![Notification::new(event, actor, ticket_recipients(&updated, actor))],
                )
                .await;
                Ok(update)
            })
            .await
    }

    pub async fn add_comment(
        &self,
        ticket_id: Uuid,
        request: AddCommentRequest,
        actor: Actor,
    ) -> ServiceResult<TicketUpdate> {
        request.validate()?;
        if request.comment.trim().is_empty() {
            return Err(ServiceError::validation("comment", "comment must not be blank"));
        }

        let txn = self.db.begin().await?;
        let ticket = self.load_ticket(&txn, ticket_id).await?;
        let update = TicketUpdate::new(ticket.id, TicketUpdateKind::Comment, actor)
            .with_comment(Some(request.comment));
        let update = self.tickets.append_update(&txn, &update).await?;
        txn.commit().await?;

        debug!(ticket_id = %ticket.id, actor = %actor, "Comment added");
        Ok(update)
    }

    /// 丢弃工单：移除其标签，必要时恢复在役，再删除工单及时间线
    pub async fn discard_ticket(&self, ticket_id: Uuid, actor: Actor) -> ServiceResult<()> {
        self.retry
            .run("discard_ticket", move || async move {
                let txn = self.db.begin().await?;
                let ticket = self.load_ticket(&txn, ticket_id).await?;
                let machine = self.machine_state.lock(&txn, ticket.machine_id).await?;

                self.tags
                    .clear_source(&txn, ticket.machine_id, TagSource::Ticket(ticket.id))
                    .await?;

                let was_open = !self
                    .catalog
                    .holders_of(&txn, BehaviorKey::IsTicketClosingStatus)
                    .await?
                    .contains(&ticket.status_id);
                if was_open {
                    // 在删除之前执行，系统记录随工单一同级联删除
                    self.machine_state
                        .return_to_service(&txn, machine, ticket.id)
                        .await?;
                }

                self.tickets.delete(&txn, ticket.id).await?;
                self.resolver.resolve(&txn, ticket.machine_id).await?;
                txn.commit().await?;

                info!(ticket_id = %ticket.id, machine_id = %ticket.machine_id, actor = %actor, "Ticket discarded");
                dispatch_all(
                    self.dispatcher.as_ref(),
                    vec![Notification::new(
                        DomainEvent::TicketDiscarded {
                            ticket_id: ticket.id,
                            machine_id: ticket.machine_id,
                        },
                        actor,
                        ticket_recipients(&ticket, actor),
                    )],
                )
                .await;
                Ok(())
            })
            .await
    }

    pub async fn find_ticket(&self, ticket_id: Uuid) -> ServiceResult<Ticket> {
        let txn = self.db.begin().await?;
        let ticket = self.load_ticket(&txn, ticket_id).await?;
        txn.commit().await?;
        Ok(ticket)
    }

    pub async fn timeline(&self, ticket_id: Uuid) -> ServiceResult<Vec<TicketUpdate>> {
        let txn = self.db.begin().await?;
        let updates = self.tickets.timeline(&txn, ticket_id).await?;
        txn.commit().await?;
        Ok(updates)
    }
}
