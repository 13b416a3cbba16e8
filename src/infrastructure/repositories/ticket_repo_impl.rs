// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::machine::Actor;
use crate::domain::models::ticket::{Ticket, TicketPriority, TicketUpdate, TicketUpdateKind};
use crate::domain::repositories::ticket_repository::TicketRepository;
use crate::infrastructure::database::entities::{ticket, ticket_update};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

/// 工单仓库实现
#[derive(Clone, Default)]
pub struct TicketRepositoryImpl;

impl TicketRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

fn priority_from_column(value: i16) -> Result<TicketPriority, RepositoryError> {
    TicketPriority::from_i16(value)
        .ok_or_else(|| RepositoryError::Corrupt(format!("ticket priority {} out of range", value)))
}

impl TryFrom<ticket::Model> for Ticket {
    type Error = RepositoryError;

    fn try_from(model: ticket::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            machine_id: model.machine_id,
            status_id: model.status_id,
            priority: priority_from_column(model.priority)?,
            description: model.description,
            created_by: model.created_by,
            inspection_item_id: model.inspection_item_id,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<ticket_update::Model> for TicketUpdate {
    type Error = RepositoryError;

    fn try_from(model: ticket_update::Model) -> Result<Self, Self::Error> {
        let kind = model.kind.parse::<TicketUpdateKind>().map_err(|_| {
            RepositoryError::Corrupt(format!("unknown ticket update kind '{}'", model.kind))
        })?;
        Ok(Self {
            id: model.id,
            ticket_id: model.ticket_id,
            kind,
            author: model.author_id.map(Actor::User).unwrap_or(Actor::System),
            old_status_id: model.old_status_id,
            new_status_id: model.new_status_id,
            old_priority: model.old_priority.map(priority_from_column).transpose()?,
            new_priority: model.new_priority.map(priority_from_column).transpose()?,
            comment: model.comment,
            created_at: model.created_at,
        })
    }
}

impl TicketRepositoryImpl {
    /// 带版本检查的更新；返回受影响行数为 0 时视为并发冲突
    async fn guarded_update(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
        column: ticket::Column,
        value: sea_orm::sea_query::SimpleExpr,
    ) -> Result<(), RepositoryError> {
        let result = ticket::Entity::update_many()
            .col_expr(column, value)
            .col_expr(ticket::Column::Version, Expr::value(ticket.version + 1))
            .col_expr(ticket::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(ticket::Column::Id.eq(ticket.id))
            .filter(ticket::Column::Version.eq(ticket.version))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::Conflict(format!(
                "ticket {} changed since version {}",
                ticket.id, ticket.version
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for TicketRepositoryImpl {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
    ) -> Result<Ticket, RepositoryError> {
        let model = ticket::ActiveModel {
            id: Set(ticket.id),
            machine_id: Set(ticket.machine_id),
            status_id: Set(ticket.status_id),
            priority: Set(ticket.priority.as_i16()),
            description: Set(ticket.description.clone()),
            created_by: Set(ticket.created_by),
            inspection_item_id: Set(ticket.inspection_item_id),
            version: Set(ticket.version),
            created_at: Set(ticket.created_at),
            updated_at: Set(ticket.updated_at),
        }
        .insert(txn)
        .await?;
        model.try_into()
    }

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<Ticket>, RepositoryError> {
        ticket::Entity::find_by_id(id)
            .one(txn)
            .await?
            .map(Ticket::try_from)
            .transpose()
    }

    async fn update_status(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
        status_id: Uuid,
    ) -> Result<Ticket, RepositoryError> {
        self.guarded_update(txn, ticket, ticket::Column::StatusId, Expr::value(status_id))
            .await?;
        self.find_by_id(txn, ticket.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_priority(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
        priority: TicketPriority,
    ) -> Result<Ticket, RepositoryError> {
        self.guarded_update(
            txn,
            ticket,
            ticket::Column::Priority,
            Expr::value(priority.as_i16()),
        )
        .await?;
        self.find_by_id(txn, ticket.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<(), RepositoryError> {
        let result = ticket::Entity::delete_by_id(id).exec(txn).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_open_for_machine(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        closing_status_id: Uuid,
        excluding: Option<Uuid>,
    ) -> Result<Vec<Ticket>, RepositoryError> {
        let mut query = ticket::Entity::find()
            .filter(ticket::Column::MachineId.eq(machine_id))
            .filter(ticket::Column::StatusId.ne(closing_status_id));
        if let Some(excluded) = excluding {
            query = query.filter(ticket::Column::Id.ne(excluded));
        }

        query
            .order_by_asc(ticket::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(Ticket::try_from)
            .collect()
    }

    async fn append_update(
        &self,
        txn: &DatabaseTransaction,
        update: &TicketUpdate,
    ) -> Result<TicketUpdate, RepositoryError> {
        let model = ticket_update::ActiveModel {
            id: Set(update.id),
            ticket_id: Set(update.ticket_id),
            kind: Set(update.kind.to_string()),
            author_id: Set(update.author.user_id()),
            old_status_id: Set(update.old_status_id),
            new_status_id: Set(update.new_status_id),
            old_priority: Set(update.old_priority.map(|p| p.as_i16())),
            new_priority: Set(update.new_priority.map(|p| p.as_i16())),
            comment: Set(update.comment.clone()),
            created_at: Set(update.created_at),
        }
        .insert(txn)
        .await?;
        model.try_into()
    }

    async fn timeline(
        &self,
        txn: &DatabaseTransaction,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketUpdate>, RepositoryError> {
        ticket_update::Entity::find()
            .filter(ticket_update::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_update::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(TicketUpdate::try_from)
            .collect()
    }
}
