// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::ticket::{Ticket, TicketPriority, TicketUpdate};
use crate::utils::errors::RepositoryError;

/// 工单仓库
///
/// 状态与优先级的写入都带版本检查；时间线只追加
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, txn: &DatabaseTransaction, ticket: &Ticket)
        -> Result<Ticket, RepositoryError>;

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<Ticket>, RepositoryError>;

    async fn update_status(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
        status_id: Uuid,
    ) -> Result<Ticket, RepositoryError>;

    async fn update_priority(
        &self,
        txn: &DatabaseTransaction,
        ticket: &Ticket,
        priority: TicketPriority,
    ) -> Result<Ticket, RepositoryError>;

    async fn delete(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<(), RepositoryError>;

    /// 设备上状态不是 `closing_status_id` 的工单，可排除其中一张
    async fn find_open_for_machine(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        closing_status_id: Uuid,
        excluding: Option<Uuid>,
    ) -> Result<Vec<Ticket>, RepositoryError>;

    async fn append_update(
        &self,
        txn: &DatabaseTransaction,
        update: &TicketUpdate,
    ) -> Result<TicketUpdate, RepositoryError>;

    /// 按创建顺序排列的时间线
    async fn timeline(
        &self,
        txn: &DatabaseTransaction,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketUpdate>, RepositoryError>;
}
