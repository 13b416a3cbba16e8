// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::behavior::{Behavior, BehaviorKey};
use crate::domain::models::status::{MachineStatus, StatusDefinition, StatusKind};
use crate::utils::errors::RepositoryError;

/// 状态定义与行为链接仓库
///
/// 所有方法都在调用方的事务中执行
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// 创建工单状态或巡检结果状态
    async fn create_status(
        &self,
        txn: &DatabaseTransaction,
        status: &StatusDefinition,
    ) -> Result<StatusDefinition, RepositoryError>;

    async fn find_status(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<StatusDefinition>, RepositoryError>;

    async fn list_statuses(
        &self,
        txn: &DatabaseTransaction,
        kind: StatusKind,
    ) -> Result<Vec<StatusDefinition>, RepositoryError>;

    async fn create_machine_status(
        &self,
        txn: &DatabaseTransaction,
        status: &MachineStatus,
    ) -> Result<MachineStatus, RepositoryError>;

    async fn find_machine_status(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<MachineStatus>, RepositoryError>;

    async fn list_machine_statuses(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Vec<MachineStatus>, RepositoryError>;

    /// 状态上挂载的已解析行为，包含独占行为
    async fn behaviors_of(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
    ) -> Result<Vec<Behavior>, RepositoryError>;

    /// 持有该行为的状态，按链接顺序
    async fn statuses_with(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
    ) -> Result<Vec<Uuid>, RepositoryError>;

    /// 替换独占行为的唯一持有者
    async fn set_exclusive_holder(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
        status_id: Uuid,
    ) -> Result<(), RepositoryError>;

    async fn upsert_link(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
        key: BehaviorKey,
        target_machine_status_id: Option<Uuid>,
    ) -> Result<(), RepositoryError>;

    /// 从状态上解除行为（独占与否均可），返回删除的行数
    async fn detach(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
        key: BehaviorKey,
    ) -> Result<u64, RepositoryError>;

    /// 把所有引用 `from` 的行改指向 `to`，然后删除 `from`
    async fn replace_status(
        &self,
        txn: &DatabaseTransaction,
        from: Uuid,
        to: Uuid,
    ) -> Result<u64, RepositoryError>;

    async fn replace_machine_status(
        &self,
        txn: &DatabaseTransaction,
        from: Uuid,
        to: Uuid,
    ) -> Result<u64, RepositoryError>;
}
