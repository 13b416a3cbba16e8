// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::machine::Machine;
use crate::utils::errors::RepositoryError;

/// 设备仓库
#[async_trait]
pub trait MachineRepository: Send + Sync {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        machine: &Machine,
    ) -> Result<Machine, RepositoryError>;

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<Machine>, RepositoryError>;

    /// 读取并锁定设备行（SELECT ... FOR UPDATE），保证同一设备的停机协调线性执行
    async fn lock(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<Machine, RepositoryError>;

    /// 更新设备状态；版本号不匹配时返回 `RepositoryError::Conflict`
    async fn set_status(
        &self,
        txn: &DatabaseTransaction,
        machine: &Machine,
        machine_status_id: Uuid,
    ) -> Result<Machine, RepositoryError>;

    async fn list_ids(&self, txn: &DatabaseTransaction) -> Result<Vec<Uuid>, RepositoryError>;
}
