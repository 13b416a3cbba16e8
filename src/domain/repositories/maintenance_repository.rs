// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::maintenance::ScheduledMaintenance;
use crate::utils::errors::RepositoryError;

/// 计划维护仓库
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        maintenance: &ScheduledMaintenance,
    ) -> Result<ScheduledMaintenance, RepositoryError>;

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<ScheduledMaintenance>, RepositoryError>;

    /// 保存状态与时间戳
    async fn update(
        &self,
        txn: &DatabaseTransaction,
        maintenance: &ScheduledMaintenance,
    ) -> Result<ScheduledMaintenance, RepositoryError>;

    async fn find_in_progress_for_machine(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        excluding: Option<Uuid>,
    ) -> Result<Vec<ScheduledMaintenance>, RepositoryError>;
}
