// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::downtime::{DowntimeCategory, DowntimeLog};
use crate::utils::errors::RepositoryError;

/// 停机日志仓库
#[async_trait]
pub trait DowntimeRepository: Send + Sync {
    /// 设备未结束的停机日志，按开始时间排序
    async fn find_open(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> Result<Vec<DowntimeLog>, RepositoryError>;

    async fn open(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        category: DowntimeCategory,
        start_time: DateTime<FixedOffset>,
    ) -> Result<DowntimeLog, RepositoryError>;

    async fn close(
        &self,
        txn: &DatabaseTransaction,
        log_id: Uuid,
        end_time: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;

    /// 设备的全部停机日志，按开始时间排序
    async fn history(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> Result<Vec<DowntimeLog>, RepositoryError>;
}
