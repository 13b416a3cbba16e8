// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::tag::{MachineTag, Tag, TagSource};
use crate::utils::errors::RepositoryError;

/// 标签仓库
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_tag(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
    ) -> Result<Option<Tag>, RepositoryError>;

    /// 写入 `(设备, 标签, 来源)` 三元组，已存在时跳过；返回是否写入
    async fn insert_if_absent(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_id: i32,
        source: TagSource,
        applied_at: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;

    /// 删除匹配的行；来源为 `None` 时匹配所有来源
    async fn delete(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_id: i32,
        source: Option<TagSource>,
    ) -> Result<u64, RepositoryError>;

    /// 删除该来源施加在设备上的全部标签
    async fn delete_by_source(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        source: TagSource,
    ) -> Result<u64, RepositoryError>;

    async fn for_machine(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> Result<Vec<MachineTag>, RepositoryError>;
}
