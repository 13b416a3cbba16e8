// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::machine::Actor;
use crate::domain::models::tag::{MachineTag, Tag, TagSource};
use crate::domain::repositories::tag_repository::TagRepository;
use crate::utils::errors::{ServiceError, ServiceResult};
use chrono::Utc;
use sea_orm::DatabaseTransaction;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 标签生命周期管理
///
/// 按来源幂等地施加和移除设备标签。这里不调用停机协调器，
/// 调用方在修改标签后自行触发协调。
pub struct TagManager {
    repo: Arc<dyn TagRepository>,
}

impl TagManager {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    async fn tag(&self, txn: &DatabaseTransaction, name: &str) -> ServiceResult<Tag> {
        self.repo
            .find_tag(txn, name)
            .await?
            .ok_or_else(|| ServiceError::Configuration(format!("tag '{}' is not in the catalog", name)))
    }

    /// 施加标签；相同 (设备, 标签, 来源) 已存在时不做任何事。返回是否新写入。
    pub async fn apply_tag(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_name: &str,
        source: TagSource,
    ) -> ServiceResult<bool> {
        let tag = self.tag(txn, tag_name).await?;
        let inserted = self
            .repo
            .insert_if_absent(txn, machine_id, tag.id, source, Utc::now().fixed_offset())
            .await?;

        if inserted {
            metrics::counter!("uptrack_tags_applied_total", "tag" => tag.name.clone()).increment(1);
            info!(machine_id = %machine_id, tag = %tag.name, source = %source, "Tag applied");
        } else {
            debug!(machine_id = %machine_id, tag = %tag.name, source = %source, "Tag already present");
        }
        Ok(inserted)
    }

    /// 移除来自指定来源的标签，不影响其他来源施加的同名标签
    pub async fn remove_tag(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_name: &str,
        source: TagSource,
    ) -> ServiceResult<u64> {
        let tag = self.tag(txn, tag_name).await?;
        let removed = self.repo.delete(txn, machine_id, tag.id, Some(source)).await?;
        self.record_removal(machine_id, &tag.name, removed);
        Ok(removed)
    }

    /// 移除所有来源的同名标签
    ///
    /// 可能抹掉其他参与方仍然有效的标签，仅作为有审计记录的管理操作
    pub async fn remove_tag_all_sources(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_name: &str,
        actor: Actor,
    ) -> ServiceResult<u64> {
        let tag = self.tag(txn, tag_name).await?;
        let removed = self.repo.delete(txn, machine_id, tag.id, None).await?;
        warn!(
            machine_id = %machine_id,
            tag = %tag.name,
            actor = %actor,
            removed,
            "Tag removed from every source"
        );
        self.record_removal(machine_id, &tag.name, removed);
        Ok(removed)
    }

    /// 移除某个来源施加在设备上的全部标签
    pub async fn clear_source(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        source: TagSource,
    ) -> ServiceResult<u64> {
        let removed = self.repo.delete_by_source(txn, machine_id, source).await?;
        if removed > 0 {
            metrics::counter!("uptrack_tags_removed_total", "tag" => "*").increment(removed);
            info!(machine_id = %machine_id, source = %source, removed, "Source tags cleared");
        }
        Ok(removed)
    }

    pub async fn active_tags(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> ServiceResult<Vec<MachineTag>> {
        Ok(self.repo.for_machine(txn, machine_id).await?)
    }

    fn record_removal(&self, machine_id: Uuid, tag: &str, removed: u64) {
        if removed > 0 {
            metrics::counter!("uptrack_tags_removed_total", "tag" => tag.to_string()).increment(removed);
            info!(machine_id = %machine_id, tag, removed, "Tag removed");
        } else {
            debug!(machine_id = %machine_id, tag, "Tag not present, nothing to remove");
        }
    }
}
