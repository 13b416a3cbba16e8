// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::status_request::{
    AttachBehaviorRequest, CreateMachineStatusRequest, CreateStatusRequest,
};
use crate::domain::models::behavior::{BehaviorKey, BehaviorScope};
use crate::domain::models::status::{
    MachineStatus, StatusDefinition, StatusKind, StatusWithBehaviors,
};
use crate::domain::repositories::status_repository::StatusRepository;
use crate::utils::errors::{ServiceError, ServiceResult};
use chrono::Utc;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// 行为注册表与状态定义服务
///
/// 带 `txn` 参数的方法在调用方事务中执行，供其他服务组合；
/// 其余为管理员操作，各自开启并提交一个事务。
pub struct StatusCatalog {
    db: Arc<DatabaseConnection>,
    repo: Arc<dyn StatusRepository>,
}

impl StatusCatalog {
    pub fn new(db: Arc<DatabaseConnection>, repo: Arc<dyn StatusRepository>) -> Self {
        Self { db, repo }
    }

    /// 查找配置了指定行为的状态定义
    ///
    /// 没有任何状态持有该行为属于部署配置错误，返回 `ServiceError::Configuration`
    pub async fn find_status_by_behavior(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
    ) -> ServiceResult<StatusDefinition> {
        let holders = self.repo.statuses_with(txn, key).await?;
        if holders.len() > 1 {
            warn!(behavior = %key, holders = holders.len(), "Behavior held by several statuses, using the first");
        }
        for id in holders {
            if let Some(status) = self.repo.find_status(txn, id).await? {
                return Ok(status);
            }
        }
        Err(ServiceError::missing_behavior(key))
    }

    /// 查找配置了指定设备行为的设备状态
    pub async fn find_machine_status_by_behavior(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
    ) -> ServiceResult<MachineStatus> {
        for id in self.repo.statuses_with(txn, key).await? {
            if let Some(status) = self.repo.find_machine_status(txn, id).await? {
                return Ok(status);
            }
        }
        Err(ServiceError::missing_behavior(key))
    }

    /// 当前持有该行为的状态 ID；没有持有者时返回空列表而不报错
    pub async fn holders_of(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
    ) -> ServiceResult<Vec<Uuid>> {
        Ok(self.repo.statuses_with(txn, key).await?)
    }

    /// 读取状态定义及其行为；状态不存在时返回 `None`
    pub async fn load_status(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
    ) -> ServiceResult<Option<StatusWithBehaviors>> {
        let Some(status) = self.repo.find_status(txn, status_id).await? else {
            return Ok(None);
        };
        let behaviors = self.repo.behaviors_of(txn, status_id).await?;
        Ok(Some(StatusWithBehaviors { status, behaviors }))
    }

    pub async fn find_machine_status(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> ServiceResult<Option<MachineStatus>> {
        Ok(self.repo.find_machine_status(txn, id).await?)
    }

    pub async fn behaviors_of(&self, status_id: Uuid) -> ServiceResult<StatusWithBehaviors> {
        let txn = self.db.begin().await?;
        let status = self
            .load_status(&txn, status_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("status", status_id))?;
        txn.commit().await?;
        Ok(status)
    }

    pub async fn list_statuses(&self, kind: StatusKind) -> ServiceResult<Vec<StatusDefinition>> {
        let txn = self.db.begin().await?;
        let statuses = self.repo.list_statuses(&txn, kind).await?;
        txn.commit().await?;
        Ok(statuses)
    }

    pub async fn create_status(&self, request: CreateStatusRequest) -> ServiceResult<StatusDefinition> {
        request.validate()?;
        let txn = self.db.begin().await?;

        let name = request.name.trim().to_string();
        let existing = self.repo.list_statuses(&txn, request.kind).await?;
        if existing.iter().any(|s| s.name.eq_ignore_ascii_case(&name)) {
            return Err(ServiceError::validation(
                "name",
                format!("a {} status named '{}' already exists", request.kind, name),
            ));
        }

        let status = StatusDefinition {
            id: Uuid::new_v4(),
            kind: request.kind,
            name,
            severity: request.severity,
            color: request.color,
            text_color: request.text_color,
            created_at: Utc::now().fixed_offset(),
        };
        let status = self.repo.create_status(&txn, &status).await?;
        txn.commit().await?;

        info!(status_id = %status.id, kind = %status.kind, name = %status.name, "Status created");
        Ok(status)
    }

    pub async fn create_machine_status(
        &self,
        request: CreateMachineStatusRequest,
    ) -> ServiceResult<MachineStatus> {
        request.validate()?;
        let txn = self.db.begin().await?;

        let name = request.name.trim().to_string();
        let existing = self.repo.list_machine_statuses(&txn).await?;
        if existing.iter().any(|s| s.name.eq_ignore_ascii_case(&name)) {
            return Err(ServiceError::validation(
                "name",
                format!("a machine status named '{}' already exists", name),
            ));
        }

        let status = MachineStatus {
            id: Uuid::new_v4(),
            name,
            color: request.color,
            created_at: Utc::now().fixed_offset(),
        };
        let status = self.repo.create_machine_status(&txn, &status).await?;
        txn.commit().await?;

        info!(machine_status_id = %status.id, name = %status.name, "Machine status created");
        Ok(status)
    }

    /// 为状态挂载行为
    ///
    /// 独占行为通过单例表整体替换持有者，旧持有者在同一事务中被解除
    pub async fn attach_behavior(
        &self,
        status_id: Uuid,
        request: AttachBehaviorRequest,
    ) -> ServiceResult<()> {
        request.validate()?;
        let key = request
            .key()
            .ok_or_else(|| ServiceError::validation("behavior", "unknown behavior"))?;

        let txn = self.db.begin().await?;
        self.check_scope(&txn, status_id, key).await?;

        let target = match (key.requires_machine_status(), request.target_machine_status_id) {
            (true, None) => {
                return Err(ServiceError::validation(
                    "target_machine_status_id",
                    format!("'{}' requires a target machine status", key),
                ))
            }
            (true, Some(target)) => {
                if self.repo.find_machine_status(&txn, target).await?.is_none() {
                    return Err(ServiceError::validation(
                        "target_machine_status_id",
                        "unknown machine status",
                    ));
                }
                Some(target)
            }
            (false, Some(_)) => {
                return Err(ServiceError::validation(
                    "target_machine_status_id",
                    format!("'{}' does not take a target machine status", key),
                ))
            }
            (false, None) => None,
        };

        if key.is_exclusive() {
            let previous = self.repo.statuses_with(&txn, key).await?;
            self.repo.set_exclusive_holder(&txn, key, status_id).await?;
            txn.commit().await?;
            info!(
                behavior = %key,
                status_id = %status_id,
                previous = ?previous.first(),
                "Exclusive behavior moved"
            );
        } else {
            self.repo.upsert_link(&txn, status_id, key, target).await?;
            txn.commit().await?;
            info!(behavior = %key, status_id = %status_id, "Behavior attached");
        }
        Ok(())
    }

    /// 解除行为；返回是否确有解除
    pub async fn detach_behavior(&self, status_id: Uuid, key: BehaviorKey) -> ServiceResult<bool> {
        let txn = self.db.begin().await?;
        let removed = self.repo.detach(&txn, status_id, key).await?;
        txn.commit().await?;

        if removed > 0 {
            info!(behavior = %key, status_id = %status_id, "Behavior detached");
        }
        Ok(removed > 0)
    }

    /// 删除状态定义，所有引用先改指向替代状态
    pub async fn delete_status(&self, status_id: Uuid, replacement_id: Uuid) -> ServiceResult<u64> {
        if status_id == replacement_id {
            return Err(ServiceError::validation(
                "replacement_id",
                "replacement must differ from the deleted status",
            ));
        }

        let txn = self.db.begin().await?;
        let status = self
            .repo
            .find_status(&txn, status_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("status", status_id))?;
        let replacement = self
            .repo
            .find_status(&txn, replacement_id)
            .await?
            .ok_or_else(|| ServiceError::validation("replacement_id", "unknown status"))?;
        if replacement.kind != status.kind {
            return Err(ServiceError::validation(
                "replacement_id",
                format!("replacement must be a {} status", status.kind),
            ));
        }

        // 改指向不经过行为评估，不能借此关闭工单
        let closing = self
            .repo
            .statuses_with(&txn, BehaviorKey::IsTicketClosingStatus)
            .await?;
        if closing.contains(&replacement_id) && !closing.contains(&status_id) {
            return Err(ServiceError::validation(
                "replacement_id",
                "replacement is the closing status; close the tickets through a status change instead",
            ));
        }

        let moved = self.repo.replace_status(&txn, status_id, replacement_id).await?;
        txn.commit().await?;

        info!(status_id = %status_id, replacement_id = %replacement_id, reassigned = moved, "Status deleted");
        Ok(moved)
    }

    pub async fn delete_machine_status(
        &self,
        status_id: Uuid,
        replacement_id: Uuid,
    ) -> ServiceResult<u64> {
        if status_id == replacement_id {
            return Err(ServiceError::validation(
                "replacement_id",
                "replacement must differ from the deleted status",
            ));
        }

        let txn = self.db.begin().await?;
        if self.repo.find_machine_status(&txn, status_id).await?.is_none() {
            return Err(ServiceError::not_found("machine status", status_id));
        }
        if self.repo.find_machine_status(&txn, replacement_id).await?.is_none() {
            return Err(ServiceError::validation("replacement_id", "unknown machine status"));
        }

        let moved = self
            .repo
            .replace_machine_status(&txn, status_id, replacement_id)
            .await?;
        txn.commit().await?;

        info!(machine_status_id = %status_id, replacement_id = %replacement_id, reassigned = moved, "Machine status deleted");
        Ok(moved)
    }

    async fn check_scope(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
        key: BehaviorKey,
    ) -> ServiceResult<()> {
        if key.scope() == BehaviorScope::Machine {
            return match self.repo.find_machine_status(txn, status_id).await? {
                Some(_) => Ok(()),
                None => Err(ServiceError::validation(
                    "behavior",
                    format!("'{}' can only be attached to a machine status", key),
                )),
            };
        }

        let status = self
            .repo
            .find_status(txn, status_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("status", status_id))?;
        if !status.kind.accepts(key.scope()) {
            return Err(ServiceError::validation(
                "behavior",
                format!("'{}' cannot be attached to a {} status", key, status.kind),
            ));
        }
        Ok(())
    }
}
