// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::behavior::{Behavior, BehaviorKey};
use crate::domain::models::status::{MachineStatus, StatusDefinition, StatusKind};
use crate::domain::repositories::status_repository::StatusRepository;
use crate::infrastructure::database::entities::sea_orm_active_enums::SeaStatusKind;
use crate::infrastructure::database::entities::{
    behavior, exclusive_behavior, inspection_item, machine, machine_status, status_behavior,
    status_definition, ticket,
};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// 状态与行为仓库实现
#[derive(Clone, Default)]
pub struct StatusRepositoryImpl;

impl StatusRepositoryImpl {
    pub fn new() -> Self {
        Self
    }

    /// 行为目录由迁移写入；查不到说明数据库与代码不一致
    async fn behavior_row(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
    ) -> Result<behavior::Model, RepositoryError> {
        behavior::Entity::find()
            .filter(behavior::Column::Name.eq(key.as_str()))
            .one(txn)
            .await?
            .ok_or_else(|| RepositoryError::Corrupt(format!("behavior catalog lacks '{}'", key)))
    }
}

impl From<status_definition::Model> for StatusDefinition {
    fn from(model: status_definition::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind.into(),
            name: model.name,
            severity: model.severity,
            color: model.color,
            text_color: model.text_color,
            created_at: model.created_at,
        }
    }
}

impl From<machine_status::Model> for MachineStatus {
    fn from(model: machine_status::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
            created_at: model.created_at,
        }
    }
}

fn decode_behavior(
    name: &str,
    target_machine_status_id: Option<Uuid>,
) -> Result<Behavior, RepositoryError> {
    let key = name.parse::<BehaviorKey>().map_err(RepositoryError::Corrupt)?;
    Behavior::from_link(key, target_machine_status_id)
        .ok_or_else(|| RepositoryError::Corrupt(format!("behavior '{}' stored without target", key)))
}

#[async_trait]
impl StatusRepository for StatusRepositoryImpl {
    async fn create_status(
        &self,
        txn: &DatabaseTransaction,
        status: &StatusDefinition,
    ) -> Result<StatusDefinition, RepositoryError> {
        let model = status_definition::ActiveModel {
            id: Set(status.id),
            kind: Set(SeaStatusKind::from(status.kind)),
            name: Set(status.name.clone()),
            severity: Set(status.severity),
            color: Set(status.color.clone()),
            text_color: Set(status.text_color.clone()),
            created_at: Set(status.created_at),
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn find_status(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<StatusDefinition>, RepositoryError> {
        let model = status_definition::Entity::find_by_id(id).one(txn).await?;
        Ok(model.map(Into::into))
    }

    async fn list_statuses(
        &self,
        txn: &DatabaseTransaction,
        kind: StatusKind,
    ) -> Result<Vec<StatusDefinition>, RepositoryError> {
        let models = status_definition::Entity::find()
            .filter(status_definition::Column::Kind.eq(SeaStatusKind::from(kind)))
            .order_by_asc(status_definition::Column::Name)
            .all(txn)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn create_machine_status(
        &self,
        txn: &DatabaseTransaction,
        status: &MachineStatus,
    ) -> Result<MachineStatus, RepositoryError> {
        let model = machine_status::ActiveModel {
            id: Set(status.id),
            name: Set(status.name.clone()),
            color: Set(status.color.clone()),
            created_at: Set(status.created_at),
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn find_machine_status(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<MachineStatus>, RepositoryError> {
        let model = machine_status::Entity::find_by_id(id).one(txn).await?;
        Ok(model.map(Into::into))
    }

    async fn list_machine_statuses(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Vec<MachineStatus>, RepositoryError> {
        let models = machine_status::Entity::find()
            .order_by_asc(machine_status::Column::Name)
            .all(txn)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn behaviors_of(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
    ) -> Result<Vec<Behavior>, RepositoryError> {
        let mut behaviors = Vec::new();

        let held = exclusive_behavior::Entity::find()
            .filter(exclusive_behavior::Column::StatusId.eq(status_id))
            .find_also_related(behavior::Entity)
            .all(txn)
            .await?;
        for (holding, row) in held {
            let row = row.ok_or_else(|| {
                RepositoryError::Corrupt(format!("unknown behavior id {}", holding.behavior_id))
            })?;
            behaviors.push(decode_behavior(&row.name, None)?);
        }

        let links = status_behavior::Entity::find()
            .filter(status_behavior::Column::StatusId.eq(status_id))
            .find_also_related(behavior::Entity)
            .order_by_asc(status_behavior::Column::BehaviorId)
            .all(txn)
            .await?;
        for (link, row) in links {
            let row = row.ok_or_else(|| {
                RepositoryError::Corrupt(format!("unknown behavior id {}", link.behavior_id))
            })?;
            behaviors.push(decode_behavior(&row.name, link.target_machine_status_id)?);
        }

        Ok(behaviors)
    }

    async fn statuses_with(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
    ) -> Result<Vec<Uuid>, RepositoryError> {
        let behavior = self.behavior_row(txn, key).await?;

        if key.is_exclusive() {
            let holder = exclusive_behavior::Entity::find_by_id(behavior.id)
                .one(txn)
                .await?;
            return Ok(holder.map(|h| h.status_id).into_iter().collect());
        }

        let links = status_behavior::Entity::find()
            .filter(status_behavior::Column::BehaviorId.eq(behavior.id))
            .order_by_asc(status_behavior::Column::StatusId)
            .all(txn)
            .await?;
        Ok(links.into_iter().map(|l| l.status_id).collect())
    }

    async fn set_exclusive_holder(
        &self,
        txn: &DatabaseTransaction,
        key: BehaviorKey,
        status_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let behavior = self.behavior_row(txn, key).await?;
        let holding = exclusive_behavior::ActiveModel {
            behavior_id: Set(behavior.id),
            status_id: Set(status_id),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        exclusive_behavior::Entity::insert(holding)
            .on_conflict(
                OnConflict::column(exclusive_behavior::Column::BehaviorId)
                    .update_columns([
                        exclusive_behavior::Column::StatusId,
                        exclusive_behavior::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
        Ok(())
    }

    async fn upsert_link(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
        key: BehaviorKey,
        target_machine_status_id: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        let behavior = self.behavior_row(txn, key).await?;
        let link = status_behavior::ActiveModel {
            status_id: Set(status_id),
            behavior_id: Set(behavior.id),
            target_machine_status_id: Set(target_machine_status_id),
        };

        status_behavior::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    status_behavior::Column::StatusId,
                    status_behavior::Column::BehaviorId,
                ])
                .update_column(status_behavior::Column::TargetMachineStatusId)
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
        Ok(())
    }

    async fn detach(
        &self,
        txn: &DatabaseTransaction,
        status_id: Uuid,
        key: BehaviorKey,
    ) -> Result<u64, RepositoryError> {
        let behavior = self.behavior_row(txn, key).await?;

        let result = if key.is_exclusive() {
            exclusive_behavior::Entity::delete_many()
                .filter(exclusive_behavior::Column::BehaviorId.eq(behavior.id))
                .filter(exclusive_behavior::Column::StatusId.eq(status_id))
                .exec(txn)
                .await?
        } else {
            status_behavior::Entity::delete_many()
                .filter(status_behavior::Column::BehaviorId.eq(behavior.id))
                .filter(status_behavior::Column::StatusId.eq(status_id))
                .exec(txn)
                .await?
        };
        Ok(result.rows_affected)
    }

    async fn replace_status(
        &self,
        txn: &DatabaseTransaction,
        from: Uuid,
        to: Uuid,
    ) -> Result<u64, RepositoryError> {
        let mut moved = 0;

        moved += ticket::Entity::update_many()
            .col_expr(ticket::Column::StatusId, Expr::value(to))
            .col_expr(ticket::Column::Version, Expr::col(ticket::Column::Version).add(1))
            .filter(ticket::Column::StatusId.eq(from))
            .exec(txn)
            .await?
            .rows_affected;

        moved += inspection_item::Entity::update_many()
            .col_expr(inspection_item::Column::OutcomeStatusId, Expr::value(Some(to)))
            .filter(inspection_item::Column::OutcomeStatusId.eq(from))
            .exec(txn)
            .await?
            .rows_affected;

        moved += exclusive_behavior::Entity::update_many()
            .col_expr(exclusive_behavior::Column::StatusId, Expr::value(to))
            .filter(exclusive_behavior::Column::StatusId.eq(from))
            .exec(txn)
            .await?
            .rows_affected;

        // 链接行随状态级联删除
        let deleted = status_definition::Entity::delete_by_id(from).exec(txn).await?;
        if deleted.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(moved)
    }

    async fn replace_machine_status(
        &self,
        txn: &DatabaseTransaction,
        from: Uuid,
        to: Uuid,
    ) -> Result<u64, RepositoryError> {
        let mut moved = 0;

        moved += machine::Entity::update_many()
            .col_expr(machine::Column::MachineStatusId, Expr::value(Some(to)))
            .col_expr(machine::Column::Version, Expr::col(machine::Column::Version).add(1))
            .filter(machine::Column::MachineStatusId.eq(from))
            .exec(txn)
            .await?
            .rows_affected;

        moved += status_behavior::Entity::update_many()
            .col_expr(
                status_behavior::Column::TargetMachineStatusId,
                Expr::value(Some(to)),
            )
            .filter(status_behavior::Column::TargetMachineStatusId.eq(from))
            .exec(txn)
            .await?
            .rows_affected;

        moved += exclusive_behavior::Entity::update_many()
            .col_expr(exclusive_behavior::Column::StatusId, Expr::value(to))
            .filter(exclusive_behavior::Column::StatusId.eq(from))
            .exec(txn)
            .await?
            .rows_affected;

        let deleted = machine_status::Entity::delete_by_id(from).exec(txn).await?;
        if deleted.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(moved)
    }
}
