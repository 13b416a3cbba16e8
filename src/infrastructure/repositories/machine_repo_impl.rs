// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::machine::Machine;
use crate::domain::repositories::machine_repository::MachineRepository;
use crate::infrastructure::database::entities::machine;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

/// 设备仓库实现
#[derive(Clone, Default)]
pub struct MachineRepositoryImpl;

impl MachineRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl From<machine::Model> for Machine {
    fn from(model: machine::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            machine_status_id: model.machine_status_id,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
impl MachineRepository for MachineRepositoryImpl {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        machine: &Machine,
    ) -> Result<Machine, RepositoryError> {
        let model = machine::ActiveModel {
            id: Set(machine.id),
            name: Set(machine.name.clone()),
            machine_status_id: Set(machine.machine_status_id),
            version: Set(machine.version),
            created_at: Set(machine.created_at),
            updated_at: Set(machine.updated_at),
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<Machine>, RepositoryError> {
        let model = machine::Entity::find_by_id(id).one(txn).await?;
        Ok(model.map(Into::into))
    }

    async fn lock(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<Machine, RepositoryError> {
        // SQLite 下 FOR UPDATE 被忽略，写事务本身已串行
        machine::Entity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await?
            .map(Into::into)
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_status(
        &self,
        txn: &DatabaseTransaction,
        machine: &Machine,
        machine_status_id: Uuid,
    ) -> Result<Machine, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let result = machine::Entity::update_many()
            .col_expr(machine::Column::MachineStatusId, Expr::value(Some(machine_status_id)))
            .col_expr(machine::Column::Version, Expr::value(machine.version + 1))
            .col_expr(machine::Column::UpdatedAt, Expr::value(now))
            .filter(machine::Column::Id.eq(machine.id))
            .filter(machine::Column::Version.eq(machine.version))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::Conflict(format!(
                "machine {} changed since version {}",
                machine.id, machine.version
            )));
        }

        Ok(Machine {
            machine_status_id: Some(machine_status_id),
            version: machine.version + 1,
            updated_at: now,
            ..machine.clone()
        })
    }

    async fn list_ids(&self, txn: &DatabaseTransaction) -> Result<Vec<Uuid>, RepositoryError> {
        let ids = machine::Entity::find()
            .select_only()
            .column(machine::Column::Id)
            .order_by_asc(machine::Column::CreatedAt)
            .into_tuple::<Uuid>()
            .all(txn)
            .await?;
        Ok(ids)
    }
}
