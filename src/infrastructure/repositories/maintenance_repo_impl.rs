// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::maintenance::{MaintenanceState, ScheduledMaintenance};
use crate::domain::repositories::maintenance_repository::MaintenanceRepository;
use crate::infrastructure::database::entities::scheduled_maintenance;
use crate::infrastructure::database::entities::sea_orm_active_enums::SeaMaintenanceState;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::*;
use uuid::Uuid;

/// 计划维护仓库实现
#[derive(Clone, Default)]
pub struct MaintenanceRepositoryImpl;

impl MaintenanceRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl From<scheduled_maintenance::Model> for ScheduledMaintenance {
    fn from(model: scheduled_maintenance::Model) -> Self {
        Self {
            id: model.id,
            machine_id: model.machine_id,
            title: model.title,
            log_downtime: model.log_downtime,
            state: model.state.into(),
            assigned_to: model.assigned_to,
            due_at: model.due_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            created_at: model.created_at,
        }
    }
}

impl From<&ScheduledMaintenance> for scheduled_maintenance::ActiveModel {
    fn from(maintenance: &ScheduledMaintenance) -> Self {
        Self {
            id: Set(maintenance.id),
            machine_id: Set(maintenance.machine_id),
            title: Set(maintenance.title.clone()),
            log_downtime: Set(maintenance.log_downtime),
            state: Set(SeaMaintenanceState::from(maintenance.state)),
            assigned_to: Set(maintenance.assigned_to),
            due_at: Set(maintenance.due_at),
            started_at: Set(maintenance.started_at),
            completed_at: Set(maintenance.completed_at),
            created_at: Set(maintenance.created_at),
        }
    }
}

#[async_trait]
impl MaintenanceRepository for MaintenanceRepositoryImpl {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        maintenance: &ScheduledMaintenance,
    ) -> Result<ScheduledMaintenance, RepositoryError> {
        let model = scheduled_maintenance::ActiveModel::from(maintenance)
            .insert(txn)
            .await?;
        Ok(model.into())
    }

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<ScheduledMaintenance>, RepositoryError> {
        let model = scheduled_maintenance::Entity::find_by_id(id).one(txn).await?;
        Ok(model.map(Into::into))
    }

    async fn update(
        &self,
        txn: &DatabaseTransaction,
        maintenance: &ScheduledMaintenance,
    ) -> Result<ScheduledMaintenance, RepositoryError> {
        let model = scheduled_maintenance::ActiveModel::from(maintenance)
            .update(txn)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => RepositoryError::NotFound,
                other => RepositoryError::Database(other),
            })?;
        Ok(model.into())
    }

    async fn find_in_progress_for_machine(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        excluding: Option<Uuid>,
    ) -> Result<Vec<ScheduledMaintenance>, RepositoryError> {
        let mut query = scheduled_maintenance::Entity::find()
            .filter(scheduled_maintenance::Column::MachineId.eq(machine_id))
            .filter(
                scheduled_maintenance::Column::State
                    .eq(SeaMaintenanceState::from(MaintenanceState::InProgress)),
            );
        if let Some(excluded) = excluding {
            query = query.filter(scheduled_maintenance::Column::Id.ne(excluded));
        }

        let models = query
            .order_by_asc(scheduled_maintenance::Column::StartedAt)
            .all(txn)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
