// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::downtime::{DowntimeCategory, DowntimeLog};
use crate::domain::repositories::downtime_repository::DowntimeRepository;
use crate::infrastructure::database::entities::downtime_log;
use crate::infrastructure::database::entities::sea_orm_active_enums::SeaDowntimeCategory;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

/// 停机日志仓库实现
#[derive(Clone, Default)]
pub struct DowntimeRepositoryImpl;

impl DowntimeRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl From<downtime_log::Model> for DowntimeLog {
    fn from(model: downtime_log::Model) -> Self {
        Self {
            id: model.id,
            machine_id: model.machine_id,
            category: model.category.into(),
            start_time: model.start_time,
            end_time: model.end_time,
        }
    }
}

#[async_trait]
impl DowntimeRepository for DowntimeRepositoryImpl {
    async fn find_open(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> Result<Vec<DowntimeLog>, RepositoryError> {
        let logs = downtime_log::Entity::find()
            .filter(downtime_log::Column::MachineId.eq(machine_id))
            .filter(downtime_log::Column::EndTime.is_null())
            .order_by_asc(downtime_log::Column::StartTime)
            .all(txn)
            .await?;
        Ok(logs.into_iter().map(Into::into).collect())
    }

    async fn open(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        category: DowntimeCategory,
        start_time: DateTime<FixedOffset>,
    ) -> Result<DowntimeLog, RepositoryError> {
        let model = downtime_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            machine_id: Set(machine_id),
            category: Set(SeaDowntimeCategory::from(category)),
            start_time: Set(start_time),
            end_time: Set(None),
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn close(
        &self,
        txn: &DatabaseTransaction,
        log_id: Uuid,
        end_time: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        let result = downtime_log::Entity::update_many()
            .col_expr(downtime_log::Column::EndTime, Expr::value(Some(end_time)))
            .filter(downtime_log::Column::Id.eq(log_id))
            .filter(downtime_log::Column::EndTime.is_null())
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::Conflict(format!(
                "downtime log {} is not open",
                log_id
            )));
        }
        Ok(())
    }

    async fn history(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> Result<Vec<DowntimeLog>, RepositoryError> {
        let logs = downtime_log::Entity::find()
            .filter(downtime_log::Column::MachineId.eq(machine_id))
            .order_by_asc(downtime_log::Column::StartTime)
            .all(txn)
            .await?;
        Ok(logs.into_iter().map(Into::into).collect())
    }
}
