// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::inspection::{Inspection, InspectionItem};
use crate::domain::repositories::inspection_repository::InspectionRepository;
use crate::infrastructure::database::entities::{inspection, inspection_item};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

/// 巡检仓库实现
#[derive(Clone, Default)]
pub struct InspectionRepositoryImpl;

impl InspectionRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl From<inspection::Model> for Inspection {
    fn from(model: inspection::Model) -> Self {
        Self {
            id: model.id,
            machine_id: model.machine_id,
            inspector_id: model.inspector_id,
            completed_at: model.completed_at,
            created_at: model.created_at,
        }
    }
}

impl From<inspection_item::Model> for InspectionItem {
    fn from(model: inspection_item::Model) -> Self {
        Self {
            id: model.id,
            inspection_id: model.inspection_id,
            name: model.name,
            outcome_status_id: model.outcome_status_id,
            ticket_id: model.ticket_id,
        }
    }
}

impl From<&InspectionItem> for inspection_item::ActiveModel {
    fn from(item: &InspectionItem) -> Self {
        Self {
            id: Set(item.id),
            inspection_id: Set(item.inspection_id),
            name: Set(item.name.clone()),
            outcome_status_id: Set(item.outcome_status_id),
            ticket_id: Set(item.ticket_id),
        }
    }
}

#[async_trait]
impl InspectionRepository for InspectionRepositoryImpl {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        inspection: &Inspection,
    ) -> Result<Inspection, RepositoryError> {
        let model = inspection::ActiveModel {
            id: Set(inspection.id),
            machine_id: Set(inspection.machine_id),
            inspector_id: Set(inspection.inspector_id),
            completed_at: Set(inspection.completed_at),
            created_at: Set(inspection.created_at),
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<Inspection>, RepositoryError> {
        let model = inspection::Entity::find_by_id(id).one(txn).await?;
        Ok(model.map(Into::into))
    }

    async fn mark_completed(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        completed_at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        let result = inspection::Entity::update_many()
            .col_expr(inspection::Column::CompletedAt, Expr::value(Some(completed_at)))
            .filter(inspection::Column::Id.eq(id))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_item(
        &self,
        txn: &DatabaseTransaction,
        item: &InspectionItem,
    ) -> Result<InspectionItem, RepositoryError> {
        let model = inspection_item::ActiveModel::from(item).insert(txn).await?;
        Ok(model.into())
    }

    async fn find_item(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<InspectionItem>, RepositoryError> {
        let model = inspection_item::Entity::find_by_id(id).one(txn).await?;
        Ok(model.map(Into::into))
    }

    async fn update_item(
        &self,
        txn: &DatabaseTransaction,
        item: &InspectionItem,
    ) -> Result<InspectionItem, RepositoryError> {
        let model = inspection_item::ActiveModel::from(item)
            .update(txn)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => RepositoryError::NotFound,
                other => RepositoryError::Database(other),
            })?;
        Ok(model.into())
    }

    async fn items_for(
        &self,
        txn: &DatabaseTransaction,
        inspection_id: Uuid,
    ) -> Result<Vec<InspectionItem>, RepositoryError> {
        let models = inspection_item::Entity::find()
            .filter(inspection_item::Column::InspectionId.eq(inspection_id))
            .order_by_asc(inspection_item::Column::Name)
            .all(txn)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
