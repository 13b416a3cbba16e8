// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::domain::models::inspection::{Inspection, InspectionItem};
use crate::utils::errors::RepositoryError;

/// 巡检仓库
#[async_trait]
pub trait InspectionRepository: Send + Sync {
    async fn create(
        &self,
        txn: &DatabaseTransaction,
        inspection: &Inspection,
    ) -> Result<Inspection, RepositoryError>;

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<Inspection>, RepositoryError>;

    async fn mark_completed(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        completed_at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;

    async fn create_item(
        &self,
        txn: &DatabaseTransaction,
        item: &InspectionItem,
    ) -> Result<InspectionItem, RepositoryError>;

    async fn find_item(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<InspectionItem>, RepositoryError>;

    async fn update_item(
        &self,
        txn: &DatabaseTransaction,
        item: &InspectionItem,
    ) -> Result<InspectionItem, RepositoryError>;

    async fn items_for(
        &self,
        txn: &DatabaseTransaction,
        inspection_id: Uuid,
    ) -> Result<Vec<InspectionItem>, RepositoryError>;
}
