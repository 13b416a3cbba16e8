// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tag::{MachineTag, Tag, TagSource};
use crate::domain::repositories::tag_repository::TagRepository;
use crate::infrastructure::database::entities::{machine_tag, tag};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

/// 标签仓库实现
#[derive(Clone, Default)]
pub struct TagRepositoryImpl;

impl TagRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
            icon: model.icon,
        }
    }
}

#[async_trait]
impl TagRepository for TagRepositoryImpl {
    async fn find_tag(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
    ) -> Result<Option<Tag>, RepositoryError> {
        let model = tag::Entity::find()
            .filter(tag::Column::Name.eq(name))
            .one(txn)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn insert_if_absent(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_id: i32,
        source: TagSource,
        applied_at: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let row = machine_tag::ActiveModel {
            machine_id: Set(machine_id),
            tag_id: Set(tag_id),
            source_type: Set(source.source_type().to_string()),
            source_id: Set(source.source_id()),
            applied_at: Set(applied_at),
        };

        let inserted = machine_tag::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    machine_tag::Column::MachineId,
                    machine_tag::Column::TagId,
                    machine_tag::Column::SourceType,
                    machine_tag::Column::SourceId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
        Ok(inserted > 0)
    }

    async fn delete(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        tag_id: i32,
        source: Option<TagSource>,
    ) -> Result<u64, RepositoryError> {
        let mut query = machine_tag::Entity::delete_many()
            .filter(machine_tag::Column::MachineId.eq(machine_id))
            .filter(machine_tag::Column::TagId.eq(tag_id));
        if let Some(source) = source {
            query = query
                .filter(machine_tag::Column::SourceType.eq(source.source_type()))
                .filter(machine_tag::Column::SourceId.eq(source.source_id()));
        }
        Ok(query.exec(txn).await?.rows_affected)
    }

    async fn delete_by_source(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        source: TagSource,
    ) -> Result<u64, RepositoryError> {
        let result = machine_tag::Entity::delete_many()
            .filter(machine_tag::Column::MachineId.eq(machine_id))
            .filter(machine_tag::Column::SourceType.eq(source.source_type()))
            .filter(machine_tag::Column::SourceId.eq(source.source_id()))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn for_machine(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> Result<Vec<MachineTag>, RepositoryError> {
        let rows = machine_tag::Entity::find()
            .filter(machine_tag::Column::MachineId.eq(machine_id))
            .find_also_related(tag::Entity)
            .order_by_asc(machine_tag::Column::AppliedAt)
            .all(txn)
            .await?;

        rows.into_iter()
            .map(|(row, tag)| {
                let tag = tag.ok_or_else(|| {
                    RepositoryError::Corrupt(format!("machine tag references missing tag {}", row.tag_id))
                })?;
                let source = TagSource::from_parts(&row.source_type, row.source_id).ok_or_else(|| {
                    RepositoryError::Corrupt(format!("unknown tag source '{}'", row.source_type))
                })?;
                Ok(MachineTag {
                    machine_id: row.machine_id,
                    tag_id: row.tag_id,
                    tag_name: tag.name,
                    source,
                    applied_at: row.applied_at,
                })
            })
            .collect()
    }
}
