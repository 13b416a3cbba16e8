// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::sea_orm_active_enums::SeaStatusKind;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "status_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: SeaStatusKind,
    pub name: String,
    pub severity: Option<i32>,
    pub color: String,
    pub text_color: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::status_behavior::Entity")]
    StatusBehaviors,
}

impl Related<super::status_behavior::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusBehaviors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
