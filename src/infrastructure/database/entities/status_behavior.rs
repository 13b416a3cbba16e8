// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "status_behaviors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub status_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub behavior_id: i32,
    pub target_machine_status_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::status_definition::Entity",
        from = "Column::StatusId",
        to = "super::status_definition::Column::Id",
        on_delete = "Cascade"
    )]
    StatusDefinition,
    #[sea_orm(
        belongs_to = "super::behavior::Entity",
        from = "Column::BehaviorId",
        to = "super::behavior::Column::Id"
    )]
    Behavior,
}

impl Related<super::status_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusDefinition.def()
    }
}

impl Related<super::behavior::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Behavior.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
