// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

/// 独占行为的唯一持有者
///
/// 主键为行为本身，因此同一行为在任何时刻只能指向一个状态
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exclusive_behaviors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub behavior_id: i32,
    pub status_id: Uuid,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::behavior::Entity",
        from = "Column::BehaviorId",
        to = "super::behavior::Column::Id",
        on_delete = "Cascade"
    )]
    Behavior,
}

impl Related<super::behavior::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Behavior.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
