// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "machines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub machine_status_id: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
    #[sea_orm(has_many = "super::machine_tag::Entity")]
    MachineTags,
    #[sea_orm(has_many = "super::downtime_log::Entity")]
    DowntimeLogs,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl Related<super::machine_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MachineTags.def()
    }
}

impl Related<super::downtime_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DowntimeLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
