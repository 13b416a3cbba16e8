// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 行为目录与状态定义迁移
///
/// 行为名称是其他代码依赖的稳定契约，因此目录在此处一次性写入
#[derive(DeriveMigrationName)]
pub struct Migration;

/// (name, scope, exclusive)
const BEHAVIOR_CATALOG: &[(&str, &str, bool)] = &[
    ("is_opening_status", "ticket", true),
    ("is_in_progress_status", "ticket", false),
    ("is_ticket_closing_status", "ticket", true),
    ("sets_machine_status", "universal", false),
    ("awaits_critical_parts", "ticket", false),
    ("awaits_non_critical_parts", "ticket", false),
    ("creates_ticket_sev1", "universal", false),
    ("creates_ticket_sev2", "universal", false),
    ("is_default_in_service_status", "machine", true),
    ("is_under_maintenance_status", "machine", true),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Behavior catalog (closed set)
        manager
            .create_table(
                Table::create()
                    .table(Behaviors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Behaviors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Behaviors::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Behaviors::Scope).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Behaviors::Exclusive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Behaviors::Table).columns([
            Behaviors::Name,
            Behaviors::Scope,
            Behaviors::Exclusive,
        ]);
        for (name, scope, exclusive) in BEHAVIOR_CATALOG {
            seed.values_panic([(*name).into(), (*scope).into(), (*exclusive).into()]);
        }
        manager.exec_stmt(seed.to_owned()).await?;

        // 2. Machine statuses
        manager
            .create_table(
                Table::create()
                    .table(MachineStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MachineStatuses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MachineStatuses::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MachineStatuses::Color).string_len(16).not_null())
                    .col(
                        ColumnDef::new(MachineStatuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. Ticket / inspection outcome statuses
        manager
            .create_table(
                Table::create()
                    .table(StatusDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatusDefinitions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StatusDefinitions::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(StatusDefinitions::Name).string().not_null())
                    .col(ColumnDef::new(StatusDefinitions::Severity).integer().null())
                    .col(ColumnDef::new(StatusDefinitions::Color).string_len(16).not_null())
                    .col(
                        ColumnDef::new(StatusDefinitions::TextColor)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StatusDefinitions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_status_definitions_kind_name")
                    .table(StatusDefinitions::Table)
                    .col(StatusDefinitions::Kind)
                    .col(StatusDefinitions::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 4. Non-exclusive behavior links
        manager
            .create_table(
                Table::create()
                    .table(StatusBehaviors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StatusBehaviors::StatusId).uuid().not_null())
                    .col(ColumnDef::new(StatusBehaviors::BehaviorId).integer().not_null())
                    .col(
                        ColumnDef::new(StatusBehaviors::TargetMachineStatusId)
                            .uuid()
                            .null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(StatusBehaviors::StatusId)
                            .col(StatusBehaviors::BehaviorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_behaviors_status")
                            .from(StatusBehaviors::Table, StatusBehaviors::StatusId)
                            .to(StatusDefinitions::Table, StatusDefinitions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_behaviors_behavior")
                            .from(StatusBehaviors::Table, StatusBehaviors::BehaviorId)
                            .to(Behaviors::Table, Behaviors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_behaviors_target")
                            .from(StatusBehaviors::Table, StatusBehaviors::TargetMachineStatusId)
                            .to(MachineStatuses::Table, MachineStatuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 5. Exclusive behavior holders: one row per behavior, so a behavior can
        // only ever point at a single status.
        manager
            .create_table(
                Table::create()
                    .table(ExclusiveBehaviors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExclusiveBehaviors::BehaviorId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExclusiveBehaviors::StatusId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExclusiveBehaviors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exclusive_behaviors_behavior")
                            .from(ExclusiveBehaviors::Table, ExclusiveBehaviors::BehaviorId)
                            .to(Behaviors::Table, Behaviors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExclusiveBehaviors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusBehaviors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusDefinitions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MachineStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Behaviors::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Behaviors {
    Table,
    Id,
    Name,
    Scope,
    Exclusive,
}

#[derive(DeriveIden)]
pub enum MachineStatuses {
    Table,
    Id,
    Name,
    Color,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum StatusDefinitions {
    Table,
    Id,
    Kind,
    Name,
    Severity,
    Color,
    TextColor,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StatusBehaviors {
    Table,
    StatusId,
    BehaviorId,
    TargetMachineStatusId,
}

#[derive(DeriveIden)]
enum ExclusiveBehaviors {
    Table,
    BehaviorId,
    StatusId,
    UpdatedAt,
}
