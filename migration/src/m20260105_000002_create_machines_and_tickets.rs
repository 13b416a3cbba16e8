// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::m20260105_000001_create_status_catalog::{MachineStatuses, StatusDefinitions};
use sea_orm_migration::prelude::*;

/// 设备、工单、标签与停机日志迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

/// (name, color, icon)
const TAG_CATALOG: &[(&str, &str, &str)] = &[
    ("under-maintenance", "#f0ad4e", "wrench"),
    ("out-of-service", "#d9534f", "power-off"),
    ("maintenance-overdue", "#c9302c", "clock"),
    ("maintenance-due", "#5bc0de", "calendar"),
    ("awaiting-parts", "#777777", "box"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Machines
        manager
            .create_table(
                Table::create()
                    .table(Machines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Machines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Machines::Name).string().not_null())
                    .col(ColumnDef::new(Machines::MachineStatusId).uuid().null())
                    .col(
                        ColumnDef::new(Machines::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Machines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Machines::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_machines_machine_status")
                            .from(Machines::Table, Machines::MachineStatusId)
                            .to(MachineStatuses::Table, MachineStatuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. Tickets
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tickets::MachineId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::StatusId).uuid().not_null())
                    .col(
                        ColumnDef::new(Tickets::Priority)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Tickets::Description).text().not_null())
                    .col(ColumnDef::new(Tickets::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Tickets::InspectionItemId).uuid().null())
                    .col(
                        ColumnDef::new(Tickets::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_machine")
                            .from(Tickets::Table, Tickets::MachineId)
                            .to(Machines::Table, Machines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_status")
                            .from(Tickets::Table, Tickets::StatusId)
                            .to(StatusDefinitions::Table, StatusDefinitions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_machine_status")
                    .table(Tickets::Table)
                    .col(Tickets::MachineId)
                    .col(Tickets::StatusId)
                    .to_owned(),
            )
            .await?;

        // 3. Ticket timeline (append-only)
        manager
            .create_table(
                Table::create()
                    .table(TicketUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketUpdates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketUpdates::TicketId).uuid().not_null())
                    .col(ColumnDef::new(TicketUpdates::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(TicketUpdates::AuthorId).uuid().null())
                    .col(ColumnDef::new(TicketUpdates::OldStatusId).uuid().null())
                    .col(ColumnDef::new(TicketUpdates::NewStatusId).uuid().null())
                    .col(ColumnDef::new(TicketUpdates::OldPriority).small_integer().null())
                    .col(ColumnDef::new(TicketUpdates::NewPriority).small_integer().null())
                    .col(ColumnDef::new(TicketUpdates::Comment).text().null())
                    .col(
                        ColumnDef::new(TicketUpdates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_updates_ticket")
                            .from(TicketUpdates::Table, TicketUpdates::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_updates_old_status")
                            .from(TicketUpdates::Table, TicketUpdates::OldStatusId)
                            .to(StatusDefinitions::Table, StatusDefinitions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_updates_new_status")
                            .from(TicketUpdates::Table, TicketUpdates::NewStatusId)
                            .to(StatusDefinitions::Table, StatusDefinitions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_updates_ticket_created_at")
                    .table(TicketUpdates::Table)
                    .col(TicketUpdates::TicketId)
                    .col(TicketUpdates::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 4. Tag catalog
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tags::Name).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Tags::Color).string_len(16).not_null())
                    .col(ColumnDef::new(Tags::Icon).string_len(32).not_null())
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Tags::Table)
            .columns([Tags::Name, Tags::Color, Tags::Icon]);
        for (name, color, icon) in TAG_CATALOG {
            seed.values_panic([(*name).into(), (*color).into(), (*icon).into()]);
        }
        manager.exec_stmt(seed.to_owned()).await?;

        // 5. Applied tags. Manual tags carry the nil uuid as source_id so the
        // composite key stays NOT NULL and therefore unique.
        manager
            .create_table(
                Table::create()
                    .table(MachineTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MachineTags::MachineId).uuid().not_null())
                    .col(ColumnDef::new(MachineTags::TagId).integer().not_null())
                    .col(ColumnDef::new(MachineTags::SourceType).string_len(32).not_null())
                    .col(ColumnDef::new(MachineTags::SourceId).uuid().not_null())
                    .col(
                        ColumnDef::new(MachineTags::AppliedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(MachineTags::MachineId)
                            .col(MachineTags::TagId)
                            .col(MachineTags::SourceType)
                            .col(MachineTags::SourceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_machine_tags_machine")
                            .from(MachineTags::Table, MachineTags::MachineId)
                            .to(Machines::Table, Machines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_machine_tags_tag")
                            .from(MachineTags::Table, MachineTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 6. Downtime logs
        manager
            .create_table(
                Table::create()
                    .table(DowntimeLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DowntimeLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DowntimeLogs::MachineId).uuid().not_null())
                    .col(ColumnDef::new(DowntimeLogs::Category).string_len(20).not_null())
                    .col(
                        ColumnDef::new(DowntimeLogs::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DowntimeLogs::EndTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_downtime_logs_machine")
                            .from(DowntimeLogs::Table, DowntimeLogs::MachineId)
                            .to(Machines::Table, Machines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_downtime_logs_machine_start")
                    .table(DowntimeLogs::Table)
                    .col(DowntimeLogs::MachineId)
                    .col(DowntimeLogs::StartTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DowntimeLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MachineTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TicketUpdates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Machines::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Machines {
    Table,
    Id,
    Name,
    MachineStatusId,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Tickets {
    Table,
    Id,
    MachineId,
    StatusId,
    Priority,
    Description,
    CreatedBy,
    InspectionItemId,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TicketUpdates {
    Table,
    Id,
    TicketId,
    Kind,
    AuthorId,
    OldStatusId,
    NewStatusId,
    OldPriority,
    NewPriority,
    Comment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Color,
    Icon,
}

#[derive(DeriveIden)]
enum MachineTags {
    Table,
    MachineId,
    TagId,
    SourceType,
    SourceId,
    AppliedAt,
}

#[derive(DeriveIden)]
enum DowntimeLogs {
    Table,
    Id,
    MachineId,
    Category,
    StartTime,
    EndTime,
}
