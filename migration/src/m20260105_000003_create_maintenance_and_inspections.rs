// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::m20260105_000001_create_status_catalog::StatusDefinitions;
use super::m20260105_000002_create_machines_and_tickets::{Machines, Tickets};
use sea_orm_migration::prelude::*;

/// 计划维护、巡检与通知相关表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Scheduled maintenance
        manager
            .create_table(
                Table::create()
                    .table(ScheduledMaintenances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduledMaintenances::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduledMaintenances::MachineId).uuid().not_null())
                    .col(ColumnDef::new(ScheduledMaintenances::Title).string().not_null())
                    .col(
                        ColumnDef::new(ScheduledMaintenances::LogDowntime)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ScheduledMaintenances::State)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduledMaintenances::AssignedTo).uuid().null())
                    .col(
                        ColumnDef::new(ScheduledMaintenances::DueAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledMaintenances::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledMaintenances::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledMaintenances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scheduled_maintenances_machine")
                            .from(ScheduledMaintenances::Table, ScheduledMaintenances::MachineId)
                            .to(Machines::Table, Machines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scheduled_maintenances_machine_state")
                    .table(ScheduledMaintenances::Table)
                    .col(ScheduledMaintenances::MachineId)
                    .col(ScheduledMaintenances::State)
                    .to_owned(),
            )
            .await?;

        // 2. Inspections
        manager
            .create_table(
                Table::create()
                    .table(Inspections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inspections::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Inspections::MachineId).uuid().not_null())
                    .col(ColumnDef::new(Inspections::InspectorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Inspections::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Inspections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_machine")
                            .from(Inspections::Table, Inspections::MachineId)
                            .to(Machines::Table, Machines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. Inspection items
        manager
            .create_table(
                Table::create()
                    .table(InspectionItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InspectionItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InspectionItems::InspectionId).uuid().not_null())
                    .col(ColumnDef::new(InspectionItems::Name).string().not_null())
                    .col(ColumnDef::new(InspectionItems::OutcomeStatusId).uuid().null())
                    .col(ColumnDef::new(InspectionItems::TicketId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspection_items_inspection")
                            .from(InspectionItems::Table, InspectionItems::InspectionId)
                            .to(Inspections::Table, Inspections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspection_items_outcome_status")
                            .from(InspectionItems::Table, InspectionItems::OutcomeStatusId)
                            .to(StatusDefinitions::Table, StatusDefinitions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspection_items_ticket")
                            .from(InspectionItems::Table, InspectionItems::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 4. Channel preferences. machine_id NULL means the global preference.
        manager
            .create_table(
                Table::create()
                    .table(NotificationPreferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationPreferences::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NotificationPreferences::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(NotificationPreferences::EventKind)
                            .string_len(40)
                            .not_null(),
                    )
                    .col(ColumnDef::new(NotificationPreferences::MachineId).uuid().null())
                    .col(ColumnDef::new(NotificationPreferences::Channels).json().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notification_preferences_user_event")
                    .table(NotificationPreferences::Table)
                    .col(NotificationPreferences::UserId)
                    .col(NotificationPreferences::EventKind)
                    .to_owned(),
            )
            .await?;

        // 5. Notification outbox, drained by the external renderer
        manager
            .create_table(
                Table::create()
                    .table(NotificationOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationOutbox::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationOutbox::EventKind)
                            .string_len(40)
                            .not_null(),
                    )
                    .col(ColumnDef::new(NotificationOutbox::RecipientId).uuid().not_null())
                    .col(ColumnDef::new(NotificationOutbox::Channel).string_len(20).not_null())
                    .col(ColumnDef::new(NotificationOutbox::Payload).json().not_null())
                    .col(ColumnDef::new(NotificationOutbox::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(NotificationOutbox::CreatedAt)
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
                    .name("idx_notification_outbox_status_created_at")
                    .table(NotificationOutbox::Table)
                    .col(NotificationOutbox::Status)
                    .col(NotificationOutbox::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationOutbox::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InspectionItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inspections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScheduledMaintenances::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ScheduledMaintenances {
    Table,
    Id,
    MachineId,
    Title,
    LogDowntime,
    State,
    AssignedTo,
    DueAt,
    StartedAt,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Inspections {
    Table,
    Id,
    MachineId,
    InspectorId,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum InspectionItems {
    Table,
    Id,
    InspectionId,
    Name,
    OutcomeStatusId,
    TicketId,
}

#[derive(DeriveIden)]
enum NotificationPreferences {
    Table,
    Id,
    UserId,
    EventKind,
    MachineId,
    Channels,
}

#[derive(DeriveIden)]
enum NotificationOutbox {
    Table,
    Id,
    EventKind,
    RecipientId,
    Channel,
    Payload,
    Status,
    CreatedAt,
}
