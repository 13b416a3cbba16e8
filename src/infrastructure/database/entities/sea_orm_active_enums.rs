// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::downtime::DowntimeCategory;
use crate::domain::models::maintenance::MaintenanceState;
use crate::domain::models::status::StatusKind;
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(20))",
    enum_name = "downtime_category"
)]
pub enum SeaDowntimeCategory {
    #[sea_orm(string_value = "Corrective")]
    Corrective,
    #[sea_orm(string_value = "Preventive")]
    Preventive,
    #[sea_orm(string_value = "AwaitingParts")]
    AwaitingParts,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl From<DowntimeCategory> for SeaDowntimeCategory {
    fn from(category: DowntimeCategory) -> Self {
        match category {
            DowntimeCategory::Corrective => SeaDowntimeCategory::Corrective,
            DowntimeCategory::Preventive => SeaDowntimeCategory::Preventive,
            DowntimeCategory::AwaitingParts => SeaDowntimeCategory::AwaitingParts,
            DowntimeCategory::Other => SeaDowntimeCategory::Other,
        }
    }
}

impl From<SeaDowntimeCategory> for DowntimeCategory {
    fn from(category: SeaDowntimeCategory) -> Self {
        match category {
            SeaDowntimeCategory::Corrective => DowntimeCategory::Corrective,
            SeaDowntimeCategory::Preventive => DowntimeCategory::Preventive,
            SeaDowntimeCategory::AwaitingParts => DowntimeCategory::AwaitingParts,
            SeaDowntimeCategory::Other => DowntimeCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(20))",
    enum_name = "maintenance_state"
)]
pub enum SeaMaintenanceState {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<MaintenanceState> for SeaMaintenanceState {
    fn from(state: MaintenanceState) -> Self {
        match state {
            MaintenanceState::Scheduled => SeaMaintenanceState::Scheduled,
            MaintenanceState::InProgress => SeaMaintenanceState::InProgress,
            MaintenanceState::Completed => SeaMaintenanceState::Completed,
        }
    }
}

impl From<SeaMaintenanceState> for MaintenanceState {
    fn from(state: SeaMaintenanceState) -> Self {
        match state {
            SeaMaintenanceState::Scheduled => MaintenanceState::Scheduled,
            SeaMaintenanceState::InProgress => MaintenanceState::InProgress,
            SeaMaintenanceState::Completed => MaintenanceState::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(20))",
    enum_name = "status_kind"
)]
pub enum SeaStatusKind {
    #[sea_orm(string_value = "ticket")]
    Ticket,
    #[sea_orm(string_value = "inspection_outcome")]
    InspectionOutcome,
}

impl From<StatusKind> for SeaStatusKind {
    fn from(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Ticket => SeaStatusKind::Ticket,
            StatusKind::InspectionOutcome => SeaStatusKind::InspectionOutcome,
        }
    }
}

impl From<SeaStatusKind> for StatusKind {
    fn from(kind: SeaStatusKind) -> Self {
        match kind {
            SeaStatusKind::Ticket => StatusKind::Ticket,
            SeaStatusKind::InspectionOutcome => StatusKind::InspectionOutcome,
        }
    }
}
