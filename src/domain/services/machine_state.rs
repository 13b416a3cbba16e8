// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::behavior::{Behavior, BehaviorKey};
use crate::domain::models::machine::{Actor, Machine};
use crate::domain::models::ticket::{TicketUpdate, TicketUpdateKind};
use crate::domain::repositories::machine_repository::MachineRepository;
use crate::domain::repositories::ticket_repository::TicketRepository;
use crate::domain::services::status_catalog::StatusCatalog;
use crate::utils::errors::{RepositoryError, ServiceError, ServiceResult};
use sea_orm::DatabaseTransaction;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 设备显示状态的唯一写入口
///
/// 每次设备状态改变都会在该设备所有未关闭工单上追加一条系统时间线记录
pub struct MachineStateService {
    catalog: Arc<StatusCatalog>,
    machines: Arc<dyn MachineRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl MachineStateService {
    pub fn new(
        catalog: Arc<StatusCatalog>,
        machines: Arc<dyn MachineRepository>,
        tickets: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            catalog,
            machines,
            tickets,
        }
    }

    /// 读取并锁定设备
    pub async fn lock(&self, txn: &DatabaseTransaction, machine_id: Uuid) -> ServiceResult<Machine> {
        self.machines
            .lock(txn, machine_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::not_found("machine", machine_id),
                other => other.into(),
            })
    }

    /// 设置设备状态
    ///
    /// `trigger` 为触发该变更的工单，即使它已处于关闭状态也会被记录
    pub async fn set_status(
        &self,
        txn: &DatabaseTransaction,
        machine: Machine,
        machine_status_id: Uuid,
        trigger: Option<Uuid>,
        cause: &str,
    ) -> ServiceResult<Machine> {
        if machine.machine_status_id == Some(machine_status_id) {
            debug!(machine_id = %machine.id, machine_status_id = %machine_status_id, "Machine already in status");
            return Ok(machine);
        }

        let status = self
            .catalog
            .find_machine_status(txn, machine_status_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Configuration(format!("machine status {} does not exist", machine_status_id))
            })?;
        let previous = machine.machine_status_id;
        let machine = self.machines.set_status(txn, &machine, status.id).await?;

        let closing = self.closing_status_id(txn).await?;
        let mut affected: Vec<Uuid> = self
            .tickets
            .find_open_for_machine(txn, machine.id, closing, trigger)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        if let Some(trigger) = trigger {
            affected.insert(0, trigger);
        }

        let note = format!("Machine status changed to '{}' ({})", status.name, cause);
        for ticket_id in &affected {
            let entry = TicketUpdate::new(*ticket_id, TicketUpdateKind::System, Actor::System)
                .with_comment(Some(note.clone()));
            self.tickets.append_update(txn, &entry).await?;
        }

        info!(
            machine_id = %machine.id,
            from = ?previous,
            to = %status.id,
            status = %status.name,
            tickets = affected.len(),
            cause,
            "Machine status changed"
        );
        Ok(machine)
    }

    /// 若设备上没有其他未关闭工单，则恢复为默认在役状态
    pub async fn return_to_service(
        &self,
        txn: &DatabaseTransaction,
        machine: Machine,
        closed_ticket: Uuid,
    ) -> ServiceResult<Machine> {
        let closing = self
            .catalog
            .find_status_by_behavior(txn, BehaviorKey::IsTicketClosingStatus)
            .await?;
        let others = self
            .tickets
            .find_open_for_machine(txn, machine.id, closing.id, Some(closed_ticket))
            .await?;
        if !others.is_empty() {
            debug!(machine_id = %machine.id, open_tickets = others.len(), "Machine keeps its status, other tickets open");
            return Ok(machine);
        }

        let in_service = self
            .catalog
            .find_machine_status_by_behavior(txn, BehaviorKey::IsDefaultInServiceStatus)
            .await?;
        self.set_status(txn, machine, in_service.id, Some(closed_ticket), "last open ticket closed")
            .await
    }

    /// 维护结束后重新确定设备状态
    ///
    /// 未关闭工单优先：沿用最早一张其状态带有 `sets_machine_status` 的工单所设定的
    /// 设备状态，都没有时保持不变；没有未关闭工单时恢复默认在役状态
    pub async fn settle_after_maintenance(
        &self,
        txn: &DatabaseTransaction,
        machine: Machine,
    ) -> ServiceResult<Machine> {
        let closing = self.closing_status_id(txn).await?;
        let open = self
            .tickets
            .find_open_for_machine(txn, machine.id, closing, None)
            .await?;

        if open.is_empty() {
            let in_service = self
                .catalog
                .find_machine_status_by_behavior(txn, BehaviorKey::IsDefaultInServiceStatus)
                .await?;
            return self
                .set_status(txn, machine, in_service.id, None, "maintenance submitted")
                .await;
        }

        for ticket in &open {
            let Some(status) = self.catalog.load_status(txn, ticket.status_id).await? else {
                continue;
            };
            let target = status.behaviors.iter().find_map(|b| match b {
                Behavior::SetsMachineStatus(target) => Some(*target),
                _ => None,
            });
            if let Some(target) = target {
                return self
                    .set_status(txn, machine, target, None, "maintenance submitted, ticket still open")
                    .await;
            }
        }

        debug!(machine_id = %machine.id, open_tickets = open.len(), "Machine keeps its status after maintenance");
        Ok(machine)
    }

    /// 当前关闭状态；未配置时返回 nil，使所有工单都视为未关闭
    async fn closing_status_id(&self, txn: &DatabaseTransaction) -> ServiceResult<Uuid> {
        Ok(self
            .catalog
            .holders_of(txn, BehaviorKey::IsTicketClosingStatus)
            .await?
            .first()
            .copied()
            .unwrap_or(Uuid::nil()))
    }
}
