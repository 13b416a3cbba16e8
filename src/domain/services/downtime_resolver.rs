// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::downtime::{DowntimeCategory, DowntimeLog};
use crate::domain::models::tag::{MachineTag, TagSource, AWAITING_PARTS, OUT_OF_SERVICE};
use crate::domain::repositories::downtime_repository::DowntimeRepository;
use crate::domain::repositories::machine_repository::MachineRepository;
use crate::domain::repositories::tag_repository::TagRepository;
use crate::utils::errors::{RepositoryError, ServiceError, ServiceResult};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 对停机日志的一次写操作
#[derive(Debug, Clone, PartialEq)]
pub enum DowntimeAction {
    Close {
        log_id: Uuid,
        end_time: DateTime<FixedOffset>,
    },
    Open {
        category: DowntimeCategory,
        start_time: DateTime<FixedOffset>,
    },
}

/// 单个停机标签对应的类别；非停机标签返回 `None`
pub fn category_of(tag: &MachineTag) -> Option<DowntimeCategory> {
    match (tag.tag_name.as_str(), tag.source) {
        (OUT_OF_SERVICE, TagSource::Ticket(_)) => Some(DowntimeCategory::Corrective),
        (OUT_OF_SERVICE, TagSource::ScheduledMaintenance(_)) => Some(DowntimeCategory::Preventive),
        (OUT_OF_SERVICE, TagSource::Manual) => Some(DowntimeCategory::Other),
        (AWAITING_PARTS, _) => Some(DowntimeCategory::AwaitingParts),
        _ => None,
    }
}

/// 当前标签集合决定的停机类别，取优先级最高者
///
/// `DowntimeCategory` 的声明顺序即优先级顺序
pub fn classify(tags: &[MachineTag]) -> Option<DowntimeCategory> {
    tags.iter().filter_map(category_of).min()
}

/// 计算使停机日志与标签集合一致所需的写操作
///
/// 纯函数：相同输入得到相同计划，已一致时返回空计划。
/// 存储中出现多条未关闭日志时，较早的一条在下一条的开始时刻关闭。
pub fn plan_downtime(
    tags: &[MachineTag],
    open_logs: &[DowntimeLog],
    now: DateTime<FixedOffset>,
) -> Vec<DowntimeAction> {
    let mut open: Vec<&DowntimeLog> = open_logs.iter().filter(|l| l.is_open()).collect();
    open.sort_by_key(|l| l.start_time);

    let mut actions = Vec::new();
    while open.len() > 1 {
        let stale = open.remove(0);
        actions.push(DowntimeAction::Close {
            log_id: stale.id,
            end_time: open[0].start_time.max(stale.start_time),
        });
    }

    match (open.first(), classify(tags)) {
        (None, None) => {}
        (None, Some(category)) => actions.push(DowntimeAction::Open {
            category,
            start_time: now,
        }),
        (Some(current), None) => actions.push(DowntimeAction::Close {
            log_id: current.id,
            end_time: now.max(current.start_time),
        }),
        (Some(current), Some(category)) if current.category == category => {}
        (Some(current), Some(category)) => {
            let boundary = now.max(current.start_time);
            actions.push(DowntimeAction::Close {
                log_id: current.id,
                end_time: boundary,
            });
            actions.push(DowntimeAction::Open {
                category,
                start_time: boundary,
            });
        }
    }

    actions
}

/// 一次协调的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveOutcome {
    pub opened: u32,
    pub closed: u32,
    /// 协调后的停机类别，`None` 表示设备在运行
    pub category: Option<DowntimeCategory>,
}

impl ResolveOutcome {
    pub fn is_noop(&self) -> bool {
        self.opened == 0 && self.closed == 0
    }
}

/// 全量协调的汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub machines: u32,
    pub changed: u32,
    pub opened: u32,
    pub closed: u32,
    pub down: u32,
}

/// 停机协调器
///
/// 读取设备当前标签，保证每台设备最多一条未关闭的停机日志，且类别正确
pub struct DowntimeResolver {
    db: Arc<DatabaseConnection>,
    machines: Arc<dyn MachineRepository>,
    tags: Arc<dyn TagRepository>,
    logs: Arc<dyn DowntimeRepository>,
}

impl DowntimeResolver {
    pub fn new(
        db: Arc<DatabaseConnection>,
        machines: Arc<dyn MachineRepository>,
        tags: Arc<dyn TagRepository>,
        logs: Arc<dyn DowntimeRepository>,
    ) -> Self {
        Self {
            db,
            machines,
            tags,
            logs,
        }
    }

    /// 在调用方事务中以当前时间协调
    pub async fn resolve(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
    ) -> ServiceResult<ResolveOutcome> {
        self.resolve_at(txn, machine_id, Utc::now().fixed_offset()).await
    }

    pub async fn resolve_at(
        &self,
        txn: &DatabaseTransaction,
        machine_id: Uuid,
        now: DateTime<FixedOffset>,
    ) -> ServiceResult<ResolveOutcome> {
        // 锁住设备行，同一设备的协调按顺序执行
        self.machines
            .lock(txn, machine_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::not_found("machine", machine_id),
                other => other.into(),
            })?;

        let tags = self.tags.for_machine(txn, machine_id).await?;
        let open_logs = self.logs.find_open(txn, machine_id).await?;
        if open_logs.len() > 1 {
            warn!(machine_id = %machine_id, open = open_logs.len(), "Repairing overlapping open downtime logs");
        }

        let plan = plan_downtime(&tags, &open_logs, now);
        let mut outcome = ResolveOutcome {
            category: classify(&tags),
            ..Default::default()
        };

        for action in plan {
            match action {
                DowntimeAction::Close { log_id, end_time } => {
                    self.logs.close(txn, log_id, end_time).await?;
                    outcome.closed += 1;
                    metrics::counter!("uptrack_downtime_logs_closed_total").increment(1);
                    info!(machine_id = %machine_id, log_id = %log_id, end_time = %end_time, "Downtime log closed");
                }
                DowntimeAction::Open {
                    category,
                    start_time,
                } => {
                    let log = self.logs.open(txn, machine_id, category, start_time).await?;
                    outcome.opened += 1;
                    metrics::counter!("uptrack_downtime_logs_opened_total", "category" => category.to_string())
                        .increment(1);
                    info!(machine_id = %machine_id, log_id = %log.id, category = %category, start_time = %start_time, "Downtime log opened");
                }
            }
        }

        if outcome.is_noop() {
            debug!(machine_id = %machine_id, category = ?outcome.category, "Downtime already consistent");
        }
        Ok(outcome)
    }

    /// 在独立事务中协调一台设备
    pub async fn resolve_machine(&self, machine_id: Uuid) -> ServiceResult<ResolveOutcome> {
        let txn = self.db.begin().await?;
        let outcome = self.resolve(&txn, machine_id).await?;
        txn.commit().await?;
        Ok(outcome)
    }

    /// 按开始时间排序的停机历史
    pub async fn downtime_history(&self, machine_id: Uuid) -> ServiceResult<Vec<DowntimeLog>> {
        let txn = self.db.begin().await?;
        let history = self.logs.history(&txn, machine_id).await?;
        txn.commit().await?;
        Ok(history)
    }

    /// 逐台协调所有设备，每台设备一个事务
    pub async fn reconcile_all(&self) -> ServiceResult<ReconcileSummary> {
        let txn = self.db.begin().await?;
        let ids = self.machines.list_ids(&txn).await?;
        txn.commit().await?;

        let mut summary = ReconcileSummary::default();
        for machine_id in ids {
            let outcome = self.resolve_machine(machine_id).await?;
            summary.machines += 1;
            summary.opened += outcome.opened;
            summary.closed += outcome.closed;
            if !outcome.is_noop() {
                summary.changed += 1;
            }
            if outcome.category.is_some() {
                summary.down += 1;
            }
        }

        info!(
            machines = summary.machines,
            changed = summary.changed,
            opened = summary.opened,
            closed = summary.closed,
            down = summary.down,
            "Downtime reconciliation finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "downtime_resolver_test.rs"]
mod tests;
