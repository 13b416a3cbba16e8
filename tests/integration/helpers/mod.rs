// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use uptrack::application::dto::status_request::{
    AttachBehaviorRequest, CreateMachineStatusRequest, CreateStatusRequest,
};
use uptrack::application::dto::ticket_request::OpenTicketRequest;
use uptrack::application::services::AppServices;
use uptrack::config::settings::{DatabaseSettings, EngineSettings};
use uptrack::domain::models::downtime::DowntimeLog;
use uptrack::domain::models::machine::{Actor, Machine};
use uptrack::domain::models::notification::{EventKind, Notification};
use uptrack::domain::models::status::{MachineStatus, StatusDefinition, StatusKind};
use uptrack::domain::models::tag::TagSource;
use uptrack::domain::models::ticket::Ticket;
use uptrack::domain::repositories::machine_repository::MachineRepository;
use uptrack::domain::services::notification_dispatcher::NotificationDispatcher;
use uptrack::infrastructure::database::connection;
use uptrack::infrastructure::repositories::machine_repo_impl::MachineRepositoryImpl;

/// 固定日期上的时刻，便于断言时间边界
pub fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2026, 1, 5, hour, minute, 0)
        .unwrap()
        .fixed_offset()
}

/// 记录所有派发的通知，供断言使用
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.event.kind())
            .collect()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: &Notification) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// 种子状态目录
pub struct Catalog {
    pub in_service: MachineStatus,
    pub down: MachineStatus,
    pub under_maintenance: MachineStatus,
    pub open: StatusDefinition,
    pub in_progress: StatusDefinition,
    pub closed: StatusDefinition,
    pub pass: StatusDefinition,
    pub fail_sev1: StatusDefinition,
    pub fail_sev2: StatusDefinition,
}

#[allow(dead_code)]
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub catalog: Option<Catalog>,
    pub user: Uuid,
}

pub async fn connect() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
        log_statements: false,
    };
    let db = connection::create_pool(&settings).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

/// 带完整行为配置的测试应用
pub async fn create_test_app() -> TestApp {
    let mut app = create_bare_app().await;
    app.catalog = Some(seed_catalog(&app.services).await);
    app
}

/// 没有任何状态定义的测试应用，用于验证配置缺失时的行为
pub async fn create_bare_app() -> TestApp {
    let db = connect().await;
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let services = AppServices::with_dispatcher(
        db.clone(),
        &EngineSettings { conflict_retries: 1 },
        dispatcher.clone(),
    );
    TestApp {
        db,
        services,
        dispatcher,
        catalog: None,
        user: Uuid::new_v4(),
    }
}

async fn machine_status(services: &AppServices, name: &str) -> MachineStatus {
    services
        .catalog
        .create_machine_status(CreateMachineStatusRequest {
            name: name.to_string(),
            color: "#5cb85c".to_string(),
        })
        .await
        .unwrap()
}

async fn status(services: &AppServices, kind: StatusKind, name: &str) -> StatusDefinition {
    services
        .catalog
        .create_status(CreateStatusRequest {
            kind,
            name: name.to_string(),
            severity: None,
            color: "#337ab7".to_string(),
            text_color: "#ffffff".to_string(),
        })
        .await
        .unwrap()
}

pub async fn attach(services: &AppServices, status_id: Uuid, behavior: &str, target: Option<Uuid>) {
    services
        .catalog
        .attach_behavior(
            status_id,
            AttachBehaviorRequest {
                behavior: behavior.to_string(),
                target_machine_status_id: target,
            },
        )
        .await
        .unwrap();
}

async fn seed_catalog(services: &AppServices) -> Catalog {
    let in_service = machine_status(services, "In Service").await;
    let down = machine_status(services, "Down").await;
    let under_maintenance = machine_status(services, "Under Maintenance").await;
    attach(services, in_service.id, "is_default_in_service_status", None).await;
    attach(services, under_maintenance.id, "is_under_maintenance_status", None).await;

    let open = status(services, StatusKind::Ticket, "Open").await;
    let in_progress = status(services, StatusKind::Ticket, "In Progress").await;
    let closed = status(services, StatusKind::Ticket, "Closed").await;
    attach(services, open.id, "is_opening_status", None).await;
    attach(services, in_progress.id, "is_in_progress_status", None).await;
    attach(services, in_progress.id, "sets_machine_status", Some(down.id)).await;
    attach(services, closed.id, "is_ticket_closing_status", None).await;

    let pass = status(services, StatusKind::InspectionOutcome, "Pass").await;
    let fail_sev1 = status(services, StatusKind::InspectionOutcome, "Fail (Sev1)").await;
    let fail_sev2 = status(services, StatusKind::InspectionOutcome, "Fail (Sev2)").await;
    attach(services, fail_sev1.id, "creates_ticket_sev1", None).await;
    attach(services, fail_sev2.id, "creates_ticket_sev2", None).await;

    Catalog {
        in_service,
        down,
        under_maintenance,
        open,
        in_progress,
        closed,
        pass,
        fail_sev1,
        fail_sev2,
    }
}

#[allow(dead_code)]
impl TestApp {
    pub fn catalog(&self) -> &Catalog {
        self.catalog.as_ref().expect("catalog not seeded")
    }

    pub fn actor(&self) -> Actor {
        Actor::User(self.user)
    }

    pub async fn create_machine(&self, name: &str) -> Machine {
        let now = Utc::now().fixed_offset();
        let machine = Machine {
            id: Uuid::new_v4(),
            name: name.to_string(),
            machine_status_id: self.catalog.as_ref().map(|c| c.in_service.id),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let txn = self.db.begin().await.unwrap();
        let machine = MachineRepositoryImpl::new().create(&txn, &machine).await.unwrap();
        txn.commit().await.unwrap();
        machine
    }

    pub async fn machine(&self, id: Uuid) -> Machine {
        let txn = self.db.begin().await.unwrap();
        let machine = MachineRepositoryImpl::new()
            .find_by_id(&txn, id)
            .await
            .unwrap()
            .expect("machine exists");
        txn.commit().await.unwrap();
        machine
    }

    /// 设备当前标签，形如 (标签名, 来源)
    pub async fn tags(&self, machine_id: Uuid) -> Vec<(String, TagSource)> {
        let txn = self.db.begin().await.unwrap();
        let tags = self.services.tags.active_tags(&txn, machine_id).await.unwrap();
        txn.commit().await.unwrap();
        tags.into_iter().map(|t| (t.tag_name, t.source)).collect()
    }

    pub async fn history(&self, machine_id: Uuid) -> Vec<DowntimeLog> {
        self.services.resolver.downtime_history(machine_id).await.unwrap()
    }

    pub async fn open_logs(&self, machine_id: Uuid) -> Vec<DowntimeLog> {
        self.history(machine_id)
            .await
            .into_iter()
            .filter(|l| l.is_open())
            .collect()
    }

    pub async fn open_ticket(&self, machine_id: Uuid, machine_down: bool) -> Ticket {
        self.services
            .transitions
            .open_ticket(
                OpenTicketRequest {
                    machine_id,
                    priority: 0,
                    description: "Spindle makes a grinding noise".to_string(),
                    machine_down,
                    inspection_item_id: None,
                },
                self.actor(),
            )
            .await
            .unwrap()
    }
}
