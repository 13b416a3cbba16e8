// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{EngineSettings, Settings};
use crate::domain::services::downtime_resolver::DowntimeResolver;
use crate::domain::services::inspection_service::InspectionService;
use crate::domain::services::machine_state::MachineStateService;
use crate::domain::services::maintenance_service::MaintenanceService;
use crate::domain::services::notification_dispatcher::{NoopDispatcher, NotificationDispatcher};
use crate::domain::services::status_catalog::StatusCatalog;
use crate::domain::services::status_transition::StatusTransitionService;
use crate::domain::services::tag_manager::TagManager;
use crate::infrastructure::notifications::outbox_dispatcher::OutboxNotificationDispatcher;
use crate::infrastructure::repositories::downtime_repo_impl::DowntimeRepositoryImpl;
use crate::infrastructure::repositories::inspection_repo_impl::InspectionRepositoryImpl;
use crate::infrastructure::repositories::machine_repo_impl::MachineRepositoryImpl;
use crate::infrastructure::repositories::maintenance_repo_impl::MaintenanceRepositoryImpl;
use crate::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
use crate::infrastructure::repositories::status_repo_impl::StatusRepositoryImpl;
use crate::infrastructure::repositories::tag_repo_impl::TagRepositoryImpl;
use crate::infrastructure::repositories::ticket_repo_impl::TicketRepositoryImpl;
use crate::utils::retry_policy::ConflictRetry;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

/// 应用服务容器
///
/// 组装全部仓库与领域服务，表示层和后台任务通过它访问业务操作
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<StatusCatalog>,
    pub tags: Arc<TagManager>,
    pub resolver: Arc<DowntimeResolver>,
    pub machine_state: Arc<MachineStateService>,
    pub transitions: Arc<StatusTransitionService>,
    pub maintenance: Arc<MaintenanceService>,
    pub inspections: Arc<InspectionService>,
}

impl AppServices {
    /// 按配置选择通知派发器并组装服务
    pub fn new(db: Arc<DatabaseConnection>, settings: &Settings) -> Self {
        let dispatcher: Arc<dyn NotificationDispatcher> = if settings.notifications.enabled {
            Arc::new(OutboxNotificationDispatcher::new(Arc::new(
                NotificationRepositoryImpl::new(db.clone()),
            )))
        } else {
            info!("Notifications disabled");
            Arc::new(NoopDispatcher)
        };
        Self::with_dispatcher(db, &settings.engine, dispatcher)
    }

    pub fn with_dispatcher(
        db: Arc<DatabaseConnection>,
        engine: &EngineSettings,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let retry = ConflictRetry::new(engine.conflict_retries);

        let status_repo = Arc::new(StatusRepositoryImpl::new());
        let machine_repo = Arc::new(MachineRepositoryImpl::new());
        let ticket_repo = Arc::new(TicketRepositoryImpl::new());
        let tag_repo = Arc::new(TagRepositoryImpl::new());
        let downtime_repo = Arc::new(DowntimeRepositoryImpl::new());

        let catalog = Arc::new(StatusCatalog::new(db.clone(), status_repo));
        let tags = Arc::new(TagManager::new(tag_repo.clone()));
        let resolver = Arc::new(DowntimeResolver::new(
            db.clone(),
            machine_repo.clone(),
            tag_repo,
            downtime_repo,
        ));
        let machine_state = Arc::new(MachineStateService::new(
            catalog.clone(),
            machine_repo,
            ticket_repo.clone(),
        ));
        let transitions = Arc::new(StatusTransitionService::new(
            db.clone(),
            catalog.clone(),
            ticket_repo,
            machine_state.clone(),
            tags.clone(),
            resolver.clone(),
            dispatcher.clone(),
            retry,
        ));
        let maintenance = Arc::new(MaintenanceService::new(
            db.clone(),
            Arc::new(MaintenanceRepositoryImpl::new()),
            catalog.clone(),
            machine_state.clone(),
            tags.clone(),
            resolver.clone(),
            dispatcher.clone(),
            retry,
        ));
        let inspections = Arc::new(InspectionService::new(
            db,
            Arc::new(InspectionRepositoryImpl::new()),
            catalog.clone(),
            machine_state.clone(),
            transitions.clone(),
            resolver.clone(),
            dispatcher,
            retry,
        ));

        Self {
            catalog,
            tags,
            resolver,
            machine_state,
            transitions,
            maintenance,
            inspections,
        }
    }
}
