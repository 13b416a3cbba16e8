// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use tracing::info;
use uptrack::application::services::AppServices;
use uptrack::config::settings::Settings;
use uptrack::infrastructure::database::connection;
use uptrack::utils::telemetry;

use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 初始化日志与配置，执行迁移，然后对所有设备做一次停机日志协调
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting uptrack...");

    uptrack::infrastructure::metrics::describe_metrics();

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Repair any drift between machine tags and downtime logs
    let services = AppServices::new(db, &settings);
    services.resolver.reconcile_all().await?;
    info!("uptrack shutting down");

    Ok(())
}
