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

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 状态引擎配置
    pub engine: EngineSettings,
    /// 通知配置
    pub notifications: NotificationSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 是否记录每条 SQL
    #[serde(default)]
    pub log_statements: bool,
}

/// 状态引擎配置设置
#[derive(Debug, Deserialize)]
pub struct EngineSettings {
    /// 乐观并发冲突后的重试次数
    pub conflict_retries: u32,
}

/// 通知配置设置
#[derive(Debug, Deserialize)]
pub struct NotificationSettings {
    /// 关闭后使用空派发器
    pub enabled: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `UPTRACK__` 前缀的环境变量
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder(&env)?.build()?.try_deserialize()
    }

    /// 构建配置源，便于在测试中追加覆盖项
    pub fn builder(env: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = Config::builder()
            // Default DB settings
            .set_default("database.url", "sqlite://uptrack.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.log_statements", false)?
            // Engine settings
            .set_default("engine.conflict_retries", 1)?
            // Notification settings
            .set_default("notifications.enabled", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("UPTRACK").separator("__"));

        Ok(builder)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
