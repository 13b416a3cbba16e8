// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(#[from] DbErr),

    #[error("未找到数据")]
    NotFound,

    /// 乐观并发检查失败（版本号不匹配）
    #[error("版本冲突: {0}")]
    Conflict(String),

    /// 行中包含无法识别的枚举值等
    #[error("数据损坏: {0}")]
    Corrupt(String),
}

/// 服务层错误类型
///
/// - `Configuration`：管理员配置缺失，必须中止事务并以 5xx 返回
/// - `Validation`：用户输入错误，以 4xx 返回，且不产生任何部分修改
/// - `Conflict`：并发修改，重试后仍失败
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("校验失败 ({field}): {message}")]
    Validation { field: String, message: String },

    #[error("{entity} 不存在: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("并发冲突: {0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn missing_behavior(behavior: impl std::fmt::Display) -> Self {
        ServiceError::Configuration(format!("no status is configured with behavior '{}'", behavior))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ServiceError::Conflict(_) | ServiceError::Repository(RepositoryError::Conflict(_))
        )
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        ServiceError::Repository(RepositoryError::Database(err))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .unwrap_or_default();
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("request".to_string(), errors.to_string()));
        ServiceError::Validation { field, message }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
