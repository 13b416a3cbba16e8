// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::{ServiceError, ServiceResult};
use std::future::Future;

/// 乐观并发冲突的重试策略
///
/// 整个操作（含事务）被重新执行；冲突以外的错误立即返回
#[derive(Debug, Clone, Copy)]
pub struct ConflictRetry {
    /// 首次失败后允许的重试次数
    pub max_retries: u32,
}

impl Default for ConflictRetry {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

impl ConflictRetry {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// 执行操作，遇到版本冲突时重跑，次数耗尽后返回 `ServiceError::Conflict`
    pub async fn run<T, F, Fut>(&self, action: &str, mut op: F) -> ServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_conflict() => {
                    if attempt >= self.max_retries {
                        tracing::warn!(action, attempts = attempt + 1, error = %err, "Giving up after concurrent modification");
                        return Err(ServiceError::Conflict(format!("{}: {}", action, err)));
                    }
                    attempt += 1;
                    tracing::debug!(action, attempt, error = %err, "Concurrent modification, retrying");
                }
                other => return other,
            }
        }
    }
}
