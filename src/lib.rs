// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求 DTO 与服务容器
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 基础设施模块
///
/// 数据库、指标与通知发件箱
pub mod infrastructure;

/// 表示层模块
///
/// 服务错误到 HTTP 响应的映射
pub mod presentation;

/// 工具模块
pub mod utils;
