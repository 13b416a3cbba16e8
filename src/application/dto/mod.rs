// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义应用程序层的请求对象，在进入领域服务前用 validator 校验
pub mod inspection_request;
pub mod maintenance_request;
pub mod status_request;
pub mod ticket_request;
