// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use ::metrics::{describe_counter, Unit};

/// 注册计数器说明
///
/// 计数器通过 `metrics` 门面发出，由宿主进程安装的记录器收集
pub fn describe_metrics() {
    describe_counter!(
        "uptrack_status_transitions_total",
        Unit::Count,
        "Ticket status transitions committed"
    );
    describe_counter!(
        "uptrack_downtime_logs_opened_total",
        Unit::Count,
        "Downtime logs opened, labelled by category"
    );
    describe_counter!(
        "uptrack_downtime_logs_closed_total",
        Unit::Count,
        "Downtime logs closed"
    );
    describe_counter!(
        "uptrack_tags_applied_total",
        Unit::Count,
        "Machine tags applied, labelled by tag"
    );
    describe_counter!(
        "uptrack_tags_removed_total",
        Unit::Count,
        "Machine tags removed, labelled by tag"
    );
    describe_counter!(
        "uptrack_notifications_failed_total",
        Unit::Count,
        "Notifications that could not be dispatched"
    );
}
