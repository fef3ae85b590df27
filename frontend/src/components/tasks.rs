//! 任务相关页面
//!
//! - `list`: 列表、筛选、批量操作、导出
//! - `form`: 创建 / 编辑共用的表单
//! - `detail`: 详情、附件、评论、提醒
//! - `trash`: 回收站

mod detail;
mod form;
mod list;
mod trash;

pub use detail::TaskDetailPage;
pub use form::TaskFormPage;
pub use list::TaskListPage;
pub use trash::TrashPage;

use leptos::prelude::*;
use taskhub_shared::{Priority, TaskStatus};

#[component]
pub fn StatusBadge(status: TaskStatus) -> impl IntoView {
    let class = match status {
        TaskStatus::Pending => "badge badge-ghost",
        TaskStatus::InProgress => "badge badge-info",
        TaskStatus::Completed => "badge badge-success",
        TaskStatus::Deleted => "badge badge-neutral",
    };
    view! { <span class=class>{status.label()}</span> }
}

#[component]
pub fn PriorityBadge(priority: Priority) -> impl IntoView {
    let class = match priority {
        Priority::High => "badge badge-error badge-outline",
        Priority::Medium => "badge badge-warning badge-outline",
        Priority::Low => "badge badge-outline",
    };
    view! { <span class=class>{priority.label()}</span> }
}

/// 空字符串表示"不限"
fn parse_optional_id(value: &str) -> Option<i64> {
    value.parse().ok()
}
