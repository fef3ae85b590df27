//! 领域模型 (Domain Models)
//!
//! 结构与后端返回的 JSON 一一对应，字段保持 snake_case。
//! 后端可能缺省的字段统一使用 `#[serde(default)]`。

use crate::date::{flexible, flexible_option};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 为简单的字符串枚举生成 `as_str` / `parse` / `Display`
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $value:literal / $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// 线上传输使用的取值
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            /// 界面上显示的名称
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// 从 `<select>` 的值解析
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fn default_true() -> bool {
    true
}

fn default_theme_color() -> String {
    "#ffffff".to_string()
}

// =========================================================
// 用户 (User)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

string_enum!(UserRole {
    Admin => "admin" / "管理员",
    User => "user" / "普通用户",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

string_enum!(Theme {
    Light => "light" / "浅色",
    Dark => "dark" / "深色",
    Auto => "auto" / "跟随系统",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightBrightness {
    #[default]
    Normal,
    Dim,
    Dark,
}

string_enum!(NightBrightness {
    Normal => "normal" / "正常",
    Dim => "dim" / "柔和",
    Dark => "dark" / "暗",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    /// 旧版接口使用的管理员字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
    #[serde(default)]
    pub night_mode_brightness: NightBrightness,
    #[serde(default = "default_true")]
    pub notification_enabled: bool,
    #[serde(default)]
    pub default_reminder_method: ReminderMethod,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin || self.is_admin == Some(true)
    }

    /// 优先显示昵称
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 管理员创建用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// 个人设置（主题、昵称等）的部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night_mode_brightness: Option<NightBrightness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_reminder_method: Option<ReminderMethod>,
}

/// 只带提示信息的响应，如修改密码、删除账户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =========================================================
// 任务 (Task)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Deleted,
}

string_enum!(TaskStatus {
    Pending => "pending" / "待处理",
    InProgress => "in_progress" / "进行中",
    Completed => "completed" / "已完成",
    Deleted => "deleted" / "已删除",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

string_enum!(Priority {
    High => "high" / "高",
    Medium => "medium" / "中",
    Low => "low" / "低",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// 列表接口会附带分类信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, with = "flexible_option")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_option")]
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<NaiveDateTime>,
    /// 详情接口会附带附件列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// 未完成且截止时间已过
    pub fn is_overdue(&self, now: &NaiveDateTime) -> bool {
        !matches!(self.status, TaskStatus::Completed | TaskStatus::Deleted)
            && self
                .due_date
                .as_ref()
                .is_some_and(|due| crate::date::is_past(due, now))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "flexible_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "flexible_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// 任务列表与 CSV 导出的筛选条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBatchUpdate {
    pub task_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

// =========================================================
// 分类 (Category)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_count: Option<u64>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =========================================================
// 提醒 (Reminder)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    #[default]
    Once,
    Daily,
    Weekly,
    Monthly,
}

string_enum!(ReminderType {
    Once => "once" / "一次",
    Daily => "daily" / "每天",
    Weekly => "weekly" / "每周",
    Monthly => "monthly" / "每月",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    #[default]
    Popup,
    Sound,
    /// 旧版前端称为 "mark"
    #[serde(alias = "mark")]
    Indicator,
}

string_enum!(ReminderMethod {
    Popup => "popup" / "弹窗",
    Sound => "sound" / "声音",
    Indicator => "indicator" / "标记",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub task_id: i64,
    #[serde(with = "flexible")]
    pub reminder_time: NaiveDateTime,
    #[serde(default)]
    pub reminder_type: ReminderType,
    #[serde(default)]
    pub method: ReminderMethod,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderCreate {
    pub task_id: i64,
    #[serde(with = "flexible")]
    pub reminder_time: NaiveDateTime,
    pub reminder_type: ReminderType,
    pub method: ReminderMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(default, with = "flexible_option", skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_type: Option<ReminderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ReminderMethod>,
}

/// 分页参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

// =========================================================
// 评论与附件 (Comment / Attachment)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentCreate {
    pub task_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub task_id: i64,
    pub filename: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default, with = "flexible_option")]
    pub uploaded_at: Option<NaiveDateTime>,
}

// =========================================================
// 统计 (Statistics)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionStats {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub in_progress_tasks: u64,
    pub deleted_tasks: u64,
    /// 百分比，保留两位小数
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStat {
    pub date: String,
    pub created_count: u64,
    pub completed_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryStat {
    pub category_name: String,
    pub task_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverdueStats {
    pub overdue_tasks: u64,
    pub total_tasks: u64,
    pub overdue_rate: f64,
}

/// 优先级 -> 未完成任务数
///
/// 后端的键可能是 "high"，也可能是 "Priority.HIGH"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityStats(pub BTreeMap<String, u64>);

impl PriorityStats {
    pub fn count(&self, priority: Priority) -> u64 {
        let qualified = format!("Priority.{}", priority.as_str().to_uppercase());
        self.0
            .get(priority.as_str())
            .or_else(|| self.0.get(&qualified))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSummary {
    pub task_completion: CompletionStats,
    pub daily_stats: Vec<DailyStat>,
    pub category_stats: Vec<CategoryStat>,
    pub priority_stats: PriorityStats,
    pub overdue_stats: OverdueStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_with_category_decodes_from_list_payload() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "title": "Write report",
            "description": null,
            "due_date": "2024-05-01T10:00:00",
            "priority": "high",
            "category_id": 2,
            "is_public": false,
            "status": "in_progress",
            "owner_id": 1,
            "created_at": "2024-04-01T08:00:00.123456",
            "updated_at": "2024-04-02T08:00:00",
            "category": {"id": 2, "name": "Work", "owner_id": 1, "created_at": "2024-01-01T00:00:00"}
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category.as_ref().map(|c| c.name.as_str()), Some("Work"));
        assert!(task.attachments.is_empty());
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let mut task: Task = serde_json::from_value(json!({
            "id": 1, "title": "t", "due_date": "2024-01-01T00:00:00"
        }))
        .unwrap();
        let now = crate::date::parse("2024-06-01T00:00:00").unwrap();

        assert!(task.is_overdue(&now));
        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(&now));
    }

    #[test]
    fn reminder_method_accepts_legacy_mark() {
        let method: ReminderMethod = serde_json::from_value(json!("mark")).unwrap();
        assert_eq!(method, ReminderMethod::Indicator);
        assert_eq!(serde_json::to_value(method).unwrap(), json!("indicator"));
    }

    #[test]
    fn user_admin_from_role_or_legacy_flag() {
        let admin: User = serde_json::from_value(json!({
            "id": 1, "username": "root", "email": "r@x", "role": "admin"
        }))
        .unwrap();
        let legacy: User = serde_json::from_value(json!({
            "id": 2, "username": "old", "email": "o@x", "is_admin": true
        }))
        .unwrap();
        let plain: User = serde_json::from_value(json!({
            "id": 3, "username": "bob", "email": "b@x", "nickname": ""
        }))
        .unwrap();

        assert!(admin.is_admin());
        assert!(legacy.is_admin());
        assert!(!plain.is_admin());
        assert_eq!(plain.display_name(), "bob");
        assert_eq!(plain.theme_color, "#ffffff");
    }

    #[test]
    fn priority_stats_reads_both_key_styles() {
        let stats: PriorityStats =
            serde_json::from_value(json!({"Priority.HIGH": 3, "medium": 2})).unwrap();
        assert_eq!(stats.count(Priority::High), 3);
        assert_eq!(stats.count(Priority::Medium), 2);
        assert_eq!(stats.count(Priority::Low), 0);
    }

    #[test]
    fn task_update_only_sends_changed_fields() {
        let update = TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"status": "completed"})
        );
    }
}
