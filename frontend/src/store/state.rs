//! 全局状态与 getters

use chrono::NaiveDateTime;
use taskhub_shared::{
    Attachment, Category, Comment, NightBrightness, ProfileSettingsUpdate, Reminder,
    ReminderMethod, StatisticsSummary, Task, TaskStatus, Theme, User,
};

/// 外观与通知设置
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub theme: Theme,
    pub theme_color: String,
    pub night_mode_brightness: NightBrightness,
    pub notification_enabled: bool,
    pub default_reminder_method: ReminderMethod,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            theme_color: "#ffffff".to_string(),
            night_mode_brightness: NightBrightness::Normal,
            notification_enabled: true,
            default_reminder_method: ReminderMethod::Popup,
        }
    }
}

impl Settings {
    pub fn from_user(user: &User) -> Self {
        Self {
            theme: user.theme,
            theme_color: user.theme_color.clone(),
            night_mode_brightness: user.night_mode_brightness,
            notification_enabled: user.notification_enabled,
            default_reminder_method: user.default_reminder_method,
        }
    }

    /// 合并部分更新，未给出的字段保持不变
    pub fn merge(&mut self, update: &ProfileSettingsUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(color) = &update.theme_color {
            self.theme_color = color.clone();
        }
        if let Some(brightness) = update.night_mode_brightness {
            self.night_mode_brightness = brightness;
        }
        if let Some(enabled) = update.notification_enabled {
            self.notification_enabled = enabled;
        }
        if let Some(method) = update.default_reminder_method {
            self.default_reminder_method = method;
        }
    }

    /// 转成可以提交给 `/settings/profile` 的完整更新
    pub fn to_update(&self) -> ProfileSettingsUpdate {
        ProfileSettingsUpdate {
            theme: Some(self.theme),
            theme_color: Some(self.theme_color.clone()),
            night_mode_brightness: Some(self.night_mode_brightness),
            notification_enabled: Some(self.notification_enabled),
            default_reminder_method: Some(self.default_reminder_method),
            ..Default::default()
        }
    }
}

/// 单个设置项
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    Theme(Theme),
    ThemeColor(String),
    NightBrightness(NightBrightness),
    Notifications(bool),
    ReminderMethod(ReminderMethod),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub users: Vec<User>,
    pub users_total: usize,
    pub tasks: Vec<Task>,
    pub deleted_tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub current_task: Option<Task>,
    /// 当前任务的附件
    pub attachments: Vec<Attachment>,
    /// 当前任务的评论
    pub comments: Vec<Comment>,
    pub reminders: Vec<Reminder>,
    pub settings: Settings,
    pub statistics: Option<StatisticsSummary>,
    /// 进行中的请求数
    pub pending_requests: u32,
}

// =========================================================
// Getters
// =========================================================

impl AppState {
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn all_users(&self) -> &[User] {
        &self.users
    }

    pub fn users_total(&self) -> usize {
        self.users_total
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn overdue_tasks(&self, now: &NaiveDateTime) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_overdue(now)).collect()
    }

    pub fn task_categories(&self) -> &[Category] {
        &self.categories
    }

    /// 按 id 查找分类名
    pub fn category_name(&self, category_id: Option<i64>) -> Option<&str> {
        let id = category_id?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn app_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn task_statistics(&self) -> Option<&StatisticsSummary> {
        self.statistics.as_ref()
    }

    pub fn all_reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn reminders_for_task(&self, task_id: i64) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.task_id == task_id)
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_requests > 0
    }
}
