//! Mutations
//!
//! 同步、具名的状态变更。更新类 mutation 按 id 替换元素，找不到时列表保持不变。

use taskhub_shared::{
    Attachment, Category, Comment, ProfileSettingsUpdate, Reminder, StatisticsSummary, Task,
    TaskBatchUpdate, User,
};

use super::state::{AppState, SettingChange, Settings};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    // --- 认证 ---
    /// 写入当前用户，同时标记已登录并同步设置
    SetUser(User),
    /// 清空所有用户相关的数据
    Logout,

    // --- 用户管理 ---
    SetUsers(Vec<User>),
    AddUser(User),
    UpdateUser(User),
    RemoveUser(i64),

    // --- 任务 ---
    SetTasks(Vec<Task>),
    AddTask(Task),
    UpdateTask(Task),
    /// 批量更新后在本地套用相同的修改
    PatchTasks(TaskBatchUpdate),
    RemoveTask(i64),
    RemoveTasks(Vec<i64>),
    SetDeletedTasks(Vec<Task>),
    RemoveDeletedTask(i64),
    SetCurrentTask(Option<Task>),

    // --- 分类 ---
    SetCategories(Vec<Category>),
    AddCategory(Category),
    UpdateCategory(Category),
    RemoveCategory(i64),

    // --- 附件与评论 ---
    SetAttachments(Vec<Attachment>),
    AddAttachment(Attachment),
    RemoveAttachment(i64),
    SetComments(Vec<Comment>),
    AddComment(Comment),
    UpdateComment(Comment),
    RemoveComment(i64),

    // --- 设置与统计 ---
    SetSettings(ProfileSettingsUpdate),
    UpdateSetting(SettingChange),
    SetStatistics(StatisticsSummary),

    // --- 提醒 ---
    SetReminders(Vec<Reminder>),
    AddReminder(Reminder),
    UpdateReminder(Reminder),
    RemoveReminder(i64),

    // --- 加载状态 ---
    BeginRequest,
    EndRequest,
}

/// 有 id 的记录
trait Keyed {
    fn key(&self) -> i64;
}

macro_rules! keyed {
    ($($ty:ty),+) => {
        $(impl Keyed for $ty {
            fn key(&self) -> i64 {
                self.id
            }
        })+
    };
}

keyed!(User, Task, Category, Attachment, Comment, Reminder);

/// 替换 id 相同的元素，返回是否找到
fn replace<T: Keyed>(list: &mut [T], item: T) -> bool {
    match list.iter_mut().find(|x| x.key() == item.key()) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

fn remove<T: Keyed>(list: &mut Vec<T>, id: i64) -> bool {
    let before = list.len();
    list.retain(|x| x.key() != id);
    list.len() != before
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetUser(_) => "SET_USER",
            Mutation::Logout => "LOGOUT",
            Mutation::SetUsers(_) => "SET_USERS",
            Mutation::AddUser(_) => "ADD_USER",
            Mutation::UpdateUser(_) => "UPDATE_USER",
            Mutation::RemoveUser(_) => "REMOVE_USER",
            Mutation::SetTasks(_) => "SET_TASKS",
            Mutation::AddTask(_) => "ADD_TASK",
            Mutation::UpdateTask(_) => "UPDATE_TASK",
            Mutation::PatchTasks(_) => "PATCH_TASKS",
            Mutation::RemoveTask(_) => "REMOVE_TASK",
            Mutation::RemoveTasks(_) => "REMOVE_TASKS",
            Mutation::SetDeletedTasks(_) => "SET_DELETED_TASKS",
            Mutation::RemoveDeletedTask(_) => "REMOVE_DELETED_TASK",
            Mutation::SetCurrentTask(_) => "SET_CURRENT_TASK",
            Mutation::SetCategories(_) => "SET_CATEGORIES",
            Mutation::AddCategory(_) => "ADD_CATEGORY",
            Mutation::UpdateCategory(_) => "UPDATE_CATEGORY",
            Mutation::RemoveCategory(_) => "REMOVE_CATEGORY",
            Mutation::SetAttachments(_) => "SET_ATTACHMENTS",
            Mutation::AddAttachment(_) => "ADD_ATTACHMENT",
            Mutation::RemoveAttachment(_) => "REMOVE_ATTACHMENT",
            Mutation::SetComments(_) => "SET_COMMENTS",
            Mutation::AddComment(_) => "ADD_COMMENT",
            Mutation::UpdateComment(_) => "UPDATE_COMMENT",
            Mutation::RemoveComment(_) => "REMOVE_COMMENT",
            Mutation::SetSettings(_) => "SET_SETTINGS",
            Mutation::UpdateSetting(_) => "UPDATE_SETTING",
            Mutation::SetStatistics(_) => "SET_STATISTICS",
            Mutation::SetReminders(_) => "SET_REMINDERS",
            Mutation::AddReminder(_) => "ADD_REMINDER",
            Mutation::UpdateReminder(_) => "UPDATE_REMINDER",
            Mutation::RemoveReminder(_) => "REMOVE_REMINDER",
            Mutation::BeginRequest => "BEGIN_REQUEST",
            Mutation::EndRequest => "END_REQUEST",
        }
    }

    pub fn apply(self, state: &mut AppState) {
        match self {
            Mutation::SetUser(user) => {
                state.settings = Settings::from_user(&user);
                state.user = Some(user);
                state.is_authenticated = true;
            }
            Mutation::Logout => {
                // 加载计数属于进行中的请求，不随登出清零
                let pending = state.pending_requests;
                *state = AppState {
                    pending_requests: pending,
                    ..AppState::default()
                };
            }

            Mutation::SetUsers(users) => {
                state.users_total = users.len();
                state.users = users;
            }
            Mutation::AddUser(user) => {
                state.users.push(user);
                state.users_total += 1;
            }
            Mutation::UpdateUser(user) => {
                if state.user.as_ref().is_some_and(|u| u.id == user.id) {
                    state.user = Some(user.clone());
                }
                replace(&mut state.users, user);
            }
            Mutation::RemoveUser(id) => {
                if remove(&mut state.users, id) {
                    state.users_total = state.users_total.saturating_sub(1);
                }
            }

            Mutation::SetTasks(tasks) => state.tasks = tasks,
            Mutation::AddTask(task) => state.tasks.push(task),
            Mutation::UpdateTask(task) => {
                if state.current_task.as_ref().is_some_and(|t| t.id == task.id) {
                    state.current_task = Some(task.clone());
                }
                replace(&mut state.tasks, task);
            }
            Mutation::PatchTasks(batch) => {
                for task in state.tasks.iter_mut().filter(|t| batch.task_ids.contains(&t.id)) {
                    if let Some(priority) = batch.priority {
                        task.priority = priority;
                    }
                    if let Some(category_id) = batch.category_id {
                        task.category_id = Some(category_id);
                        task.category = None;
                    }
                }
            }
            Mutation::RemoveTask(id) => {
                remove(&mut state.tasks, id);
                if state.current_task.as_ref().is_some_and(|t| t.id == id) {
                    state.current_task = None;
                }
            }
            Mutation::RemoveTasks(ids) => {
                state.tasks.retain(|t| !ids.contains(&t.id));
                if state.current_task.as_ref().is_some_and(|t| ids.contains(&t.id)) {
                    state.current_task = None;
                }
            }
            Mutation::SetDeletedTasks(tasks) => state.deleted_tasks = tasks,
            Mutation::RemoveDeletedTask(id) => {
                remove(&mut state.deleted_tasks, id);
            }
            Mutation::SetCurrentTask(task) => state.current_task = task,

            Mutation::SetCategories(categories) => state.categories = categories,
            Mutation::AddCategory(category) => state.categories.push(category),
            Mutation::UpdateCategory(category) => {
                replace(&mut state.categories, category);
            }
            Mutation::RemoveCategory(id) => {
                remove(&mut state.categories, id);
            }

            Mutation::SetAttachments(attachments) => state.attachments = attachments,
            Mutation::AddAttachment(attachment) => state.attachments.push(attachment),
            Mutation::RemoveAttachment(id) => {
                remove(&mut state.attachments, id);
            }
            Mutation::SetComments(comments) => state.comments = comments,
            Mutation::AddComment(comment) => state.comments.push(comment),
            Mutation::UpdateComment(comment) => {
                replace(&mut state.comments, comment);
            }
            Mutation::RemoveComment(id) => {
                remove(&mut state.comments, id);
            }

            Mutation::SetSettings(update) => state.settings.merge(&update),
            Mutation::UpdateSetting(change) => {
                let settings = &mut state.settings;
                match change {
                    SettingChange::Theme(theme) => settings.theme = theme,
                    SettingChange::ThemeColor(color) => settings.theme_color = color,
                    SettingChange::NightBrightness(b) => settings.night_mode_brightness = b,
                    SettingChange::Notifications(on) => settings.notification_enabled = on,
                    SettingChange::ReminderMethod(m) => settings.default_reminder_method = m,
                }
            }
            Mutation::SetStatistics(statistics) => state.statistics = Some(statistics),

            Mutation::SetReminders(reminders) => state.reminders = reminders,
            Mutation::AddReminder(reminder) => state.reminders.push(reminder),
            Mutation::UpdateReminder(reminder) => {
                replace(&mut state.reminders, reminder);
            }
            Mutation::RemoveReminder(id) => {
                remove(&mut state.reminders, id);
            }

            Mutation::BeginRequest => state.pending_requests += 1,
            Mutation::EndRequest => {
                state.pending_requests = state.pending_requests.saturating_sub(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskhub_shared::{Priority, Theme};

    fn task(id: i64, title: &str) -> Task {
        serde_json::from_value(json!({"id": id, "title": title})).unwrap()
    }

    fn user(id: i64, role: &str) -> User {
        serde_json::from_value(json!({
            "id": id, "username": format!("u{}", id), "email": "u@x.io", "role": role, "theme": "dark"
        }))
        .unwrap()
    }

    fn apply_all(mutations: Vec<Mutation>) -> AppState {
        let mut state = AppState::default();
        for m in mutations {
            m.apply(&mut state);
        }
        state
    }

    #[test]
    fn update_replaces_in_place_and_ignores_unknown_ids() {
        let mut state = apply_all(vec![
            Mutation::SetTasks(vec![task(1, "a"), task(2, "b")]),
            Mutation::UpdateTask(task(2, "B")),
        ]);
        assert_eq!(state.tasks[1].title, "B");

        let before = state.tasks.clone();
        Mutation::UpdateTask(task(9, "ghost")).apply(&mut state);
        assert_eq!(state.tasks, before);
    }

    #[test]
    fn task_mutations_keep_current_task_in_sync() {
        let mut state = apply_all(vec![
            Mutation::SetTasks(vec![task(1, "a")]),
            Mutation::SetCurrentTask(Some(task(1, "a"))),
            Mutation::UpdateTask(task(1, "renamed")),
        ]);
        assert_eq!(state.current_task.as_ref().unwrap().title, "renamed");

        Mutation::RemoveTask(1).apply(&mut state);
        assert!(state.tasks.is_empty());
        assert!(state.current_task.is_none());
    }

    #[test]
    fn patch_tasks_applies_batch_fields() {
        let state = apply_all(vec![
            Mutation::SetTasks(vec![task(1, "a"), task(2, "b"), task(3, "c")]),
            Mutation::PatchTasks(TaskBatchUpdate {
                task_ids: vec![1, 3],
                priority: Some(Priority::High),
                category_id: Some(5),
            }),
        ]);
        assert_eq!(state.tasks[0].priority, Priority::High);
        assert_eq!(state.tasks[1].priority, Priority::Medium);
        assert_eq!(state.tasks[2].category_id, Some(5));
    }

    #[test]
    fn set_user_authenticates_and_loads_settings() {
        let state = apply_all(vec![Mutation::SetUser(user(1, "admin"))]);
        assert!(state.is_authenticated());
        assert!(state.is_admin());
        assert_eq!(state.settings.theme, Theme::Dark);
    }

    #[test]
    fn logout_clears_everything_but_pending_requests() {
        let state = apply_all(vec![
            Mutation::SetUser(user(1, "user")),
            Mutation::SetTasks(vec![task(1, "a")]),
            Mutation::SetUsers(vec![user(2, "user")]),
            Mutation::BeginRequest,
            Mutation::Logout,
        ]);
        assert!(!state.is_authenticated());
        assert!(state.user.is_none());
        assert!(state.tasks.is_empty());
        assert_eq!(state.users_total, 0);
        assert!(state.is_loading());
    }

    #[test]
    fn user_counters_follow_add_and_remove() {
        let mut state = apply_all(vec![
            Mutation::SetUsers(vec![user(1, "user"), user(2, "user")]),
            Mutation::AddUser(user(3, "admin")),
        ]);
        assert_eq!(state.users_total(), 3);

        Mutation::RemoveUser(2).apply(&mut state);
        Mutation::RemoveUser(2).apply(&mut state);
        assert_eq!(state.users_total(), 2);
    }

    #[test]
    fn settings_merge_and_single_key_update() {
        let mut state = AppState::default();
        Mutation::SetSettings(ProfileSettingsUpdate {
            theme: Some(Theme::Auto),
            ..Default::default()
        })
        .apply(&mut state);
        Mutation::UpdateSetting(SettingChange::ThemeColor("#123456".into())).apply(&mut state);

        assert_eq!(state.settings.theme, Theme::Auto);
        assert_eq!(state.settings.theme_color, "#123456");
        assert!(state.settings.notification_enabled);
    }

    #[test]
    fn end_request_never_underflows() {
        let state = apply_all(vec![Mutation::EndRequest, Mutation::BeginRequest]);
        assert!(state.is_loading());
    }
}
