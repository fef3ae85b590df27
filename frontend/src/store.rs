//! 全局 Store
//!
//! 视图 -> action -> 服务 -> HTTP -> mutation -> 响应式重新渲染。
//!
//! - `state`: 状态与 getters
//! - `mutation`: 同步、具名的状态变更
//! - 本模块: 异步 actions，每个 action 调用一个服务并在成功后提交 mutation

mod mutation;
mod state;
#[cfg(test)]
mod tests;

use std::future::Future;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use taskhub_shared::protocol::FilePart;
use taskhub_shared::{
    Attachment, Category, CategoryCreate, CategoryUpdate, Comment, MessageResponse, PageQuery,
    ProfileSettingsUpdate, RegisterRequest, Reminder, ReminderCreate, ReminderUpdate,
    StatisticsSummary, Task, TaskBatchUpdate, TaskCreate, TaskQuery, TaskUpdate, User, UserCreate,
    UserUpdate,
};

pub use mutation::Mutation;
pub use state::{AppState, SettingChange, Settings};

use crate::api::{ApiClient, Download, Transport};
use crate::auth::{self, AdminCheck, CredentialStore};
use crate::error::{ApiError, ApiResult};
use crate::web::router::RouteGuard;
use crate::web::{BrowserCredentials, FetchTransport};

/// 浏览器中使用的 Store
pub type AppStore = Store<FetchTransport, BrowserCredentials>;

pub struct Store<T, C> {
    api: ApiClient<T, C>,
    state: ArcRwSignal<AppState>,
}

impl<T, C> Clone for Store<T, C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

/// 组件持有的 Store 句柄
///
/// `Copy`，可以直接移入多个事件闭包；需要调用 action 时用 `get` 取出一份克隆。
#[derive(Clone, Copy)]
pub struct StoreHandle(StoredValue<AppStore>);

impl StoreHandle {
    pub fn new(store: AppStore) -> Self {
        Self(StoredValue::new(store))
    }

    pub fn get(&self) -> AppStore {
        self.0.get_value()
    }

    /// 响应式读取状态
    pub fn select<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        self.0.with_value(|store| store.select(f))
    }
}

/// 从 Context 获取 Store
pub fn use_store() -> StoreHandle {
    expect_context::<StoreHandle>()
}

impl<T: Transport, C: CredentialStore> Store<T, C> {
    /// 本地有令牌时视为已登录，用户信息稍后由 `fetch_current_user` 补全
    pub fn new(api: ApiClient<T, C>) -> Self {
        let state = AppState {
            is_authenticated: api.credentials().has_token(),
            ..Default::default()
        };
        Self {
            api,
            state: ArcRwSignal::new(state),
        }
    }

    pub fn api(&self) -> &ApiClient<T, C> {
        &self.api
    }

    /// 读取状态（在响应式上下文中会建立依赖）
    pub fn select<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        self.state.with(f)
    }

    pub fn snapshot(&self) -> AppState {
        self.state.get_untracked()
    }

    pub fn commit(&self, mutation: Mutation) {
        log::debug!("[Store] {}", mutation.name());
        if matches!(mutation, Mutation::Logout) {
            self.api.credentials().clear();
        }
        self.state.update(|state| mutation.apply(state));
    }

    /// 执行一次服务调用：维护加载计数，失败时记录日志，401 时登出
    async fn run<R>(&self, op: &'static str, call: impl Future<Output = ApiResult<R>>) -> ApiResult<R> {
        self.commit(Mutation::BeginRequest);
        let result = call.await;
        self.commit(Mutation::EndRequest);

        result.map_err(|e| {
            let e = e.in_op(op);
            log::error!("{}", e);
            if e.is_unauthorized() {
                self.commit(Mutation::Logout);
            }
            e
        })
    }

    // =========================================================
    // 认证
    // =========================================================

    /// 登录：保存令牌，再拉取当前用户
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        let token = self
            .run("store.login", self.api.login(username, password))
            .await
            .map_err(ApiError::into_login_failure)?;
        self.api.credentials().set_token(&token.access_token);

        let user = self
            .run("store.login", self.api.current_user())
            .await
            .inspect_err(|_| self.api.credentials().clear())?;
        self.api.credentials().set_admin(user.is_admin());
        self.commit(Mutation::SetUser(user.clone()));
        log::info!("用户 {} 已登录", user.username);
        Ok(user)
    }

    /// 注册成功后不自动登录
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<User> {
        self.run("store.register", self.api.register(req)).await
    }

    pub async fn fetch_current_user(&self) -> ApiResult<User> {
        let user = self
            .run("store.fetch_current_user", self.api.current_user())
            .await?;
        self.api.credentials().set_admin(user.is_admin());
        self.commit(Mutation::SetUser(user.clone()));
        Ok(user)
    }

    pub async fn update_current_user(&self, update: UserUpdate) -> ApiResult<User> {
        let user = self
            .run("store.update_current_user", self.api.update_current_user(update))
            .await?;
        self.commit(Mutation::SetUser(user.clone()));
        Ok(user)
    }

    pub fn logout(&self) {
        self.commit(Mutation::Logout);
        log::info!("已退出登录");
    }

    // =========================================================
    // 用户管理
    // =========================================================

    /// 返回本页拉取到的用户数
    pub async fn fetch_users(&self, page: PageQuery) -> ApiResult<usize> {
        let users = self
            .run("store.fetch_users", self.api.list_users(page))
            .await?;
        let fetched = users.len();
        self.commit(Mutation::SetUsers(users));
        Ok(fetched)
    }

    pub async fn create_user(&self, user: UserCreate) -> ApiResult<User> {
        let user = self
            .run("store.create_user", self.api.create_user(user))
            .await?;
        self.commit(Mutation::AddUser(user.clone()));
        Ok(user)
    }

    pub async fn update_user(&self, user_id: i64, update: UserUpdate) -> ApiResult<User> {
        let user = self
            .run("store.update_user", self.api.update_user(user_id, update))
            .await?;
        self.commit(Mutation::UpdateUser(user.clone()));
        Ok(user)
    }

    pub async fn reset_user_password(&self, user_id: i64, new_password: &str) -> ApiResult<User> {
        self.run(
            "store.reset_user_password",
            self.api.reset_user_password(user_id, new_password),
        )
        .await
    }

    pub async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        self.run("store.delete_user", self.api.delete_user(user_id))
            .await?;
        self.commit(Mutation::RemoveUser(user_id));
        Ok(())
    }

    // =========================================================
    // 任务
    // =========================================================

    pub async fn fetch_tasks(&self, query: TaskQuery) -> ApiResult<()> {
        let tasks = self
            .run("store.fetch_tasks", self.api.list_tasks(query))
            .await?;
        self.commit(Mutation::SetTasks(tasks));
        Ok(())
    }

    /// 拉取任务详情，附件随详情一起返回
    pub async fn fetch_task(&self, task_id: i64) -> ApiResult<Task> {
        let task = self
            .run("store.fetch_task", self.api.get_task(task_id))
            .await?;
        self.commit(Mutation::SetAttachments(task.attachments.clone()));
        self.commit(Mutation::SetCurrentTask(Some(task.clone())));
        Ok(task)
    }

    pub async fn create_task(&self, task: TaskCreate) -> ApiResult<Task> {
        let task = self
            .run("store.create_task", self.api.create_task(task))
            .await?;
        self.commit(Mutation::AddTask(task.clone()));
        Ok(task)
    }

    pub async fn update_task(&self, task_id: i64, update: TaskUpdate) -> ApiResult<Task> {
        let task = self
            .run("store.update_task", self.api.update_task(task_id, update))
            .await?;
        self.commit(Mutation::UpdateTask(task.clone()));
        Ok(task)
    }

    /// 移入回收站
    pub async fn delete_task(&self, task_id: i64) -> ApiResult<()> {
        self.run("store.delete_task", self.api.delete_task(task_id))
            .await?;
        self.commit(Mutation::RemoveTask(task_id));
        Ok(())
    }

    pub async fn fetch_deleted_tasks(&self) -> ApiResult<()> {
        let tasks = self
            .run(
                "store.fetch_deleted_tasks",
                self.api.list_deleted_tasks(PageQuery::default()),
            )
            .await?;
        self.commit(Mutation::SetDeletedTasks(tasks));
        Ok(())
    }

    pub async fn restore_task(&self, task_id: i64) -> ApiResult<Task> {
        let task = self
            .run("store.restore_task", self.api.restore_task(task_id))
            .await?;
        self.commit(Mutation::RemoveDeletedTask(task_id));
        self.commit(Mutation::AddTask(task.clone()));
        Ok(task)
    }

    pub async fn purge_task(&self, task_id: i64) -> ApiResult<()> {
        self.run("store.purge_task", self.api.purge_task(task_id))
            .await?;
        self.commit(Mutation::RemoveDeletedTask(task_id));
        Ok(())
    }

    /// 返回更新的任务数
    pub async fn batch_update_tasks(&self, batch: TaskBatchUpdate) -> ApiResult<u64> {
        let updated = self
            .run("store.batch_update_tasks", self.api.batch_update_tasks(batch.clone()))
            .await?;
        self.commit(Mutation::PatchTasks(batch));
        Ok(updated)
    }

    /// 返回删除的任务数
    pub async fn batch_delete_tasks(&self, task_ids: Vec<i64>) -> ApiResult<u64> {
        let deleted = self
            .run("store.batch_delete_tasks", self.api.batch_delete_tasks(task_ids.clone()))
            .await?;
        self.commit(Mutation::RemoveTasks(task_ids));
        Ok(deleted)
    }

    pub async fn export_tasks(&self, query: TaskQuery) -> ApiResult<Download> {
        self.run("store.export_tasks", self.api.export_tasks_csv(query))
            .await
    }

    // =========================================================
    // 分类
    // =========================================================

    pub async fn fetch_categories(&self) -> ApiResult<()> {
        let categories = self
            .run("store.fetch_categories", self.api.list_categories())
            .await?;
        self.commit(Mutation::SetCategories(categories));
        Ok(())
    }

    pub async fn create_category(&self, category: CategoryCreate) -> ApiResult<Category> {
        let category = self
            .run("store.create_category", self.api.create_category(category))
            .await?;
        self.commit(Mutation::AddCategory(category.clone()));
        Ok(category)
    }

    pub async fn update_category(&self, category_id: i64, update: CategoryUpdate) -> ApiResult<Category> {
        let category = self
            .run(
                "store.update_category",
                self.api.update_category(category_id, update),
            )
            .await?;
        self.commit(Mutation::UpdateCategory(category.clone()));
        Ok(category)
    }

    pub async fn delete_category(&self, category_id: i64) -> ApiResult<()> {
        self.run("store.delete_category", self.api.delete_category(category_id))
            .await?;
        self.commit(Mutation::RemoveCategory(category_id));
        Ok(())
    }

    // =========================================================
    // 附件
    // =========================================================

    pub async fn upload_attachment(&self, task_id: i64, file: FilePart) -> ApiResult<Attachment> {
        let attachment = self
            .run("store.upload_attachment", self.api.upload_attachment(task_id, file))
            .await?;
        self.commit(Mutation::AddAttachment(attachment.clone()));
        Ok(attachment)
    }

    pub async fn download_attachment(&self, attachment: &Attachment) -> ApiResult<Download> {
        self.run(
            "store.download_attachment",
            self.api.download_attachment(attachment),
        )
        .await
    }

    pub async fn delete_attachment(&self, task_id: i64, attachment_id: i64) -> ApiResult<()> {
        self.run(
            "store.delete_attachment",
            self.api.delete_attachment(task_id, attachment_id),
        )
        .await?;
        self.commit(Mutation::RemoveAttachment(attachment_id));
        Ok(())
    }

    // =========================================================
    // 评论
    // =========================================================

    pub async fn fetch_comments(&self, task_id: i64) -> ApiResult<()> {
        let comments = self
            .run("store.fetch_comments", self.api.task_comments(task_id))
            .await?;
        self.commit(Mutation::SetComments(comments));
        Ok(())
    }

    pub async fn add_comment(&self, task_id: i64, content: &str) -> ApiResult<Comment> {
        let comment = self
            .run("store.add_comment", self.api.create_comment(task_id, content))
            .await?;
        self.commit(Mutation::AddComment(comment.clone()));
        Ok(comment)
    }

    pub async fn edit_comment(&self, comment_id: i64, content: &str) -> ApiResult<Comment> {
        let comment = self
            .run("store.edit_comment", self.api.update_comment(comment_id, content))
            .await?;
        self.commit(Mutation::UpdateComment(comment.clone()));
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> ApiResult<()> {
        self.run("store.delete_comment", self.api.delete_comment(comment_id))
            .await?;
        self.commit(Mutation::RemoveComment(comment_id));
        Ok(())
    }

    // =========================================================
    // 提醒
    // =========================================================

    pub async fn fetch_reminders(&self) -> ApiResult<()> {
        let reminders = self
            .run(
                "store.fetch_reminders",
                self.api.list_reminders(PageQuery::default()),
            )
            .await?;
        self.commit(Mutation::SetReminders(reminders));
        Ok(())
    }

    pub async fn fetch_task_reminders(&self, task_id: i64) -> ApiResult<()> {
        let reminders = self
            .run("store.fetch_task_reminders", self.api.task_reminders(task_id))
            .await?;
        self.commit(Mutation::SetReminders(reminders));
        Ok(())
    }

    pub async fn create_reminder(&self, reminder: ReminderCreate) -> ApiResult<Reminder> {
        let reminder = self
            .run("store.create_reminder", self.api.create_reminder(reminder))
            .await?;
        self.commit(Mutation::AddReminder(reminder.clone()));
        Ok(reminder)
    }

    pub async fn update_reminder(&self, reminder_id: i64, update: ReminderUpdate) -> ApiResult<Reminder> {
        let reminder = self
            .run(
                "store.update_reminder",
                self.api.update_reminder(reminder_id, update),
            )
            .await?;
        self.commit(Mutation::UpdateReminder(reminder.clone()));
        Ok(reminder)
    }

    pub async fn delete_reminder(&self, reminder_id: i64) -> ApiResult<()> {
        self.run("store.delete_reminder", self.api.delete_reminder(reminder_id))
            .await?;
        self.commit(Mutation::RemoveReminder(reminder_id));
        Ok(())
    }

    /// 启用或停用，提交服务端返回的完整提醒
    pub async fn toggle_reminder(&self, reminder_id: i64, active: bool) -> ApiResult<Reminder> {
        let call = async {
            if active {
                self.api.activate_reminder(reminder_id).await
            } else {
                self.api.deactivate_reminder(reminder_id).await
            }
        };
        let reminder = self.run("store.toggle_reminder", call).await?;
        self.commit(Mutation::UpdateReminder(reminder.clone()));
        Ok(reminder)
    }

    // =========================================================
    // 统计
    // =========================================================

    pub async fn fetch_statistics(&self, days: Option<u32>) -> ApiResult<StatisticsSummary> {
        let summary = self
            .run("store.fetch_statistics", self.api.statistics_summary(days))
            .await?;
        self.commit(Mutation::SetStatistics(summary.clone()));
        Ok(summary)
    }

    // =========================================================
    // 设置
    // =========================================================

    pub async fn fetch_settings(&self) -> ApiResult<Settings> {
        let user = self
            .run("store.fetch_settings", self.api.profile())
            .await?;
        self.commit(Mutation::SetUser(user));
        Ok(self.state.with_untracked(|s| s.settings.clone()))
    }

    /// 保存个人设置，并以服务端返回的用户刷新本地状态
    pub async fn update_settings(&self, update: ProfileSettingsUpdate) -> ApiResult<User> {
        let user = self
            .run("store.update_settings", self.api.update_profile(update.clone()))
            .await?;
        self.commit(Mutation::SetUser(user.clone()));
        self.commit(Mutation::SetSettings(update));
        Ok(user)
    }

    /// 只修改本地设置（预览），不发请求
    pub fn update_setting(&self, change: SettingChange) {
        self.commit(Mutation::UpdateSetting(change));
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<MessageResponse> {
        self.run("store.change_password", self.api.change_password(current, new))
            .await
    }

    /// 删除账户成功后登出
    pub async fn delete_account(&self, password: &str) -> ApiResult<MessageResponse> {
        let resp = self
            .run("store.delete_account", self.api.delete_account(password))
            .await?;
        self.commit(Mutation::Logout);
        Ok(resp)
    }
}

impl<T: Transport, C: CredentialStore> RouteGuard for Store<T, C> {
    fn admin_hint(&self) -> bool {
        self.api.credentials().is_admin()
    }

    fn verify_admin(&self) -> LocalBoxFuture<'static, AdminCheck> {
        let store = self.clone();
        async move {
            let check = auth::verify_admin(&store.api).await;
            if let AdminCheck::Failed(_) = &check {
                store.commit(Mutation::Logout);
            }
            check
        }
        .boxed_local()
    }
}
