//! TaskHub 前端应用
//!
//! 采用 Context-Driven 的分层架构：
//! - `api`: REST 服务层，传输接缝 + 拦截器
//! - `store`: 全局状态（actions / mutations / getters）
//! - `web::route` / `web::router`: 路由定义与路由服务（含守卫）
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod categories;
    pub mod comments;
    pub mod home;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod reminders;
    pub mod settings;
    pub mod statistics;
    pub mod tasks;
    pub mod theme_settings;
    pub mod toast;
    pub mod users;
}
mod config;
mod error;
mod logging;
mod store;

use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiClient;
use crate::components::categories::CategoriesPage;
use crate::components::comments::CommentsPage;
use crate::components::home::HomePage;
use crate::components::login::{LoginPage, RegisterPage};
use crate::components::reminders::RemindersPage;
use crate::components::settings::SettingsPage;
use crate::components::statistics::StatisticsPage;
use crate::components::tasks::{TaskDetailPage, TaskFormPage, TaskListPage, TrashPage};
use crate::components::theme_settings::ThemeSettingsPage;
use crate::components::toast::{ToastHost, provide_notifier};
use crate::components::users::UsersPage;
use crate::config::ClientConfig;
use crate::store::{Store, StoreHandle};

// 浏览器 API 封装模块
pub(crate) mod web {
    pub mod file;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    pub mod theme;

    pub use http::FetchTransport;
    pub use storage::BrowserCredentials;
}

use web::route::AppRoute;
use web::router::{Link, RouteGuard, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Tasks => view! { <TaskListPage /> }.into_any(),
        AppRoute::TaskCreate => view! { <TaskFormPage task_id=None /> }.into_any(),
        AppRoute::TaskDetail(id) => view! { <TaskDetailPage task_id=id /> }.into_any(),
        AppRoute::TaskEdit(id) => view! { <TaskFormPage task_id=Some(id) /> }.into_any(),
        AppRoute::Trash => view! { <TrashPage /> }.into_any(),
        AppRoute::Settings => view! { <SettingsPage /> }.into_any(),
        AppRoute::ThemeSettings => view! { <ThemeSettingsPage /> }.into_any(),
        AppRoute::Statistics => view! { <StatisticsPage /> }.into_any(),
        AppRoute::Categories => view! { <CategoriesPage /> }.into_any(),
        AppRoute::Reminders => view! { <RemindersPage task_id=None /> }.into_any(),
        AppRoute::TaskReminders(id) => view! { <RemindersPage task_id=Some(id) /> }.into_any(),
        AppRoute::Comments => view! { <CommentsPage /> }.into_any(),
        AppRoute::AdminUsers => view! { <UsersPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                    <Link to=AppRoute::Home class="btn btn-primary mt-6">"返回首页"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与日志
    let config = ClientConfig::from_build_env();
    logging::init(config.log_level);
    log::info!("TaskHub starting, api base: {}", config.api_base);

    // 2. 创建 store，放入 Context
    let api = ApiClient::new(web::FetchTransport, web::BrowserCredentials, config);
    let store = Store::new(api);
    provide_context(StoreHandle::new(store.clone()));
    provide_notifier();

    // 3. 刷新页面后用已保存的令牌恢复当前用户
    if store.snapshot().is_authenticated {
        let store = store.clone();
        spawn_local(async move {
            if let Err(e) = store.fetch_current_user().await {
                log::warn!("Failed to restore session: {}", e);
            }
        });
    }

    // 4. 主题跟随设置变化
    let theme_store = store.clone();
    Effect::new(move |_| {
        let settings = theme_store.select(|s| s.app_settings().clone());
        web::theme::apply(&settings);
    });

    // 5. 认证状态信号注入路由服务
    let auth_store = store.clone();
    let is_authenticated = Signal::derive(move || auth_store.select(|s| s.is_authenticated()));

    let guard: Arc<dyn RouteGuard> = Arc::new(store);

    view! {
        <Router is_authenticated=is_authenticated guard=guard>
            <ToastHost />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
