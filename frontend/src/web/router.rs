//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。

use std::sync::Arc;

use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GuardDecision, after_admin_check, guard};
use crate::auth::AdminCheck;

/// 守卫需要的认证信息
///
/// 由 store 实现，路由服务不直接依赖 store。
pub trait RouteGuard: Send + Sync + 'static {
    /// 本地存储的管理员标记
    fn admin_hint(&self) -> bool;
    /// 向后端确认管理员身份
    fn verify_admin(&self) -> LocalBoxFuture<'static, AdminCheck>;
}

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

fn set_document_title(route: &AppRoute) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(&format!("{} - TaskHub", route.title()));
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证检查信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证状态检查（注入的信号，实现解耦）
    is_authenticated: Signal<bool>,
    guard: StoredValue<Arc<dyn RouteGuard>>,
    /// 每次导航递增，用于丢弃过期的管理员校验结果
    nav_seq: StoredValue<u64>,
}

impl RouterService {
    /// 创建新的路由服务
    ///
    /// # Arguments
    /// * `is_authenticated` - 认证状态信号，由外部注入实现解耦
    /// * `guard` - 管理员校验
    fn new(is_authenticated: Signal<bool>, guard: Arc<dyn RouteGuard>) -> Self {
        // 1. 初始化当前路由（从 URL 解析），守卫在 provide_router 中执行
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            is_authenticated,
            guard: StoredValue::new(guard),
            nav_seq: StoredValue::new(0),
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    pub fn go(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    /// 导航到指定路由
    ///
    /// # Arguments
    /// * `target_route` - 目标路由
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let seq = self.next_seq();
        let is_auth = self.is_authenticated.get_untracked();
        let admin_hint = self.guard.with_value(|g| g.admin_hint());

        match guard(&target_route, is_auth, admin_hint) {
            GuardDecision::Allow => self.commit(target_route, use_push),
            GuardDecision::Redirect(redirect) => {
                log::info!("[Router] {} -> {}", target_route, redirect);
                self.commit(redirect, use_push);
            }
            GuardDecision::VerifyAdmin => {
                let this = *self;
                let check = self.guard.with_value(|g| g.verify_admin());
                spawn_local(async move {
                    let check = check.await;
                    if check == AdminCheck::Denied {
                        log::warn!("[Router] Admin required. Redirecting to Home.");
                    }
                    let superseded = this.nav_seq.get_value() != seq;
                    let current = this.current_route.get_untracked();
                    match after_admin_check(target_route, &check, superseded, &current) {
                        Some(route) => this.commit(route, use_push),
                        None => log::debug!("[Router] Admin check result discarded"),
                    }
                });
            }
        }
    }

    fn next_seq(&self) -> u64 {
        self.nav_seq.update_value(|n| *n += 1);
        self.nav_seq.get_value()
    }

    /// 写入 History 并更新 UI
    fn commit(&self, route: AppRoute, use_push: bool) {
        let path = route.to_path();
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        set_document_title(&route);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let this = *self;

        // popstate 时也执行守卫逻辑
        let closure = Closure::<dyn Fn()>::new(move || {
            this.navigate_to_route(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let this = *self;

        // 使用 Effect 监听认证状态变化
        Effect::new(move |_| {
            let is_auth = this.is_authenticated.get();
            let route = this.current_route.get_untracked();

            if is_auth && route.should_redirect_when_authenticated() {
                log::info!("[Router] Auth state changed: logged in, redirecting to home.");
                this.next_seq();
                this.commit(AppRoute::auth_success_redirect(), true);
            } else if !is_auth && route.requires_auth() {
                log::info!("[Router] Auth state changed: logged out, redirecting to login.");
                this.next_seq();
                this.commit(AppRoute::auth_failure_redirect(), true);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>, guard: Arc<dyn RouteGuard>) -> RouterService {
    let router = RouterService::new(is_authenticated, guard);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();
    router.navigate_to_route(router.current_route.get_untracked(), false);

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 管理员守卫
    guard: Arc<dyn RouteGuard>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(is_authenticated, guard);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，点击时走路由服务而不是整页刷新
#[component]
pub fn Link(
    /// 目标路由
    to: AppRoute,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();

    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.go(to.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
