//! 已登录页面的公共布局：导航栏 + 加载进度条 + 内容区

use leptos::prelude::*;

use crate::components::icons::*;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 导航栏中的一项，当前路由高亮
#[component]
fn NavItem(to: AppRoute, label: &'static str, children: Children) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();
    let target = to.clone();
    let class = move || {
        if router.current_route().get() == target {
            "gap-2 active"
        } else {
            "gap-2"
        }
    };
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.go(to.clone());
    };

    view! {
        <li>
            <a href=href class=class on:click=on_click>
                {children()}
                <span class="hidden lg:inline">{label}</span>
            </a>
        </li>
    }
}

#[component]
pub fn Layout(
    /// 页面标题
    title: &'static str,
    children: Children,
) -> impl IntoView {
    let store = use_store();

    let user_name = move || {
        store.select(|s| {
            s.current_user()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default()
        })
    };
    let is_admin = move || store.select(|s| s.is_admin());
    let is_loading = move || store.select(|s| s.is_loading());

    let on_logout = move |_| store.get().logout();

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <Show when=is_loading>
                <progress class="progress progress-primary w-full h-1 fixed top-0 left-0 z-50"></progress>
            </Show>

            <div class="navbar bg-base-100 shadow-xl px-4">
                <div class="flex-1 gap-2">
                    <CheckSquare attr:class="text-primary h-6 w-6" />
                    <Link to=AppRoute::Home class="btn btn-ghost text-xl">"TaskHub"</Link>
                    <ul class="menu menu-horizontal px-1 gap-1">
                        <NavItem to=AppRoute::Home label="首页"><House attr:class="h-4 w-4" /></NavItem>
                        <NavItem to=AppRoute::Tasks label="任务"><ListTodo attr:class="h-4 w-4" /></NavItem>
                        <NavItem to=AppRoute::Categories label="分类"><Tag attr:class="h-4 w-4" /></NavItem>
                        <NavItem to=AppRoute::Reminders label="提醒"><Bell attr:class="h-4 w-4" /></NavItem>
                        <NavItem to=AppRoute::Comments label="评论"><MessageSquare attr:class="h-4 w-4" /></NavItem>
                        <NavItem to=AppRoute::Statistics label="统计"><BarChart attr:class="h-4 w-4" /></NavItem>
                        <NavItem to=AppRoute::Trash label="回收站"><Trash2 attr:class="h-4 w-4" /></NavItem>
                        <Show when=is_admin>
                            <NavItem to=AppRoute::AdminUsers label="用户"><Users attr:class="h-4 w-4" /></NavItem>
                        </Show>
                    </ul>
                </div>
                <div class="flex-none gap-2">
                    <Link to=AppRoute::Settings class="btn btn-ghost btn-sm gap-2">
                        <Cog attr:class="h-4 w-4" />
                        <span class="hidden md:inline">{user_name}</span>
                    </Link>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" /> "退出"
                    </button>
                </div>
            </div>

            <main class="max-w-7xl mx-auto p-4 md:p-8 space-y-6">
                <h1 class="text-2xl font-bold">{title}</h1>
                {children()}
            </main>
        </div>
    }
}

/// 浏览器确认框，取消或无法弹出时返回 `false`
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
