use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::date::{self, format_display_opt};
use taskhub_shared::{TaskQuery, TaskStatus};

use crate::components::icons::*;
use crate::components::layout::Layout;
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 首页：任务概览 + 快捷入口
#[component]
pub fn HomePage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_tasks(TaskQuery::default()).await {
                notifier.error("加载任务失败", &e);
            }
        });
    });

    let count = move |status: TaskStatus| store.select(|s| s.tasks_with_status(status).len());
    let overdue = move || {
        let now = date::now();
        store.select(|s| s.overdue_tasks(&now).len())
    };
    let greeting = move || {
        store.select(|s| {
            s.current_user()
                .map(|u| format!("你好，{}", u.display_name()))
                .unwrap_or_else(|| "你好".to_string())
        })
    };
    // 最近截止的未完成任务
    let upcoming = move || {
        store.select(|s| {
            let mut tasks: Vec<_> = s
                .all_tasks()
                .iter()
                .filter(|t| !t.is_completed() && t.due_date.is_some())
                .cloned()
                .collect();
            tasks.sort_by_key(|t| t.due_date);
            tasks.truncate(5);
            tasks
        })
    };

    view! {
        <Layout title="首页">
            <p class="text-lg text-base-content/70">{greeting}</p>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"待处理"</div>
                    <div class="stat-value text-primary">{move || count(TaskStatus::Pending)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"进行中"</div>
                    <div class="stat-value text-secondary">{move || count(TaskStatus::InProgress)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"已完成"</div>
                    <div class="stat-value text-success">{move || count(TaskStatus::Completed)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"已逾期"</div>
                    <div class="stat-value text-error">{overdue}</div>
                </div>
            </div>

            <div class="grid grid-cols-2 md:grid-cols-4 gap-4">
                <Link to=AppRoute::TaskCreate class="btn btn-primary gap-2">
                    <Plus attr:class="h-4 w-4" /> "新建任务"
                </Link>
                <Link to=AppRoute::Tasks class="btn gap-2">
                    <ListTodo attr:class="h-4 w-4" /> "全部任务"
                </Link>
                <Link to=AppRoute::Reminders class="btn gap-2">
                    <Bell attr:class="h-4 w-4" /> "提醒"
                </Link>
                <Link to=AppRoute::ThemeSettings class="btn gap-2">
                    <Palette attr:class="h-4 w-4" /> "主题"
                </Link>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"即将截止"</h3>
                    <Show
                        when=move || !upcoming().is_empty()
                        fallback=|| view! { <p class="text-base-content/50">"没有即将截止的任务。"</p> }
                    >
                        <ul class="divide-y divide-base-200">
                            <For
                                each=upcoming
                                key=|t| t.id
                                children=move |task| {
                                    view! {
                                        <li class="flex justify-between py-2">
                                            <Link to=AppRoute::TaskDetail(task.id) class="link link-hover">
                                                {task.title.clone()}
                                            </Link>
                                            <span class="text-sm opacity-70">
                                                {format_display_opt(task.due_date.as_ref())}
                                            </span>
                                        </li>
                                    }
                                }
                            />
                        </ul>
                    </Show>
                </div>
            </div>
        </Layout>
    }
}
