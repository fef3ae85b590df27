//! 任务列表
//!
//! 筛选条件变化时重新拉取；勾选的任务可以批量修改优先级 / 分类或批量删除。

use std::collections::BTreeSet;

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::date::format_display_opt;
use taskhub_shared::{Priority, TaskBatchUpdate, TaskQuery, TaskStatus, TaskUpdate};

use super::{PriorityBadge, StatusBadge, parse_optional_id};
use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::file;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 列表筛选条件
#[derive(Clone, Copy)]
struct Filters {
    status: RwSignal<Option<TaskStatus>>,
    priority: RwSignal<Option<Priority>>,
    category_id: RwSignal<Option<i64>>,
}

impl Filters {
    fn new() -> Self {
        Self {
            status: RwSignal::new(None),
            priority: RwSignal::new(None),
            category_id: RwSignal::new(None),
        }
    }

    fn to_query(&self) -> TaskQuery {
        TaskQuery {
            status: self.status.get(),
            priority: self.priority.get(),
            category_id: self.category_id.get(),
            ..Default::default()
        }
    }
}

#[component]
pub fn TaskListPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let filters = Filters::new();

    let selected = RwSignal::new(BTreeSet::<i64>::new());
    let batch_priority = RwSignal::new(Option::<Priority>::None);
    let batch_category = RwSignal::new(Option::<i64>::None);

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_categories().await {
                notifier.error("加载分类失败", &e);
            }
        });
    });

    // 筛选条件变化时重新加载
    Effect::new(move |_| {
        let query = filters.to_query();
        selected.set(BTreeSet::new());
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_tasks(query).await {
                notifier.error("加载任务失败", &e);
            }
        });
    });

    let tasks = move || store.select(|s| s.all_tasks().to_vec());
    let categories = move || store.select(|s| s.task_categories().to_vec());

    let toggle_selected = move |id: i64| {
        selected.update(|set| {
            if !set.remove(&id) {
                set.insert(id);
            }
        });
    };
    let all_selected = move || {
        let count = selected.with(|s| s.len());
        count > 0 && count == store.select(|s| s.all_tasks().len())
    };
    let toggle_all = move |_| {
        if all_selected() {
            selected.set(BTreeSet::new());
        } else {
            selected.set(store.select(|s| s.all_tasks().iter().map(|t| t.id).collect()));
        }
    };

    let handle_complete = move |id: i64| {
        let store = store.get();
        spawn_local(async move {
            let update = TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            };
            match store.update_task(id, update).await {
                Ok(_) => notifier.success("任务已完成"),
                Err(e) => notifier.error("更新任务失败", &e),
            }
        });
    };

    let handle_delete = move |id: i64| {
        if !confirm("确定将该任务移入回收站吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_task(id).await {
                Ok(()) => notifier.success("任务已移入回收站"),
                Err(e) => notifier.error("删除任务失败", &e),
            }
        });
    };

    let handle_batch_update = move |_| {
        let batch = TaskBatchUpdate {
            task_ids: selected.get().into_iter().collect(),
            priority: batch_priority.get(),
            category_id: batch_category.get(),
        };
        let store = store.get();
        spawn_local(async move {
            match store.batch_update_tasks(batch).await {
                Ok(n) => {
                    notifier.success(format!("已更新 {} 个任务", n));
                    selected.set(BTreeSet::new());
                }
                Err(e) => notifier.error("批量更新失败", &e),
            }
        });
    };

    let handle_batch_delete = move |_| {
        let ids: Vec<i64> = selected.get().into_iter().collect();
        if !confirm(&format!("确定删除选中的 {} 个任务吗？", ids.len())) {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.batch_delete_tasks(ids).await {
                Ok(n) => {
                    notifier.success(format!("已删除 {} 个任务", n));
                    selected.set(BTreeSet::new());
                }
                Err(e) => notifier.error("批量删除失败", &e),
            }
        });
    };

    let handle_export = move |_| {
        let query = filters.to_query();
        let store = store.get();
        spawn_local(async move {
            match store.export_tasks(query).await {
                Ok(download) => {
                    if let Err(e) = file::save(&download) {
                        log::error!("保存导出文件失败: {:?}", e);
                    }
                }
                Err(e) => notifier.error("导出失败", &e),
            }
        });
    };

    let reload = move |_| {
        let query = filters.to_query();
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_tasks(query).await {
                notifier.error("加载任务失败", &e);
            }
        });
    };

    let is_loading = move || store.select(|s| s.is_loading());
    let has_selection = move || selected.with(|s| !s.is_empty());

    view! {
        <Layout title="任务列表">
            // 筛选与操作
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body flex-row flex-wrap items-end gap-4">
                    <div class="form-control">
                        <label class="label"><span class="label-text">"状态"</span></label>
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| filters.status.set(TaskStatus::parse(&event_target_value(&ev)))
                        >
                            <option value="">"全部"</option>
                            {[TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed]
                                .into_iter()
                                .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"优先级"</span></label>
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| filters.priority.set(Priority::parse(&event_target_value(&ev)))
                        >
                            <option value="">"全部"</option>
                            {Priority::ALL
                                .iter()
                                .map(|p| view! { <option value=p.as_str()>{p.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"分类"</span></label>
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| filters.category_id.set(parse_optional_id(&event_target_value(&ev)))
                        >
                            <option value="">"全部"</option>
                            <For
                                each=categories
                                key=|c| c.id
                                children=|c| view! { <option value=c.id.to_string()>{c.name}</option> }
                            />
                        </select>
                    </div>

                    <div class="flex-1"></div>
                    <button on:click=reload disabled=is_loading class="btn btn-ghost btn-circle btn-sm">
                        <RefreshCw attr:class=move || if is_loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                    </button>
                    <button on:click=handle_export class="btn btn-sm gap-2">
                        <Download attr:class="h-4 w-4" /> "导出 CSV"
                    </button>
                    <Link to=AppRoute::TaskCreate class="btn btn-primary btn-sm gap-2">
                        <Plus attr:class="h-4 w-4" /> "新建任务"
                    </Link>
                </div>
            </div>

            // 批量操作
            <Show when=has_selection>
                <div class="alert flex flex-wrap gap-4">
                    <span>{move || format!("已选择 {} 个任务", selected.with(|s| s.len()))}</span>
                    <select
                        class="select select-bordered select-sm"
                        on:change=move |ev| batch_priority.set(Priority::parse(&event_target_value(&ev)))
                    >
                        <option value="">"优先级不变"</option>
                        {Priority::ALL
                            .iter()
                            .map(|p| view! { <option value=p.as_str()>{p.label()}</option> })
                            .collect_view()}
                    </select>
                    <select
                        class="select select-bordered select-sm"
                        on:change=move |ev| batch_category.set(parse_optional_id(&event_target_value(&ev)))
                    >
                        <option value="">"分类不变"</option>
                        <For
                            each=categories
                            key=|c| c.id
                            children=|c| view! { <option value=c.id.to_string()>{c.name}</option> }
                        />
                    </select>
                    <button
                        class="btn btn-sm btn-primary"
                        disabled=move || batch_priority.get().is_none() && batch_category.get().is_none()
                        on:click=handle_batch_update
                    >
                        "应用"
                    </button>
                    <button class="btn btn-sm btn-error gap-2" on:click=handle_batch_delete>
                        <Trash2 attr:class="h-4 w-4" /> "批量删除"
                    </button>
                </div>
            </Show>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>
                                        <input type="checkbox" class="checkbox checkbox-sm"
                                            prop:checked=all_selected
                                            on:change=toggle_all
                                        />
                                    </th>
                                    <th>"标题"</th>
                                    <th>"状态"</th>
                                    <th>"优先级"</th>
                                    <th class="hidden md:table-cell">"分类"</th>
                                    <th class="hidden md:table-cell">"截止时间"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || store.select(|s| s.all_tasks().is_empty()) && !is_loading()>
                                    <tr>
                                        <td colspan="7" class="text-center py-8 text-base-content/50">
                                            "暂无任务。"
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=tasks
                                    key=|t| (t.id, t.status.as_str(), t.priority.as_str(), t.category_id, t.title.clone())
                                    children=move |task| {
                                        let id = task.id;
                                        let completed = task.is_completed();
                                        let category = store.select(|s| {
                                            s.category_name(task.category_id)
                                                .map(str::to_string)
                                                .or_else(|| task.category.as_ref().map(|c| c.name.clone()))
                                                .unwrap_or_else(|| "-".to_string())
                                        });
                                        view! {
                                            <tr>
                                                <td>
                                                    <input type="checkbox" class="checkbox checkbox-sm"
                                                        prop:checked=move || selected.with(|s| s.contains(&id))
                                                        on:change=move |_| toggle_selected(id)
                                                    />
                                                </td>
                                                <td>
                                                    <Link to=AppRoute::TaskDetail(id) class="link link-hover font-bold">
                                                        {task.title.clone()}
                                                    </Link>
                                                </td>
                                                <td><StatusBadge status=task.status /></td>
                                                <td><PriorityBadge priority=task.priority /></td>
                                                <td class="hidden md:table-cell">{category}</td>
                                                <td class="hidden md:table-cell text-sm opacity-70">
                                                    {format_display_opt(task.due_date.as_ref())}
                                                </td>
                                                <td>
                                                    <div class="flex gap-1 justify-end">
                                                        <Show when=move || !completed>
                                                            <button class="btn btn-ghost btn-xs" title="标记完成"
                                                                on:click=move |_| handle_complete(id)>
                                                                <CheckSquare attr:class="h-4 w-4" />
                                                            </button>
                                                        </Show>
                                                        <Link to=AppRoute::TaskEdit(id) class="btn btn-ghost btn-xs">
                                                            <Pencil attr:class="h-4 w-4" />
                                                        </Link>
                                                        <button class="btn btn-ghost btn-xs text-error"
                                                            on:click=move |_| handle_delete(id)>
                                                            <Trash2 attr:class="h-4 w-4" />
                                                        </button>
                                                    </div>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </Layout>
    }
}
