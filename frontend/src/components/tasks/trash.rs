use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::date::format_display_opt;

use super::PriorityBadge;
use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;

/// 回收站：恢复或永久删除
#[component]
pub fn TrashPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();

    let load = move || {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_deleted_tasks().await {
                notifier.error("加载回收站失败", &e);
            }
        });
    };

    Effect::new(move |_| load());

    let handle_restore = move |id: i64| {
        let store = store.get();
        spawn_local(async move {
            match store.restore_task(id).await {
                Ok(task) => notifier.success(format!("已恢复「{}」", task.title)),
                Err(e) => notifier.error("恢复任务失败", &e),
            }
        });
    };

    let handle_purge = move |id: i64| {
        if !confirm("永久删除后无法恢复，确定继续吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.purge_task(id).await {
                Ok(()) => notifier.success("任务已永久删除"),
                Err(e) => notifier.error("永久删除失败", &e),
            }
        });
    };

    let deleted = move || store.select(|s| s.deleted_tasks.clone());
    let is_loading = move || store.select(|s| s.is_loading());

    view! {
        <Layout title="回收站">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <p class="text-base-content/70 text-sm">"删除的任务会保留在这里，可以恢复或永久删除。"</p>
                        <button on:click=move |_| load() disabled=is_loading class="btn btn-ghost btn-circle">
                            <RefreshCw attr:class=move || if is_loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                        </button>
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"标题"</th>
                                    <th>"优先级"</th>
                                    <th class="hidden md:table-cell">"删除时间"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || deleted().is_empty() && !is_loading()>
                                    <tr>
                                        <td colspan="4" class="text-center py-8 text-base-content/50">
                                            "回收站是空的。"
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=deleted
                                    key=|t| t.id
                                    children=move |task| {
                                        let id = task.id;
                                        view! {
                                            <tr>
                                                <td class="font-bold">{task.title.clone()}</td>
                                                <td><PriorityBadge priority=task.priority /></td>
                                                <td class="hidden md:table-cell text-sm opacity-70">
                                                    {format_display_opt(task.deleted_at.as_ref())}
                                                </td>
                                                <td>
                                                    <div class="flex gap-1 justify-end">
                                                        <button class="btn btn-ghost btn-xs gap-1" on:click=move |_| handle_restore(id)>
                                                            <Undo attr:class="h-4 w-4" /> "恢复"
                                                        </button>
                                                        <button class="btn btn-ghost btn-xs gap-1 text-error" on:click=move |_| handle_purge(id)>
                                                            <Trash2 attr:class="h-4 w-4" /> "永久删除"
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
