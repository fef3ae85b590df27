use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::TaskQuery;
use taskhub_shared::date::format_display_opt;

use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 评论管理：先选择任务，再查看和编辑它的评论
#[component]
pub fn CommentsPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();

    let selected = RwSignal::new(Option::<i64>::None);
    let draft = RwSignal::new(String::new());
    // (评论 id, 编辑中的内容)
    let editing = RwSignal::new(Option::<(i64, String)>::None);

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_tasks(TaskQuery::default()).await {
                notifier.error("加载任务失败", &e);
            }
        });
    });

    Effect::new(move |_| {
        let Some(task_id) = selected.get() else {
            return;
        };
        editing.set(None);
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_comments(task_id).await {
                notifier.error("加载评论失败", &e);
            }
        });
    });

    let tasks = move || {
        store.select(|s| {
            s.all_tasks()
                .iter()
                .map(|t| (t.id, t.title.clone()))
                .collect::<Vec<_>>()
        })
    };
    let comments = move || {
        let task_id = selected.get();
        store.select(|s| {
            s.comments
                .iter()
                .filter(|c| Some(c.task_id) == task_id)
                .cloned()
                .collect::<Vec<_>>()
        })
    };
    let current_user_id = move || store.select(|s| s.current_user().map(|u| u.id));

    let on_add = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let content = draft.get().trim().to_string();
        let Some(task_id) = selected.get() else {
            notifier.warn("请先选择任务");
            return;
        };
        if content.is_empty() {
            notifier.warn("评论内容不能为空");
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.add_comment(task_id, &content).await {
                Ok(_) => {
                    notifier.success("评论已发布");
                    draft.set(String::new());
                }
                Err(e) => notifier.error("发布评论失败", &e),
            }
        });
    };

    let on_save_edit = move || {
        let Some((id, content)) = editing.get() else {
            return;
        };
        let content = content.trim().to_string();
        if content.is_empty() {
            notifier.warn("评论内容不能为空");
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.edit_comment(id, &content).await {
                Ok(_) => {
                    notifier.success("评论已更新");
                    editing.set(None);
                }
                Err(e) => notifier.error("更新评论失败", &e),
            }
        });
    };

    let on_delete = move |id: i64| {
        if !confirm("确定删除该评论吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_comment(id).await {
                Ok(()) => notifier.success("评论已删除"),
                Err(e) => notifier.error("删除评论失败", &e),
            }
        });
    };

    view! {
        <Layout title="评论管理">
            <div class="flex flex-wrap items-center gap-4">
                <select class="select select-bordered"
                    on:change=move |ev| selected.set(event_target_value(&ev).parse().ok())
                >
                    <option value="" selected=move || selected.get().is_none()>"选择任务"</option>
                    <For
                        each=tasks
                        key=|(id, title)| (*id, title.clone())
                        children=move |(id, title)| view! {
                            <option value=id.to_string() selected=move || selected.get() == Some(id)>{title}</option>
                        }
                    />
                </select>
                {move || selected.get().map(|id| view! {
                    <Link to=AppRoute::TaskDetail(id) class="link link-primary">"查看任务"</Link>
                })}
            </div>

            <Show
                when=move || selected.get().is_some()
                fallback=|| view! {
                    <div class="text-center py-12 text-base-content/50">
                        <MessageSquare attr:class="h-12 w-12 mx-auto mb-2 opacity-30" />
                        "选择一个任务查看评论"
                    </div>
                }
            >
                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body" on:submit=on_add>
                        <textarea class="textarea textarea-bordered w-full" rows="3" placeholder="写下评论..."
                            on:input=move |ev| draft.set(event_target_value(&ev))
                            prop:value=move || draft.get()
                        ></textarea>
                        <div class="card-actions justify-end">
                            <button class="btn btn-primary btn-sm">"发布"</button>
                        </div>
                    </form>
                </div>

                <div class="space-y-3">
                    <Show when=move || comments().is_empty()>
                        <p class="text-center py-8 text-base-content/50">"暂无评论。"</p>
                    </Show>
                    <For
                        each=comments
                        key=|c| (c.id, c.content.clone())
                        children=move |c| {
                            let id = c.id;
                            let own = current_user_id() == Some(c.user_id);
                            let original = c.content.clone();
                            let is_editing = move || editing.with(|e| e.as_ref().is_some_and(|(eid, _)| *eid == id));
                            view! {
                                <div class="card bg-base-100 shadow">
                                    <div class="card-body p-4">
                                        <div class="flex justify-between text-xs opacity-60">
                                            <span>{format!("用户 #{}", c.user_id)}</span>
                                            <span>{format_display_opt(c.created_at.as_ref())}</span>
                                        </div>
                                        <Show
                                            when=is_editing
                                            fallback={
                                                let content = c.content.clone();
                                                move || view! { <p class="whitespace-pre-wrap">{content.clone()}</p> }
                                            }
                                        >
                                            <textarea class="textarea textarea-bordered w-full" rows="3"
                                                prop:value=move || editing.with(|e| e.as_ref().map(|(_, t)| t.clone()).unwrap_or_default())
                                                on:input=move |ev| editing.set(Some((id, event_target_value(&ev))))
                                            ></textarea>
                                            <div class="flex gap-2 justify-end">
                                                <button class="btn btn-ghost btn-xs" on:click=move |_| editing.set(None)>"取消"</button>
                                                <button class="btn btn-primary btn-xs" on:click=move |_| on_save_edit()>"保存"</button>
                                            </div>
                                        </Show>
                                        <Show when=move || own && !is_editing()>
                                            <div class="flex gap-1 justify-end">
                                                <button class="btn btn-ghost btn-xs"
                                                    on:click={
                                                        let original = original.clone();
                                                        move |_| editing.set(Some((id, original.clone())))
                                                    }
                                                >
                                                    <Pencil attr:class="h-4 w-4" />
                                                </button>
                                                <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete(id)>
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            </div>
                                        </Show>
                                    </div>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        </Layout>
    }
}
