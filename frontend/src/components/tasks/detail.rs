//! 任务详情：基本信息、附件、评论、提醒

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::date::{format_display, format_display_opt, parse_input};
use taskhub_shared::{Attachment, ReminderCreate, ReminderType, TaskStatus, TaskUpdate};

use super::{PriorityBadge, StatusBadge};
use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::file;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        None => "-".to_string(),
        Some(b) if b < 1024 => format!("{} B", b),
        Some(b) if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

#[component]
pub fn TaskDetailPage(task_id: i64) -> impl IntoView {
    let store = use_store();
    let router = use_router();
    let notifier = use_notifier();

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_task(task_id).await {
                notifier.error("加载任务失败", &e);
                return;
            }
            // 分类名、评论、提醒互不依赖，失败只提示
            if let Err(e) = store.fetch_categories().await {
                log::warn!("加载分类失败: {}", e);
            }
            if let Err(e) = store.fetch_comments(task_id).await {
                notifier.error("加载评论失败", &e);
            }
            if let Err(e) = store.fetch_task_reminders(task_id).await {
                notifier.error("加载提醒失败", &e);
            }
        });
    });

    let task = move || store.select(|s| s.current_task().filter(|t| t.id == task_id).cloned());

    let set_status = move |status: TaskStatus| {
        let store = store.get();
        spawn_local(async move {
            let update = TaskUpdate {
                status: Some(status),
                ..Default::default()
            };
            match store.update_task(task_id, update).await {
                Ok(_) => notifier.success(format!("状态已更新为「{}」", status.label())),
                Err(e) => notifier.error("更新状态失败", &e),
            }
        });
    };

    let on_delete = move |_| {
        if !confirm("确定将该任务移入回收站吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_task(task_id).await {
                Ok(()) => {
                    notifier.success("任务已移入回收站");
                    router.go(AppRoute::Tasks);
                }
                Err(e) => notifier.error("删除任务失败", &e),
            }
        });
    };

    view! {
        <Layout title="任务详情">
            <Show
                when=move || task().is_some()
                fallback=|| view! {
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
            >
                {move || task().map(|task| {
                    let category = store.select(|s| {
                        s.category_name(task.category_id).map(str::to_string)
                    });
                    let status = task.status;
                    view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <div class="flex items-start justify-between gap-4">
                                    <h2 class="card-title text-2xl">{task.title.clone()}</h2>
                                    <div class="flex gap-2">
                                        <Link to=AppRoute::TaskEdit(task_id) class="btn btn-sm gap-2">
                                            <Pencil attr:class="h-4 w-4" /> "编辑"
                                        </Link>
                                        <button class="btn btn-sm btn-error btn-outline gap-2" on:click=on_delete>
                                            <Trash2 attr:class="h-4 w-4" /> "删除"
                                        </button>
                                    </div>
                                </div>
                                <div class="flex flex-wrap gap-2">
                                    <StatusBadge status=task.status />
                                    <PriorityBadge priority=task.priority />
                                    {category.map(|name| view! { <span class="badge badge-primary badge-outline">{name}</span> })}
                                    {task.is_public.then(|| view! { <span class="badge">"公开"</span> })}
                                </div>
                                <p class="whitespace-pre-wrap text-base-content/80">
                                    {task.description.clone().unwrap_or_else(|| "暂无描述".to_string())}
                                </p>
                                <div class="grid grid-cols-1 md:grid-cols-3 gap-2 text-sm opacity-70">
                                    <span>"截止: " {format_display_opt(task.due_date.as_ref())}</span>
                                    <span>"创建: " {format_display_opt(task.created_at.as_ref())}</span>
                                    <span>"更新: " {format_display_opt(task.updated_at.as_ref())}</span>
                                </div>
                                <div class="card-actions">
                                    <Show when=move || status == TaskStatus::Pending>
                                        <button class="btn btn-sm btn-info" on:click=move |_| set_status(TaskStatus::InProgress)>
                                            "开始处理"
                                        </button>
                                    </Show>
                                    <Show when=move || status != TaskStatus::Completed>
                                        <button class="btn btn-sm btn-success" on:click=move |_| set_status(TaskStatus::Completed)>
                                            "标记完成"
                                        </button>
                                    </Show>
                                    <Show when=move || status == TaskStatus::Completed>
                                        <button class="btn btn-sm" on:click=move |_| set_status(TaskStatus::Pending)>
                                            "重新打开"
                                        </button>
                                    </Show>
                                </div>
                            </div>
                        </div>
                    }
                })}

                <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                    <AttachmentsCard task_id=task_id />
                    <RemindersCard task_id=task_id />
                </div>
                <CommentsCard task_id=task_id />
            </Show>
        </Layout>
    }
}

#[component]
fn AttachmentsCard(task_id: i64) -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let file_input = NodeRef::<html::Input>::new();
    let (uploading, set_uploading) = signal(false);

    let attachments = move || store.select(|s| s.attachments.clone());

    let on_upload = move |_| {
        let Some(input) = file_input.get() else {
            return;
        };
        let Some(selected) = file::selected_file(&input) else {
            notifier.warn("请先选择文件");
            return;
        };

        set_uploading.set(true);
        let store = store.get();
        spawn_local(async move {
            match file::read_file(&selected).await {
                Ok(part) => match store.upload_attachment(task_id, part).await {
                    Ok(a) => notifier.success(format!("已上传 {}", a.filename)),
                    Err(e) => notifier.error("上传附件失败", &e),
                },
                Err(e) => {
                    log::error!("读取文件失败: {:?}", e);
                    notifier.warn("读取文件失败");
                }
            }
            input.set_value("");
            set_uploading.set(false);
        });
    };

    let on_download = move |attachment: Attachment| {
        let store = store.get();
        spawn_local(async move {
            match store.download_attachment(&attachment).await {
                Ok(download) => {
                    if let Err(e) = file::save(&download) {
                        log::error!("保存附件失败: {:?}", e);
                    }
                }
                Err(e) => notifier.error("下载附件失败", &e),
            }
        });
    };

    let on_delete = move |attachment_id: i64| {
        if !confirm("确定删除该附件吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_attachment(task_id, attachment_id).await {
                Ok(()) => notifier.success("附件已删除"),
                Err(e) => notifier.error("删除附件失败", &e),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"附件"</h3>
                <div class="flex gap-2">
                    <input type="file" class="file-input file-input-bordered file-input-sm flex-1" node_ref=file_input />
                    <button class="btn btn-sm btn-primary gap-2" disabled=move || uploading.get() on:click=on_upload>
                        <Upload attr:class="h-4 w-4" /> "上传"
                    </button>
                </div>
                <Show
                    when=move || !attachments().is_empty()
                    fallback=|| view! { <p class="text-base-content/50 text-sm">"暂无附件。"</p> }
                >
                    <ul class="divide-y divide-base-200">
                        <For
                            each=attachments
                            key=|a| a.id
                            children=move |a| {
                                let id = a.id;
                                let name = a.filename.clone();
                                let size = format_size(a.size);
                                view! {
                                    <li class="flex items-center justify-between py-2 gap-2">
                                        <span class="truncate">{name}</span>
                                        <span class="text-xs opacity-50">{size}</span>
                                        <div class="flex gap-1">
                                            <button class="btn btn-ghost btn-xs" on:click=move |_| on_download(a.clone())>
                                                <Download attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete(id)>
                                                <Trash2 attr:class="h-4 w-4" />
                                            </button>
                                        </div>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>
            </div>
        </div>
    }
}

#[component]
fn RemindersCard(task_id: i64) -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let (time, set_time) = signal(String::new());
    let (kind, set_kind) = signal(ReminderType::Once);

    let reminders = move || {
        store.select(|s| {
            s.reminders_for_task(task_id)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let on_add = move |_| {
        let Some(reminder_time) = parse_input(&time.get()) else {
            notifier.warn("请选择提醒时间");
            return;
        };
        let reminder = ReminderCreate {
            task_id,
            reminder_time,
            reminder_type: kind.get(),
            method: store.select(|s| s.app_settings().default_reminder_method),
        };
        let store = store.get();
        spawn_local(async move {
            match store.create_reminder(reminder).await {
                Ok(_) => {
                    notifier.success("提醒已创建");
                    set_time.set(String::new());
                }
                Err(e) => notifier.error("创建提醒失败", &e),
            }
        });
    };

    let on_toggle = move |id: i64, active: bool| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.toggle_reminder(id, active).await {
                notifier.error("切换提醒失败", &e);
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h3 class="card-title">"提醒"</h3>
                    <Link to=AppRoute::TaskReminders(task_id) class="link link-primary text-sm">"管理"</Link>
                </div>
                <div class="flex gap-2">
                    <input type="datetime-local" class="input input-bordered input-sm flex-1"
                        on:input=move |ev| set_time.set(event_target_value(&ev))
                        prop:value=time
                    />
                    <select class="select select-bordered select-sm"
                        on:change=move |ev| {
                            if let Some(t) = ReminderType::parse(&event_target_value(&ev)) {
                                set_kind.set(t);
                            }
                        }
                    >
                        {ReminderType::ALL
                            .iter()
                            .map(|&t| view! { <option value=t.as_str() selected=move || kind.get() == t>{t.label()}</option> })
                            .collect_view()}
                    </select>
                    <button class="btn btn-sm btn-primary" on:click=on_add>
                        <Plus attr:class="h-4 w-4" />
                    </button>
                </div>
                <Show
                    when=move || !reminders().is_empty()
                    fallback=|| view! { <p class="text-base-content/50 text-sm">"暂无提醒。"</p> }
                >
                    <ul class="divide-y divide-base-200">
                        <For
                            each=reminders
                            key=|r| (r.id, r.is_active)
                            children=move |r| {
                                let id = r.id;
                                let active = r.is_active;
                                view! {
                                    <li class="flex items-center justify-between py-2">
                                        <span>
                                            {format_display(&r.reminder_time)}
                                            <span class="badge badge-ghost ml-2">{r.reminder_type.label()}</span>
                                            <span class="badge badge-ghost ml-1">{r.method.label()}</span>
                                        </span>
                                        <input type="checkbox" class="toggle toggle-sm toggle-success"
                                            prop:checked=active
                                            on:change=move |_| on_toggle(id, !active)
                                        />
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>
            </div>
        </div>
    }
}

#[component]
fn CommentsCard(task_id: i64) -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let (content, set_content) = signal(String::new());

    let comments = move || store.select(|s| s.comments.clone());
    let current_user_id = move || store.select(|s| s.current_user().map(|u| u.id));

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = content.get().trim().to_string();
        if text.is_empty() {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.add_comment(task_id, &text).await {
                Ok(_) => set_content.set(String::new()),
                Err(e) => notifier.error("发表评论失败", &e),
            }
        });
    };

    let on_delete = move |id: i64| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.delete_comment(id).await {
                notifier.error("删除评论失败", &e);
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"评论"</h3>
                <ul class="space-y-3">
                    <For
                        each=comments
                        key=|c| (c.id, c.content.clone())
                        children=move |c| {
                            let id = c.id;
                            let own = current_user_id() == Some(c.user_id);
                            view! {
                                <li class="chat chat-start">
                                    <div class="chat-header text-xs opacity-50">
                                        {format_display_opt(c.created_at.as_ref())}
                                    </div>
                                    <div class="chat-bubble">{c.content.clone()}</div>
                                    <Show when=move || own>
                                        <div class="chat-footer">
                                            <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete(id)>
                                                "删除"
                                            </button>
                                        </div>
                                    </Show>
                                </li>
                            }
                        }
                    />
                </ul>
                <form class="flex gap-2 mt-2" on:submit=on_submit>
                    <input type="text" class="input input-bordered flex-1" placeholder="写下评论..."
                        on:input=move |ev| set_content.set(event_target_value(&ev))
                        prop:value=content
                    />
                    <button class="btn btn-primary">
                        <MessageSquare attr:class="h-4 w-4" />
                    </button>
                </form>
            </div>
        </div>
    }
}
