//! 提醒管理
//!
//! `/reminders` 显示全部提醒，`/reminders/tasks/:id` 只显示单个任务的提醒。

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::date::{format_display, format_input, parse_input};
use taskhub_shared::{
    Reminder, ReminderCreate, ReminderMethod, ReminderType, ReminderUpdate, TaskQuery,
};

use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 新建 / 编辑共用的表单
#[derive(Clone, Copy)]
struct ReminderForm {
    editing: RwSignal<Option<i64>>,
    task_id: RwSignal<Option<i64>>,
    time: RwSignal<String>,
    kind: RwSignal<ReminderType>,
    method: RwSignal<ReminderMethod>,
}

impl ReminderForm {
    fn new(task_id: Option<i64>, method: ReminderMethod) -> Self {
        Self {
            editing: RwSignal::new(None),
            task_id: RwSignal::new(task_id),
            time: RwSignal::new(String::new()),
            kind: RwSignal::new(ReminderType::Once),
            method: RwSignal::new(method),
        }
    }

    fn fill(&self, reminder: &Reminder) {
        self.editing.set(Some(reminder.id));
        self.task_id.set(Some(reminder.task_id));
        self.time.set(format_input(&reminder.reminder_time));
        self.kind.set(reminder.reminder_type);
        self.method.set(reminder.method);
    }

    fn clear(&self) {
        self.editing.set(None);
        self.time.set(String::new());
        self.kind.set(ReminderType::Once);
    }
}

#[component]
pub fn RemindersPage(
    /// 只显示该任务的提醒
    task_id: Option<i64>,
) -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let default_method = store.select(|s| s.app_settings().default_reminder_method);
    let form = ReminderForm::new(task_id, default_method);

    let load = move || {
        let store = store.get();
        spawn_local(async move {
            let result = match task_id {
                Some(id) => store.fetch_task_reminders(id).await,
                None => store.fetch_reminders().await,
            };
            if let Err(e) = result {
                notifier.error("加载提醒失败", &e);
            }
            // 任务标题用于显示和选择
            if let Err(e) = store.fetch_tasks(TaskQuery::default()).await {
                log::warn!("加载任务失败: {}", e);
            }
        });
    };

    Effect::new(move |_| load());

    let reminders = move || {
        store.select(|s| match task_id {
            Some(id) => s.reminders_for_task(id).into_iter().cloned().collect(),
            None => s.all_reminders().to_vec(),
        })
    };
    let tasks = move || {
        store.select(|s| {
            s.all_tasks()
                .iter()
                .map(|t| (t.id, t.title.clone()))
                .collect::<Vec<_>>()
        })
    };
    let task_title = move |id: i64| {
        store.select(|s| {
            s.all_tasks()
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.title.clone())
                .unwrap_or_else(|| format!("任务 #{}", id))
        })
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(reminder_time) = parse_input(&form.time.get()) else {
            notifier.warn("请选择提醒时间");
            return;
        };
        let Some(target_task) = form.task_id.get() else {
            notifier.warn("请选择任务");
            return;
        };

        let store = store.get();
        let editing = form.editing.get();
        let (kind, method) = (form.kind.get(), form.method.get());
        spawn_local(async move {
            let result = match editing {
                Some(id) => {
                    let update = ReminderUpdate {
                        task_id: Some(target_task),
                        reminder_time: Some(reminder_time),
                        reminder_type: Some(kind),
                        method: Some(method),
                        ..Default::default()
                    };
                    store.update_reminder(id, update).await
                }
                None => {
                    let create = ReminderCreate {
                        task_id: target_task,
                        reminder_time,
                        reminder_type: kind,
                        method,
                    };
                    store.create_reminder(create).await
                }
            };
            match result {
                Ok(_) => {
                    notifier.success("提醒已保存");
                    form.clear();
                }
                Err(e) => notifier.error("保存提醒失败", &e),
            }
        });
    };

    let on_toggle = move |id: i64, active: bool| {
        let store = store.get();
        spawn_local(async move {
            match store.toggle_reminder(id, active).await {
                Ok(r) => notifier.success(if r.is_active { "提醒已启用" } else { "提醒已停用" }),
                Err(e) => notifier.error("切换提醒失败", &e),
            }
        });
    };

    let on_delete = move |id: i64| {
        if !confirm("确定删除该提醒吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_reminder(id).await {
                Ok(()) => notifier.success("提醒已删除"),
                Err(e) => notifier.error("删除提醒失败", &e),
            }
        });
    };

    let is_loading = move || store.select(|s| s.is_loading());

    view! {
        <Layout title="提醒管理">
            {task_id.map(|id| view! {
                <div class="flex items-center gap-2">
                    <span class="opacity-70">"任务:"</span>
                    <Link to=AppRoute::TaskDetail(id) class="link link-primary font-bold">
                        {move || task_title(id)}
                    </Link>
                    <Link to=AppRoute::Reminders class="btn btn-ghost btn-xs">"查看全部"</Link>
                </div>
            })}

            <div class="card bg-base-100 shadow-xl">
                <form class="card-body flex-row flex-wrap items-end gap-4" on:submit=on_submit>
                    <Show when=move || task_id.is_none()>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"任务"</span></label>
                            <select class="select select-bordered select-sm"
                                on:change=move |ev| form.task_id.set(event_target_value(&ev).parse().ok())
                            >
                                <option value="" selected=move || form.task_id.get().is_none()>"请选择"</option>
                                <For
                                    each=tasks
                                    key=|(id, title)| (*id, title.clone())
                                    children=move |(id, title)| view! {
                                        <option value=id.to_string() selected=move || form.task_id.get() == Some(id)>{title}</option>
                                    }
                                />
                            </select>
                        </div>
                    </Show>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"提醒时间"</span></label>
                        <input type="datetime-local" class="input input-bordered input-sm"
                            on:input=move |ev| form.time.set(event_target_value(&ev))
                            prop:value=move || form.time.get()
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"重复"</span></label>
                        <select class="select select-bordered select-sm"
                            on:change=move |ev| {
                                if let Some(t) = ReminderType::parse(&event_target_value(&ev)) {
                                    form.kind.set(t);
                                }
                            }
                        >
                            {ReminderType::ALL
                                .iter()
                                .map(|&t| view! { <option value=t.as_str() selected=move || form.kind.get() == t>{t.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"方式"</span></label>
                        <select class="select select-bordered select-sm"
                            on:change=move |ev| {
                                if let Some(m) = ReminderMethod::parse(&event_target_value(&ev)) {
                                    form.method.set(m);
                                }
                            }
                        >
                            {ReminderMethod::ALL
                                .iter()
                                .map(|&m| view! { <option value=m.as_str() selected=move || form.method.get() == m>{m.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <button class="btn btn-primary btn-sm gap-2">
                        <Bell attr:class="h-4 w-4" />
                        {move || if form.editing.get().is_some() { "保存修改" } else { "添加提醒" }}
                    </button>
                    <Show when=move || form.editing.get().is_some()>
                        <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| form.clear()>"取消"</button>
                    </Show>
                    <div class="flex-1"></div>
                    <button type="button" on:click=move |_| load() disabled=is_loading class="btn btn-ghost btn-circle btn-sm">
                        <RefreshCw attr:class=move || if is_loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                    </button>
                </form>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"任务"</th>
                                <th>"提醒时间"</th>
                                <th>"重复"</th>
                                <th>"方式"</th>
                                <th>"启用"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || reminders().is_empty() && !is_loading()>
                                <tr>
                                    <td colspan="6" class="text-center py-8 text-base-content/50">"暂无提醒。"</td>
                                </tr>
                            </Show>
                            <For
                                each=reminders
                                key=|r| (r.id, r.is_active, r.reminder_time, r.reminder_type.as_str(), r.method.as_str())
                                children=move |r| {
                                    let id = r.id;
                                    let active = r.is_active;
                                    let task = r.task_id;
                                    let for_edit = r.clone();
                                    view! {
                                        <tr>
                                            <td>
                                                <Link to=AppRoute::TaskReminders(task) class="link link-hover">
                                                    {move || task_title(task)}
                                                </Link>
                                            </td>
                                            <td class="font-mono text-sm">{format_display(&r.reminder_time)}</td>
                                            <td>{r.reminder_type.label()}</td>
                                            <td>{r.method.label()}</td>
                                            <td>
                                                <input type="checkbox" class="toggle toggle-sm toggle-success"
                                                    prop:checked=active
                                                    on:change=move |_| on_toggle(id, !active)
                                                />
                                            </td>
                                            <td>
                                                <div class="flex gap-1 justify-end">
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| form.fill(&for_edit)>
                                                        <Pencil attr:class="h-4 w-4" />
                                                    </button>
                                                    <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete(id)>
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
        </Layout>
    }
}
