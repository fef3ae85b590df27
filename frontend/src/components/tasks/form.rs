//! 创建 / 编辑任务
//!
//! 两个路由共用同一个表单，`task_id` 为 `Some` 时先加载任务再填充。

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::date::{format_input, parse_input};
use taskhub_shared::{Priority, Task, TaskCreate, TaskStatus, TaskUpdate};

use super::parse_optional_id;
use crate::components::layout::Layout;
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 表单状态
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，可以直接移入各个事件闭包。
#[derive(Clone, Copy)]
struct FormState {
    title: RwSignal<String>,
    description: RwSignal<String>,
    /// `datetime-local` 输入框的原始值
    due_date: RwSignal<String>,
    priority: RwSignal<Priority>,
    category_id: RwSignal<Option<i64>>,
    is_public: RwSignal<bool>,
    status: RwSignal<TaskStatus>,
}

impl FormState {
    fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            due_date: RwSignal::new(String::new()),
            priority: RwSignal::new(Priority::Medium),
            category_id: RwSignal::new(None),
            is_public: RwSignal::new(false),
            status: RwSignal::new(TaskStatus::Pending),
        }
    }

    /// 用已有任务填充
    fn fill(&self, task: &Task) {
        self.title.set(task.title.clone());
        self.description.set(task.description.clone().unwrap_or_default());
        self.due_date
            .set(task.due_date.as_ref().map(format_input).unwrap_or_default());
        self.priority.set(task.priority);
        self.category_id.set(task.category_id);
        self.is_public.set(task.is_public);
        self.status.set(task.status);
    }

    fn description_opt(&self) -> Option<String> {
        let description = self.description.get();
        if description.trim().is_empty() {
            None
        } else {
            Some(description)
        }
    }

    fn to_create(&self) -> TaskCreate {
        TaskCreate {
            title: self.title.get().trim().to_string(),
            description: self.description_opt(),
            due_date: parse_input(&self.due_date.get()),
            priority: self.priority.get(),
            category_id: self.category_id.get(),
            is_public: self.is_public.get(),
        }
    }

    fn to_update(&self) -> TaskUpdate {
        TaskUpdate {
            title: Some(self.title.get().trim().to_string()),
            description: Some(self.description.get()),
            due_date: parse_input(&self.due_date.get()),
            priority: Some(self.priority.get()),
            category_id: self.category_id.get(),
            is_public: Some(self.is_public.get()),
            status: Some(self.status.get()),
        }
    }
}

#[component]
pub fn TaskFormPage(
    /// 编辑时的任务 ID，创建时为 `None`
    task_id: Option<i64>,
) -> impl IntoView {
    let store = use_store();
    let router = use_router();
    let notifier = use_notifier();
    let form = FormState::new();
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_categories().await {
                notifier.error("加载分类失败", &e);
            }
            if let Some(id) = task_id {
                match store.fetch_task(id).await {
                    Ok(task) => form.fill(&task),
                    Err(e) => notifier.error("加载任务失败", &e),
                }
            }
        });
    });

    let categories = move || store.select(|s| s.task_categories().to_vec());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if form.title.get().trim().is_empty() {
            set_error_msg.set(Some("标题不能为空".to_string()));
            return;
        }
        if !form.due_date.get().is_empty() && parse_input(&form.due_date.get()).is_none() {
            set_error_msg.set(Some("截止时间格式不正确".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let store = store.get();
        spawn_local(async move {
            let result = match task_id {
                Some(id) => store.update_task(id, form.to_update()).await,
                None => store.create_task(form.to_create()).await,
            };
            match result {
                Ok(task) => {
                    notifier.success(if task_id.is_some() { "任务已保存" } else { "任务已创建" });
                    router.go(AppRoute::TaskDetail(task.id));
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    let on_cancel = move |_| match task_id {
        Some(id) => router.go(AppRoute::TaskDetail(id)),
        None => router.go(AppRoute::Tasks),
    };

    let title = if task_id.is_some() { "编辑任务" } else { "创建任务" };

    view! {
        <Layout title=title>
            <div class="card bg-base-100 shadow-xl max-w-2xl">
                <form class="card-body space-y-2" on:submit=on_submit>
                    <Show when=move || error_msg.get().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error_msg.get().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <div class="form-control">
                        <label for="title" class="label">
                            <span class="label-text">"标题"</span>
                        </label>
                        <input id="title" required
                            type="text"
                            on:input=move |ev| form.title.set(event_target_value(&ev))
                            prop:value=move || form.title.get()
                            class="input input-bordered w-full"
                        />
                    </div>

                    <div class="form-control">
                        <label for="description" class="label">
                            <span class="label-text">"描述"</span>
                        </label>
                        <textarea id="description"
                            rows="4"
                            on:input=move |ev| form.description.set(event_target_value(&ev))
                            prop:value=move || form.description.get()
                            class="textarea textarea-bordered w-full"
                        ></textarea>
                    </div>

                    <div class="grid grid-cols-2 gap-4">
                        <div class="form-control">
                            <label for="due_date" class="label">
                                <span class="label-text">"截止时间"</span>
                            </label>
                            <input id="due_date"
                                type="datetime-local"
                                on:input=move |ev| form.due_date.set(event_target_value(&ev))
                                prop:value=move || form.due_date.get()
                                class="input input-bordered w-full"
                            />
                        </div>
                        <div class="form-control">
                            <label class="label">
                                <span class="label-text">"优先级"</span>
                            </label>
                            <select
                                class="select select-bordered w-full"
                                on:change=move |ev| {
                                    if let Some(p) = Priority::parse(&event_target_value(&ev)) {
                                        form.priority.set(p);
                                    }
                                }
                            >
                                {Priority::ALL
                                    .iter()
                                    .map(|&p| view! {
                                        <option value=p.as_str() selected=move || form.priority.get() == p>{p.label()}</option>
                                    })
                                    .collect_view()}
                            </select>
                        </div>
                    </div>

                    <div class="grid grid-cols-2 gap-4">
                        <div class="form-control">
                            <label class="label">
                                <span class="label-text">"分类"</span>
                            </label>
                            <select
                                class="select select-bordered w-full"
                                on:change=move |ev| form.category_id.set(parse_optional_id(&event_target_value(&ev)))
                            >
                                <option value="" selected=move || form.category_id.get().is_none()>"无分类"</option>
                                <For
                                    each=categories
                                    key=|c| c.id
                                    children=move |c| {
                                        let id = c.id;
                                        view! {
                                            <option value=id.to_string() selected=move || form.category_id.get() == Some(id)>
                                                {c.name}
                                            </option>
                                        }
                                    }
                                />
                            </select>
                        </div>
                        <Show when=move || task_id.is_some()>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"状态"</span>
                                </label>
                                <select
                                    class="select select-bordered w-full"
                                    on:change=move |ev| {
                                        if let Some(s) = TaskStatus::parse(&event_target_value(&ev)) {
                                            form.status.set(s);
                                        }
                                    }
                                >
                                    {[TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed]
                                        .into_iter()
                                        .map(|s| view! {
                                            <option value=s.as_str() selected=move || form.status.get() == s>{s.label()}</option>
                                        })
                                        .collect_view()}
                                </select>
                            </div>
                        </Show>
                    </div>

                    <div class="form-control">
                        <label class="label cursor-pointer justify-start gap-4">
                            <input type="checkbox" class="toggle toggle-primary"
                                prop:checked=move || form.is_public.get()
                                on:change=move |ev| form.is_public.set(event_target_checked(&ev))
                            />
                            <span class="label-text">"公开任务"</span>
                        </label>
                    </div>

                    <div class="card-actions justify-end mt-4">
                        <button type="button" class="btn btn-ghost" on:click=on_cancel>"取消"</button>
                        <button class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() {
                                view! { <span class="loading loading-spinner"></span> "保存中..." }.into_any()
                            } else {
                                "保存".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </Layout>
    }
}
