//! 用户管理（仅管理员）

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::{PageQuery, User, UserCreate, UserRole, UserUpdate};

use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;

const PAGE_SIZE: u32 = 10;

fn page_query(page: u32) -> PageQuery {
    PageQuery {
        skip: Some(page * PAGE_SIZE),
        limit: Some(PAGE_SIZE),
    }
}

/// 拉取到整页才可能还有下一页；本页的增删不影响判断
fn has_next_page(fetched: usize) -> bool {
    fetched >= PAGE_SIZE as usize
}

#[derive(Clone, Copy)]
struct UserForm {
    editing: RwSignal<Option<i64>>,
    username: RwSignal<String>,
    email: RwSignal<String>,
    password: RwSignal<String>,
    role: RwSignal<UserRole>,
}

impl UserForm {
    fn new() -> Self {
        Self {
            editing: RwSignal::new(None),
            username: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            role: RwSignal::new(UserRole::User),
        }
    }

    fn fill(&self, user: &User) {
        self.editing.set(Some(user.id));
        self.username.set(user.username.clone());
        self.email.set(user.email.clone());
        self.password.set(String::new());
        self.role.set(user.role);
    }

    fn clear(&self) {
        self.editing.set(None);
        self.username.set(String::new());
        self.email.set(String::new());
        self.password.set(String::new());
        self.role.set(UserRole::User);
    }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let page = RwSignal::new(0u32);
    let form = UserForm::new();
    // 最近一次拉取到的用户数
    let fetched = RwSignal::new(0usize);

    let load = move |p: u32| {
        let store = store.get();
        spawn_local(async move {
            match store.fetch_users(page_query(p)).await {
                Ok(n) => fetched.set(n),
                Err(e) => notifier.error("加载用户失败", &e),
            }
        });
    };

    Effect::new(move |_| load(page.get()));

    let users = move || store.select(|s| s.all_users().to_vec());
    let total = move || store.select(|s| s.users_total());
    let is_last_page = move || !has_next_page(fetched.get());
    let current_user_id = move || store.select(|s| s.current_user().map(|u| u.id));

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let username = form.username.get().trim().to_string();
        let email = form.email.get().trim().to_string();
        let password = form.password.get();
        let role = form.role.get();
        if username.is_empty() || email.is_empty() {
            notifier.warn("用户名和邮箱不能为空");
            return;
        }

        let store = store.get();
        match form.editing.get() {
            Some(id) => spawn_local(async move {
                let update = UserUpdate {
                    username: Some(username),
                    email: Some(email),
                    role: Some(role),
                };
                let result = match store.update_user(id, update).await {
                    // 填写了密码时一并重置
                    Ok(_) if !password.is_empty() => {
                        store.reset_user_password(id, &password).await.map(|_| ())
                    }
                    other => other.map(|_| ()),
                };
                match result {
                    Ok(()) => {
                        notifier.success("用户已更新");
                        form.clear();
                    }
                    Err(e) => notifier.error("更新用户失败", &e),
                }
            }),
            None => {
                if password.is_empty() {
                    notifier.warn("新用户必须设置密码");
                    return;
                }
                spawn_local(async move {
                    let create = UserCreate {
                        username,
                        email,
                        password,
                        role,
                    };
                    match store.create_user(create).await {
                        Ok(u) => {
                            notifier.success(format!("用户 {} 已创建", u.username));
                            form.clear();
                        }
                        Err(e) => notifier.error("创建用户失败", &e),
                    }
                });
            }
        }
    };

    let on_delete = move |id: i64| {
        if !confirm("确定删除该用户吗？其全部数据将被删除。") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_user(id).await {
                Ok(()) => notifier.success("用户已删除"),
                Err(e) => notifier.error("删除用户失败", &e),
            }
        });
    };

    view! {
        <Layout title="用户管理">
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body flex-row flex-wrap items-end gap-4" on:submit=on_submit>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"用户名"</span></label>
                        <input type="text" class="input input-bordered input-sm"
                            on:input=move |ev| form.username.set(event_target_value(&ev))
                            prop:value=move || form.username.get()
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"邮箱"</span></label>
                        <input type="email" class="input input-bordered input-sm"
                            on:input=move |ev| form.email.set(event_target_value(&ev))
                            prop:value=move || form.email.get()
                        />
                    </div>
                    <div class="form-control">
                        <label class="label">
                            <span class="label-text">
                                {move || if form.editing.get().is_some() { "新密码（留空不修改）" } else { "密码" }}
                            </span>
                        </label>
                        <input type="password" class="input input-bordered input-sm" autocomplete="new-password"
                            on:input=move |ev| form.password.set(event_target_value(&ev))
                            prop:value=move || form.password.get()
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"角色"</span></label>
                        <select class="select select-bordered select-sm"
                            on:change=move |ev| {
                                if let Some(r) = UserRole::parse(&event_target_value(&ev)) {
                                    form.role.set(r);
                                }
                            }
                        >
                            {UserRole::ALL
                                .iter()
                                .map(|&r| view! { <option value=r.as_str() selected=move || form.role.get() == r>{r.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <button class="btn btn-primary btn-sm gap-2">
                        {move || if form.editing.get().is_some() {
                            view! { <Pencil attr:class="h-4 w-4" /> "保存修改" }.into_any()
                        } else {
                            view! { <Plus attr:class="h-4 w-4" /> "添加用户" }.into_any()
                        }}
                    </button>
                    <Show when=move || form.editing.get().is_some()>
                        <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| form.clear()>"取消"</button>
                    </Show>
                </form>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"ID"</th>
                                <th>"用户名"</th>
                                <th>"邮箱"</th>
                                <th>"角色"</th>
                                <th>"状态"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=users
                                key=|u| (u.id, u.username.clone(), u.email.clone(), u.role.as_str())
                                children=move |u| {
                                    let id = u.id;
                                    let is_self = current_user_id() == Some(id);
                                    let for_edit = u.clone();
                                    view! {
                                        <tr>
                                            <td class="font-mono opacity-60">{id}</td>
                                            <td class="font-bold">{u.username.clone()}</td>
                                            <td>{u.email.clone()}</td>
                                            <td>
                                                <span class=if u.is_admin() { "badge badge-primary" } else { "badge badge-ghost" }>
                                                    {u.role.label()}
                                                </span>
                                            </td>
                                            <td>{if u.is_active { "正常" } else { "已停用" }}</td>
                                            <td>
                                                <div class="flex gap-1 justify-end">
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| form.fill(&for_edit)>
                                                        <Pencil attr:class="h-4 w-4" />
                                                    </button>
                                                    <button class="btn btn-ghost btn-xs text-error" disabled=is_self on:click=move |_| on_delete(id)>
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

            <div class="flex items-center justify-between">
                <span class="text-sm opacity-70">{move || format!("本页 {} 位用户", total())}</span>
                <div class="join">
                    <button class="join-item btn btn-sm" disabled=move || page.get() == 0
                        on:click=move |_| page.update(|p| *p = p.saturating_sub(1))
                    >"«"</button>
                    <button class="join-item btn btn-sm">
                        {move || format!("第 {} 页", page.get() + 1)}
                    </button>
                    <button class="join-item btn btn-sm" disabled=is_last_page
                        on:click=move |_| page.update(|p| *p += 1)
                    >"»"</button>
                </div>
            </div>
        </Layout>
    }
}
