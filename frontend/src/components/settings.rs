//! 个人设置：资料、修改密码、注销账户

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::{ProfileSettingsUpdate, UserUpdate};

use crate::components::icons::Palette;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 空字符串视为未填写
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    view! {
        <Layout title="个人设置">
            <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                <ProfileCard />
                <PasswordCard />
            </div>
            <Link to=AppRoute::ThemeSettings class="btn gap-2">
                <Palette attr:class="h-4 w-4" /> "主题与通知设置"
            </Link>
            <DeleteAccountCard />
        </Layout>
    }
}

#[component]
fn ProfileCard() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();

    let nickname = RwSignal::new(String::new());
    let avatar_url = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let (saving, set_saving) = signal(false);

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_settings().await {
                notifier.error("加载个人资料失败", &e);
                return;
            }
            if let Some(user) = store.snapshot().user {
                nickname.set(user.nickname.unwrap_or_default());
                avatar_url.set(user.avatar_url.unwrap_or_default());
                email.set(user.email);
            }
        });
    });

    let username = move || {
        store.select(|s| {
            s.current_user()
                .map(|u| u.username.clone())
                .unwrap_or_default()
        })
    };
    let role = move || {
        store.select(|s| {
            s.current_user()
                .map(|u| if u.is_admin() { "管理员" } else { "普通用户" })
                .unwrap_or_default()
        })
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_saving.set(true);

        let profile = ProfileSettingsUpdate {
            nickname: Some(nickname.get().trim().to_string()),
            avatar_url: non_empty(avatar_url.get()),
            ..Default::default()
        };
        let new_email = non_empty(email.get())
            .filter(|e| store.select(|s| s.current_user().is_none_or(|u| &u.email != e)));

        let store = store.get();
        spawn_local(async move {
            let result = match store.update_settings(profile).await {
                Ok(_) if new_email.is_some() => {
                    let update = UserUpdate {
                        email: new_email,
                        ..Default::default()
                    };
                    store.update_current_user(update).await.map(|_| ())
                }
                other => other.map(|_| ()),
            };
            match result {
                Ok(()) => notifier.success("个人资料已保存"),
                Err(e) => notifier.error("保存个人资料失败", &e),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">"个人资料"</h3>
                <div class="flex gap-2 text-sm">
                    <span class="opacity-70">"用户名:"</span>
                    <span class="font-mono">{username}</span>
                    <span class="badge badge-outline">{role}</span>
                </div>
                <div class="form-control">
                    <label for="nickname" class="label">
                        <span class="label-text">"昵称"</span>
                    </label>
                    <input id="nickname" type="text" class="input input-bordered w-full"
                        on:input=move |ev| nickname.set(event_target_value(&ev))
                        prop:value=move || nickname.get()
                    />
                </div>
                <div class="form-control">
                    <label for="email" class="label">
                        <span class="label-text">"邮箱"</span>
                    </label>
                    <input id="email" type="email" class="input input-bordered w-full"
                        on:input=move |ev| email.set(event_target_value(&ev))
                        prop:value=move || email.get()
                    />
                </div>
                <div class="form-control">
                    <label for="avatar_url" class="label">
                        <span class="label-text">"头像 URL"</span>
                    </label>
                    <input id="avatar_url" type="url" class="input input-bordered w-full"
                        placeholder="https://"
                        on:input=move |ev| avatar_url.set(event_target_value(&ev))
                        prop:value=move || avatar_url.get()
                    />
                </div>
                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-primary" disabled=move || saving.get()>"保存"</button>
                </div>
            </form>
        </div>
    }
}

#[component]
fn PasswordCard() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();

    let current = RwSignal::new(String::new());
    let new = RwSignal::new(String::new());
    let confirm_new = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if new.get() != confirm_new.get() {
            notifier.warn("两次输入的新密码不一致");
            return;
        }
        let (current_pw, new_pw) = (current.get(), new.get());
        let store = store.get();
        spawn_local(async move {
            match store.change_password(&current_pw, &new_pw).await {
                Ok(resp) => {
                    notifier.success(resp.message);
                    current.set(String::new());
                    new.set(String::new());
                    confirm_new.set(String::new());
                }
                Err(e) => notifier.error("修改密码失败", &e),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">"修改密码"</h3>
                <div class="form-control">
                    <label for="current_password" class="label">
                        <span class="label-text">"当前密码"</span>
                    </label>
                    <input id="current_password" type="password" required class="input input-bordered w-full"
                        autocomplete="current-password"
                        on:input=move |ev| current.set(event_target_value(&ev))
                        prop:value=move || current.get()
                    />
                </div>
                <div class="form-control">
                    <label for="new_password" class="label">
                        <span class="label-text">"新密码"</span>
                    </label>
                    <input id="new_password" type="password" required class="input input-bordered w-full"
                        autocomplete="new-password"
                        on:input=move |ev| new.set(event_target_value(&ev))
                        prop:value=move || new.get()
                    />
                </div>
                <div class="form-control">
                    <label for="confirm_password" class="label">
                        <span class="label-text">"确认新密码"</span>
                    </label>
                    <input id="confirm_password" type="password" required class="input input-bordered w-full"
                        autocomplete="new-password"
                        on:input=move |ev| confirm_new.set(event_target_value(&ev))
                        prop:value=move || confirm_new.get()
                    />
                </div>
                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-primary">"修改密码"</button>
                </div>
            </form>
        </div>
    }
}

#[component]
fn DeleteAccountCard() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let password = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if !confirm("注销后所有任务和数据都将被删除，且无法恢复。确定继续吗？") {
            return;
        }
        let pw = password.get();
        let store = store.get();
        spawn_local(async move {
            // 成功后 store 登出，路由跳转到登录页
            match store.delete_account(&pw).await {
                Ok(resp) => notifier.success(resp.message),
                Err(e) => notifier.error("注销账户失败", &e),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl border border-error/30">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title text-error">"注销账户"</h3>
                <p class="text-sm text-base-content/70">"请输入密码确认。此操作不可撤销。"</p>
                <div class="flex gap-2">
                    <input type="password" required class="input input-bordered flex-1"
                        placeholder="密码"
                        on:input=move |ev| password.set(event_target_value(&ev))
                        prop:value=move || password.get()
                    />
                    <button class="btn btn-error">"注销账户"</button>
                </div>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_left_out() {
        assert_eq!(non_empty("  ".into()), None);
        assert_eq!(non_empty(" a@b.c ".into()), Some("a@b.c".to_string()));
    }
}
