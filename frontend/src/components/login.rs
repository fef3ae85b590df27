use crate::components::icons::CheckSquare;
use crate::components::toast::use_notifier;
use crate::store::use_store;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::RegisterRequest;

/// 登录 / 注册页面共用的外框
#[component]
fn AuthCard(subtitle: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <CheckSquare attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"TaskHub"</h1>
                        <p class="text-base-content/70">{subtitle}</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">{children()}</div>
            </div>
        </div>
    }
}

#[component]
fn ErrorAlert(message: ReadSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div role="alert" class="alert alert-error text-sm py-2">
                <svg xmlns="http://www.w3.org/2000/svg" class="stroke-current shrink-0 h-6 w-6" fill="none" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M10 14l2-2m0 0l2-2m-2 2l-2-2m2 2l2 2m7-2a9 9 0 11-18 0 9 9 0 0118 0z" /></svg>
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let store = use_store();
    let router = use_router();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if username.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("请输入用户名和密码".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let store = store.get();
        spawn_local(async move {
            match store.login(username.get_untracked().trim(), &password.get_untracked()).await {
                Ok(_) => router.go(AppRoute::auth_success_redirect()),
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <AuthCard subtitle="登录以管理您的任务">
            <form class="card-body" on:submit=on_submit>
                <ErrorAlert message=error_msg />

                <div class="form-control">
                    <label class="label" for="username">
                        <span class="label-text">"用户名"</span>
                    </label>
                    <input
                        id="username"
                        type="text"
                        autocomplete="username"
                        on:input=move |ev| set_username.set(event_target_value(&ev))
                        prop:value=username
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control">
                    <label class="label" for="password">
                        <span class="label-text">"密码"</span>
                    </label>
                    <input
                        id="password"
                        type="password"
                        placeholder="••••••••"
                        autocomplete="current-password"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                        class="input input-bordered"
                        required
                    />
                </div>
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "登录中..." }.into_any()
                        } else {
                            "登录".into_any()
                        }}
                    </button>
                </div>
                <p class="text-sm text-center mt-2">
                    "还没有账号？" <Link to=AppRoute::Register class="link link-primary">"注册"</Link>
                </p>
            </form>
        </AuthCard>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let store = use_store();
    let router = use_router();
    let notifier = use_notifier();

    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if password.get() != confirm.get() {
            set_error_msg.set(Some("两次输入的密码不一致".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let req = RegisterRequest {
            username: username.get().trim().to_string(),
            email: email.get().trim().to_string(),
            password: password.get(),
        };
        let store = store.get();
        spawn_local(async move {
            match store.register(req).await {
                Ok(_) => {
                    notifier.success("注册成功，请登录");
                    router.go(AppRoute::Login);
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <AuthCard subtitle="创建一个新账号">
            <form class="card-body" on:submit=on_submit>
                <ErrorAlert message=error_msg />

                <div class="form-control">
                    <label class="label" for="reg_username">
                        <span class="label-text">"用户名"</span>
                    </label>
                    <input id="reg_username" type="text" required
                        on:input=move |ev| set_username.set(event_target_value(&ev))
                        prop:value=username
                        class="input input-bordered"
                    />
                </div>
                <div class="form-control">
                    <label class="label" for="reg_email">
                        <span class="label-text">"邮箱"</span>
                    </label>
                    <input id="reg_email" type="email" required
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        prop:value=email
                        class="input input-bordered"
                    />
                </div>
                <div class="grid grid-cols-2 gap-4">
                    <div class="form-control">
                        <label class="label" for="reg_password">
                            <span class="label-text">"密码"</span>
                        </label>
                        <input id="reg_password" type="password" required
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                            prop:value=password
                            class="input input-bordered w-full"
                        />
                    </div>
                    <div class="form-control">
                        <label class="label" for="reg_confirm">
                            <span class="label-text">"确认密码"</span>
                        </label>
                        <input id="reg_confirm" type="password" required
                            on:input=move |ev| set_confirm.set(event_target_value(&ev))
                            prop:value=confirm
                            class="input input-bordered w-full"
                        />
                    </div>
                </div>
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "提交中..." }.into_any()
                        } else {
                            "注册".into_any()
                        }}
                    </button>
                </div>
                <p class="text-sm text-center mt-2">
                    "已有账号？" <Link to=AppRoute::Login class="link link-primary">"登录"</Link>
                </p>
            </form>
        </AuthCard>
    }
}
