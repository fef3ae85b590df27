//! 主题设置
//!
//! 每次修改先提交到本地（页面立即预览），点击保存后才写回服务端。

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::{NightBrightness, ReminderMethod, Theme};

use crate::components::layout::Layout;
use crate::components::toast::use_notifier;
use crate::store::{SettingChange, use_store};

const PRESET_COLORS: &[&str] = &["#ffffff", "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

#[component]
pub fn ThemeSettingsPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let (saving, set_saving) = signal(false);

    let settings = move || store.select(|s| s.app_settings().clone());
    let change = move |c: SettingChange| store.get().update_setting(c);

    let on_save = move |_| {
        set_saving.set(true);
        let update = store.select(|s| s.app_settings().to_update());
        let store = store.get();
        spawn_local(async move {
            match store.update_settings(update).await {
                Ok(_) => notifier.success("主题设置已保存"),
                Err(e) => notifier.error("保存主题设置失败", &e),
            }
            set_saving.set(false);
        });
    };

    // 放弃未保存的修改
    let on_reset = move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_settings().await {
                notifier.error("加载设置失败", &e);
            }
        });
    };

    view! {
        <Layout title="主题设置">
            <div class="card bg-base-100 shadow-xl max-w-2xl">
                <div class="card-body space-y-4">
                    <div class="form-control">
                        <label class="label"><span class="label-text font-bold">"主题"</span></label>
                        <div class="join">
                            {Theme::ALL
                                .iter()
                                .map(|&t| view! {
                                    <button
                                        class=move || if settings().theme == t { "btn join-item btn-primary" } else { "btn join-item" }
                                        on:click=move |_| change(SettingChange::Theme(t))
                                    >
                                        {t.label()}
                                    </button>
                                })
                                .collect_view()}
                        </div>
                    </div>

                    <div class="form-control">
                        <label class="label"><span class="label-text font-bold">"主题色"</span></label>
                        <div class="flex items-center gap-2">
                            {PRESET_COLORS
                                .iter()
                                .map(|&color| view! {
                                    <button
                                        class=move || if settings().theme_color == color {
                                            "w-8 h-8 rounded-full border-4 border-primary"
                                        } else {
                                            "w-8 h-8 rounded-full border border-base-300"
                                        }
                                        style=format!("background-color: {}", color)
                                        title=color
                                        on:click=move |_| change(SettingChange::ThemeColor(color.to_string()))
                                    ></button>
                                })
                                .collect_view()}
                            <input type="color" class="w-10 h-8"
                                prop:value=move || settings().theme_color
                                on:change=move |ev| change(SettingChange::ThemeColor(event_target_value(&ev)))
                            />
                        </div>
                    </div>

                    <div class="form-control">
                        <label class="label">
                            <span class="label-text font-bold">"夜间亮度"</span>
                            <span class="label-text-alt">"仅在深色主题下生效"</span>
                        </label>
                        <select class="select select-bordered"
                            on:change=move |ev| {
                                if let Some(b) = NightBrightness::parse(&event_target_value(&ev)) {
                                    change(SettingChange::NightBrightness(b));
                                }
                            }
                        >
                            {NightBrightness::ALL
                                .iter()
                                .map(|&b| view! {
                                    <option value=b.as_str() selected=move || settings().night_mode_brightness == b>{b.label()}</option>
                                })
                                .collect_view()}
                        </select>
                    </div>

                    <div class="form-control">
                        <label class="label cursor-pointer justify-start gap-4">
                            <input type="checkbox" class="toggle toggle-primary"
                                prop:checked=move || settings().notification_enabled
                                on:change=move |ev| change(SettingChange::Notifications(event_target_checked(&ev)))
                            />
                            <span class="label-text font-bold">"启用提醒通知"</span>
                        </label>
                    </div>

                    <div class="form-control">
                        <label class="label"><span class="label-text font-bold">"默认提醒方式"</span></label>
                        <select class="select select-bordered"
                            on:change=move |ev| {
                                if let Some(m) = ReminderMethod::parse(&event_target_value(&ev)) {
                                    change(SettingChange::ReminderMethod(m));
                                }
                            }
                        >
                            {ReminderMethod::ALL
                                .iter()
                                .map(|&m| view! {
                                    <option value=m.as_str() selected=move || settings().default_reminder_method == m>{m.label()}</option>
                                })
                                .collect_view()}
                        </select>
                    </div>

                    <div class="card-actions justify-end">
                        <button class="btn btn-ghost" on:click=on_reset>"还原"</button>
                        <button class="btn btn-primary" disabled=move || saving.get() on:click=on_save>"保存"</button>
                    </div>
                </div>
            </div>
        </Layout>
    }
}
