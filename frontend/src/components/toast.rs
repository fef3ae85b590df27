//! 全局提示
//!
//! 页面通过 `use_notifier()` 报告 action 的结果，`ToastHost` 在右上角显示并在 3 秒后自动关闭。

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::error::ApiError;

const DISMISS_AFTER_MS: u32 = 3_000;

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    /// 递增序号，旧的定时器不会关闭新消息
    seq: u64,
    message: String,
    is_error: bool,
}

#[derive(Clone, Copy)]
pub struct Notifier {
    notice: RwSignal<Option<Notice>>,
    next_seq: StoredValue<u64>,
}

impl Notifier {
    fn show(&self, message: String, is_error: bool) {
        let seq = self.next_seq.get_value();
        self.next_seq.set_value(seq + 1);
        self.notice.set(Some(Notice {
            seq,
            message,
            is_error,
        }));

        let notice = self.notice;
        Timeout::new(DISMISS_AFTER_MS, move || {
            if notice.with_untracked(|n| n.as_ref().is_some_and(|n| n.seq == seq)) {
                notice.set(None);
            }
        })
        .forget();
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), false);
    }

    /// 非请求类的错误，如表单校验
    pub fn warn(&self, message: impl Into<String>) {
        self.show(message.into(), true);
    }

    /// 显示失败提示，`action` 描述失败的操作，如 "删除任务失败"
    pub fn error(&self, action: &str, err: &ApiError) {
        self.show(format!("{}: {}", action, err.user_message()), true);
    }
}

pub fn provide_notifier() -> Notifier {
    let notifier = Notifier {
        notice: RwSignal::new(None),
        next_seq: StoredValue::new(0),
    };
    provide_context(notifier);
    notifier
}

pub fn use_notifier() -> Notifier {
    expect_context::<Notifier>()
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let notice = use_notifier().notice;

    view! {
        <Show when=move || notice.with(Option::is_some)>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    if notice.with(|n| n.as_ref().is_some_and(|n| n.is_error)) {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    }
                }>
                    <span>{move || notice.with(|n| n.as_ref().map(|n| n.message.clone()).unwrap_or_default())}</span>
                    <button class="btn btn-ghost btn-xs" on:click=move |_| notice.set(None)>"✕"</button>
                </div>
            </div>
        </Show>
    }
}
