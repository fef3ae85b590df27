//! 主题应用
//!
//! 把外观设置写到 `<html>` 上：`data-theme`（daisyUI 主题）、
//! `data-brightness`（夜间亮度）和 `--theme-color` 变量。

use taskhub_shared::{NightBrightness, Theme};

use crate::store::Settings;

/// `Auto` 时跟随系统的深色偏好
fn resolve(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
        Theme::Auto => {
            let prefers_dark = web_sys::window()
                .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
                .is_some_and(|m| m.matches());
            if prefers_dark { "dark" } else { "light" }
        }
    }
}

pub fn apply(settings: &Settings) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };

    let theme = resolve(settings.theme);
    let _ = root.set_attribute("data-theme", theme);
    let brightness = match (theme, settings.night_mode_brightness) {
        ("dark", b) => b.as_str(),
        _ => NightBrightness::Normal.as_str(),
    };
    let _ = root.set_attribute("data-brightness", brightness);
    let _ = root.set_attribute("style", &format!("--theme-color: {}", settings.theme_color));
    log::debug!("主题已应用: {} / {}", theme, brightness);
}
