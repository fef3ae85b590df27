//! 时间工具模块
//!
//! 后端返回的时间可能是无时区的 `2024-05-01T10:30:00.123456`，
//! 也可能带有 RFC 3339 偏移量。两者统一解析为本地时间的 `NaiveDateTime`，
//! 与 `datetime-local` 输入和 `now()` 使用同一时钟。
//!
//! - `flexible` / `flexible_option`: serde 适配模块
//! - `parse_input` / `format_input`: 与 `<input type="datetime-local">` 互转
//! - `format_display`: 列表与详情页的显示格式

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 解析后端时间字符串
///
/// 返回 None 如果两种格式都无法解析
pub fn parse(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    // 只有日期的情况按零点处理
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 解析 `datetime-local` 输入框的值（可能带秒，也可能不带）
pub fn parse_input(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, INPUT_FORMAT)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| parse(s))
}

/// 格式化为 `datetime-local` 输入框接受的值
pub fn format_input(dt: &NaiveDateTime) -> String {
    dt.format(INPUT_FORMAT).to_string()
}

pub fn format_display(dt: &NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

pub fn format_display_opt(dt: Option<&NaiveDateTime>) -> String {
    dt.map(format_display).unwrap_or_else(|| "-".to_string())
}

/// 当前本地时间，用于逾期判断
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// 截止时间是否早于给定的当前时间
pub fn is_past(due: &NaiveDateTime, now: &NaiveDateTime) -> bool {
    due < now
}

/// serde 适配：必填时间字段
pub mod flexible {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid datetime: {}", raw)))
    }
}

/// serde 适配：可选时间字段（null 或缺失都视为 None）
pub mod flexible_option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(dt: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_some(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid datetime: {}", raw))),
        }
    }
}
