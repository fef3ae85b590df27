//! 运行时配置 (Runtime Configuration)
//!
//! 前端没有环境变量，配置在构建时通过 `option_env!` 注入，
//! 未定义时使用默认值。例如：
//!
//! ```text
//! TASKHUB_API_BASE=https://todo.example.com/api trunk build --release
//! ```

/// 默认值：开发时由 dev server 把 `/api` 代理到后端
const DEFAULT_API_BASE: &str = "/api";
const DEFAULT_TIMEOUT_MS: u32 = 10_000;
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API 根路径，末尾不带 `/`
    pub api_base: String,
    /// 单个请求的超时时间（毫秒）
    pub timeout_ms: u32,
    pub log_level: log::LevelFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ClientConfig {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    /// 读取构建时注入的配置
    pub fn from_build_env() -> Self {
        Self::resolve(
            option_env!("TASKHUB_API_BASE"),
            option_env!("TASKHUB_TIMEOUT_MS"),
            option_env!("TASKHUB_LOG_LEVEL"),
        )
    }

    fn resolve(api_base: Option<&str>, timeout_ms: Option<&str>, log_level: Option<&str>) -> Self {
        let mut config = Self::new(api_base.filter(|v| !v.is_empty()).unwrap_or(DEFAULT_API_BASE));

        if let Some(ms) = timeout_ms.and_then(|v| v.parse::<u32>().ok()) {
            config.timeout_ms = ms;
        }
        if let Some(level) = log_level.and_then(|v| v.parse::<log::LevelFilter>().ok()) {
            config.log_level = level;
        }
        config
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_injected() {
        let config = ClientConfig::resolve(None, None, None);
        assert_eq!(config.api_base, "/api");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn injected_values_override_defaults() {
        let config = ClientConfig::resolve(
            Some("https://todo.example.com/api/"),
            Some("2500"),
            Some("debug"),
        );
        assert_eq!(config.api_base, "https://todo.example.com/api");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ClientConfig::resolve(Some(""), Some("soon"), Some("loud"));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn url_joins_with_a_single_slash() {
        let config = ClientConfig::new("/api");
        assert_eq!(config.url("/tasks/"), "/api/tasks/");
        assert_eq!(config.url("tasks/1"), "/api/tasks/1");
    }
}
