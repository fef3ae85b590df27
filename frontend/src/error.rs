use std::fmt;

use serde::Deserialize;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类型
///
/// 由 HTTP 状态码或失败阶段决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400: 请求参数错误（如密码不正确）
    BadRequest,
    /// 401: 未登录或令牌过期
    Unauthorized,
    /// 登录接口返回 401：用户名或密码错误
    InvalidCredentials,
    /// 403: 权限不足
    Forbidden,
    /// 404: 资源未找到
    NotFound,
    /// 422: 请求体校验失败
    Validation,
    /// 5xx: 服务器内部错误
    Server,
    /// 其他非 2xx 状态
    Http,
    /// 请求已发出但没有收到响应
    Network,
    /// 超过配置的超时时间
    Timeout,
    /// 响应 JSON 无法解析
    Decode,
    /// 请求无法编码
    Encode,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            422 => ApiErrorKind::Validation,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Http,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::BadRequest => "BAD_REQUEST",
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiErrorKind::Forbidden => "FORBIDDEN",
            ApiErrorKind::NotFound => "NOT_FOUND",
            ApiErrorKind::Validation => "VALIDATION_ERROR",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Http => "HTTP_ERROR",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Timeout => "TIMEOUT",
            ApiErrorKind::Decode => "DECODE_ERROR",
            ApiErrorKind::Encode => "ENCODE_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// API 调用错误
///
/// - kind: 错误分类
/// - status: 原始 HTTP 状态码（网络错误等没有）
/// - message: 面向用户的消息，优先使用后端的 `detail`
/// - spans: 调用追踪，如 `api.send(/tasks/) -> store.fetch_tasks`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
    spans: Vec<String>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// FastAPI 的错误体：`{"detail": "..."}` 或 `{"detail": [{"msg": "..."}]}`
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn timeout(timeout_ms: u32) -> Self {
        Self::new(
            ApiErrorKind::Timeout,
            format!("请求超时 ({} ms)", timeout_ms),
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Encode, message)
    }

    /// 根据非 2xx 响应构造错误
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = Self::detail_message(body).unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() || text.len() > 200 {
                format!("HTTP {}", status)
            } else {
                text
            }
        });
        Self {
            kind: ApiErrorKind::from_status(status),
            status: Some(status),
            message,
            spans: Vec::new(),
        }
    }

    fn detail_message(body: &[u8]) -> Option<String> {
        let body: ErrorBody = serde_json::from_slice(body).ok()?;
        match body.detail {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Array(items) => {
                let msgs: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(str::to_string)
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }

    // --- Context builders ---

    /// 添加操作追踪
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(operation.into());
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(self, operation: impl fmt::Display, detail: impl fmt::Display) -> Self {
        self.in_op(format!("{}({})", operation, detail))
    }

    /// 登录请求的 401 表示凭据错误而不是会话过期
    pub fn into_login_failure(mut self) -> Self {
        if self.kind == ApiErrorKind::Unauthorized {
            self.kind = ApiErrorKind::InvalidCredentials;
        }
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    pub fn spans(&self) -> &[String] {
        &self.spans
    }

    /// 给 UI 的提示文本
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Unauthorized => "登录已过期，请重新登录".to_string(),
            ApiErrorKind::InvalidCredentials => "登录失败，请检查用户名和密码".to_string(),
            ApiErrorKind::Forbidden => "权限不足，请联系管理员".to_string(),
            ApiErrorKind::Server => "服务器内部错误，请稍后重试".to_string(),
            ApiErrorKind::Network => "网络错误: 无法连接到服务器".to_string(),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: {}", self.spans.join(" -> "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<taskhub_shared::protocol::EncodeError> for ApiError {
    fn from(e: taskhub_shared::protocol::EncodeError) -> Self {
        ApiError::encode(e.0)
    }
}
