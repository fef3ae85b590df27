//! HTTP 客户端封装
//!
//! `Transport` 是唯一的 I/O 接缝：浏览器下由 `web::FetchTransport` 实现，
//! 测试中由 `MockTransport` 实现。`ApiClient` 在其上实现两个拦截器：
//!
//! - 请求拦截：拼接 URL，注入 `Authorization: Bearer <token>`
//! - 响应拦截：按状态码分类、记录日志，401 时清除本地凭据，然后把错误返回给调用方

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use taskhub_shared::protocol::{self, ApiRequest, Endpoint, FilePart, HttpMethod, Payload};
use taskhub_shared::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};

use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorKind, ApiResult};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Text(String),
    /// 浏览器会自行设置 multipart boundary，所以不设置 Content-Type
    Multipart {
        field: &'static str,
        file: FilePart,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout_ms: u32,
}

impl HttpRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::decode(e.to_string()))
    }
}

#[async_trait(?Send)]
pub trait Transport: Send + Sync + 'static {
    /// 只在请求没有得到任何响应时返回 Err（网络错误、超时）
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 下载文件
// =========================================================

/// 二进制响应（CSV 导出、附件下载）
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn from_response(response: HttpResponse, fallback_name: &str) -> Self {
        let filename = response
            .content_disposition
            .as_deref()
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| fallback_name.to_string());
        Self {
            filename,
            content_type: response
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes: response.body,
        }
    }
}

/// 解析 `attachment; filename="a.csv"` 或 `filename*=UTF-8''a.csv`
fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for part in header.split(';').map(str::trim) {
        if let Some(value) = part.strip_prefix("filename*=") {
            let value = value.trim_matches('"');
            let encoded = value.rsplit("''").next().unwrap_or(value);
            return Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned());
        }
        if let Some(value) = part.strip_prefix("filename=") {
            plain = Some(value.trim_matches('"').to_string());
        }
    }
    plain.filter(|name| !name.is_empty())
}

// =========================================================
// ApiClient
// =========================================================

pub struct ApiClient<T, C> {
    transport: Arc<T>,
    credentials: Arc<C>,
    config: Arc<ClientConfig>,
}

impl<T, C> Clone for ApiClient<T, C> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            credentials: self.credentials.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub fn new(transport: T, credentials: C, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        }
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 发送强类型请求并解析 JSON 响应
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let path = req.path();
        let response = self.execute(req).await?;
        response
            .json::<R::Response>()
            .map_err(|e| e.in_op_with("api.decode", &path))
    }

    /// 发送请求并返回原始字节（文件下载）
    pub async fn download<R: Endpoint>(&self, req: &R, fallback_name: &str) -> ApiResult<Download> {
        let response = self.execute(req).await?;
        Ok(Download::from_response(response, fallback_name))
    }

    async fn execute<R: Endpoint>(&self, req: &R) -> ApiResult<HttpResponse> {
        let path = req.path();
        let request = self
            .build_request(req)
            .map_err(|e| e.in_op_with("api.encode", &path))?;

        log::debug!("{} {}", request.method.as_str(), request.url);

        let result = match self.transport.send(request).await {
            Ok(response) if response.ok() => Ok(response),
            Ok(response) => Err(ApiError::from_response(response.status, &response.body)),
            Err(e) => Err(e),
        };

        result.map_err(|e| self.intercept_error(e).in_op_with("api.send", &path))
    }

    /// 请求拦截器
    fn build_request<R: Endpoint>(&self, req: &R) -> ApiResult<HttpRequest> {
        let mut url = self.config.url(&req.path());
        let mut headers = Vec::new();

        if let Some(token) = self.credentials.token() {
            headers.push((HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token)));
        }

        let body = match req.payload()? {
            Payload::Empty => RequestBody::Empty,
            Payload::Query(pairs) => {
                if !pairs.is_empty() {
                    url.push('?');
                    url.push_str(&protocol::query_string(&pairs));
                }
                RequestBody::Empty
            }
            Payload::Json(json) => {
                headers.push((HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string()));
                RequestBody::Text(json)
            }
            Payload::Multipart { field, file } => RequestBody::Multipart { field, file },
        };

        Ok(HttpRequest {
            method: R::METHOD,
            url,
            headers,
            body,
            timeout_ms: self.config.timeout_ms,
        })
    }

    /// 响应拦截器
    fn intercept_error(&self, err: ApiError) -> ApiError {
        match err.kind {
            ApiErrorKind::Unauthorized => {
                // 令牌过期或无效，清除本地凭据；跳转由路由监听认证状态完成
                self.credentials.clear();
                log::warn!("认证失效，已清除本地凭据: {}", err.message);
            }
            ApiErrorKind::Forbidden => log::warn!("权限不足，请联系管理员"),
            ApiErrorKind::Server => log::error!("服务器内部错误，请稍后重试"),
            ApiErrorKind::Network | ApiErrorKind::Timeout => {
                log::error!("网络错误: 无法连接到服务器 ({})", err.message)
            }
            _ => match err.status {
                Some(status) => log::error!("请求失败 ({}): {}", status, err.message),
                None => log::error!("请求错误: {}", err.message),
            },
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::auth::MemoryCredentials;
    use serde_json::json;
    use taskhub_shared::protocol::{BatchDeleteTasks, ExportTasksCsv, GetCurrentUser, ListTasks};
    use taskhub_shared::{TaskQuery, TaskStatus};

    fn client(token: Option<&str>) -> (MockTransport, ApiClient<MockTransport, MemoryCredentials>) {
        let transport = MockTransport::new();
        let creds = MemoryCredentials::new();
        if let Some(t) = token {
            creds.set_token(t);
            creds.set_admin(true);
        }
        let api = ApiClient::new(transport.clone(), creds, ClientConfig::new("/api"));
        (transport, api)
    }

    #[tokio::test]
    async fn injects_bearer_token_and_query() {
        let (transport, api) = client(Some("abc"));
        transport.mock_json(HttpMethod::Get, "/api/tasks/?status=completed", 200, json!([]));

        let tasks = api
            .send(&ListTasks(TaskQuery {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert!(tasks.is_empty());
        let req = transport.last_request().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
        assert_eq!(req.body, RequestBody::Empty);
        assert_eq!(req.timeout_ms, 10_000);
    }

    #[tokio::test]
    async fn no_authorization_header_without_token() {
        let (transport, api) = client(None);
        transport.mock_json(HttpMethod::Delete, "/api/tasks/batch", 200, json!(2));

        let deleted = api
            .send(&BatchDeleteTasks {
                task_ids: vec![1, 2],
            })
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        let req = transport.last_request().unwrap();
        assert_eq!(req.header("Authorization"), None);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body, RequestBody::Text(r#"{"task_ids":[1,2]}"#.into()));
    }

    #[tokio::test]
    async fn unauthorized_clears_credentials_and_rethrows() {
        let (transport, api) = client(Some("expired"));
        transport.mock_json(
            HttpMethod::Get,
            "/api/users/me",
            401,
            json!({"detail": "Could not validate credentials"}),
        );

        let err = api.send(&GetCurrentUser).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.message, "Could not validate credentials");
        assert_eq!(api.credentials().token(), None);
        assert!(!api.credentials().is_admin());
    }

    #[tokio::test]
    async fn forbidden_and_server_errors_keep_credentials() {
        let (transport, api) = client(Some("abc"));
        transport.mock_json(HttpMethod::Get, "/api/users/me", 403, json!({"detail": "no"}));

        let err = api.send(&GetCurrentUser).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Forbidden);
        assert_eq!(api.credentials().token().as_deref(), Some("abc"));

        transport.mock_json(HttpMethod::Get, "/api/users/me", 500, json!({"detail": "boom"}));
        let err = api.send(&GetCurrentUser).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(api.credentials().token().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn network_failure_is_traced() {
        let (transport, api) = client(None);
        transport.fail_with(ApiError::network("connection refused"));

        let err = api.send(&GetCurrentUser).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert_eq!(err.spans(), ["api.send(/users/me)"]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let (transport, api) = client(None);
        transport.mock_raw(HttpMethod::Get, "/api/users/me", 200, b"<html>".to_vec(), None);

        let err = api.send(&GetCurrentUser).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn download_uses_content_disposition_filename() {
        let (transport, api) = client(Some("abc"));
        transport.mock_raw(
            HttpMethod::Get,
            "/api/tasks/export/csv",
            200,
            b"ID,Title\n1,a\n".to_vec(),
            Some("attachment; filename=tasks_bob.csv"),
        );

        let file = api
            .download(&ExportTasksCsv(TaskQuery::default()), "tasks.csv")
            .await
            .unwrap();

        assert_eq!(file.filename, "tasks_bob.csv");
        assert_eq!(file.bytes, b"ID,Title\n1,a\n".to_vec());
    }

    #[test]
    fn disposition_parsing_handles_quotes_and_encoding() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="report.pdf""#),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''%E4%BB%BB%E5%8A%A1.csv"),
            Some("任务.csv".to_string())
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }
}
