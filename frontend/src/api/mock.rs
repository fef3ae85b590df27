//! 测试工具: MockTransport
//!
//! 记录发出的每个请求，并按 "METHOD URL" 返回预设响应。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskhub_shared::protocol::HttpMethod;

use super::client::{ApiClient, HttpRequest, HttpResponse, RequestBody, Transport};
use crate::auth::{CredentialStore, MemoryCredentials};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

pub type MockClient = ApiClient<MockTransport, MemoryCredentials>;

/// 已登录的客户端，令牌为 "test-token"，API 前缀为 "/api"
pub fn mock_client() -> (MockTransport, MockClient) {
    let transport = MockTransport::new();
    let creds = MemoryCredentials::new();
    creds.set_token("test-token");
    let api = ApiClient::new(transport.clone(), creds, ClientConfig::new("/api"));
    (transport, api)
}

#[derive(Default)]
struct MockState {
    // "METHOD URL" -> Response
    responses: HashMap<String, HttpResponse>,
    // 记录发出的请求
    requests: Vec<HttpRequest>,
    // 设置后所有请求都以该错误失败（模拟网络中断）
    failure: Option<ApiError>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

fn key(method: HttpMethod, url: &str) -> String {
    format!("{} {}", method.as_str(), url)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mock_json(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.state.lock().unwrap().responses.insert(
            key(method, url),
            HttpResponse {
                status,
                content_type: Some("application/json".to_string()),
                content_disposition: None,
                body: body.to_string().into_bytes(),
            },
        );
    }

    pub fn mock_raw(
        &self,
        method: HttpMethod,
        url: &str,
        status: u16,
        body: Vec<u8>,
        disposition: Option<&str>,
    ) {
        self.state.lock().unwrap().responses.insert(
            key(method, url),
            HttpResponse {
                status,
                content_type: None,
                content_disposition: disposition.map(str::to_string),
                body,
            },
        );
    }

    pub fn fail_with(&self, err: ApiError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }

    /// 最后一个请求的 JSON 请求体
    pub fn last_json(&self) -> serde_json::Value {
        match self.last_request().map(|r| r.body) {
            Some(RequestBody::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected a JSON body, got {:?}", other),
        }
    }

    /// 已发出的请求，格式为 "METHOD URL"
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| key(r.method, &r.url))
            .collect()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        let k = key(req.method, &req.url);
        state.requests.push(req);

        if let Some(err) = &state.failure {
            return Err(err.clone());
        }

        Ok(state.responses.get(&k).cloned().unwrap_or(HttpResponse {
            status: 404,
            content_type: None,
            content_disposition: None,
            body: br#"{"detail":"Not Found"}"#.to_vec(),
        }))
    }
}
