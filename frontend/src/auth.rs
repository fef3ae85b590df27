//! 认证模块
//!
//! 本地凭据（令牌 + 管理员标记）的存取接口，以及路由守卫使用的管理员校验。
//! 认证状态本身保存在 store 中，路由服务通过注入的信号读取，二者解耦。

use crate::api::{ApiClient, Transport};
use crate::error::ApiError;

/// 本地凭据存储
///
/// 浏览器下由 `web::BrowserCredentials`（LocalStorage）实现。
pub trait CredentialStore: Send + Sync + 'static {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    /// 仅作为路由守卫的初步判断，真实权限以 `/users/me` 为准
    fn is_admin(&self) -> bool;
    fn set_admin(&self, is_admin: bool);
    /// 清除令牌和管理员标记
    fn clear(&self);

    fn has_token(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }
}

/// 管理员校验结果
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCheck {
    /// `/users/me` 确认是管理员
    Granted,
    /// 已登录但不是管理员
    Denied,
    /// 校验请求失败，本地凭据已清除
    Failed(ApiError),
}

/// 通过 API 验证当前用户是否真的是管理员
///
/// 失败时清除本地凭据，调用方应跳转到登录页。
pub async fn verify_admin<T: Transport, C: CredentialStore>(api: &ApiClient<T, C>) -> AdminCheck {
    match api.current_user().await {
        Ok(user) => {
            api.credentials().set_admin(user.is_admin());
            if user.is_admin() {
                AdminCheck::Granted
            } else {
                AdminCheck::Denied
            }
        }
        Err(e) => {
            log::error!("Failed to verify admin status: {}", e);
            api.credentials().clear();
            AdminCheck::Failed(e)
        }
    }
}

// =========================================================
// 测试工具: 内存凭据
// =========================================================

#[cfg(test)]
pub use memory::MemoryCredentials;

#[cfg(test)]
mod memory {
    use super::CredentialStore;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct MemoryCredentials {
        inner: Arc<Mutex<(Option<String>, bool)>>,
    }

    impl MemoryCredentials {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl CredentialStore for MemoryCredentials {
        fn token(&self) -> Option<String> {
            self.inner.lock().unwrap().0.clone()
        }

        fn set_token(&self, token: &str) {
            self.inner.lock().unwrap().0 = Some(token.to_string());
        }

        fn is_admin(&self) -> bool {
            self.inner.lock().unwrap().1
        }

        fn set_admin(&self, is_admin: bool) {
            self.inner.lock().unwrap().1 = is_admin;
        }

        fn clear(&self) {
            *self.inner.lock().unwrap() = (None, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::config::ClientConfig;
    use serde_json::json;
    use taskhub_shared::protocol::HttpMethod;

    fn setup(role: Option<&str>, status: u16) -> ApiClient<MockTransport, MemoryCredentials> {
        let transport = MockTransport::new();
        let creds = MemoryCredentials::new();
        creds.set_token("tok");
        creds.set_admin(true);
        let body = match role {
            Some(role) => json!({"id": 1, "username": "u", "email": "u@x", "role": role}),
            None => json!({"detail": "boom"}),
        };
        transport.mock_json(HttpMethod::Get, "/api/users/me", status, body);
        ApiClient::new(transport, creds, ClientConfig::new("/api"))
    }

    #[tokio::test]
    async fn admin_role_is_granted() {
        let api = setup(Some("admin"), 200);
        assert_eq!(verify_admin(&api).await, AdminCheck::Granted);
        assert!(api.credentials().is_admin());
    }

    #[tokio::test]
    async fn stale_local_flag_is_corrected() {
        let api = setup(Some("user"), 200);
        assert_eq!(verify_admin(&api).await, AdminCheck::Denied);
        assert!(!api.credentials().is_admin());
        assert!(api.credentials().has_token());
    }

    #[tokio::test]
    async fn failed_verification_clears_credentials() {
        let api = setup(None, 500);
        assert!(matches!(verify_admin(&api).await, AdminCheck::Failed(_)));
        assert!(!api.credentials().has_token());
        assert!(!api.credentials().is_admin());
    }
}
