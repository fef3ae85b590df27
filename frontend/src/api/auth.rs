use taskhub_shared::protocol::{GetCurrentUser, UpdateCurrentUser};
use taskhub_shared::{LoginRequest, RegisterRequest, Token, User, UserUpdate};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    /// POST /auth/login
    ///
    /// 只返回令牌，持久化由 store 的 login action 负责
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Token> {
        self.send(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn register(&self, req: RegisterRequest) -> ApiResult<User> {
        self.send(&req).await
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        self.send(&GetCurrentUser).await
    }

    pub async fn update_current_user(&self, update: UserUpdate) -> ApiResult<User> {
        self.send(&UpdateCurrentUser(update)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::mock::mock_client;
    use serde_json::json;
    use taskhub_shared::protocol::HttpMethod;
    use taskhub_shared::{RegisterRequest, UserRole};

    #[tokio::test]
    async fn login_posts_credentials_as_json() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Post,
            "/api/auth/login",
            200,
            json!({"access_token": "jwt", "token_type": "bearer"}),
        );

        let token = api.login("alice", "secret").await.unwrap();

        assert_eq!(token.access_token, "jwt");
        assert_eq!(transport.calls(), ["POST /api/auth/login"]);
        assert_eq!(
            transport.last_json(),
            json!({"username": "alice", "password": "secret"})
        );
    }

    #[tokio::test]
    async fn register_returns_the_created_user() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Post,
            "/api/auth/register",
            200,
            json!({"id": 7, "username": "bob", "email": "b@x.io", "role": "user"}),
        );

        let user = api
            .register(RegisterRequest {
                username: "bob".into(),
                email: "b@x.io".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.role, UserRole::User);
        assert_eq!(transport.last_json()["email"], "b@x.io");
    }

    #[tokio::test]
    async fn current_user_is_read_from_users_me() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Get,
            "/api/users/me",
            200,
            json!({"id": 1, "username": "root", "email": "r@x.io", "role": "admin"}),
        );

        assert!(api.current_user().await.unwrap().is_admin());
    }
}
