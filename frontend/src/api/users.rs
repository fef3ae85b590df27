use taskhub_shared::protocol::{DeleteUser, GetUser, ListUsers, ResetUserPassword, UpdateUser};
use taskhub_shared::{PageQuery, PasswordChange, User, UserCreate, UserUpdate};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

/// 用户管理（仅管理员）
impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub async fn list_users(&self, page: PageQuery) -> ApiResult<Vec<User>> {
        self.send(&ListUsers(page)).await
    }

    pub async fn create_user(&self, user: UserCreate) -> ApiResult<User> {
        self.send(&user).await
    }

    pub async fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.send(&GetUser { user_id }).await
    }

    pub async fn update_user(&self, user_id: i64, update: UserUpdate) -> ApiResult<User> {
        self.send(&UpdateUser { user_id, update }).await
    }

    /// 管理员重置密码，不需要旧密码
    pub async fn reset_user_password(&self, user_id: i64, new_password: &str) -> ApiResult<User> {
        self.send(&ResetUserPassword {
            user_id,
            change: PasswordChange {
                current_password: String::new(),
                new_password: new_password.to_string(),
            },
        })
        .await
    }

    pub async fn delete_user(&self, user_id: i64) -> ApiResult<User> {
        self.send(&DeleteUser { user_id }).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::RequestBody;
    use crate::api::mock::mock_client;
    use serde_json::json;
    use taskhub_shared::protocol::HttpMethod;
    use taskhub_shared::{PageQuery, UserRole, UserUpdate};

    fn user(id: i64, role: &str) -> serde_json::Value {
        json!({"id": id, "username": format!("u{}", id), "email": "u@x.io", "role": role})
    }

    #[tokio::test]
    async fn list_passes_paging_in_the_query() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Get,
            "/api/users/?limit=10&skip=20",
            200,
            json!([user(21, "user"), user(22, "admin")]),
        );

        let users = api
            .list_users(PageQuery {
                skip: Some(20),
                limit: Some(10),
            })
            .await
            .unwrap();

        assert_eq!(users.len(), 2);
        assert!(users[1].is_admin());
    }

    #[tokio::test]
    async fn update_sends_only_changed_fields() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Put, "/api/users/5", 200, user(5, "admin"));

        let updated = api
            .update_user(
                5,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(transport.last_json(), json!({"role": "admin"}));
    }

    #[tokio::test]
    async fn reset_password_targets_the_user() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Put, "/api/users/5/password", 200, user(5, "user"));

        api.reset_user_password(5, "n3w").await.unwrap();

        assert_eq!(transport.last_json()["new_password"], "n3w");
    }

    #[tokio::test]
    async fn delete_has_no_body() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Delete, "/api/users/5", 200, user(5, "user"));

        api.delete_user(5).await.unwrap();

        assert_eq!(transport.last_request().unwrap().body, RequestBody::Empty);
    }
}
