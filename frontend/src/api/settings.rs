use taskhub_shared::protocol::{DeleteAccount, GetProfile};
use taskhub_shared::{MessageResponse, PasswordChange, ProfileSettingsUpdate, User};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

/// 个人设置
impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub async fn profile(&self) -> ApiResult<User> {
        self.send(&GetProfile).await
    }

    pub async fn update_profile(&self, update: ProfileSettingsUpdate) -> ApiResult<User> {
        self.send(&update).await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<MessageResponse> {
        self.send(&PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
        })
        .await
    }

    /// 密码通过查询参数传递
    pub async fn delete_account(&self, password: &str) -> ApiResult<MessageResponse> {
        self.send(&DeleteAccount {
            password: password.to_string(),
        })
        .await
    }
}
