//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 提供简洁的本地存储接口，并在其上实现凭据存储。

use taskhub_shared::{STORAGE_ADMIN_KEY, STORAGE_TOKEN_KEY};

use crate::auth::CredentialStore;

/// 本地存储操作封装
///
/// 提供静态方法访问浏览器 LocalStorage API。
pub struct LocalStorage;

impl LocalStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值
    ///
    /// # 返回
    /// - `Some(String)` 如果键存在且有值
    /// - `None` 如果键不存在或发生错误
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，失败时返回 `false`
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除存储的键值对，失败时返回 `false`
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 持久化在 LocalStorage 中的凭据
///
/// - `token`: 访问令牌
/// - `isAdmin`: `"true"` / `"false"`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCredentials;

impl CredentialStore for BrowserCredentials {
    fn token(&self) -> Option<String> {
        LocalStorage::get(STORAGE_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn set_token(&self, token: &str) {
        if !LocalStorage::set(STORAGE_TOKEN_KEY, token) {
            log::warn!("无法写入 LocalStorage，刷新页面后需要重新登录");
        }
    }

    fn is_admin(&self) -> bool {
        LocalStorage::get(STORAGE_ADMIN_KEY).as_deref() == Some("true")
    }

    fn set_admin(&self, is_admin: bool) {
        LocalStorage::set(STORAGE_ADMIN_KEY, if is_admin { "true" } else { "false" });
    }

    fn clear(&self) {
        LocalStorage::delete(STORAGE_TOKEN_KEY);
        LocalStorage::delete(STORAGE_ADMIN_KEY);
    }
}
