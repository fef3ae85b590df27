use taskhub_shared::protocol::{DeleteCategory, ListCategories, UpdateCategory};
use taskhub_shared::{Category, CategoryCreate, CategoryUpdate, PageQuery};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.send(&ListCategories(PageQuery::default())).await
    }

    pub async fn create_category(&self, category: CategoryCreate) -> ApiResult<Category> {
        self.send(&category).await
    }

    pub async fn update_category(&self, category_id: i64, update: CategoryUpdate) -> ApiResult<Category> {
        self.send(&UpdateCategory { category_id, update }).await
    }

    pub async fn delete_category(&self, category_id: i64) -> ApiResult<bool> {
        self.send(&DeleteCategory { category_id }).await
    }
}
