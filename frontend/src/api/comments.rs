use taskhub_shared::protocol::{DeleteComment, ListTaskComments, UpdateComment};
use taskhub_shared::{Comment, CommentCreate, CommentUpdate, PageQuery};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub async fn task_comments(&self, task_id: i64) -> ApiResult<Vec<Comment>> {
        self.send(&ListTaskComments {
            task_id,
            page: PageQuery::default(),
        })
        .await
    }

    pub async fn create_comment(&self, task_id: i64, content: &str) -> ApiResult<Comment> {
        self.send(&CommentCreate {
            task_id,
            content: content.to_string(),
        })
        .await
    }

    pub async fn update_comment(&self, comment_id: i64, content: &str) -> ApiResult<Comment> {
        self.send(&UpdateComment {
            comment_id,
            update: CommentUpdate {
                content: Some(content.to_string()),
            },
        })
        .await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> ApiResult<bool> {
        self.send(&DeleteComment { comment_id }).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::mock::mock_client;
    use serde_json::json;
    use taskhub_shared::protocol::HttpMethod;

    fn comment(id: i64, content: &str) -> serde_json::Value {
        json!({"id": id, "task_id": 3, "user_id": 1, "content": content})
    }

    #[tokio::test]
    async fn comments_are_listed_per_task() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Get,
            "/api/comments/task/3",
            200,
            json!([comment(1, "first"), comment(2, "second")]),
        );

        let comments = api.task_comments(3).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first");
    }

    #[tokio::test]
    async fn create_update_delete() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Post, "/api/comments/", 200, comment(5, "hi"));
        transport.mock_json(HttpMethod::Put, "/api/comments/5", 200, comment(5, "edited"));
        transport.mock_json(HttpMethod::Delete, "/api/comments/5", 200, json!(true));

        api.create_comment(3, "hi").await.unwrap();
        assert_eq!(transport.last_json(), json!({"task_id": 3, "content": "hi"}));

        let edited = api.update_comment(5, "edited").await.unwrap();
        assert_eq!(edited.content, "edited");
        assert_eq!(transport.last_json(), json!({"content": "edited"}));

        assert!(api.delete_comment(5).await.unwrap());
    }
}
