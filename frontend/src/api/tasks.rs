use taskhub_shared::protocol::{
    BatchDeleteTasks, DeleteTask, ExportTasksCsv, GetTask, ListDeletedTasks, ListTasks, PurgeTask,
    RestoreTask, UpdateTask,
};
use taskhub_shared::{PageQuery, Task, TaskBatchUpdate, TaskCreate, TaskQuery, TaskUpdate};

use super::{ApiClient, Download, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub async fn list_tasks(&self, query: TaskQuery) -> ApiResult<Vec<Task>> {
        self.send(&ListTasks(query)).await
    }

    /// 详情接口会带上附件列表
    pub async fn get_task(&self, task_id: i64) -> ApiResult<Task> {
        self.send(&GetTask { task_id }).await
    }

    pub async fn create_task(&self, task: TaskCreate) -> ApiResult<Task> {
        self.send(&task).await
    }

    pub async fn update_task(&self, task_id: i64, update: TaskUpdate) -> ApiResult<Task> {
        self.send(&UpdateTask { task_id, update }).await
    }

    /// 移入回收站
    pub async fn delete_task(&self, task_id: i64) -> ApiResult<bool> {
        self.send(&DeleteTask { task_id }).await
    }

    pub async fn list_deleted_tasks(&self, page: PageQuery) -> ApiResult<Vec<Task>> {
        self.send(&ListDeletedTasks(page)).await
    }

    pub async fn restore_task(&self, task_id: i64) -> ApiResult<Task> {
        self.send(&RestoreTask { task_id }).await
    }

    /// 从回收站永久删除
    pub async fn purge_task(&self, task_id: i64) -> ApiResult<bool> {
        self.send(&PurgeTask { task_id }).await
    }

    /// 返回更新的任务数
    pub async fn batch_update_tasks(&self, batch: TaskBatchUpdate) -> ApiResult<u64> {
        self.send(&batch).await
    }

    /// 返回删除的任务数
    pub async fn batch_delete_tasks(&self, task_ids: Vec<i64>) -> ApiResult<u64> {
        self.send(&BatchDeleteTasks { task_ids }).await
    }

    /// 分页参数对导出无意义，会被丢弃
    pub async fn export_tasks_csv(&self, query: TaskQuery) -> ApiResult<Download> {
        let query = TaskQuery {
            skip: None,
            limit: None,
            ..query
        };
        self.download(&ExportTasksCsv(query), "tasks.csv").await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::RequestBody;
    use crate::api::mock::mock_client;
    use crate::error::ApiErrorKind;
    use serde_json::json;
    use taskhub_shared::protocol::HttpMethod;
    use taskhub_shared::{Priority, TaskBatchUpdate, TaskCreate, TaskQuery, TaskStatus, TaskUpdate};

    fn task(id: i64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "status": "pending",
            "priority": "medium",
            "due_date": "2024-06-01T09:00:00",
            "owner_id": 1
        })
    }

    #[tokio::test]
    async fn list_encodes_filters_in_the_query() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Get,
            "/api/tasks/?category_id=3&priority=high&status=pending",
            200,
            json!([task(1, "a"), task(2, "b")]),
        );

        let tasks = api
            .list_tasks(TaskQuery {
                status: Some(TaskStatus::Pending),
                priority: Some(Priority::High),
                category_id: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].title, "b");
    }

    #[tokio::test]
    async fn get_task_reads_attachments() {
        let (transport, api) = mock_client();
        let mut body = task(4, "with files");
        body["attachments"] = json!([{
            "id": 10, "task_id": 4, "filename": "a.txt", "file_path": "uploads/a.txt", "size": 3
        }]);
        transport.mock_json(HttpMethod::Get, "/api/tasks/4", 200, body);

        let task = api.get_task(4).await.unwrap();

        assert_eq!(task.attachments.len(), 1);
        assert_eq!(task.attachments[0].filename, "a.txt");
    }

    #[tokio::test]
    async fn create_and_update_send_json_bodies() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Post, "/api/tasks/", 200, task(9, "new"));
        transport.mock_json(HttpMethod::Put, "/api/tasks/9", 200, task(9, "renamed"));

        api.create_task(TaskCreate {
            title: "new".into(),
            priority: Priority::Low,
            ..Default::default()
        })
        .await
        .unwrap();
        let body = transport.last_json();
        assert_eq!(body["title"], "new");
        assert_eq!(body["priority"], "low");

        let updated = api
            .update_task(
                9,
                TaskUpdate {
                    title: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(transport.last_json(), json!({"title": "renamed"}));
    }

    #[tokio::test]
    async fn trash_round_trip_hits_the_deleted_endpoints() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Delete, "/api/tasks/3", 200, json!(true));
        transport.mock_json(HttpMethod::Get, "/api/tasks/deleted", 200, json!([task(3, "x")]));
        transport.mock_json(HttpMethod::Post, "/api/tasks/deleted/3/restore", 200, task(3, "x"));
        transport.mock_json(HttpMethod::Delete, "/api/tasks/deleted/3", 200, json!(true));

        assert!(api.delete_task(3).await.unwrap());
        assert_eq!(api.list_deleted_tasks(Default::default()).await.unwrap().len(), 1);
        assert_eq!(api.restore_task(3).await.unwrap().id, 3);
        assert!(api.purge_task(3).await.unwrap());

        assert_eq!(
            transport.calls(),
            [
                "DELETE /api/tasks/3",
                "GET /api/tasks/deleted",
                "POST /api/tasks/deleted/3/restore",
                "DELETE /api/tasks/deleted/3",
            ]
        );
        assert_eq!(transport.last_request().unwrap().body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn batch_operations_return_counts() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Put, "/api/tasks/batch", 200, json!(2));
        transport.mock_json(HttpMethod::Delete, "/api/tasks/batch", 200, json!(3));

        let updated = api
            .batch_update_tasks(TaskBatchUpdate {
                task_ids: vec![1, 2],
                priority: Some(Priority::High),
                category_id: None,
            })
            .await
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(
            transport.last_json(),
            json!({"task_ids": [1, 2], "priority": "high"})
        );

        assert_eq!(api.batch_delete_tasks(vec![4, 5, 6]).await.unwrap(), 3);
        assert_eq!(transport.last_json(), json!({"task_ids": [4, 5, 6]}));
    }

    #[tokio::test]
    async fn export_drops_paging_and_falls_back_to_a_default_name() {
        let (transport, api) = mock_client();
        transport.mock_raw(
            HttpMethod::Get,
            "/api/tasks/export/csv?status=completed",
            200,
            b"ID,Title\n".to_vec(),
            None,
        );

        let file = api
            .export_tasks_csv(TaskQuery {
                skip: Some(10),
                limit: Some(10),
                status: Some(TaskStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(file.filename, "tasks.csv");
        assert_eq!(file.bytes, b"ID,Title\n".to_vec());
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let (_transport, api) = mock_client();
        let err = api.get_task(404).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.status, Some(404));
    }
}
