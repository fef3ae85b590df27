use super::*;
use crate::api::mock::{MockClient, MockTransport, mock_client};
use crate::auth::MemoryCredentials;
use crate::error::{ApiError, ApiErrorKind};
use serde_json::json;
use taskhub_shared::protocol::HttpMethod;
use taskhub_shared::{Priority, TaskStatus};

type TestStore = Store<MockTransport, MemoryCredentials>;

fn setup() -> (MockTransport, TestStore) {
    let (transport, api): (MockTransport, MockClient) = mock_client();
    (transport, Store::new(api))
}

fn task_json(id: i64, title: &str) -> serde_json::Value {
    json!({"id": id, "title": title, "status": "pending", "priority": "medium"})
}

fn user_json(id: i64, role: &str) -> serde_json::Value {
    json!({"id": id, "username": format!("user{}", id), "email": "u@x.io", "role": role})
}

fn task(id: i64, title: &str) -> Task {
    serde_json::from_value(task_json(id, title)).unwrap()
}

fn reminder_json(id: i64, active: bool) -> serde_json::Value {
    json!({"id": id, "task_id": 1, "reminder_time": "2024-06-01T08:00:00", "is_active": active})
}

// =========================================================
// 通用契约：成功时提交、失败时不提交且加载状态复位
// =========================================================

#[tokio::test]
async fn fetch_tasks_passes_the_query_and_commits_the_result() {
    let (transport, store) = setup();
    transport.mock_json(
        HttpMethod::Get,
        "/api/tasks/?priority=high&status=pending",
        200,
        json!([task_json(1, "a"), task_json(2, "b")]),
    );

    store
        .fetch_tasks(TaskQuery {
            status: Some(TaskStatus::Pending),
            priority: Some(Priority::High),
            ..Default::default()
        })
        .await
        .unwrap();

    let state = store.snapshot();
    assert_eq!(transport.calls(), ["GET /api/tasks/?priority=high&status=pending"]);
    assert_eq!(state.all_tasks().len(), 2);
    assert!(!state.is_loading());
}

#[tokio::test]
async fn rejection_resets_loading_and_leaves_state_untouched() {
    let (transport, store) = setup();
    store.commit(Mutation::SetTasks(vec![task(1, "kept")]));
    transport.mock_json(HttpMethod::Get, "/api/tasks/", 500, json!({"detail": "boom"}));

    let err = store.fetch_tasks(TaskQuery::default()).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Server);
    assert_eq!(err.spans(), ["api.send(/tasks/)", "store.fetch_tasks"]);
    let state = store.snapshot();
    assert_eq!(state.tasks, vec![task(1, "kept")]);
    assert!(!state.is_loading());
    assert!(state.is_authenticated());
}

#[tokio::test]
async fn network_failure_is_returned_without_logging_out() {
    let (transport, store) = setup();
    transport.fail_with(ApiError::network("offline"));

    let err = store.fetch_categories().await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Network);
    assert!(store.snapshot().is_authenticated());
    assert!(store.api().credentials().has_token());
}

#[tokio::test]
async fn unauthorized_commits_logout() {
    let (transport, store) = setup();
    store.commit(Mutation::SetUser(serde_json::from_value(user_json(1, "user")).unwrap()));
    store.commit(Mutation::SetTasks(vec![task(1, "a")]));
    transport.mock_json(
        HttpMethod::Get,
        "/api/reminders/",
        401,
        json!({"detail": "Could not validate credentials"}),
    );

    let err = store.fetch_reminders().await.unwrap_err();

    assert!(err.is_unauthorized());
    let state = store.snapshot();
    assert!(!state.is_authenticated());
    assert!(state.current_user().is_none());
    assert!(state.all_tasks().is_empty());
    assert!(!state.is_loading());
    assert!(!store.api().credentials().has_token());
}

// =========================================================
// 认证
// =========================================================

#[tokio::test]
async fn new_store_trusts_a_stored_token() {
    let (_transport, store) = setup();
    assert!(store.snapshot().is_authenticated());

    let api = ApiClient::new(
        MockTransport::new(),
        MemoryCredentials::new(),
        crate::config::ClientConfig::new("/api"),
    );
    assert!(!Store::new(api).snapshot().is_authenticated());
}

#[tokio::test]
async fn login_stores_token_and_admin_flag() {
    let (transport, store) = setup();
    store.logout();
    transport.mock_json(
        HttpMethod::Post,
        "/api/auth/login",
        200,
        json!({"access_token": "fresh", "token_type": "bearer"}),
    );
    transport.mock_json(HttpMethod::Get, "/api/users/me", 200, user_json(1, "admin"));

    let user = store.login("user1", "pw").await.unwrap();

    assert!(user.is_admin());
    assert_eq!(store.api().credentials().token().as_deref(), Some("fresh"));
    assert!(store.api().credentials().is_admin());
    let req = transport.last_request().unwrap();
    assert_eq!(req.header("Authorization"), Some("Bearer fresh"));

    let state = store.snapshot();
    assert!(state.is_authenticated());
    assert!(state.is_admin());
}

#[tokio::test]
async fn login_failure_keeps_the_user_logged_out() {
    let (transport, store) = setup();
    store.logout();
    transport.mock_json(
        HttpMethod::Post,
        "/api/auth/login",
        401,
        json!({"detail": "Incorrect username or password"}),
    );

    let err = store.login("user1", "bad").await.unwrap_err();

    assert_eq!(err.message, "Incorrect username or password");
    assert_eq!(err.kind, ApiErrorKind::InvalidCredentials);
    assert_eq!(err.user_message(), "登录失败，请检查用户名和密码");
    assert!(!store.snapshot().is_authenticated());
    assert!(!store.api().credentials().has_token());
}

#[tokio::test]
async fn login_clears_the_token_when_the_profile_cannot_load() {
    let (transport, store) = setup();
    store.logout();
    transport.mock_json(
        HttpMethod::Post,
        "/api/auth/login",
        200,
        json!({"access_token": "fresh", "token_type": "bearer"}),
    );
    transport.mock_json(HttpMethod::Get, "/api/users/me", 500, json!({"detail": "db down"}));

    assert!(store.login("user1", "pw").await.is_err());
    assert!(!store.api().credentials().has_token());
    assert!(!store.snapshot().is_authenticated());
}

#[tokio::test]
async fn register_does_not_log_in() {
    let (transport, store) = setup();
    store.logout();
    transport.mock_json(HttpMethod::Post, "/api/auth/register", 200, user_json(3, "user"));

    store
        .register(RegisterRequest {
            username: "user3".into(),
            email: "u@x.io".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();

    assert!(!store.snapshot().is_authenticated());
}

#[tokio::test]
async fn failed_admin_verification_logs_out() {
    let (transport, store) = setup();
    store.api().credentials().set_admin(true);
    transport.mock_json(HttpMethod::Get, "/api/users/me", 500, json!({"detail": "boom"}));

    assert!(store.admin_hint());
    let check = store.verify_admin().await;

    assert!(matches!(check, AdminCheck::Failed(_)));
    assert!(!store.admin_hint());
    assert!(!store.snapshot().is_authenticated());
}

// =========================================================
// 任务
// =========================================================

#[tokio::test]
async fn create_update_delete_splice_the_task_list() {
    let (transport, store) = setup();
    store.commit(Mutation::SetTasks(vec![task(1, "a")]));
    transport.mock_json(HttpMethod::Post, "/api/tasks/", 200, task_json(2, "b"));
    transport.mock_json(HttpMethod::Put, "/api/tasks/1", 200, task_json(1, "A"));
    transport.mock_json(HttpMethod::Delete, "/api/tasks/2", 200, json!(true));

    store
        .create_task(TaskCreate {
            title: "b".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(store.snapshot().tasks.len(), 2);

    store
        .update_task(
            1,
            TaskUpdate {
                title: Some("A".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(transport.last_json(), json!({"title": "A"}));
    assert_eq!(store.snapshot().tasks[0].title, "A");

    store.delete_task(2).await.unwrap();
    assert_eq!(store.snapshot().tasks, vec![task(1, "A")]);
}

#[tokio::test]
async fn fetch_task_loads_current_task_and_attachments() {
    let (transport, store) = setup();
    let mut body = task_json(5, "detail");
    body["attachments"] = json!([{"id": 1, "task_id": 5, "filename": "a.txt"}]);
    transport.mock_json(HttpMethod::Get, "/api/tasks/5", 200, body);

    store.fetch_task(5).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.current_task().map(|t| t.id), Some(5));
    assert_eq!(state.attachments.len(), 1);
}

#[tokio::test]
async fn restore_moves_a_task_out_of_the_trash() {
    let (transport, store) = setup();
    transport.mock_json(HttpMethod::Get, "/api/tasks/deleted", 200, json!([task_json(3, "old")]));
    transport.mock_json(HttpMethod::Post, "/api/tasks/deleted/3/restore", 200, task_json(3, "old"));

    store.fetch_deleted_tasks().await.unwrap();
    assert_eq!(store.snapshot().deleted_tasks.len(), 1);

    store.restore_task(3).await.unwrap();
    let state = store.snapshot();
    assert!(state.deleted_tasks.is_empty());
    assert_eq!(state.tasks, vec![task(3, "old")]);
}

#[tokio::test]
async fn purge_only_touches_the_trash() {
    let (transport, store) = setup();
    store.commit(Mutation::SetTasks(vec![task(3, "same id")]));
    store.commit(Mutation::SetDeletedTasks(vec![task(3, "old")]));
    transport.mock_json(HttpMethod::Delete, "/api/tasks/deleted/3", 200, json!(true));

    store.purge_task(3).await.unwrap();

    let state = store.snapshot();
    assert!(state.deleted_tasks.is_empty());
    assert_eq!(state.tasks.len(), 1);
}

#[tokio::test]
async fn batch_actions_patch_and_remove_locally() {
    let (transport, store) = setup();
    store.commit(Mutation::SetTasks(vec![task(1, "a"), task(2, "b"), task(3, "c")]));
    transport.mock_json(HttpMethod::Put, "/api/tasks/batch", 200, json!(2));
    transport.mock_json(HttpMethod::Delete, "/api/tasks/batch", 200, json!(1));

    let updated = store
        .batch_update_tasks(TaskBatchUpdate {
            task_ids: vec![1, 2],
            priority: Some(Priority::Low),
            category_id: None,
        })
        .await
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(store.snapshot().tasks_with_status(TaskStatus::Pending).len(), 3);
    assert_eq!(store.snapshot().tasks[1].priority, Priority::Low);
    assert_eq!(store.snapshot().tasks[2].priority, Priority::Medium);

    store.batch_delete_tasks(vec![3]).await.unwrap();
    assert_eq!(transport.last_json(), json!({"task_ids": [3]}));
    assert_eq!(store.snapshot().tasks.len(), 2);
}

#[tokio::test]
async fn failed_batch_delete_keeps_the_tasks() {
    let (transport, store) = setup();
    store.commit(Mutation::SetTasks(vec![task(1, "a")]));
    transport.mock_json(HttpMethod::Delete, "/api/tasks/batch", 403, json!({"detail": "no"}));

    let err = store.batch_delete_tasks(vec![1]).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Forbidden);
    assert_eq!(store.snapshot().tasks.len(), 1);
    assert!(store.snapshot().is_authenticated());
}

// =========================================================
// 分类、评论、附件、提醒
// =========================================================

#[tokio::test]
async fn category_actions_keep_the_list_current() {
    let (transport, store) = setup();
    transport.mock_json(HttpMethod::Get, "/api/tasks/categories", 200, json!([{"id": 1, "name": "Work"}]));
    transport.mock_json(HttpMethod::Put, "/api/tasks/categories/1", 200, json!({"id": 1, "name": "Job"}));
    transport.mock_json(HttpMethod::Delete, "/api/tasks/categories/1", 200, json!(true));

    store.fetch_categories().await.unwrap();
    assert_eq!(store.snapshot().category_name(Some(1)), Some("Work"));

    store
        .update_category(
            1,
            CategoryUpdate {
                name: Some("Job".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.snapshot().category_name(Some(1)), Some("Job"));

    store.delete_category(1).await.unwrap();
    assert!(store.snapshot().task_categories().is_empty());
}

#[tokio::test]
async fn comment_actions() {
    let (transport, store) = setup();
    let comment = |id: i64, content: &str| json!({"id": id, "task_id": 1, "user_id": 1, "content": content});
    transport.mock_json(HttpMethod::Get, "/api/comments/task/1", 200, json!([comment(1, "first")]));
    transport.mock_json(HttpMethod::Post, "/api/comments/", 200, comment(2, "second"));
    transport.mock_json(HttpMethod::Put, "/api/comments/2", 200, comment(2, "edited"));
    transport.mock_json(HttpMethod::Delete, "/api/comments/1", 200, json!(true));

    store.fetch_comments(1).await.unwrap();
    store.add_comment(1, "second").await.unwrap();
    store.edit_comment(2, "edited").await.unwrap();
    store.delete_comment(1).await.unwrap();

    let comments = store.snapshot().comments;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "edited");
}

#[tokio::test]
async fn attachment_upload_and_delete() {
    let (transport, store) = setup();
    transport.mock_json(
        HttpMethod::Post,
        "/api/tasks/1/attachments",
        200,
        json!({"id": 9, "task_id": 1, "filename": "a.txt"}),
    );
    transport.mock_json(HttpMethod::Delete, "/api/tasks/1/attachments/9", 200, json!(true));
    let file = FilePart {
        filename: "a.txt".into(),
        content_type: "text/plain".into(),
        bytes: b"a".to_vec(),
    };

    store.upload_attachment(1, file).await.unwrap();
    assert_eq!(store.snapshot().attachments.len(), 1);

    store.delete_attachment(1, 9).await.unwrap();
    assert!(store.snapshot().attachments.is_empty());
}

#[tokio::test]
async fn toggle_reminder_commits_the_server_copy() {
    let (transport, store) = setup();
    transport.mock_json(HttpMethod::Get, "/api/reminders/tasks/1", 200, json!([reminder_json(4, true)]));
    transport.mock_json(HttpMethod::Post, "/api/reminders/4/deactivate", 200, reminder_json(4, false));

    store.fetch_task_reminders(1).await.unwrap();
    let reminder = store.toggle_reminder(4, false).await.unwrap();

    assert!(!reminder.is_active);
    let state = store.snapshot();
    assert_eq!(state.reminders_for_task(1).len(), 1);
    assert!(!state.all_reminders()[0].is_active);
    assert_eq!(state.all_reminders()[0].reminder_time, reminder.reminder_time);
}

#[tokio::test]
async fn reminder_create_and_delete() {
    let (transport, store) = setup();
    transport.mock_json(HttpMethod::Post, "/api/reminders/", 200, reminder_json(5, true));
    transport.mock_json(HttpMethod::Delete, "/api/reminders/5", 200, json!(true));

    store
        .create_reminder(ReminderCreate {
            task_id: 1,
            reminder_time: taskhub_shared::date::parse("2024-06-01T08:00:00").unwrap(),
            reminder_type: Default::default(),
            method: Default::default(),
        })
        .await
        .unwrap();
    assert_eq!(store.snapshot().reminders.len(), 1);

    store.delete_reminder(5).await.unwrap();
    assert!(store.snapshot().reminders.is_empty());
}

// =========================================================
// 用户管理、统计、设置
// =========================================================

#[tokio::test]
async fn user_admin_actions_track_the_total() {
    let (transport, store) = setup();
    transport.mock_json(
        HttpMethod::Get,
        "/api/users/",
        200,
        json!([user_json(1, "admin"), user_json(2, "user")]),
    );
    transport.mock_json(HttpMethod::Post, "/api/users/", 200, user_json(3, "user"));
    transport.mock_json(HttpMethod::Delete, "/api/users/2", 200, user_json(2, "user"));

    assert_eq!(store.fetch_users(PageQuery::default()).await.unwrap(), 2);
    assert_eq!(store.snapshot().users_total(), 2);

    store
        .create_user(UserCreate {
            username: "user3".into(),
            email: "u@x.io".into(),
            password: "pw".into(),
            role: Default::default(),
        })
        .await
        .unwrap();
    store.delete_user(2).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.users_total(), 2);
    assert_eq!(
        state.all_users().iter().map(|u| u.id).collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[tokio::test]
async fn statistics_are_stored() {
    let (transport, store) = setup();
    transport.mock_json(
        HttpMethod::Get,
        "/api/statistics/summary?days=7",
        200,
        json!({"task_completion": {"total_tasks": 3}}),
    );

    store.fetch_statistics(Some(7)).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.task_statistics().unwrap().task_completion.total_tasks, 3);
}

#[tokio::test]
async fn update_settings_merges_into_app_settings() {
    let (transport, store) = setup();
    let mut user = user_json(1, "user");
    user["theme"] = json!("dark");
    transport.mock_json(HttpMethod::Put, "/api/settings/profile", 200, user);

    store
        .update_settings(ProfileSettingsUpdate {
            theme: Some(taskhub_shared::Theme::Dark),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(store.snapshot().app_settings().theme, taskhub_shared::Theme::Dark);
}

#[tokio::test]
async fn delete_account_logs_out() {
    let (transport, store) = setup();
    transport.mock_json(
        HttpMethod::Delete,
        "/api/settings/account?password=pw",
        200,
        json!({"message": "Account deleted"}),
    );

    store.delete_account("pw").await.unwrap();

    assert!(!store.snapshot().is_authenticated());
    assert!(!store.api().credentials().has_token());
}

#[tokio::test]
async fn wrong_password_on_delete_keeps_the_session() {
    let (transport, store) = setup();
    transport.mock_json(
        HttpMethod::Delete,
        "/api/settings/account?password=bad",
        400,
        json!({"detail": "Password is incorrect"}),
    );

    let err = store.delete_account("bad").await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::BadRequest);
    assert!(store.snapshot().is_authenticated());
}
