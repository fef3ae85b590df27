use crate::models::*;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Where the serialized request fields go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Nothing is sent besides the path.
    None,
    /// Fields become the query string (nulls skipped).
    Query,
    /// Fields become a JSON body.
    Body,
}

impl Placement {
    pub const fn for_method(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Placement::Query,
            _ => Placement::Body,
        }
    }
}

/// A file selected by the user, sent as one multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fully encoded request data, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Query(Vec<(String, String)>),
    Json(String),
    Multipart { field: &'static str, file: FilePart },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeError(pub String);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to encode request: {}", self.0)
    }
}

impl std::error::Error for EncodeError {}

/// Metadata of one backend endpoint.
///
/// Path parameters live in `#[serde(skip)]` fields so they never leak into
/// the query string or the body.
pub trait Endpoint: Serialize {
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Where the serialized fields go.
    const PLACEMENT: Placement = Placement::for_method(Self::METHOD);

    /// The URL path relative to the API base.
    fn path(&self) -> String;

    fn payload(&self) -> Result<Payload, EncodeError> {
        match Self::PLACEMENT {
            Placement::None => Ok(Payload::Empty),
            Placement::Query => to_query_pairs(self).map(Payload::Query),
            Placement::Body => serde_json::to_string(self)
                .map(Payload::Json)
                .map_err(|e| EncodeError(e.to_string())),
        }
    }
}

/// An endpoint whose response body is JSON.
pub trait ApiRequest: Endpoint {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
}

/// Flattens a serializable value into query pairs.
///
/// Nulls are skipped, arrays repeat their key and keys come out sorted.
pub fn to_query_pairs<T: Serialize + ?Sized>(value: &T) -> Result<Vec<(String, String)>, EncodeError> {
    let value = serde_json::to_value(value).map_err(|e| EncodeError(e.to_string()))?;
    let object = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Object(map) => map,
        other => return Err(EncodeError(format!("query must be an object, got {}", other))),
    };

    let mut pairs = Vec::new();
    for (key, value) in object {
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::Array(items) => {
                for item in items {
                    if let Some(s) = scalar_to_string(&item) {
                        pairs.push((key.clone(), s));
                    }
                }
            }
            other => {
                if let Some(s) = scalar_to_string(&other) {
                    pairs.push((key, s));
                }
            }
        }
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes query pairs (`a=1&b=x%20y`). Empty input gives "".
pub fn query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_SET),
                utf8_percent_encode(v, QUERY_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

// =========================================================
// Auth & current user
// =========================================================

impl Endpoint for LoginRequest {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/login".into()
    }
}

impl ApiRequest for LoginRequest {
    type Response = Token;
}

impl Endpoint for RegisterRequest {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/register".into()
    }
}

impl ApiRequest for RegisterRequest {
    type Response = User;
}

/// GET /users/me
#[derive(Debug, Serialize)]
pub struct GetCurrentUser;

impl Endpoint for GetCurrentUser {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/users/me".into()
    }
}

impl ApiRequest for GetCurrentUser {
    type Response = User;
}

/// PUT /users/me
#[derive(Debug, Serialize)]
pub struct UpdateCurrentUser(pub UserUpdate);

impl Endpoint for UpdateCurrentUser {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/users/me".into()
    }
}

impl ApiRequest for UpdateCurrentUser {
    type Response = User;
}

// =========================================================
// Users (admin)
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListUsers(pub PageQuery);

impl Endpoint for ListUsers {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/users/".into()
    }
}

impl ApiRequest for ListUsers {
    type Response = Vec<User>;
}

impl Endpoint for UserCreate {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/".into()
    }
}

impl ApiRequest for UserCreate {
    type Response = User;
}

#[derive(Debug, Serialize)]
pub struct GetUser {
    #[serde(skip)]
    pub user_id: i64,
}

impl Endpoint for GetUser {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/users/{}", self.user_id)
    }
}

impl ApiRequest for GetUser {
    type Response = User;
}

#[derive(Debug, Serialize)]
pub struct UpdateUser {
    #[serde(skip)]
    pub user_id: i64,
    #[serde(flatten)]
    pub update: UserUpdate,
}

impl Endpoint for UpdateUser {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/users/{}", self.user_id)
    }
}

impl ApiRequest for UpdateUser {
    type Response = User;
}

/// Admin password reset; the backend ignores `current_password` here.
#[derive(Debug, Serialize)]
pub struct ResetUserPassword {
    #[serde(skip)]
    pub user_id: i64,
    #[serde(flatten)]
    pub change: PasswordChange,
}

impl Endpoint for ResetUserPassword {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/users/{}/password", self.user_id)
    }
}

impl ApiRequest for ResetUserPassword {
    type Response = User;
}

#[derive(Debug, Serialize)]
pub struct DeleteUser {
    #[serde(skip)]
    pub user_id: i64,
}

impl Endpoint for DeleteUser {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/users/{}", self.user_id)
    }
}

impl ApiRequest for DeleteUser {
    type Response = User;
}

// =========================================================
// Tasks
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListTasks(pub TaskQuery);

impl Endpoint for ListTasks {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/tasks/".into()
    }
}

impl ApiRequest for ListTasks {
    type Response = Vec<Task>;
}

#[derive(Debug, Serialize)]
pub struct GetTask {
    #[serde(skip)]
    pub task_id: i64,
}

impl Endpoint for GetTask {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/tasks/{}", self.task_id)
    }
}

impl ApiRequest for GetTask {
    type Response = Task;
}

impl Endpoint for TaskCreate {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/tasks/".into()
    }
}

impl ApiRequest for TaskCreate {
    type Response = Task;
}

#[derive(Debug, Serialize)]
pub struct UpdateTask {
    #[serde(skip)]
    pub task_id: i64,
    #[serde(flatten)]
    pub update: TaskUpdate,
}

impl Endpoint for UpdateTask {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/tasks/{}", self.task_id)
    }
}

impl ApiRequest for UpdateTask {
    type Response = Task;
}

/// Moves a task to the recycle bin.
#[derive(Debug, Serialize)]
pub struct DeleteTask {
    #[serde(skip)]
    pub task_id: i64,
}

impl Endpoint for DeleteTask {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/tasks/{}", self.task_id)
    }
}

impl ApiRequest for DeleteTask {
    type Response = bool;
}

#[derive(Debug, Serialize)]
pub struct ListDeletedTasks(pub PageQuery);

impl Endpoint for ListDeletedTasks {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/tasks/deleted".into()
    }
}

impl ApiRequest for ListDeletedTasks {
    type Response = Vec<Task>;
}

#[derive(Debug, Serialize)]
pub struct RestoreTask {
    #[serde(skip)]
    pub task_id: i64,
}

impl Endpoint for RestoreTask {
    const METHOD: HttpMethod = HttpMethod::Post;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/tasks/deleted/{}/restore", self.task_id)
    }
}

impl ApiRequest for RestoreTask {
    type Response = Task;
}

#[derive(Debug, Serialize)]
pub struct PurgeTask {
    #[serde(skip)]
    pub task_id: i64,
}

impl Endpoint for PurgeTask {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/tasks/deleted/{}", self.task_id)
    }
}

impl ApiRequest for PurgeTask {
    type Response = bool;
}

/// Returns the number of updated tasks.
impl Endpoint for TaskBatchUpdate {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/tasks/batch".into()
    }
}

impl ApiRequest for TaskBatchUpdate {
    type Response = u64;
}

/// DELETE with a JSON body; returns the number of deleted tasks.
#[derive(Debug, Serialize)]
pub struct BatchDeleteTasks {
    pub task_ids: Vec<i64>,
}

impl Endpoint for BatchDeleteTasks {
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        "/tasks/batch".into()
    }
}

impl ApiRequest for BatchDeleteTasks {
    type Response = u64;
}

/// CSV file download; not JSON, so only an `Endpoint`.
#[derive(Debug, Serialize)]
pub struct ExportTasksCsv(pub TaskQuery);

impl Endpoint for ExportTasksCsv {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/tasks/export/csv".into()
    }
}

// =========================================================
// Categories
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListCategories(pub PageQuery);

impl Endpoint for ListCategories {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/tasks/categories".into()
    }
}

impl ApiRequest for ListCategories {
    type Response = Vec<Category>;
}

impl Endpoint for CategoryCreate {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/tasks/categories".into()
    }
}

impl ApiRequest for CategoryCreate {
    type Response = Category;
}

#[derive(Debug, Serialize)]
pub struct UpdateCategory {
    #[serde(skip)]
    pub category_id: i64,
    #[serde(flatten)]
    pub update: CategoryUpdate,
}

impl Endpoint for UpdateCategory {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/tasks/categories/{}", self.category_id)
    }
}

impl ApiRequest for UpdateCategory {
    type Response = Category;
}

#[derive(Debug, Serialize)]
pub struct DeleteCategory {
    #[serde(skip)]
    pub category_id: i64,
}

impl Endpoint for DeleteCategory {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/tasks/categories/{}", self.category_id)
    }
}

impl ApiRequest for DeleteCategory {
    type Response = bool;
}

// =========================================================
// Comments
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListTaskComments {
    #[serde(skip)]
    pub task_id: i64,
    #[serde(flatten)]
    pub page: PageQuery,
}

impl Endpoint for ListTaskComments {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/comments/task/{}", self.task_id)
    }
}

impl ApiRequest for ListTaskComments {
    type Response = Vec<Comment>;
}

impl Endpoint for CommentCreate {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/comments/".into()
    }
}

impl ApiRequest for CommentCreate {
    type Response = Comment;
}

#[derive(Debug, Serialize)]
pub struct UpdateComment {
    #[serde(skip)]
    pub comment_id: i64,
    #[serde(flatten)]
    pub update: CommentUpdate,
}

impl Endpoint for UpdateComment {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/comments/{}", self.comment_id)
    }
}

impl ApiRequest for UpdateComment {
    type Response = Comment;
}

#[derive(Debug, Serialize)]
pub struct DeleteComment {
    #[serde(skip)]
    pub comment_id: i64,
}

impl Endpoint for DeleteComment {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/comments/{}", self.comment_id)
    }
}

impl ApiRequest for DeleteComment {
    type Response = bool;
}

// =========================================================
// Reminders
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListReminders(pub PageQuery);

impl Endpoint for ListReminders {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/reminders/".into()
    }
}

impl ApiRequest for ListReminders {
    type Response = Vec<Reminder>;
}

#[derive(Debug, Serialize)]
pub struct GetReminder {
    #[serde(skip)]
    pub reminder_id: i64,
}

impl Endpoint for GetReminder {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/reminders/{}", self.reminder_id)
    }
}

impl ApiRequest for GetReminder {
    type Response = Reminder;
}

#[derive(Debug, Serialize)]
pub struct ListTaskReminders {
    #[serde(skip)]
    pub task_id: i64,
    #[serde(flatten)]
    pub page: PageQuery,
}

impl Endpoint for ListTaskReminders {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/reminders/tasks/{}", self.task_id)
    }
}

impl ApiRequest for ListTaskReminders {
    type Response = Vec<Reminder>;
}

impl Endpoint for ReminderCreate {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/reminders/".into()
    }
}

impl ApiRequest for ReminderCreate {
    type Response = Reminder;
}

#[derive(Debug, Serialize)]
pub struct UpdateReminder {
    #[serde(skip)]
    pub reminder_id: i64,
    #[serde(flatten)]
    pub update: ReminderUpdate,
}

impl Endpoint for UpdateReminder {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/reminders/{}", self.reminder_id)
    }
}

impl ApiRequest for UpdateReminder {
    type Response = Reminder;
}

#[derive(Debug, Serialize)]
pub struct DeleteReminder {
    #[serde(skip)]
    pub reminder_id: i64,
}

impl Endpoint for DeleteReminder {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/reminders/{}", self.reminder_id)
    }
}

impl ApiRequest for DeleteReminder {
    type Response = bool;
}

/// Activate (`active = true`) or deactivate a reminder.
#[derive(Debug, Serialize)]
pub struct SwitchReminder {
    #[serde(skip)]
    pub reminder_id: i64,
    #[serde(skip)]
    pub active: bool,
}

impl Endpoint for SwitchReminder {
    const METHOD: HttpMethod = HttpMethod::Post;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        let action = if self.active { "activate" } else { "deactivate" };
        format!("/reminders/{}/{}", self.reminder_id, action)
    }
}

impl ApiRequest for SwitchReminder {
    type Response = Reminder;
}

// =========================================================
// Attachments
// =========================================================

#[derive(Debug, Serialize)]
pub struct UploadAttachment {
    #[serde(skip)]
    pub task_id: i64,
    #[serde(skip)]
    pub file: FilePart,
}

impl Endpoint for UploadAttachment {
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/tasks/{}/attachments", self.task_id)
    }

    fn payload(&self) -> Result<Payload, EncodeError> {
        Ok(Payload::Multipart {
            field: crate::ATTACHMENT_FIELD,
            file: self.file.clone(),
        })
    }
}

impl ApiRequest for UploadAttachment {
    type Response = Attachment;
}

/// Binary file download; only an `Endpoint`.
#[derive(Debug, Serialize)]
pub struct DownloadAttachment {
    #[serde(skip)]
    pub task_id: i64,
    #[serde(skip)]
    pub attachment_id: i64,
}

impl Endpoint for DownloadAttachment {
    const METHOD: HttpMethod = HttpMethod::Get;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/tasks/{}/attachments/{}", self.task_id, self.attachment_id)
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteAttachment {
    #[serde(skip)]
    pub task_id: i64,
    #[serde(skip)]
    pub attachment_id: i64,
}

impl Endpoint for DeleteAttachment {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::None;
    fn path(&self) -> String {
        format!("/tasks/{}/attachments/{}", self.task_id, self.attachment_id)
    }
}

impl ApiRequest for DeleteAttachment {
    type Response = bool;
}

// =========================================================
// Statistics
// =========================================================

#[derive(Debug, Serialize)]
pub struct GetStatisticsSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl Endpoint for GetStatisticsSummary {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/statistics/summary".into()
    }
}

impl ApiRequest for GetStatisticsSummary {
    type Response = StatisticsSummary;
}

#[derive(Debug, Serialize)]
pub struct GetCompletionStats;

impl Endpoint for GetCompletionStats {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/statistics/tasks/completion".into()
    }
}

impl ApiRequest for GetCompletionStats {
    type Response = CompletionStats;
}

#[derive(Debug, Serialize)]
pub struct GetDailyStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl Endpoint for GetDailyStats {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/statistics/tasks/daily".into()
    }
}

impl ApiRequest for GetDailyStats {
    type Response = Vec<DailyStat>;
}

#[derive(Debug, Serialize)]
pub struct GetCategoryStats;

impl Endpoint for GetCategoryStats {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/statistics/tasks/category".into()
    }
}

impl ApiRequest for GetCategoryStats {
    type Response = Vec<CategoryStat>;
}

#[derive(Debug, Serialize)]
pub struct GetPriorityStats;

impl Endpoint for GetPriorityStats {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/statistics/tasks/priority".into()
    }
}

impl ApiRequest for GetPriorityStats {
    type Response = PriorityStats;
}

#[derive(Debug, Serialize)]
pub struct GetOverdueStats;

impl Endpoint for GetOverdueStats {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/statistics/tasks/overdue".into()
    }
}

impl ApiRequest for GetOverdueStats {
    type Response = OverdueStats;
}

// =========================================================
// Settings
// =========================================================

#[derive(Debug, Serialize)]
pub struct GetProfile;

impl Endpoint for GetProfile {
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/settings/profile".into()
    }
}

impl ApiRequest for GetProfile {
    type Response = User;
}

impl Endpoint for ProfileSettingsUpdate {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/settings/profile".into()
    }
}

impl ApiRequest for ProfileSettingsUpdate {
    type Response = User;
}

impl Endpoint for PasswordChange {
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/settings/password".into()
    }
}

impl ApiRequest for PasswordChange {
    type Response = MessageResponse;
}

/// The backend takes the password as a query parameter.
#[derive(Debug, Serialize)]
pub struct DeleteAccount {
    pub password: String,
}

impl Endpoint for DeleteAccount {
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PLACEMENT: Placement = Placement::Query;
    fn path(&self) -> String {
        "/settings/account".into()
    }
}

impl ApiRequest for DeleteAccount {
    type Response = MessageResponse;
}
