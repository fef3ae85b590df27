use taskhub_shared::protocol::{
    DeleteReminder, GetReminder, ListReminders, ListTaskReminders, SwitchReminder, UpdateReminder,
};
use taskhub_shared::{PageQuery, Reminder, ReminderCreate, ReminderUpdate};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    pub async fn list_reminders(&self, page: PageQuery) -> ApiResult<Vec<Reminder>> {
        self.send(&ListReminders(page)).await
    }

    pub async fn get_reminder(&self, reminder_id: i64) -> ApiResult<Reminder> {
        self.send(&GetReminder { reminder_id }).await
    }

    pub async fn task_reminders(&self, task_id: i64) -> ApiResult<Vec<Reminder>> {
        self.send(&ListTaskReminders {
            task_id,
            page: PageQuery::default(),
        })
        .await
    }

    pub async fn create_reminder(&self, reminder: ReminderCreate) -> ApiResult<Reminder> {
        self.send(&reminder).await
    }

    pub async fn update_reminder(&self, reminder_id: i64, update: ReminderUpdate) -> ApiResult<Reminder> {
        self.send(&UpdateReminder {
            reminder_id,
            update,
        })
        .await
    }

    pub async fn delete_reminder(&self, reminder_id: i64) -> ApiResult<bool> {
        self.send(&DeleteReminder { reminder_id }).await
    }

    pub async fn activate_reminder(&self, reminder_id: i64) -> ApiResult<Reminder> {
        self.send(&SwitchReminder {
            reminder_id,
            active: true,
        })
        .await
    }

    pub async fn deactivate_reminder(&self, reminder_id: i64) -> ApiResult<Reminder> {
        self.send(&SwitchReminder {
            reminder_id,
            active: false,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::mock::mock_client;
    use serde_json::json;
    use taskhub_shared::protocol::HttpMethod;
    use taskhub_shared::{ReminderCreate, ReminderMethod, ReminderType, ReminderUpdate, date};

    fn reminder(id: i64, active: bool) -> serde_json::Value {
        json!({
            "id": id,
            "task_id": 3,
            "reminder_time": "2024-06-01T08:30:00",
            "reminder_type": "daily",
            "method": "popup",
            "is_active": active
        })
    }

    #[tokio::test]
    async fn list_all_and_per_task() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Get, "/api/reminders/", 200, json!([reminder(1, true)]));
        transport.mock_json(
            HttpMethod::Get,
            "/api/reminders/tasks/3",
            200,
            json!([reminder(1, true), reminder(2, false)]),
        );

        let all = api.list_reminders(Default::default()).await.unwrap();
        assert_eq!(all[0].reminder_type, ReminderType::Daily);

        let for_task = api.task_reminders(3).await.unwrap();
        assert_eq!(for_task.len(), 2);
        assert!(!for_task[1].is_active);
    }

    #[tokio::test]
    async fn create_sends_a_naive_timestamp() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Post, "/api/reminders/", 200, reminder(7, true));

        api.create_reminder(ReminderCreate {
            task_id: 3,
            reminder_time: date::parse_input("2024-06-01T08:30").unwrap(),
            reminder_type: ReminderType::Once,
            method: ReminderMethod::Sound,
        })
        .await
        .unwrap();

        let body = transport.last_json();
        assert_eq!(body["task_id"], 3);
        assert_eq!(body["reminder_type"], "once");
        assert_eq!(body["method"], "sound");
        assert!(body["reminder_time"].as_str().unwrap().starts_with("2024-06-01T08:30"));
    }

    #[tokio::test]
    async fn switch_returns_the_server_copy() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Post, "/api/reminders/2/activate", 200, reminder(2, true));
        transport.mock_json(HttpMethod::Post, "/api/reminders/2/deactivate", 200, reminder(2, false));

        assert!(api.activate_reminder(2).await.unwrap().is_active);
        assert!(!api.deactivate_reminder(2).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn get_update_delete_by_id() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Get, "/api/reminders/4", 200, reminder(4, true));
        transport.mock_json(HttpMethod::Put, "/api/reminders/4", 200, reminder(4, false));
        transport.mock_json(HttpMethod::Delete, "/api/reminders/4", 200, json!(true));

        assert_eq!(api.get_reminder(4).await.unwrap().id, 4);

        api.update_reminder(
            4,
            ReminderUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(transport.last_json(), json!({"is_active": false}));

        assert!(api.delete_reminder(4).await.unwrap());
    }
}
