use taskhub_shared::protocol::{
    GetCategoryStats, GetCompletionStats, GetDailyStats, GetOverdueStats, GetPriorityStats,
    GetStatisticsSummary,
};
use taskhub_shared::{
    CategoryStat, CompletionStats, DailyStat, OverdueStats, PriorityStats, StatisticsSummary,
};

use super::{ApiClient, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    /// `days` 为空时由后端决定统计窗口
    pub async fn statistics_summary(&self, days: Option<u32>) -> ApiResult<StatisticsSummary> {
        self.send(&GetStatisticsSummary { days }).await
    }

    pub async fn completion_stats(&self) -> ApiResult<CompletionStats> {
        self.send(&GetCompletionStats).await
    }

    pub async fn daily_stats(&self, days: Option<u32>) -> ApiResult<Vec<DailyStat>> {
        self.send(&GetDailyStats { days }).await
    }

    pub async fn category_stats(&self) -> ApiResult<Vec<CategoryStat>> {
        self.send(&GetCategoryStats).await
    }

    pub async fn priority_stats(&self) -> ApiResult<PriorityStats> {
        self.send(&GetPriorityStats).await
    }

    pub async fn overdue_stats(&self) -> ApiResult<OverdueStats> {
        self.send(&GetOverdueStats).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::mock::mock_client;
    use serde_json::json;
    use taskhub_shared::Priority;
    use taskhub_shared::protocol::HttpMethod;

    #[tokio::test]
    async fn summary_passes_the_window() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Get,
            "/api/statistics/summary?days=30",
            200,
            json!({
                "task_completion": {"total_tasks": 4, "completed_tasks": 1, "pending_tasks": 2,
                                    "in_progress_tasks": 1, "deleted_tasks": 0, "completion_rate": 25.0},
                "daily_stats": [{"date": "2024-06-01", "created_count": 2, "completed_count": 1}],
                "category_stats": [{"category_name": "Work", "task_count": 3}],
                "priority_stats": {"high": 2},
                "overdue_stats": {"overdue_tasks": 1, "total_tasks": 3, "overdue_rate": 33.33}
            }),
        );

        let summary = api.statistics_summary(Some(30)).await.unwrap();

        assert_eq!(summary.task_completion.total_tasks, 4);
        assert_eq!(summary.daily_stats.len(), 1);
        assert_eq!(summary.priority_stats.count(Priority::High), 2);
        assert_eq!(summary.overdue_stats.overdue_tasks, 1);
    }

    #[tokio::test]
    async fn sub_endpoints_live_under_statistics_tasks() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Get, "/api/statistics/tasks/completion", 200, json!({}));
        transport.mock_json(HttpMethod::Get, "/api/statistics/tasks/daily", 200, json!([]));
        transport.mock_json(HttpMethod::Get, "/api/statistics/tasks/category", 200, json!([]));
        transport.mock_json(
            HttpMethod::Get,
            "/api/statistics/tasks/priority",
            200,
            json!({"Priority.LOW": 4}),
        );
        transport.mock_json(HttpMethod::Get, "/api/statistics/tasks/overdue", 200, json!({}));

        assert_eq!(api.completion_stats().await.unwrap().total_tasks, 0);
        assert!(api.daily_stats(None).await.unwrap().is_empty());
        assert!(api.category_stats().await.unwrap().is_empty());
        assert_eq!(api.priority_stats().await.unwrap().count(Priority::Low), 4);
        assert_eq!(api.overdue_stats().await.unwrap().overdue_rate, 0.0);
        assert_eq!(transport.calls().len(), 5);
    }
}
