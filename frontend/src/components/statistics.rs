use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::Priority;

use crate::components::layout::Layout;
use crate::components::toast::use_notifier;
use crate::store::use_store;

const DAY_RANGES: &[u32] = &[7, 14, 30, 90];

/// 统计概览
#[component]
pub fn StatisticsPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();
    let days = RwSignal::new(7u32);

    // 切换时间范围时重新加载
    Effect::new(move |_| {
        let days = days.get();
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_statistics(Some(days)).await {
                notifier.error("加载统计数据失败", &e);
            }
        });
    });

    let summary = move || store.select(|s| s.task_statistics().cloned().unwrap_or_default());

    view! {
        <Layout title="统计">
            <div class="join">
                {DAY_RANGES
                    .iter()
                    .map(|&d| view! {
                        <button
                            class=move || if days.get() == d { "btn btn-sm join-item btn-primary" } else { "btn btn-sm join-item" }
                            on:click=move |_| days.set(d)
                        >
                            {format!("近 {} 天", d)}
                        </button>
                    })
                    .collect_view()}
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"任务总数"</div>
                    <div class="stat-value text-primary">{move || summary().task_completion.total_tasks}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"已完成"</div>
                    <div class="stat-value text-success">{move || summary().task_completion.completed_tasks}</div>
                    <div class="stat-desc">{move || format!("完成率 {:.2}%", summary().task_completion.completion_rate)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"进行中 / 待处理"</div>
                    <div class="stat-value text-secondary">
                        {move || {
                            let c = summary().task_completion;
                            format!("{} / {}", c.in_progress_tasks, c.pending_tasks)
                        }}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-title">"已逾期"</div>
                    <div class="stat-value text-error">{move || summary().overdue_stats.overdue_tasks}</div>
                    <div class="stat-desc">{move || format!("逾期率 {:.2}%", summary().overdue_stats.overdue_rate)}</div>
                </div>
            </div>

            <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"每日趋势"</h3>
                        <table class="table table-zebra table-sm">
                            <thead>
                                <tr><th>"日期"</th><th>"新建"</th><th>"完成"</th></tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || summary().daily_stats
                                    key=|d| (d.date.clone(), d.created_count, d.completed_count)
                                    children=|d| view! {
                                        <tr>
                                            <td class="font-mono">{d.date}</td>
                                            <td>{d.created_count}</td>
                                            <td>{d.completed_count}</td>
                                        </tr>
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>

                <div class="space-y-6">
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title">"未完成任务的优先级分布"</h3>
                            {Priority::ALL
                                .iter()
                                .map(|&p| view! {
                                    <div class="flex justify-between">
                                        <span>{p.label()}</span>
                                        <span class="font-bold">{move || summary().priority_stats.count(p)}</span>
                                    </div>
                                })
                                .collect_view()}
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title">"分类分布"</h3>
                            <For
                                each=move || summary().category_stats
                                key=|c| (c.category_name.clone(), c.task_count)
                                children=move |c| {
                                    let total = summary().task_completion.total_tasks.max(1);
                                    let percent = c.task_count * 100 / total;
                                    view! {
                                        <div>
                                            <div class="flex justify-between text-sm">
                                                <span>{c.category_name}</span>
                                                <span>{c.task_count}</span>
                                            </div>
                                            <progress class="progress progress-primary w-full" value=percent.to_string() max="100"></progress>
                                        </div>
                                    }
                                }
                            />
                        </div>
                    </div>
                </div>
            </div>
        </Layout>
    }
}
