//! Dashboard statistics and the reports page.

use chrono::Utc;
use serde_json::json;
use testplan_lib::db::DbPool;
use testplan_lib::models::{CreateSuiteRequest, TestCasePayload, UpdateRunEntryRequest};

use super::test_helpers::*;

async fn seed_case(pool: &DbPool, user_id: i32, title: &str, priority: &str, automated: bool) -> i32 {
    let payload: TestCasePayload = serde_json::from_value(json!({
        "title": title,
        "priority": priority,
        "isAutomated": automated,
    }))
    .unwrap();
    pool.create_test_case(&payload, user_id).await.unwrap().id
}

async fn seed_suite(pool: &DbPool, user_id: i32, title: &str, ids: Vec<i32>) -> Vec<i32> {
    pool.create_suite(
        &CreateSuiteRequest {
            title: title.to_string(),
            description: None,
            test_case_ids: ids,
        },
        user_id,
    )
    .await
    .unwrap()
    .entries
    .iter()
    .map(|e| e.id)
    .collect()
}

async fn record(pool: &DbPool, entry_id: i32, status: &str) {
    let req: UpdateRunEntryRequest = serde_json::from_value(json!({ "status": status })).unwrap();
    pool.update_run_entry(entry_id, &req).await.unwrap();
}

#[actix_rt::test]
async fn test_dashboard_counts_and_trend() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let a = seed_case(&pool, user.id, "A", "High", false).await;
    let b = seed_case(&pool, user.id, "B", "Low", true).await;
    let c = seed_case(&pool, user.id, "C", "Medium", false).await;
    let entries = seed_suite(&pool, user.id, "S1", vec![a, b, c]).await;

    record(&pool, entries[0], "Passed").await;
    record(&pool, entries[1], "Failed").await;

    let now = Utc::now();
    let stats = pool.dashboard_stats(now).await.unwrap();

    assert_eq!(stats.summary.total_test_cases, 3);
    assert_eq!(stats.summary.total_test_suites, 1);
    assert_eq!(stats.summary.total_test_runs, 3);

    let dist: Vec<(&str, u64)> = stats
        .status_distribution
        .iter()
        .map(|s| (s.status.as_str(), s.count))
        .collect();
    assert_eq!(dist, vec![("Not Run", 1), ("Passed", 1), ("Failed", 1)]);

    // Two executions recorded today, none before
    assert_eq!(stats.execution_trend.len(), 1);
    assert_eq!(stats.execution_trend[0].count, 2);
    assert_eq!(
        stats.execution_trend[0].date,
        now.date_naive().format("%b %-d").to_string()
    );
}

#[actix_rt::test]
async fn test_empty_dashboard() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get(&app, "/api/v1/dashboard/stats").await;
    assert_eq!(status, 200);
    assert_eq!(body["summary"]["totalTestCases"], 0);
    assert!(body["statusDistribution"].as_array().unwrap().is_empty());
    assert!(body["executionTrend"].as_array().unwrap().is_empty());

    let (status, body) = get(&app, "/api/v1/reports").await;
    assert_eq!(status, 200);
    assert_eq!(body["overallPassRate"], 0);
    assert!(body["recentSuites"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_reports_aggregates_and_filter() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let a = seed_case(&pool, user.id, "A", "High", true).await;
    let b = seed_case(&pool, user.id, "B", "High", false).await;
    let c = seed_case(&pool, user.id, "C", "Low", true).await;

    let first = seed_suite(&pool, user.id, "Suite 1", vec![a, b]).await;
    record(&pool, first[0], "Passed").await;
    record(&pool, first[1], "Passed").await;
    for i in 2..=6 {
        let entries = seed_suite(&pool, user.id, &format!("Suite {}", i), vec![c]).await;
        if i == 6 {
            record(&pool, entries[0], "Failed").await;
        }
    }

    let (status, body) = get(&app, "/api/v1/reports").await;
    assert_eq!(status, 200, "{}", body);

    // 2 passed out of 7 entries
    assert_eq!(body["overallPassRate"], 29);
    assert_eq!(body["summary"]["totalTestSuites"], 6);

    let priorities = body["priorityDistribution"].as_array().unwrap();
    assert_eq!(priorities[0], json!({ "priority": "High", "count": 2 }));
    assert_eq!(priorities[1], json!({ "priority": "Low", "count": 1 }));

    let recent: Vec<&str> = body["recentSuites"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(recent, vec!["Suite 6", "Suite 5", "Suite 4", "Suite 3", "Suite 2"]);
    assert_eq!(body["recentSuites"][0]["stats"]["failed"], 1);
    assert_eq!(body["testCases"].as_array().unwrap().len(), 3);

    let (_, body) = get(&app, "/api/v1/reports?priority=High&automated=true").await;
    let rows = body["testCases"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "A");
    assert_eq!(rows[0]["authorName"], "QA");
    assert!(rows[0]["folderName"].is_null());
}
