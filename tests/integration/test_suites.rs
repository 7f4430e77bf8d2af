//! Suite creation snapshots, ordering and deletion.

use actix_web::test;
use serde_json::json;
use testplan_lib::error::AppError;
use testplan_lib::models::{CreateSuiteRequest, TestCasePayload};

use super::test_helpers::*;

fn case_with_steps(title: &str, steps: &[&str]) -> TestCasePayload {
    let steps: Vec<_> = steps
        .iter()
        .map(|a| json!({ "action": a, "expectedResult": format!("{} ok", a) }))
        .collect();
    serde_json::from_value(json!({ "title": title, "steps": steps })).unwrap()
}

fn suite(title: &str, ids: Vec<i32>) -> CreateSuiteRequest {
    CreateSuiteRequest {
        title: title.to_string(),
        description: None,
        test_case_ids: ids,
    }
}

#[actix_rt::test]
async fn test_snapshot_is_unaffected_by_later_edits() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let case = pool
        .create_test_case(&case_with_steps("Checkout", &["Add item", "Pay"]), user.id)
        .await
        .unwrap();
    let created = pool
        .create_suite(&suite("Release 1", vec![case.id]), user.id)
        .await
        .unwrap();
    let entry_id = created.entries[0].id;

    pool.update_test_case(
        case.id,
        &case_with_steps("Checkout v2", &["Add item", "Apply coupon", "Pay"]),
    )
    .await
    .unwrap();

    let entry = pool.get_run_entry(entry_id).await.unwrap();
    assert_eq!(entry.test_case_title, "Checkout");
    assert_eq!(entry.suite_title, "Release 1");
    let frozen: Vec<(i32, &str, &str)> = entry
        .step_results
        .iter()
        .map(|s| (s.step_number, s.action.as_str(), s.status.as_str()))
        .collect();
    assert_eq!(frozen, vec![(1, "Add item", "Not Run"), (2, "Pay", "Not Run")]);
    assert_eq!(entry.step_results[1].expected_result.as_deref(), Some("Pay ok"));

    // The live case is still attached and reflects the edit
    let live = entry.test_case.unwrap();
    assert_eq!(live.title, "Checkout v2");
    assert_eq!(live.steps.len(), 3);
}

#[actix_rt::test]
async fn test_entries_follow_request_order() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let a = pool.create_test_case(&case_with_steps("A", &["x"]), user.id).await.unwrap();
    let b = pool.create_test_case(&case_with_steps("B", &[]), user.id).await.unwrap();
    let c = pool.create_test_case(&case_with_steps("C", &["y", "z"]), user.id).await.unwrap();

    let created = pool
        .create_suite(&suite("Ordered", vec![c.id, a.id, b.id, a.id]), user.id)
        .await
        .unwrap();

    let titles: Vec<&str> = created
        .entries
        .iter()
        .map(|e| e.test_case_title.as_str())
        .collect();
    assert_eq!(titles, vec!["C", "A", "B", "A"]);
    assert!(created.entries.iter().all(|e| e.status == "Not Run"));
    assert_eq!(created.entries[0].assignee.as_ref().unwrap().id, user.id);
    assert_eq!(created.suite.status, "In Progress");
    assert_eq!(created.suite.stats.total, 4);
    assert_eq!(created.suite.stats.not_run, 4);
    assert_eq!(created.suite.stats.pass_rate, 0);

    // A case without steps still gets an entry, with no step results
    let empty = pool.get_run_entry(created.entries[2].id).await.unwrap();
    assert!(empty.step_results.is_empty());

    // A repeated case is snapshotted again as an independent entry
    assert_ne!(created.entries[1].id, created.entries[3].id);
    let first = pool.get_run_entry(created.entries[1].id).await.unwrap();
    let second = pool.get_run_entry(created.entries[3].id).await.unwrap();
    assert_eq!(first.step_results.len(), 1);
    assert_eq!(second.step_results.len(), 1);
    assert_ne!(first.step_results[0].id, second.step_results[0].id);
}

#[actix_rt::test]
async fn test_unknown_case_creates_nothing() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;
    let a = pool.create_test_case(&case_with_steps("A", &["x"]), user.id).await.unwrap();

    let result = pool
        .create_suite(&suite("Broken", vec![a.id, 9999]), user.id)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(pool.list_suites().await.unwrap().is_empty());

    let result = pool.create_suite(&suite("Empty", vec![]), user.id).await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));

    let result = pool.create_suite(&suite("  ", vec![a.id]), user.id).await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[actix_rt::test]
async fn test_deleted_case_keeps_entry_title() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;
    let a = pool.create_test_case(&case_with_steps("Gone soon", &["x"]), user.id).await.unwrap();
    let created = pool.create_suite(&suite("S", vec![a.id]), user.id).await.unwrap();

    pool.delete_test_case(a.id).await.unwrap();

    let detail = pool.get_suite(created.suite.id).await.unwrap();
    assert_eq!(detail.entries.len(), 1);
    assert_eq!(detail.entries[0].test_case_id, None);
    assert_eq!(detail.entries[0].test_case_title, "Gone soon");
    assert_eq!(detail.entries[0].priority, None);

    let entry = pool.get_run_entry(detail.entries[0].id).await.unwrap();
    assert!(entry.test_case.is_none());
    assert_eq!(entry.step_results.len(), 1);
}

#[actix_rt::test]
async fn test_http_suite_lifecycle() {
    let pool = create_test_pool().await;
    let (user, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let a = pool.create_test_case(&case_with_steps("A", &["x"]), user.id).await.unwrap();

    let (status, first) = post_json(
        &app,
        &token,
        "/api/v1/test-suites",
        json!({ "title": "First", "testCaseIds": [a.id] }),
    )
    .await;
    assert_eq!(status, 201, "{}", first);
    assert_eq!(first["entries"].as_array().unwrap().len(), 1);
    assert_eq!(first["stats"]["total"], 1);

    let (status, second) = post_json(
        &app,
        &token,
        "/api/v1/test-suites",
        json!({ "title": "Second", "testCaseIds": [a.id] }),
    )
    .await;
    assert_eq!(status, 201);

    let (status, _) = post_json(
        &app,
        &token,
        "/api/v1/test-suites",
        json!({ "title": "Bad", "testCaseIds": [] }),
    )
    .await;
    assert_eq!(status, 400);

    let (_, list) = get(&app, "/api/v1/test-suites").await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let first_id = first["id"].as_i64().unwrap();
    let (status, updated) = put_json(
        &app,
        &token,
        &format!("/api/v1/test-suites/{}", first_id),
        json!({ "status": "Completed" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["status"], "Completed");

    let entry_id = first["entries"][0]["id"].as_i64().unwrap();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/test-suites/{}", first_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 204);

    // Entries and step results go with the suite
    let (status, _) = get(&app, &format!("/api/v1/test-runs/{}", entry_id)).await;
    assert_eq!(status, 404);
    let (status, _) = get(&app, &format!("/api/v1/test-suites/{}", first_id)).await;
    assert_eq!(status, 404);

    let (status, _) = get(&app, &format!("/api/v1/test-suites/{}", second["id"])).await;
    assert_eq!(status, 200);
}
