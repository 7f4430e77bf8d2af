//! Recording run results and the derived entry status.

use serde_json::{Value, json};
use testplan_lib::db::DbPool;
use testplan_lib::models::{CreateSuiteRequest, TestCasePayload};
use testplan_lib::services::csv_import;

use super::test_helpers::*;

/// Suite with one entry for a case with `steps` steps; returns the entry id.
async fn entry_with_steps(pool: &DbPool, user_id: i32, steps: usize) -> i32 {
    let steps: Vec<Value> = (0..steps)
        .map(|i| json!({ "action": format!("step {}", i + 1), "expectedResult": "ok" }))
        .collect();
    let payload: TestCasePayload =
        serde_json::from_value(json!({ "title": "Run me", "steps": steps })).unwrap();
    let case = pool.create_test_case(&payload, user_id).await.unwrap();

    let suite = pool
        .create_suite(
            &CreateSuiteRequest {
                title: "Run".to_string(),
                description: None,
                test_case_ids: vec![case.id],
            },
            user_id,
        )
        .await
        .unwrap();
    suite.entries[0].id
}

#[actix_rt::test]
async fn test_failed_step_overrides_submitted_status() {
    let pool = create_test_pool().await;
    let (user, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;
    let entry_id = entry_with_steps(&pool, user.id, 2).await;

    let (status, body) = put_json(
        &app,
        &token,
        &format!("/api/v1/test-runs/{}", entry_id),
        json!({
            "status": "Passed",
            "actualResult": "Looked fine",
            "stepResults": [
                { "stepNumber": 1, "status": "Passed", "actualResult": "ok" },
                {
                    "stepNumber": 2,
                    "status": "Failed",
                    "actualResult": "500 error",
                    "action": "rewritten action",
                    "expectedResult": "rewritten expectation"
                }
            ]
        }),
    )
    .await;

    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["status"], "Failed");
    assert_eq!(body["actualResult"], "Looked fine");
    assert!(body["executedAt"].is_string());

    let steps = body["stepResults"].as_array().unwrap();
    assert_eq!(steps[1]["status"], "Failed");
    assert_eq!(steps[1]["actualResult"], "500 error");
    // The frozen copy is never rewritten
    assert_eq!(steps[1]["action"], "step 2");
    assert_eq!(steps[1]["expectedResult"], "ok");
}

#[actix_rt::test]
async fn test_partial_results_are_in_progress() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;
    let entry_id = entry_with_steps(&pool, user.id, 3).await;

    let updated = pool
        .update_run_entry(
            entry_id,
            &serde_json::from_value(json!({
                "status": "Passed",
                "stepResults": [{ "stepNumber": 1, "status": "Passed" }]
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "In Progress");

    // Later submissions only touch the steps they name
    let updated = pool
        .update_run_entry(
            entry_id,
            &serde_json::from_value(json!({
                "status": "Passed",
                "stepResults": [
                    { "stepNumber": 2, "status": "Passed" },
                    { "stepNumber": 3, "status": "Blocked" }
                ]
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "Blocked");
    assert_eq!(updated.step_results[0].status, "Passed");
}

#[actix_rt::test]
async fn test_all_passed_steps_pass_the_entry() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;
    let entry_id = entry_with_steps(&pool, user.id, 2).await;

    let updated = pool
        .update_run_entry(
            entry_id,
            &serde_json::from_value(json!({
                "status": "Failed",
                "stepResults": [
                    { "stepNumber": 1, "status": "Passed" },
                    { "stepNumber": 2, "status": "Passed" }
                ]
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "Passed");
}

#[actix_rt::test]
async fn test_submitted_status_stands_without_step_outcomes() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    // Steps exist but are all still Not Run
    let entry_id = entry_with_steps(&pool, user.id, 2).await;
    let updated = pool
        .update_run_entry(
            entry_id,
            &serde_json::from_value(json!({ "status": "Blocked" })).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "Blocked");
    assert!(updated.executed_at.is_some());

    // No steps at all
    let entry_id = entry_with_steps(&pool, user.id, 0).await;
    let updated = pool
        .update_run_entry(
            entry_id,
            &serde_json::from_value(json!({ "status": "Passed", "actualResult": "done" })).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "Passed");
    assert_eq!(updated.actual_result.as_deref(), Some("done"));
}

#[actix_rt::test]
async fn test_unknown_step_changes_nothing() {
    let pool = create_test_pool().await;
    let (user, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;
    let entry_id = entry_with_steps(&pool, user.id, 1).await;

    let (status, body) = put_json(
        &app,
        &token,
        &format!("/api/v1/test-runs/{}", entry_id),
        json!({
            "status": "Failed",
            "stepResults": [
                { "stepNumber": 1, "status": "Failed" },
                { "stepNumber": 7, "status": "Failed" }
            ]
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let entry = pool.get_run_entry(entry_id).await.unwrap();
    assert_eq!(entry.status, "Not Run");
    assert_eq!(entry.step_results[0].status, "Not Run");
    assert!(entry.executed_at.is_none());
}

#[actix_rt::test]
async fn test_run_update_validation() {
    let pool = create_test_pool().await;
    let (user, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;
    let entry_id = entry_with_steps(&pool, user.id, 1).await;
    let uri = format!("/api/v1/test-runs/{}", entry_id);

    let (status, _) = put_json(&app, &token, &uri, json!({ "status": "Skipped" })).await;
    assert_eq!(status, 400);

    let (status, _) = put_json(&app, &token, "/api/v1/test-runs/9999", json!({ "status": "Passed" })).await;
    assert_eq!(status, 404);

    let req = actix_web::test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "status": "Passed" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 401);

    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, 200);
    assert_eq!(body["suiteTitle"], "Run");
    assert_eq!(body["testCase"]["title"], "Run me");
}

#[actix_rt::test]
async fn test_repeated_step_numbers_are_tracked_separately() {
    let pool = create_test_pool().await;
    let (user, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let csv = "ID,Title,Step Number,Step Action\n1,Dup,1,First\n,,1,Second\n";
    let rows = csv_import::parse_csv(csv.as_bytes()).unwrap();
    let imported = pool.import_test_cases(rows, None, user.id).await.unwrap();
    assert_eq!(imported.imported, 1);
    let case = &pool.list_test_cases(None).await.unwrap()[0];
    assert_eq!(case.steps.len(), 2);

    let suite = pool
        .create_suite(
            &CreateSuiteRequest {
                title: "Dup run".to_string(),
                description: None,
                test_case_ids: vec![case.id],
            },
            user.id,
        )
        .await
        .unwrap();
    let uri = format!("/api/v1/test-runs/{}", suite.entries[0].id);

    let (status, body) = put_json(
        &app,
        &token,
        &uri,
        json!({ "status": "Passed", "stepResults": [{ "stepNumber": 1, "status": "Passed" }] }),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["status"], "In Progress");
    let steps: Vec<(&str, &str)> = body["stepResults"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["action"].as_str().unwrap(), s["status"].as_str().unwrap()))
        .collect();
    assert_eq!(steps, vec![("First", "Passed"), ("Second", "Not Run")]);

    // Naming the number twice reaches the second copy too
    let (status, body) = put_json(
        &app,
        &token,
        &uri,
        json!({
            "status": "Failed",
            "stepResults": [
                { "stepNumber": 1, "status": "Passed" },
                { "stepNumber": 1, "status": "Passed" }
            ]
        }),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["status"], "Passed");

    // A third update for step 1 has nothing left to match
    let (status, _) = put_json(
        &app,
        &token,
        &uri,
        json!({
            "status": "Failed",
            "stepResults": [
                { "stepNumber": 1, "status": "Failed" },
                { "stepNumber": 1, "status": "Failed" },
                { "stepNumber": 1, "status": "Failed" }
            ]
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(pool.get_run_entry(suite.entries[0].id).await.unwrap().status, "Passed");
}

#[actix_rt::test]
async fn test_omitted_actual_result_is_cleared() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;
    let entry_id = entry_with_steps(&pool, user.id, 0).await;

    let updated = pool
        .update_run_entry(
            entry_id,
            &serde_json::from_value(json!({ "status": "Failed", "actualResult": "crashed" }))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.actual_result.as_deref(), Some("crashed"));

    let updated = pool
        .update_run_entry(entry_id, &serde_json::from_value(json!({ "status": "Passed" })).unwrap())
        .await
        .unwrap();
    assert_eq!(updated.status, "Passed");
    assert!(updated.actual_result.is_none());
}
