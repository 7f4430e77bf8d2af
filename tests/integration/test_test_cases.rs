//! Test case create/update/delete, tags and bulk delete.

use actix_web::test;
use serde_json::json;
use testplan_lib::models::TestCasePayload;

use super::test_helpers::*;

fn payload(value: serde_json::Value) -> TestCasePayload {
    serde_json::from_value(value).unwrap()
}

#[actix_rt::test]
async fn test_create_numbers_steps_and_links_tags() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let created = pool
        .create_test_case(
            &payload(json!({
                "title": "  Login works  ",
                "priority": "High",
                "steps": [
                    { "action": "Open login page" },
                    { "action": "Submit", "expectedResult": "Dashboard shown" }
                ],
                "tags": ["smoke", " auth ", "smoke", ""]
            })),
            user.id,
        )
        .await
        .unwrap();

    assert_eq!(created.title, "Login works");
    assert_eq!(created.priority, "High");
    assert_eq!(created.status, "Draft");
    assert!(!created.is_automated);
    assert_eq!(created.author_id, Some(user.id));
    assert_eq!(created.author.as_ref().unwrap().email, "qa@example.com");

    let numbers: Vec<i32> = created.steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(created.steps[1].expected_result.as_deref(), Some("Dashboard shown"));

    let tags: Vec<&str> = created.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["auth", "smoke"]);
}

#[actix_rt::test]
async fn test_title_is_required() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let result = pool
        .create_test_case(&payload(json!({ "title": "   " })), user.id)
        .await;
    assert!(result.is_err());
    assert!(pool.list_test_cases(None).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_update_replaces_tags_and_steps() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let created = pool
        .create_test_case(
            &payload(json!({
                "title": "Case",
                "priority": "Low",
                "isAutomated": true,
                "steps": [{ "action": "a" }, { "action": "b" }, { "action": "c" }],
                "tags": ["a", "b", "c"]
            })),
            user.id,
        )
        .await
        .unwrap();

    let updated = pool
        .update_test_case(
            created.id,
            &payload(json!({
                "title": "Case v2",
                "steps": [{ "action": "only" }],
                "tags": ["b", "d"]
            })),
        )
        .await
        .unwrap();

    let tags: Vec<&str> = updated.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["b", "d"]);
    assert_eq!(updated.steps.len(), 1);
    assert_eq!(updated.steps[0].step_number, 1);
    assert_eq!(updated.steps[0].action, "only");

    // Omitted priority and automation flag keep their values
    assert_eq!(updated.priority, "Low");
    assert!(updated.is_automated);

    // Tags stay shared and unique across test cases
    let all: Vec<String> = pool
        .list_tags()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(all, vec!["a", "b", "c", "d"]);
}

#[actix_rt::test]
async fn test_update_missing_case_is_not_found() {
    let pool = create_test_pool().await;
    let result = pool
        .update_test_case(404, &payload(json!({ "title": "x" })))
        .await;
    assert!(matches!(
        result,
        Err(testplan_lib::error::AppError::NotFound(_))
    ));
}

#[actix_rt::test]
async fn test_create_with_unknown_folder_leaves_nothing() {
    let pool = create_test_pool().await;
    let (user, _) = create_user(&pool, "qa@example.com").await;

    let result = pool
        .create_test_case(
            &payload(json!({ "title": "x", "folderId": 42, "tags": ["orphan"] })),
            user.id,
        )
        .await;
    assert!(result.is_err());
    assert!(pool.list_test_cases(None).await.unwrap().is_empty());
    assert!(pool.list_tags().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_http_crud_and_bulk_delete() {
    let pool = create_test_pool().await;
    let (_, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let (status, body) = post_json(
            &app,
            &token,
            "/api/v1/test-cases",
            json!({ "title": title, "steps": [{ "action": "go" }] }),
        )
        .await;
        assert_eq!(status, 201, "{}", body);
        ids.push(body["id"].as_i64().unwrap());
    }

    let (status, body) = get(&app, &format!("/api/v1/test-cases/{}", ids[0])).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "one");
    assert_eq!(body["steps"][0]["stepNumber"], 1);

    let (status, body) = put_json(
        &app,
        &token,
        &format!("/api/v1/test-cases/{}", ids[0]),
        json!({ "title": "one v2", "priority": "High" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["priority"], "High");
    assert_eq!(body["steps"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::delete()
        .uri("/api/v1/test-cases/bulk-delete")
        .insert_header(bearer(&token))
        .set_json(json!({ "testCaseIds": [ids[1], ids[2], 999] }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["deleted"], 2);
    assert_eq!(body["requested"], 3);

    let req = test::TestRequest::delete()
        .uri("/api/v1/test-cases/bulk-delete")
        .insert_header(bearer(&token))
        .set_json(json!({ "testCaseIds": [] }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/test-cases/{}", ids[0]))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 204);

    let (status, body) = get(&app, &format!("/api/v1/test-cases/{}", ids[0])).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");

    let (_, list) = get(&app, "/api/v1/test-cases").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_malformed_body_is_invalid_input() {
    let pool = create_test_pool().await;
    let (_, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let (status, body) = post_json(
        &app,
        &token,
        "/api/v1/test-cases",
        json!({ "title": "x", "priority": "Urgent" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}
