//! Account signup/signin over JSON and HTML forms, session lookup and signout.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::test;
use serde_json::json;
use testplan_lib::config::SESSION_COOKIE;
use testplan_lib::middleware::REQUEST_ID_HEADER;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_json_signup_sets_session_cookie() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": " New@Example.com ", "password": "secret123", "name": "New" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie");
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "new@example.com");
    assert!(body["user"].get("passwordHash").is_none());
}

#[actix_rt::test]
async fn test_signup_rejections() {
    let pool = create_test_pool().await;
    create_user(&pool, "taken@example.com").await;
    let app = create_test_app(&pool).await;

    for body in [
        json!({ "email": "TAKEN@example.com", "password": "secret123" }),
        json!({ "email": "short@example.com", "password": "12345" }),
        json!({ "email": "no-at-sign", "password": "secret123" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(body)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, 400, "{}", body);
        assert_eq!(body["error"], "INVALID_INPUT");
    }
}

#[actix_rt::test]
async fn test_json_signin() {
    let pool = create_test_pool().await;
    create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signin")
        .set_json(json!({ "email": "qa@example.com", "password": "wrong-password" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert!(body["message"].as_str().unwrap().contains("Invalid email or password"));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signin")
        .set_json(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 401);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signin")
        .set_json(json!({ "email": "QA@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["name"], "QA");
}

#[actix_rt::test]
async fn test_form_signin_redirects() {
    let pool = create_test_pool().await;
    create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signin")
        .set_form([("email", "qa@example.com"), ("password", "nope-nope")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/signin?error=invalid"
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signin")
        .set_form([("email", "qa@example.com"), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
    );
}

#[actix_rt::test]
async fn test_form_signup_duplicate_redirects() {
    let pool = create_test_pool().await;
    create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_form([("email", "qa@example.com"), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/signup?error=exists"
    );
}

#[actix_rt::test]
async fn test_session_lookup() {
    let pool = create_test_pool().await;
    let (user, token) = create_user(&pool, "qa@example.com").await;
    let app = create_test_app(&pool).await;

    let (status, body) = get(&app, "/api/v1/auth/session").await;
    assert_eq!(status, 200);
    assert!(body["user"].is_null());

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["user"]["id"], user.id);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["user"]["email"], "qa@example.com");

    // A tampered token is treated as a guest
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(&format!("{}x", token)))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(body["user"].is_null());
}

#[actix_rt::test]
async fn test_signout_clears_cookie() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signout")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("cleared cookie");
    assert!(cookie.value().is_empty());
    assert_eq!(
        cookie.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );
}

#[actix_rt::test]
async fn test_request_id_is_echoed() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/health")
        .insert_header((REQUEST_ID_HEADER, "trace-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-123");

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    let generated = resp.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);
}
