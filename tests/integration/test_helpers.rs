//! Shared helpers: in-memory database, test app and signed-in users.

use actix_web::{App, dev::ServiceResponse, test, web};
use secrecy::SecretString;
use serde_json::Value;
use testplan_lib::auth::SessionSecret;
use testplan_lib::config::{Config, DatabaseSettings, Environment, SessionSettings};
use testplan_lib::db::DbPool;
use testplan_lib::middleware::RequestLogger;
use testplan_lib::models::User;
use testplan_lib::services::auth;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "secret123";

/// Config pointing at a private in-memory SQLite database.
pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            // One connection, so every query sees the same in-memory database
            max_connections: 1,
            min_connections: 1,
        },
        session: SessionSettings {
            secret: SecretString::from(TEST_SECRET.to_string()),
            ttl_secs: 3600,
        },
        max_import_size: 64 * 1024,
    }
}

/// Fresh, migrated database for one test.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::new(&test_config())
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn session_secret() -> SessionSecret {
    let config = test_config();
    SessionSecret::new(config.session.secret, config.session.ttl_secs)
}

/// Register a user and return it with a valid session token.
pub async fn create_user(pool: &DbPool, email: &str) -> (User, String) {
    let user = auth::register(pool, email, TEST_PASSWORD, Some("QA"))
        .await
        .expect("Failed to register user");
    let token = session_secret()
        .issue(&user)
        .expect("Failed to issue session token");
    (user, token)
}

/// Create the full `/api/v1` app over `pool`.
pub async fn create_test_app(
    pool: &DbPool,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(session_secret()))
            .configure(testplan_lib::api::configure_extractors)
            .service(web::scope("/api/v1").configure(testplan_lib::api::configure_api)),
    )
    .await
}

/// Call the app and decode the JSON body (`Value::Null` when empty).
pub async fn send<S>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// POST JSON as a signed-in user.
pub async fn post_json<S>(app: &S, token: &str, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
        .to_request();
    send(app, req).await
}

/// PUT JSON as a signed-in user.
pub async fn put_json<S>(app: &S, token: &str, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::put()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
        .to_request();
    send(app, req).await
}

/// Anonymous GET.
pub async fn get<S>(app: &S, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    send(app, req).await
}
