//! Test suite endpoints.

use actix_web::{HttpResponse, web};

use crate::auth::SessionUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateSuiteRequest, TestSuiteDetail, TestSuiteSummary, UpdateSuiteRequest};

/// List suites, newest first, with their stats.
#[utoipa::path(
    get,
    path = "/api/v1/test-suites",
    tag = "Test Suites",
    responses(
        (status = 200, description = "Suites with stats", body = Vec<TestSuiteSummary>)
    )
)]
pub async fn list_suites(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.list_suites().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/test-suites/{id}",
    tag = "Test Suites",
    params(("id" = i32, Path, description = "Suite id")),
    responses(
        (status = 200, description = "Suite with its run entries", body = TestSuiteDetail),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_suite(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.get_suite(path.into_inner()).await?))
}

/// Create a suite, snapshotting the current steps of each test case.
///
/// Every run entry is assigned to the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/test-suites",
    tag = "Test Suites",
    request_body = CreateSuiteRequest,
    responses(
        (status = 201, description = "Suite created", body = TestSuiteDetail),
        (status = 400, description = "Missing title or empty test case list", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_suite(
    session: SessionUser,
    pool: web::Data<DbPool>,
    body: web::Json<CreateSuiteRequest>,
) -> AppResult<HttpResponse> {
    let suite = pool.create_suite(&body, session.id).await?;
    Ok(HttpResponse::Created().json(suite))
}

#[utoipa::path(
    put,
    path = "/api/v1/test-suites/{id}",
    tag = "Test Suites",
    params(("id" = i32, Path, description = "Suite id")),
    request_body = UpdateSuiteRequest,
    responses(
        (status = 200, description = "Suite status updated", body = TestSuiteSummary),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_suite(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateSuiteRequest>,
) -> AppResult<HttpResponse> {
    let suite = pool
        .update_suite_status(path.into_inner(), &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(suite))
}

#[utoipa::path(
    delete,
    path = "/api/v1/test-suites/{id}",
    tag = "Test Suites",
    params(("id" = i32, Path, description = "Suite id")),
    responses(
        (status = 204, description = "Suite and its runs deleted"),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_suite(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    pool.delete_suite(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-suites")
            .route(web::get().to(list_suites))
            .route(web::post().to(create_suite)),
    )
    .service(
        web::resource("/test-suites/{id}")
            .route(web::get().to(get_suite))
            .route(web::put().to(update_suite))
            .route(web::delete().to(delete_suite)),
    );
}
