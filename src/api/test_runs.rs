//! Test run (run entry) endpoints.

use actix_web::{HttpResponse, web};

use crate::auth::SessionUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{RunEntryDetail, UpdateRunEntryRequest};

#[utoipa::path(
    get,
    path = "/api/v1/test-runs/{id}",
    tag = "Test Runs",
    params(("id" = i32, Path, description = "Run entry id")),
    responses(
        (status = 200, description = "Run entry with step results", body = RunEntryDetail),
        (status = 404, description = "Run entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_run(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.get_run_entry(path.into_inner()).await?))
}

/// Record the outcome of a run entry and its steps.
///
/// The stored status is derived from the step results when they determine
/// one; otherwise the submitted status is kept.
#[utoipa::path(
    put,
    path = "/api/v1/test-runs/{id}",
    tag = "Test Runs",
    params(("id" = i32, Path, description = "Run entry id")),
    request_body = UpdateRunEntryRequest,
    responses(
        (status = 200, description = "Run entry updated", body = RunEntryDetail),
        (status = 400, description = "Unknown status or step number", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Run entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_run(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateRunEntryRequest>,
) -> AppResult<HttpResponse> {
    let entry = pool.update_run_entry(path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(entry))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-runs/{id}")
            .route(web::get().to(get_run))
            .route(web::put().to(update_run)),
    );
}
