//! Dashboard and reports endpoints.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{DashboardStats, ReportsResponse, TestCaseFilter};

/// Totals, run status distribution and the 30-day execution trend.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.dashboard_stats(Utc::now()).await?))
}

/// Reports page data with a filtered test case table.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Dashboard",
    params(
        ("folderId" = Option<i32>, Query, description = "Folder subtree"),
        ("priority" = Option<String>, Query, description = "High, Medium or Low"),
        ("status" = Option<String>, Query, description = "Test case status"),
        ("automated" = Option<String>, Query, description = "true or false")
    ),
    responses(
        (status = 200, description = "Report aggregates", body = ReportsResponse)
    )
)]
pub async fn reports(
    pool: web::Data<DbPool>,
    query: web::Query<TestCaseFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.reports(&query).await?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/dashboard/stats").route(web::get().to(dashboard_stats)))
        .service(web::resource("/reports").route(web::get().to(reports)));
}
