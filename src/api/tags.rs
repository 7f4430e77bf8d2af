//! Tag endpoints.

use actix_web::{HttpResponse, web};

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::Tag;

/// List all tags by name.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "Tags",
    responses(
        (status = 200, description = "All tags", body = Vec<Tag>)
    )
)]
pub async fn list_tags(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.list_tags().await?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/tags").route(web::get().to(list_tags)));
}
