//! Folder endpoints.

use actix_web::{HttpResponse, web};

use crate::auth::SessionUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateFolderRequest, Folder, FolderNode, UpdateFolderRequest};

/// List all folders in storage order.
#[utoipa::path(
    get,
    path = "/api/v1/folders",
    tag = "Folders",
    responses(
        (status = 200, description = "Flat folder list", body = Vec<Folder>)
    )
)]
pub async fn list_folders(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.list_folders().await?))
}

/// Folder forest. Folders whose parent is missing are omitted.
#[utoipa::path(
    get,
    path = "/api/v1/folders/tree",
    tag = "Folders",
    responses(
        (status = 200, description = "Root folders with nested children", body = Vec<FolderNode>)
    )
)]
pub async fn folder_tree(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.folder_tree().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/folders/{id}",
    tag = "Folders",
    params(("id" = i32, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Folder", body = Folder),
        (status = 404, description = "Folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_folder(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.get_folder(path.into_inner()).await?))
}

/// Create a folder.
#[utoipa::path(
    post,
    path = "/api/v1/folders",
    tag = "Folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = Folder),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Parent folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_folder(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    body: web::Json<CreateFolderRequest>,
) -> AppResult<HttpResponse> {
    let folder = pool.create_folder(&body).await?;
    Ok(HttpResponse::Created().json(folder))
}

/// Rename or move a folder.
#[utoipa::path(
    put,
    path = "/api/v1/folders/{id}",
    tag = "Folders",
    params(("id" = i32, Path, description = "Folder id")),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Folder updated", body = Folder),
        (status = 400, description = "Invalid input or move into own subtree", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_folder(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateFolderRequest>,
) -> AppResult<HttpResponse> {
    let folder = pool.update_folder(path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(folder))
}

/// Delete a folder and its subfolders.
#[utoipa::path(
    delete,
    path = "/api/v1/folders/{id}",
    tag = "Folders",
    params(("id" = i32, Path, description = "Folder id")),
    responses(
        (status = 204, description = "Folder deleted"),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_folder(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    pool.delete_folder(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure folder routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/folders")
            .route(web::get().to(list_folders))
            .route(web::post().to(create_folder)),
    )
    .service(web::resource("/folders/tree").route(web::get().to(folder_tree)))
    .service(
        web::resource("/folders/{id}")
            .route(web::get().to(get_folder))
            .route(web::put().to(update_folder))
            .route(web::delete().to(delete_folder)),
    );
}
