//! Test case endpoints, including CSV import and export.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use tracing::info;

use crate::auth::SessionUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    BulkDeleteRequest, BulkDeleteResponse, ImportRequest, ImportResponse, ListTestCasesQuery,
    TestCaseDetail, TestCaseFilter, TestCasePayload,
};
use crate::services::{csv_export, csv_import};

/// Page the browser returns to after a successful upload.
const IMPORT_DONE_PATH: &str = "/test-plan";
/// Upload page, shown again with an error message.
const IMPORT_FORM_PATH: &str = "/test-plan/import";

/// List test cases, optionally within a folder subtree.
#[utoipa::path(
    get,
    path = "/api/v1/test-cases",
    tag = "Test Cases",
    params(
        ("folderId" = Option<i32>, Query, description = "Only this folder and its subfolders")
    ),
    responses(
        (status = 200, description = "Test cases with steps, tags and author", body = Vec<TestCaseDetail>)
    )
)]
pub async fn list_test_cases(
    pool: web::Data<DbPool>,
    query: web::Query<ListTestCasesQuery>,
) -> AppResult<HttpResponse> {
    let cases = pool.list_test_cases(query.folder_id).await?;
    Ok(HttpResponse::Ok().json(cases))
}

#[utoipa::path(
    get,
    path = "/api/v1/test-cases/{id}",
    tag = "Test Cases",
    params(("id" = i32, Path, description = "Test case id")),
    responses(
        (status = 200, description = "Test case", body = TestCaseDetail),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_test_case(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(pool.get_test_case(path.into_inner()).await?))
}

/// Create a test case. Steps are numbered in the order given.
#[utoipa::path(
    post,
    path = "/api/v1/test-cases",
    tag = "Test Cases",
    request_body = TestCasePayload,
    responses(
        (status = 201, description = "Test case created", body = TestCaseDetail),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_test_case(
    session: SessionUser,
    pool: web::Data<DbPool>,
    body: web::Json<TestCasePayload>,
) -> AppResult<HttpResponse> {
    let case = pool.create_test_case(&body, session.id).await?;
    Ok(HttpResponse::Created().json(case))
}

/// Update a test case. Steps and tags are replaced wholesale.
#[utoipa::path(
    put,
    path = "/api/v1/test-cases/{id}",
    tag = "Test Cases",
    params(("id" = i32, Path, description = "Test case id")),
    request_body = TestCasePayload,
    responses(
        (status = 200, description = "Test case updated", body = TestCaseDetail),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case or folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_test_case(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<TestCasePayload>,
) -> AppResult<HttpResponse> {
    let case = pool.update_test_case(path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(case))
}

#[utoipa::path(
    delete,
    path = "/api/v1/test-cases/{id}",
    tag = "Test Cases",
    params(("id" = i32, Path, description = "Test case id")),
    responses(
        (status = 204, description = "Test case deleted"),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_test_case(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    pool.delete_test_case(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete several test cases.
#[utoipa::path(
    delete,
    path = "/api/v1/test-cases/bulk-delete",
    tag = "Test Cases",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Test cases deleted", body = BulkDeleteResponse),
        (status = 400, description = "Empty id list", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_delete_test_cases(
    _session: SessionUser,
    pool: web::Data<DbPool>,
    body: web::Json<BulkDeleteRequest>,
) -> AppResult<HttpResponse> {
    let deleted = pool.bulk_delete_test_cases(&body.test_case_ids).await?;
    Ok(HttpResponse::Ok().json(BulkDeleteResponse {
        success: true,
        deleted,
        requested: body.test_case_ids.len(),
    }))
}

/// Download test cases as CSV, one row per step.
#[utoipa::path(
    get,
    path = "/api/v1/test-cases/export",
    tag = "Test Cases",
    params(
        ("folderId" = Option<i32>, Query, description = "Folder subtree"),
        ("priority" = Option<String>, Query, description = "High, Medium or Low"),
        ("status" = Option<String>, Query, description = "Test case status"),
        ("automated" = Option<String>, Query, description = "true or false")
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv")
    )
)]
pub async fn export_test_cases(
    pool: web::Data<DbPool>,
    query: web::Query<TestCaseFilter>,
) -> AppResult<HttpResponse> {
    let cases = pool.export_test_cases(&query).await?;
    let body = csv_export::write_csv(&cases)?;

    let filename = format!("test-cases-{}.csv", Utc::now().format("%Y-%m-%d"));
    info!(test_cases = cases.len(), "CSV export generated");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body))
}

/// Import test cases from CSV.
///
/// Accepts either a JSON body of parsed rows or a multipart upload with a
/// `file` part and an optional `folderId` part. JSON callers get the import
/// summary; multipart (browser form) callers are redirected.
#[utoipa::path(
    post,
    path = "/api/v1/test-cases/import",
    tag = "Test Cases",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Import summary; failed groups are listed in details", body = ImportResponse),
        (status = 303, description = "Multipart upload redirect"),
        (status = 400, description = "Malformed body", body = crate::error::ErrorResponse),
        (status = 401, description = "Sign-in required", body = crate::error::ErrorResponse),
        (status = 404, description = "Default folder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_test_cases(
    session: SessionUser,
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::new(req.headers(), payload);
        let outcome = import_upload(multipart, &pool, config.max_import_size, session.id).await;
        return Ok(match outcome {
            Ok(result) => redirect(&format!("{}?imported={}", IMPORT_DONE_PATH, result.imported)),
            Err(e) => redirect(&format!(
                "{}?error={}",
                IMPORT_FORM_PATH,
                urlencoding::encode(&e.to_string())
            )),
        });
    }

    let bytes = read_limited(payload, config.max_import_size).await?;
    let body: ImportRequest = serde_json::from_slice(&bytes)?;
    let rows = csv_import::rows_from_json(body.data);

    let result = pool
        .import_test_cases(rows, body.folder_id, session.id)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn import_upload(
    mut multipart: Multipart,
    pool: &DbPool,
    limit: usize,
    author_id: i32,
) -> AppResult<ImportResponse> {
    let mut file: Option<Vec<u8>> = None;
    let mut folder_id: Option<i32> = None;

    while let Some(item) = multipart.next().await {
        let field = item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;
        let name = field.name().unwrap_or_default().to_string();
        let data = read_limited(field, limit).await?;

        match name.as_str() {
            "file" => file = Some(data),
            "folderId" => {
                let raw = String::from_utf8_lossy(&data);
                let raw = raw.trim();
                if !raw.is_empty() {
                    folder_id = Some(raw.parse().map_err(|_| {
                        AppError::InvalidInput(format!("Invalid folderId '{}'", raw))
                    })?);
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;
    let rows = csv_import::parse_csv(&file)?;
    pool.import_test_cases(rows, folder_id, author_id).await
}

/// Collect a body stream, failing once it grows past `limit` bytes.
async fn read_limited<S, B, E>(mut stream: S, limit: usize) -> AppResult<Vec<u8>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        if data.len() + chunk.as_ref().len() > limit {
            return Err(AppError::InvalidInput(format!(
                "Import exceeds the {} byte limit",
                limit
            )));
        }
        data.extend_from_slice(chunk.as_ref());
    }
    Ok(data)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Configure test case routes. Fixed paths are registered ahead of `{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-cases")
            .route(web::get().to(list_test_cases))
            .route(web::post().to(create_test_case)),
    )
    .service(
        web::resource("/test-cases/bulk-delete").route(web::delete().to(bulk_delete_test_cases)),
    )
    .service(web::resource("/test-cases/export").route(web::get().to(export_test_cases)))
    .service(web::resource("/test-cases/import").route(web::post().to(import_test_cases)))
    .service(
        web::resource("/test-cases/{id}")
            .route(web::get().to(get_test_case))
            .route(web::put().to(update_test_case))
            .route(web::delete().to(delete_test_case)),
    );
}
