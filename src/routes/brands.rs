//! Brand API routes
//!
//! - GET    /brands          - list brand names
//! - POST   /brands          - create a brand from JSON
//! - GET    /brands/:name    - fetch one brand
//! - PUT    /brands/:name    - replace a brand's details
//! - POST   /brands/upload   - create or update a brand from an uploaded PDF
//! - DELETE /brands/:name    - delete a brand

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::{with_deadline, Brand, CreateBrand, UpdateBrand};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Multipart field carrying the brand name
const BRAND_NAME_FIELD: &str = "brandName";
/// Multipart field carrying the PDF
const PDF_FILE_FIELD: &str = "pdfFile";

/// Create the brands router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route(
            "/upload",
            post(upload_brand_pdf).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/:name", get(get_brand).put(update_brand).delete(delete_brand))
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// List all brand names
async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let names = with_deadline(state.db_timeout(), state.store().list_names()).await?;
    Ok(Json(names))
}

/// Get details for a specific brand
async fn get_brand(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Brand>> {
    let brand = with_deadline(state.db_timeout(), state.store().get_by_name(&name))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Brand '{}' not found", name)))?;
    Ok(Json(brand))
}

/// Create a brand from a JSON payload
async fn create_brand(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateBrand>, JsonRejection>,
) -> Result<(StatusCode, Json<Brand>)> {
    let Json(payload) = payload.map_err(invalid_json)?;
    let name = required_name(payload.name, "name")?;
    let details = payload
        .details
        .ok_or_else(|| AppError::BadRequest("Invalid input: 'details' is required".to_string()))?;

    let brand = with_deadline(state.db_timeout(), state.store().create(&name, &details)).await?;
    tracing::info!(brand = %brand.name, "Brand created");

    Ok((StatusCode::CREATED, Json(brand)))
}

/// Replace the details of an existing brand
async fn update_brand(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<UpdateBrand>, JsonRejection>,
) -> Result<Json<Brand>> {
    let Json(payload) = payload.map_err(invalid_json)?;
    let details = payload
        .details
        .ok_or_else(|| AppError::BadRequest("Invalid input: 'details' is required".to_string()))?;

    let brand = with_deadline(state.db_timeout(), state.store().update_details(&name, &details))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Brand '{}' not found for update", name)))?;
    tracing::info!(brand = %brand.name, "Brand details updated");

    Ok(Json(brand))
}

/// Delete a brand
async fn delete_brand(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>> {
    let deleted = with_deadline(state.db_timeout(), state.store().delete(&name)).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Brand '{}' not found", name)));
    }
    tracing::info!(brand = %name, "Brand deleted");

    Ok(Json(MessageResponse {
        message: format!("Brand '{}' deleted successfully", name),
    }))
}

/// Create or update a brand from an uploaded PDF.
///
/// Responds 201 when the brand was created and 200 when it already existed.
async fn upload_brand_pdf(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Brand>)> {
    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Expected a multipart form upload: {}", e.body_text()))
    })?;

    let mut brand_name = None;
    let mut pdf_data = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some(BRAND_NAME_FIELD) => {
                brand_name = Some(field.text().await.map_err(invalid_upload)?);
            }
            Some(PDF_FILE_FIELD) => {
                tracing::debug!(
                    file_name = ?field.file_name(),
                    content_type = ?field.content_type(),
                    "Receiving PDF upload"
                );
                pdf_data = Some(field.bytes().await.map_err(invalid_upload)?);
            }
            _ => {}
        }
    }

    let name = required_name(brand_name, BRAND_NAME_FIELD)?;
    let pdf_data = pdf_data.filter(|data| !data.is_empty()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Missing '{}' form field or empty file upload",
            PDF_FILE_FIELD
        ))
    })?;

    let work = async {
        let text = state.extractor().extract(&pdf_data).await?;
        if text.is_empty() {
            tracing::warn!(brand = %name, "No text extracted from PDF; storing empty details");
        }
        let upserted = state.store().upsert_details(&name, &text).await?;
        Ok::<_, AppError>(upserted)
    };

    let upserted = tokio::time::timeout(state.upload_timeout(), work)
        .await
        .map_err(|_| AppError::Timeout("PDF upload"))??;

    let bytes = upserted.brand.details.len();
    let status = if upserted.created {
        tracing::info!(brand = %name, bytes, "Brand created from PDF");
        StatusCode::CREATED
    } else {
        tracing::info!(brand = %name, bytes, "Brand details updated from PDF");
        StatusCode::OK
    };

    Ok((status, Json(upserted.brand)))
}

/// Names must be present and not blank; they are stored exactly as sent.
fn required_name(name: Option<String>, field: &str) -> Result<String> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(AppError::BadRequest(format!("Invalid input: '{}' is required", field))),
    }
}

fn invalid_json(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(format!("Invalid input: {}", rejection.body_text()))
}

fn invalid_upload(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid file upload: {}", err.body_text()))
}
