//! HTTP handlers for grade conversion endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::conversion::{
    ConversionInput, ConversionPreview, ConversionService, SyncReport,
};
use crate::AppState;
use shared::{ConversionKey, GradeConversion};

fn conversion_service(state: AppState) -> ConversionService {
    ConversionService::new(state.db, state.grade_order)
}

/// List cached conversions for a company
pub async fn list_conversions(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<GradeConversion>>> {
    let service = conversion_service(state);
    let conversions = service.list_conversions(company_id).await?;
    Ok(Json(conversions))
}

/// Compute and store one conversion
pub async fn upsert_conversion(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<ConversionInput>,
) -> AppResult<Json<GradeConversion>> {
    let service = conversion_service(state);
    let conversion = service.upsert_one(company_id, input).await?;
    Ok(Json(conversion))
}

/// Compute one conversion without storing it
pub async fn preview_conversion(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<ConversionInput>,
) -> AppResult<Json<ConversionPreview>> {
    let service = conversion_service(state);
    let preview = service.preview(company_id, input).await?;
    Ok(Json(preview))
}

/// Generate all missing conversions
pub async fn sync_conversions(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<SyncReport>> {
    let service = conversion_service(state);
    let report = service.sync_all(company_id).await?;
    Ok(Json(report))
}

/// Cached conversions whose master entries were deleted
pub async fn list_orphaned_conversions(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<ConversionKey>>> {
    let service = conversion_service(state);
    let orphans = service.orphaned_conversions(company_id).await?;
    Ok(Json(orphans))
}
