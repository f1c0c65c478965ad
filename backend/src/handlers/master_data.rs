//! HTTP handlers for master data endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::master_data::{CreateSpeciesInput, MasterDataService, SpeciesChange};
use crate::services::ConversionService;
use crate::AppState;
use shared::MasterDataSnapshot;

fn master_data_service(state: AppState) -> MasterDataService {
    let conversions = ConversionService::new(state.db.clone(), state.grade_order);
    MasterDataService::new(state.db, conversions)
}

/// Get the master lists for a company
pub async fn get_master_data(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<MasterDataSnapshot>> {
    let service = master_data_service(state);
    let snapshot = service.snapshot(company_id).await?;
    Ok(Json(snapshot))
}

/// Create a species and resync conversions
pub async fn create_species(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<CreateSpeciesInput>,
) -> AppResult<Json<SpeciesChange>> {
    let service = master_data_service(state);
    let change = service.create_species(company_id, input).await?;
    Ok(Json(change))
}

/// Delete a species and resync conversions
pub async fn delete_species(
    State(state): State<AppState>,
    Path((company_id, species_name)): Path<(Uuid, String)>,
) -> AppResult<Json<SpeciesChange>> {
    let service = master_data_service(state);
    let change = service.delete_species(company_id, species_name).await?;
    Ok(Json(change))
}
