//! HTTP handlers for floor balance endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::floor_balance::{FloorBalanceQuery, FloorBalanceService};
use crate::AppState;
use shared::FloorBalance;

/// Get the on-hand quantity of a batch/count/species/variety
pub async fn get_floor_balance(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<FloorBalanceQuery>,
) -> AppResult<Json<FloorBalance>> {
    query.validate()?;
    let service = FloorBalanceService::new(state.db);
    let balance = service.floor_balance(query.into_key(company_id)).await?;
    Ok(Json(balance))
}
