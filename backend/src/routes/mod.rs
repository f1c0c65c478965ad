//! Route definitions for the shrimp processing ERP API

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/companies/:company_id", company_routes())
}

/// Routes scoped to one company
fn company_routes() -> Router<AppState> {
    Router::new()
        .nest("/grade-conversions", conversion_routes())
        .route("/floor-balance", get(handlers::get_floor_balance))
        .route("/master-data", get(handlers::get_master_data))
        .route("/species", post(handlers::create_species))
        .route("/species/:species_name", delete(handlers::delete_species))
}

/// Grade conversion routes
fn conversion_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_conversions).post(handlers::upsert_conversion),
        )
        .route("/sync", post(handlers::sync_conversions))
        .route("/orphans", get(handlers::list_orphaned_conversions))
        .route("/preview", post(handlers::preview_conversion))
}
