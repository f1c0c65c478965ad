//! Master data service: species, grades, varieties and glazes per company
//!
//! Species changes resync the grade conversion cache in the same transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::conversion::{ConversionService, SyncReport};
use shared::{validate_master_name, MasterDataSnapshot, Variety};

/// Master data service
#[derive(Clone)]
pub struct MasterDataService {
    db: PgPool,
    conversions: ConversionService,
}

#[derive(Debug, sqlx::FromRow)]
struct VarietyRow {
    variety_name: String,
    peeling_yield: Option<Decimal>,
    soaking_yield: Option<Decimal>,
}

impl From<VarietyRow> for Variety {
    fn from(row: VarietyRow) -> Self {
        Variety::new(row.variety_name).with_yields(row.peeling_yield, row.soaking_yield)
    }
}

/// Input for creating a species
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpeciesInput {
    #[validate(length(min = 1, max = 50))]
    pub species_name: String,
}

/// Result of a species change with the resync it triggered
#[derive(Debug, Serialize)]
pub struct SpeciesChange {
    pub species_name: String,
    pub sync: SyncReport,
}

/// Read the company's master lists
pub(crate) async fn load_snapshot(
    conn: &mut PgConnection,
    company_id: Uuid,
) -> AppResult<MasterDataSnapshot> {
    let species = names(
        &mut *conn,
        "SELECT species_name FROM species WHERE company_id = $1 ORDER BY species_name",
        company_id,
    )
    .await?;
    let grades = names(
        &mut *conn,
        "SELECT grade_name FROM grades WHERE company_id = $1 ORDER BY grade_name",
        company_id,
    )
    .await?;
    let glazes = names(
        &mut *conn,
        "SELECT glaze_name FROM glazes WHERE company_id = $1 ORDER BY glaze_name",
        company_id,
    )
    .await?;

    let varieties = sqlx::query_as::<_, VarietyRow>(
        r#"
        SELECT variety_name, peeling_yield, soaking_yield
        FROM varieties
        WHERE company_id = $1
        ORDER BY variety_name
        "#,
    )
    .bind(company_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(MasterDataSnapshot {
        species,
        grades,
        varieties: varieties.into_iter().map(Into::into).collect(),
        glazes,
    })
}

/// Look up one variety record; `None` when it is not in the master list
pub(crate) async fn find_variety(
    conn: &mut PgConnection,
    company_id: Uuid,
    variety_name: &str,
) -> AppResult<Option<Variety>> {
    let row = sqlx::query_as::<_, VarietyRow>(
        r#"
        SELECT variety_name, peeling_yield, soaking_yield
        FROM varieties
        WHERE company_id = $1 AND variety_name = $2
        "#,
    )
    .bind(company_id)
    .bind(variety_name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Into::into))
}

async fn names(conn: &mut PgConnection, sql: &str, company_id: Uuid) -> AppResult<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(sql)
        .bind(company_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

impl MasterDataService {
    /// Create a new MasterDataService instance
    pub fn new(db: PgPool, conversions: ConversionService) -> Self {
        Self { db, conversions }
    }

    /// Current master lists for a company
    pub async fn snapshot(&self, company_id: Uuid) -> AppResult<MasterDataSnapshot> {
        let mut conn = self.db.acquire().await?;
        load_snapshot(&mut conn, company_id).await
    }

    /// Add a species and generate its conversions
    pub async fn create_species(
        &self,
        company_id: Uuid,
        input: CreateSpeciesInput,
    ) -> AppResult<SpeciesChange> {
        input.validate()?;
        validate_master_name(&input.species_name).map_err(|message| AppError::Validation {
            field: "species_name".to_string(),
            message: message.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO species (company_id, species_name)
            VALUES ($1, $2)
            ON CONFLICT (company_id, species_name) DO NOTHING
            "#,
        )
        .bind(company_id)
        .bind(&input.species_name)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::DuplicateEntry("species_name".to_string()));
        }

        let sync = self.conversions.sync_all_in(&mut *tx, company_id).await?;
        tx.commit().await?;

        tracing::info!(
            "Species {} created for company {}",
            input.species_name,
            company_id
        );

        Ok(SpeciesChange {
            species_name: input.species_name,
            sync,
        })
    }

    /// Remove a species; its cached conversions remain as orphans
    pub async fn delete_species(
        &self,
        company_id: Uuid,
        species_name: String,
    ) -> AppResult<SpeciesChange> {
        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query("DELETE FROM species WHERE company_id = $1 AND species_name = $2")
            .bind(company_id)
            .bind(&species_name)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Species".to_string()));
        }

        let sync = self.conversions.sync_all_in(&mut *tx, company_id).await?;
        tx.commit().await?;

        tracing::info!("Species {} deleted for company {}", species_name, company_id);

        Ok(SpeciesChange { species_name, sync })
    }
}
