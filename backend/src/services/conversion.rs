//! Grade conversion service: maintains the cached grade_conversions table

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::master_data::{find_variety, load_snapshot};
use shared::{
    compute_conversion, find_orphans, plan_sync, ConversionKey, ConversionOutcome, GradeConversion,
    GradeOrder, PlannedConversion,
};

/// Grade conversion service for computing and caching HLSO/HOSO counts
#[derive(Clone)]
pub struct ConversionService {
    db: PgPool,
    grade_order: Arc<GradeOrder>,
}

/// Database row for a cached conversion
#[derive(Debug, sqlx::FromRow)]
struct ConversionRow {
    id: Uuid,
    company_id: Uuid,
    species: String,
    grade_name: String,
    variety_name: String,
    glaze_name: String,
    hlso_count: i32,
    hoso_count: i32,
    nw_grade: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversionRow> for GradeConversion {
    fn from(row: ConversionRow) -> Self {
        GradeConversion {
            id: row.id,
            company_id: row.company_id,
            species: row.species,
            grade_name: row.grade_name,
            variety_name: row.variety_name,
            glaze_name: row.glaze_name,
            hlso_count: row.hlso_count,
            hoso_count: row.hoso_count,
            nw_grade: row.nw_grade,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input identifying one species/grade/variety/glaze combination
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConversionInput {
    #[validate(length(min = 1, max = 50))]
    pub species: String,
    #[validate(length(min = 1, max = 50))]
    pub grade_name: String,
    #[validate(length(min = 1, max = 50))]
    pub variety_name: String,
    #[validate(length(min = 1, max = 50))]
    pub glaze_name: String,
}

impl ConversionInput {
    fn key(&self) -> ConversionKey {
        ConversionKey::new(
            self.species.trim(),
            self.grade_name.trim(),
            self.variety_name.trim(),
            self.glaze_name.trim(),
        )
    }
}

/// Computed conversion that was not persisted
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPreview {
    #[serde(flatten)]
    pub key: ConversionKey,
    #[serde(flatten)]
    pub outcome: ConversionOutcome,
}

/// Outcome of a resync pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub inserted: usize,
    pub skipped: usize,
    /// Cached rows whose master entries no longer exist
    pub orphaned: usize,
}

const CONVERSION_COLUMNS: &str = "id, company_id, species, grade_name, variety_name, glaze_name, \
     hlso_count, hoso_count, nw_grade, created_at, updated_at";

impl ConversionService {
    /// Create a new ConversionService instance
    pub fn new(db: PgPool, grade_order: Arc<GradeOrder>) -> Self {
        Self { db, grade_order }
    }

    /// Compute one combination without touching the cache
    pub async fn preview(
        &self,
        company_id: Uuid,
        input: ConversionInput,
    ) -> AppResult<ConversionPreview> {
        input.validate()?;
        let key = input.key();

        let mut conn = self.db.acquire().await?;
        let variety = find_variety(&mut conn, company_id, &key.variety_name).await?;
        let outcome = compute_conversion(
            &key.grade_name,
            &key.glaze_name,
            variety.as_ref(),
            &self.grade_order,
        )?;

        Ok(ConversionPreview { key, outcome })
    }

    /// Compute one combination and insert it, or overwrite the derived
    /// fields of the existing row
    pub async fn upsert_one(
        &self,
        company_id: Uuid,
        input: ConversionInput,
    ) -> AppResult<GradeConversion> {
        input.validate()?;
        let key = input.key();

        let mut conn = self.db.acquire().await?;
        let variety = find_variety(&mut conn, company_id, &key.variety_name).await?;
        if variety.is_none() {
            tracing::debug!(
                "Variety {} not in master data for company {}; using 100% yields",
                key.variety_name,
                company_id
            );
        }

        let outcome = compute_conversion(
            &key.grade_name,
            &key.glaze_name,
            variety.as_ref(),
            &self.grade_order,
        )?;
        warn_if_unresolved(company_id, &key, &outcome);

        let row = sqlx::query_as::<_, ConversionRow>(&format!(
            r#"
            INSERT INTO grade_conversions (
                company_id, species, grade_name, variety_name, glaze_name,
                hlso_count, hoso_count, nw_grade
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (company_id, species, grade_name, variety_name, glaze_name)
            DO UPDATE SET hlso_count = EXCLUDED.hlso_count,
                          hoso_count = EXCLUDED.hoso_count,
                          nw_grade = EXCLUDED.nw_grade,
                          updated_at = NOW()
            RETURNING {}
            "#,
            CONVERSION_COLUMNS
        ))
        .bind(company_id)
        .bind(&key.species)
        .bind(&key.grade_name)
        .bind(&key.variety_name)
        .bind(&key.glaze_name)
        .bind(outcome.hlso_count)
        .bind(outcome.hoso_count)
        .bind(&outcome.nw_grade)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row.into())
    }

    /// Generate every missing species × grade × variety × glaze combination
    /// in one transaction
    pub async fn sync_all(&self, company_id: Uuid) -> AppResult<SyncReport> {
        let mut tx = self.db.begin().await?;
        let report = self.sync_all_in(&mut *tx, company_id).await?;
        tx.commit().await?;
        Ok(report)
    }

    /// Resync inside the caller's transaction
    pub(crate) async fn sync_all_in(
        &self,
        conn: &mut PgConnection,
        company_id: Uuid,
    ) -> AppResult<SyncReport> {
        let master = load_snapshot(&mut *conn, company_id).await?;
        let existing = cached_keys(&mut *conn, company_id).await?;

        let plan = plan_sync(&master, &existing, &self.grade_order)?;
        for planned in &plan.to_insert {
            warn_if_unresolved(company_id, &planned.key, &planned.outcome);
            insert_planned(&mut *conn, company_id, planned).await?;
        }

        let orphaned = find_orphans(&master, &existing).len();
        if orphaned > 0 {
            tracing::warn!(
                "Company {} has {} cached grade conversions without matching master data",
                company_id,
                orphaned
            );
        }

        tracing::info!(
            "Grade conversion sync for company {}: {} inserted, {} skipped",
            company_id,
            plan.to_insert.len(),
            plan.skipped
        );

        Ok(SyncReport {
            inserted: plan.to_insert.len(),
            skipped: plan.skipped,
            orphaned,
        })
    }

    /// List cached conversions for a company
    pub async fn list_conversions(&self, company_id: Uuid) -> AppResult<Vec<GradeConversion>> {
        let rows = sqlx::query_as::<_, ConversionRow>(&format!(
            r#"
            SELECT {}
            FROM grade_conversions
            WHERE company_id = $1
            ORDER BY species, grade_name, variety_name, glaze_name
            "#,
            CONVERSION_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Cached conversions left behind by deleted master entries
    pub async fn orphaned_conversions(&self, company_id: Uuid) -> AppResult<Vec<ConversionKey>> {
        let mut conn = self.db.acquire().await?;
        let master = load_snapshot(&mut conn, company_id).await?;
        let existing = cached_keys(&mut conn, company_id).await?;

        Ok(find_orphans(&master, &existing))
    }
}

fn warn_if_unresolved(company_id: Uuid, key: &ConversionKey, outcome: &ConversionOutcome) {
    if !outcome.nw_grade_resolved {
        tracing::warn!(
            "Grade {} is not in the grade order (company {}, species {}); nw_grade left unchanged",
            key.grade_name,
            company_id,
            key.species
        );
    }
}

async fn cached_keys(
    conn: &mut PgConnection,
    company_id: Uuid,
) -> AppResult<HashSet<ConversionKey>> {
    let rows = sqlx::query_as::<_, (String, String, String, String)>(
        r#"
        SELECT species, grade_name, variety_name, glaze_name
        FROM grade_conversions
        WHERE company_id = $1
        "#,
    )
    .bind(company_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(species, grade, variety, glaze)| ConversionKey::new(species, grade, variety, glaze))
        .collect())
}

async fn insert_planned(
    conn: &mut PgConnection,
    company_id: Uuid,
    planned: &PlannedConversion,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO grade_conversions (
            company_id, species, grade_name, variety_name, glaze_name,
            hlso_count, hoso_count, nw_grade
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (company_id, species, grade_name, variety_name, glaze_name) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind(&planned.key.species)
    .bind(&planned.key.grade_name)
    .bind(&planned.key.variety_name)
    .bind(&planned.key.glaze_name)
    .bind(planned.outcome.hlso_count)
    .bind(planned.outcome.hoso_count)
    .bind(&planned.outcome.nw_grade)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
