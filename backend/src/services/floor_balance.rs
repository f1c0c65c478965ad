//! Floor balance service: reads the stage ledgers and nets them per formula

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{
    validate_batch_number, BalanceKey, BalanceTerm, FloorBalance, TermContribution,
    VarietyTopology,
};

/// Floor balance service
#[derive(Clone)]
pub struct FloorBalanceService {
    db: PgPool,
}

/// Query parameters identifying a stock position
#[derive(Debug, Deserialize, Validate)]
pub struct FloorBalanceQuery {
    #[validate(length(min = 1, max = 50))]
    pub batch_number: String,
    #[validate(length(min = 1, max = 50))]
    pub count: String,
    #[validate(length(min = 1, max = 50))]
    pub species: String,
    #[validate(length(min = 1, max = 50))]
    pub variety: String,
}

impl FloorBalanceQuery {
    pub fn into_key(self, company_id: Uuid) -> BalanceKey {
        BalanceKey {
            company_id,
            batch_number: self.batch_number,
            count: self.count,
            species: self.species,
            variety: self.variety,
        }
    }
}

/// SQL for one term; identifiers come from the static ledger enums
fn term_sql(term: &BalanceTerm) -> String {
    let mut sql = format!(
        r#"SELECT COALESCE(SUM("{}"), 0) FROM {} WHERE company_id = $1 AND batch_number = $2 AND "{}" = $3 AND species = $4"#,
        term.quantity_column.as_str(),
        term.ledger.table(),
        term.count_column.as_str(),
    );
    if term.variety_scoped {
        sql.push_str(" AND UPPER(TRIM(variety_name)) = $5");
    }
    sql
}

async fn sum_term(
    conn: &mut PgConnection,
    term: &BalanceTerm,
    key: &BalanceKey,
) -> AppResult<Decimal> {
    let sql = term_sql(term);
    let mut query = sqlx::query_scalar::<_, Decimal>(&sql)
        .bind(key.company_id)
        .bind(&key.batch_number)
        .bind(&key.count)
        .bind(&key.species);
    if term.variety_scoped {
        query = query.bind(key.normalized_variety());
    }

    let amount = query.fetch_one(&mut *conn).await?;
    tracing::trace!("{} term {} = {}", term.ledger, term.quantity_column.as_str(), amount);
    Ok(amount)
}

impl FloorBalanceService {
    /// Create a new FloorBalanceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// On-hand quantity for one batch/count/species/variety
    pub async fn floor_balance(&self, key: BalanceKey) -> AppResult<FloorBalance> {
        validate_batch_number(&key.batch_number).map_err(|message| AppError::Validation {
            field: "batch_number".to_string(),
            message: message.to_string(),
        })?;

        let topology = VarietyTopology::for_variety(&key.variety);

        // All terms read from one snapshot
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut contributions = Vec::with_capacity(topology.formula().len());
        for term in topology.formula() {
            let amount = sum_term(&mut *tx, term, &key).await?;
            contributions.push(TermContribution {
                term: *term,
                amount,
            });
        }
        tx.commit().await?;

        let balance = FloorBalance::settle(topology, contributions)?;
        if balance.clamped {
            tracing::debug!(
                "Floor balance clamped to zero: company {}, batch {}, count {}, species {}, variety {}, raw {}",
                key.company_id,
                key.batch_number,
                key.count,
                key.species,
                key.variety,
                balance.raw_balance
            );
        }

        Ok(balance)
    }
}
