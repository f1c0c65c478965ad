//! Processing-stage ledgers read by the floor balance calculator
//!
//! The five ledgers are append-only transaction tables owned by the stage
//! screens (gate entry, grading, de-heading, peeling, soaking). This module
//! only describes them: table and column identifiers for the SQL reader and
//! typed rows for the in-memory [`LedgerBook`](super::LedgerBook).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A processing-stage ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ledger {
    RawMaterial,
    Grading,
    DeHeading,
    Peeling,
    Soaking,
}

impl Ledger {
    pub fn table(&self) -> &'static str {
        match self {
            Ledger::RawMaterial => "raw_material_receipts",
            Ledger::Grading => "grading_entries",
            Ledger::DeHeading => "deheading_entries",
            Ledger::Peeling => "peeling_entries",
            Ledger::Soaking => "soaking_entries",
        }
    }

    /// Whether rows carry a `variety_name` column
    pub fn has_variety(&self) -> bool {
        matches!(self, Ledger::Grading | Ledger::Peeling | Ledger::Soaking)
    }
}

impl std::fmt::Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ledger::RawMaterial => write!(f, "Raw Material"),
            Ledger::Grading => write!(f, "Grading"),
            Ledger::DeHeading => write!(f, "De-heading"),
            Ledger::Peeling => write!(f, "Peeling"),
            Ledger::Soaking => write!(f, "Soaking"),
        }
    }
}

/// Count/grade columns across the ledgers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountColumn {
    /// Raw material receipt count
    Count,
    /// Source count consumed by grading or de-heading
    HosoCount,
    /// Output count of grading
    GradedCount,
    /// Output count of de-heading, input count of peeling
    HlsoCount,
    /// Input count of soaking
    InCount,
}

impl CountColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountColumn::Count => "count",
            CountColumn::HosoCount => "hoso_count",
            CountColumn::GradedCount => "graded_count",
            CountColumn::HlsoCount => "hlso_count",
            CountColumn::InCount => "in_count",
        }
    }
}

/// Quantity columns across the ledgers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityColumn {
    ReceivedQty,
    GradedQty,
    HosoQty,
    HlsoQty,
    PeeledQty,
    InQty,
    RejectedQty,
}

impl QuantityColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityColumn::ReceivedQty => "received_qty",
            QuantityColumn::GradedQty => "graded_qty",
            QuantityColumn::HosoQty => "hoso_qty",
            QuantityColumn::HlsoQty => "hlso_qty",
            QuantityColumn::PeeledQty => "peeled_qty",
            QuantityColumn::InQty => "in_qty",
            QuantityColumn::RejectedQty => "rejected_qty",
        }
    }
}

/// Gate entry of raw (HOSO) material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialReceipt {
    pub id: Uuid,
    pub company_id: Uuid,
    pub batch_number: String,
    pub count: String,
    pub species: String,
    pub received_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// HOSO material graded from one count into another, possibly another variety
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub batch_number: String,
    pub hoso_count: String,
    pub graded_count: String,
    pub species: String,
    pub variety_name: String,
    pub graded_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// HOSO material de-headed into HLSO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeHeadingEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub batch_number: String,
    pub hoso_count: String,
    pub hlso_count: String,
    pub species: String,
    pub hoso_qty: Decimal,
    pub hlso_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// HLSO material peeled into a peeled variety (PD, PDTO, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeelingEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub batch_number: String,
    pub hlso_count: String,
    pub species: String,
    pub variety_name: String,
    pub hlso_qty: Decimal,
    pub peeled_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Material sent to soaking; rejected quantity returns to the floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoakingEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub batch_number: String,
    pub in_count: String,
    pub species: String,
    pub variety_name: String,
    pub in_qty: Decimal,
    pub rejected_qty: Decimal,
    pub soaked_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Uniform access to ledger rows for in-memory summation
pub trait LedgerRow {
    fn company_id(&self) -> Uuid;
    fn batch_number(&self) -> &str;
    fn species(&self) -> &str;
    fn variety_name(&self) -> Option<&str>;
    fn count(&self, column: CountColumn) -> Option<&str>;
    fn quantity(&self, column: QuantityColumn) -> Option<Decimal>;
}

impl LedgerRow for RawMaterialReceipt {
    fn company_id(&self) -> Uuid {
        self.company_id
    }
    fn batch_number(&self) -> &str {
        &self.batch_number
    }
    fn species(&self) -> &str {
        &self.species
    }
    fn variety_name(&self) -> Option<&str> {
        None
    }
    fn count(&self, column: CountColumn) -> Option<&str> {
        match column {
            CountColumn::Count => Some(&self.count),
            _ => None,
        }
    }
    fn quantity(&self, column: QuantityColumn) -> Option<Decimal> {
        match column {
            QuantityColumn::ReceivedQty => Some(self.received_qty),
            _ => None,
        }
    }
}

impl LedgerRow for GradingEntry {
    fn company_id(&self) -> Uuid {
        self.company_id
    }
    fn batch_number(&self) -> &str {
        &self.batch_number
    }
    fn species(&self) -> &str {
        &self.species
    }
    fn variety_name(&self) -> Option<&str> {
        Some(&self.variety_name)
    }
    fn count(&self, column: CountColumn) -> Option<&str> {
        match column {
            CountColumn::HosoCount => Some(&self.hoso_count),
            CountColumn::GradedCount => Some(&self.graded_count),
            _ => None,
        }
    }
    fn quantity(&self, column: QuantityColumn) -> Option<Decimal> {
        match column {
            QuantityColumn::GradedQty => Some(self.graded_qty),
            _ => None,
        }
    }
}

impl LedgerRow for DeHeadingEntry {
    fn company_id(&self) -> Uuid {
        self.company_id
    }
    fn batch_number(&self) -> &str {
        &self.batch_number
    }
    fn species(&self) -> &str {
        &self.species
    }
    fn variety_name(&self) -> Option<&str> {
        None
    }
    fn count(&self, column: CountColumn) -> Option<&str> {
        match column {
            CountColumn::HosoCount => Some(&self.hoso_count),
            CountColumn::HlsoCount => Some(&self.hlso_count),
            _ => None,
        }
    }
    fn quantity(&self, column: QuantityColumn) -> Option<Decimal> {
        match column {
            QuantityColumn::HosoQty => Some(self.hoso_qty),
            QuantityColumn::HlsoQty => Some(self.hlso_qty),
            _ => None,
        }
    }
}

impl LedgerRow for PeelingEntry {
    fn company_id(&self) -> Uuid {
        self.company_id
    }
    fn batch_number(&self) -> &str {
        &self.batch_number
    }
    fn species(&self) -> &str {
        &self.species
    }
    fn variety_name(&self) -> Option<&str> {
        Some(&self.variety_name)
    }
    fn count(&self, column: CountColumn) -> Option<&str> {
        match column {
            CountColumn::HlsoCount => Some(&self.hlso_count),
            _ => None,
        }
    }
    fn quantity(&self, column: QuantityColumn) -> Option<Decimal> {
        match column {
            QuantityColumn::HlsoQty => Some(self.hlso_qty),
            QuantityColumn::PeeledQty => Some(self.peeled_qty),
            _ => None,
        }
    }
}

impl LedgerRow for SoakingEntry {
    fn company_id(&self) -> Uuid {
        self.company_id
    }
    fn batch_number(&self) -> &str {
        &self.batch_number
    }
    fn species(&self) -> &str {
        &self.species
    }
    fn variety_name(&self) -> Option<&str> {
        Some(&self.variety_name)
    }
    fn count(&self, column: CountColumn) -> Option<&str> {
        match column {
            CountColumn::InCount => Some(&self.in_count),
            _ => None,
        }
    }
    fn quantity(&self, column: QuantityColumn) -> Option<Decimal> {
        match column {
            QuantityColumn::InQty => Some(self.in_qty),
            QuantityColumn::RejectedQty => Some(self.rejected_qty),
            _ => None,
        }
    }
}
