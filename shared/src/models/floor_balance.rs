//! Floor balance: on-hand quantity netted from the stage ledgers
//!
//! Each variety topology is a formula, an ordered list of signed ledger
//! slices. Every slice is an independent `SUM` over one ledger filtered by
//! company, batch, one count column, species and (for variety-scoped slices)
//! the queried variety. The same formulas drive the SQL reader in the backend
//! and the in-memory [`LedgerBook`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::ledger::{
    CountColumn, DeHeadingEntry, GradingEntry, Ledger, LedgerRow, PeelingEntry, QuantityColumn,
    RawMaterialReceipt, SoakingEntry,
};

/// Identity whose floor balance is requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceKey {
    pub company_id: Uuid,
    pub batch_number: String,
    pub count: String,
    pub species: String,
    pub variety: String,
}

impl BalanceKey {
    /// Variety as matched against the ledgers
    pub fn normalized_variety(&self) -> String {
        normalize_variety(&self.variety)
    }
}

pub fn normalize_variety(variety: &str) -> String {
    variety.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn apply(&self, amount: Decimal) -> Decimal {
        match self {
            Sign::Plus => amount,
            Sign::Minus => -amount,
        }
    }
}

/// One signed ledger slice of a balance formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceTerm {
    pub ledger: Ledger,
    pub count_column: CountColumn,
    pub quantity_column: QuantityColumn,
    /// Restrict rows to the queried variety
    pub variety_scoped: bool,
    pub sign: Sign,
}

const fn term(
    sign: Sign,
    ledger: Ledger,
    quantity_column: QuantityColumn,
    count_column: CountColumn,
    variety_scoped: bool,
) -> BalanceTerm {
    BalanceTerm {
        ledger,
        count_column,
        quantity_column,
        variety_scoped,
        sign,
    }
}

const HOSO_FORMULA: &[BalanceTerm] = &[
    term(Sign::Plus, Ledger::RawMaterial, QuantityColumn::ReceivedQty, CountColumn::Count, false),
    term(Sign::Plus, Ledger::Grading, QuantityColumn::GradedQty, CountColumn::GradedCount, true),
    term(Sign::Minus, Ledger::Grading, QuantityColumn::GradedQty, CountColumn::HosoCount, false),
    term(Sign::Minus, Ledger::DeHeading, QuantityColumn::HosoQty, CountColumn::HosoCount, false),
    term(Sign::Minus, Ledger::Soaking, QuantityColumn::InQty, CountColumn::InCount, true),
    term(Sign::Plus, Ledger::Soaking, QuantityColumn::RejectedQty, CountColumn::InCount, true),
];

const HLSO_FORMULA: &[BalanceTerm] = &[
    term(Sign::Plus, Ledger::Grading, QuantityColumn::GradedQty, CountColumn::GradedCount, true),
    term(Sign::Minus, Ledger::Peeling, QuantityColumn::HlsoQty, CountColumn::HlsoCount, false),
    term(Sign::Minus, Ledger::Soaking, QuantityColumn::InQty, CountColumn::InCount, true),
    term(Sign::Plus, Ledger::Soaking, QuantityColumn::RejectedQty, CountColumn::InCount, true),
];

const PEELED_FORMULA: &[BalanceTerm] = &[
    term(Sign::Plus, Ledger::Peeling, QuantityColumn::PeeledQty, CountColumn::HlsoCount, true),
    term(Sign::Minus, Ledger::Soaking, QuantityColumn::InQty, CountColumn::InCount, true),
    term(Sign::Plus, Ledger::Soaking, QuantityColumn::RejectedQty, CountColumn::InCount, true),
];

/// Which stages a variety passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarietyTopology {
    /// Raw material; graded, de-headed and soaked
    Hoso,
    /// Produced by grading; peeled and soaked
    Hlso,
    /// Produced by peeling (PD, PDTO, ...); soaked
    Peeled,
}

impl VarietyTopology {
    pub fn for_variety(variety: &str) -> Self {
        match normalize_variety(variety).as_str() {
            "HOSO" => VarietyTopology::Hoso,
            "HLSO" => VarietyTopology::Hlso,
            _ => VarietyTopology::Peeled,
        }
    }

    pub fn formula(&self) -> &'static [BalanceTerm] {
        match self {
            VarietyTopology::Hoso => HOSO_FORMULA,
            VarietyTopology::Hlso => HLSO_FORMULA,
            VarietyTopology::Peeled => PEELED_FORMULA,
        }
    }
}

/// Summed amount of one term, before its sign is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermContribution {
    pub term: BalanceTerm,
    pub amount: Decimal,
}

/// A ledger total that no longer fits a decimal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Floor balance overflowed while summing the {ledger} ledger")]
pub struct BalanceOverflow {
    pub ledger: Ledger,
}

/// Computed floor balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorBalance {
    /// On-hand quantity, never negative
    pub quantity: Decimal,
    /// Netted sum before clamping, rounded
    pub raw_balance: Decimal,
    /// True when the unrounded netted sum was negative and `quantity` was
    /// floored to zero
    pub clamped: bool,
    pub topology: VarietyTopology,
    pub contributions: Vec<TermContribution>,
}

pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

impl FloorBalance {
    /// Net the term sums and clamp the result at zero
    pub fn settle(
        topology: VarietyTopology,
        contributions: Vec<TermContribution>,
    ) -> Result<Self, BalanceOverflow> {
        let mut raw = Decimal::ZERO;
        for c in &contributions {
            raw = raw
                .checked_add(c.term.sign.apply(c.amount))
                .ok_or(BalanceOverflow {
                    ledger: c.term.ledger,
                })?;
        }

        let clamped = raw < Decimal::ZERO;
        let raw_balance = match round_quantity(raw) {
            rounded if rounded.is_zero() => Decimal::ZERO,
            rounded => rounded,
        };

        Ok(Self {
            quantity: if clamped { Decimal::ZERO } else { raw_balance },
            raw_balance,
            clamped,
            topology,
            contributions,
        })
    }
}

/// In-memory copy of the five ledgers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerBook {
    #[serde(default)]
    pub raw_material: Vec<RawMaterialReceipt>,
    #[serde(default)]
    pub grading: Vec<GradingEntry>,
    #[serde(default)]
    pub deheading: Vec<DeHeadingEntry>,
    #[serde(default)]
    pub peeling: Vec<PeelingEntry>,
    #[serde(default)]
    pub soaking: Vec<SoakingEntry>,
}

fn sum_rows<R: LedgerRow>(
    rows: &[R],
    term: &BalanceTerm,
    key: &BalanceKey,
    variety: &str,
) -> Result<Decimal, BalanceOverflow> {
    rows.iter()
        .filter(|row| {
            row.company_id() == key.company_id
                && row.batch_number() == key.batch_number
                && row.species() == key.species
                && row.count(term.count_column) == Some(key.count.as_str())
                && (!term.variety_scoped
                    || row.variety_name().map(normalize_variety).as_deref() == Some(variety))
        })
        .filter_map(|row| row.quantity(term.quantity_column))
        .try_fold(Decimal::ZERO, |total, qty| {
            total.checked_add(qty).ok_or(BalanceOverflow {
                ledger: term.ledger,
            })
        })
}

impl LedgerBook {
    /// `COALESCE(SUM(..), 0)` of one term
    pub fn sum(&self, term: &BalanceTerm, key: &BalanceKey) -> Result<Decimal, BalanceOverflow> {
        let variety = key.normalized_variety();
        match term.ledger {
            Ledger::RawMaterial => sum_rows(&self.raw_material, term, key, &variety),
            Ledger::Grading => sum_rows(&self.grading, term, key, &variety),
            Ledger::DeHeading => sum_rows(&self.deheading, term, key, &variety),
            Ledger::Peeling => sum_rows(&self.peeling, term, key, &variety),
            Ledger::Soaking => sum_rows(&self.soaking, term, key, &variety),
        }
    }

    pub fn floor_balance(&self, key: &BalanceKey) -> Result<FloorBalance, BalanceOverflow> {
        let topology = VarietyTopology::for_variety(&key.variety);
        let contributions = topology
            .formula()
            .iter()
            .map(|term| {
                Ok(TermContribution {
                    term: *term,
                    amount: self.sum(term, key)?,
                })
            })
            .collect::<Result<Vec<_>, BalanceOverflow>>()?;
        FloorBalance::settle(topology, contributions)
    }
}
