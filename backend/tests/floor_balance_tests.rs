//! Floor balance tests
//!
//! Tests for on-hand stock across the stage ledgers including:
//! - HOSO, HLSO and peeled variety formulas
//! - Stage isolation between de-heading and HLSO stock
//! - Clamping of over-consumed positions

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    BalanceKey, BalanceOverflow, DeHeadingEntry, GradingEntry, Ledger, LedgerBook, PeelingEntry,
    RawMaterialReceipt, SoakingEntry, VarietyTopology,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const BATCH: &str = "B-2024-001";
const SPECIES: &str = "VANNAMEI";

fn company() -> Uuid {
    Uuid::from_u128(0x6f9619ff_8b86_d011_b42d_00c04fc964ff)
}

fn key(count: &str, variety: &str) -> BalanceKey {
    BalanceKey {
        company_id: company(),
        batch_number: BATCH.to_string(),
        count: count.to_string(),
        species: SPECIES.to_string(),
        variety: variety.to_string(),
    }
}

fn receipt(count: &str, qty: &str) -> RawMaterialReceipt {
    RawMaterialReceipt {
        id: Uuid::new_v4(),
        company_id: company(),
        batch_number: BATCH.to_string(),
        count: count.to_string(),
        species: SPECIES.to_string(),
        received_qty: dec(qty),
        created_at: Utc::now(),
    }
}

fn grading(hoso_count: &str, graded_count: &str, variety: &str, qty: &str) -> GradingEntry {
    GradingEntry {
        id: Uuid::new_v4(),
        company_id: company(),
        batch_number: BATCH.to_string(),
        hoso_count: hoso_count.to_string(),
        graded_count: graded_count.to_string(),
        species: SPECIES.to_string(),
        variety_name: variety.to_string(),
        graded_qty: dec(qty),
        created_at: Utc::now(),
    }
}

fn deheading(
    hoso_count: &str,
    hlso_count: &str,
    hoso_qty: &str,
    hlso_qty: &str,
) -> DeHeadingEntry {
    DeHeadingEntry {
        id: Uuid::new_v4(),
        company_id: company(),
        batch_number: BATCH.to_string(),
        hoso_count: hoso_count.to_string(),
        hlso_count: hlso_count.to_string(),
        species: SPECIES.to_string(),
        hoso_qty: dec(hoso_qty),
        hlso_qty: dec(hlso_qty),
        created_at: Utc::now(),
    }
}

fn peeling(hlso_count: &str, variety: &str, hlso_qty: &str, peeled_qty: &str) -> PeelingEntry {
    PeelingEntry {
        id: Uuid::new_v4(),
        company_id: company(),
        batch_number: BATCH.to_string(),
        hlso_count: hlso_count.to_string(),
        species: SPECIES.to_string(),
        variety_name: variety.to_string(),
        hlso_qty: dec(hlso_qty),
        peeled_qty: dec(peeled_qty),
        created_at: Utc::now(),
    }
}

fn soaking(in_count: &str, variety: &str, in_qty: &str, rejected_qty: &str) -> SoakingEntry {
    SoakingEntry {
        id: Uuid::new_v4(),
        company_id: company(),
        batch_number: BATCH.to_string(),
        in_count: in_count.to_string(),
        species: SPECIES.to_string(),
        variety_name: variety.to_string(),
        in_qty: dec(in_qty),
        rejected_qty: dec(rejected_qty),
        soaked_qty: dec(in_qty) - dec(rejected_qty),
        created_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Empty ledgers give zero
    #[test]
    fn test_empty_book() {
        let balance = LedgerBook::default().floor_balance(&key("16/20", "HOSO")).unwrap();
        assert_eq!(balance.quantity, Decimal::ZERO);
        assert!(!balance.clamped);
        assert_eq!(balance.topology, VarietyTopology::Hoso);
    }

    /// HOSO: received, regraded in and out, de-headed, soaked with rejects
    #[test]
    fn test_hoso_balance() {
        let book = LedgerBook {
            raw_material: vec![receipt("16/20", "500.00"), receipt("21/25", "300.00")],
            grading: vec![
                // 40 kg regraded away from 16/20
                grading("16/20", "21/25", "HOSO", "40.00"),
                // 15 kg regraded into 16/20
                grading("21/25", "16/20", "HOSO", "15.00"),
                // HLSO output does not count towards HOSO stock
                grading("26/30", "16/20", "HLSO", "99.00"),
            ],
            deheading: vec![deheading("16/20", "21/25", "200.00", "130.00")],
            soaking: vec![soaking("16/20", "HOSO", "50.00", "5.50")],
            ..Default::default()
        };

        let balance = book.floor_balance(&key("16/20", "HOSO")).unwrap();
        // 500 + 15 - 40 - 200 - 50 + 5.5
        assert_eq!(balance.quantity, dec("230.50"));
        assert_eq!(balance.contributions.len(), 6);
    }

    /// HLSO: graded in, peeled out, soaked with rejects
    #[test]
    fn test_hlso_balance() {
        let book = LedgerBook {
            grading: vec![grading("16/20", "21/25", "HLSO", "120.00")],
            peeling: vec![peeling("21/25", "PD", "70.00", "52.00")],
            soaking: vec![soaking("21/25", "HLSO", "30.00", "2.25")],
            ..Default::default()
        };

        let balance = book.floor_balance(&key("21/25", "HLSO")).unwrap();
        // 120 - 70 - 30 + 2.25
        assert_eq!(balance.quantity, dec("22.25"));
    }

    /// HLSO stock ignores de-heading entries
    #[test]
    fn test_hlso_ignores_deheading() {
        let mut book = LedgerBook {
            grading: vec![grading("16/20", "21/25", "HLSO", "120.00")],
            ..Default::default()
        };
        let before = book.floor_balance(&key("21/25", "HLSO")).unwrap();

        book.deheading = vec![
            deheading("21/25", "21/25", "300.00", "200.00"),
            deheading("16/20", "21/25", "80.00", "50.00"),
        ];
        let after = book.floor_balance(&key("21/25", "HLSO")).unwrap();

        assert_eq!(before, after);
    }

    /// Peeled varieties: peeled in, soaked with rejects
    #[test]
    fn test_peeled_balance() {
        let book = LedgerBook {
            peeling: vec![
                peeling("26/30", "PDTO", "100.00", "78.40"),
                peeling("26/30", "PD", "100.00", "80.00"),
            ],
            soaking: vec![soaking("26/30", "PDTO", "60.00", "1.10")],
            ..Default::default()
        };

        let balance = book.floor_balance(&key("26/30", "pdto")).unwrap();
        // 78.40 - 60 + 1.10
        assert_eq!(balance.quantity, dec("19.50"));
        assert_eq!(balance.topology, VarietyTopology::Peeled);
    }

    /// Variety is matched after trimming and uppercasing
    #[test]
    fn test_variety_normalization() {
        let book = LedgerBook {
            grading: vec![grading("16/20", "21/25", " hlso ", "10.00")],
            ..Default::default()
        };
        assert_eq!(book.floor_balance(&key("21/25", "Hlso")).unwrap().quantity, dec("10.00"));
    }

    /// Other batches, species and companies are excluded
    #[test]
    fn test_identity_filters() {
        let mut other_batch = receipt("16/20", "100.00");
        other_batch.batch_number = "B-2024-002".to_string();
        let mut other_species = receipt("16/20", "100.00");
        other_species.species = "MONODON".to_string();
        let mut other_company = receipt("16/20", "100.00");
        other_company.company_id = Uuid::nil();

        let book = LedgerBook {
            raw_material: vec![
                receipt("16/20", "10.00"),
                other_batch,
                other_species,
                other_company,
            ],
            ..Default::default()
        };

        assert_eq!(book.floor_balance(&key("16/20", "HOSO")).unwrap().quantity, dec("10.00"));
    }

    /// Over-consumption clamps to zero and keeps the raw figure
    #[test]
    fn test_negative_balance_clamped() {
        let book = LedgerBook {
            raw_material: vec![receipt("16/20", "100.00")],
            deheading: vec![deheading("16/20", "21/25", "130.00", "85.00")],
            ..Default::default()
        };

        let balance = book.floor_balance(&key("16/20", "HOSO")).unwrap();
        assert_eq!(balance.quantity, Decimal::ZERO);
        assert_eq!(balance.raw_balance, dec("-30.00"));
        assert!(balance.clamped);
    }

    /// Result is rounded to two decimals
    #[test]
    fn test_rounding() {
        let book = LedgerBook {
            raw_material: vec![receipt("16/20", "10.005"), receipt("16/20", "0.001")],
            ..Default::default()
        };
        assert_eq!(book.floor_balance(&key("16/20", "HOSO")).unwrap().quantity, dec("10.01"));
    }

    /// Exact halves round to the even cent
    #[test]
    fn test_rounding_half_even() {
        let book = LedgerBook {
            raw_material: vec![receipt("16/20", "0.125")],
            peeling: vec![peeling("16/20", "PD", "1.00", "0.135")],
            ..Default::default()
        };
        assert_eq!(book.floor_balance(&key("16/20", "HOSO")).unwrap().quantity, dec("0.12"));
        assert_eq!(book.floor_balance(&key("16/20", "PD")).unwrap().quantity, dec("0.14"));
    }

    /// A shortfall below half a cent still counts as over-consumed
    #[test]
    fn test_sub_cent_shortfall_clamped() {
        let book = LedgerBook {
            raw_material: vec![receipt("16/20", "10.000")],
            deheading: vec![deheading("16/20", "21/25", "10.004", "7.00")],
            ..Default::default()
        };

        let balance = book.floor_balance(&key("16/20", "HOSO")).unwrap();
        assert!(balance.clamped);
        assert_eq!(balance.quantity, Decimal::ZERO);
        assert_eq!(balance.raw_balance, Decimal::ZERO);
    }

    /// Sums past the decimal range are reported against the ledger
    #[test]
    fn test_overflow_reported() {
        let mut huge = receipt("16/20", "0");
        huge.received_qty = Decimal::MAX;
        let book = LedgerBook {
            raw_material: vec![huge.clone(), huge],
            ..Default::default()
        };

        let err = book.floor_balance(&key("16/20", "HOSO")).unwrap_err();
        assert_eq!(err, BalanceOverflow { ledger: Ledger::RawMaterial });
        assert_eq!(
            err.to_string(),
            format!("Floor balance overflowed while summing the {} ledger", Ledger::RawMaterial)
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for quantities 0.00 to 1000.00 as strings
    fn quantity_strategy() -> impl Strategy<Value = String> {
        (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2).to_string())
    }

    fn variety_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("HOSO"), Just("HLSO"), Just("PD"), Just("PDTO")]
    }

    fn book_strategy() -> impl Strategy<Value = LedgerBook> {
        (
            prop::collection::vec(quantity_strategy(), 0..4),
            prop::collection::vec((variety_strategy(), quantity_strategy()), 0..4),
            prop::collection::vec((quantity_strategy(), quantity_strategy()), 0..4),
            prop::collection::vec((variety_strategy(), quantity_strategy()), 0..4),
            prop::collection::vec((variety_strategy(), quantity_strategy()), 0..4),
        )
            .prop_map(|(raw, graded, deheaded, peeled, soaked)| LedgerBook {
                raw_material: raw.iter().map(|q| receipt("16/20", q)).collect(),
                grading: graded
                    .iter()
                    .map(|(v, q)| grading("16/20", "16/20", v, q))
                    .collect(),
                deheading: deheaded
                    .iter()
                    .map(|(hoso, hlso)| deheading("16/20", "16/20", hoso, hlso))
                    .collect(),
                peeling: peeled
                    .iter()
                    .map(|(v, q)| peeling("16/20", v, q, q))
                    .collect(),
                soaking: soaked
                    .iter()
                    .map(|(v, q)| soaking("16/20", v, q, "0"))
                    .collect(),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Quantity is never negative and clamped matches the raw sign
        #[test]
        fn prop_balance_never_negative(
            book in book_strategy(),
            variety in variety_strategy()
        ) {
            let balance = book.floor_balance(&key("16/20", variety)).unwrap();
            prop_assert!(balance.quantity >= Decimal::ZERO);
            prop_assert_eq!(balance.clamped, balance.raw_balance < Decimal::ZERO);
        }

        /// Same ledgers give the same balance
        #[test]
        fn prop_balance_is_repeatable(
            book in book_strategy(),
            variety in variety_strategy()
        ) {
            let first = book.floor_balance(&key("16/20", variety)).unwrap();
            let second = book.floor_balance(&key("16/20", variety)).unwrap();
            prop_assert_eq!(first, second);
        }

        /// De-heading never moves HLSO stock
        #[test]
        fn prop_hlso_independent_of_deheading(book in book_strategy()) {
            let with_deheading = book.floor_balance(&key("16/20", "HLSO")).unwrap();
            let stripped = LedgerBook { deheading: vec![], ..book };
            let without = stripped.floor_balance(&key("16/20", "HLSO")).unwrap();
            prop_assert_eq!(with_deheading, without);
        }
    }
}
