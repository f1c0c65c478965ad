//! WebAssembly module for the shrimp processing ERP
//!
//! Provides client-side computation for:
//! - Grade to HLSO/HOSO count conversion previews
//! - Offline floor balance over a downloaded ledger snapshot
//! - Grade and glaze label validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

fn yield_percent(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

/// Convert a grade with the default grade order; returns the outcome as JSON
#[wasm_bindgen]
pub fn compute_grade_conversion(
    grade: &str,
    glaze: &str,
    peeling_yield: Option<f64>,
    soaking_yield: Option<f64>,
) -> Result<String, JsValue> {
    let variety = Variety::new("")
        .with_yields(yield_percent(peeling_yield), yield_percent(soaking_yield));
    let outcome = compute_conversion(grade, glaze, Some(&variety), &GradeOrder::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Floor balance over a JSON ledger book; returns the balance as JSON
#[wasm_bindgen]
pub fn offline_floor_balance(ledgers_json: &str, key_json: &str) -> Result<String, JsValue> {
    let book: LedgerBook = serde_json::from_str(ledgers_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid ledgers JSON: {}", e)))?;
    let key: BalanceKey = serde_json::from_str(key_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid balance key JSON: {}", e)))?;

    let balance = book
        .floor_balance(&key)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if balance.clamped {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "Floor balance for batch {} count {} clamped from {}",
            key.batch_number, key.count, balance.raw_balance
        )));
    }
    serde_json::to_string(&balance).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether the grade is BKN or DC
#[wasm_bindgen]
pub fn is_sentinel(grade: &str) -> bool {
    is_sentinel_grade(grade)
}

/// Validate a grade label before submitting a form
#[wasm_bindgen]
pub fn check_grade_label(grade: &str) -> bool {
    validate_grade_label(grade).is_ok()
}

/// Validate a glaze label before submitting a form
#[wasm_bindgen]
pub fn check_glaze_label(glaze: &str) -> bool {
    validate_glaze_label(glaze).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_grade_conversion() {
        let json = compute_grade_conversion("16/20", "NWNC", None, None).unwrap();
        let outcome: ConversionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome.hlso_count, 20);
        assert_eq!(outcome.hoso_count, 29);
        assert_eq!(outcome.nw_grade, "16/20");
    }

    #[test]
    fn test_compute_grade_conversion_with_yields() {
        let json = compute_grade_conversion("16/20", "NWNC", Some(80.0), Some(100.0)).unwrap();
        let outcome: ConversionOutcome = serde_json::from_str(&json).unwrap();
        // 20 / 0.8 = 25
        assert_eq!(outcome.hlso_count, 25);
    }

    #[test]
    fn test_offline_floor_balance_empty_book() {
        let key = r#"{
            "company_id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "batch_number": "B1",
            "count": "16/20",
            "species": "VANNAMEI",
            "variety": "HOSO"
        }"#;
        let json = offline_floor_balance("{}", key).unwrap();
        let balance: FloorBalance = serde_json::from_str(&json).unwrap();
        assert_eq!(balance.quantity, Decimal::ZERO);
        assert!(!balance.clamped);
    }

    #[test]
    fn test_label_checks() {
        assert!(is_sentinel("BKN"));
        assert!(!is_sentinel("16/20"));
        assert!(check_grade_label("21/25"));
        assert!(!check_grade_label("2125"));
        assert!(check_glaze_label("NWNC"));
        assert!(!check_glaze_label("100%"));
    }
}
