//! Validation utilities for master data and stage quantities

use rust_decimal::Decimal;

use crate::models::{Glaze, GradeLabel};

// ============================================================================
// Master Data Validations
// ============================================================================

/// Validate a master-data name (species, variety, grade or glaze label)
pub fn validate_master_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty");
    }
    if trimmed.len() > 50 {
        return Err("Name must be at most 50 characters");
    }
    if trimmed.len() != name.len() {
        return Err("Name cannot start or end with whitespace");
    }
    Ok(())
}

/// Validate a grade label: `BKN`, `DC` or a slash grade with a numeric upper bound
pub fn validate_grade_label(grade: &str) -> Result<(), &'static str> {
    GradeLabel::parse(grade)
        .map(|_| ())
        .map_err(|_| "Grade must be BKN, DC or a slash grade such as 16/20")
}

/// Validate a glaze label: `NWNC` or a percentage below 100
pub fn validate_glaze_label(glaze: &str) -> Result<(), &'static str> {
    Glaze::parse(glaze)
        .map(|_| ())
        .map_err(|_| "Glaze must be NWNC or a percentage below 100 such as 20%")
}

/// Validate a peeling or soaking yield percentage
pub fn validate_yield_percent(yield_percent: Option<Decimal>) -> Result<(), &'static str> {
    match yield_percent {
        Some(p) if p < Decimal::ZERO => Err("Yield cannot be negative"),
        _ => Ok(()),
    }
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a batch number (non-empty, no surrounding whitespace)
pub fn validate_batch_number(batch_number: &str) -> Result<(), &'static str> {
    if batch_number.trim().is_empty() {
        return Err("Batch number cannot be empty");
    }
    if batch_number.trim().len() != batch_number.len() {
        return Err("Batch number cannot start or end with whitespace");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_master_name() {
        assert!(validate_master_name("VANNAMEI").is_ok());
        assert!(validate_master_name("BLACK TIGER").is_ok());
        assert!(validate_master_name("").is_err());
        assert!(validate_master_name("   ").is_err());
        assert!(validate_master_name(" HOSO").is_err());
        assert!(validate_master_name(&"X".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_grade_label() {
        assert!(validate_grade_label("16/20").is_ok());
        assert!(validate_grade_label("U/10").is_ok());
        assert!(validate_grade_label("BKN").is_ok());
        assert!(validate_grade_label("DC").is_ok());
        assert!(validate_grade_label("1620").is_err());
        assert!(validate_grade_label("16/XL").is_err());
    }

    #[test]
    fn test_validate_glaze_label() {
        assert!(validate_glaze_label("NWNC").is_ok());
        assert!(validate_glaze_label("20%").is_ok());
        assert!(validate_glaze_label("7.5%").is_ok());
        assert!(validate_glaze_label("100%").is_err());
        assert!(validate_glaze_label("heavy").is_err());
    }

    #[test]
    fn test_validate_yield_percent() {
        assert!(validate_yield_percent(None).is_ok());
        assert!(validate_yield_percent(Some(Decimal::ZERO)).is_ok());
        assert!(validate_yield_percent(Some(Decimal::from(85))).is_ok());
        assert!(validate_yield_percent(Some(Decimal::from(-1))).is_err());
    }

    #[test]
    fn test_validate_batch_number() {
        assert!(validate_batch_number("B-2024-001").is_ok());
        assert!(validate_batch_number("").is_err());
        assert!(validate_batch_number(" B1").is_err());
    }
}
