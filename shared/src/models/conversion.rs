//! Grade ↔ count conversion for finished-goods grades
//!
//! A retail grade such as `16/20` is converted into the physical HLSO and HOSO
//! piece counts that have to be sourced to fill it, after allowing for glaze
//! weight and the variety's peeling/soaking yields. The conversion also derives
//! the "net-weight" grade the finished pack upgrades to.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::master::Variety;

/// Non-numeric grades: broken and discoloured pieces
pub const SENTINEL_GRADES: &[&str] = &["BKN", "DC"];

/// Net weight, no coat
pub const NO_GLAZE: &str = "NWNC";

/// Known grade labels, finest to coarsest
pub const GRADE_ORDER: &[&str] = &[
    "U/10", "U/12", "U/15", "8/12", "13/15", "16/20", "21/25", "26/30", "31/35", "31/40", "36/40",
    "41/50", "51/60", "61/70", "71/90", "91/110", "100/200", "111/130", "131/150", "151/200",
    "200/300", "300/500",
];

/// Errors raised while converting a grade
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid grade format: {grade}")]
    InvalidGradeFormat { grade: String },

    #[error("Invalid glaze format: {glaze}")]
    InvalidGlazeFormat { glaze: String },

    #[error("Converted count out of range for grade {grade}")]
    CountOutOfRange { grade: String },

    #[error("Invalid yield for variety {variety}: {reason}")]
    InvalidYield { variety: String, reason: String },
}

pub fn is_sentinel_grade(grade: &str) -> bool {
    let grade = grade.trim();
    SENTINEL_GRADES.iter().any(|s| s.eq_ignore_ascii_case(grade))
}

/// A parsed grade label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeLabel {
    /// `BKN` or `DC`
    Sentinel(String),
    /// Slash grade; `high` is the number after the last slash
    Numeric { label: String, high: u32 },
}

impl GradeLabel {
    pub fn parse(raw: &str) -> Result<Self, ConversionError> {
        let label = raw.trim();
        if is_sentinel_grade(label) {
            return Ok(GradeLabel::Sentinel(label.to_string()));
        }

        let high = label
            .rsplit_once('/')
            .and_then(|(_, upper)| upper.trim().parse::<u32>().ok())
            .ok_or_else(|| ConversionError::InvalidGradeFormat {
                grade: raw.to_string(),
            })?;

        Ok(GradeLabel::Numeric {
            label: label.to_string(),
            high,
        })
    }

    pub fn label(&self) -> &str {
        match self {
            GradeLabel::Sentinel(label) => label,
            GradeLabel::Numeric { label, .. } => label,
        }
    }
}

/// Glaze applied to the finished pack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glaze {
    NoCoat,
    /// Ice share of the shipped weight, in percent (0 <= p < 100)
    Percent(Decimal),
}

impl Glaze {
    pub fn parse(raw: &str) -> Result<Self, ConversionError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(NO_GLAZE) {
            return Ok(Glaze::NoCoat);
        }

        let invalid = || ConversionError::InvalidGlazeFormat {
            glaze: raw.to_string(),
        };

        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let percent = number.parse::<Decimal>().map_err(|_| invalid())?;
        if percent < Decimal::ZERO || percent >= Decimal::from(100) {
            return Err(invalid());
        }

        Ok(Glaze::Percent(percent))
    }

    /// Product share of the shipped weight
    pub fn factor(&self) -> Decimal {
        match self {
            Glaze::NoCoat => Decimal::ONE,
            Glaze::Percent(p) => (Decimal::from(100) - p) / Decimal::from(100),
        }
    }
}

/// Ordered grade labels used for the net-weight upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeOrder(Vec<String>);

impl Default for GradeOrder {
    fn default() -> Self {
        Self(GRADE_ORDER.iter().map(|g| g.to_string()).collect())
    }
}

impl GradeOrder {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, grade: &str) -> Option<usize> {
        let grade = grade.trim();
        self.0.iter().position(|g| g.eq_ignore_ascii_case(grade))
    }

    /// Move `step` places towards the coarse end, clamped to the last label.
    ///
    /// Returns `None` when the grade is not part of the ordering.
    pub fn upgrade(&self, grade: &str, step: usize) -> Option<&str> {
        let index = self.position(grade)?;
        let target = (index + step).min(self.0.len() - 1);
        Some(self.0[target].as_str())
    }
}

/// Offset subtracted from the HOSO count, by HLSO count band
pub fn hoso_offset(hlso_count: i32) -> i32 {
    match hlso_count {
        i32::MIN..=40 => 1,
        41..=70 => 2,
        71..=110 => 5,
        _ => 15,
    }
}

/// Number of grade steps the net-weight grade moves up, by HLSO count band
pub fn net_weight_step(hlso_count: i32) -> usize {
    match hlso_count {
        i32::MIN..=20 => 0,
        21..=50 => 1,
        51..=70 => 2,
        _ => 3,
    }
}

/// `floor(high / glaze / peel / soak)`
pub fn hlso_count(high: u32, glaze_factor: Decimal, peel: Decimal, soak: Decimal) -> Option<i32> {
    Decimal::from(high)
        .checked_div(glaze_factor)?
        .checked_div(peel)?
        .checked_div(soak)?
        .floor()
        .to_i32()
}

/// `trunc(hlso * 1.54 - offset)`
pub fn hoso_count(hlso_count: i32) -> Option<i32> {
    let multiplier = Decimal::new(154, 2);
    (Decimal::from(hlso_count) * multiplier - Decimal::from(hoso_offset(hlso_count)))
        .trunc()
        .to_i32()
}

/// Result of converting one grade/glaze/variety combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub hlso_count: i32,
    pub hoso_count: i32,
    pub nw_grade: String,
    /// False when the grade is missing from the grade order and `nw_grade`
    /// was left as the input grade
    pub nw_grade_resolved: bool,
}

impl ConversionOutcome {
    fn sentinel(label: String) -> Self {
        Self {
            hlso_count: 0,
            hoso_count: 0,
            nw_grade: label,
            nw_grade_resolved: true,
        }
    }
}

/// Convert a grade into HLSO/HOSO counts and its net-weight grade.
///
/// A missing variety record means no yield loss.
pub fn compute_conversion(
    grade_name: &str,
    glaze_name: &str,
    variety: Option<&Variety>,
    order: &GradeOrder,
) -> Result<ConversionOutcome, ConversionError> {
    let (label, high) = match GradeLabel::parse(grade_name)? {
        GradeLabel::Sentinel(label) => return Ok(ConversionOutcome::sentinel(label)),
        GradeLabel::Numeric { label, high } => (label, high),
    };

    if let Some(v) = variety {
        v.validate_yields()
            .map_err(|reason| ConversionError::InvalidYield {
                variety: v.variety_name.clone(),
                reason: reason.to_string(),
            })?;
    }

    let glaze = Glaze::parse(glaze_name)?;
    let (peel, soak) = variety
        .map(|v| (v.peeling_factor(), v.soaking_factor()))
        .unwrap_or((Decimal::ONE, Decimal::ONE));

    let out_of_range = || ConversionError::CountOutOfRange {
        grade: grade_name.to_string(),
    };
    let hlso = hlso_count(high, glaze.factor(), peel, soak).ok_or_else(out_of_range)?;
    let hoso = hoso_count(hlso).ok_or_else(out_of_range)?;

    let (nw_grade, nw_grade_resolved) = match order.upgrade(&label, net_weight_step(hlso)) {
        Some(upgraded) => (upgraded.to_string(), true),
        None => (label, false),
    };

    Ok(ConversionOutcome {
        hlso_count: hlso,
        hoso_count: hoso,
        nw_grade,
        nw_grade_resolved,
    })
}

/// Natural key of a cached conversion
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversionKey {
    pub species: String,
    pub grade_name: String,
    pub variety_name: String,
    pub glaze_name: String,
}

impl ConversionKey {
    pub fn new(
        species: impl Into<String>,
        grade_name: impl Into<String>,
        variety_name: impl Into<String>,
        glaze_name: impl Into<String>,
    ) -> Self {
        Self {
            species: species.into(),
            grade_name: grade_name.into(),
            variety_name: variety_name.into(),
            glaze_name: glaze_name.into(),
        }
    }
}

/// A cached conversion row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeConversion {
    pub id: Uuid,
    pub company_id: Uuid,
    pub species: String,
    pub grade_name: String,
    pub variety_name: String,
    pub glaze_name: String,
    pub hlso_count: i32,
    pub hoso_count: i32,
    pub nw_grade: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> GradeOrder {
        GradeOrder::default()
    }

    #[test]
    fn parses_upper_bound() {
        assert_eq!(
            GradeLabel::parse("16/20").unwrap(),
            GradeLabel::Numeric {
                label: "16/20".into(),
                high: 20
            }
        );
        assert!(matches!(
            GradeLabel::parse("100/200").unwrap(),
            GradeLabel::Numeric { high: 200, .. }
        ));
        assert!(matches!(
            GradeLabel::parse("U/10").unwrap(),
            GradeLabel::Numeric { high: 10, .. }
        ));
    }

    #[test]
    fn rejects_grades_without_numeric_upper_bound() {
        for bad in ["1620", "16/", "16/XX", "", "JUMBO"] {
            assert_eq!(
                GradeLabel::parse(bad),
                Err(ConversionError::InvalidGradeFormat {
                    grade: bad.to_string()
                }),
                "{bad}"
            );
        }
    }

    #[test]
    fn glaze_factors() {
        assert_eq!(Glaze::parse("NWNC").unwrap().factor(), Decimal::ONE);
        assert_eq!(Glaze::parse("20%").unwrap().factor(), Decimal::new(8, 1));
        assert_eq!(Glaze::parse("0%").unwrap().factor(), Decimal::ONE);
        assert_eq!(Glaze::parse(" 35 ").unwrap().factor(), Decimal::new(65, 2));
        assert!(Glaze::parse("100%").is_err());
        assert!(Glaze::parse("-5%").is_err());
        assert!(Glaze::parse("ICE").is_err());
    }

    #[test]
    fn hoso_offset_bands() {
        assert_eq!(hoso_offset(40), 1);
        assert_eq!(hoso_offset(41), 2);
        assert_eq!(hoso_offset(70), 2);
        assert_eq!(hoso_offset(71), 5);
        assert_eq!(hoso_offset(110), 5);
        assert_eq!(hoso_offset(111), 15);
    }

    #[test]
    fn net_weight_step_bands() {
        assert_eq!(net_weight_step(20), 0);
        assert_eq!(net_weight_step(21), 1);
        assert_eq!(net_weight_step(50), 1);
        assert_eq!(net_weight_step(51), 2);
        assert_eq!(net_weight_step(70), 2);
        assert_eq!(net_weight_step(71), 3);
    }

    #[test]
    fn sentinel_grades_short_circuit() {
        let outcome = compute_conversion("BKN", "not-a-glaze", None, &order()).unwrap();
        assert_eq!((outcome.hlso_count, outcome.hoso_count), (0, 0));
        assert_eq!(outcome.nw_grade, "BKN");
        assert!(outcome.nw_grade_resolved);
    }

    #[test]
    fn upgrade_clamps_to_last_grade() {
        let order = order();
        let last = order.labels().last().unwrap().clone();
        assert_eq!(order.upgrade(&last, 3), Some(last.as_str()));
        assert_eq!(order.upgrade("NOT-A-GRADE", 1), None);
    }

    #[test]
    fn unknown_grade_keeps_its_label() {
        let outcome = compute_conversion("17/22", "NWNC", None, &order()).unwrap();
        assert_eq!(outcome.hlso_count, 22);
        assert_eq!(outcome.nw_grade, "17/22");
        assert!(!outcome.nw_grade_resolved);
    }

    #[test]
    fn negative_yields_are_rejected() {
        let pd = Variety::new("PD").with_yields(Some(Decimal::from(-50)), None);
        let err = compute_conversion("16/20", "NWNC", Some(&pd), &order()).unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidYield {
                variety: "PD".into(),
                reason: "Peeling yield cannot be negative".into(),
            }
        );

        let soak = Variety::new("PD").with_yields(None, Some(Decimal::new(-1, 2)));
        assert!(compute_conversion("16/20", "20%", Some(&soak), &order()).is_err());
    }

    #[test]
    fn custom_order_is_honoured() {
        let order = GradeOrder::new(vec!["A/10".into(), "B/30".into()]);
        let outcome = compute_conversion("A/10", "20%", None, &order).unwrap();
        // 10 / 0.8 = 12.5 -> 12, step 0
        assert_eq!(outcome.hlso_count, 12);
        assert_eq!(outcome.nw_grade, "A/10");

        let pd = Variety::new("PD").with_yields(Some(Decimal::from(40)), None);
        let outcome = compute_conversion("A/10", "NWNC", Some(&pd), &order).unwrap();
        // 10 / 0.4 = 25, step 1
        assert_eq!(outcome.hlso_count, 25);
        assert_eq!(outcome.nw_grade, "B/30");
    }
}
