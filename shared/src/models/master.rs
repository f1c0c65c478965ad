//! Master data models (species, grades, varieties, glazes)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::validate_yield_percent;

/// A product variety with its processing yields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variety {
    pub variety_name: String,
    /// Peeling yield in percent; unset means no loss
    pub peeling_yield: Option<Decimal>,
    /// Soaking yield in percent; unset means no loss
    pub soaking_yield: Option<Decimal>,
}

impl Variety {
    pub fn new(variety_name: impl Into<String>) -> Self {
        Self {
            variety_name: variety_name.into(),
            peeling_yield: None,
            soaking_yield: None,
        }
    }

    pub fn with_yields(mut self, peeling: Option<Decimal>, soaking: Option<Decimal>) -> Self {
        self.peeling_yield = peeling;
        self.soaking_yield = soaking;
        self
    }

    /// Both yields must be unset or non-negative
    pub fn validate_yields(&self) -> Result<(), &'static str> {
        validate_yield_percent(self.peeling_yield)
            .map_err(|_| "Peeling yield cannot be negative")?;
        validate_yield_percent(self.soaking_yield)
            .map_err(|_| "Soaking yield cannot be negative")
    }

    /// Peeling yield as a fraction (1.0 when unset or zero)
    pub fn peeling_factor(&self) -> Decimal {
        yield_factor(self.peeling_yield)
    }

    /// Soaking yield as a fraction (1.0 when unset or zero)
    pub fn soaking_factor(&self) -> Decimal {
        yield_factor(self.soaking_yield)
    }
}

fn yield_factor(percent: Option<Decimal>) -> Decimal {
    match percent {
        Some(p) if !p.is_zero() => p / Decimal::from(100),
        _ => Decimal::ONE,
    }
}

/// A tenant's master lists as seen by the conversion engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterDataSnapshot {
    pub species: Vec<String>,
    pub grades: Vec<String>,
    pub varieties: Vec<Variety>,
    pub glazes: Vec<String>,
}

impl MasterDataSnapshot {
    pub fn variety(&self, name: &str) -> Option<&Variety> {
        self.varieties.iter().find(|v| v.variety_name == name)
    }

    pub fn has_species(&self, name: &str) -> bool {
        self.species.iter().any(|s| s == name)
    }

    pub fn has_grade(&self, name: &str) -> bool {
        self.grades.iter().any(|g| g == name)
    }

    pub fn has_glaze(&self, name: &str) -> bool {
        self.glazes.iter().any(|g| g == name)
    }

    /// Size of the species × grade × variety × glaze cross product
    pub fn combination_count(&self) -> usize {
        self.species.len() * self.grades.len() * self.varieties.len() * self.glazes.len()
    }
}
