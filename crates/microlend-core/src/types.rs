use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::LendingResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.01 = 1% per month).
pub type Rate = Decimal;

/// Rates as quoted to borrowers (12 = 12% p.a.). Only ever seen at the input boundary.
pub type Percent = Decimal;

/// Longest tenure accepted anywhere in the crate (100 years).
pub const MAX_TENURE_MONTHS: u32 = 1200;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    INR,
    USD,
    GBP,
    EUR,
    KES,
    BDT,
    PHP,
    Other(String),
}

/// Unit the borrower quoted the tenure in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureUnit {
    #[default]
    Months,
    Years,
}

/// Loan tenure as entered, before normalisation to months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    pub value: u32,
    #[serde(default)]
    pub unit: TenureUnit,
}

impl Tenure {
    pub fn months(value: u32) -> Self {
        Tenure {
            value,
            unit: TenureUnit::Months,
        }
    }

    pub fn years(value: u32) -> Self {
        Tenure {
            value,
            unit: TenureUnit::Years,
        }
    }

    /// Number of monthly repayment periods.
    pub fn in_months(&self) -> LendingResult<u32> {
        let months = match self.unit {
            TenureUnit::Months => Some(self.value),
            TenureUnit::Years => self.value.checked_mul(12),
        };
        match months {
            Some(0) => Err(LendingError::invalid(
                "tenure",
                "Tenure must be at least 1 month",
            )),
            Some(m) if m <= MAX_TENURE_MONTHS => Ok(m),
            _ => Err(LendingError::invalid(
                "tenure",
                format!("Tenure must not exceed {MAX_TENURE_MONTHS} months"),
            )),
        }
    }
}

/// Sweep definition for one axis of a sensitivity grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
