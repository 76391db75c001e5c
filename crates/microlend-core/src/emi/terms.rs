use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::time_value::monthly_rate;
use crate::types::*;
use crate::LendingResult;

/// Largest number of decimal places a currency minor unit may use.
pub const MAX_PRECISION: u32 = 8;

/// Loan terms as entered on an application or calculator form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate in percent (12 = 12% p.a.)
    pub annual_rate_pct: Percent,
    pub tenure: Tenure,
}

/// How rounding residue is handled across the schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Every period's interest is rounded on its own and the installment never
    /// changes. The closing balance may drift a few minor units off zero.
    #[default]
    PerPeriod,
    /// As `PerPeriod`, but the last installment is resized to clear the balance.
    SettleFinalPeriod,
}

/// Per-call calculation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Decimal places of the currency minor unit. 0 rounds to whole units.
    pub precision: u32,
    pub rounding: RoundingPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_due_date: Option<NaiveDate>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        ScheduleOptions {
            precision: 0,
            rounding: RoundingPolicy::PerPeriod,
            first_due_date: None,
        }
    }
}

impl ScheduleOptions {
    pub(crate) fn validate(&self) -> LendingResult<()> {
        if self.precision > MAX_PRECISION {
            return Err(LendingError::invalid(
                "precision",
                format!("Precision must be between 0 and {MAX_PRECISION} decimal places"),
            ));
        }
        Ok(())
    }

    /// Smallest representable amount at this precision. Precision above
    /// `MAX_PRECISION` is rejected by every calculation.
    pub fn minor_unit(&self) -> Money {
        Decimal::new(1, self.precision.min(MAX_PRECISION))
    }
}

/// Terms after validation, with tenure normalised to months.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NormalisedTerms {
    pub principal: Money,
    pub rate: Rate,
    pub months: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_pct: Percent, tenure: Tenure) -> Self {
        LoanTerms {
            principal,
            annual_rate_pct,
            tenure,
        }
    }

    pub(crate) fn normalise(&self) -> LendingResult<NormalisedTerms> {
        if self.principal <= Decimal::ZERO {
            return Err(LendingError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_rate_pct < Decimal::ZERO {
            return Err(LendingError::invalid(
                "annual_rate_pct",
                "Interest rate cannot be negative",
            ));
        }
        let months = self.tenure.in_months()?;

        Ok(NormalisedTerms {
            principal: self.principal,
            rate: monthly_rate(self.annual_rate_pct),
            months,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalise_years() {
        let terms = LoanTerms::new(dec!(50000), dec!(18), Tenure::years(2));
        let n = terms.normalise().unwrap();
        assert_eq!(n.months, 24);
        assert_eq!(n.rate, dec!(0.015));
    }

    #[test]
    fn test_zero_rate_is_valid() {
        let terms = LoanTerms::new(dec!(50000), Decimal::ZERO, Tenure::months(10));
        assert!(terms.normalise().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        for p in [Decimal::ZERO, dec!(-1)] {
            let terms = LoanTerms::new(p, dec!(12), Tenure::months(12));
            match terms.normalise() {
                Err(LendingError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
                other => panic!("expected InvalidInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_negative_rate() {
        let terms = LoanTerms::new(dec!(1000), dec!(-0.5), Tenure::months(12));
        assert!(matches!(
            terms.normalise(),
            Err(LendingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_options_defaults_from_empty_document() {
        let opts: ScheduleOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ScheduleOptions::default());
        assert_eq!(opts.minor_unit(), Decimal::ONE);
    }

    #[test]
    fn test_options_precision_bound() {
        let opts = ScheduleOptions {
            precision: 12,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_minor_unit_paise() {
        let opts = ScheduleOptions {
            precision: 2,
            ..Default::default()
        };
        assert_eq!(opts.minor_unit(), dec!(0.01));
    }
}
