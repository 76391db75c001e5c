use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::emi::{compute_installment, LoanTerms, ScheduleOptions};
use crate::error::LendingError;
use crate::types::*;
use crate::LendingResult;

/// Input for an installment grid over annual rate and tenure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiSensitivityInput {
    pub principal: Money,
    /// Annual rate sweep, in percent
    pub rate_pct: SensitivityVariable,
    /// Tenure sweep, in whole months
    pub tenure_months: SensitivityVariable,
    #[serde(default)]
    pub options: ScheduleOptions,
}

/// Installment grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiSensitivityOutput {
    pub rate_values: Vec<Percent>,
    pub tenure_values: Vec<u32>,
    /// matrix[i][j] = installment at rate_values[i], tenure_values[j]; null if not computable
    pub matrix: Vec<Vec<Option<Money>>>,
    /// Position of the base case in the matrix (row, col)
    pub base_case_position: (usize, usize),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_case_installment: Option<Money>,
}

/// Most values a single sweep axis may produce.
pub const MAX_SWEEP_POINTS: usize = 200;

/// Sweep values from min to max with step, max always included.
fn generate_sweep_values(var: &SensitivityVariable) -> LendingResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(LendingError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let steps = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .map(|s| s.floor())
        .and_then(|s| s.to_usize());
    let too_many = || LendingError::InvalidInput {
        field: format!("variable:{}", var.name),
        reason: format!("Sweep must not exceed {MAX_SWEEP_POINTS} points"),
    };
    if !matches!(steps, Some(s) if s < MAX_SWEEP_POINTS) {
        return Err(too_many());
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }
    if values.len() > MAX_SWEEP_POINTS {
        return Err(too_many());
    }

    Ok(values)
}

fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn whole_months(var: &SensitivityVariable, values: &[Decimal]) -> LendingResult<Vec<u32>> {
    values
        .iter()
        .map(|v| {
            if !v.fract().is_zero() || *v <= Decimal::ZERO {
                return Err(LendingError::InvalidInput {
                    field: format!("variable:{}", var.name),
                    reason: format!("Tenure {v} is not a positive whole number of months"),
                });
            }
            v.to_u32().ok_or_else(|| LendingError::InvalidInput {
                field: format!("variable:{}", var.name),
                reason: format!("Tenure {v} is out of range"),
            })
        })
        .collect()
}

/// Installment for every (rate, tenure) pair of the two sweeps.
pub fn emi_sensitivity(
    input: &EmiSensitivityInput,
) -> LendingResult<ComputationOutput<EmiSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.principal <= Decimal::ZERO {
        return Err(LendingError::invalid("principal", "Principal must be positive"));
    }
    if input.rate_pct.min < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: format!("variable:{}", input.rate_pct.name),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let rate_values = generate_sweep_values(&input.rate_pct)?;
    let tenure_raw = generate_sweep_values(&input.tenure_months)?;
    let tenure_values = whole_months(&input.tenure_months, &tenure_raw)?;

    let mut matrix = Vec::with_capacity(rate_values.len());
    for rate in &rate_values {
        let mut row = Vec::with_capacity(tenure_values.len());
        for &months in &tenure_values {
            let terms = LoanTerms::new(input.principal, *rate, Tenure::months(months));
            match compute_installment(&terms, &input.options) {
                Ok(installment) => row.push(Some(installment)),
                Err(LendingError::NotComputable { context }) => {
                    warnings.push(format!("{rate}% over {months} months: {context}"));
                    row.push(None);
                }
                Err(e) => return Err(e),
            }
        }
        matrix.push(row);
    }

    let mid_rate = (input.rate_pct.min + input.rate_pct.max) / dec!(2);
    let mid_tenure = (input.tenure_months.min + input.tenure_months.max) / dec!(2);
    let base_row = closest_index(&rate_values, mid_rate);
    let base_col = closest_index(&tenure_raw, mid_tenure);
    let base_case_installment = matrix[base_row][base_col];

    let output = EmiSensitivityOutput {
        rate_values,
        tenure_values,
        matrix,
        base_case_position: (base_row, base_col),
        base_case_installment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "EMI sensitivity grid (rate x tenure)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "rate_pct": input.rate_pct,
            "tenure_months": input.tenure_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn var(name: &str, min: Decimal, max: Decimal, step: Decimal) -> SensitivityVariable {
        SensitivityVariable {
            name: name.into(),
            min,
            max,
            step,
        }
    }

    fn grid_input() -> EmiSensitivityInput {
        EmiSensitivityInput {
            principal: dec!(100000),
            rate_pct: var("rate", dec!(0), dec!(24), dec!(12)),
            tenure_months: var("tenure", dec!(6), dec!(12), dec!(6)),
            options: ScheduleOptions::default(),
        }
    }

    #[test]
    fn test_grid_shape_and_values() {
        let out = emi_sensitivity(&grid_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.rate_values, vec![dec!(0), dec!(12), dec!(24)]);
        assert_eq!(r.tenure_values, vec![6, 12]);
        assert_eq!(r.matrix.len(), 3);
        assert_eq!(r.matrix[0][1], Some(dec!(8333)));
        assert_eq!(r.matrix[1][1], Some(dec!(8885)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_installment_rises_with_rate_and_falls_with_tenure() {
        let out = emi_sensitivity(&grid_input()).unwrap();
        let m = &out.result.matrix;
        for col in 0..2 {
            assert!(m[0][col] < m[1][col] && m[1][col] < m[2][col]);
        }
        for row in m {
            assert!(row[0] > row[1]);
        }
    }

    #[test]
    fn test_base_case_is_midpoint() {
        let out = emi_sensitivity(&grid_input()).unwrap();
        assert_eq!(out.result.base_case_position.0, 1);
        assert_eq!(out.result.base_case_installment, out.result.matrix[1][out.result.base_case_position.1]);
    }

    #[test]
    fn test_max_included_when_step_overshoots() {
        let values = generate_sweep_values(&var("x", dec!(1), dec!(10), dec!(4))).unwrap();
        assert_eq!(values, vec![dec!(1), dec!(5), dec!(9), dec!(10)]);
    }

    #[test]
    fn test_sweep_point_limit() {
        let values = generate_sweep_values(&var("x", dec!(1), dec!(200), dec!(1))).unwrap();
        assert_eq!(values.len(), MAX_SWEEP_POINTS);

        for v in [
            var("x", dec!(0), dec!(100), dec!(0.001)),
            var("x", dec!(1), dec!(201), dec!(1)),
            var("x", Decimal::MIN, Decimal::MAX, dec!(0.0000001)),
        ] {
            assert!(matches!(
                generate_sweep_values(&v),
                Err(LendingError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_fractional_tenure_rejected() {
        let mut input = grid_input();
        input.tenure_months = var("tenure", dec!(6), dec!(9), dec!(1.5));
        assert!(emi_sensitivity(&input).is_err());
    }

    #[test]
    fn test_overflowing_cell_reported_as_null() {
        let mut input = grid_input();
        input.rate_pct = var("rate", dec!(600), dec!(600), dec!(1));
        input.tenure_months = var("tenure", dec!(12), dec!(400), dec!(388));
        let out = emi_sensitivity(&input).unwrap();
        assert!(out.result.matrix[0][0].is_some());
        assert!(out.result.matrix[0][1].is_none());
        assert_eq!(out.warnings.len(), 1);
    }
}
