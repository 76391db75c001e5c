use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::terms::{LoanTerms, NormalisedTerms, RoundingPolicy, ScheduleOptions};
use crate::error::LendingError;
use crate::time_value::{annuity_installment, round_minor};
use crate::types::*;
use crate::LendingResult;

/// One month of an amortisation schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub installment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    /// Floored at zero
    pub closing_balance: Money,
}

/// Totals derived from a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub principal: Money,
    pub tenure_months: u32,
    pub total_payable: Money,
    pub total_interest: Money,
    /// Closing balance after the last period. Non-zero only through rounding drift.
    pub residual_balance: Money,
}

/// Input for a full EMI calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiInput {
    pub terms: LoanTerms,
    #[serde(default)]
    pub options: ScheduleOptions,
    #[serde(default)]
    pub include_schedule: bool,
}

/// Output of a full EMI calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiOutput {
    pub installment: Money,
    pub tenure_months: u32,
    pub monthly_rate: Rate,
    pub summary: AmortizationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<AmortizationPeriod>>,
}

fn installment_for(terms: &NormalisedTerms, options: &ScheduleOptions) -> LendingResult<Money> {
    let raw = annuity_installment(terms.principal, terms.rate, terms.months)?;
    let installment = round_minor(raw, options.precision);
    if installment <= Decimal::ZERO {
        return Err(LendingError::not_computable(format!(
            "installment {raw} rounds to zero at {} decimal places",
            options.precision
        )));
    }
    Ok(installment)
}

/// Fixed monthly installment under the reducing-balance method, rounded to
/// the minor unit.
pub fn compute_installment(terms: &LoanTerms, options: &ScheduleOptions) -> LendingResult<Money> {
    options.validate()?;
    let n = terms.normalise()?;
    installment_for(&n, options)
}

/// Period-by-period split of each installment into principal and interest.
///
/// Interest for a period is charged on the previous period's closing balance,
/// so periods are produced strictly in order and the whole schedule is
/// recomputed whenever any input changes.
pub fn generate_schedule(
    terms: &LoanTerms,
    options: &ScheduleOptions,
) -> LendingResult<Vec<AmortizationPeriod>> {
    options.validate()?;
    let n = terms.normalise()?;
    let installment = installment_for(&n, options)?;
    debug!(
        principal = %n.principal,
        rate = %n.rate,
        months = n.months,
        %installment,
        "generating amortisation schedule"
    );

    let mut periods = Vec::with_capacity(n.months as usize);
    let mut balance = n.principal;

    for period in 1..=n.months {
        let opening = balance;
        let interest = round_minor(opening * n.rate, options.precision);

        // Settling never repays more principal than is outstanding.
        let scheduled_principal = installment - interest;
        let settle = options.rounding == RoundingPolicy::SettleFinalPeriod
            && (period == n.months || scheduled_principal > opening);
        let (paid, principal_component) = if settle {
            (opening + interest, opening)
        } else {
            (installment, scheduled_principal)
        };

        balance = (opening - principal_component).max(Decimal::ZERO);

        periods.push(AmortizationPeriod {
            period,
            due_date: due_date(options.first_due_date, period)?,
            opening_balance: opening,
            installment: paid,
            principal_component,
            interest_component: interest,
            closing_balance: balance,
        });
    }

    let drift_tolerance = options.minor_unit() * Decimal::from(n.months);
    if balance > drift_tolerance {
        warn!(residual = %balance, %drift_tolerance, "schedule did not amortise to zero");
    }

    Ok(periods)
}

fn due_date(first: Option<NaiveDate>, period: u32) -> LendingResult<Option<NaiveDate>> {
    match first {
        None => Ok(None),
        Some(first) => first
            .checked_add_months(Months::new(period - 1))
            .map(Some)
            .ok_or_else(|| {
                LendingError::DateError(format!("due date for period {period} is out of range"))
            }),
    }
}

/// Totals for a generated schedule.
pub fn compute_summary(
    principal: Money,
    schedule: &[AmortizationPeriod],
) -> LendingResult<AmortizationSummary> {
    let last = schedule.last().ok_or_else(|| {
        LendingError::not_computable("summary of an empty schedule")
    })?;

    let total_payable: Money = schedule.iter().map(|p| p.installment).sum();

    Ok(AmortizationSummary {
        principal,
        tenure_months: schedule.len() as u32,
        total_payable,
        total_interest: total_payable - principal,
        residual_balance: last.closing_balance,
    })
}

/// Installment, summary and (optionally) schedule in the standard envelope.
pub fn calculate_emi(input: &EmiInput) -> LendingResult<ComputationOutput<EmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = generate_schedule(&input.terms, &input.options)?;
    let summary = compute_summary(input.terms.principal, &schedule)?;
    let installment = schedule[0].installment;
    let monthly_rate = crate::time_value::monthly_rate(input.terms.annual_rate_pct);

    if let Some(last) = schedule.last() {
        if !last.closing_balance.is_zero() {
            warnings.push(format!(
                "Per-period rounding leaves a closing balance of {} after period {}",
                last.closing_balance, last.period
            ));
        }
        let overpaid = last.principal_component - last.opening_balance;
        if overpaid > Decimal::ZERO {
            warnings.push(format!(
                "Final installment overpays the outstanding principal by {overpaid}"
            ));
        }
    }

    let output = EmiOutput {
        installment,
        tenure_months: summary.tenure_months,
        monthly_rate,
        summary,
        schedule: input.include_schedule.then_some(schedule),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance EMI (annuity method)",
        &serde_json::json!({
            "principal": input.terms.principal.to_string(),
            "annual_rate_pct": input.terms.annual_rate_pct.to_string(),
            "tenure_months": output.tenure_months,
            "precision": input.options.precision,
            "rounding": input.options.rounding,
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

    fn one_lakh() -> LoanTerms {
        LoanTerms::new(dec!(100000), dec!(12), Tenure::months(12))
    }

    #[test]
    fn test_installment_one_lakh_twelve_pct() {
        let emi = compute_installment(&one_lakh(), &ScheduleOptions::default()).unwrap();
        assert_eq!(emi, dec!(8885));
    }

    #[test]
    fn test_installment_with_paise() {
        let opts = ScheduleOptions {
            precision: 2,
            ..Default::default()
        };
        let emi = compute_installment(&one_lakh(), &opts).unwrap();
        assert_eq!(emi, dec!(8884.88));
    }

    #[test]
    fn test_first_period_split() {
        let schedule = generate_schedule(&one_lakh(), &ScheduleOptions::default()).unwrap();
        let first = &schedule[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.opening_balance, dec!(100000));
        assert_eq!(first.interest_component, dec!(1000));
        assert_eq!(first.principal_component, dec!(7885));
        assert_eq!(first.closing_balance, dec!(92115));
    }

    #[test]
    fn test_single_period_loan() {
        let terms = LoanTerms::new(dec!(50000), dec!(12), Tenure::months(1));
        let schedule = generate_schedule(&terms, &ScheduleOptions::default()).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].installment, dec!(50500));
        assert_eq!(schedule[0].interest_component, dec!(500));
        assert_eq!(schedule[0].principal_component, dec!(50000));
        assert_eq!(schedule[0].closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_settle_final_period_clears_balance() {
        let terms = LoanTerms::new(dec!(100), Decimal::ZERO, Tenure::months(3));
        let per_period = generate_schedule(&terms, &ScheduleOptions::default()).unwrap();
        assert_eq!(per_period[2].closing_balance, dec!(1));

        let opts = ScheduleOptions {
            rounding: RoundingPolicy::SettleFinalPeriod,
            ..Default::default()
        };
        let settled = generate_schedule(&terms, &opts).unwrap();
        assert_eq!(settled[2].installment, dec!(34));
        assert_eq!(settled[2].principal_component, dec!(34));
        assert_eq!(settled[2].closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_settle_stops_charging_once_balance_is_cleared() {
        // 5 / 8 rounds up to 1, so the loan is repaid after five periods
        let terms = LoanTerms::new(dec!(5), Decimal::ZERO, Tenure::months(8));
        let opts = ScheduleOptions {
            rounding: RoundingPolicy::SettleFinalPeriod,
            ..Default::default()
        };
        let schedule = generate_schedule(&terms, &opts).unwrap();
        assert_eq!(schedule.len(), 8);
        assert_eq!(schedule[4].closing_balance, Decimal::ZERO);
        for p in &schedule[5..] {
            assert_eq!(p.opening_balance, Decimal::ZERO);
            assert_eq!(p.installment, Decimal::ZERO);
            assert_eq!(p.principal_component, Decimal::ZERO);
        }

        let summary = compute_summary(terms.principal, &schedule).unwrap();
        assert_eq!(summary.total_payable, dec!(5));
        assert_eq!(summary.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_rejects_tenure_beyond_limit() {
        let terms = LoanTerms::new(dec!(1000000000000), Decimal::ZERO, Tenure::years(300_000_000));
        assert!(matches!(
            generate_schedule(&terms, &ScheduleOptions::default()),
            Err(LendingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_due_dates_step_by_calendar_month() {
        let opts = ScheduleOptions {
            first_due_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };
        let terms = LoanTerms::new(dec!(30000), dec!(24), Tenure::months(3));
        let schedule = generate_schedule(&terms, &opts).unwrap();
        let dates: Vec<_> = schedule.iter().filter_map(|p| p.due_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_summary_of_empty_schedule() {
        let err = compute_summary(dec!(1000), &[]).unwrap_err();
        assert!(matches!(err, LendingError::NotComputable { .. }));
    }

    #[test]
    fn test_tiny_principal_not_computable() {
        let terms = LoanTerms::new(dec!(0.3), dec!(12), Tenure::months(12));
        let err = compute_installment(&terms, &ScheduleOptions::default()).unwrap_err();
        assert!(matches!(err, LendingError::NotComputable { .. }));
    }

    #[test]
    fn test_calculate_emi_omits_schedule_by_default() {
        let input = EmiInput {
            terms: one_lakh(),
            options: ScheduleOptions::default(),
            include_schedule: false,
        };
        let out = calculate_emi(&input).unwrap();
        assert!(out.result.schedule.is_none());
        assert_eq!(out.result.installment, dec!(8885));
        assert_eq!(out.result.monthly_rate, dec!(0.01));
        assert_eq!(out.result.summary.total_payable, dec!(106620));
        assert_eq!(out.result.summary.total_interest, dec!(6620));
    }

    #[test]
    fn test_calculate_emi_flags_overpayment() {
        let input = EmiInput {
            terms: one_lakh(),
            options: ScheduleOptions::default(),
            include_schedule: true,
        };
        let out = calculate_emi(&input).unwrap();
        let schedule = out.result.schedule.as_ref().unwrap();
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[11].closing_balance, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("overpays")));
    }
}
