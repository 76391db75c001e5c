use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::emi::{compute_summary, generate_schedule, AmortizationPeriod, LoanTerms, ScheduleOptions};
use crate::error::LendingError;
use crate::types::*;
use crate::LendingResult;

/// Changes requested for a running loan. Unset fields keep the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RestructureProposal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_annual_rate_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_tenure: Option<Tenure>,
    /// Lump sum paid down before the new schedule starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_payment: Option<Money>,
}

/// Input for a restructuring preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestructureInput {
    pub outstanding_principal: Money,
    pub current_annual_rate_pct: Percent,
    pub remaining_tenure: Tenure,
    #[serde(default)]
    pub proposal: RestructureProposal,
    #[serde(default)]
    pub options: ScheduleOptions,
}

/// Headline figures of one repayment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub tenure_months: u32,
    pub installment: Money,
    pub total_payable: Money,
    pub total_interest: Money,
}

/// Side-by-side comparison of the current and proposed plans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestructureOutput {
    pub current: PlanSnapshot,
    pub proposed: PlanSnapshot,
    pub part_payment: Money,
    /// proposed - current
    pub installment_change: Money,
    /// proposed - current; negative is a saving
    pub interest_change: Money,
    pub tenure_change_months: i64,
    pub proposed_schedule: Vec<AmortizationPeriod>,
}

fn snapshot(
    terms: &LoanTerms,
    options: &ScheduleOptions,
) -> LendingResult<(PlanSnapshot, Vec<AmortizationPeriod>)> {
    let schedule = generate_schedule(terms, options)?;
    let summary = compute_summary(terms.principal, &schedule)?;
    let snap = PlanSnapshot {
        principal: terms.principal,
        annual_rate_pct: terms.annual_rate_pct,
        tenure_months: summary.tenure_months,
        installment: schedule[0].installment,
        total_payable: summary.total_payable,
        total_interest: summary.total_interest,
    };
    Ok((snap, schedule))
}

/// Preview a change of rate, tenure or a part payment on an outstanding loan.
pub fn preview_restructure(
    input: &RestructureInput,
) -> LendingResult<ComputationOutput<RestructureOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let current_terms = LoanTerms::new(
        input.outstanding_principal,
        input.current_annual_rate_pct,
        input.remaining_tenure,
    );
    let (current, _) = snapshot(&current_terms, &input.options)?;

    let part_payment = input.proposal.part_payment.unwrap_or(Decimal::ZERO);
    if part_payment < Decimal::ZERO {
        return Err(LendingError::invalid(
            "part_payment",
            "Part payment cannot be negative",
        ));
    }
    if part_payment >= input.outstanding_principal {
        return Err(LendingError::invalid(
            "part_payment",
            "Part payment must be less than the outstanding principal; a full repayment is a foreclosure",
        ));
    }

    let proposed_terms = LoanTerms::new(
        input.outstanding_principal - part_payment,
        input
            .proposal
            .new_annual_rate_pct
            .unwrap_or(input.current_annual_rate_pct),
        input.proposal.new_tenure.unwrap_or(input.remaining_tenure),
    );
    debug!(
        outstanding = %input.outstanding_principal,
        %part_payment,
        rate = %proposed_terms.annual_rate_pct,
        "previewing restructure"
    );
    let (proposed, proposed_schedule) = snapshot(&proposed_terms, &input.options)?;

    if part_payment.is_zero()
        && proposed.annual_rate_pct == current.annual_rate_pct
        && proposed.tenure_months == current.tenure_months
    {
        warnings.push("Proposal leaves the loan terms unchanged".into());
    }

    let interest_change = proposed.total_interest - current.total_interest;
    if interest_change > Decimal::ZERO {
        warnings.push(format!(
            "Proposed plan costs {interest_change} more in interest than the current plan"
        ));
    }

    let output = RestructureOutput {
        installment_change: proposed.installment - current.installment,
        interest_change,
        tenure_change_months: i64::from(proposed.tenure_months) - i64::from(current.tenure_months),
        part_payment,
        current,
        proposed,
        proposed_schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan restructure preview (reducing-balance EMI)",
        &serde_json::json!({
            "outstanding_principal": input.outstanding_principal.to_string(),
            "current_annual_rate_pct": input.current_annual_rate_pct.to_string(),
            "proposal": input.proposal,
        }),
        warnings,
        elapsed,
        output,
    ))
}
