//! Reducing-balance EMI calculation and amortisation schedules.

pub mod calculator;
pub mod terms;

pub use calculator::{
    calculate_emi, compute_installment, compute_summary, generate_schedule, AmortizationPeriod,
    AmortizationSummary, EmiInput, EmiOutput,
};
pub use terms::{LoanTerms, RoundingPolicy, ScheduleOptions};
