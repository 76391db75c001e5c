use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use microlend_core::emi::ScheduleOptions;
use microlend_core::sensitivity::grid::{emi_sensitivity, EmiSensitivityInput};
use microlend_core::SensitivityVariable;

use crate::input;

/// Arguments for an installment grid over rate and tenure
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Lowest annual rate in percent
    #[arg(long)]
    pub rate_min: Option<Decimal>,

    /// Highest annual rate in percent
    #[arg(long)]
    pub rate_max: Option<Decimal>,

    /// Rate increment in percentage points
    #[arg(long)]
    pub rate_step: Option<Decimal>,

    /// Shortest tenure in months
    #[arg(long)]
    pub tenure_min: Option<Decimal>,

    /// Longest tenure in months
    #[arg(long)]
    pub tenure_max: Option<Decimal>,

    /// Tenure increment in months
    #[arg(long)]
    pub tenure_step: Option<Decimal>,

    /// Decimal places of the currency minor unit
    #[arg(long)]
    pub precision: Option<u32>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut grid_input: EmiSensitivityInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        EmiSensitivityInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            rate_pct: SensitivityVariable {
                name: "annual_rate_pct".into(),
                min: args.rate_min.ok_or("--rate-min is required (or provide --input)")?,
                max: args.rate_max.ok_or("--rate-max is required (or provide --input)")?,
                step: args.rate_step.unwrap_or(dec!(1)),
            },
            tenure_months: SensitivityVariable {
                name: "tenure_months".into(),
                min: args
                    .tenure_min
                    .ok_or("--tenure-min is required (or provide --input)")?,
                max: args
                    .tenure_max
                    .ok_or("--tenure-max is required (or provide --input)")?,
                step: args.tenure_step.unwrap_or(dec!(12)),
            },
            options: ScheduleOptions::default(),
        }
    };
    if let Some(p) = args.precision {
        grid_input.options.precision = p;
    }

    let result = emi_sensitivity(&grid_input)?;
    Ok(serde_json::to_value(result)?)
}
