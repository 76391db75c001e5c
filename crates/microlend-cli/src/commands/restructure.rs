use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use microlend_core::emi::ScheduleOptions;
use microlend_core::restructuring::preview::{
    preview_restructure, RestructureInput, RestructureProposal,
};
use microlend_core::Tenure;

use super::emi::ScheduleOptionArgs;
use crate::input;

/// Arguments for a restructuring preview. Tenures given as flags are in months.
#[derive(Args)]
pub struct RestructureArgs {
    /// Path to JSON or YAML input file (overrides individual loan flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding principal on the loan account
    #[arg(long)]
    pub outstanding: Option<Decimal>,

    /// Current annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Remaining tenure in months
    #[arg(long)]
    pub remaining_tenure: Option<u32>,

    /// Proposed annual interest rate in percent
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Proposed tenure in months
    #[arg(long)]
    pub new_tenure: Option<u32>,

    /// Lump sum paid before the new schedule starts
    #[arg(long)]
    pub part_payment: Option<Decimal>,

    #[command(flatten)]
    pub schedule: ScheduleOptionArgs,
}

pub fn run_restructure(args: RestructureArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut restructure_input: RestructureInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        RestructureInput {
            outstanding_principal: args
                .outstanding
                .ok_or("--outstanding is required (or provide --input)")?,
            current_annual_rate_pct: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            remaining_tenure: Tenure::months(
                args.remaining_tenure
                    .ok_or("--remaining-tenure is required (or provide --input)")?,
            ),
            proposal: RestructureProposal {
                new_annual_rate_pct: args.new_rate,
                new_tenure: args.new_tenure.map(Tenure::months),
                part_payment: args.part_payment,
            },
            options: ScheduleOptions::default(),
        }
    };
    args.schedule.apply(&mut restructure_input.options);

    let result = preview_restructure(&restructure_input)?;
    Ok(serde_json::to_value(result)?)
}
