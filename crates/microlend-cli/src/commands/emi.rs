use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use microlend_core::display::{format_money, format_percent, MoneyFormat};
use microlend_core::emi::{calculate_emi, EmiInput, EmiOutput, LoanTerms, RoundingPolicy, ScheduleOptions};
use microlend_core::{Currency, Tenure, TenureUnit};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TenureUnitArg {
    Months,
    Years,
}

impl From<TenureUnitArg> for TenureUnit {
    fn from(u: TenureUnitArg) -> Self {
        match u {
            TenureUnitArg::Months => TenureUnit::Months,
            TenureUnitArg::Years => TenureUnit::Years,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoundingArg {
    PerPeriod,
    SettleFinalPeriod,
}

impl From<RoundingArg> for RoundingPolicy {
    fn from(r: RoundingArg) -> Self {
        match r {
            RoundingArg::PerPeriod => RoundingPolicy::PerPeriod,
            RoundingArg::SettleFinalPeriod => RoundingPolicy::SettleFinalPeriod,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CurrencyArg {
    Inr,
    Bdt,
    Usd,
    Gbp,
    Eur,
    Kes,
    Php,
}

impl From<CurrencyArg> for Currency {
    fn from(c: CurrencyArg) -> Self {
        match c {
            CurrencyArg::Inr => Currency::INR,
            CurrencyArg::Bdt => Currency::BDT,
            CurrencyArg::Usd => Currency::USD,
            CurrencyArg::Gbp => Currency::GBP,
            CurrencyArg::Eur => Currency::EUR,
            CurrencyArg::Kes => Currency::KES,
            CurrencyArg::Php => Currency::PHP,
        }
    }
}

/// Rounding and date settings shared by every schedule-producing command.
/// When given, these override the `options` block of an input file.
#[derive(Args)]
pub struct ScheduleOptionArgs {
    /// Decimal places of the currency minor unit (0 = whole units)
    #[arg(long)]
    pub precision: Option<u32>,

    /// How rounding residue is handled at the end of the schedule
    #[arg(long, value_enum)]
    pub rounding: Option<RoundingArg>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_due_date: Option<NaiveDate>,
}

impl ScheduleOptionArgs {
    pub fn apply(&self, options: &mut ScheduleOptions) {
        if let Some(p) = self.precision {
            options.precision = p;
        }
        if let Some(r) = self.rounding {
            options.rounding = r.into();
        }
        if self.first_due_date.is_some() {
            options.first_due_date = self.first_due_date;
        }
    }
}

/// Arguments for EMI and schedule calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON or YAML input file (overrides individual loan flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (12 = 12% p.a.)
    #[arg(long, alias = "rate-pct")]
    pub rate: Option<Decimal>,

    /// Tenure, in --tenure-unit
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Unit of --tenure
    #[arg(long, value_enum, default_value = "months")]
    pub tenure_unit: TenureUnitArg,

    #[command(flatten)]
    pub schedule: ScheduleOptionArgs,

    /// Add human-readable formatted amounts to the output
    #[arg(long)]
    pub display: bool,

    /// Currency used for --display formatting
    #[arg(long, value_enum, default_value = "inr")]
    pub currency: CurrencyArg,
}

fn load_emi_input(args: &EmiArgs) -> Result<EmiInput, Box<dyn std::error::Error>> {
    let mut emi_input: EmiInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        EmiInput {
            terms: LoanTerms::new(
                args.principal
                    .ok_or("--principal is required (or provide --input)")?,
                args.rate.ok_or("--rate is required (or provide --input)")?,
                Tenure {
                    value: args.tenure.ok_or("--tenure is required (or provide --input)")?,
                    unit: args.tenure_unit.into(),
                },
            ),
            options: ScheduleOptions::default(),
            include_schedule: false,
        }
    };
    args.schedule.apply(&mut emi_input.options);
    Ok(emi_input)
}

fn display_block(input: &EmiInput, out: &EmiOutput, currency: CurrencyArg) -> Value {
    let fmt = MoneyFormat::for_currency(&currency.into());
    json!({
        "installment": format_money(out.installment, &fmt),
        "total_payable": format_money(out.summary.total_payable, &fmt),
        "total_interest": format_money(out.summary.total_interest, &fmt),
        "annual_rate": format_percent(input.terms.annual_rate_pct, 2),
    })
}

fn run(args: EmiArgs, include_schedule: bool) -> Result<Value, Box<dyn std::error::Error>> {
    let mut emi_input = load_emi_input(&args)?;
    emi_input.include_schedule = include_schedule;

    let output = calculate_emi(&emi_input)?;
    let display = args
        .display
        .then(|| display_block(&emi_input, &output.result, args.currency));

    let mut value = serde_json::to_value(output)?;
    if let (Some(block), Some(Value::Object(result))) = (display, value.get_mut("result")) {
        result.insert("display".into(), block);
    }
    Ok(value)
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run(args, false)
}

pub fn run_schedule(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run(args, true)
}
