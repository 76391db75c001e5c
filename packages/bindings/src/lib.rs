use napi::Result as NapiResult;
use napi_derive::napi;

use microlend_core::display::{format_money as render_money, MoneyFormat};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// EMI
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let input: microlend_core::emi::EmiInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = microlend_core::emi::calculate_emi(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Same as `calculate_emi` but always returns the period-by-period schedule.
#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let mut input: microlend_core::emi::EmiInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    input.include_schedule = true;
    let output = microlend_core::emi::calculate_emi(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan account
// ---------------------------------------------------------------------------

#[napi]
pub fn restructure_preview(input_json: String) -> NapiResult<String> {
    let input: microlend_core::restructuring::preview::RestructureInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = microlend_core::restructuring::preview::preview_restructure(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn emi_sensitivity(input_json: String) -> NapiResult<String> {
    let input: microlend_core::sensitivity::grid::EmiSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        microlend_core::sensitivity::grid::emi_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Render an amount. `format_json` is a MoneyFormat; empty means rupees with
/// Indian grouping.
#[napi]
pub fn format_money(amount: String, format_json: Option<String>) -> NapiResult<String> {
    let amount: rust_decimal::Decimal = amount.trim().parse().map_err(to_napi_error)?;
    let format: MoneyFormat = match format_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => serde_json::from_str(json).map_err(to_napi_error)?,
        _ => MoneyFormat::default(),
    };
    Ok(render_money(amount, &format))
}
