//! Presentation helpers for amounts and rates. Kept apart from the
//! calculation so callers can format the same result for different locales.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::round_minor;
use crate::types::{Currency, Money, Percent};

/// Digit grouping convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingSystem {
    /// 12,34,567 (lakh / crore)
    #[default]
    Indian,
    /// 1,234,567
    International,
}

/// How to render a monetary amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFormat {
    pub symbol: String,
    pub numbering: NumberingSystem,
    pub decimals: u32,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        MoneyFormat::for_currency(&Currency::INR)
    }
}

impl MoneyFormat {
    pub fn for_currency(currency: &Currency) -> Self {
        let (symbol, numbering, decimals) = match currency {
            Currency::INR => ("₹".to_string(), NumberingSystem::Indian, 0),
            Currency::BDT => ("৳".to_string(), NumberingSystem::Indian, 0),
            Currency::USD => ("$".to_string(), NumberingSystem::International, 2),
            Currency::GBP => ("£".to_string(), NumberingSystem::International, 2),
            Currency::EUR => ("€".to_string(), NumberingSystem::International, 2),
            Currency::PHP => ("₱".to_string(), NumberingSystem::International, 2),
            Currency::KES => ("KSh ".to_string(), NumberingSystem::International, 2),
            Currency::Other(code) => (format!("{code} "), NumberingSystem::International, 2),
        };
        MoneyFormat {
            symbol,
            numbering,
            decimals,
        }
    }
}

fn fixed(value: Decimal, decimals: u32) -> String {
    let mut v = round_minor(value, decimals);
    v.rescale(decimals);
    v.to_string()
}

fn group_digits(digits: &str, numbering: NumberingSystem) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(len - 3);
    let group = match numbering {
        NumberingSystem::Indian => 2,
        NumberingSystem::International => 3,
    };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let begin = end.saturating_sub(group);
        groups.push(&head[begin..end]);
        end = begin;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

/// `₹8,88,500` style rendering of an amount.
pub fn format_money(amount: Money, format: &MoneyFormat) -> String {
    let text = fixed(amount.abs(), format.decimals);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if amount.is_sign_negative() && !round_minor(amount, format.decimals).is_zero() {
        out.push('-');
    }
    out.push_str(&format.symbol);
    out.push_str(&group_digits(int_part, format.numbering));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Percentage with a fixed number of decimals, e.g. `12.00%`.
pub fn format_percent(pct: Percent, decimals: u32) -> String {
    format!("{}%", fixed(pct, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_indian_grouping() {
        let f = MoneyFormat::default();
        assert_eq!(format_money(dec!(8885), &f), "₹8,885");
        assert_eq!(format_money(dec!(100000), &f), "₹1,00,000");
        assert_eq!(format_money(dec!(12345678), &f), "₹1,23,45,678");
        assert_eq!(format_money(dec!(999), &f), "₹999");
    }

    #[test]
    fn test_international_grouping_with_cents() {
        let f = MoneyFormat::for_currency(&Currency::USD);
        assert_eq!(format_money(dec!(1234567.891), &f), "$1,234,567.89");
        assert_eq!(format_money(dec!(5), &f), "$5.00");
    }

    #[test]
    fn test_negative_amounts() {
        let f = MoneyFormat::default();
        assert_eq!(format_money(dec!(-250000), &f), "-₹2,50,000");
        assert_eq!(format_money(dec!(-0.2), &f), "₹0");
    }

    #[test]
    fn test_rounds_to_whole_rupees() {
        let f = MoneyFormat::default();
        assert_eq!(format_money(dec!(8884.88), &f), "₹8,885");
    }

    #[test]
    fn test_other_currency_prefix() {
        let f = MoneyFormat::for_currency(&Currency::Other("NGN".into()));
        assert_eq!(format_money(dec!(1500), &f), "NGN 1,500.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(12), 2), "12.00%");
        assert_eq!(format_percent(dec!(10.5), 2), "10.50%");
        assert_eq!(format_percent(dec!(0.125), 1), "0.1%");
    }
}
