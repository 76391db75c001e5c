use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LendingError;
use crate::types::{Money, Percent, Rate};
use crate::LendingResult;

const MONTHS_PER_YEAR_PCT: Decimal = dec!(1200);

/// Periodic (monthly) rate for a nominal annual percentage.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / MONTHS_PER_YEAR_PCT
}

/// Round to `dp` decimal places, halves away from zero.
pub fn round_minor(amount: Money, dp: u32) -> Money {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// (1 + r)^n, or `NotComputable` when it leaves the decimal range.
pub fn growth_factor(rate: Rate, periods: u32) -> LendingResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            LendingError::not_computable(format!(
                "(1 + {rate})^{periods} exceeds decimal range"
            ))
        })
}

/// Level payment that amortises `principal` over `periods` at `rate`. Unrounded.
pub fn annuity_installment(principal: Money, rate: Rate, periods: u32) -> LendingResult<Money> {
    if periods == 0 {
        return Err(LendingError::invalid(
            "periods",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = growth_factor(rate, periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LendingError::not_computable(
            "annuity denominator (1 + r)^n - 1 is zero",
        ));
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| LendingError::not_computable("annuity installment overflow"))
}

/// Remaining principal after `periods_paid` level installments, closed form.
pub fn outstanding_after(
    principal: Money,
    rate: Rate,
    installment: Money,
    periods_paid: u32,
) -> LendingResult<Money> {
    let k = Decimal::from(periods_paid);
    let balance = if rate.is_zero() {
        principal - installment * k
    } else {
        let factor = growth_factor(rate, periods_paid)?;
        principal * factor - installment * (factor - Decimal::ONE) / rate
    };
    Ok(balance.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(10.5)), dec!(0.00875));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_round_minor_half_away_from_zero() {
        assert_eq!(round_minor(dec!(8884.5), 0), dec!(8885));
        assert_eq!(round_minor(dec!(8884.49), 0), dec!(8884));
        assert_eq!(round_minor(dec!(12.345), 2), dec!(12.35));
    }

    #[test]
    fn test_growth_factor() {
        assert_eq!(growth_factor(dec!(0.01), 2).unwrap(), dec!(1.0201));
        assert_eq!(growth_factor(dec!(0.05), 0).unwrap(), Decimal::ONE);
        assert_eq!(
            growth_factor(dec!(0.01), 12).unwrap(),
            dec!(1.126825030131969720661201)
        );
    }

    #[test]
    fn test_growth_factor_overflow() {
        let err = growth_factor(dec!(0.5), 400).unwrap_err();
        assert!(matches!(err, LendingError::NotComputable { .. }));
    }

    #[test]
    fn test_annuity_installment_one_lakh() {
        let emi = annuity_installment(dec!(100000), dec!(0.01), 12).unwrap();
        // 100000 * 0.01 * 1.01^12 / (1.01^12 - 1) ≈ 8884.88
        assert!((emi - dec!(8884.88)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_installment_zero_rate() {
        let emi = annuity_installment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(emi, dec!(100));
    }

    #[test]
    fn test_annuity_installment_zero_periods() {
        assert!(annuity_installment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_outstanding_after_full_term_is_zero() {
        let emi = annuity_installment(dec!(100000), dec!(0.01), 12).unwrap();
        let remaining = outstanding_after(dec!(100000), dec!(0.01), emi, 12).unwrap();
        assert!(remaining < dec!(0.0001));
    }

    #[test]
    fn test_outstanding_after_zero_rate() {
        let remaining = outstanding_after(dec!(1000), Decimal::ZERO, dec!(100), 4).unwrap();
        assert_eq!(remaining, dec!(600));
    }
}
