use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CalcError;
use crate::types::{Money, Rate, Years};
use crate::CalcResult;

/// Largest magnitude a compounded or discounted amount may reach (10^24).
pub const MAX_COMPOUNDED_VALUE: Money = dec!(1_000_000_000_000_000_000_000_000);

/// `(1 + rate)^periods`, guarded against overflow.
pub fn growth_factor(rate: Rate, periods: u32) -> CalcResult<Decimal> {
    if rate <= -Decimal::ONE {
        return Err(CalcError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }

    (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| CalcError::Overflow {
            context: format!("growth factor (1 + {rate})^{periods}"),
        })
}

/// Number of monthly periods in `years`.
pub fn months(years: Years) -> CalcResult<u32> {
    years.checked_mul(12).ok_or_else(|| CalcError::Overflow {
        context: format!("{years} years in months"),
    })
}

/// `lhs * rhs`, reporting an unrepresentable product instead of panicking.
pub fn checked_mul(lhs: Decimal, rhs: Decimal, context: &str) -> CalcResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| CalcError::Overflow {
        context: context.into(),
    })
}

/// `lhs / rhs`; a zero divisor and an unrepresentable quotient are both errors.
pub fn checked_div(lhs: Decimal, rhs: Decimal, context: &str) -> CalcResult<Decimal> {
    if rhs.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: context.into(),
        });
    }
    lhs.checked_div(rhs).ok_or_else(|| CalcError::Overflow {
        context: context.into(),
    })
}

/// Reject amounts beyond [`MAX_COMPOUNDED_VALUE`].
fn bounded(value: Money, context: &str) -> CalcResult<Money> {
    if value.abs() > MAX_COMPOUNDED_VALUE {
        return Err(CalcError::Overflow {
            context: format!("{context} exceeds {MAX_COMPOUNDED_VALUE}"),
        });
    }
    Ok(value)
}

/// Present Value (Excel sign convention: a positive payment stream has a negative PV).
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> CalcResult<Money> {
    const CONTEXT: &str = "present value";
    if rate.is_zero() {
        let payments = bounded(checked_mul(pmt, Decimal::from(nper), CONTEXT)?, CONTEXT)?;
        return bounded(-(payments + fv), CONTEXT);
    }

    let factor = growth_factor(rate, nper)?;
    let discount = checked_div(Decimal::ONE, factor, "PV factor")?;
    let annuity_factor = checked_div(Decimal::ONE - discount, rate, CONTEXT)?;

    let annuity = bounded(checked_mul(pmt, annuity_factor, CONTEXT)?, CONTEXT)?;
    let discounted_fv = bounded(checked_div(fv, factor, CONTEXT)?, CONTEXT)?;
    Ok(-(annuity + discounted_fv))
}

/// Future Value (Excel sign convention: deposits are negative, the accumulated value positive).
pub fn fv(rate: Rate, nper: u32, pmt: Money, present_value: Money) -> CalcResult<Money> {
    const CONTEXT: &str = "future value";
    if rate.is_zero() {
        let payments = bounded(checked_mul(pmt, Decimal::from(nper), CONTEXT)?, CONTEXT)?;
        return bounded(-(present_value + payments), CONTEXT);
    }

    let factor = growth_factor(rate, nper)?;
    let annuity_factor = checked_div(factor - Decimal::ONE, rate, CONTEXT)?;

    let grown = bounded(checked_mul(present_value, factor, CONTEXT)?, CONTEXT)?;
    let annuity = bounded(checked_mul(pmt, annuity_factor, CONTEXT)?, CONTEXT)?;
    Ok(-(grown + annuity))
}

/// Value of `principal` after compounding annually at `rate` for `years`.
pub fn compound_value(principal: Money, rate: Rate, years: Years) -> CalcResult<Money> {
    const CONTEXT: &str = "compounded value";
    let factor = growth_factor(rate, years)?;
    bounded(checked_mul(principal, factor, CONTEXT)?, CONTEXT)
}

/// Growth only: `principal * ((1 + rate)^years - 1)`.
pub fn compound_growth(principal: Money, rate: Rate, years: Years) -> CalcResult<Money> {
    const CONTEXT: &str = "compound growth";
    let factor = growth_factor(rate, years)?;
    bounded(checked_mul(principal, factor - Decimal::ONE, CONTEXT)?, CONTEXT)
}

/// Geometric annual rate that turns 1 into `growth_multiple` over `years`.
///
/// `years == 0` has no annual equivalent and `growth_multiple <= 0` has no real
/// root; both are reported as financial impossibilities.
pub fn annualized_return(growth_multiple: Decimal, years: Years) -> CalcResult<Rate> {
    if years == 0 {
        return Err(CalcError::FinancialImpossibility(
            "cannot annualize a return over a zero-year horizon".into(),
        ));
    }
    if growth_multiple <= Decimal::ZERO {
        return Err(CalcError::FinancialImpossibility(format!(
            "cannot annualize a non-positive growth multiple ({growth_multiple})"
        )));
    }
    if years == 1 {
        return Ok(growth_multiple - Decimal::ONE);
    }

    let exponent = Decimal::ONE / Decimal::from(years);
    let root = growth_multiple
        .checked_powd(exponent)
        .ok_or_else(|| CalcError::Overflow {
            context: format!("annualizing {growth_multiple} over {years} years"),
        })?;

    Ok(root - Decimal::ONE)
}
