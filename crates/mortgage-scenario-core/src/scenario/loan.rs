use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::error::CalcError;
use crate::scenario::assumptions::{InvestmentAssumptions, InvestmentRestrictions};
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::metrics::LoanMetrics;
use crate::time_value::{checked_div, checked_mul, growth_factor, months, MAX_COMPOUNDED_VALUE};
use crate::types::{Money, Rate};
use crate::CalcResult;

pub fn calculate_loan_metrics(
    inputs: &ScenarioInputs,
    assumptions: &InvestmentAssumptions,
    restrictions: &InvestmentRestrictions,
) -> CalcResult<LoanMetrics> {
    let price = inputs.property_price();
    let loan_amount = inputs.loan_amount();

    let leverage_ratio = loan_amount / price;
    let equity_ratio = Decimal::ONE - leverage_ratio;
    if equity_ratio <= Decimal::ZERO {
        return Err(CalcError::FinancialImpossibility(format!(
            "undefined leverage: equity ratio {equity_ratio} (100% or more financed)"
        )));
    }
    let leverage_multiplier = Decimal::ONE / equity_ratio;

    let total_months = months(inputs.mortgage_term_years())?;
    let monthly_payment = monthly_payment(loan_amount, assumptions.mortgage_rate, total_months)?;

    let payment_count = Decimal::from(total_months);
    let total_payments = monthly_payment * payment_count;
    let total_interest = total_payments - loan_amount;
    let avg_monthly_interest = total_interest / payment_count;

    let required_income = checked_div(
        monthly_payment,
        restrictions.max_mortgage_to_income_ratio,
        "required income (payment / max_mortgage_to_income_ratio)",
    )?;

    let income = inputs.income_for_affordability();
    let mortgage_to_income_ratio = if income > Decimal::ZERO {
        Some(checked_div(monthly_payment, income, "mortgage-to-income ratio")?)
    } else {
        None
    };

    debug!(
        %loan_amount,
        ltv = %leverage_ratio.round_dp(4),
        %monthly_payment,
        "loan metrics"
    );

    Ok(LoanMetrics {
        loan_amount,
        leverage_ratio,
        equity_ratio,
        leverage_multiplier,
        monthly_payment,
        total_payments,
        total_interest,
        avg_monthly_interest,
        required_income,
        mortgage_to_income_ratio,
    })
}

/// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1), r = annual / 12.
pub fn monthly_payment(principal: Money, annual_rate: Rate, total_months: u32) -> CalcResult<Money> {
    if total_months == 0 {
        return Err(CalcError::InvalidInput {
            field: "total_months".into(),
            reason: "Number of payments must be > 0".into(),
        });
    }

    let monthly_rate = annual_rate / dec!(12);
    if monthly_rate.is_zero() {
        // Interest-free: straight-line amortisation
        return Ok(principal / Decimal::from(total_months));
    }

    let compound = growth_factor(monthly_rate, total_months)?;
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    const CONTEXT: &str = "mortgage payment";
    let interest = checked_mul(principal, monthly_rate, CONTEXT)?;
    let payment = checked_div(checked_mul(interest, compound, CONTEXT)?, denominator, CONTEXT)?;
    if payment.abs() > MAX_COMPOUNDED_VALUE {
        return Err(CalcError::Overflow {
            context: format!("{CONTEXT} exceeds {MAX_COMPOUNDED_VALUE}"),
        });
    }
    Ok(payment)
}
