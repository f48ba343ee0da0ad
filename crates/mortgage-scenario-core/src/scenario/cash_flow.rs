use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::scenario::assumptions::InvestmentAssumptions;
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::metrics::{CashFlowMetrics, LoanMetrics};
use crate::time_value::{checked_mul, months};
use crate::CalcResult;

/// Largest drift tolerated between the recomputed yield and the assumption.
const YIELD_TOLERANCE: Decimal = dec!(0.000000000001);

pub fn calculate_cash_flow(
    inputs: &ScenarioInputs,
    assumptions: &InvestmentAssumptions,
    loan: &LoanMetrics,
    warnings: &mut Vec<String>,
) -> CalcResult<CashFlowMetrics> {
    let price = inputs.property_price();
    let monthly_rent = price * assumptions.rental_yield / dec!(12);

    let rental_yield_annual = monthly_rent * dec!(12) / price;
    if (rental_yield_annual - assumptions.rental_yield).abs() > YIELD_TOLERANCE {
        warnings.push(format!(
            "Recomputed rental yield {rental_yield_annual} differs from assumption {}",
            assumptions.rental_yield
        ));
    }

    let monthly_net_cash_flow = monthly_rent - loan.monthly_payment;
    let monthly_interest_flow = monthly_rent - loan.avg_monthly_interest;

    let avg_principal_payment = if loan.loan_amount > Decimal::ZERO {
        -loan.loan_amount / Decimal::from(months(inputs.mortgage_term_years())?)
    } else {
        Decimal::ZERO
    };

    let leveraged_rental_yield = checked_mul(
        rental_yield_annual,
        loan.leverage_multiplier,
        "leveraged rental yield",
    )?;
    let net_leveraged_yield = if loan.loan_amount > Decimal::ZERO {
        leveraged_rental_yield - assumptions.mortgage_rate
    } else {
        leveraged_rental_yield
    };

    debug!(%monthly_rent, %monthly_net_cash_flow, "cash flow");

    Ok(CashFlowMetrics {
        monthly_rent,
        rental_yield_annual,
        monthly_net_cash_flow,
        annual_net_cash_flow: monthly_net_cash_flow * dec!(12),
        monthly_interest_flow,
        avg_principal_payment,
        leveraged_rental_yield,
        net_leveraged_yield,
    })
}
