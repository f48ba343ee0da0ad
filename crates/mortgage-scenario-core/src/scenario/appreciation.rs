use rust_decimal::Decimal;
use tracing::debug;

use crate::scenario::assumptions::InvestmentAssumptions;
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::metrics::{AppreciationMetrics, CashFlowMetrics, LoanMetrics};
use crate::time_value::{annualized_return, checked_div, checked_mul, compound_growth};
use crate::CalcResult;

pub fn calculate_appreciation(
    inputs: &ScenarioInputs,
    assumptions: &InvestmentAssumptions,
    loan: &LoanMetrics,
    cash_flow: &CashFlowMetrics,
) -> CalcResult<AppreciationMetrics> {
    let years = inputs.years_until_sale();
    let price = inputs.property_price();
    let urban_renewal_value = inputs.urban_renewal_value();

    let property_appreciation = compound_growth(price, assumptions.appreciation_rate, years)?;
    let urban_renewal_appreciation =
        compound_growth(urban_renewal_value, assumptions.appreciation_rate, years)?;

    // The renewal uplift is realised in full and then appreciates with the property.
    let total_appreciation =
        urban_renewal_value + property_appreciation + urban_renewal_appreciation;
    let sale_value = price + total_appreciation;

    let total_return_rate = checked_div(sale_value, price, "total return")? - Decimal::ONE;
    let annualized_return = annualized_return(Decimal::ONE + total_return_rate, years)?;
    let leveraged_return =
        checked_mul(annualized_return, loan.leverage_multiplier, "leveraged return")?;

    let net_annual_return = if loan.loan_amount > Decimal::ZERO {
        leveraged_return + cash_flow.leveraged_rental_yield - assumptions.mortgage_rate
    } else {
        leveraged_return + cash_flow.leveraged_rental_yield
    };

    debug!(%sale_value, annualized = %annualized_return.round_dp(6), "appreciation");

    Ok(AppreciationMetrics {
        property_appreciation,
        urban_renewal_appreciation,
        total_appreciation,
        sale_value,
        total_return_rate,
        annualized_return,
        leveraged_return,
        net_annual_return,
    })
}
