use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::scenario::assumptions::InvestmentAssumptions;
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::metrics::{CashFlowMetrics, PortfolioMetrics};
use crate::time_value::{compound_value, fv, months};
use crate::CalcResult;

/// The cash not put into the property, plus the monthly surplus (budget plus
/// rental cash flow), invested at the portfolio rate until the sale date.
///
/// Gains are taxed at the capital-gains rate only when positive.
pub fn calculate_portfolio(
    inputs: &ScenarioInputs,
    assumptions: &InvestmentAssumptions,
    cash_flow: &CashFlowMetrics,
) -> CalcResult<PortfolioMetrics> {
    let years = inputs.years_until_sale();
    let rate = assumptions.portfolio_return_rate;

    let cash_in_portfolio = inputs.available_cash() - inputs.down_payment();
    let portfolio_initial_growth = compound_value(cash_in_portfolio, rate, years)?;

    let monthly_deposits = inputs.monthly_available() + cash_flow.monthly_net_cash_flow;
    let deposit_count = months(years)?;
    let accumulated_deposits =
        fv(rate / dec!(12), deposit_count, -monthly_deposits, Decimal::ZERO)?;

    let total_portfolio_value = portfolio_initial_growth + accumulated_deposits;
    let total_contributions = cash_in_portfolio + monthly_deposits * Decimal::from(deposit_count);

    let portfolio_gain = total_portfolio_value - total_contributions;
    let portfolio_tax = portfolio_gain.max(Decimal::ZERO) * assumptions.capital_gains_tax_rate;
    let portfolio_after_tax = total_portfolio_value - portfolio_tax;
    let net_portfolio_profit = portfolio_after_tax - total_contributions;

    debug!(
        %cash_in_portfolio,
        %monthly_deposits,
        total = %total_portfolio_value.round_dp(2),
        "portfolio"
    );

    Ok(PortfolioMetrics {
        cash_in_portfolio,
        portfolio_initial_growth,
        monthly_deposits,
        accumulated_deposits,
        total_portfolio_value,
        total_contributions,
        portfolio_gain,
        portfolio_tax,
        portfolio_after_tax,
        net_portfolio_profit,
    })
}
