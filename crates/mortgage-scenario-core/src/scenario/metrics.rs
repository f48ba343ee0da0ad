use serde::{Deserialize, Serialize};

use crate::scenario::assumptions::InvestmentAssumptions;
use crate::scenario::inputs::ScenarioInputs;
use crate::types::{Money, Multiple, Rate};

/// Financing metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanMetrics {
    /// property_price - down_payment
    pub loan_amount: Money,
    /// loan / price (LTV)
    pub leverage_ratio: Rate,
    /// 1 - leverage_ratio
    pub equity_ratio: Rate,
    /// 1 / equity_ratio
    pub leverage_multiplier: Multiple,
    pub monthly_payment: Money,
    /// monthly_payment * 12 * term
    pub total_payments: Money,
    pub total_interest: Money,
    pub avg_monthly_interest: Money,
    /// Income needed to keep the payment inside the mortgage-to-income limit
    pub required_income: Money,
    /// Payment / income; absent when there is no income to measure against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mortgage_to_income_ratio: Option<Rate>,
}

/// Rental income against debt service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowMetrics {
    pub monthly_rent: Money,
    /// Recomputed rent * 12 / price
    pub rental_yield_annual: Rate,
    /// rent - monthly payment
    pub monthly_net_cash_flow: Money,
    pub annual_net_cash_flow: Money,
    /// rent - average monthly interest
    pub monthly_interest_flow: Money,
    /// Average principal repaid per month, negative as it reduces debt
    pub avg_principal_payment: Money,
    pub leveraged_rental_yield: Rate,
    pub net_leveraged_yield: Rate,
}

/// Value growth up to the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppreciationMetrics {
    pub property_appreciation: Money,
    pub urban_renewal_appreciation: Money,
    /// urban renewal value + both appreciations
    pub total_appreciation: Money,
    pub sale_value: Money,
    pub total_return_rate: Rate,
    pub annualized_return: Rate,
    pub leveraged_return: Rate,
    pub net_annual_return: Rate,
}

/// Debt settled at the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyRepaymentMetrics {
    /// Linear approximation of the outstanding schedule
    pub remaining_mortgage: Money,
    pub early_repayment_penalty: Money,
    pub total_debt_to_bank: Money,
    pub proceeds_minus_debt: Money,
    /// Pre-tax gain over the down payment
    pub net_gain_property: Money,
}

/// Purchase and sale taxation of the property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxMetrics {
    pub jurisdiction: String,
    pub tax_year: i32,
    pub purchase_tax: Money,
    pub purchase_tax_rate: Rate,
    /// sale - price - purchase tax - improvements (may be negative)
    pub capital_gain: Money,
    pub capital_gains_tax: Money,
    pub total_taxes: Money,
    pub property_profit_after_tax: Money,
}

/// The alternative: keep the cash invested instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub cash_in_portfolio: Money,
    /// Value of the initial cash at the sale date
    pub portfolio_initial_growth: Money,
    pub monthly_deposits: Money,
    pub accumulated_deposits: Money,
    pub total_portfolio_value: Money,
    /// Initial cash plus every deposit
    pub total_contributions: Money,
    pub portfolio_gain: Money,
    pub portfolio_tax: Money,
    pub portfolio_after_tax: Money,
    pub net_portfolio_profit: Money,
}

/// Everything one scenario evaluation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub inputs: ScenarioInputs,
    pub assumptions: InvestmentAssumptions,
    pub loan: LoanMetrics,
    pub cash_flow: CashFlowMetrics,
    pub appreciation: AppreciationMetrics,
    pub early_repayment: EarlyRepaymentMetrics,
    pub tax: TaxMetrics,
    pub portfolio: PortfolioMetrics,
    /// down payment + purchase tax
    pub initial_investment: Money,
    /// Property proceeds after sale tax + portfolio after tax
    pub total_value_at_sale: Money,
    pub total_profit: Money,
    /// `(total_value_at_sale / initial_investment)^(1/years) - 1`; `None` when the
    /// total value at sale is not positive, where no annual rate exists
    pub annual_return: Option<Rate>,
    pub is_valid: bool,
    pub validation_errors: Vec<String>,
}
