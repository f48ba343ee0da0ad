use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::scenario::assumptions::InvestmentAssumptions;
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::metrics::{AppreciationMetrics, EarlyRepaymentMetrics, LoanMetrics};
use crate::time_value::{months, pv};
use crate::CalcResult;

/// Debt owed to the bank when the property is sold before the mortgage ends.
///
/// The outstanding balance is a linear share of the total scheduled payments,
/// `(term - years) / term * total_payments`, not the amortization-schedule
/// principal. The penalty is the rate differential on the remaining payments:
/// `PV(mortgage_rate) - PV(early_repayment_rate)`, floored at zero.
pub fn calculate_early_repayment(
    inputs: &ScenarioInputs,
    assumptions: &InvestmentAssumptions,
    loan: &LoanMetrics,
    appreciation: &AppreciationMetrics,
) -> CalcResult<EarlyRepaymentMetrics> {
    let term = inputs.mortgage_term_years();
    let years = inputs.years_until_sale();
    let sale_value = appreciation.sale_value;
    let down_payment = inputs.down_payment();

    if loan.loan_amount <= Decimal::ZERO || years >= term {
        return Ok(EarlyRepaymentMetrics {
            remaining_mortgage: Decimal::ZERO,
            early_repayment_penalty: Decimal::ZERO,
            total_debt_to_bank: Decimal::ZERO,
            proceeds_minus_debt: sale_value,
            net_gain_property: sale_value - down_payment,
        });
    }

    let remaining_years = term - years;
    let remaining_ratio = Decimal::from(remaining_years) / Decimal::from(term);
    let remaining_mortgage = remaining_ratio * loan.total_payments;

    let remaining_months = months(remaining_years)?;
    let pv_contract = pv(
        assumptions.mortgage_rate / dec!(12),
        remaining_months,
        loan.monthly_payment,
        Decimal::ZERO,
    )?;
    let pv_market = pv(
        assumptions.early_repayment_rate / dec!(12),
        remaining_months,
        loan.monthly_payment,
        Decimal::ZERO,
    )?;
    let early_repayment_penalty = (pv_contract - pv_market).max(Decimal::ZERO);

    let total_debt_to_bank = remaining_mortgage + early_repayment_penalty;
    let proceeds_minus_debt = sale_value - total_debt_to_bank;
    let net_gain_property = proceeds_minus_debt - down_payment;

    debug!(
        %remaining_mortgage,
        penalty = %early_repayment_penalty.round_dp(2),
        "early repayment"
    );

    Ok(EarlyRepaymentMetrics {
        remaining_mortgage,
        early_repayment_penalty,
        total_debt_to_bank,
        proceeds_minus_debt,
        net_gain_property,
    })
}
