use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::scenario::assumptions::InvestmentRestrictions;
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::metrics::{CashFlowMetrics, LoanMetrics};

/// Check a scenario against the lending restrictions.
///
/// Every rule is evaluated; the returned messages keep rule order (down
/// payment, loan-to-value, mortgage-to-income, cash flow, urban renewal).
/// An empty list means the scenario is valid.
pub fn validate_scenario(
    inputs: &ScenarioInputs,
    restrictions: &InvestmentRestrictions,
    loan: &LoanMetrics,
    cash_flow: &CashFlowMetrics,
) -> Vec<String> {
    let mut errors = Vec::new();
    let price = inputs.property_price();

    let down_payment_pct = inputs.down_payment() / price;
    if down_payment_pct < restrictions.min_down_payment_percentage {
        errors.push(format!(
            "Down payment {:.1}% is below minimum {:.1}%",
            percent(down_payment_pct),
            percent(restrictions.min_down_payment_percentage)
        ));
    }

    if loan.leverage_ratio > restrictions.max_loan_to_value {
        errors.push(format!(
            "Loan-to-value {:.1}% exceeds maximum {:.1}%",
            percent(loan.leverage_ratio),
            percent(restrictions.max_loan_to_value)
        ));
    }

    let income = inputs.income_for_affordability();
    match loan.mortgage_to_income_ratio {
        Some(ratio) if ratio > restrictions.max_mortgage_to_income_ratio => {
            errors.push(format!(
                "Mortgage payment {:.1}% of income exceeds maximum {:.1}% (payment: {:.0}, income: {:.0})",
                percent(ratio),
                percent(restrictions.max_mortgage_to_income_ratio),
                loan.monthly_payment,
                income
            ));
        }
        None if loan.monthly_payment > Decimal::ZERO => {
            errors.push(format!(
                "Mortgage payment {:.0} cannot be covered: no monthly income",
                loan.monthly_payment
            ));
        }
        _ => {}
    }

    if restrictions.require_positive_cash_flow && cash_flow.monthly_net_cash_flow < Decimal::ZERO {
        errors.push(format!(
            "Negative cash flow: {:.0}/month",
            cash_flow.monthly_net_cash_flow
        ));
    }

    if inputs.urban_renewal_value() > restrictions.max_urban_renewal_value {
        errors.push(format!(
            "Urban renewal value {:.0} exceeds maximum {:.0}",
            inputs.urban_renewal_value(),
            restrictions.max_urban_renewal_value
        ));
    }

    errors
}

fn percent(rate: Decimal) -> Decimal {
    rate * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::assumptions::{InvestmentAssumptions, RestrictionProfile};
    use crate::scenario::cash_flow::calculate_cash_flow;
    use crate::scenario::loan::calculate_loan_metrics;

    fn check(inputs: &ScenarioInputs, restrictions: &InvestmentRestrictions) -> Vec<String> {
        let assumptions = InvestmentAssumptions::default();
        let loan = calculate_loan_metrics(inputs, &assumptions, restrictions).unwrap();
        let cf = calculate_cash_flow(inputs, &assumptions, &loan, &mut Vec::new()).unwrap();
        validate_scenario(inputs, restrictions, &loan, &cf)
    }

    fn reference(monthly_available: Decimal) -> ScenarioInputs {
        ScenarioInputs::builder(dec!(2650000), dec!(1350000), dec!(2650000), monthly_available, 20, 15)
            .build()
            .unwrap()
    }

    #[test]
    fn test_reference_passes_standard_limits() {
        // 8,436 payment on 30,000 income is ~28%
        let errors = check(&reference(dec!(30000)), &InvestmentRestrictions::default());
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_income_ratio_breach_reports_amounts() {
        let errors = check(&reference(dec!(10000)), &InvestmentRestrictions::default());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Mortgage payment 84.4% of income exceeds maximum 30.0%"), "{}", errors[0]);
        assert!(errors[0].contains("payment: 8436"), "{}", errors[0]);
        assert!(errors[0].contains("income: 10000"), "{}", errors[0]);
    }

    #[test]
    fn test_all_rules_reported_in_order() {
        let inputs = ScenarioInputs::builder(dec!(1000000), dec!(100000), dec!(100000), dec!(5000), 25, 10)
            .urban_renewal_value(dec!(350000))
            .build()
            .unwrap();
        let restrictions = InvestmentRestrictions::from_profile(RestrictionProfile::Strict);
        let errors = check(&inputs, &restrictions);

        assert_eq!(errors.len(), 5, "{errors:?}");
        assert_eq!(errors[0], "Down payment 10.0% is below minimum 25.0%");
        assert_eq!(errors[1], "Loan-to-value 90.0% exceeds maximum 70.0%");
        assert!(errors[2].starts_with("Mortgage payment"));
        assert!(errors[3].starts_with("Negative cash flow: "));
        assert_eq!(errors[4], "Urban renewal value 350000 exceeds maximum 300000");
    }

    #[test]
    fn test_zero_income_with_debt_is_flagged() {
        let errors = check(&reference(Decimal::ZERO), &InvestmentRestrictions::default());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("no monthly income"));
    }

    #[test]
    fn test_cash_purchase_without_income_is_valid() {
        let inputs = ScenarioInputs::builder(dec!(1000000), dec!(1000000), dec!(1000000), Decimal::ZERO, 20, 10)
            .build()
            .unwrap();
        assert!(check(&inputs, &InvestmentRestrictions::default()).is_empty());
    }
}
