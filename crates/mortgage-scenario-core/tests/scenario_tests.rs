use mortgage_scenario_core::scenario::{
    calculate_scenario, InvestmentAssumptions, InvestmentRestrictions, RestrictionProfile,
    ScenarioCalculator, ScenarioInputs, ScenarioRequest,
};
use mortgage_scenario_core::tax::PurchaseTaxSchedule;
use mortgage_scenario_core::CalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference scenario
// ===========================================================================

fn reference_inputs() -> ScenarioInputs {
    // 2.65M apartment, 1.35M down, 20y mortgage, sold after 15y
    ScenarioInputs::builder(
        dec!(2_650_000),
        dec!(1_350_000),
        dec!(2_650_000),
        dec!(30_000),
        20,
        15,
    )
    .build()
    .unwrap()
}

fn close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

#[test]
fn test_reference_loan_and_cash_flow() {
    let out = calculate_scenario(&ScenarioRequest::new(reference_inputs())).unwrap();
    let r = &out.result;

    assert_eq!(r.loan.loan_amount, dec!(1_300_000));
    close(r.loan.equity_ratio, dec!(0.509434), dec!(0.000001));
    close(r.loan.leverage_multiplier, dec!(1.962963), dec!(0.000001));
    close(r.loan.monthly_payment, dec!(8436.4471), dec!(0.0001));
    close(r.loan.total_payments, dec!(2_024_747.31), dec!(0.01));
    close(r.cash_flow.monthly_rent, dec!(6183.3333), dec!(0.0001));
}

#[test]
fn test_reference_sale_and_debt() {
    let out = calculate_scenario(&ScenarioRequest::new(reference_inputs())).unwrap();
    let r = &out.result;

    close(r.appreciation.sale_value, dec!(4_772_500.29), dec!(0.01));
    // 5 of 20 years left: a quarter of the total payments
    close(r.early_repayment.remaining_mortgage, dec!(506_186.83), dec!(0.01));
    close(r.early_repayment.early_repayment_penalty, dec!(14_520.14), dec!(0.01));
    close(r.early_repayment.proceeds_minus_debt, dec!(4_251_793.33), dec!(0.01));
    close(r.early_repayment.net_gain_property, dec!(2_901_793.33), dec!(0.01));
}

#[test]
fn test_reference_taxes() {
    let out = calculate_scenario(&ScenarioRequest::new(reference_inputs())).unwrap();
    let t = &out.result.tax;

    assert_eq!(t.jurisdiction, "IL");
    // 280,000 at 3.5% + 565,000 at 5%
    assert_eq!(t.purchase_tax, dec!(38_050));
    close(t.capital_gains_tax, dec!(521_112.57), dec!(0.01));
    close(t.property_profit_after_tax, dec!(2_342_630.75), dec!(0.01));
}

#[test]
fn test_reference_portfolio_and_summary() {
    let out = calculate_scenario(&ScenarioRequest::new(reference_inputs())).unwrap();
    let r = &out.result;

    assert_eq!(r.portfolio.cash_in_portfolio, dec!(1_300_000));
    close(r.portfolio.monthly_deposits, dec!(27_746.8862), dec!(0.0001));
    close(r.portfolio.total_portfolio_value, dec!(12_381_457.79), dec!(0.01));
    close(r.portfolio.net_portfolio_profit, dec!(4_565_263.70), dec!(0.01));

    assert_eq!(r.initial_investment, dec!(1_388_050));
    close(r.total_value_at_sale, dec!(14_590_383.97), dec!(0.01));
    close(r.total_profit, dec!(6_907_894.45), dec!(0.01));
    close(r.annual_return.unwrap(), dec!(0.1698), dec!(0.0001));

    // 28% of income is inside the 30% limit
    assert!(r.is_valid, "{:?}", r.validation_errors);
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_results_are_deterministic() {
    let request = ScenarioRequest::new(reference_inputs());
    let a = serde_json::to_value(calculate_scenario(&request).unwrap().result).unwrap();
    let b = serde_json::to_value(calculate_scenario(&request).unwrap().result).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_sale_at_term_leaves_no_debt() {
    let inputs = ScenarioInputs::builder(
        dec!(2_650_000),
        dec!(1_350_000),
        dec!(2_650_000),
        dec!(30_000),
        20,
        20,
    )
    .build()
    .unwrap();
    let r = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap().result;

    assert_eq!(r.early_repayment.remaining_mortgage, Decimal::ZERO);
    assert_eq!(r.early_repayment.early_repayment_penalty, Decimal::ZERO);
    assert_eq!(r.early_repayment.proceeds_minus_debt, r.appreciation.sale_value);
}

#[test]
fn test_sale_after_term_warns() {
    let inputs = ScenarioInputs::builder(
        dec!(2_650_000),
        dec!(1_350_000),
        dec!(2_650_000),
        dec!(30_000),
        10,
        15,
    )
    .build()
    .unwrap();
    let out = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap();

    assert_eq!(out.result.early_repayment.total_debt_to_bank, Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("mortgage term")));
}

#[test]
fn test_cash_purchase() {
    let inputs = ScenarioInputs::builder(
        dec!(1_500_000),
        dec!(1_500_000),
        dec!(2_000_000),
        dec!(5_000),
        25,
        10,
    )
    .build()
    .unwrap();
    let r = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap().result;

    assert_eq!(r.loan.loan_amount, Decimal::ZERO);
    assert_eq!(r.loan.monthly_payment, Decimal::ZERO);
    assert_eq!(r.loan.leverage_multiplier, Decimal::ONE);
    assert_eq!(r.cash_flow.monthly_net_cash_flow, r.cash_flow.monthly_rent);
    // Below the first-house exemption threshold
    assert_eq!(r.tax.purchase_tax, Decimal::ZERO);
    assert_eq!(
        r.early_repayment.net_gain_property,
        r.appreciation.sale_value - dec!(1_500_000)
    );
    assert!(r.is_valid);
}

#[test]
fn test_full_financing_is_rejected() {
    let inputs = ScenarioInputs::builder(
        dec!(1_000_000),
        Decimal::ZERO,
        dec!(100_000),
        dec!(20_000),
        25,
        10,
    )
    .build()
    .unwrap();
    let err = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap_err();
    assert!(matches!(err, CalcError::FinancialImpossibility(_)));
}

#[test]
fn test_unrepresentable_growth_is_an_error() {
    // 2^90 growth on a 10^15 property cannot be represented
    let inputs = ScenarioInputs::builder(
        dec!(1_000_000_000_000_000),
        dec!(500_000_000_000_000),
        dec!(1_000_000_000_000_000),
        dec!(10_000),
        30,
        90,
    )
    .build()
    .unwrap();
    let mut request = ScenarioRequest::new(inputs);
    request.assumptions.appreciation_rate = Decimal::ONE;

    assert!(matches!(
        calculate_scenario(&request),
        Err(CalcError::Overflow { .. })
    ));
}

#[test]
fn test_out_of_range_horizons_are_rejected() {
    for (term, years) in [(400_000_000, 10), (30, 1000)] {
        let err = ScenarioInputs::builder(
            dec!(1_000_000_000_000),
            dec!(500_000_000_000),
            dec!(1_000_000_000_000),
            dec!(10_000),
            term,
            years,
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { .. }), "term {term}, years {years}");
    }
}

#[test]
fn test_higher_rate_lowers_profit() {
    let low = calculate_scenario(&ScenarioRequest::new(reference_inputs()))
        .unwrap()
        .result;
    let mut request = ScenarioRequest::new(reference_inputs());
    request.assumptions.mortgage_rate = dec!(0.06);
    let high = calculate_scenario(&request).unwrap().result;

    assert!(high.loan.monthly_payment > low.loan.monthly_payment);
    assert!(high.total_profit < low.total_profit);
}

#[test]
fn test_additional_property_pays_more_tax() {
    let first = calculate_scenario(&ScenarioRequest::new(reference_inputs()))
        .unwrap()
        .result;
    let inputs = ScenarioInputs::builder(
        dec!(2_650_000),
        dec!(1_350_000),
        dec!(2_650_000),
        dec!(30_000),
        20,
        15,
    )
    .first_house(false)
    .build()
    .unwrap();
    let additional = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap().result;

    // 8% flat below 17M
    assert_eq!(additional.tax.purchase_tax, dec!(212_000));
    assert!(additional.tax.capital_gains_tax < first.tax.capital_gains_tax);
    assert!(additional.total_profit < first.total_profit);
}

#[test]
fn test_improvements_reduce_capital_gains_tax() {
    let base = calculate_scenario(&ScenarioRequest::new(reference_inputs()))
        .unwrap()
        .result;
    let inputs = ScenarioInputs::builder(
        dec!(2_650_000),
        dec!(1_350_000),
        dec!(2_650_000),
        dec!(30_000),
        20,
        15,
    )
    .improvement_costs(dec!(200_000))
    .build()
    .unwrap();
    let improved = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap().result;

    // 25% of the 200k deducted from the gain
    close(
        base.tax.capital_gains_tax - improved.tax.capital_gains_tax,
        dec!(50_000),
        dec!(0.000001),
    );
}

#[test]
fn test_strict_profile_collects_every_failure() {
    let mut request = ScenarioRequest::new(reference_inputs());
    request.restrictions = InvestmentRestrictions::from_profile(RestrictionProfile::Strict);
    let r = calculate_scenario(&request).unwrap().result;

    // 49% down clears 25%, 49% LTV clears 70%; 28% of income and negative
    // cash flow do not.
    assert!(!r.is_valid);
    assert_eq!(r.validation_errors.len(), 2, "{:?}", r.validation_errors);
    assert!(r.validation_errors[0].starts_with("Mortgage payment 28.1% of income"));
    assert!(r.validation_errors[1].starts_with("Negative cash flow: -2253"));
    // computation still ran
    assert!(r.total_profit > Decimal::ZERO);
}

#[test]
fn test_stated_income_drives_affordability() {
    let inputs = ScenarioInputs::builder(
        dec!(2_650_000),
        dec!(1_350_000),
        dec!(2_650_000),
        dec!(5_000),
        20,
        15,
    )
    .monthly_income(dec!(40_000))
    .build()
    .unwrap();
    let r = calculate_scenario(&ScenarioRequest::new(inputs)).unwrap().result;
    assert!(r.is_valid, "{:?}", r.validation_errors);
}

#[test]
fn test_calculators_share_one_schedule() {
    let schedule = PurchaseTaxSchedule::bundled().unwrap();
    let results: Vec<_> = [10u32, 15, 20]
        .iter()
        .map(|&years| {
            let inputs = ScenarioInputs::builder(
                dec!(2_650_000),
                dec!(1_350_000),
                dec!(2_650_000),
                dec!(30_000),
                20,
                years,
            )
            .build()
            .unwrap();
            ScenarioCalculator::new(
                inputs,
                InvestmentAssumptions::default(),
                InvestmentRestrictions::default(),
                &schedule,
            )
            .unwrap()
            .validate()
            .unwrap()
            .compute()
            .unwrap()
        })
        .collect();

    assert!(results[0].appreciation.sale_value < results[1].appreciation.sale_value);
    assert!(results[1].appreciation.sale_value < results[2].appreciation.sale_value);
    assert!(results.iter().all(|r| r.tax.purchase_tax == dec!(38_050)));
}

#[test]
fn test_scenarios_evaluate_across_threads() {
    let schedule = PurchaseTaxSchedule::bundled().unwrap();
    let assumptions = InvestmentAssumptions::default();
    let restrictions = InvestmentRestrictions::default();

    let profits: Vec<Decimal> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    ScenarioCalculator::new(
                        reference_inputs(),
                        assumptions.clone(),
                        restrictions.clone(),
                        &schedule,
                    )
                    .unwrap()
                    .validate()
                    .unwrap()
                    .compute()
                    .unwrap()
                    .total_profit
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(profits.windows(2).all(|w| w[0] == w[1]));
}

// ===========================================================================
// JSON boundary
// ===========================================================================

#[test]
fn test_request_from_json_with_partial_overrides() {
    let json = r#"{
        "inputs": {
            "property_price": "2650000",
            "down_payment": "1350000",
            "available_cash": "2650000",
            "monthly_available": "30000",
            "mortgage_term_years": 20,
            "years_until_sale": 15,
            "urban_renewal_value": "900000"
        },
        "assumptions": { "mortgage_rate": "0.05" }
    }"#;
    let request: ScenarioRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.assumptions.mortgage_rate, dec!(0.05));
    assert_eq!(request.assumptions.rental_yield, dec!(0.028));
    // clamped at construction
    assert_eq!(request.inputs.urban_renewal_value(), dec!(400_000));
    assert!(request.inputs.is_first_house());
}

#[test]
fn test_request_json_rejects_invalid_inputs() {
    let json = r#"{
        "inputs": {
            "property_price": "1000000",
            "down_payment": "1200000",
            "available_cash": "2000000",
            "monthly_available": "10000",
            "mortgage_term_years": 20,
            "years_until_sale": 10
        }
    }"#;
    let err = serde_json::from_str::<ScenarioRequest>(json).unwrap_err();
    assert!(err.to_string().contains("down_payment"), "{err}");
}
