use chrono::NaiveDate;
use mortgage_scenario_core::tax::engine::{quote_purchase_tax, PurchaseTaxInput};
use mortgage_scenario_core::tax::{
    capital_gains_tax, BracketCategory, PurchaseTaxSchedule, TaxEngine, TaxScheduleSet,
};
use mortgage_scenario_core::CalcError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Bundled schedule
// ===========================================================================

#[test]
fn test_bundled_tables_are_contiguous() {
    let schedule = PurchaseTaxSchedule::bundled().unwrap();
    for category in [BracketCategory::FirstHouse, BracketCategory::AdditionalProperty] {
        let brackets = schedule.table(category).brackets();
        assert_eq!(brackets[0].min_value, Decimal::ZERO);
        for pair in brackets.windows(2) {
            assert_eq!(pair[0].max_value, Some(pair[1].min_value));
        }
        assert_eq!(brackets.last().unwrap().max_value, None);
    }
}

#[test]
fn test_purchase_tax_is_monotonic() {
    let schedule = PurchaseTaxSchedule::bundled().unwrap();
    let engine = TaxEngine::new(&schedule);
    let mut previous = Decimal::ZERO;
    let mut value = Decimal::ZERO;
    while value <= dec!(20_000_000) {
        let tax = engine.calculate_purchase_tax(value, true);
        assert!(tax >= previous, "tax fell at {value}");
        previous = tax;
        value += dec!(250_000);
    }
}

#[test]
fn test_purchase_tax_continuous_at_boundaries() {
    let schedule = PurchaseTaxSchedule::bundled().unwrap();
    let engine = TaxEngine::new(&schedule);
    for boundary in [dec!(1_805_000), dec!(2_085_000), dec!(5_000_000), dec!(17_000_000)] {
        let below = engine.calculate_purchase_tax(boundary - dec!(1), true);
        let at = engine.calculate_purchase_tax(boundary, true);
        // one unit of value never costs more than the top rate
        assert!(at - below <= dec!(0.10), "jump at {boundary}");
    }
}

#[test]
fn test_first_house_reference_values() {
    let schedule = PurchaseTaxSchedule::bundled().unwrap();
    let engine = TaxEngine::new(&schedule);

    assert_eq!(engine.calculate_purchase_tax(dec!(1_500_000), true), Decimal::ZERO);
    // 195,000 at 3.5%
    assert_eq!(engine.calculate_purchase_tax(dec!(2_000_000), true), dec!(6_825));
    // 280,000 at 3.5% + 915,000 at 5%
    assert_eq!(engine.calculate_purchase_tax(dec!(3_000_000), true), dec!(55_550));
    assert_eq!(engine.calculate_purchase_tax(dec!(2_000_000), false), dec!(160_000));
}

#[test]
fn test_quote_breakdown_sums_to_total() {
    let out = quote_purchase_tax(&PurchaseTaxInput {
        property_value: dec!(6_000_000),
        is_first_house: true,
        schedule: None,
    })
    .unwrap();
    let q = &out.result;

    let sum: Decimal = q.breakdown.iter().map(|c| c.tax).sum();
    assert_eq!(sum, q.purchase_tax);
    assert_eq!(q.category, BracketCategory::FirstHouse);
    assert_eq!(q.marginal_rate, dec!(0.075));
    assert!(q.effective_rate < q.marginal_rate);
    assert!(out.warnings.iter().any(|w| w.contains("bundled")));
}

// ===========================================================================
// Capital gains
// ===========================================================================

#[test]
fn test_capital_gains_tax_non_decreasing_in_sale_price() {
    let mut previous = Decimal::ZERO;
    for sale in [dec!(2_000_000), dec!(3_000_000), dec!(4_000_000), dec!(5_000_000)] {
        let tax = capital_gains_tax(sale, dec!(2_650_000), dec!(38_050), Decimal::ZERO, dec!(0.25));
        assert!(tax >= previous);
        previous = tax;
    }
}

#[test]
fn test_capital_gains_tax_zero_at_or_below_basis() {
    let basis_sale = dec!(2_650_000) + dec!(38_050) + dec!(100_000);
    assert_eq!(
        capital_gains_tax(basis_sale, dec!(2_650_000), dec!(38_050), dec!(100_000), dec!(0.25)),
        Decimal::ZERO
    );
    assert_eq!(
        capital_gains_tax(dec!(2_000_000), dec!(2_650_000), dec!(38_050), Decimal::ZERO, dec!(0.25)),
        Decimal::ZERO
    );
}

// ===========================================================================
// Custom schedules
// ===========================================================================

fn flat_schedule(tax_year: i32, effective_from: &str, rate: &str) -> String {
    format!(
        r#"{{
            "jurisdiction": "XX",
            "tax_year": {tax_year},
            "effective_from": "{effective_from}",
            "first_house": [ {{ "min_value": "0", "max_value": null, "rate": "{rate}" }} ],
            "additional_property": [ {{ "min_value": "0", "max_value": null, "rate": "{rate}" }} ]
        }}"#
    )
}

#[test]
fn test_custom_schedule_from_json() {
    let schedule: PurchaseTaxSchedule =
        serde_json::from_str(&flat_schedule(2030, "2030-01-01", "0.02")).unwrap();
    let engine = TaxEngine::new(&schedule);
    assert_eq!(engine.calculate_purchase_tax(dec!(1_000_000), true), dec!(20_000));
}

#[test]
fn test_schedule_with_gap_is_rejected() {
    let json = r#"{
        "jurisdiction": "XX",
        "tax_year": 2030,
        "effective_from": "2030-01-01",
        "first_house": [
            { "min_value": "0", "max_value": "100000", "rate": "0" },
            { "min_value": "200000", "max_value": null, "rate": "0.05" }
        ],
        "additional_property": [ { "min_value": "0", "max_value": null, "rate": "0.08" } ]
    }"#;
    assert!(serde_json::from_str::<PurchaseTaxSchedule>(json).is_err());
}

#[test]
fn test_schedule_set_selection() {
    let json = format!(
        "[{}, {}]",
        flat_schedule(2031, "2031-01-01", "0.03"),
        flat_schedule(2030, "2030-01-01", "0.02")
    );
    let set: TaxScheduleSet = serde_json::from_str(&json).unwrap();

    assert_eq!(set.schedules().len(), 2);
    assert_eq!(set.latest().unwrap().tax_year, 2031);
    assert_eq!(set.for_year(2030).unwrap().tax_year, 2030);

    let mid_2030 = NaiveDate::from_ymd_opt(2030, 6, 30).unwrap();
    assert_eq!(set.effective_on(mid_2030).unwrap().tax_year, 2030);

    let too_early = NaiveDate::from_ymd_opt(2029, 12, 31).unwrap();
    assert!(matches!(
        set.effective_on(too_early),
        Err(CalcError::InvalidTaxSchedule(_))
    ));
}
