use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::tax::brackets::{BracketCategory, PurchaseTaxSchedule, TaxBracket};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CalcResult;

/// Progressive purchase tax and capital gains tax over an injected schedule.
///
/// Holds the schedule by reference, so one schedule can back any number of
/// engines across threads.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    schedule: &'a PurchaseTaxSchedule,
}

impl<'a> TaxEngine<'a> {
    pub fn new(schedule: &'a PurchaseTaxSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &'a PurchaseTaxSchedule {
        self.schedule
    }

    /// Sum of `slice * rate` over every bracket the value reaches.
    pub fn calculate_purchase_tax(&self, value: Money, is_first_house: bool) -> Money {
        if value <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let table = self
            .schedule
            .table(BracketCategory::from_first_house(is_first_house));

        let mut total = Decimal::ZERO;
        for bracket in table.brackets() {
            if value <= bracket.min_value {
                break;
            }
            total += bracket.taxable_slice(value) * bracket.rate;
        }
        total
    }

    /// Effective rate `tax / value`; zero for non-positive values.
    pub fn calculate_purchase_tax_rate(&self, value: Money, is_first_house: bool) -> Rate {
        if value <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.calculate_purchase_tax(value, is_first_house) / value
    }

    /// The bracket a value falls in.
    pub fn lookup(&self, value: Money, category: BracketCategory) -> Option<&'a TaxBracket> {
        self.schedule.table(category).lookup(value)
    }

    /// Rate applied to the next unit of value.
    pub fn marginal_rate(&self, value: Money, category: BracketCategory) -> Rate {
        self.lookup(value, category)
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Tax on the gain over the cost basis; losses are never taxed.
    pub fn calculate_capital_gains_tax(
        &self,
        sale_price: Money,
        purchase_price: Money,
        purchase_tax_paid: Money,
        improvement_costs: Money,
        rate: Rate,
    ) -> Money {
        capital_gains_tax(
            sale_price,
            purchase_price,
            purchase_tax_paid,
            improvement_costs,
            rate,
        )
    }
}

/// `max(sale - purchase - purchase_tax - improvements, 0) * rate`.
pub fn capital_gains_tax(
    sale_price: Money,
    purchase_price: Money,
    purchase_tax_paid: Money,
    improvement_costs: Money,
    rate: Rate,
) -> Money {
    let gain = sale_price - purchase_price - purchase_tax_paid - improvement_costs;
    gain.max(Decimal::ZERO) * rate
}

// ---------------------------------------------------------------------------
// Standalone purchase-tax quote
// ---------------------------------------------------------------------------

/// Input for a one-off purchase tax quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseTaxInput {
    pub property_value: Money,
    #[serde(default = "default_first_house")]
    pub is_first_house: bool,
    /// Schedule to use; the bundled latest schedule when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<PurchaseTaxSchedule>,
}

fn default_first_house() -> bool {
    true
}

/// Tax owed in one bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketCharge {
    pub min_value: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Money>,
    pub rate: Rate,
    pub taxable_amount: Money,
    pub tax: Money,
}

/// Purchase tax quote with a per-bracket breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseTaxOutput {
    pub jurisdiction: String,
    pub tax_year: i32,
    pub category: BracketCategory,
    pub purchase_tax: Money,
    pub effective_rate: Rate,
    pub marginal_rate: Rate,
    pub breakdown: Vec<BracketCharge>,
}

pub fn quote_purchase_tax(
    input: &PurchaseTaxInput,
) -> CalcResult<ComputationOutput<PurchaseTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.property_value < Decimal::ZERO {
        return Err(CalcError::InvalidInput {
            field: "property_value".into(),
            reason: "Property value cannot be negative".into(),
        });
    }

    let bundled;
    let schedule = match &input.schedule {
        Some(s) => s,
        None => {
            bundled = PurchaseTaxSchedule::bundled()?;
            warnings.push(format!(
                "No schedule supplied; using bundled {} {} brackets",
                bundled.jurisdiction, bundled.tax_year
            ));
            &bundled
        }
    };

    let engine = TaxEngine::new(schedule);
    let category = BracketCategory::from_first_house(input.is_first_house);

    let breakdown: Vec<BracketCharge> = schedule
        .table(category)
        .brackets()
        .iter()
        .map(|b| {
            let taxable_amount = b.taxable_slice(input.property_value);
            BracketCharge {
                min_value: b.min_value,
                max_value: b.max_value,
                rate: b.rate,
                taxable_amount,
                tax: taxable_amount * b.rate,
            }
        })
        .filter(|c| !c.taxable_amount.is_zero())
        .collect();

    let output = PurchaseTaxOutput {
        jurisdiction: schedule.jurisdiction.clone(),
        tax_year: schedule.tax_year,
        category,
        purchase_tax: engine.calculate_purchase_tax(input.property_value, input.is_first_house),
        effective_rate: engine
            .calculate_purchase_tax_rate(input.property_value, input.is_first_house),
        marginal_rate: engine.marginal_rate(input.property_value, category),
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Progressive Purchase Tax (bracketed)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
