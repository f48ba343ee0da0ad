use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_scenario_core::tax::engine::{quote_purchase_tax, PurchaseTaxInput};
use mortgage_scenario_core::tax::TaxScheduleSet;

use super::load_schedule;
use crate::input;

#[derive(Args)]
pub struct PurchaseTaxArgs {
    /// Property value; when absent the quote is read from --input or stdin
    #[arg(long)]
    pub value: Option<Decimal>,

    /// Price with the additional-property brackets
    #[arg(long)]
    pub additional_property: bool,

    /// Quote request (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase-tax schedule file (JSON or YAML, one schedule or a list)
    #[arg(long)]
    pub brackets: Option<String>,

    /// Tax year to price with
    #[arg(long)]
    pub tax_year: Option<i32>,
}

pub fn run_purchase_tax(args: PurchaseTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut quote: PurchaseTaxInput = match args.value {
        Some(property_value) => PurchaseTaxInput {
            property_value,
            is_first_house: !args.additional_property,
            schedule: None,
        },
        None => input::read_input(args.input.as_deref(), "purchase tax")?,
    };

    if let Some(path) = args.brackets.as_deref() {
        quote.schedule = Some(load_schedule(path, args.tax_year)?);
    } else if let Some(year) = args.tax_year {
        quote.schedule = Some(TaxScheduleSet::bundled()?.for_year(year)?.clone());
    }

    let result = quote_purchase_tax(&quote)?;
    Ok(serde_json::to_value(result)?)
}
