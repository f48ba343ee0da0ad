use clap::Args;
use serde_json::Value;

use mortgage_scenario_core::sensitivity::{
    scenario_sensitivity, AssumptionVariable, OutputMetric, SensitivityInput, SensitivityVariable,
};

use super::scenario::build_request;
use super::{ProfileArg, RestrictionsArg};
use crate::input;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Base scenario request (JSON or YAML); read from stdin when absent
    #[arg(long)]
    pub input: Option<String>,

    /// Row variable in format name:min:max:step
    /// (e.g. "mortgage_rate:0.03:0.06:0.005")
    #[arg(long)]
    pub var1: String,

    /// Column variable in format name:min:max:step
    #[arg(long)]
    pub var2: String,

    /// Output metric: total_profit, annual_return, property_profit_after_tax,
    /// net_portfolio_profit, monthly_net_cash_flow, sale_value
    #[arg(long, default_value = "total_profit")]
    pub metric: String,

    /// Purchase-tax schedule file (JSON or YAML)
    #[arg(long)]
    pub brackets: Option<String>,

    #[arg(long)]
    pub tax_year: Option<i32>,

    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    #[arg(long, value_enum)]
    pub restrictions: Option<RestrictionsArg>,
}

fn parse_sens_var(spec: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    let variable: AssumptionVariable = serde_json::from_value(Value::String(parts[0].into()))
        .map_err(|_| format!("Unknown assumption '{}'", parts[0]))?;
    Ok(SensitivityVariable {
        variable,
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

fn parse_metric(name: &str) -> Result<OutputMetric, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.into()))
        .map_err(|_| format!("Unknown output metric '{}'", name).into())
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::read_input(args.input.as_deref(), "sensitivity analysis")?;
    let base = build_request(
        raw,
        args.profile,
        args.restrictions,
        args.brackets.as_deref(),
        args.tax_year,
    )?;

    let input = SensitivityInput {
        base,
        variable_1: parse_sens_var(&args.var1)?,
        variable_2: parse_sens_var(&args.var2)?,
        output_metric: parse_metric(&args.metric)?,
    };

    let result = scenario_sensitivity(&input)?;
    Ok(serde_json::to_value(result)?)
}
