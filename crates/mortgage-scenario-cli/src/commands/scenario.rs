use clap::Args;
use serde_json::Value;
use tracing::info;

use mortgage_scenario_core::scenario::{
    calculate_scenario, InvestmentAssumptions, InvestmentRestrictions, ScenarioRequest,
};

use super::{load_schedule, overlay, ProfileArg, RestrictionsArg};
use crate::input;

#[derive(Args)]
pub struct ScenarioArgs {
    /// Scenario request (JSON or YAML); read from stdin when absent
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase-tax schedule file (JSON or YAML, one schedule or a list)
    #[arg(long)]
    pub brackets: Option<String>,

    /// Tax year to price with
    #[arg(long)]
    pub tax_year: Option<i32>,

    /// Assumption preset; fields given in the request still win
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Restriction preset; fields given in the request still win
    #[arg(long, value_enum)]
    pub restrictions: Option<RestrictionsArg>,
}

/// Apply `--profile`, `--restrictions`, `--brackets` and `--tax-year` to a raw request.
pub fn build_request(
    raw: Value,
    profile: Option<ProfileArg>,
    restrictions: Option<RestrictionsArg>,
    brackets: Option<&str>,
    tax_year: Option<i32>,
) -> Result<ScenarioRequest, Box<dyn std::error::Error>> {
    let mut raw = raw;
    if let Value::Object(map) = &mut raw {
        if let Some(p) = profile {
            let base = serde_json::to_value(InvestmentAssumptions::from_profile(p.into()))?;
            let merged = overlay(base, map.get("assumptions"));
            map.insert("assumptions".into(), merged);
        }
        if let Some(r) = restrictions {
            let base = serde_json::to_value(InvestmentRestrictions::from_profile(r.into()))?;
            let merged = overlay(base, map.get("restrictions"));
            map.insert("restrictions".into(), merged);
        }
    }

    let mut request: ScenarioRequest = serde_json::from_value(raw)?;
    if let Some(year) = tax_year {
        request.tax_year = Some(year);
    }
    if let Some(path) = brackets {
        request.tax_schedule = Some(load_schedule(path, request.tax_year)?);
    }
    Ok(request)
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::read_input(args.input.as_deref(), "scenario analysis")?;
    let request = build_request(
        raw,
        args.profile,
        args.restrictions,
        args.brackets.as_deref(),
        args.tax_year,
    )?;

    let result = calculate_scenario(&request)?;
    info!(
        valid = result.result.is_valid,
        elapsed_us = result.metadata.computation_time_us,
        "scenario evaluated"
    );
    Ok(serde_json::to_value(result)?)
}
