pub mod presets;
pub mod scenario;
pub mod sensitivity;
pub mod tax;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

use mortgage_scenario_core::scenario::{AssumptionProfile, RestrictionProfile};
use mortgage_scenario_core::tax::{PurchaseTaxSchedule, TaxScheduleSet};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    Conservative,
    Moderate,
    Aggressive,
}

impl From<ProfileArg> for AssumptionProfile {
    fn from(p: ProfileArg) -> Self {
        match p {
            ProfileArg::Conservative => AssumptionProfile::Conservative,
            ProfileArg::Moderate => AssumptionProfile::Moderate,
            ProfileArg::Aggressive => AssumptionProfile::Aggressive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RestrictionsArg {
    Standard,
    Strict,
    Lenient,
}

impl From<RestrictionsArg> for RestrictionProfile {
    fn from(r: RestrictionsArg) -> Self {
        match r {
            RestrictionsArg::Standard => RestrictionProfile::Standard,
            RestrictionsArg::Strict => RestrictionProfile::Strict,
            RestrictionsArg::Lenient => RestrictionProfile::Lenient,
        }
    }
}

/// A brackets file holds either one schedule or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleFile {
    Set(TaxScheduleSet),
    Single(PurchaseTaxSchedule),
}

/// Load the schedule named by `--brackets`, picking `tax_year` from a set
/// (latest when absent).
pub fn load_schedule(
    path: &str,
    tax_year: Option<i32>,
) -> Result<PurchaseTaxSchedule, Box<dyn std::error::Error>> {
    match input::file::read_structured::<ScheduleFile>(path)? {
        ScheduleFile::Single(schedule) => {
            if let Some(year) = tax_year {
                if schedule.tax_year != year {
                    return Err(format!(
                        "'{path}' holds the {} schedule, not {year}",
                        schedule.tax_year
                    )
                    .into());
                }
            }
            Ok(schedule)
        }
        ScheduleFile::Set(set) => {
            let schedule = match tax_year {
                Some(year) => set.for_year(year)?,
                None => set.latest()?,
            };
            Ok(schedule.clone())
        }
    }
}

/// Overlay the fields present in `overrides` on top of `base`.
pub fn overlay(base: Value, overrides: Option<&Value>) -> Value {
    match (base, overrides) {
        (Value::Object(mut merged), Some(Value::Object(extra))) => {
            for (k, v) in extra {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        (base, _) => base,
    }
}
