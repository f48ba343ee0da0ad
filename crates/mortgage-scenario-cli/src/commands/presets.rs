use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use mortgage_scenario_core::scenario::preset_catalog;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetKind {
    Assumptions,
    Restrictions,
    All,
}

#[derive(Args)]
pub struct PresetsArgs {
    /// Which presets to list
    #[arg(long, value_enum, default_value = "all")]
    pub kind: PresetKind,
}

fn presets_value(kind: PresetKind) -> Result<Value, serde_json::Error> {
    let mut catalog = serde_json::to_value(preset_catalog())?;
    if let Value::Object(map) = &mut catalog {
        match kind {
            PresetKind::Assumptions => {
                map.remove("restrictions");
                map.remove("restriction_fields");
            }
            PresetKind::Restrictions => {
                map.remove("assumptions");
                map.remove("assumption_fields");
            }
            PresetKind::All => {}
        }
    }
    Ok(json!({ "result": catalog }))
}

pub fn run_presets(args: PresetsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(presets_value(args.kind)?)
}
