use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_scenario_core::scenario::{
    calculate_scenario as run_scenario, preset_catalog, ScenarioRequest,
};
use mortgage_scenario_core::sensitivity::{
    scenario_sensitivity as run_sensitivity, SensitivityInput,
};
use mortgage_scenario_core::tax::engine::{quote_purchase_tax, PurchaseTaxInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_scenario(input_json: String) -> NapiResult<String> {
    let input: ScenarioRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = run_scenario(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn scenario_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn presets() -> NapiResult<String> {
    serde_json::to_string(&preset_catalog()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn purchase_tax(input_json: String) -> NapiResult<String> {
    let input: PurchaseTaxInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = quote_purchase_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
