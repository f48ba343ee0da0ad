pub mod appreciation;
pub mod assumptions;
pub mod calculator;
pub mod cash_flow;
pub mod early_repayment;
pub mod inputs;
pub mod loan;
pub mod metrics;
pub mod portfolio;
pub mod validation;

pub use assumptions::{
    preset_catalog, AssumptionProfile, InvestmentAssumptions, InvestmentRestrictions,
    PresetCatalog, RestrictionProfile,
};
pub use calculator::{calculate_scenario, ScenarioCalculator, ScenarioRequest};
pub use inputs::{ScenarioInputs, ScenarioInputsBuilder, ScenarioInputsDraft};
pub use metrics::ScenarioResult;
