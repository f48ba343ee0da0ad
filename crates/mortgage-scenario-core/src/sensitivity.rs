use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use crate::error::CalcError;
use crate::scenario::{InvestmentAssumptions, ScenarioCalculator, ScenarioRequest, ScenarioResult};
use crate::tax::PurchaseTaxSchedule;
use crate::types::*;
use crate::CalcResult;

/// Assumption that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionVariable {
    RentalYield,
    MortgageRate,
    AppreciationRate,
    RentIncreaseRate,
    PortfolioReturnRate,
    RiskFreeRate,
    EarlyRepaymentRate,
    CapitalGainsTaxRate,
}

impl AssumptionVariable {
    pub fn get(self, assumptions: &InvestmentAssumptions) -> Rate {
        match self {
            Self::RentalYield => assumptions.rental_yield,
            Self::MortgageRate => assumptions.mortgage_rate,
            Self::AppreciationRate => assumptions.appreciation_rate,
            Self::RentIncreaseRate => assumptions.rent_increase_rate,
            Self::PortfolioReturnRate => assumptions.portfolio_return_rate,
            Self::RiskFreeRate => assumptions.risk_free_rate,
            Self::EarlyRepaymentRate => assumptions.early_repayment_rate,
            Self::CapitalGainsTaxRate => assumptions.capital_gains_tax_rate,
        }
    }

    pub fn set(self, assumptions: &mut InvestmentAssumptions, value: Rate) {
        let field = match self {
            Self::RentalYield => &mut assumptions.rental_yield,
            Self::MortgageRate => &mut assumptions.mortgage_rate,
            Self::AppreciationRate => &mut assumptions.appreciation_rate,
            Self::RentIncreaseRate => &mut assumptions.rent_increase_rate,
            Self::PortfolioReturnRate => &mut assumptions.portfolio_return_rate,
            Self::RiskFreeRate => &mut assumptions.risk_free_rate,
            Self::EarlyRepaymentRate => &mut assumptions.early_repayment_rate,
            Self::CapitalGainsTaxRate => &mut assumptions.capital_gains_tax_rate,
        };
        *field = value;
    }
}

impl fmt::Display for AssumptionVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RentalYield => "rental_yield",
            Self::MortgageRate => "mortgage_rate",
            Self::AppreciationRate => "appreciation_rate",
            Self::RentIncreaseRate => "rent_increase_rate",
            Self::PortfolioReturnRate => "portfolio_return_rate",
            Self::RiskFreeRate => "risk_free_rate",
            Self::EarlyRepaymentRate => "early_repayment_rate",
            Self::CapitalGainsTaxRate => "capital_gains_tax_rate",
        };
        f.write_str(name)
    }
}

/// Scenario figure read from each grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMetric {
    #[default]
    TotalProfit,
    AnnualReturn,
    PropertyProfitAfterTax,
    NetPortfolioProfit,
    MonthlyNetCashFlow,
    SaleValue,
}

impl OutputMetric {
    /// The metric's value; only the annual return can be undefined.
    pub fn read(self, result: &ScenarioResult) -> Option<Decimal> {
        match self {
            Self::TotalProfit => Some(result.total_profit),
            Self::AnnualReturn => result.annual_return,
            Self::PropertyProfitAfterTax => Some(result.tax.property_profit_after_tax),
            Self::NetPortfolioProfit => Some(result.portfolio.net_portfolio_profit),
            Self::MonthlyNetCashFlow => Some(result.cash_flow.monthly_net_cash_flow),
            Self::SaleValue => Some(result.appreciation.sale_value),
        }
    }
}

/// Sweep range for one assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub variable: AssumptionVariable,
    pub min: Rate,
    pub max: Rate,
    pub step: Rate,
}

/// Input for 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// Base case; swept assumptions are overridden cell by cell
    pub base: ScenarioRequest,
    /// Rows
    pub variable_1: SensitivityVariable,
    /// Columns
    pub variable_2: SensitivityVariable,
    #[serde(default)]
    pub output_metric: OutputMetric,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1: AssumptionVariable,
    pub variable_2: AssumptionVariable,
    pub variable_1_values: Vec<Rate>,
    pub variable_2_values: Vec<Rate>,
    pub output_metric: OutputMetric,
    /// Matrix[i][j] = output when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j].
    /// Cells that fail to evaluate, or whose metric is undefined, are `None`.
    pub matrix: Vec<Vec<Option<Decimal>>>,
    /// Output of the unmodified base request
    pub base_case_value: Option<Decimal>,
    /// Cell closest to the base assumptions (row, col)
    pub base_case_position: (usize, usize),
}

/// Most values a single sweep axis may take.
pub const MAX_SWEEP_POINTS: usize = 1000;

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> CalcResult<Vec<Rate>> {
    if var.step <= Decimal::ZERO {
        return Err(CalcError::InvalidInput {
            field: format!("variable:{}", var.variable),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(CalcError::InvalidInput {
            field: format!("variable:{}", var.variable),
            reason: "Min must be <= max".into(),
        });
    }

    // ceil(span / step) + 1 values, counting a max appended off-step
    let point_count = (var.max - var.min)
        .checked_div(var.step)
        .map(|steps| steps.ceil() + Decimal::ONE);
    if !point_count.is_some_and(|n| n <= Decimal::from(MAX_SWEEP_POINTS)) {
        return Err(CalcError::InvalidInput {
            field: format!("variable:{}", var.variable),
            reason: format!("Sweep exceeds {MAX_SWEEP_POINTS} values"),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn evaluate(
    request: &ScenarioRequest,
    assumptions: InvestmentAssumptions,
    schedule: &PurchaseTaxSchedule,
    metric: OutputMetric,
) -> CalcResult<Option<Decimal>> {
    let result = ScenarioCalculator::new(
        request.inputs.clone(),
        assumptions,
        request.restrictions.clone(),
        schedule,
    )?
    .validate()?
    .compute()?;
    Ok(metric.read(&result))
}

/// Re-run the full scenario for every pair of swept assumption values.
///
/// A cell that fails (e.g. a rate pushed out of range) is left empty and
/// reported as a warning; only a failing base case aborts the grid.
pub fn scenario_sensitivity(
    input: &SensitivityInput,
) -> CalcResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variable_1.variable == input.variable_2.variable {
        return Err(CalcError::InvalidInput {
            field: "variable_2".into(),
            reason: "Sensitivity variables must differ".into(),
        });
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let schedule = input.base.resolve_schedule()?;
    let base = &input.base.assumptions;
    let base_case_value = evaluate(&input.base, base.clone(), &schedule, input.output_metric)?;

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let mut assumptions = base.clone();
            input.variable_1.variable.set(&mut assumptions, *v1);
            input.variable_2.variable.set(&mut assumptions, *v2);

            match evaluate(&input.base, assumptions, &schedule, input.output_metric) {
                Ok(Some(val)) => row.push(Some(val)),
                Ok(None) => {
                    warnings.push(format!("Output undefined at ({v1}, {v2})"));
                    row.push(None);
                }
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&v1_values, input.variable_1.variable.get(base));
    let base_col = closest_index(&v2_values, input.variable_2.variable.get(base));

    debug!(
        rows = v1_values.len(),
        cols = v2_values.len(),
        failed = warnings.len(),
        "sensitivity grid"
    );

    let output = SensitivityOutput {
        variable_1: input.variable_1.variable,
        variable_2: input.variable_2.variable,
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Scenario Sensitivity (full re-evaluation per cell)",
        &serde_json::json!({
            "variable_1": input.variable_1.variable,
            "variable_2": input.variable_2.variable,
            "output_metric": input.output_metric,
            "tax_schedule": format!("{} {}", schedule.jurisdiction, schedule.tax_year),
        }),
        warnings,
        elapsed,
        output,
    ))
}
