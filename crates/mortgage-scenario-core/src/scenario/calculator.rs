use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::scenario::appreciation::calculate_appreciation;
use crate::scenario::assumptions::{InvestmentAssumptions, InvestmentRestrictions};
use crate::scenario::cash_flow::calculate_cash_flow;
use crate::scenario::early_repayment::calculate_early_repayment;
use crate::scenario::inputs::ScenarioInputs;
use crate::scenario::loan::calculate_loan_metrics;
use crate::scenario::metrics::{CashFlowMetrics, LoanMetrics, ScenarioResult, TaxMetrics};
use crate::scenario::portfolio::calculate_portfolio;
use crate::scenario::validation::validate_scenario;
use crate::tax::{PurchaseTaxSchedule, TaxEngine, TaxScheduleSet};
use crate::time_value::{annualized_return, checked_div};
use crate::types::{with_metadata, ComputationOutput};
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Typestate
// ---------------------------------------------------------------------------

/// Inputs accepted, restrictions not yet checked.
#[derive(Debug, Clone, Copy)]
pub struct Constructed;

/// Restrictions checked; loan and cash-flow metrics already known.
#[derive(Debug, Clone)]
pub struct Validated {
    loan: LoanMetrics,
    cash_flow: CashFlowMetrics,
    validation_errors: Vec<String>,
}

/// One scenario evaluation: `new` → `validate` → `compute`.
///
/// The tax schedule is borrowed, so many calculators can share one schedule.
#[derive(Debug, Clone)]
pub struct ScenarioCalculator<'a, S> {
    inputs: ScenarioInputs,
    assumptions: InvestmentAssumptions,
    restrictions: InvestmentRestrictions,
    schedule: &'a PurchaseTaxSchedule,
    warnings: Vec<String>,
    state: S,
}

impl<'a> ScenarioCalculator<'a, Constructed> {
    pub fn new(
        inputs: ScenarioInputs,
        assumptions: InvestmentAssumptions,
        restrictions: InvestmentRestrictions,
        schedule: &'a PurchaseTaxSchedule,
    ) -> CalcResult<Self> {
        assumptions.validate()?;
        restrictions.validate()?;

        Ok(Self {
            inputs,
            assumptions,
            restrictions,
            schedule,
            warnings: Vec::new(),
            state: Constructed,
        })
    }

    /// Run every restriction check. Failures are collected, never raised;
    /// only an undefined loan (100% financing) is an error here.
    pub fn validate(mut self) -> CalcResult<ScenarioCalculator<'a, Validated>> {
        let loan = calculate_loan_metrics(&self.inputs, &self.assumptions, &self.restrictions)?;
        let cash_flow =
            calculate_cash_flow(&self.inputs, &self.assumptions, &loan, &mut self.warnings)?;
        let validation_errors =
            validate_scenario(&self.inputs, &self.restrictions, &loan, &cash_flow);

        if self.inputs.down_payment() > self.inputs.available_cash() {
            self.warnings.push(format!(
                "Down payment {} exceeds available cash {}; the portfolio starts negative",
                self.inputs.down_payment(),
                self.inputs.available_cash()
            ));
        }
        if self.inputs.years_until_sale() > self.inputs.mortgage_term_years() {
            self.warnings.push(format!(
                "Sale after {} years is past the {}-year mortgage term; the loan is treated as repaid",
                self.inputs.years_until_sale(),
                self.inputs.mortgage_term_years()
            ));
        }
        if !validation_errors.is_empty() {
            warn!(
                count = validation_errors.len(),
                first = %validation_errors[0],
                "scenario fails lending restrictions"
            );
        }

        Ok(ScenarioCalculator {
            inputs: self.inputs,
            assumptions: self.assumptions,
            restrictions: self.restrictions,
            schedule: self.schedule,
            warnings: self.warnings,
            state: Validated {
                loan,
                cash_flow,
                validation_errors,
            },
        })
    }
}

impl<'a> ScenarioCalculator<'a, Validated> {
    pub fn is_valid(&self) -> bool {
        self.state.validation_errors.is_empty()
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.state.validation_errors
    }

    pub fn loan(&self) -> &LoanMetrics {
        &self.state.loan
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Evaluate the rest of the scenario. Runs whether or not validation passed.
    pub fn compute(self) -> CalcResult<ScenarioResult> {
        self.compute_with_warnings().map(|(result, _)| result)
    }

    /// As [`compute`](Self::compute), also returning non-fatal warnings.
    pub fn compute_with_warnings(mut self) -> CalcResult<(ScenarioResult, Vec<String>)> {
        let inputs = &self.inputs;
        let assumptions = &self.assumptions;
        let Validated {
            loan,
            cash_flow,
            validation_errors,
        } = self.state;

        let appreciation = calculate_appreciation(inputs, assumptions, &loan, &cash_flow)?;
        let early_repayment =
            calculate_early_repayment(inputs, assumptions, &loan, &appreciation)?;

        let engine = TaxEngine::new(self.schedule);
        let price = inputs.property_price();
        let purchase_tax = engine.calculate_purchase_tax(price, inputs.is_first_house());
        let capital_gain =
            appreciation.sale_value - price - purchase_tax - inputs.improvement_costs();
        let capital_gains_tax = engine.calculate_capital_gains_tax(
            appreciation.sale_value,
            price,
            purchase_tax,
            inputs.improvement_costs(),
            assumptions.capital_gains_tax_rate,
        );
        let total_taxes = purchase_tax + capital_gains_tax;
        // NOTE: net_gain_property is measured against the down payment alone, so
        // purchase tax is charged here exactly once.
        let property_profit_after_tax = early_repayment.net_gain_property - total_taxes;

        let tax = TaxMetrics {
            jurisdiction: self.schedule.jurisdiction.clone(),
            tax_year: self.schedule.tax_year,
            purchase_tax,
            purchase_tax_rate: engine.calculate_purchase_tax_rate(price, inputs.is_first_house()),
            capital_gain,
            capital_gains_tax,
            total_taxes,
            property_profit_after_tax,
        };

        let portfolio = calculate_portfolio(inputs, assumptions, &cash_flow)?;

        let initial_investment = inputs.down_payment() + purchase_tax;
        let total_value_at_sale = early_repayment.proceeds_minus_debt - capital_gains_tax
            + portfolio.portfolio_after_tax;
        let total_profit = property_profit_after_tax + portfolio.net_portfolio_profit;

        let growth_multiple = checked_div(
            total_value_at_sale,
            initial_investment,
            "annual return (total value / initial investment)",
        )?;
        let annual_return = if growth_multiple > Decimal::ZERO {
            Some(annualized_return(growth_multiple, inputs.years_until_sale())?)
        } else {
            self.warnings.push(format!(
                "Total value at sale {} is not positive; annual return is undefined",
                total_value_at_sale.round_dp(0)
            ));
            None
        };

        debug!(
            %total_profit,
            annual_return = ?annual_return.map(|r| r.round_dp(6)),
            valid = validation_errors.is_empty(),
            "scenario computed"
        );

        let result = ScenarioResult {
            inputs: self.inputs,
            assumptions: self.assumptions,
            loan,
            cash_flow,
            appreciation,
            early_repayment,
            tax,
            portfolio,
            initial_investment,
            total_value_at_sale,
            total_profit,
            annual_return,
            is_valid: validation_errors.is_empty(),
            validation_errors,
        };

        Ok((result, self.warnings))
    }
}

impl<S> ScenarioCalculator<'_, S> {
    pub fn inputs(&self) -> &ScenarioInputs {
        &self.inputs
    }

    pub fn assumptions(&self) -> &InvestmentAssumptions {
        &self.assumptions
    }

    pub fn restrictions(&self) -> &InvestmentRestrictions {
        &self.restrictions
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A scenario with optional overrides; everything but `inputs` has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub inputs: ScenarioInputs,
    #[serde(default)]
    pub assumptions: InvestmentAssumptions,
    #[serde(default)]
    pub restrictions: InvestmentRestrictions,
    /// Pick a bundled schedule by tax year (latest when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_year: Option<i32>,
    /// Caller-supplied schedule; takes precedence over `tax_year`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_schedule: Option<PurchaseTaxSchedule>,
}

impl ScenarioRequest {
    pub fn new(inputs: ScenarioInputs) -> Self {
        Self {
            inputs,
            assumptions: InvestmentAssumptions::default(),
            restrictions: InvestmentRestrictions::default(),
            tax_year: None,
            tax_schedule: None,
        }
    }

    /// The schedule this request is priced with.
    pub fn resolve_schedule(&self) -> CalcResult<PurchaseTaxSchedule> {
        if let Some(schedule) = &self.tax_schedule {
            return Ok(schedule.clone());
        }
        let set = TaxScheduleSet::bundled()?;
        let schedule = match self.tax_year {
            Some(year) => set.for_year(year)?,
            None => set.latest()?,
        };
        Ok(schedule.clone())
    }
}

/// Evaluate one scenario and wrap it in the standard output envelope.
pub fn calculate_scenario(
    request: &ScenarioRequest,
) -> CalcResult<ComputationOutput<ScenarioResult>> {
    let start = Instant::now();
    let schedule = request.resolve_schedule()?;

    let (result, warnings) = ScenarioCalculator::new(
        request.inputs.clone(),
        request.assumptions.clone(),
        request.restrictions.clone(),
        &schedule,
    )?
    .validate()?
    .compute_with_warnings()?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single-scenario leveraged property investment vs. alternative portfolio (closed form)",
        &serde_json::json!({
            "assumptions": request.assumptions,
            "restrictions": request.restrictions,
            "tax_schedule": {
                "jurisdiction": schedule.jurisdiction,
                "tax_year": schedule.tax_year,
                "effective_from": schedule.effective_from,
            },
            "remaining_mortgage": "linear share of total payments",
        }),
        warnings,
        elapsed,
        result,
    ))
}
