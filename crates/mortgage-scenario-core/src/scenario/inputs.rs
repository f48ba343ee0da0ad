use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::types::{Money, Years};
use crate::CalcResult;

/// Hard ceiling on the value an urban renewal project may add.
pub const MAX_URBAN_RENEWAL_VALUE: Money = dec!(400000);

/// Largest amount accepted for any monetary input (10^15).
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000_000);

/// Longest mortgage accepted.
pub const MAX_MORTGAGE_TERM_YEARS: Years = 50;

/// Longest holding period accepted.
pub const MAX_YEARS_UNTIL_SALE: Years = 100;

/// Property-specific inputs, validated once at construction and immutable afterwards.
///
/// Deserialization goes through [`ScenarioInputsDraft`] so JSON input is held
/// to the same rules as the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScenarioInputsDraft")]
pub struct ScenarioInputs {
    property_price: Money,
    down_payment: Money,
    available_cash: Money,
    monthly_available: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly_income: Option<Money>,
    mortgage_term_years: Years,
    years_until_sale: Years,
    urban_renewal_value: Money,
    is_first_house: bool,
    improvement_costs: Money,
}

/// Unvalidated field bundle; the wire shape of [`ScenarioInputs`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInputsDraft {
    /// Purchase price of the property
    pub property_price: Money,
    /// Equity paid up front
    pub down_payment: Money,
    /// Total cash available; what is not used as down payment goes to the portfolio
    pub available_cash: Money,
    /// Monthly amount available for investment after living expenses
    pub monthly_available: Money,
    /// Net monthly income, used for the mortgage-to-income restriction
    #[serde(default)]
    pub monthly_income: Option<Money>,
    pub mortgage_term_years: Years,
    pub years_until_sale: Years,
    /// Value added by an urban renewal project, clamped to [0, 400,000]
    #[serde(default)]
    pub urban_renewal_value: Money,
    /// First (only) residential property for the buyer
    #[serde(default = "default_first_house")]
    pub is_first_house: bool,
    /// Improvements deductible from the capital gain
    #[serde(default)]
    pub improvement_costs: Money,
}

fn default_first_house() -> bool {
    true
}

impl ScenarioInputs {
    /// Start a builder with the required fields. Optional fields default to:
    /// `monthly_income = None`, `urban_renewal_value = 0`,
    /// `is_first_house = true`, `improvement_costs = 0`.
    pub fn builder(
        property_price: Money,
        down_payment: Money,
        available_cash: Money,
        monthly_available: Money,
        mortgage_term_years: Years,
        years_until_sale: Years,
    ) -> ScenarioInputsBuilder {
        ScenarioInputsBuilder {
            draft: ScenarioInputsDraft {
                property_price,
                down_payment,
                available_cash,
                monthly_available,
                monthly_income: None,
                mortgage_term_years,
                years_until_sale,
                urban_renewal_value: Decimal::ZERO,
                is_first_house: true,
                improvement_costs: Decimal::ZERO,
            },
        }
    }

    pub fn property_price(&self) -> Money {
        self.property_price
    }

    pub fn down_payment(&self) -> Money {
        self.down_payment
    }

    pub fn available_cash(&self) -> Money {
        self.available_cash
    }

    pub fn monthly_available(&self) -> Money {
        self.monthly_available
    }

    pub fn monthly_income(&self) -> Option<Money> {
        self.monthly_income
    }

    /// Income the mortgage payment is measured against: stated income, else the monthly budget.
    pub fn income_for_affordability(&self) -> Money {
        self.monthly_income.unwrap_or(self.monthly_available)
    }

    pub fn mortgage_term_years(&self) -> Years {
        self.mortgage_term_years
    }

    pub fn years_until_sale(&self) -> Years {
        self.years_until_sale
    }

    pub fn urban_renewal_value(&self) -> Money {
        self.urban_renewal_value
    }

    pub fn is_first_house(&self) -> bool {
        self.is_first_house
    }

    pub fn improvement_costs(&self) -> Money {
        self.improvement_costs
    }

    /// `property_price - down_payment`; never negative once constructed.
    pub fn loan_amount(&self) -> Money {
        self.property_price - self.down_payment
    }
}

/// Builder for [`ScenarioInputs`]; `build` runs the validation.
#[derive(Debug, Clone)]
pub struct ScenarioInputsBuilder {
    draft: ScenarioInputsDraft,
}

impl ScenarioInputsBuilder {
    pub fn monthly_income(mut self, income: Money) -> Self {
        self.draft.monthly_income = Some(income);
        self
    }

    pub fn urban_renewal_value(mut self, value: Money) -> Self {
        self.draft.urban_renewal_value = value;
        self
    }

    pub fn first_house(mut self, is_first_house: bool) -> Self {
        self.draft.is_first_house = is_first_house;
        self
    }

    pub fn improvement_costs(mut self, costs: Money) -> Self {
        self.draft.improvement_costs = costs;
        self
    }

    pub fn build(self) -> CalcResult<ScenarioInputs> {
        ScenarioInputs::try_from(self.draft)
    }
}

impl TryFrom<ScenarioInputsDraft> for ScenarioInputs {
    type Error = CalcError;

    fn try_from(draft: ScenarioInputsDraft) -> Result<Self, Self::Error> {
        if draft.property_price <= Decimal::ZERO {
            return Err(invalid("property_price", "Property price must be positive"));
        }
        if draft.down_payment < Decimal::ZERO {
            return Err(invalid("down_payment", "Down payment cannot be negative"));
        }
        if draft.down_payment > draft.property_price {
            return Err(invalid(
                "down_payment",
                "Down payment cannot exceed the property price",
            ));
        }
        if draft.available_cash < Decimal::ZERO {
            return Err(invalid("available_cash", "Available cash cannot be negative"));
        }
        if let Some(income) = draft.monthly_income {
            if income <= Decimal::ZERO {
                return Err(invalid(
                    "monthly_income",
                    "Monthly income must be positive when provided",
                ));
            }
        }
        if draft.mortgage_term_years == 0 {
            return Err(invalid(
                "mortgage_term_years",
                "Mortgage term must be at least 1 year",
            ));
        }
        if draft.mortgage_term_years > MAX_MORTGAGE_TERM_YEARS {
            return Err(invalid(
                "mortgage_term_years",
                &format!("Mortgage term cannot exceed {MAX_MORTGAGE_TERM_YEARS} years"),
            ));
        }
        if draft.years_until_sale == 0 {
            return Err(invalid(
                "years_until_sale",
                "Holding period must be at least 1 year",
            ));
        }
        if draft.years_until_sale > MAX_YEARS_UNTIL_SALE {
            return Err(invalid(
                "years_until_sale",
                &format!("Holding period cannot exceed {MAX_YEARS_UNTIL_SALE} years"),
            ));
        }
        if draft.improvement_costs < Decimal::ZERO {
            return Err(invalid(
                "improvement_costs",
                "Improvement costs cannot be negative",
            ));
        }

        let amounts = [
            ("property_price", Some(draft.property_price)),
            ("available_cash", Some(draft.available_cash)),
            ("monthly_available", Some(draft.monthly_available)),
            ("monthly_income", draft.monthly_income),
            ("improvement_costs", Some(draft.improvement_costs)),
        ];
        for (field, amount) in amounts {
            if amount.is_some_and(|a| a.abs() > MAX_AMOUNT) {
                return Err(invalid(field, &format!("Amount cannot exceed {MAX_AMOUNT}")));
            }
        }

        Ok(ScenarioInputs {
            property_price: draft.property_price,
            down_payment: draft.down_payment,
            available_cash: draft.available_cash,
            monthly_available: draft.monthly_available,
            monthly_income: draft.monthly_income,
            mortgage_term_years: draft.mortgage_term_years,
            years_until_sale: draft.years_until_sale,
            urban_renewal_value: draft
                .urban_renewal_value
                .clamp(Decimal::ZERO, MAX_URBAN_RENEWAL_VALUE),
            is_first_house: draft.is_first_house,
            improvement_costs: draft.improvement_costs,
        })
    }
}

fn invalid(field: &str, reason: &str) -> CalcError {
    CalcError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
