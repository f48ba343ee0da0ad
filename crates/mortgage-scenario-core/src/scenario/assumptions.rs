use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CalcError;
use crate::scenario::inputs::MAX_URBAN_RENEWAL_VALUE;
use crate::types::{Money, Rate};
use crate::CalcResult;

/// Highest annual rate any assumption may take (1000%).
pub const MAX_ANNUAL_RATE: Rate = dec!(10);

// ---------------------------------------------------------------------------
// Assumptions
// ---------------------------------------------------------------------------

/// Market assumptions. Every field has a default; JSON may override any subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentAssumptions {
    /// Annual gross rent as a fraction of the property price
    pub rental_yield: Rate,
    /// Annual mortgage interest rate
    pub mortgage_rate: Rate,
    /// Annual property appreciation
    pub appreciation_rate: Rate,
    /// Annual rent increase (carried for multi-period projections)
    pub rent_increase_rate: Rate,
    /// Annual return of the alternative portfolio
    pub portfolio_return_rate: Rate,
    /// Risk-free rate (carried for discounting by downstream consumers)
    pub risk_free_rate: Rate,
    /// Market mortgage rate when the loan is repaid early
    pub early_repayment_rate: Rate,
    /// Tax rate on property and portfolio gains
    pub capital_gains_tax_rate: Rate,
}

impl Default for InvestmentAssumptions {
    fn default() -> Self {
        Self::from_profile(AssumptionProfile::Moderate)
    }
}

/// Named assumption sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionProfile {
    /// Lower yields and growth, dearer credit
    Conservative,
    /// Market-standard values (the defaults)
    #[default]
    Moderate,
    /// Higher yields and growth, cheaper credit
    Aggressive,
}

impl InvestmentAssumptions {
    pub fn from_profile(profile: AssumptionProfile) -> Self {
        match profile {
            AssumptionProfile::Conservative => Self {
                rental_yield: dec!(0.025),
                mortgage_rate: dec!(0.055),
                appreciation_rate: dec!(0.025),
                rent_increase_rate: dec!(0.02),
                portfolio_return_rate: dec!(0.05),
                risk_free_rate: dec!(0.025),
                early_repayment_rate: dec!(0.04),
                capital_gains_tax_rate: dec!(0.25),
            },
            AssumptionProfile::Moderate => Self {
                rental_yield: dec!(0.028),
                mortgage_rate: dec!(0.048),
                appreciation_rate: dec!(0.04),
                rent_increase_rate: dec!(0.03),
                portfolio_return_rate: dec!(0.07),
                risk_free_rate: dec!(0.03),
                early_repayment_rate: dec!(0.035),
                capital_gains_tax_rate: dec!(0.25),
            },
            AssumptionProfile::Aggressive => Self {
                rental_yield: dec!(0.032),
                mortgage_rate: dec!(0.042),
                appreciation_rate: dec!(0.06),
                rent_increase_rate: dec!(0.04),
                portfolio_return_rate: dec!(0.10),
                risk_free_rate: dec!(0.03),
                early_repayment_rate: dec!(0.03),
                capital_gains_tax_rate: dec!(0.25),
            },
        }
    }

    /// Reject rates the formulas cannot use.
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("rental_yield", self.rental_yield)?;
        non_negative("mortgage_rate", self.mortgage_rate)?;
        non_negative("early_repayment_rate", self.early_repayment_rate)?;
        above_minus_one("appreciation_rate", self.appreciation_rate)?;
        above_minus_one("rent_increase_rate", self.rent_increase_rate)?;
        above_minus_one("portfolio_return_rate", self.portfolio_return_rate)?;
        above_minus_one("risk_free_rate", self.risk_free_rate)?;
        unit_interval("capital_gains_tax_rate", self.capital_gains_tax_rate)?;

        for (field, value) in [
            ("rental_yield", self.rental_yield),
            ("mortgage_rate", self.mortgage_rate),
            ("appreciation_rate", self.appreciation_rate),
            ("rent_increase_rate", self.rent_increase_rate),
            ("portfolio_return_rate", self.portfolio_return_rate),
            ("risk_free_rate", self.risk_free_rate),
            ("early_repayment_rate", self.early_repayment_rate),
        ] {
            at_most_max_rate(field, value)?;
        }
        Ok(())
    }

    /// Field name → human description.
    pub fn descriptions() -> Vec<(&'static str, &'static str)> {
        vec![
            ("rental_yield", "Annual rental yield as a fraction of property price (0.028 = 2.8%)"),
            ("mortgage_rate", "Annual mortgage interest rate"),
            ("appreciation_rate", "Annual property value appreciation rate"),
            ("rent_increase_rate", "Annual rate at which rent increases"),
            ("portfolio_return_rate", "Expected annual return of the alternative portfolio"),
            ("risk_free_rate", "Risk-free rate used for discounting future cash flows"),
            ("early_repayment_rate", "Market rate used to price the early repayment penalty"),
            ("capital_gains_tax_rate", "Tax rate applied to capital gains (0.25 = 25%)"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Restrictions
// ---------------------------------------------------------------------------

/// Lending and policy limits a scenario is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentRestrictions {
    /// Maximum monthly payment as a fraction of monthly income
    pub max_mortgage_to_income_ratio: Rate,
    /// Minimum down payment as a fraction of the price
    pub min_down_payment_percentage: Rate,
    /// Maximum loan-to-value
    pub max_loan_to_value: Rate,
    /// Largest urban renewal uplift accepted
    pub max_urban_renewal_value: Money,
    /// Reject scenarios whose monthly cash flow is negative
    pub require_positive_cash_flow: bool,
}

impl Default for InvestmentRestrictions {
    fn default() -> Self {
        Self::from_profile(RestrictionProfile::Standard)
    }
}

/// Named restriction sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionProfile {
    #[default]
    Standard,
    /// Conservative lending standards
    Strict,
    /// More leverage, no cash-flow requirement
    Lenient,
}

impl InvestmentRestrictions {
    pub fn from_profile(profile: RestrictionProfile) -> Self {
        match profile {
            RestrictionProfile::Standard => Self {
                max_mortgage_to_income_ratio: dec!(0.3),
                min_down_payment_percentage: Decimal::ZERO,
                max_loan_to_value: dec!(0.75),
                max_urban_renewal_value: MAX_URBAN_RENEWAL_VALUE,
                require_positive_cash_flow: false,
            },
            RestrictionProfile::Strict => Self {
                max_mortgage_to_income_ratio: dec!(0.25),
                min_down_payment_percentage: dec!(0.25),
                max_loan_to_value: dec!(0.70),
                max_urban_renewal_value: dec!(300000),
                require_positive_cash_flow: true,
            },
            RestrictionProfile::Lenient => Self {
                max_mortgage_to_income_ratio: dec!(0.40),
                min_down_payment_percentage: dec!(0.10),
                max_loan_to_value: dec!(0.90),
                max_urban_renewal_value: dec!(500000),
                require_positive_cash_flow: false,
            },
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.max_mortgage_to_income_ratio <= Decimal::ZERO {
            return Err(CalcError::InvalidInput {
                field: "max_mortgage_to_income_ratio".into(),
                reason: "Ratio must be positive".into(),
            });
        }
        unit_interval("min_down_payment_percentage", self.min_down_payment_percentage)?;
        unit_interval("max_loan_to_value", self.max_loan_to_value)?;
        non_negative("max_urban_renewal_value", self.max_urban_renewal_value)?;
        Ok(())
    }

    pub fn descriptions() -> Vec<(&'static str, &'static str)> {
        vec![
            ("max_mortgage_to_income_ratio", "Maximum mortgage payment as a fraction of monthly income"),
            ("min_down_payment_percentage", "Minimum down payment as a fraction of property price"),
            ("max_loan_to_value", "Maximum loan amount as a fraction of property value"),
            ("max_urban_renewal_value", "Maximum value that can be attributed to urban renewal"),
            ("require_positive_cash_flow", "Whether monthly cash flow must be non-negative"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Preset catalog
// ---------------------------------------------------------------------------

/// Every named preset with its values and a description of each field.
#[derive(Debug, Clone, Serialize)]
pub struct PresetCatalog {
    pub assumptions: BTreeMap<AssumptionProfile, InvestmentAssumptions>,
    pub assumption_fields: BTreeMap<&'static str, &'static str>,
    pub restrictions: BTreeMap<RestrictionProfile, InvestmentRestrictions>,
    pub restriction_fields: BTreeMap<&'static str, &'static str>,
}

pub fn preset_catalog() -> PresetCatalog {
    PresetCatalog {
        assumptions: [
            AssumptionProfile::Conservative,
            AssumptionProfile::Moderate,
            AssumptionProfile::Aggressive,
        ]
        .into_iter()
        .map(|p| (p, InvestmentAssumptions::from_profile(p)))
        .collect(),
        assumption_fields: InvestmentAssumptions::descriptions().into_iter().collect(),
        restrictions: [
            RestrictionProfile::Standard,
            RestrictionProfile::Strict,
            RestrictionProfile::Lenient,
        ]
        .into_iter()
        .map(|p| (p, InvestmentRestrictions::from_profile(p)))
        .collect(),
        restriction_fields: InvestmentRestrictions::descriptions().into_iter().collect(),
    }
}

fn non_negative(field: &str, value: Decimal) -> CalcResult<()> {
    if value < Decimal::ZERO {
        return Err(CalcError::InvalidInput {
            field: field.into(),
            reason: "Must not be negative".into(),
        });
    }
    Ok(())
}

fn above_minus_one(field: &str, value: Rate) -> CalcResult<()> {
    if value <= dec!(-1) {
        return Err(CalcError::InvalidInput {
            field: field.into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

fn at_most_max_rate(field: &str, value: Rate) -> CalcResult<()> {
    if value > MAX_ANNUAL_RATE {
        return Err(CalcError::InvalidInput {
            field: field.into(),
            reason: format!("Rate cannot exceed {MAX_ANNUAL_RATE} (1000%)"),
        });
    }
    Ok(())
}

fn unit_interval(field: &str, value: Rate) -> CalcResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(CalcError::InvalidInput {
            field: field.into(),
            reason: "Must be between 0 and 1".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_moderate() {
        let a = InvestmentAssumptions::default();
        assert_eq!(a.rental_yield, dec!(0.028));
        assert_eq!(a.mortgage_rate, dec!(0.048));
        assert_eq!(a.capital_gains_tax_rate, dec!(0.25));
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_partial_override_from_json() {
        let a: InvestmentAssumptions =
            serde_json::from_str(r#"{ "mortgage_rate": "0.05" }"#).unwrap();
        assert_eq!(a.mortgage_rate, dec!(0.05));
        assert_eq!(a.appreciation_rate, dec!(0.04));
    }

    #[test]
    fn test_profiles_differ() {
        let c = InvestmentAssumptions::from_profile(AssumptionProfile::Conservative);
        let g = InvestmentAssumptions::from_profile(AssumptionProfile::Aggressive);
        assert!(c.appreciation_rate < g.appreciation_rate);
        assert!(c.mortgage_rate > g.mortgage_rate);
    }

    #[test]
    fn test_negative_mortgage_rate_rejected() {
        let a = InvestmentAssumptions {
            mortgage_rate: dec!(-0.01),
            ..Default::default()
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_rate_above_ceiling_rejected() {
        let a = InvestmentAssumptions {
            rental_yield: dec!(100000000000000000000),
            ..Default::default()
        };
        let err = a.validate().unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "rental_yield"));

        let at_ceiling = InvestmentAssumptions {
            appreciation_rate: MAX_ANNUAL_RATE,
            ..Default::default()
        };
        assert!(at_ceiling.validate().is_ok());
    }

    #[test]
    fn test_tax_rate_above_one_rejected() {
        let a = InvestmentAssumptions {
            capital_gains_tax_rate: dec!(1.2),
            ..Default::default()
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_restriction_defaults() {
        let r = InvestmentRestrictions::default();
        assert_eq!(r.max_mortgage_to_income_ratio, dec!(0.3));
        assert_eq!(r.max_loan_to_value, dec!(0.75));
        assert_eq!(r.max_urban_renewal_value, dec!(400000));
        assert!(!r.require_positive_cash_flow);
    }

    #[test]
    fn test_zero_income_ratio_rejected() {
        let r = InvestmentRestrictions {
            max_mortgage_to_income_ratio: Decimal::ZERO,
            ..Default::default()
        };
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_strict_profile_requires_cash_flow() {
        let r = InvestmentRestrictions::from_profile(RestrictionProfile::Strict);
        assert!(r.require_positive_cash_flow);
        assert_eq!(r.min_down_payment_percentage, dec!(0.25));
    }

    #[test]
    fn test_preset_catalog_serializes_by_name() {
        let v = serde_json::to_value(preset_catalog()).unwrap();
        assert_eq!(v["assumptions"]["aggressive"]["appreciation_rate"], "0.06");
        assert_eq!(v["restrictions"]["lenient"]["max_loan_to_value"], "0.90");
        assert_eq!(v["assumption_fields"].as_object().unwrap().len(), 8);
    }
}
