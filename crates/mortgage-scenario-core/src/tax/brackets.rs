use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::types::{Money, Rate};
use crate::CalcResult;

/// Schedules shipped with the crate. Brackets live in data, not code.
const BUNDLED_SCHEDULES: &str = include_str!("../../data/purchase_tax_schedules.json");

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which bracket table applies to a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketCategory {
    /// The buyer's only residential property
    FirstHouse,
    /// Any property bought while already owning one
    AdditionalProperty,
}

impl BracketCategory {
    pub fn from_first_house(is_first_house: bool) -> Self {
        if is_first_house {
            BracketCategory::FirstHouse
        } else {
            BracketCategory::AdditionalProperty
        }
    }
}

/// A single progressive bracket. `min_value` inclusive, `max_value` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_value: Money,
    /// `None` marks the open-ended top bracket
    #[serde(default)]
    pub max_value: Option<Money>,
    pub rate: Rate,
}

impl TaxBracket {
    /// Whether `value` falls inside this bracket.
    pub fn contains(&self, value: Money) -> bool {
        value >= self.min_value && self.max_value.is_none_or(|max| value < max)
    }

    /// Portion of `value` taxed inside this bracket (zero when the value does not reach it).
    pub fn taxable_slice(&self, value: Money) -> Money {
        if value <= self.min_value {
            return Decimal::ZERO;
        }
        let upper = match self.max_value {
            Some(max) => value.min(max),
            None => value,
        };
        upper - self.min_value
    }
}

/// An ordered, contiguous bracket sequence whose last bracket is unbounded.
///
/// Construction validates the ordering so lookups never have to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> CalcResult<Self> {
        validate_brackets(&brackets)?;
        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// The bracket containing `value`, if any (negative values match nothing).
    pub fn lookup(&self, value: Money) -> Option<&TaxBracket> {
        self.brackets.iter().find(|b| b.contains(value))
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = CalcError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        BracketTable::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

/// Purchase-tax brackets for one jurisdiction and tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTaxSchedule {
    pub jurisdiction: String,
    pub tax_year: i32,
    /// First transaction date the schedule applies to
    pub effective_from: NaiveDate,
    pub first_house: BracketTable,
    pub additional_property: BracketTable,
}

impl PurchaseTaxSchedule {
    pub fn table(&self, category: BracketCategory) -> &BracketTable {
        match category {
            BracketCategory::FirstHouse => &self.first_house,
            BracketCategory::AdditionalProperty => &self.additional_property,
        }
    }

    /// Most recent schedule shipped with the crate.
    pub fn bundled() -> CalcResult<Self> {
        TaxScheduleSet::bundled()?.latest().cloned()
    }
}

/// Several schedules, kept sorted by `effective_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PurchaseTaxSchedule>", into = "Vec<PurchaseTaxSchedule>")]
pub struct TaxScheduleSet {
    schedules: Vec<PurchaseTaxSchedule>,
}

impl TaxScheduleSet {
    pub fn new(mut schedules: Vec<PurchaseTaxSchedule>) -> CalcResult<Self> {
        if schedules.is_empty() {
            return Err(CalcError::InvalidTaxSchedule(
                "at least one schedule is required".into(),
            ));
        }
        schedules.sort_by_key(|s| s.effective_from);
        for pair in schedules.windows(2) {
            if pair[0].effective_from == pair[1].effective_from
                && pair[0].jurisdiction == pair[1].jurisdiction
            {
                return Err(CalcError::InvalidTaxSchedule(format!(
                    "two {} schedules take effect on {}",
                    pair[0].jurisdiction, pair[0].effective_from
                )));
            }
        }
        Ok(Self { schedules })
    }

    /// Parse the schedules bundled in `data/purchase_tax_schedules.json`.
    pub fn bundled() -> CalcResult<Self> {
        Ok(serde_json::from_str(BUNDLED_SCHEDULES)?)
    }

    pub fn schedules(&self) -> &[PurchaseTaxSchedule] {
        &self.schedules
    }

    pub fn latest(&self) -> CalcResult<&PurchaseTaxSchedule> {
        self.schedules
            .last()
            .ok_or_else(|| CalcError::InvalidTaxSchedule("schedule set is empty".into()))
    }

    pub fn for_year(&self, tax_year: i32) -> CalcResult<&PurchaseTaxSchedule> {
        self.schedules
            .iter()
            .rev()
            .find(|s| s.tax_year == tax_year)
            .ok_or_else(|| {
                CalcError::InvalidTaxSchedule(format!("no schedule for tax year {tax_year}"))
            })
    }

    /// Schedule in force on `date`: the latest one whose `effective_from` is not after it.
    pub fn effective_on(&self, date: NaiveDate) -> CalcResult<&PurchaseTaxSchedule> {
        self.schedules
            .iter()
            .rev()
            .find(|s| s.effective_from <= date)
            .ok_or_else(|| {
                CalcError::InvalidTaxSchedule(format!("no schedule in force on {date}"))
            })
    }
}

impl TryFrom<Vec<PurchaseTaxSchedule>> for TaxScheduleSet {
    type Error = CalcError;

    fn try_from(schedules: Vec<PurchaseTaxSchedule>) -> Result<Self, Self::Error> {
        TaxScheduleSet::new(schedules)
    }
}

impl From<TaxScheduleSet> for Vec<PurchaseTaxSchedule> {
    fn from(set: TaxScheduleSet) -> Self {
        set.schedules
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_brackets(brackets: &[TaxBracket]) -> CalcResult<()> {
    let first = brackets
        .first()
        .ok_or_else(|| CalcError::InvalidTaxSchedule("bracket table is empty".into()))?;

    if !first.min_value.is_zero() {
        return Err(CalcError::InvalidTaxSchedule(format!(
            "first bracket must start at 0, found {}",
            first.min_value
        )));
    }

    for (i, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(CalcError::InvalidTaxSchedule(format!(
                "bracket {i} rate {} outside [0, 1]",
                bracket.rate
            )));
        }

        let is_last = i + 1 == brackets.len();
        match (bracket.max_value, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(CalcError::InvalidTaxSchedule(format!(
                    "bracket {i} is unbounded but is not the last bracket"
                )));
            }
            (Some(_), true) => {
                return Err(CalcError::InvalidTaxSchedule(
                    "last bracket must be unbounded".into(),
                ));
            }
            (Some(max), false) => {
                if max <= bracket.min_value {
                    return Err(CalcError::InvalidTaxSchedule(format!(
                        "bracket {i} upper bound {max} not above lower bound {}",
                        bracket.min_value
                    )));
                }
                let next_min = brackets[i + 1].min_value;
                if next_min != max {
                    return Err(CalcError::InvalidTaxSchedule(format!(
                        "bracket {} starts at {next_min} but bracket {i} ends at {max}",
                        i + 1
                    )));
                }
            }
        }
    }

    Ok(())
}
