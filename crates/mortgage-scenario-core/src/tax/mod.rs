pub mod brackets;
pub mod engine;

pub use brackets::{BracketCategory, BracketTable, PurchaseTaxSchedule, TaxBracket, TaxScheduleSet};
pub use engine::{capital_gains_tax, TaxEngine};
