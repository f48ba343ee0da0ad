pub mod error;
pub mod scenario;
pub mod tax;
pub mod time_value;
pub mod types;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::CalcError;
pub use types::*;

/// Standard result type for all scenario calculations
pub type CalcResult<T> = Result<T, CalcError>;
