pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "emi")]
pub mod emi;

#[cfg(feature = "restructuring")]
pub mod restructuring;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "display")]
pub mod display;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all microlend operations
pub type LendingResult<T> = Result<T, LendingError>;
