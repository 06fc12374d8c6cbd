pub mod enums;
pub mod error;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{CorrelationStrength, LeadLag};
pub use error::CoreError;
pub use series::{IndicatorSet, MonthlySeries, month_end, month_end_of};
pub use structs::{CorrelationResult, LagProfile, LaggedCorrelationResult};
