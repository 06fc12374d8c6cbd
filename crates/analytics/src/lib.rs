//! # Leadlag Analytics
//!
//! The statistical building blocks for comparing a sales series against economic
//! indicators: alignment, Pearson correlation, the lag sweep and the correlation matrix.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function takes complete series and returns a value or
//!   an `AnalyticsError`. Undefined statistics are errors, never zeros, so callers can omit
//!   them.
//!
//! ## Public API
//!
//! - `align`: intersects two series on their shared months.
//! - `pearson` / `Correlation`: coefficient plus two-sided p-value.
//! - `LagSweeper`: correlations over a symmetric window of lags.
//! - `JointFrame` / `CorrelationMatrix`: the shared sample and its pairwise matrix.

// Declare the modules that constitute this crate.
pub mod align;
pub mod correlation;
pub mod error;
pub mod frame;
pub mod lag;
pub mod matrix;

// Re-export the key components to create a clean, public-facing API.
pub use align::{AlignedPair, MIN_OBSERVATIONS, align};
pub use correlation::{Correlation, pearson};
pub use error::AnalyticsError;
pub use frame::JointFrame;
pub use lag::LagSweeper;
pub use matrix::CorrelationMatrix;
