use crate::enums::{CorrelationStrength, LeadLag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Simultaneous (lag 0) correlation between one indicator and the target series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub indicator: String,
    /// Pearson coefficient in `[-1, 1]`.
    pub correlation: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
    pub n_observations: usize,
}

impl CorrelationResult {
    pub fn strength(&self) -> CorrelationStrength {
        CorrelationStrength::classify(self.correlation)
    }
}

/// One `(indicator, lag)` pair from the lag sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaggedCorrelationResult {
    pub indicator: String,
    pub lag: i32,
    pub correlation: f64,
}

impl LaggedCorrelationResult {
    pub fn lead_lag(&self) -> LeadLag {
        LeadLag::from_lag(self.lag)
    }
}

/// All defined lag correlations for a single indicator.
///
/// Lags that were undefined or had too few observations are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagProfile {
    pub indicator: String,
    pub correlations: BTreeMap<i32, f64>,
}

impl LagProfile {
    pub fn new(indicator: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            correlations: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.correlations.is_empty()
    }

    /// Flattens the profile into one result per lag, in ascending lag order.
    pub fn results(&self) -> impl Iterator<Item = LaggedCorrelationResult> + '_ {
        self.correlations
            .iter()
            .map(|(lag, correlation)| LaggedCorrelationResult {
                indicator: self.indicator.clone(),
                lag: *lag,
                correlation: *correlation,
            })
    }

    /// The lag with the largest absolute correlation. The earliest lag wins a tie.
    pub fn peak(&self) -> Option<LaggedCorrelationResult> {
        self.results().fold(None, |best, candidate| match best {
            Some(b) if b.correlation.abs() >= candidate.correlation.abs() => Some(b),
            _ => Some(candidate),
        })
    }
}
