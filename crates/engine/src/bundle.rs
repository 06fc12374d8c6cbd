use crate::window::AnalysisWindow;
use analytics::{AnalyticsError, CorrelationMatrix, JointFrame};
use analyzer::{Insights, RankedCorrelation, RankedLag};
use core_types::{CorrelationResult, LagProfile};
use serde::Serialize;

/// Why a selected indicator contributed nothing to the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The name is not in the indicator set.
    UnknownIndicator,
    /// Too few months overlap the target inside the window.
    InsufficientData,
    /// The indicator or the target is constant over the overlap.
    UndefinedStatistic,
}

impl From<&AnalyticsError> for SkipReason {
    fn from(err: &AnalyticsError) -> Self {
        match err {
            AnalyticsError::UndefinedStatistic(_) | AnalyticsError::Calculation(_) => {
                SkipReason::UndefinedStatistic
            }
            AnalyticsError::InsufficientData { .. }
            | AnalyticsError::LengthMismatch { .. }
            | AnalyticsError::InsufficientJointData => SkipReason::InsufficientData,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedIndicator {
    pub indicator: String,
    pub reason: SkipReason,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    pub target_name: String,
    pub selected_indicators: Vec<String>,
    pub lookback_months: u32,
    pub lag_window: u32,
    pub window: AnalysisWindow,
    /// `"YYYY-MM to YYYY-MM"`
    pub period: String,
}

/// Everything one analysis run produces. Built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisBundle {
    /// Simultaneous correlations, in selection order.
    pub correlations: Vec<CorrelationResult>,
    /// Non-empty lag profiles, in selection order.
    pub lag_profiles: Vec<LagProfile>,
    pub top_correlations: Vec<RankedCorrelation>,
    pub top_lagged_correlations: Vec<RankedLag>,
    /// Absent when the selected indicators and the target share no month.
    pub correlation_matrix: Option<CorrelationMatrix>,
    pub joint_frame: JointFrame,
    pub insights: Insights,
    pub skipped: Vec<SkippedIndicator>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisBundle {
    pub fn correlation(&self, indicator: &str) -> Option<&CorrelationResult> {
        self.correlations.iter().find(|c| c.indicator == indicator)
    }

    pub fn lag_profile(&self, indicator: &str) -> Option<&LagProfile> {
        self.lag_profiles.iter().find(|p| p.indicator == indicator)
    }
}
