//! # Leadlag Engine
//!
//! The analysis orchestrator. `AnalysisEngine::run_full_analysis` windows the inputs,
//! fans the per-indicator statistics out over a thread pool, then ranks and assembles
//! the results into an `AnalysisBundle`.
//!
//! The engine is synchronous and holds no state between runs: the same inputs always
//! produce the same bundle.

use analytics::{AnalyticsError, CorrelationMatrix, JointFrame, LagSweeper, align, pearson};
use analyzer::{Insights, Ranker};
use configuration::AnalysisSettings;
use core_types::{CorrelationResult, IndicatorSet, LagProfile, MonthlySeries};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

pub mod bundle;
pub mod error;
pub mod window;

pub use bundle::{AnalysisBundle, AnalysisMetadata, SkipReason, SkippedIndicator};
pub use error::EngineError;
pub use window::AnalysisWindow;

/// What one indicator produced against the windowed target.
enum IndicatorOutcome {
    Unknown,
    Analyzed {
        correlation: Result<CorrelationResult, AnalyticsError>,
        profile: LagProfile,
    },
}

/// Runs correlation and lead/lag analyses of indicators against a target series.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    sweeper: LagSweeper,
    top_correlations: usize,
    top_lagged: usize,
    target_name: String,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl AnalysisEngine {
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            sweeper: LagSweeper::new(settings.lag_window),
            top_correlations: settings.top_correlations,
            top_lagged: settings.top_lagged_correlations,
            target_name: settings.target_name.clone(),
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Analyzes every selected indicator against `target` over the trailing window.
    ///
    /// Per-indicator failures are logged and reported in `AnalysisBundle::skipped`;
    /// they never abort the run.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters` for an empty or duplicated selection, a zero look-back,
    ///   a zero top-N, or an indicator named like the target.
    /// - `EmptyWindow` if the window holds no target data, or no data for any of the
    ///   selected indicators.
    /// - `NoValidResults` if no indicator yielded a single correlation.
    pub fn run_full_analysis(
        &self,
        indicators: &IndicatorSet,
        target: &MonthlySeries,
        selected: &[String],
        lookback_months: u32,
    ) -> Result<AnalysisBundle, EngineError> {
        self.validate(target, selected, lookback_months)?;

        // --- Phase 1: window ---
        let available = selected.iter().filter_map(|name| indicators.get(name));
        let window = AnalysisWindow::resolve(target, available, lookback_months).ok_or_else(|| {
            EngineError::InvalidParameters("the target series is empty".to_string())
        })?;
        let period = window.period();
        let target_w = window.apply(target);
        if target_w.is_empty() {
            return Err(EngineError::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }

        let windowed: Vec<(&str, Option<MonthlySeries>)> = selected
            .iter()
            .map(|name| (name.as_str(), indicators.get(name).map(|s| window.apply(s))))
            .collect();
        let known = windowed.iter().filter(|(_, s)| s.is_some()).count();
        let with_data = windowed
            .iter()
            .filter(|(_, s)| s.as_ref().is_some_and(|s| !s.is_empty()))
            .count();
        if known > 0 && with_data == 0 {
            return Err(EngineError::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }
        info!(
            period = %period,
            target_months = target_w.len(),
            indicators = known,
            "Analysis window resolved"
        );

        // --- Phase 2: compute ---
        let outcomes: Vec<IndicatorOutcome> = windowed
            .par_iter()
            .map(|(name, series)| match series {
                Some(series) => self.analyze_indicator(name, series, &target_w),
                None => IndicatorOutcome::Unknown,
            })
            .collect();

        let mut correlations = Vec::new();
        let mut lag_profiles = Vec::new();
        let mut skipped = Vec::new();
        for ((name, _), outcome) in windowed.iter().zip(outcomes) {
            match outcome {
                IndicatorOutcome::Unknown => {
                    warn!(indicator = %name, "Selected indicator is not available, skipping");
                    skipped.push(SkippedIndicator {
                        indicator: name.to_string(),
                        reason: SkipReason::UnknownIndicator,
                        detail: "not present in the indicator set".to_string(),
                    });
                }
                IndicatorOutcome::Analyzed {
                    correlation,
                    profile,
                } => {
                    match correlation {
                        Ok(result) => correlations.push(result),
                        Err(e) if profile.is_empty() => {
                            warn!(indicator = %name, "Indicator skipped: {}", e);
                            skipped.push(SkippedIndicator {
                                indicator: name.to_string(),
                                reason: SkipReason::from(&e),
                                detail: e.to_string(),
                            });
                        }
                        Err(e) => {
                            warn!(indicator = %name, "No simultaneous correlation: {}", e);
                        }
                    }
                    if !profile.is_empty() {
                        lag_profiles.push(profile);
                    }
                }
            }
        }

        if correlations.is_empty() && lag_profiles.is_empty() {
            return Err(EngineError::NoValidResults {
                requested: selected.len(),
                period,
            });
        }

        let mut columns: Vec<(&str, &MonthlySeries)> = windowed
            .iter()
            .filter_map(|(name, s)| s.as_ref().filter(|s| !s.is_empty()).map(|s| (*name, s)))
            .collect();
        columns.push((self.target_name.as_str(), &target_w));
        let joint_frame = JointFrame::inner_join(&columns);
        let correlation_matrix = match CorrelationMatrix::from_frame(&joint_frame) {
            Ok(matrix) => Some(matrix),
            Err(e) => {
                warn!("Correlation matrix unavailable: {}", e);
                None
            }
        };
        info!(
            correlations = correlations.len(),
            lag_profiles = lag_profiles.len(),
            skipped = skipped.len(),
            joint_rows = joint_frame.len(),
            "Statistics computed"
        );

        // --- Phase 3: rank & assemble ---
        let rankings = Ranker::new(self.top_correlations, self.top_lagged)
            .rank(&correlations, &lag_profiles);
        let insights = Insights::derive(&rankings, &self.target_name);
        info!(
            top = rankings.top_correlations.len(),
            top_lagged = rankings.top_lagged_correlations.len(),
            "Analysis complete"
        );

        Ok(AnalysisBundle {
            correlations,
            lag_profiles,
            top_correlations: rankings.top_correlations,
            top_lagged_correlations: rankings.top_lagged_correlations,
            correlation_matrix,
            joint_frame,
            insights,
            skipped,
            metadata: AnalysisMetadata {
                target_name: self.target_name.clone(),
                selected_indicators: selected.to_vec(),
                lookback_months,
                lag_window: self.sweeper.max_lag(),
                window,
                period,
            },
        })
    }

    fn validate(
        &self,
        target: &MonthlySeries,
        selected: &[String],
        lookback_months: u32,
    ) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidParameters(msg));
        if selected.is_empty() {
            return invalid("no indicators selected".to_string());
        }
        if lookback_months == 0 {
            return invalid("lookback_months must be greater than zero".to_string());
        }
        if self.top_correlations == 0 || self.top_lagged == 0 {
            return invalid("top-N counts must be greater than zero".to_string());
        }
        if target.is_empty() {
            return invalid("the target series is empty".to_string());
        }
        let mut seen = HashSet::new();
        for name in selected {
            if *name == self.target_name {
                return invalid(format!("indicator '{name}' clashes with the target column"));
            }
            if !seen.insert(name.as_str()) {
                return invalid(format!("indicator '{name}' is selected twice"));
            }
        }
        Ok(())
    }

    fn analyze_indicator(
        &self,
        name: &str,
        series: &MonthlySeries,
        target: &MonthlySeries,
    ) -> IndicatorOutcome {
        let correlation = align(series, target).and_then(|pair| {
            let c = pearson(&pair.left, &pair.right)?;
            Ok(CorrelationResult {
                indicator: name.to_string(),
                correlation: c.coefficient,
                p_value: c.p_value,
                n_observations: c.n_observations,
            })
        });
        let profile = self.sweeper.sweep(name, series, target);
        IndicatorOutcome::Analyzed {
            correlation,
            profile,
        }
    }
}
