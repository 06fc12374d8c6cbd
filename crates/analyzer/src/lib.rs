use core_types::{CorrelationResult, CorrelationStrength, LagProfile, LeadLag};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Default number of simultaneous correlations to keep.
pub const DEFAULT_TOP_CORRELATIONS: usize = 5;
/// Default number of lagged correlations to keep.
pub const DEFAULT_TOP_LAGGED: usize = 3;

/// One row of the simultaneous-correlation ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCorrelation {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub indicator: String,
    pub correlation: f64,
    pub p_value: f64,
    pub n_observations: usize,
    pub strength: CorrelationStrength,
}

/// One row of the lagged-correlation ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLag {
    pub rank: usize,
    pub indicator: String,
    pub lag: i32,
    pub correlation: f64,
    pub lead_lag: LeadLag,
}

/// Both rankings produced for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    pub top_correlations: Vec<RankedCorrelation>,
    pub top_lagged_correlations: Vec<RankedLag>,
}

/// Ranks correlation results by absolute magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    top_correlations: usize,
    top_lagged: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_CORRELATIONS, DEFAULT_TOP_LAGGED)
    }
}

impl Ranker {
    pub fn new(top_correlations: usize, top_lagged: usize) -> Self {
        Self {
            top_correlations,
            top_lagged,
        }
    }

    pub fn rank(&self, results: &[CorrelationResult], profiles: &[LagProfile]) -> Rankings {
        let rankings = Rankings {
            top_correlations: top_correlations(results, self.top_correlations),
            top_lagged_correlations: top_lagged_correlations(profiles, self.top_lagged),
        };
        debug!(
            candidates = results.len(),
            ranked = rankings.top_correlations.len(),
            ranked_lagged = rankings.top_lagged_correlations.len(),
            "Results ranked"
        );
        rankings
    }
}

/// The `n` simultaneous correlations with the largest `|r|`.
///
/// Ties keep the order in which the results were supplied.
pub fn top_correlations(results: &[CorrelationResult], n: usize) -> Vec<RankedCorrelation> {
    rank_by_magnitude(results.iter().collect::<Vec<_>>(), |r| r.correlation)
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| RankedCorrelation {
            rank: i + 1,
            indicator: r.indicator.clone(),
            correlation: r.correlation,
            p_value: r.p_value,
            n_observations: r.n_observations,
            strength: r.strength(),
        })
        .collect()
}

/// The `n` `(indicator, lag)` pairs with the largest `|r|`, across all indicators.
///
/// Candidates are flattened indicator by indicator (supplied order), lag by lag
/// (ascending), so an indicator may appear several times at different lags.
pub fn top_lagged_correlations(profiles: &[LagProfile], n: usize) -> Vec<RankedLag> {
    let candidates = profiles.iter().flat_map(|p| p.results()).collect::<Vec<_>>();
    rank_by_magnitude(candidates, |r| r.correlation)
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| RankedLag {
            rank: i + 1,
            lead_lag: r.lead_lag(),
            indicator: r.indicator,
            lag: r.lag,
            correlation: r.correlation,
        })
        .collect()
}

/// Stable sort by descending absolute value. Non-finite values are dropped.
fn rank_by_magnitude<T, F>(items: Vec<T>, value: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<T> = items.into_iter().filter(|i| value(i).is_finite()).collect();
    ranked.sort_by(|a, b| {
        value(b)
            .abs()
            .partial_cmp(&value(a).abs())
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Headline sentences derived from the rankings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    /// e.g. "USD/KRW: 0.812 (strong)"
    pub strongest_correlation: Option<String>,
    /// e.g. "WTI leads Sales by 2 months (r = -0.734)"
    pub best_predictive_relationship: Option<String>,
}

impl Insights {
    pub fn derive(rankings: &Rankings, target_name: &str) -> Self {
        let strongest_correlation = rankings.top_correlations.first().map(|top| {
            format!("{}: {:.3} ({})", top.indicator, top.correlation, top.strength)
        });
        let best_predictive_relationship = rankings.top_lagged_correlations.first().map(|top| {
            format!(
                "{} (r = {:.3})",
                top.lead_lag.describe(&top.indicator, target_name),
                top.correlation
            )
        });
        Self {
            strongest_correlation,
            best_predictive_relationship,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(indicator: &str, correlation: f64) -> CorrelationResult {
        CorrelationResult {
            indicator: indicator.to_string(),
            correlation,
            p_value: 0.05,
            n_observations: 12,
        }
    }

    fn profile(indicator: &str, lags: &[(i32, f64)]) -> LagProfile {
        let mut p = LagProfile::new(indicator);
        p.correlations.extend(lags.iter().copied());
        p
    }

    #[test]
    fn ranks_by_absolute_value_and_truncates() {
        let results = vec![
            result("A", 0.2),
            result("B", -0.9),
            result("C", 0.6),
            result("D", -0.1),
            result("E", 0.75),
            result("F", 0.3),
        ];
        let top = top_correlations(&results, 3);
        let names: Vec<&str> = top.iter().map(|r| r.indicator.as_str()).collect();
        assert_eq!(names, vec!["B", "E", "C"]);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].strength, CorrelationStrength::Strong);
        assert_eq!(top[2].strength, CorrelationStrength::Moderate);
        for w in top.windows(2) {
            assert!(w[0].correlation.abs() >= w[1].correlation.abs());
        }
    }

    #[test]
    fn ties_keep_supplied_order() {
        let results = vec![result("first", 0.5), result("second", -0.5), result("third", 0.5)];
        let top = top_correlations(&results, 5);
        let names: Vec<&str> = top.iter().map(|r| r.indicator.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn fewer_results_than_requested() {
        let top = top_correlations(&[result("only", 0.4)], 5);
        assert_eq!(top.len(), 1);
        assert!(top_correlations(&[], 5).is_empty());
        assert!(top_correlations(&[result("x", 0.4)], 0).is_empty());
    }

    #[test]
    fn non_finite_correlations_are_never_ranked() {
        let top = top_correlations(&[result("nan", f64::NAN), result("ok", 0.1)], 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].indicator, "ok");
    }

    #[test]
    fn lagged_ranking_spans_indicators_and_lags() {
        let profiles = vec![
            profile("WTI", &[(-2, 0.8), (0, 0.3), (1, -0.85)]),
            profile("CPI", &[(-1, 0.5), (3, 0.81)]),
        ];
        let top = top_lagged_correlations(&profiles, 3);
        let rows: Vec<(&str, i32)> = top.iter().map(|r| (r.indicator.as_str(), r.lag)).collect();
        assert_eq!(rows, vec![("WTI", 1), ("CPI", 3), ("WTI", -2)]);
        assert_eq!(top[0].lead_lag, LeadLag::TargetLeads(1));
        assert_eq!(top[2].lead_lag, LeadLag::IndicatorLeads(2));
    }

    #[test]
    fn ranker_applies_configured_sizes() {
        let results: Vec<_> = (0..8).map(|i| result(&format!("I{i}"), i as f64 / 10.0)).collect();
        let profiles = vec![profile("I1", &[(-1, 0.1), (0, 0.2), (1, 0.3), (2, 0.4)])];
        let rankings = Ranker::default().rank(&results, &profiles);
        assert_eq!(rankings.top_correlations.len(), 5);
        assert_eq!(rankings.top_lagged_correlations.len(), 3);
        assert_eq!(rankings.top_correlations[0].indicator, "I7");
    }

    #[test]
    fn insights_describe_the_leaders() {
        let rankings = Ranker::default().rank(
            &[result("USD/KRW", -0.812)],
            &[profile("WTI", &[(-2, 0.734)])],
        );
        let insights = Insights::derive(&rankings, "Sales");
        assert_eq!(
            insights.strongest_correlation.as_deref(),
            Some("USD/KRW: -0.812 (strong)")
        );
        assert_eq!(
            insights.best_predictive_relationship.as_deref(),
            Some("WTI leads Sales by 2 months (r = 0.734)")
        );
        assert_eq!(Insights::derive(&Rankings::default(), "Sales"), Insights::default());
    }
}
