use serde::{Deserialize, Serialize};
use std::fmt;

/// The temporal relationship implied by a lag from the lag sweep.
///
/// Sign convention: a positive lag pairs `indicator[t]` with `target[t - lag]`, so a
/// peak there means the target moves first. A negative lag pairs
/// `indicator[t - |lag|]` with `target[t]`, so the indicator moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadLag {
    /// The target series leads the indicator by this many months.
    TargetLeads(u32),
    /// The indicator leads the target series by this many months.
    IndicatorLeads(u32),
    Simultaneous,
}

impl LeadLag {
    pub fn from_lag(lag: i32) -> Self {
        match lag {
            0 => LeadLag::Simultaneous,
            l if l > 0 => LeadLag::TargetLeads(l.unsigned_abs()),
            l => LeadLag::IndicatorLeads(l.unsigned_abs()),
        }
    }

    /// Inverse of `from_lag`.
    pub fn lag(&self) -> i32 {
        match *self {
            LeadLag::TargetLeads(m) => m as i32,
            LeadLag::IndicatorLeads(m) => -(m as i32),
            LeadLag::Simultaneous => 0,
        }
    }

    /// A human-readable sentence, e.g. "USD/KRW leads Sales by 3 months".
    pub fn describe(&self, indicator: &str, target: &str) -> String {
        match *self {
            LeadLag::TargetLeads(m) => format!("{target} leads {indicator} by {m} {}", months(m)),
            LeadLag::IndicatorLeads(m) => {
                format!("{indicator} leads {target} by {m} {}", months(m))
            }
            LeadLag::Simultaneous => format!("{indicator} moves simultaneously with {target}"),
        }
    }
}

fn months(m: u32) -> &'static str {
    if m == 1 { "month" } else { "months" }
}

/// Qualitative band for the magnitude of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub const STRONG_THRESHOLD: f64 = 0.7;
    pub const MODERATE_THRESHOLD: f64 = 0.5;

    pub fn classify(correlation: f64) -> Self {
        let magnitude = correlation.abs();
        if magnitude >= Self::STRONG_THRESHOLD {
            CorrelationStrength::Strong
        } else if magnitude >= Self::MODERATE_THRESHOLD {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
        };
        f.write_str(label)
    }
}
