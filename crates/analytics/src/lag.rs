use crate::align::align;
use crate::correlation::{Correlation, pearson};
use crate::error::AnalyticsError;
use core_types::{LagProfile, MonthlySeries};
use std::ops::RangeInclusive;
use tracing::debug;

/// Correlates an indicator against the target over a symmetric window of lags.
///
/// For `lag > 0` the target is shifted forward, pairing `indicator[t]` with
/// `target[t - lag]`: a peak there means the target leads the indicator. For
/// `lag < 0` the indicator is shifted forward instead, pairing `indicator[t - |lag|]`
/// with `target[t]`: the indicator leads. Shifts are positional, see
/// `MonthlySeries::shift_forward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagSweeper {
    max_lag: u32,
}

impl Default for LagSweeper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LAG)
    }
}

impl LagSweeper {
    pub const DEFAULT_MAX_LAG: u32 = 6;

    pub fn new(max_lag: u32) -> Self {
        Self { max_lag }
    }

    pub fn max_lag(&self) -> u32 {
        self.max_lag
    }

    /// The lag set `-L..=L`.
    pub fn lags(&self) -> RangeInclusive<i32> {
        let l = self.max_lag as i32;
        -l..=l
    }

    /// Correlation of the two series at a single lag.
    pub fn correlation_at(
        &self,
        indicator: &MonthlySeries,
        target: &MonthlySeries,
        lag: i32,
    ) -> Result<Correlation, AnalyticsError> {
        let shift = lag.unsigned_abs() as usize;
        let pair = if lag > 0 {
            align(indicator, &target.shift_forward(shift))?
        } else if lag < 0 {
            align(&indicator.shift_forward(shift), target)?
        } else {
            align(indicator, target)?
        };
        pearson(&pair.left, &pair.right)
    }

    /// Sweeps every lag and keeps the ones that produce a defined coefficient.
    pub fn sweep(
        &self,
        indicator_name: &str,
        indicator: &MonthlySeries,
        target: &MonthlySeries,
    ) -> LagProfile {
        let mut profile = LagProfile::new(indicator_name);
        for lag in self.lags() {
            match self.correlation_at(indicator, target, lag) {
                Ok(c) => {
                    profile.correlations.insert(lag, c.coefficient);
                }
                Err(e) => debug!(indicator = indicator_name, lag, "Lag omitted: {}", e),
            }
        }
        profile
    }
}
