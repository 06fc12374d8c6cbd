use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::MonthlySeries;

/// Minimum number of paired observations for a correlation to be meaningful.
/// Two points always correlate perfectly (or not at all).
pub const MIN_OBSERVATIONS: usize = 3;

/// Two series restricted to their shared months, paired index-for-index.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Intersects two series on their timestamps.
///
/// A month is kept only if both series have a non-`NaN` value for it. Returns
/// `InsufficientData` when fewer than `MIN_OBSERVATIONS` months survive.
pub fn align(left: &MonthlySeries, right: &MonthlySeries) -> Result<AlignedPair, AnalyticsError> {
    let mut pair = AlignedPair {
        dates: Vec::new(),
        left: Vec::new(),
        right: Vec::new(),
    };

    for (date, l) in left.iter() {
        let Some(r) = right.get(date) else { continue };
        if l.is_nan() || r.is_nan() {
            continue;
        }
        pair.dates.push(date);
        pair.left.push(l);
        pair.right.push(r);
    }

    if pair.len() < MIN_OBSERVATIONS {
        return Err(AnalyticsError::InsufficientData {
            found: pair.len(),
            required: MIN_OBSERVATIONS,
        });
    }
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::month_end_of;

    fn series(points: &[((i32, u32), f64)]) -> MonthlySeries {
        points
            .iter()
            .map(|((y, m), v)| (month_end_of(*y, *m).unwrap(), *v))
            .collect()
    }

    #[test]
    fn keeps_only_shared_months_in_order() {
        let a = series(&[((2023, 1), 1.0), ((2023, 2), 2.0), ((2023, 3), 3.0), ((2023, 4), 4.0)]);
        let b = series(&[((2023, 4), 40.0), ((2023, 2), 20.0), ((2023, 3), 30.0), ((2023, 5), 50.0)]);
        let pair = align(&a, &b).unwrap();
        assert_eq!(pair.left, vec![2.0, 3.0, 4.0]);
        assert_eq!(pair.right, vec![20.0, 30.0, 40.0]);
        assert_eq!(pair.dates[0], month_end_of(2023, 2).unwrap());
    }

    #[test]
    fn drops_months_with_nan_on_either_side() {
        let a = series(&[((2023, 1), 1.0), ((2023, 2), f64::NAN), ((2023, 3), 3.0), ((2023, 4), 4.0)]);
        let b = series(&[((2023, 1), 1.0), ((2023, 2), 2.0), ((2023, 3), 3.0), ((2023, 4), f64::NAN)]);
        let err = align(&a, &b).unwrap_err();
        assert_eq!(err, AnalyticsError::InsufficientData { found: 2, required: 3 });
    }

    #[test]
    fn two_shared_points_are_insufficient() {
        let a = series(&[((2023, 1), 1.0), ((2023, 2), 2.0)]);
        let b = series(&[((2023, 1), 1.0), ((2023, 2), 2.0), ((2023, 3), 3.0)]);
        assert!(matches!(align(&a, &b), Err(AnalyticsError::InsufficientData { found: 2, .. })));
    }
}
