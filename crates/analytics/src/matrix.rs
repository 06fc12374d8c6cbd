use crate::correlation::coefficient;
use crate::error::AnalyticsError;
use crate::frame::JointFrame;
use serde::Serialize;

/// Square, symmetric matrix of pairwise Pearson coefficients.
///
/// Cells involving a constant column are undefined and hold `None`; the diagonal is
/// always `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
    n_observations: usize,
}

impl CorrelationMatrix {
    /// Computes every pairwise coefficient over the frame's shared sample.
    ///
    /// Fails with `InsufficientJointData` if the frame has no rows.
    pub fn from_frame(frame: &JointFrame) -> Result<Self, AnalyticsError> {
        if frame.is_empty() {
            return Err(AnalyticsError::InsufficientJointData);
        }

        let width = frame.columns.len();
        let columns: Vec<Vec<f64>> = (0..width)
            .map(|j| frame.rows.iter().map(|row| row[j]).collect())
            .collect();

        let mut cells = vec![vec![None; width]; width];
        for i in 0..width {
            cells[i][i] = Some(1.0);
            for j in (i + 1)..width {
                let r = coefficient(&columns[i], &columns[j]);
                cells[i][j] = r;
                cells[j][i] = r;
            }
        }

        Ok(Self {
            labels: frame.columns.clone(),
            cells,
            n_observations: frame.len(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of joint observations every cell was computed from.
    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// The coefficient between two labelled columns.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == col)?;
        self.cells[i][j]
    }

    /// Rows of the matrix in `labels` order.
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }
}
