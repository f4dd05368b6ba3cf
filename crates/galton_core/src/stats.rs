use serde::{Deserialize, Serialize};

/// Summary of a slot histogram next to the ideal binomial board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStatistics {
    pub total: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// Mean of Binomial(slots - 1, 0.5).
    pub expected_mean: f64,
    /// Variance of Binomial(slots - 1, 0.5).
    pub expected_variance: f64,
}

impl SlotStatistics {
    pub fn from_counts(counts: &[usize]) -> Self {
        let pegs = counts.len().saturating_sub(1) as f64;
        let expected_mean = pegs * 0.5;
        let expected_variance = pegs * 0.25;

        let total: usize = counts.iter().sum();
        if total == 0 {
            return Self {
                total,
                mean: 0.0,
                variance: 0.0,
                std_dev: 0.0,
                expected_mean,
                expected_variance,
            };
        }

        let n = total as f64;
        let mean = counts.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum::<f64>() / n;
        let variance = counts
            .iter()
            .enumerate()
            .map(|(i, &c)| c as f64 * (i as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Self { total, mean, variance, std_dev: variance.sqrt(), expected_mean, expected_variance }
    }

    /// Distance of the observed mean from the ideal, in standard errors.
    /// 0 when nothing has settled.
    pub fn mean_z_score(&self) -> f64 {
        if self.total == 0 || self.expected_variance == 0.0 {
            return 0.0;
        }
        let standard_error = (self.expected_variance / self.total as f64).sqrt();
        (self.mean - self.expected_mean) / standard_error
    }
}
