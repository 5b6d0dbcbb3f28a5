use serde::{Deserialize, Serialize};
use std::fmt;

/// Divisor used for the mean cycle time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AverageBasis {
    /// Sum of durations over the number of durations collected.
    #[default]
    Successful,
    /// Sum of durations over the number of history reads attempted,
    /// failed reads included.
    Attempted,
}

impl fmt::Display for AverageBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Successful => "successful",
            Self::Attempted => "attempted",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AverageBasis {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "successful" => Ok(Self::Successful),
            "attempted" => Ok(Self::Attempted),
            other => Err(format!(
                "invalid average basis {other:?}; expected successful or attempted"
            )),
        }
    }
}

/// Cycle-time statistics in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub basis: AverageBasis,
    pub divisor: usize,
}

impl DurationStats {
    /// `None` when no durations were collected.
    ///
    /// `attempted` is only consulted for [`AverageBasis::Attempted`]; a value
    /// smaller than the sample count falls back to the sample count.
    pub fn from_samples(samples: &[f64], basis: AverageBasis, attempted: usize) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let sum: f64 = sorted.iter().sum();
        let divisor = match basis {
            AverageBasis::Successful => sorted.len(),
            AverageBasis::Attempted => attempted.max(sorted.len()),
        };

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: sum / divisor as f64,
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
            basis,
            divisor,
        })
    }

    /// False only when an attempted-basis mean was dragged below `min` by
    /// failed reads.
    pub fn mean_within_bounds(&self) -> bool {
        // summation can round the mean a hair past the extremes
        let eps = 1e-9 * self.max.abs().max(1.0);
        self.min <= self.mean + eps && self.mean <= self.max + eps
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = (q.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}
