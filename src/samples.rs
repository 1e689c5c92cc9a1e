//! Per page/verb collection of elapsed times and the statistics derived
//! from it. Every function here is total: empty and zero-variance
//! collections produce zeros, never NaN or infinity.

/// How many population standard deviations from the mean a sample may sit
/// before [`SampleCollection::reduce`] drops it.
pub const STD_DEVS: f64 = 3.0;

/// 95% confidence interval.
pub const Z_SCORE: f64 = 1.96;

/// Append-only sequence of elapsed times, in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleCollection {
    times: Vec<f64>,
}

impl SampleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, elapsed: f64) {
        self.times.push(elapsed);
    }

    pub fn count(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    pub fn sum(&self) -> f64 {
        self.times.iter().sum()
    }

    /// Arithmetic mean, or 0 for an empty collection. A zero mean means
    /// the rate is undefined.
    pub fn mean(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        self.sum() / self.times.len() as f64
    }

    /// Sum of squared deviations from the mean.
    fn squared_deviations(&self) -> f64 {
        let mean = self.mean();
        self.times.iter().map(|t| (t - mean) * (t - mean)).sum()
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        let n = self.times.len() as f64;
        let v = self.squared_deviations();
        if n == 0.0 || v <= 0.0 {
            return 0.0;
        }
        (v / n).sqrt()
    }

    /// New collection without outliers: one pass, keeping samples within
    /// [`STD_DEVS`] standard deviations of this collection's mean. The
    /// result is not trimmed again against its own narrower spread.
    pub fn reduce(&self) -> SampleCollection {
        let mean = self.mean();
        let limit = STD_DEVS * self.std_dev();

        let times = self
            .times
            .iter()
            .copied()
            .filter(|t| (t - mean).abs() <= limit)
            .collect();
        SampleCollection { times }
    }

    /// Half-width of the 95% confidence interval of the population mean.
    /// Callers pass the reduced collection.
    pub fn ci_width(&self) -> f64 {
        let n = self.times.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        Z_SCORE * (self.std_dev() / n.sqrt())
    }

    /// Requests per second implied by the mean, rounded. `None` when the
    /// mean is zero.
    pub fn rate(&self) -> Option<u64> {
        let mean = self.mean();
        if mean > 0.0 {
            Some((1.0 / mean).round() as u64)
        } else {
            None
        }
    }
}

impl FromIterator<f64> for SampleCollection {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        SampleCollection {
            times: iter.into_iter().collect(),
        }
    }
}
