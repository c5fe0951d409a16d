//! Bounded chart series.
//!
//! A `CarbonSeries` is a pair of label/value sequences that move in
//! lockstep: every push appends to both, and once the configured
//! capacity is exceeded the oldest pair is evicted from the front. The
//! live dashboard chart uses a 20-point window; the "historical" trend
//! is a fixed 24-point synthetic series (see [`simulate_history`]).

use chrono::Local;
use rand::Rng;

use crate::api::CarbonReading;

/// FIFO sliding window of `(label, value)` pairs.
///
/// Invariant: `labels.len() == values.len()` at all times.
#[derive(Debug, Clone)]
pub struct CarbonSeries {
    labels: Vec<String>,
    values: Vec<f64>,
    capacity: usize,
}

impl CarbonSeries {
    /// Create an empty series evicting beyond `capacity` points.
    ///
    /// A capacity of zero is treated as unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
            capacity,
        }
    }

    /// Append a point, evicting the oldest pair when over capacity.
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push(label.into());
        self.values.push(value);

        if self.capacity > 0 && self.labels.len() > self.capacity {
            self.labels.remove(0);
            self.values.remove(0);
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The most recent point, if any.
    pub fn last(&self) -> Option<(&str, f64)> {
        match (self.labels.last(), self.values.last()) {
            (Some(label), Some(&value)) => Some((label.as_str(), value)),
            _ => None,
        }
    }

    /// Largest value in the window (0.0 when empty). Used for bar scaling.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Number of synthetic points in the simulated history.
pub const HISTORY_HOURS: usize = 24;

/// Half-width of the simulated noise band (±10 %).
const NOISE_HALF_SPAN: f64 = 0.1;

/// Synthesize a decorative hourly trend around one live reading.
///
/// There is no historical backend; the trend is the current value with
/// independent ±10 % multiplicative noise per point, labeled with the
/// past `hours` hour marks (oldest first). Views must present it as
/// simulated, never as measured history.
pub fn simulate_history<R: Rng>(reading: &CarbonReading, hours: usize, rng: &mut R) -> CarbonSeries {
    let mut series = CarbonSeries::with_capacity(hours);
    let now = Local::now();

    for i in (0..hours).rev() {
        let stamp = now - chrono::Duration::hours(i as i64);
        let noise = rng.gen_range(-NOISE_HALF_SPAN..NOISE_HALF_SPAN);
        series.push(
            stamp.format("%H:%M").to_string(),
            reading.carbon_intensity * (1.0 + noise),
        );
    }

    series
}

/// Label for a live sample taken right now (`HH:MM`).
pub fn now_label() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reading(value: f64) -> CarbonReading {
        CarbonReading {
            region: "IN-WE".to_string(),
            carbon_intensity: value,
        }
    }

    #[test]
    fn window_evicts_oldest_in_lockstep() {
        let mut series = CarbonSeries::with_capacity(20);
        for i in 0..25 {
            series.push(format!("t{i}"), i as f64);
            assert_eq!(series.labels().len(), series.values().len());
        }

        assert_eq!(series.len(), 20);
        // Contents are exactly the last 20 pushes, in push order.
        assert_eq!(series.labels()[0], "t5");
        assert_eq!(series.values()[0], 5.0);
        assert_eq!(series.last(), Some(("t24", 24.0)));
        let expected: Vec<f64> = (5..25).map(|i| i as f64).collect();
        assert_eq!(series.values(), expected.as_slice());
    }

    #[test]
    fn under_capacity_nothing_is_evicted() {
        let mut series = CarbonSeries::with_capacity(20);
        for i in 0..20 {
            series.push(format!("t{i}"), i as f64);
        }
        assert_eq!(series.len(), 20);
        assert_eq!(series.labels()[0], "t0");
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        let mut series = CarbonSeries::with_capacity(0);
        for i in 0..100 {
            series.push(format!("t{i}"), i as f64);
        }
        assert_eq!(series.len(), 100);
    }

    #[test]
    fn simulated_history_has_exact_length_and_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = simulate_history(&reading(400.0), HISTORY_HOURS, &mut rng);

        assert_eq!(series.len(), 24);
        for &v in series.values() {
            assert!((360.0..=440.0).contains(&v), "point {v} outside ±10% band");
        }
    }

    #[test]
    fn max_value_scales_bars() {
        let mut series = CarbonSeries::with_capacity(5);
        series.push("a", 10.0);
        series.push("b", 90.0);
        series.push("c", 40.0);
        assert_eq!(series.max_value(), 90.0);
        assert_eq!(CarbonSeries::with_capacity(5).max_value(), 0.0);
    }
}
