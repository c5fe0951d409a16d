//! Carbon intensity classification.
//!
//! Maps a grid carbon intensity reading (gCO2eq/kWh) to a status band and
//! a display color. Every view in gridwatch — dashboard, carbon trend,
//! zone survey, task runner, chat — colors readings through this module,
//! so the thresholds live in exactly one place.

use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Classification bands for a carbon intensity reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonStatus {
    Excellent,
    Good,
    High,
    VeryHigh,
}

/// Threshold below which a grid counts as excellent (gCO2eq/kWh).
pub const EXCELLENT_BELOW: f64 = 100.0;
/// Threshold below which a grid counts as good.
pub const GOOD_BELOW: f64 = 300.0;
/// Threshold below which a grid counts as high (but workable).
pub const HIGH_BELOW: f64 = 500.0;

/// Classify a carbon intensity reading.
///
/// Total for any finite input; callers must not pass NaN (a NaN fails
/// every comparison and lands in `VeryHigh`).
pub fn classify(intensity: f64) -> CarbonStatus {
    if intensity < EXCELLENT_BELOW {
        CarbonStatus::Excellent
    } else if intensity < GOOD_BELOW {
        CarbonStatus::Good
    } else if intensity < HIGH_BELOW {
        CarbonStatus::High
    } else {
        CarbonStatus::VeryHigh
    }
}

impl CarbonStatus {
    /// Short status label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    /// One-line guidance shown next to the label.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Excellent => "very clean grid",
            Self::Good => "moderate carbon",
            Self::High => "consider delaying",
            Self::VeryHigh => "avoid tasks",
        }
    }

    /// Display color as RGB components.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Excellent => (0x39, 0xFF, 0x14),
            Self::Good => (0xFF, 0xD7, 0x00),
            Self::High => (0xFF, 0x8C, 0x00),
            Self::VeryHigh => (0xFF, 0x07, 0x3A),
        }
    }

    /// Display color as a `#RRGGBB` hex string.
    pub fn hex_color(&self) -> &'static str {
        match self {
            Self::Excellent => "#39FF14",
            Self::Good => "#FFD700",
            Self::High => "#FF8C00",
            Self::VeryHigh => "#FF073A",
        }
    }

    /// Paint a string in this status's color for terminal output.
    pub fn paint(&self, text: &str) -> ColoredString {
        let (r, g, b) = self.rgb();
        text.truecolor(r, g, b)
    }
}

impl std::fmt::Display for CarbonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Render an intensity with its status label, painted, e.g. `412.3 gCO2/kWh (High)`.
pub fn describe(intensity: f64) -> ColoredString {
    let status = classify(intensity);
    status.paint(&format!("{intensity:.1} gCO2/kWh ({})", status.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        assert_eq!(classify(99.9), CarbonStatus::Excellent);
        assert_eq!(classify(100.0), CarbonStatus::Good);
        assert_eq!(classify(299.9), CarbonStatus::Good);
        assert_eq!(classify(300.0), CarbonStatus::High);
        assert_eq!(classify(499.9), CarbonStatus::High);
        assert_eq!(classify(500.0), CarbonStatus::VeryHigh);
    }

    #[test]
    fn zero_and_extremes() {
        assert_eq!(classify(0.0), CarbonStatus::Excellent);
        assert_eq!(classify(10_000.0), CarbonStatus::VeryHigh);
    }

    #[test]
    fn monotonic_across_increasing_intensities() {
        // Goodness never improves as intensity rises.
        fn rank(s: CarbonStatus) -> u8 {
            match s {
                CarbonStatus::Excellent => 0,
                CarbonStatus::Good => 1,
                CarbonStatus::High => 2,
                CarbonStatus::VeryHigh => 3,
            }
        }
        let samples = [0.0, 50.0, 99.9, 100.0, 250.0, 300.0, 450.0, 500.0, 900.0];
        for pair in samples.windows(2) {
            assert!(rank(classify(pair[0])) <= rank(classify(pair[1])));
        }
    }

    #[test]
    fn colors_match_status() {
        assert_eq!(CarbonStatus::Excellent.hex_color(), "#39FF14");
        assert_eq!(CarbonStatus::Good.hex_color(), "#FFD700");
        assert_eq!(CarbonStatus::High.hex_color(), "#FF8C00");
        assert_eq!(CarbonStatus::VeryHigh.hex_color(), "#FF073A");
        assert_eq!(CarbonStatus::VeryHigh.rgb(), (0xFF, 0x07, 0x3A));
    }
}
