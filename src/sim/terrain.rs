//! Procedural road terrain
//!
//! Elevation and lateral curvature are fixed sums of sine waves over the
//! longitudinal position. The periods are mutually prime-ish so the pattern
//! does not visibly repeat inside the draw distance.

use serde::{Deserialize, Serialize};

/// One `amplitude * sin(x / period)` component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SineTerm {
    pub amplitude: f64,
    pub period: f64,
}

impl SineTerm {
    pub const fn new(amplitude: f64, period: f64) -> Self {
        Self { amplitude, period }
    }

    #[inline]
    pub fn sample(&self, x: f64) -> f64 {
        self.amplitude * (x / self.period).sin()
    }
}

/// A constant offset plus a list of sine components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Waveform {
    pub offset: f64,
    pub terms: Vec<SineTerm>,
}

impl Waveform {
    pub fn new(offset: f64, terms: Vec<SineTerm>) -> Self {
        Self { offset, terms }
    }

    pub fn sample(&self, x: f64) -> f64 {
        self.terms
            .iter()
            .fold(self.offset, |acc, term| acc + term.sample(x))
    }
}

/// Road shape as a pure function of longitudinal position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainField {
    pub elevation: Waveform,
    pub curve: Waveform,
}

impl Default for TerrainField {
    fn default() -> Self {
        Self::hills()
    }
}

impl TerrainField {
    /// Rolling hills with S-bends
    pub fn hills() -> Self {
        Self {
            elevation: Waveform::new(
                200.0,
                vec![SineTerm::new(80.0, 13.0), SineTerm::new(-120.0, 7.0)],
            ),
            curve: Waveform::new(
                0.0,
                vec![SineTerm::new(200.0, 17.0), SineTerm::new(170.0, 8.0)],
            ),
        }
    }

    /// Level, straight road
    pub fn flat() -> Self {
        Self {
            elevation: Waveform::default(),
            curve: Waveform::default(),
        }
    }

    /// Vertical elevation at `x`
    #[inline]
    pub fn elevation(&self, x: f64) -> f64 {
        self.elevation.sample(x)
    }

    /// Lateral road centre at `x`
    #[inline]
    pub fn lateral_curve(&self, x: f64) -> f64 {
        self.curve.sample(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hills_at_origin() {
        let terrain = TerrainField::hills();
        assert!((terrain.elevation(0.0) - 200.0).abs() < 1e-12);
        assert!(terrain.lateral_curve(0.0).abs() < 1e-12);
    }

    #[test]
    fn test_hills_matches_closed_form() {
        let terrain = TerrainField::hills();
        let x = 42.5_f64;
        let z = 200.0 + 80.0 * (x / 13.0).sin() - 120.0 * (x / 7.0).sin();
        let y = 200.0 * (x / 17.0).sin() + 170.0 * (x / 8.0).sin();
        assert!((terrain.elevation(x) - z).abs() < 1e-9);
        assert!((terrain.lateral_curve(x) - y).abs() < 1e-9);
    }

    #[test]
    fn test_flat_is_zero() {
        let terrain = TerrainField::flat();
        for x in [-100.0, 0.0, 3.7, 1e6] {
            assert_eq!(terrain.elevation(x), 0.0);
            assert_eq!(terrain.lateral_curve(x), 0.0);
        }
    }

    proptest! {
        #[test]
        fn prop_sampling_is_deterministic(x in -1.0e6f64..1.0e6) {
            let a = TerrainField::hills();
            let b = a.clone();
            prop_assert_eq!(a.elevation(x).to_bits(), a.elevation(x).to_bits());
            prop_assert_eq!(a.elevation(x).to_bits(), b.elevation(x).to_bits());
            prop_assert_eq!(a.lateral_curve(x).to_bits(), b.lateral_curve(x).to_bits());
        }
    }
}
