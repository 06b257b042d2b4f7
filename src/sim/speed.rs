//! Upstream speed source
//!
//! The renderer never sees where speed comes from. Anything that can report a
//! current road speed in km/h (a wheel sensor bridge, a replay, a test stub)
//! implements [`SpeedSignal`].

/// Current speed in km/h, or `None` while the source is unavailable
pub trait SpeedSignal {
    fn current_kmh(&mut self) -> Option<f64>;
}

impl<F> SpeedSignal for F
where
    F: FnMut() -> Option<f64>,
{
    fn current_kmh(&mut self) -> Option<f64> {
        self()
    }
}

/// A source that always reports the same speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSpeed(pub f64);

impl SpeedSignal for ConstantSpeed {
    fn current_kmh(&mut self) -> Option<f64> {
        Some(self.0)
    }
}

/// A source that is never connected
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignal;

impl SpeedSignal for NoSignal {
    fn current_kmh(&mut self) -> Option<f64> {
        None
    }
}
