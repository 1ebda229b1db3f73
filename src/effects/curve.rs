//! Piecewise-linear curves.
//!
//! Curves map one scalar to another: attribute value to damage scale,
//! duration progress to magnitude, seconds alive to growth multiplier.
//! Inputs outside the key range clamp to the first or last key.

use serde::{Deserialize, Serialize};

/// A single curve key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Input.
    pub x: f64,
    /// Output at `x`.
    pub y: f64,
}

/// Piecewise-linear curve over sorted keys.
///
/// ```
/// use gameplay_effects::effects::Curve;
///
/// let ramp = Curve::linear(0.0, 1.0, 10.0, 3.0);
/// assert_eq!(ramp.evaluate(-5.0), 1.0);
/// assert_eq!(ramp.evaluate(5.0), 2.0);
/// assert_eq!(ramp.evaluate(20.0), 3.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<CurveKey>,
}

impl Curve {
    /// Create a curve from `(x, y)` points. Points are sorted by `x`.
    pub fn new(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut keys: Vec<CurveKey> = points
            .into_iter()
            .map(|(x, y)| CurveKey { x, y })
            .collect();
        keys.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { keys }
    }

    /// A curve returning `value` everywhere.
    pub fn constant(value: f64) -> Self {
        Self::new([(0.0, value)])
    }

    /// A straight line from `(x0, y0)` to `(x1, y1)`.
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new([(x0, y0), (x1, y1)])
    }

    /// The keys, sorted by input.
    #[must_use]
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve. An empty curve evaluates to 1.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 1.0,
        };

        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }

        // First key strictly right of x; guaranteed 1..len by the clamps above
        let hi = self.keys.partition_point(|k| k.x <= x);
        let a = self.keys[hi - 1];
        let b = self.keys[hi];
        let span = b.x - a.x;
        if span <= 0.0 {
            return b.y;
        }
        a.y + (b.y - a.y) * ((x - a.x) / span)
    }
}
