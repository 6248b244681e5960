//! Cubic-bezier timing curves
//!
//! A curve runs from `(0, 0)` to `(1, 1)` through the control points
//! `(x1, y1)` and `(x2, y2)`, the same model CSS `cubic-bezier()` uses.

use serde::{Deserialize, Serialize};

const NEWTON_ITERATIONS: usize = 8;
const NEWTON_EPSILON: f32 = 1e-6;
const BISECTION_ITERATIONS: usize = 32;

/// Cubic-bezier easing curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    /// Fast start, long settle; the default curve for stacked dialogs
    pub const STACK: CubicBezier = CubicBezier::new(0.19, 1.0, 0.22, 1.0);

    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn linear() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub const fn ease_in() -> Self {
        Self::new(0.42, 0.0, 1.0, 1.0)
    }

    pub const fn ease_out() -> Self {
        Self::new(0.0, 0.0, 0.58, 1.0)
    }

    pub const fn ease_in_out() -> Self {
        Self::new(0.42, 0.0, 0.58, 1.0)
    }

    /// x coordinates outside `[0, 1]` would make the curve non-monotonic in time
    pub fn is_valid(&self) -> bool {
        let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        in_unit(self.x1) && in_unit(self.x2) && self.y1.is_finite() && self.y2.is_finite()
    }

    /// Map linear progress (0.0 to 1.0) to eased progress
    pub fn apply(&self, progress: f32) -> f32 {
        let x = progress.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }

        let t = self.solve_t(x);
        sample(self.y1, self.y2, t)
    }

    fn solve_t(&self, x: f32) -> f32 {
        // Newton-Raphson first, it converges quickly on well-behaved curves
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let error = sample(self.x1, self.x2, t) - x;
            if error.abs() < NEWTON_EPSILON {
                return t;
            }
            let slope = slope(self.x1, self.x2, t);
            if slope.abs() < NEWTON_EPSILON {
                break;
            }
            t -= error / slope;
        }

        let (mut low, mut high) = (0.0_f32, 1.0_f32);
        t = x;
        for _ in 0..BISECTION_ITERATIONS {
            let value = sample(self.x1, self.x2, t);
            if (value - x).abs() < NEWTON_EPSILON {
                break;
            }
            if value < x {
                low = t;
            } else {
                high = t;
            }
            t = (low + high) / 2.0;
        }
        t
    }
}

impl Default for CubicBezier {
    fn default() -> Self {
        Self::STACK
    }
}

impl From<[f32; 4]> for CubicBezier {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<CubicBezier> for [f32; 4] {
    fn from(curve: CubicBezier) -> Self {
        [curve.x1, curve.y1, curve.x2, curve.y2]
    }
}

/// One coordinate of the curve at parameter `t`
fn sample(p1: f32, p2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

/// Derivative of [`sample`] with respect to `t`
fn slope(p1: f32, p2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}
