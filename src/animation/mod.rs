//! Animation support for the dialog stack
//!
//! - Cubic-bezier easing curves for smooth transitions
//! - A stack animator that interpolates each dialog from its previous transform
//!   to the one computed by the layout engine, with time passed in explicitly

pub mod animator;
pub mod easing;

pub use animator::{AnimatedDialog, StackAnimator};
pub use easing::CubicBezier;
