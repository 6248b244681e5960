//! Stacked layout derivation
//!
//! Turns the open-set view of the registry into one visual transform per open
//! dialog. Rank is derived from registration order among the open dialogs:
//! the last open dialog in registration order is position 0 (front-most) and
//! earlier ones recede behind it.
//!
//! Layout is a pure function of the open ids and the stack configuration.

use super::types::{DialogError, DialogId, DialogResult};
use crate::animation::easing::CubicBezier;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default vertical offset per rank
pub const STACK_Y_OFFSET: f32 = 24.0;

/// Default scale reduction per rank
pub const STACK_SCALE_OFFSET: f32 = 0.05;

/// Default opacity reduction per rank
pub const STACK_OPACITY_OFFSET: f32 = 0.1;

/// Default transition duration
pub const STACK_DURATION: Duration = Duration::from_millis(400);

/// Scale every dialog enters from, independent of the offsets
pub const ENTER_SCALE: f32 = 0.85;

/// Per-rank deltas used to render stack depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackOffsets {
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for StackOffsets {
    fn default() -> Self {
        Self {
            y: STACK_Y_OFFSET,
            scale: STACK_SCALE_OFFSET,
            opacity: STACK_OPACITY_OFFSET,
        }
    }
}

/// Timing of the move from one transform to the next
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    pub ease: CubicBezier,
    #[serde(rename = "duration_ms", with = "millis")]
    pub duration: Duration,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            ease: CubicBezier::STACK,
            duration: STACK_DURATION,
        }
    }
}

impl Transition {
    pub fn new(ease: CubicBezier, duration: Duration) -> Self {
        Self { ease, duration }
    }
}

/// Offsets and timing for a dialog stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub offsets: StackOffsets,
    pub transition: Transition,
}

impl StackConfig {
    pub fn with_offsets(mut self, offsets: StackOffsets) -> Self {
        self.offsets = offsets;
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Offsets must be finite and non-negative; the curve must be a valid timing function
    pub fn validate(&self) -> DialogResult<()> {
        let offsets = [
            ("y", self.offsets.y),
            ("scale", self.offsets.scale),
            ("opacity", self.offsets.opacity),
        ];
        for (name, value) in offsets {
            if !value.is_finite() || value < 0.0 {
                return Err(DialogError::InvalidConfig(format!(
                    "stack offset '{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !self.transition.ease.is_valid() {
            return Err(DialogError::InvalidConfig(format!(
                "ease curve {:?} must have x coordinates within [0, 1]",
                <[f32; 4]>::from(self.transition.ease)
            )));
        }

        Ok(())
    }
}

/// Visual transform of one dialog in the stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackTransform {
    /// Vertical offset in stack units (negative moves up)
    pub translate_y: f32,
    pub scale: f32,
    pub opacity: f32,
    /// Stacking order; higher is drawn on top
    pub z_index: i32,
}

impl StackTransform {
    /// Settled transform for a dialog at `position` in a stack of `count`
    pub fn settled(position: usize, count: usize, offsets: &StackOffsets) -> Self {
        let rank = position as f32;
        Self {
            translate_y: 0.0 - rank * offsets.y,
            scale: 1.0 - rank * offsets.scale,
            opacity: 1.0 - rank * offsets.opacity,
            z_index: (count - position) as i32,
        }
    }

    /// Pose a dialog enters from. Only the front-most dialog is visible while
    /// entering so mid-stack dialogs do not flash into view.
    pub fn entering(position: usize, z_index: i32) -> Self {
        Self {
            translate_y: 0.0,
            scale: ENTER_SCALE,
            opacity: if position == 0 { 1.0 } else { 0.0 },
            z_index,
        }
    }

    /// Pose a dialog leaves towards, starting from `from`
    pub fn exiting(from: &StackTransform) -> Self {
        Self {
            translate_y: from.translate_y,
            scale: ENTER_SCALE,
            opacity: 0.0,
            z_index: from.z_index,
        }
    }

    /// Interpolate towards `target`; the z-index switches immediately
    pub fn lerp(&self, target: &StackTransform, t: f32) -> Self {
        Self {
            translate_y: self.translate_y + (target.translate_y - self.translate_y) * t,
            scale: self.scale + (target.scale - self.scale) * t,
            opacity: self.opacity + (target.opacity - self.opacity) * t,
            z_index: target.z_index,
        }
    }
}

/// Layout of one open dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    pub id: DialogId,
    /// Index within the open-set view (registration order)
    pub index: usize,
    /// Rank in the stack; 0 is front-most
    pub position: usize,
    /// Pose used when the dialog was not in the previous open set
    pub initial: StackTransform,
    /// Settled transform for this rank
    pub target: StackTransform,
    pub transition: Transition,
}

/// Transforms for every open dialog, in open-set order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackLayout {
    entries: Vec<StackEntry>,
}

impl StackLayout {
    /// Derive the layout for the open-set view `open_ids`
    pub fn compute(open_ids: &[DialogId], config: &StackConfig) -> Self {
        let count = open_ids.len();
        let entries = open_ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let position = count - index - 1;
                let target = StackTransform::settled(position, count, &config.offsets);
                StackEntry {
                    id: id.clone(),
                    index,
                    position,
                    initial: StackTransform::entering(position, target.z_index),
                    target,
                    transition: config.transition,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// The dialog at position 0
    pub fn front(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn get(&self, id: &DialogId) -> Option<&StackEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn ids(ids: &[&str]) -> Vec<DialogId> {
        ids.iter().map(|id| DialogId::from(*id)).collect()
    }

    #[test]
    fn test_single_dialog_is_front_and_settled() {
        let layout = StackLayout::compute(&ids(&["a"]), &StackConfig::default());
        let a = layout.get(&"a".into()).unwrap();

        assert_eq!(a.position, 0);
        assert!(approx(a.target.translate_y, 0.0));
        assert!(approx(a.target.scale, 1.0));
        assert!(approx(a.target.opacity, 1.0));
        assert_eq!(a.target.z_index, 1);
    }

    #[test]
    fn test_two_dialogs_scenario() {
        let layout = StackLayout::compute(&ids(&["a", "b"]), &StackConfig::default());
        let a = layout.get(&"a".into()).unwrap();
        let b = layout.get(&"b".into()).unwrap();

        assert_eq!((a.index, a.position), (0, 1));
        assert!(approx(a.target.translate_y, -24.0));
        assert!(approx(a.target.scale, 0.95));
        assert!(approx(a.target.opacity, 0.9));
        assert_eq!(a.target.z_index, 1);

        assert_eq!((b.index, b.position), (1, 0));
        assert!(approx(b.target.translate_y, 0.0));
        assert!(approx(b.target.scale, 1.0));
        assert!(approx(b.target.opacity, 1.0));
        assert_eq!(b.target.z_index, 2);

        assert_eq!(layout.front().map(|e| e.id.as_str()), Some("b"));
    }

    #[test]
    fn test_positions_are_a_permutation() {
        for n in 0..8 {
            let open: Vec<DialogId> = (0..n).map(|i| DialogId::new(format!("d{}", i))).collect();
            let layout = StackLayout::compute(&open, &StackConfig::default());

            let mut positions: Vec<usize> = layout.entries().iter().map(|e| e.position).collect();
            positions.sort_unstable();
            assert_eq!(positions, (0..n).collect::<Vec<_>>());

            if let Some(front) = layout.front() {
                assert_eq!(front.id, open[n - 1]);
                assert_eq!(front.target.z_index, n as i32);
            }
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let open = ids(&["a", "b", "c"]);
        let config = StackConfig::default().with_offsets(StackOffsets {
            y: 10.0,
            scale: 0.1,
            opacity: 0.2,
        });

        assert_eq!(StackLayout::compute(&open, &config), StackLayout::compute(&open, &config));
    }

    #[test]
    fn test_entering_pose() {
        let layout = StackLayout::compute(&ids(&["a", "b", "c"]), &StackConfig::default());
        for entry in layout.entries() {
            assert!(approx(entry.initial.translate_y, 0.0));
            assert!(approx(entry.initial.scale, ENTER_SCALE));
            let expected = if entry.position == 0 { 1.0 } else { 0.0 };
            assert!(approx(entry.initial.opacity, expected));
        }
    }

    #[test]
    fn test_entering_scale_ignores_offsets() {
        let config = StackConfig::default().with_offsets(StackOffsets {
            y: 4.0,
            scale: 0.3,
            opacity: 0.0,
        });
        let layout = StackLayout::compute(&ids(&["a", "b"]), &config);
        assert!(layout.entries().iter().all(|e| approx(e.initial.scale, ENTER_SCALE)));
    }

    #[test]
    fn test_configured_transition_is_used() {
        let transition = Transition::new(CubicBezier::linear(), Duration::from_millis(120));
        let config = StackConfig::default().with_transition(transition);
        let layout = StackLayout::compute(&ids(&["a", "b"]), &config);
        assert!(layout.entries().iter().all(|e| e.transition == transition));
    }

    #[test]
    fn test_validate_rejects_negative_offsets() {
        let config = StackConfig::default().with_offsets(StackOffsets {
            y: -1.0,
            ..StackOffsets::default()
        });
        assert!(matches!(config.validate(), Err(DialogError::InvalidConfig(_))));

        let config = StackConfig::default().with_transition(Transition::new(
            CubicBezier::new(1.5, 0.0, 0.5, 1.0),
            STACK_DURATION,
        ));
        assert!(config.validate().is_err());

        assert!(StackConfig::default().validate().is_ok());
    }

    #[test]
    fn test_lerp_switches_z_immediately() {
        let from = StackTransform::entering(1, 1);
        let to = StackTransform::settled(1, 2, &StackOffsets::default());
        let mid = from.lerp(&StackTransform { z_index: 7, ..to }, 0.5);

        assert_eq!(mid.z_index, 7);
        assert!(approx(mid.scale, (ENTER_SCALE + 0.95) / 2.0));
        assert!(approx(mid.opacity, 0.45));
    }

    #[test]
    fn test_config_json_shape() {
        let json = serde_json::to_value(StackConfig::default()).unwrap();
        assert_eq!(json["offsets"]["y"], 24.0);
        assert_eq!(json["transition"]["duration_ms"], 400);

        let parsed: StackConfig =
            serde_json::from_str(r#"{"offsets":{"y":12},"transition":{"duration_ms":250}}"#).unwrap();
        assert!(approx(parsed.offsets.y, 12.0));
        assert!(approx(parsed.offsets.scale, STACK_SCALE_OFFSET));
        assert_eq!(parsed.transition.duration, Duration::from_millis(250));
        assert_eq!(parsed.transition.ease, CubicBezier::STACK);
    }
}
