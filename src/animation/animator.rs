//! Stack animator
//!
//! Consumes one declarative request per open dialog (`initial`, `target`,
//! `transition`) and interpolates between them over time. The animator owns
//! interpolation state only; it never touches the registry.

use crate::dialog::layout::{StackLayout, StackTransform, Transition};
use crate::dialog::types::DialogId;
use std::time::Instant;
use tracing::trace;

/// Interpolation from one transform to another
#[derive(Debug, Clone)]
struct Track {
    id: DialogId,
    from: StackTransform,
    to: StackTransform,
    transition: Transition,
    started: Instant,
    exiting: bool,
    /// Jumped to `to` by `finish`
    settled: bool,
}

impl Track {
    fn progress(&self, now: Instant) -> f32 {
        if self.settled {
            return 1.0;
        }
        let duration = self.transition.duration.as_secs_f32();
        if duration <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        (elapsed / duration).clamp(0.0, 1.0)
    }

    fn value(&self, now: Instant) -> StackTransform {
        let eased = self.transition.ease.apply(self.progress(now));
        self.from.lerp(&self.to, eased)
    }

    fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Interpolated transform of one dialog at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedDialog {
    pub id: DialogId,
    pub transform: StackTransform,
    /// The dialog has left the open set and is animating out
    pub exiting: bool,
}

/// Animation engine for a dialog stack
#[derive(Debug, Default)]
pub struct StackAnimator {
    tracks: Vec<Track>,
}

impl StackAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a freshly computed layout.
    ///
    /// Dialogs new to the stack start from their entering pose, dialogs whose
    /// target moved restart from wherever they are now, and dialogs that left
    /// the stack animate towards the exit pose.
    pub fn sync(&mut self, layout: &StackLayout, now: Instant) {
        self.prune(now);

        let mut tracks = Vec::with_capacity(layout.len() + self.tracks.len());

        for entry in layout.entries() {
            let existing = self
                .tracks
                .iter()
                .find(|track| track.id == entry.id && !track.exiting);

            let track = match existing {
                Some(track) if track.to == entry.target && track.transition == entry.transition => {
                    track.clone()
                }
                Some(track) => Track {
                    id: entry.id.clone(),
                    from: track.value(now),
                    to: entry.target,
                    transition: entry.transition,
                    started: now,
                    exiting: false,
                    settled: false,
                },
                None => {
                    trace!("Dialog '{}' entering at position {}", entry.id, entry.position);
                    // a stale exit track for the same id is dropped below
                    Track {
                        id: entry.id.clone(),
                        from: entry.initial,
                        to: entry.target,
                        transition: entry.transition,
                        started: now,
                        exiting: false,
                        settled: false,
                    }
                }
            };
            tracks.push(track);
        }

        for track in &self.tracks {
            if layout.get(&track.id).is_some() {
                continue;
            }
            if track.exiting {
                tracks.push(track.clone());
                continue;
            }
            trace!("Dialog '{}' exiting", track.id);
            let from = track.value(now);
            tracks.push(Track {
                id: track.id.clone(),
                from,
                to: StackTransform::exiting(&from),
                transition: track.transition,
                started: now,
                exiting: true,
                settled: false,
            });
        }

        self.tracks = tracks;
    }

    /// Current transforms sorted back-to-front
    pub fn sample(&self, now: Instant) -> Vec<AnimatedDialog> {
        let mut frames: Vec<AnimatedDialog> = self
            .tracks
            .iter()
            .filter(|track| !(track.exiting && track.is_finished(now)))
            .map(|track| AnimatedDialog {
                id: track.id.clone(),
                transform: track.value(now),
                exiting: track.exiting,
            })
            .collect();

        // exiting dialogs sit below live ones sharing the same z-index
        frames.sort_by_key(|frame| (frame.transform.z_index, !frame.exiting));
        frames
    }

    /// Whether any transform is still moving
    pub fn is_animating(&self, now: Instant) -> bool {
        self.tracks.iter().any(|track| !track.is_finished(now))
    }

    /// Drop exit animations that have completed
    pub fn prune(&mut self, now: Instant) {
        self.tracks.retain(|track| !(track.exiting && track.is_finished(now)));
    }

    /// Jump every live dialog to its target and drop exiting ones
    pub fn finish(&mut self) {
        self.tracks.retain(|track| !track.exiting);
        for track in &mut self.tracks {
            track.from = track.to;
            track.settled = true;
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::CubicBezier;
    use crate::dialog::layout::{StackConfig, ENTER_SCALE};
    use std::time::Duration;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn linear_config() -> StackConfig {
        StackConfig::default().with_transition(Transition::new(
            CubicBezier::linear(),
            Duration::from_millis(400),
        ))
    }

    fn layout(ids: &[&str]) -> StackLayout {
        let open: Vec<DialogId> = ids.iter().map(|id| DialogId::from(*id)).collect();
        StackLayout::compute(&open, &linear_config())
    }

    fn find<'a>(frames: &'a [AnimatedDialog], id: &str) -> &'a AnimatedDialog {
        frames.iter().find(|f| f.id.as_str() == id).expect("dialog present")
    }

    #[test]
    fn test_new_dialog_starts_from_entering_pose() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a"]), start);

        let frames = animator.sample(start);
        let a = find(&frames, "a");
        assert!(approx(a.transform.scale, ENTER_SCALE));
        assert!(approx(a.transform.opacity, 1.0));
        assert!(animator.is_animating(start));

        let halfway = animator.sample(start + Duration::from_millis(200));
        assert!(approx(find(&halfway, "a").transform.scale, (ENTER_SCALE + 1.0) / 2.0));

        let end = start + Duration::from_millis(400);
        let settled = animator.sample(end);
        assert!(approx(find(&settled, "a").transform.scale, 1.0));
        assert!(!animator.is_animating(end));
    }

    #[test]
    fn test_existing_dialog_moves_back_from_current_value() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a"]), start);

        let later = start + Duration::from_millis(400);
        animator.sync(&layout(&["a", "b"]), later);

        let frames = animator.sample(later);
        // a starts from its settled front transform, b from the entering pose
        assert!(approx(find(&frames, "a").transform.scale, 1.0));
        assert!(approx(find(&frames, "b").transform.scale, ENTER_SCALE));

        let settled = animator.sample(later + Duration::from_millis(400));
        let a = find(&settled, "a");
        assert!(approx(a.transform.translate_y, -24.0));
        assert!(approx(a.transform.scale, 0.95));
        assert!(approx(a.transform.opacity, 0.9));
    }

    #[test]
    fn test_mid_stack_entry_is_transparent() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a", "b"]), start);

        let frames = animator.sample(start);
        assert!(approx(find(&frames, "a").transform.opacity, 0.0));
        assert!(approx(find(&frames, "b").transform.opacity, 1.0));
    }

    #[test]
    fn test_sample_is_back_to_front() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a", "b", "c"]), start);

        let order: Vec<String> = animator.sample(start).iter().map(|f| f.id.to_string()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resync_with_same_layout_keeps_progress() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a"]), start);

        let mid = start + Duration::from_millis(200);
        let before = animator.sample(mid);
        animator.sync(&layout(&["a"]), mid);
        assert_eq!(animator.sample(mid), before);
    }

    #[test]
    fn test_closed_dialog_exits_then_disappears() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a", "b"]), start);
        animator.finish();

        animator.sync(&layout(&["a"]), start);
        let frames = animator.sample(start);
        let b = find(&frames, "b");
        assert!(b.exiting);
        assert!(approx(b.transform.opacity, 1.0));

        let halfway = animator.sample(start + Duration::from_millis(200));
        assert!(approx(find(&halfway, "b").transform.opacity, 0.5));

        let done = start + Duration::from_millis(400);
        assert!(animator.sample(done).iter().all(|f| f.id.as_str() != "b"));
        animator.prune(done);
        assert_eq!(animator.sample(done).len(), 1);
    }

    #[test]
    fn test_finish_jumps_to_targets() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a"]), start);
        animator.finish();

        let frames = animator.sample(start);
        assert!(approx(find(&frames, "a").transform.scale, 1.0));
        assert!(!animator.is_animating(start));
    }

    #[test]
    fn test_finish_settles_a_moving_stack() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a"]), start);
        animator.sync(&layout(&["a", "b"]), start + Duration::from_millis(100));
        animator.finish();

        let now = start + Duration::from_millis(150);
        assert!(!animator.is_animating(now));
        let a = find(&animator.sample(now), "a").clone();
        assert!(approx(a.transform.translate_y, -24.0));
        assert!(approx(a.transform.scale, 0.95));
    }

    #[test]
    fn test_reopened_mid_exit_starts_from_entering_pose() {
        let start = Instant::now();
        let mut animator = StackAnimator::new();
        animator.sync(&layout(&["a", "b"]), start);
        animator.finish();
        animator.sync(&layout(&["b"]), start);

        let reopen = start + Duration::from_millis(200);
        animator.sync(&layout(&["a", "b"]), reopen);

        let frames = animator.sample(reopen);
        let a: Vec<&AnimatedDialog> = frames.iter().filter(|f| f.id.as_str() == "a").collect();
        assert_eq!(a.len(), 1);
        assert!(!a[0].exiting);
        assert!(approx(a[0].transform.translate_y, 0.0));
        assert!(approx(a[0].transform.scale, ENTER_SCALE));
        assert!(approx(a[0].transform.opacity, 0.0));
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let start = Instant::now();
        let config = StackConfig::default()
            .with_transition(Transition::new(CubicBezier::STACK, Duration::ZERO));
        let open = vec![DialogId::from("a")];
        let mut animator = StackAnimator::new();
        animator.sync(&StackLayout::compute(&open, &config), start);

        assert!(approx(find(&animator.sample(start), "a").transform.scale, 1.0));
    }
}
