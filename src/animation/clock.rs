use crate::{
    animation::{
        ease::Easing,
        keyframe::{AnimationTargets, Keyframe, KeyframeTrack},
    },
    foundation::{
        error::{ShredError, ShredResult},
        math::lerp,
    },
};

/// Keyframe pair and eased factor computed for one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockTick {
    pub current: usize,
    pub next: usize,
    pub factor: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    /// No keyframes yet; updates are no-ops.
    Idle,
    Cycling,
    Paused,
}

/// Drives one keyframe track from wall-clock time.
///
/// Every `interval_ms` the clock advances to the next keyframe pair, wrapping
/// after the last keyframe. Within an interval, each property recorded in both
/// the current and the next keyframe is interpolated and written onto its
/// target.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    track: KeyframeTrack,
    interval_ms: f64,
    easing: Easing,
    paused: bool,
    current: usize,
    next: usize,
}

impl AnimationClock {
    pub fn new(interval_ms: f64, easing: impl Into<Easing>) -> ShredResult<Self> {
        if !interval_ms.is_finite() || interval_ms <= 0.0 {
            return Err(ShredError::validation(format!(
                "clock interval must be a positive number of ms, got {interval_ms}"
            )));
        }
        Ok(Self {
            track: KeyframeTrack::new(),
            interval_ms,
            easing: easing.into(),
            paused: false,
            current: 0,
            next: 0,
        })
    }

    /// Builds a clock over an existing track, failing fast on mismatched targets.
    pub fn with_track(
        track: KeyframeTrack,
        interval_ms: f64,
        easing: impl Into<Easing>,
    ) -> ShredResult<Self> {
        track.validate()?;
        let mut clock = Self::new(interval_ms, easing)?;
        clock.track = track;
        Ok(clock)
    }

    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    pub fn append(&mut self, keyframe: Keyframe) {
        self.track.append(keyframe);
    }

    pub fn try_append(&mut self, keyframe: Keyframe) -> ShredResult<()> {
        self.track.try_append(keyframe)
    }

    /// Appends every keyframe of `track`, checked against the existing ones.
    pub fn extend(&mut self, track: KeyframeTrack) -> ShredResult<()> {
        for keyframe in track.keyframes() {
            self.track.try_append(keyframe.clone())?;
        }
        Ok(())
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn state(&self) -> ClockState {
        if self.track.is_empty() {
            ClockState::Idle
        } else if self.paused {
            ClockState::Paused
        } else {
            ClockState::Cycling
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Index of the keyframe interpolated from at the last applied update.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Index of the last keyframe, if any.
    pub fn terminal_index(&self) -> Option<usize> {
        self.track.len().checked_sub(1)
    }

    /// Pure lookup of the keyframe pair and factor at `t_ms`.
    ///
    /// `None` for an empty track or a non-finite time.
    pub fn tick_at(&self, t_ms: f64) -> Option<ClockTick> {
        let len = self.track.len();
        if len == 0 {
            return None;
        }
        if !t_ms.is_finite() {
            tracing::warn!(t_ms, "ignoring non-finite clock time");
            return None;
        }

        let step = (t_ms / self.interval_ms).floor();
        let current = (step.rem_euclid(len as f64) as usize).min(len - 1);
        let next = (current + 1) % len;
        let progress = t_ms.rem_euclid(self.interval_ms) / self.interval_ms;
        Some(ClockTick {
            current,
            next,
            factor: self.easing.apply(progress),
        })
    }

    /// Advances to `t_ms` and writes interpolated values onto `targets`.
    ///
    /// Skipped entirely while paused. Never fails: unresolved targets and
    /// mismatched entries are logged and left untouched.
    pub fn update(&mut self, t_ms: f64, targets: &mut dyn AnimationTargets) -> Option<ClockTick> {
        if self.paused {
            return None;
        }
        let tick = self.tick_at(t_ms)?;
        if tick.current != self.current {
            tracing::debug!(from = self.current, to = tick.current, t_ms, "keyframe advanced");
        }
        self.current = tick.current;
        self.next = tick.next;

        let keyframes = self.track.keyframes();
        apply_pair(&keyframes[tick.current], &keyframes[tick.next], tick, targets);
        Some(tick)
    }

    /// Writes the exact values of keyframe `index` onto `targets`.
    pub fn hold_keyframe(&mut self, index: usize, targets: &mut dyn AnimationTargets) {
        let Some(keyframe) = self.track.get(index) else {
            tracing::warn!(index, len = self.track.len(), "hold of unknown keyframe ignored");
            return;
        };
        let tick = ClockTick {
            current: index,
            next: index,
            factor: 0.0,
        };
        apply_pair(keyframe, keyframe, tick, targets);
        self.current = index;
        self.next = (index + 1) % self.track.len();
    }
}

fn apply_pair(
    current: &Keyframe,
    next: &Keyframe,
    tick: ClockTick,
    targets: &mut dyn AnimationTargets,
) {
    for (i, entry) in current.entries.iter().enumerate() {
        let Some(next_entry) = next.entries.get(i) else {
            tracing::warn!(
                target_key = %entry.target,
                keyframe = tick.next,
                "next keyframe has no entry at this position; skipping"
            );
            continue;
        };
        if next_entry.target != entry.target {
            tracing::warn!(
                expected = %entry.target,
                found = %next_entry.target,
                keyframe = tick.next,
                "keyframe targets differ; skipping"
            );
            continue;
        }
        let Some(target) = targets.target_mut(&entry.target) else {
            tracing::warn!(target_key = %entry.target, "animation target not found; skipping");
            continue;
        };

        for (prop, start) in entry.values.iter() {
            let Some(end) = next_entry.values.get(prop) else {
                continue;
            };
            let value = lerp(start, end, tick.factor);
            if value.is_finite() {
                target.set_property(prop, value);
            } else {
                tracing::warn!(target_key = %entry.target, ?prop, "non-finite interpolation; skipping");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
