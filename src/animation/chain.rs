use crate::animation::{
    clock::{AnimationClock, ClockTick},
    keyframe::AnimationTargets,
};

/// What a chain does after its last clock finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChainMode {
    /// Stop on the last clock's terminal keyframe.
    #[default]
    Once,
    /// Start over from the first clock.
    Loop,
}

/// Tick reported by [`ClockChain::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainTick {
    pub clock: usize,
    pub tick: ClockTick,
    /// The clock reached its terminal keyframe on this update.
    pub finished_clock: bool,
}

/// Runs independent clocks one after another.
///
/// Each clock runs on its own local time, starting at zero when it becomes
/// active. Once its terminal keyframe is current, the chain pins that
/// keyframe's values, pauses the clock and hands over to the next one.
#[derive(Clone, Debug)]
pub struct ClockChain {
    clocks: Vec<AnimationClock>,
    mode: ChainMode,
    active: usize,
    started_at_ms: Option<f64>,
    finished: bool,
}

impl ClockChain {
    pub fn new(mode: ChainMode) -> Self {
        Self {
            clocks: Vec::new(),
            mode,
            active: 0,
            started_at_ms: None,
            finished: false,
        }
    }

    /// Queues a clock; every clock but the active one waits paused.
    pub fn push(&mut self, mut clock: AnimationClock) {
        if self.clocks.is_empty() {
            clock.play();
        } else {
            clock.pause();
        }
        self.clocks.push(clock);
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn clocks(&self) -> &[AnimationClock] {
        &self.clocks
    }

    pub fn update(&mut self, t_ms: f64, targets: &mut dyn AnimationTargets) -> Option<ChainTick> {
        if self.finished || self.clocks.is_empty() || !t_ms.is_finite() {
            return None;
        }
        let started = *self.started_at_ms.get_or_insert(t_ms);
        let local = t_ms - started;
        let active = self.active;

        let clock = &mut self.clocks[active];
        if clock.track().is_empty() {
            tracing::debug!(clock = active, "skipping clock without keyframes");
            self.hand_over(t_ms);
            return None;
        }

        let tick = clock.update(local, targets)?;
        let span = clock.track().len().saturating_sub(1).max(1) as f64;
        let finished_clock = local >= clock.interval_ms() * span;
        if finished_clock {
            if let Some(terminal) = clock.terminal_index() {
                clock.hold_keyframe(terminal, targets);
            }
            clock.pause();
            tracing::info!(clock = active, t_ms, "clock reached its terminal keyframe");
            self.hand_over(t_ms);
        }

        Some(ChainTick {
            clock: active,
            tick,
            finished_clock,
        })
    }

    fn hand_over(&mut self, t_ms: f64) {
        let next = self.active + 1;
        if next < self.clocks.len() {
            self.active = next;
        } else {
            match self.mode {
                ChainMode::Once => {
                    self.finished = true;
                    return;
                }
                ChainMode::Loop => self.active = 0,
            }
        }
        self.clocks[self.active].play();
        self.started_at_ms = Some(t_ms);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/chain.rs"]
mod tests;
