use std::collections::BTreeMap;

use super::*;
use crate::animation::{
    ease::Ease,
    keyframe::{Animatable, Property, PropertyValues},
};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Probe {
    x: f64,
    y: f64,
    spread: f64,
    opacity: f64,
}

impl Animatable for Probe {
    fn property(&self, prop: Property) -> Option<f64> {
        Some(match prop {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Spread => self.spread,
            Property::Opacity => self.opacity,
        })
    }

    fn set_property(&mut self, prop: Property, value: f64) {
        match prop {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Spread => self.spread = value,
            Property::Opacity => self.opacity = value,
        }
    }
}

fn targets() -> BTreeMap<String, Probe> {
    let mut m = BTreeMap::new();
    m.insert("a".to_string(), Probe::default());
    m
}

fn x(v: f64) -> PropertyValues {
    PropertyValues::default().with(Property::X, v)
}

fn scenario_clock() -> AnimationClock {
    let mut clock = AnimationClock::new(1000.0, Ease::Linear).unwrap();
    clock.append(Keyframe::new().with("a", x(0.0)));
    clock.append(Keyframe::new().with("a", x(0.0)));
    clock.append(Keyframe::new().with("a", x(100.0)));
    clock
}

#[test]
fn rejects_non_positive_interval() {
    assert!(AnimationClock::new(0.0, Ease::Linear).is_err());
    assert!(AnimationClock::new(-5.0, Ease::Linear).is_err());
    assert!(AnimationClock::new(f64::NAN, Ease::Linear).is_err());
}

#[test]
fn scenario_holds_then_moves() {
    let mut clock = scenario_clock();
    let mut t = targets();

    let tick = clock.update(500.0, &mut t).unwrap();
    assert_eq!((tick.current, tick.next), (0, 1));
    assert_eq!(tick.factor, 0.5);
    assert_eq!(t["a"].x, 0.0);

    let tick = clock.update(1500.0, &mut t).unwrap();
    assert_eq!((tick.current, tick.next), (1, 2));
    assert_eq!(tick.factor, 0.5);
    assert_eq!(t["a"].x, 50.0);
}

#[test]
fn wraps_from_last_to_first() {
    let mut clock = scenario_clock();
    let mut t = targets();
    let tick = clock.update(2750.0, &mut t).unwrap();
    assert_eq!((tick.current, tick.next), (2, 0));
    assert_eq!(t["a"].x, 25.0);

    let tick = clock.update(3250.0, &mut t).unwrap();
    assert_eq!(tick.current, 0);
}

#[test]
fn indices_stay_in_range_for_many_times() {
    let clock = scenario_clock();
    for i in -50..200 {
        let t_ms = f64::from(i) * 137.0;
        let tick = clock.tick_at(t_ms).unwrap();
        assert!(tick.current < 3);
        assert_eq!(tick.next, (tick.current + 1) % 3);
        assert!((0.0..=1.0).contains(&tick.factor));
    }
}

#[test]
fn zero_time_uses_first_pair_and_easing_of_zero() {
    let mut clock = AnimationClock::new(800.0, Easing::custom(|t| 0.25 + t / 2.0)).unwrap();
    clock.append(Keyframe::new().with("a", x(0.0)));
    clock.append(Keyframe::new().with("a", x(8.0)));
    let tick = clock.tick_at(0.0).unwrap();
    assert_eq!(tick.current, 0);
    assert_eq!(tick.factor, 0.25);
}

#[test]
fn empty_track_is_a_no_op() {
    let mut clock = AnimationClock::new(1000.0, Ease::Linear).unwrap();
    let mut t = targets();
    assert_eq!(clock.state(), ClockState::Idle);
    assert!(clock.update(1234.0, &mut t).is_none());
    assert_eq!(t["a"], Probe::default());
    assert_eq!(clock.terminal_index(), None);
}

#[test]
fn single_keyframe_holds_its_values() {
    let mut clock = AnimationClock::new(1000.0, Ease::InOutCubic).unwrap();
    clock.append(Keyframe::new().with("a", x(42.0)));
    let mut t = targets();
    for t_ms in [0.0, 333.0, 999.0, 1000.0, 98765.0] {
        let tick = clock.update(t_ms, &mut t).unwrap();
        assert_eq!((tick.current, tick.next), (0, 0));
        assert_eq!(t["a"].x, 42.0);
    }
}

#[test]
fn only_properties_in_both_keyframes_move() {
    let mut clock = AnimationClock::new(100.0, Ease::Linear).unwrap();
    clock.append(
        Keyframe::new().with(
            "a",
            PropertyValues::default()
                .with(Property::X, 0.0)
                .with(Property::Y, 10.0),
        ),
    );
    clock.append(
        Keyframe::new().with(
            "a",
            PropertyValues::default()
                .with(Property::X, 10.0)
                .with(Property::Spread, 4.0),
        ),
    );
    let mut t = targets();
    t.get_mut("a").unwrap().y = -1.0;
    clock.update(50.0, &mut t).unwrap();
    assert_eq!(t["a"].x, 5.0);
    assert_eq!(t["a"].y, -1.0);
    assert_eq!(t["a"].spread, 0.0);
}

#[test]
fn zero_values_still_count_as_present() {
    let mut clock = AnimationClock::new(100.0, Ease::Linear).unwrap();
    clock.append(Keyframe::new().with("a", x(0.0)));
    clock.append(Keyframe::new().with("a", x(0.0)));
    let mut t = targets();
    t.get_mut("a").unwrap().x = 77.0;
    clock.update(10.0, &mut t).unwrap();
    assert_eq!(t["a"].x, 0.0);
}

#[test]
fn pause_skips_updates_but_keeps_indices() {
    let mut clock = scenario_clock();
    let mut t = targets();
    clock.update(1500.0, &mut t).unwrap();
    clock.pause();
    assert_eq!(clock.state(), ClockState::Paused);
    assert!(clock.update(2500.0, &mut t).is_none());
    assert_eq!(t["a"].x, 50.0);
    assert_eq!((clock.current_index(), clock.next_index()), (1, 2));

    clock.play();
    assert_eq!(clock.state(), ClockState::Cycling);
    clock.update(2500.0, &mut t).unwrap();
    assert_eq!(clock.current_index(), 2);
    assert_eq!(t["a"].x, 50.0);
}

#[test]
fn missing_targets_and_mismatches_are_skipped() {
    let mut clock = AnimationClock::new(100.0, Ease::Linear).unwrap();
    clock.append(Keyframe::new().with("ghost", x(0.0)).with("a", x(0.0)));
    clock.append(Keyframe::new().with("ghost", x(1.0)).with("b", x(1.0)));
    let mut t = targets();
    t.get_mut("a").unwrap().x = 3.0;
    assert!(clock.update(50.0, &mut t).is_some());
    assert_eq!(t["a"].x, 3.0);
}

#[test]
fn with_track_fails_fast_on_inconsistent_targets() {
    let mut track = KeyframeTrack::new();
    track.append(Keyframe::new().with("a", x(0.0)));
    track.append(Keyframe::new().with("b", x(0.0)));
    let err = AnimationClock::with_track(track, 100.0, Ease::Linear).unwrap_err();
    assert!(matches!(err, ShredError::InconsistentKeyframeTargets(_)));
}

#[test]
fn extend_checks_against_existing_keyframes() {
    let mut clock = scenario_clock();
    let mut other = KeyframeTrack::new();
    other.append(Keyframe::new().with("z", x(0.0)));
    assert!(clock.extend(other).is_err());
    assert_eq!(clock.track().len(), 3);
}

#[test]
fn non_finite_time_is_ignored() {
    let mut clock = scenario_clock();
    let mut t = targets();
    assert!(clock.update(f64::INFINITY, &mut t).is_none());
    assert!(clock.tick_at(f64::NAN).is_none());
}
