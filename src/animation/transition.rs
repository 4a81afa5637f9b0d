use std::collections::BTreeMap;

use crate::{
    animation::keyframe::{Keyframe, KeyframeTrack, Property, PropertyValues},
    foundation::{
        core::Point,
        error::{ShredError, ShredResult},
    },
};

/// Copies of each phase keyframe; the repeats give the eye time to dwell.
pub const HOLD_REPEATS: usize = 2;
pub const SETTLE_REPEATS: usize = 2;

/// Spread at which retained strips touch.
pub const COLLAPSED_SPREAD: f64 = 1.0;

/// Builds the hold → move → settle cycle.
///
/// `current` lists each target with its present state. Targets named in
/// `final_positions` travel there in the move step; the rest keep their
/// coordinates. Every target collapses its spread while settling.
pub fn build_transition(
    current: &[(String, PropertyValues)],
    final_positions: &BTreeMap<String, Point>,
) -> ShredResult<KeyframeTrack> {
    if current.is_empty() {
        return Err(ShredError::validation("transition needs at least one target"));
    }
    if let Some(unknown) = final_positions
        .keys()
        .find(|k| !current.iter().any(|(key, _)| key == *k))
    {
        return Err(ShredError::validation(format!(
            "final position given for unknown target '{unknown}'"
        )));
    }

    let mut hold = Keyframe::new();
    let mut moved = Keyframe::new();
    let mut settled = Keyframe::new();
    for (key, values) in current {
        let destination = final_positions.get(key);
        let mut at_destination = *values;
        if let Some(p) = destination {
            at_destination.set(Property::X, p.x);
            at_destination.set(Property::Y, p.y);
        }

        hold.push(key.clone(), *values);
        moved.push(key.clone(), at_destination);
        settled.push(
            key.clone(),
            at_destination.with(Property::Spread, COLLAPSED_SPREAD),
        );
    }

    let mut track = KeyframeTrack::new();
    track.repeat(hold, HOLD_REPEATS)?;
    track.try_append(moved)?;
    track.repeat(settled, SETTLE_REPEATS)?;
    Ok(track)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transition.rs"]
mod tests;
