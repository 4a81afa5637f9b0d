use std::collections::BTreeMap;

use crate::foundation::error::{ShredError, ShredResult};

/// Numeric property of an animation target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    X,
    Y,
    Spread,
    Opacity,
}

impl Property {
    pub const ALL: [Property; 4] = [
        Property::X,
        Property::Y,
        Property::Spread,
        Property::Opacity,
    ];
}

/// Partial set of property values recorded for one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertyValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl PropertyValues {
    /// Snapshot of every property the target currently exposes.
    pub fn capture(target: &dyn Animatable) -> Self {
        let mut out = Self::default();
        for prop in Property::ALL {
            if let Some(v) = target.property(prop) {
                out.set(prop, v);
            }
        }
        out
    }

    pub fn get(&self, prop: Property) -> Option<f64> {
        match prop {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Spread => self.spread,
            Property::Opacity => self.opacity,
        }
    }

    pub fn set(&mut self, prop: Property, value: f64) {
        let slot = match prop {
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Spread => &mut self.spread,
            Property::Opacity => &mut self.opacity,
        };
        *slot = Some(value);
    }

    pub fn with(mut self, prop: Property, value: f64) -> Self {
        self.set(prop, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f64)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Object whose numeric properties a clock can drive.
pub trait Animatable {
    /// Current value, or `None` if the target does not expose `prop`.
    fn property(&self, prop: Property) -> Option<f64>;

    fn set_property(&mut self, prop: Property, value: f64);
}

/// Resolves keyframe target keys to live objects.
pub trait AnimationTargets {
    fn target_mut(&mut self, key: &str) -> Option<&mut dyn Animatable>;
}

impl<T: Animatable> AnimationTargets for BTreeMap<String, T> {
    fn target_mut(&mut self, key: &str) -> Option<&mut dyn Animatable> {
        self.get_mut(key).map(|t| t as &mut dyn Animatable)
    }
}

/// Values to hold for one target at a keyframe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeEntry {
    pub target: String,
    pub values: PropertyValues,
}

/// Snapshot of several targets at one point of the cycle.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub entries: Vec<KeyframeEntry>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: impl Into<String>, values: PropertyValues) -> Self {
        self.push(target, values);
        self
    }

    pub fn push(&mut self, target: impl Into<String>, values: PropertyValues) {
        self.entries.push(KeyframeEntry {
            target: target.into(),
            values,
        });
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.target.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn same_targets_as(&self, other: &Keyframe) -> bool {
        self.targets().eq(other.targets())
    }
}

/// Ordered, append-only, logically cyclic sequence of keyframes.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds to the end without checking target consistency.
    pub fn append(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
    }

    /// Adds to the end, rejecting a keyframe whose targets differ from the
    /// first keyframe's (same keys, same order).
    pub fn try_append(&mut self, keyframe: Keyframe) -> ShredResult<()> {
        if let Some(first) = self.keyframes.first()
            && !first.same_targets_as(&keyframe)
        {
            return Err(ShredError::inconsistent_targets(format!(
                "keyframe {} targets [{}], track expects [{}]",
                self.keyframes.len(),
                keyframe.targets().collect::<Vec<_>>().join(", "),
                first.targets().collect::<Vec<_>>().join(", "),
            )));
        }
        self.keyframes.push(keyframe);
        Ok(())
    }

    /// Appends `times` copies of `keyframe`, giving the cycle dwell time.
    pub fn repeat(&mut self, keyframe: Keyframe, times: usize) -> ShredResult<()> {
        for _ in 0..times {
            self.try_append(keyframe.clone())?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ShredResult<()> {
        let Some(first) = self.keyframes.first() else {
            return Ok(());
        };
        for (i, kf) in self.keyframes.iter().enumerate().skip(1) {
            if !first.same_targets_as(kf) {
                return Err(ShredError::inconsistent_targets(format!(
                    "keyframe {i} targets [{}], keyframe 0 targets [{}]",
                    kf.targets().collect::<Vec<_>>().join(", "),
                    first.targets().collect::<Vec<_>>().join(", "),
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
