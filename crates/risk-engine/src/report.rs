//! Per-frame scene results

use chrono::{DateTime, Local};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Clock readings attached to one evaluation.
///
/// `instant` drives latch timing, `wall` is what gets reported.
#[derive(Debug, Clone, Copy)]
pub struct FrameTime {
    pub instant: Instant,
    pub wall: DateTime<Local>,
}

impl FrameTime {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: Local::now(),
        }
    }
}

/// Outcome of one scene on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResult {
    /// Wall-clock time of the evaluation
    pub time: DateTime<Local>,

    /// Scene gate after this frame
    pub scene: bool,

    /// Risk gate after this frame (always false when `scene` is false)
    pub risk: bool,

    /// Scene-specific diagnostics, e.g. the latch time left
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl SceneResult {
    /// Neutral result reported for a scene that failed this frame
    pub fn neutral(time: DateTime<Local>) -> Self {
        Self {
            time,
            scene: false,
            risk: false,
            extras: BTreeMap::new(),
        }
    }
}

/// Results of every registered scene for one frame, in registration order.
///
/// Serialized as a JSON object keyed by scene name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskReport {
    entries: Vec<(String, SceneResult)>,
}

impl RiskReport {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, name: &str, result: SceneResult) {
        self.entries.push((name.to_string(), result));
    }

    pub fn get(&self, name: &str) -> Option<&SceneResult> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SceneResult)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Names of the scenes whose risk gate is on
    pub fn at_risk(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, r)| r.risk).map(|(n, _)| n)
    }

    pub fn any_risk(&self) -> bool {
        self.entries.iter().any(|(_, r)| r.risk)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RiskReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}
