//! Edge detection on per-scene risk flags

use risk_engine::RiskReport;
use std::collections::HashMap;

/// A scene's risk gate changed between two frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started(String),
    Stopped(String),
}

/// Remembers the previous risk flag of every scene
#[derive(Debug, Default)]
pub struct RiskTransitions {
    previous: HashMap<String, bool>,
}

impl RiskTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `report` with the previous frame, in report order
    pub fn update(&mut self, report: &RiskReport) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for (name, result) in report.iter() {
            let was = self.previous.insert(name.to_string(), result.risk).unwrap_or(false);
            match (was, result.risk) {
                (false, true) => transitions.push(Transition::Started(name.to_string())),
                (true, false) => transitions.push(Transition::Stopped(name.to_string())),
                _ => {}
            }
        }
        transitions
    }

    pub fn is_at_risk(&self, scene: &str) -> bool {
        self.previous.get(scene).copied().unwrap_or(false)
    }
}
