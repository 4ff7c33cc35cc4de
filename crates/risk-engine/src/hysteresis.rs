//! Debounced scene/risk state tracking
//!
//! Every scene owns one [`Hysteresis`]. Each frame feeds an instantaneous
//! scene predicate; the risk predicate is only evaluated while the scene
//! gate is active.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Consecutive-frame thresholds for one debounced gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Consecutive true frames needed to switch on
    pub on: u32,

    /// Consecutive false frames needed to switch off
    pub off: u32,
}

impl Thresholds {
    pub const fn new(on: u32, off: u32) -> Self {
        Self { on, off }
    }
}

/// How the scene gate activates and deactivates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// Switch on after `on` true frames, off after `off` false frames
    Symmetric(Thresholds),

    /// Switch on after `on` true frames, then stay on for `window` regardless
    /// of the scene predicate
    Latch { on: u32, window: Duration },
}

/// A pair of run-length counters. At most one of them is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounter {
    /// Length of the current run of true frames
    pub pos: u32,

    /// Length of the current run of false frames
    pub neg: u32,
}

impl RunCounter {
    pub fn feed(&mut self, value: bool) {
        if value {
            self.pos = self.pos.saturating_add(1);
            self.neg = 0;
        } else {
            self.neg = self.neg.saturating_add(1);
            self.pos = 0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-scene mutable state
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    pub scene_active: bool,
    pub scene_counter: RunCounter,
    pub risk_active: bool,
    pub risk_counter: RunCounter,

    /// Set when a latched scene switches on
    pub activated_at: Option<Instant>,

    /// Scene-local numeric history, cleared on deactivation
    pub history: VecDeque<f64>,
}

impl SceneState {
    /// Return to the inactive state: both gates off, counters zeroed,
    /// activation timestamp and history cleared.
    pub fn deactivate(&mut self) {
        self.scene_active = false;
        self.scene_counter.reset();
        self.risk_active = false;
        self.risk_counter.reset();
        self.activated_at = None;
        self.history.clear();
    }
}

/// Two nested debounced gates: the scene gate and the risk gate
#[derive(Debug, Clone)]
pub struct Hysteresis {
    activation: Activation,
    risk: Thresholds,
    state: SceneState,
}

impl Hysteresis {
    pub fn new(activation: Activation, risk: Thresholds) -> Self {
        Self {
            activation,
            risk,
            state: SceneState::default(),
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Scene-local history buffer for predicates that need it
    pub fn history_mut(&mut self) -> &mut VecDeque<f64> {
        &mut self.state.history
    }

    pub fn is_active(&self) -> bool {
        self.state.scene_active
    }

    /// Time left before a latched scene expires. Zero when inactive or symmetric.
    pub fn remaining(&self, now: Instant) -> Duration {
        match (self.activation, self.state.activated_at) {
            (Activation::Latch { window, .. }, Some(t0)) if self.state.scene_active => {
                window.saturating_sub(now.saturating_duration_since(t0))
            }
            _ => Duration::ZERO,
        }
    }

    /// Feed one frame. `risk` is only called while the scene gate is active
    /// after this frame's update. Returns `(scene_active, risk_active)`.
    pub fn step<E>(
        &mut self,
        now: Instant,
        scene: bool,
        risk: impl FnOnce() -> Result<bool, E>,
    ) -> Result<(bool, bool), E> {
        self.state.scene_counter.feed(scene);

        match self.activation {
            Activation::Symmetric(t) => {
                if self.state.scene_counter.pos >= t.on {
                    self.state.scene_active = true;
                } else if self.state.scene_counter.neg >= t.off {
                    self.state.deactivate();
                }
                if self.state.scene_active {
                    self.step_risk(risk()?);
                }
            }
            Activation::Latch { on, .. } => {
                if !self.state.scene_active && self.state.scene_counter.pos >= on {
                    self.state.scene_active = true;
                    self.state.activated_at = Some(now);
                }
                if self.state.scene_active {
                    if self.remaining(now) > Duration::ZERO {
                        self.step_risk(risk()?);
                    } else {
                        self.state.deactivate();
                    }
                }
            }
        }

        Ok((self.state.scene_active, self.state.risk_active))
    }

    /// Drop back to the inactive state
    pub fn reset(&mut self) {
        self.state.deactivate();
    }

    fn step_risk(&mut self, value: bool) {
        self.state.risk_counter.feed(value);
        if self.state.risk_counter.pos >= self.risk.on {
            self.state.risk_active = true;
        } else if self.state.risk_counter.neg >= self.risk.off {
            self.state.risk_active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::convert::Infallible;

    fn ok(v: bool) -> impl FnOnce() -> Result<bool, Infallible> {
        move || Ok(v)
    }

    fn symmetric(on: u32, off: u32, risk_on: u32, risk_off: u32) -> Hysteresis {
        Hysteresis::new(
            Activation::Symmetric(Thresholds::new(on, off)),
            Thresholds::new(risk_on, risk_off),
        )
    }

    #[test]
    fn test_scene_needs_full_on_run() {
        let mut h = symmetric(5, 10, 1, 1);
        let now = Instant::now();
        for _ in 0..4 {
            assert_eq!(h.step(now, true, ok(false)).unwrap(), (false, false));
        }
        assert_eq!(h.step(now, true, ok(false)).unwrap(), (true, false));
    }

    #[test]
    fn test_scene_survives_short_gaps() {
        let mut h = symmetric(2, 3, 1, 1);
        let now = Instant::now();
        h.step(now, true, ok(false)).unwrap();
        h.step(now, true, ok(false)).unwrap();
        assert!(h.is_active());

        h.step(now, false, ok(false)).unwrap();
        h.step(now, false, ok(false)).unwrap();
        assert!(h.is_active());
        h.step(now, true, ok(false)).unwrap();
        assert!(h.is_active());

        for _ in 0..3 {
            h.step(now, false, ok(false)).unwrap();
        }
        assert!(!h.is_active());
        assert_eq!(h.state().scene_counter, RunCounter::default());
    }

    #[test]
    fn test_risk_not_evaluated_while_inactive() {
        let mut h = symmetric(3, 3, 1, 1);
        let now = Instant::now();
        let mut calls = 0;
        for _ in 0..2 {
            h.step(now, true, || {
                calls += 1;
                Ok::<_, Infallible>(true)
            })
            .unwrap();
        }
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_risk_evaluated_on_activating_frame() {
        let mut h = symmetric(2, 2, 1, 1);
        let now = Instant::now();
        assert_eq!(h.step(now, true, ok(true)).unwrap(), (false, false));
        assert_eq!(h.step(now, true, ok(true)).unwrap(), (true, true));
    }

    #[test]
    fn test_deactivation_clears_risk_and_history() {
        let mut h = symmetric(1, 1, 1, 5);
        let now = Instant::now();
        h.history_mut().push_back(42.0);
        assert_eq!(h.step(now, true, ok(true)).unwrap(), (true, true));
        assert_eq!(h.step(now, false, ok(true)).unwrap(), (false, false));
        assert!(h.state().history.is_empty());
        assert_eq!(h.state().risk_counter, RunCounter::default());
    }

    #[test]
    fn test_risk_error_propagates() {
        let mut h = symmetric(1, 1, 1, 1);
        let res = h.step(Instant::now(), true, || Err::<bool, _>("broken"));
        assert_eq!(res, Err("broken"));
    }

    #[test]
    fn test_latch_ignores_scene_predicate_until_expiry() {
        let window = Duration::from_secs(32);
        let mut h = Hysteresis::new(
            Activation::Latch { on: 6, window },
            Thresholds::new(5, 8),
        );
        let t0 = Instant::now();

        for i in 0..5 {
            let (scene, _) = h.step(t0 + Duration::from_millis(i), true, ok(false)).unwrap();
            assert!(!scene);
        }
        assert!(h.step(t0, true, ok(false)).unwrap().0);
        assert_eq!(h.state().activated_at, Some(t0));

        // Scene predicate false the whole time, gate stays on
        for s in 1..32 {
            let (scene, _) = h
                .step(t0 + Duration::from_secs(s), false, ok(false))
                .unwrap();
            assert!(scene, "expired early at {s}s");
        }
        assert_eq!(h.remaining(t0 + Duration::from_secs(30)), Duration::from_secs(2));

        // Deactivates exactly at the window
        let (scene, risk) = h.step(t0 + window, false, ok(true)).unwrap();
        assert!(!scene);
        assert!(!risk);
        assert!(h.state().activated_at.is_none());
    }

    #[test]
    fn test_latch_debounces_risk_inside_window() {
        let mut h = Hysteresis::new(
            Activation::Latch { on: 1, window: Duration::from_secs(10) },
            Thresholds::new(2, 2),
        );
        let t0 = Instant::now();
        assert_eq!(h.step(t0, true, ok(true)).unwrap(), (true, false));
        assert_eq!(h.step(t0, false, ok(true)).unwrap(), (true, true));
        assert_eq!(h.step(t0, false, ok(false)).unwrap(), (true, true));
        assert_eq!(h.step(t0, false, ok(false)).unwrap(), (true, false));
    }

    #[test]
    fn test_latch_needs_fresh_run_after_expiry() {
        let window = Duration::from_secs(1);
        let mut h = Hysteresis::new(Activation::Latch { on: 2, window }, Thresholds::new(1, 1));
        let t0 = Instant::now();
        h.step(t0, true, ok(false)).unwrap();
        h.step(t0, true, ok(false)).unwrap();
        assert!(h.is_active());

        h.step(t0 + window, true, ok(false)).unwrap();
        assert!(!h.is_active());
        h.step(t0 + window, true, ok(false)).unwrap();
        assert!(!h.is_active());
        h.step(t0 + window, true, ok(false)).unwrap();
        assert!(h.is_active());
    }

    proptest! {
        #[test]
        fn prop_counters_never_both_nonzero(inputs in proptest::collection::vec(any::<(bool, bool)>(), 0..200)) {
            let mut h = symmetric(3, 4, 2, 3);
            let now = Instant::now();
            for (scene, risk) in inputs {
                h.step(now, scene, ok(risk)).unwrap();
                let s = h.state();
                prop_assert!(s.scene_counter.pos == 0 || s.scene_counter.neg == 0);
                prop_assert!(s.risk_counter.pos == 0 || s.risk_counter.neg == 0);
                prop_assert!(s.scene_active || !s.risk_active);
            }
        }

        #[test]
        fn prop_activation_tracks_latest_run(inputs in proptest::collection::vec(any::<bool>(), 1..200)) {
            let (on, off) = (4u32, 6u32);
            let mut h = symmetric(on, off, 1, 1);
            let now = Instant::now();
            for (i, &v) in inputs.iter().enumerate() {
                let (active, _) = h.step(now, v, ok(false)).unwrap();
                let run = inputs[..=i].iter().rev().take_while(|&&x| x == v).count() as u32;
                if v && run >= on {
                    prop_assert!(active);
                }
                if !v && run >= off {
                    prop_assert!(!active);
                }
            }
        }
    }
}
