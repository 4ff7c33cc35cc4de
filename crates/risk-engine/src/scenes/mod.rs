//! Built-in rig-floor hazards

pub mod coupling;
pub mod extraction;
pub mod open_anchor;
pub mod pendulum;
pub mod pickup;
pub mod pickup_zone;
pub mod restricted_entry;

use crate::config::EngineConfig;
use crate::scene::Scene;

/// All built-in scenes, in reporting order
pub fn builtin(config: &EngineConfig) -> Vec<Scene> {
    let sk = &config.skeleton;
    vec![
        extraction::scene(&config.extraction, sk),
        open_anchor::scene(&config.open_anchor, sk),
        pickup::scene(&config.pickup, sk),
        pendulum::scene(&config.pendulum, sk),
        coupling::scene(&config.coupling, sk),
        pickup_zone::scene(&config.pickup_zone, sk),
        restricted_entry::scene(&config.restricted_entry, sk),
    ]
}
