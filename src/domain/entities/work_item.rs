//! Work item - One attacker/defender pairing sent to the damage engine

use super::Pokemon;

/// A single calculation request
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub attacker: Pokemon,
    pub defender: Pokemon,
    /// Forces a terrain for this calculation only
    pub terrain_override: Option<String>,
}

impl WorkItem {
    pub fn new(attacker: Pokemon, defender: Pokemon) -> Self {
        Self {
            attacker,
            defender,
            terrain_override: None,
        }
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrain_override = Some(terrain.into());
        self
    }
}
