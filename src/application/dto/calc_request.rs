//! Damage engine wire format
//!
//! Requests are a JSON array of `{attacking_pokemon, defending_pokemon}`
//! objects. Unspecified optional fields are left out entirely; the engine
//! reads a missing key as "not given", so `null` is never sent.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Pokemon, WorkItem};
use crate::domain::value_objects::{RollResult, StatBlock};

/// One calculation in an engine request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcRequestDto {
    pub attacking_pokemon: PokemonDto,
    pub defending_pokemon: PokemonDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain_override: Option<String>,
}

impl From<&WorkItem> for CalcRequestDto {
    fn from(item: &WorkItem) -> Self {
        Self {
            attacking_pokemon: PokemonDto::from(&item.attacker),
            defending_pokemon: PokemonDto::from(&item.defender),
            terrain_override: item.terrain_override.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonDto {
    pub name: String,
    pub ability: String,
    pub nature: String,
    #[serde(rename = "move")]
    pub active_move: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evs: Option<StatsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ivs: Option<StatsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tera_type: Option<String>,
    /// Present exactly when `tera_type` is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tera: Option<bool>,
}

impl From<&Pokemon> for PokemonDto {
    fn from(pokemon: &Pokemon) -> Self {
        Self {
            name: pokemon.display_name().to_string(),
            ability: pokemon.ability.clone(),
            nature: pokemon.nature.clone(),
            active_move: pokemon.active_move().unwrap_or_default().to_string(),
            level: pokemon.level,
            item: pokemon.item.clone(),
            evs: pokemon.evs.as_ref().map(StatsDto::from),
            ivs: pokemon.ivs.as_ref().map(StatsDto::from),
            tera_type: pokemon.tera_type.clone(),
            is_tera: pokemon.tera_type.as_ref().map(|_| pokemon.is_tera),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_attack: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_defense: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u32>,
}

impl From<&StatBlock> for StatsDto {
    fn from(block: &StatBlock) -> Self {
        Self {
            hp: block.hp,
            attack: block.attack,
            defense: block.defense,
            special_attack: block.special_attack,
            special_defense: block.special_defense,
            speed: block.speed,
        }
    }
}

/// Engine response: one roll list per request, or a bare roll list from the
/// single-calculation form of the engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CalcResponseDto {
    Batch(Vec<Vec<i64>>),
    Single(Vec<i64>),
}

impl CalcResponseDto {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Convert into rolls for a request of `requested` items.
    ///
    /// A bare roll list is only accepted for a single-item request. Returns
    /// `None` when the shape cannot belong to the request.
    pub fn into_rolls(self, requested: usize) -> Option<Vec<RollResult>> {
        match self {
            Self::Batch(rolls) => Some(rolls.into_iter().map(RollResult::new).collect()),
            Self::Single(rolls) if requested == 1 => Some(vec![RollResult::new(rolls)]),
            Self::Single(_) => None,
        }
    }
}
