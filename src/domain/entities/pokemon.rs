//! Pokemon entity - One side of a damage calculation (attacker or defender)

use crate::domain::value_objects::{display_name, StatBlock};

/// Most moves a single Pokemon can carry
pub const MAX_MOVES: usize = 4;

/// Level used when a record does not state one
pub const DEFAULT_LEVEL: u32 = 100;

/// A fully described Pokemon as read from an input record
#[derive(Debug, Clone, PartialEq)]
pub struct Pokemon {
    /// Canonical species name as it appeared in the input
    pub name: String,
    pub ability: String,
    pub item: Option<String>,
    pub nature: String,
    pub level: u32,
    /// Up to four moves, in the order they were listed
    pub moves: Vec<String>,
    /// Move to calculate with when it is not the first listed one
    pub move_override: Option<String>,
    pub evs: Option<StatBlock>,
    pub ivs: Option<StatBlock>,
    pub tera_type: Option<String>,
    /// Only meaningful when `tera_type` is set
    pub is_tera: bool,
    /// Whether the active move hits a single target (delimited input only)
    pub is_single_target: bool,
}

impl Pokemon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ability: String::new(),
            item: None,
            nature: String::new(),
            level: DEFAULT_LEVEL,
            moves: Vec::new(),
            move_override: None,
            evs: None,
            ivs: None,
            tera_type: None,
            is_tera: false,
            is_single_target: true,
        }
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = ability.into();
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_nature(mut self, nature: impl Into<String>) -> Self {
        self.nature = nature.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Add a move; anything past the fourth is ignored
    pub fn with_move(mut self, name: impl Into<String>) -> Self {
        self.add_move(name);
        self
    }

    pub fn with_evs(mut self, evs: StatBlock) -> Self {
        self.evs = Some(evs);
        self
    }

    pub fn with_ivs(mut self, ivs: StatBlock) -> Self {
        self.ivs = Some(ivs);
        self
    }

    pub fn with_tera_type(mut self, tera_type: impl Into<String>) -> Self {
        self.tera_type = Some(tera_type.into());
        self
    }

    pub fn with_single_target(mut self, single_target: bool) -> Self {
        self.is_single_target = single_target;
        self
    }

    pub fn add_move(&mut self, name: impl Into<String>) -> bool {
        if self.moves.len() >= MAX_MOVES {
            return false;
        }
        self.moves.push(name.into());
        true
    }

    /// Calculate with a specific move instead of the first listed one
    pub fn use_move(&mut self, name: impl Into<String>) {
        self.move_override = Some(name.into());
    }

    /// Mark the Pokemon as terastallized. Has no effect on the request without a tera type.
    pub fn terastallize(&mut self) {
        self.is_tera = true;
    }

    /// The move the engine should calculate with
    pub fn active_move(&self) -> Option<&str> {
        self.move_override
            .as_deref()
            .or_else(|| self.moves.first().map(String::as_str))
    }

    /// Name sent to the engine; the stored name is never changed
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }

    pub fn is_terastallized(&self) -> bool {
        self.is_tera && self.tera_type.is_some()
    }
}
