//! Stat spreads (EVs / IVs) with per-stat "unspecified" support

/// One of the six battle stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    /// Parse the abbreviation used in team paste format (`HP`, `Atk`, `Def`, `SpA`, `SpD`, `Spe`)
    pub fn from_abbreviation(abbrev: &str) -> Option<Self> {
        match abbrev {
            "HP" => Some(Self::Hp),
            "Atk" => Some(Self::Attack),
            "Def" => Some(Self::Defense),
            "SpA" => Some(Self::SpecialAttack),
            "SpD" => Some(Self::SpecialDefense),
            "Spe" => Some(Self::Speed),
            _ => None,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Hp => "HP",
            Self::Attack => "Atk",
            Self::Defense => "Def",
            Self::SpecialAttack => "SpA",
            Self::SpecialDefense => "SpD",
            Self::Speed => "Spe",
        }
    }
}

/// Six optional stat values. `None` means the stat was not given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatBlock {
    pub hp: Option<u32>,
    pub attack: Option<u32>,
    pub defense: Option<u32>,
    pub special_attack: Option<u32>,
    pub special_defense: Option<u32>,
    pub speed: Option<u32>,
}

impl StatBlock {
    /// A block with every stat specified, in HP/Atk/Def/SpA/SpD/Spe order
    pub fn full(values: [u32; 6]) -> Self {
        let [hp, attack, defense, special_attack, special_defense, speed] = values;
        Self {
            hp: Some(hp),
            attack: Some(attack),
            defense: Some(defense),
            special_attack: Some(special_attack),
            special_defense: Some(special_defense),
            speed: Some(speed),
        }
    }

    pub fn with_stat(mut self, stat: Stat, value: u32) -> Self {
        *self.slot_mut(stat) = Some(value);
        self
    }

    fn slot_mut(&mut self, stat: Stat) -> &mut Option<u32> {
        match stat {
            Stat::Hp => &mut self.hp,
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::SpecialAttack => &mut self.special_attack,
            Stat::SpecialDefense => &mut self.special_defense,
            Stat::Speed => &mut self.speed,
        }
    }
}
