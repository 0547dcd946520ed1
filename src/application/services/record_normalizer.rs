//! Record Normalizer - Turns raw input records into Pokemon and work items
//!
//! Two input forms are understood:
//! - delimited rows from the batch input table, one attacker/defender pair per row
//! - team paste blocks (the format exported by team builders), one Pokemon per block
//!
//! Rows are positional:
//!
//! ```text
//! attacker, move, ability, item, nature, hp, atk, def, spa, spd, spe,
//! defender, ability, item, nature, hp, atk, def, spa, spd, spe[, single_target]
//! ```

use crate::domain::entities::{Pokemon, WorkItem};
use crate::domain::value_objects::{Stat, StatBlock};

/// Field separator for delimited rows
pub const ROW_DELIMITER: char = ',';

/// Fields in a row without the trailing single-target flag
pub const ROW_REQUIRED_FIELDS: usize = 21;

/// Fields in a row that carries the single-target flag
pub const ROW_MAX_FIELDS: usize = 22;

/// Level given to both sides of a delimited row
pub const ROW_LEVEL: u32 = 50;

const STAT_FIELDS: [&str; 6] = ["hp", "atk", "def", "spa", "spd", "spe"];

/// A record that could not be parsed, with the raw text it came from
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} in record {raw:?}")]
pub struct RecordParseError {
    pub raw: String,
    pub reason: ParseFailure,
}

impl RecordParseError {
    fn new(raw: &str, reason: ParseFailure) -> Self {
        Self {
            raw: raw.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("expected {min} or {max} fields, found {found}")]
    FieldCount { found: usize, min: usize, max: usize },

    #[error("field `{field}` is not a non-negative integer: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("no moves listed")]
    NoMoves,

    #[error("empty record")]
    Empty,
}

/// Parse one delimited row into an attacker/defender work item
pub fn parse_row(line: &str) -> Result<WorkItem, RecordParseError> {
    let fields: Vec<&str> = line.split(ROW_DELIMITER).map(str::trim).collect();
    if !(ROW_REQUIRED_FIELDS..=ROW_MAX_FIELDS).contains(&fields.len()) {
        return Err(RecordParseError::new(
            line,
            ParseFailure::FieldCount {
                found: fields.len(),
                min: ROW_REQUIRED_FIELDS,
                max: ROW_MAX_FIELDS,
            },
        ));
    }

    let attacker = Pokemon::new(fields[0])
        .with_move(fields[1])
        .with_ability(fields[2])
        .with_nature(fields[4])
        .with_level(ROW_LEVEL)
        .with_evs(parse_row_stats(line, &fields[5..11])?)
        .with_single_target(parse_single_target(fields.get(21).copied()));
    let attacker = with_optional_item(attacker, fields[3]);

    let defender = Pokemon::new(fields[11])
        .with_ability(fields[12])
        .with_nature(fields[14])
        .with_level(ROW_LEVEL)
        .with_evs(parse_row_stats(line, &fields[15..21])?);
    let defender = with_optional_item(defender, fields[13]);

    Ok(WorkItem::new(attacker, defender))
}

/// Single-target flag: true only when the field parses as the float `1`.
///
/// A missing or unparseable field yields `false` rather than an error.
pub fn parse_single_target(field: Option<&str>) -> bool {
    field
        .and_then(|value| value.trim().parse::<f64>().ok())
        .is_some_and(|value| value == 1.0)
}

fn with_optional_item(pokemon: Pokemon, item: &str) -> Pokemon {
    if item.is_empty() {
        pokemon
    } else {
        pokemon.with_item(item)
    }
}

fn parse_row_stats(line: &str, fields: &[&str]) -> Result<StatBlock, RecordParseError> {
    let mut values = [0u32; 6];
    for ((slot, value), name) in values.iter_mut().zip(fields).zip(STAT_FIELDS) {
        *slot = parse_number(line, name, value)?;
    }
    Ok(StatBlock::full(values))
}

fn parse_number(raw: &str, field: &str, value: &str) -> Result<u32, RecordParseError> {
    value.trim().parse::<u32>().map_err(|_| {
        RecordParseError::new(
            raw,
            ParseFailure::InvalidNumber {
                field: field.to_string(),
                value: value.to_string(),
            },
        )
    })
}

/// Parse a team paste block into a Pokemon.
///
/// The first non-blank line is `Name` or `Name @ Item`. Every following line
/// is matched by prefix in file order, so a repeated field takes its last
/// value. A line that mentions `Nature` without any known prefix (for example
/// `Modest Nature`) sets the nature from its first word.
pub fn parse_paste(block: &str) -> Result<Pokemon, RecordParseError> {
    let mut lines = block.lines().map(str::trim_end);
    let header = lines
        .by_ref()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| RecordParseError::new(block, ParseFailure::Empty))?;

    let mut pokemon = match header.split_once(" @ ") {
        Some((name, item)) => Pokemon::new(name.trim()).with_item(item.trim()),
        None => Pokemon::new(header),
    };

    for line in lines {
        pokemon = if let Some(rest) = line.strip_prefix("Ability:") {
            pokemon.with_ability(rest.trim())
        } else if let Some(rest) = line.strip_prefix("Level:") {
            pokemon.with_level(parse_number(block, "Level", rest)?)
        } else if let Some(rest) = line.strip_prefix("Nature:") {
            pokemon.with_nature(rest.trim())
        } else if let Some(rest) = line.strip_prefix("EVs:") {
            pokemon.with_evs(parse_spread(block, "EVs", rest)?)
        } else if let Some(rest) = line.strip_prefix("IVs:") {
            pokemon.with_ivs(parse_spread(block, "IVs", rest)?)
        } else if let Some(rest) = line.strip_prefix("Tera Type:") {
            pokemon.with_tera_type(rest.trim())
        } else if let Some(rest) = line.strip_prefix("- ") {
            pokemon.with_move(rest.trim())
        } else if line.contains("Nature") {
            match line.split_whitespace().next() {
                Some(nature) => pokemon.with_nature(nature),
                None => pokemon,
            }
        } else {
            pokemon
        };
    }

    if pokemon.moves.is_empty() {
        return Err(RecordParseError::new(block, ParseFailure::NoMoves));
    }
    Ok(pokemon)
}

/// Parse `44 HP / 4 Def / 244 SpA`; unknown stat names are skipped
fn parse_spread(raw: &str, field: &str, spread: &str) -> Result<StatBlock, RecordParseError> {
    let mut block = StatBlock::default();
    for section in spread.split('/') {
        let mut tokens = section.split_whitespace();
        let (Some(value), Some(abbrev)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if let Some(stat) = Stat::from_abbreviation(abbrev) {
            let label = format!("{field} {}", stat.abbreviation());
            block = block.with_stat(stat, parse_number(raw, &label, value)?);
        }
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIRAIDON: &str = "Miraidon @ Choice Specs
Level: 50
Modest Nature
Tera Type: Fairy
Ability: Hadron Engine
EVs: 44 HP / 4 Def / 244 SpA / 12 SpD / 204 Spe
- Electro Drift";

    fn row(single_target: Option<&str>) -> String {
        let mut fields = vec![
            "Flutter Mane", "Moonblast", "Protosynthesis", "Booster Energy", "Timid",
            "4", "0", "0", "252", "0", "252",
            "Incineroar", "Intimidate", "Sitrus Berry", "Careful",
            "252", "4", "4", "0", "236", "12",
        ];
        if let Some(flag) = single_target {
            fields.push(flag);
        }
        fields.join(",")
    }

    #[test]
    fn test_parse_row() {
        let item = parse_row(&row(Some("1"))).unwrap();

        assert_eq!(item.attacker.name, "Flutter Mane");
        assert_eq!(item.attacker.active_move(), Some("Moonblast"));
        assert_eq!(item.attacker.item.as_deref(), Some("Booster Energy"));
        assert_eq!(item.attacker.level, 50);
        assert_eq!(item.attacker.evs, Some(StatBlock::full([4, 0, 0, 252, 0, 252])));
        assert_eq!(item.attacker.ivs, None);
        assert!(item.attacker.is_single_target);

        assert_eq!(item.defender.name, "Incineroar");
        assert_eq!(item.defender.nature, "Careful");
        assert_eq!(item.defender.level, 50);
        assert!(item.defender.moves.is_empty());
        assert_eq!(item.defender.evs.unwrap().special_defense, Some(236));
        assert_eq!(item.terrain_override, None);
    }

    #[test]
    fn test_single_target_flag() {
        let flag = |value: Option<&str>| parse_row(&row(value)).unwrap().attacker.is_single_target;

        assert!(flag(Some("1")));
        assert!(flag(Some("1.0")));
        assert!(!flag(Some("0")));
        assert!(!flag(Some("x")));
        assert!(!flag(Some("")));
        assert!(!flag(None));
    }

    #[test]
    fn test_row_with_too_few_fields() {
        let line = "Flutter Mane,Moonblast,Protosynthesis,Booster Energy,Timid,4,0,0,252,0";
        let err = parse_row(line).unwrap_err();

        assert_eq!(err.raw, line);
        assert_eq!(
            err.reason,
            ParseFailure::FieldCount { found: 10, min: 21, max: 22 }
        );
    }

    #[test]
    fn test_row_with_too_many_fields() {
        let line = format!("{},extra", row(Some("1")));
        assert!(matches!(
            parse_row(&line).unwrap_err().reason,
            ParseFailure::FieldCount { found: 23, .. }
        ));
    }

    #[test]
    fn test_row_with_non_numeric_stat() {
        let line = row(None).replacen("252", "lots", 1);
        let err = parse_row(&line).unwrap_err();
        assert_eq!(
            err.reason,
            ParseFailure::InvalidNumber { field: "spa".to_string(), value: "lots".to_string() }
        );

        let negative = row(None).replacen(",236,", ",-236,", 1);
        assert!(parse_row(&negative).is_err());
    }

    #[test]
    fn test_empty_item_field_means_no_item() {
        let line = row(None).replace("Sitrus Berry", "");
        let item = parse_row(&line).unwrap();
        assert_eq!(item.defender.item, None);
    }

    #[test]
    fn test_parse_paste() {
        let pokemon = parse_paste(MIRAIDON).unwrap();

        assert_eq!(pokemon.name, "Miraidon");
        assert_eq!(pokemon.item.as_deref(), Some("Choice Specs"));
        assert_eq!(pokemon.level, 50);
        assert_eq!(pokemon.nature, "Modest");
        assert_eq!(pokemon.tera_type.as_deref(), Some("Fairy"));
        assert_eq!(pokemon.ability, "Hadron Engine");
        let evs = pokemon.evs.unwrap();
        assert_eq!(evs.special_attack, Some(244));
        assert_eq!(evs.hp, Some(44));
        assert_eq!(evs.attack, None);
        assert_eq!(pokemon.ivs, None);
        assert_eq!(pokemon.active_move(), Some("Electro Drift"));
        assert!(!pokemon.is_tera);
        assert!(pokemon.is_single_target);
    }

    #[test]
    fn test_paste_defaults() {
        let pokemon = parse_paste("Rillaboom\nAbility: Grassy Surge\n- Grassy Glide\n- U-turn").unwrap();
        assert_eq!(pokemon.item, None);
        assert_eq!(pokemon.level, 100);
        assert_eq!(pokemon.evs, None);
        assert_eq!(pokemon.tera_type, None);
        assert_eq!(pokemon.moves, vec!["Grassy Glide", "U-turn"]);
    }

    #[test]
    fn test_last_nature_line_wins() {
        let block = "Amoonguss\nNature: Calm\nNature: Bold\nSassy Nature\n- Spore";
        assert_eq!(parse_paste(block).unwrap().nature, "Sassy");

        let block = "Amoonguss\nRelaxed Nature\nNature: Bold\n- Spore";
        assert_eq!(parse_paste(block).unwrap().nature, "Bold");
    }

    #[test]
    fn test_move_named_nature_is_a_move() {
        let block = "Shiinotic\nModest Nature\n- Nature Power";
        let pokemon = parse_paste(block).unwrap();
        assert_eq!(pokemon.nature, "Modest");
        assert_eq!(pokemon.moves, vec!["Nature Power"]);
    }

    #[test]
    fn test_ivs_and_unknown_stats() {
        let block = "Torkoal\nIVs: 0 Atk / 0 Spe / 31 Luck\n- Eruption";
        let ivs = parse_paste(block).unwrap().ivs.unwrap();
        assert_eq!(ivs.attack, Some(0));
        assert_eq!(ivs.speed, Some(0));
        assert_eq!(ivs.hp, None);
    }

    #[test]
    fn test_paste_errors() {
        let err = parse_paste("Miraidon @ Choice Specs\nLevel: 50").unwrap_err();
        assert_eq!(err.reason, ParseFailure::NoMoves);

        let err = parse_paste("Miraidon\nLevel: fifty\n- Electro Drift").unwrap_err();
        assert!(matches!(err.reason, ParseFailure::InvalidNumber { .. }));

        let err = parse_paste("Miraidon\nEVs: lots SpA\n- Electro Drift").unwrap_err();
        assert!(matches!(err.reason, ParseFailure::InvalidNumber { .. }));

        assert_eq!(parse_paste("  \n\n").unwrap_err().reason, ParseFailure::Empty);
    }

    #[test]
    fn test_paste_tolerates_padding() {
        let block = "\nRillaboom @ Choice Band  \r\nAdamant Nature\r\n- Grassy Glide\r\n    ";
        let pokemon = parse_paste(block).unwrap();
        assert_eq!(pokemon.name, "Rillaboom");
        assert_eq!(pokemon.item.as_deref(), Some("Choice Band"));
        assert_eq!(pokemon.nature, "Adamant");
        assert_eq!(pokemon.active_move(), Some("Grassy Glide"));
    }
}
