//! Names the damage engine expects in place of our canonical species names

/// Canonical name -> engine display name. Only consulted when building a request.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("Urshifu-Single-Strike", "Urshifu"),
    ("Indeedee-Male", "Indeedee"),
    ("Indeedee-Female", "Indeedee-F"),
    ("Tornadus-Incarnate", "Tornadus"),
    ("Landorus-Incarnate", "Landorus"),
];

/// Look up the engine-facing name for a species, falling back to the name itself
pub fn display_name(name: &str) -> &str {
    DISPLAY_NAMES
        .iter()
        .find(|(canonical, _)| *canonical == name)
        .map(|(_, display)| *display)
        .unwrap_or(name)
}
