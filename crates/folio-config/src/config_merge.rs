//! Layering of config documents on top of the built-in defaults.

use tracing::warn;

const KNOWN_SECTIONS: &[&str] = &["schema_version", "prefetch", "pages", "seeds", "idle"];

/// Merge `overlay` into `base` in place. Tables merge key by key; any other
/// value, arrays included, is replaced whole. A page's image list or seed
/// list is therefore overridden as a unit, never concatenated.
pub(crate) fn merge_layer(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_map), toml::Value::Table(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_layer(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Top-level keys serde would drop silently. Logged, then returned.
pub(crate) fn unknown_sections(layer: &toml::Value, source: &str) -> Vec<String> {
    let Some(table) = layer.as_table() else {
        return Vec::new();
    };
    let unknown: Vec<String> = table
        .keys()
        .filter(|key| !KNOWN_SECTIONS.contains(&key.as_str()))
        .cloned()
        .collect();
    for key in &unknown {
        warn!(source, key = %key, "unknown config section ignored");
    }
    unknown
}
