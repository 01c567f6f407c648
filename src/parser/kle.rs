//! Keyboard-layout-editor (KLE) JSON parser.
//!
//! A KLE document is an array of rows. Each row is an array mixing property
//! objects, which change the state applied to the following keys, and
//! strings, which emit a key. An optional leading object holds keyboard
//! metadata; Kittencaps reads its `iconMargin` and `scale` extensions.
//!
//! The state machine follows the reference KLE serializer: sizes reset after
//! every key, colors and alignment persist, and every row starts one unit
//! lower at the current rotation origin.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::models::layout::LABEL_SLOTS;
use crate::models::{Key, Keyboard};

/// Default label alignment.
const DEFAULT_ALIGNMENT: usize = 4;

/// Maps a label's position in the key string to its canonical slot, per alignment.
/// `-1` marks positions that alignment doesn't use.
const LABEL_MAP: [[i8; LABEL_SLOTS]; 8] = [
    [0, 6, 2, 8, 9, 11, 3, 5, 1, 4, 7, 10],
    [1, 7, -1, -1, 9, 11, 4, -1, -1, -1, -1, 10],
    [3, -1, 5, -1, 9, 11, -1, -1, 4, -1, -1, 10],
    [4, -1, -1, -1, 9, 11, -1, -1, -1, -1, -1, 10],
    [0, 6, 2, 8, 10, -1, 3, 5, 1, 4, 7, -1],
    [1, 7, -1, -1, 10, -1, 4, -1, -1, -1, -1, -1],
    [3, -1, 5, -1, 10, -1, -1, -1, 4, -1, -1, -1],
    [4, -1, -1, -1, 10, -1, -1, -1, -1, -1, -1, -1],
];

/// Parses a KLE layout file (JSON or JSON5).
///
/// # Errors
///
/// Returns an error if the file can't be read, isn't JSON5, or isn't a
/// well-formed KLE document.
pub fn parse_layout_file(path: &Path) -> Result<Keyboard> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read layout file: {}", path.display()))?;
    let value: Value = json5::from_str(&content)
        .context(format!("Failed to parse layout file: {}", path.display()))?;
    let keyboard =
        parse_layout(&value).context(format!("Invalid KLE layout: {}", path.display()))?;

    debug!(
        "Parsed {} keys from {}",
        keyboard.keys.len(),
        path.display()
    );
    Ok(keyboard)
}

/// Parses a KLE document.
///
/// # Examples
///
/// ```
/// use kittencaps::parser::kle::parse_layout;
/// use serde_json::json;
///
/// let layout = parse_layout(&json!([
///     {"name": "demo", "iconMargin": 5},
///     ["Q", {"w": 1.5}, "W"],
/// ])).unwrap();
///
/// assert_eq!(layout.keys.len(), 2);
/// assert_eq!(layout.keys[1].x, 1.0);
/// assert_eq!(layout.keys[1].width, 1.5);
/// assert_eq!(layout.icon_margin, 5.0);
/// ```
///
/// # Errors
///
/// Returns an error if the document isn't an array of rows, a property has
/// the wrong type, or a rotation property appears anywhere but on the first
/// key of a row.
pub fn parse_layout(document: &Value) -> Result<Keyboard> {
    let items = document
        .as_array()
        .context("KLE layout must be a JSON array")?;

    let mut keyboard = Keyboard::default();
    let mut state = ParseState::default();

    for (row_index, item) in items.iter().enumerate() {
        match item {
            Value::Object(metadata) if row_index == 0 => read_metadata(metadata, &mut keyboard)?,
            Value::Array(row) => {
                parse_row(row, &mut state, &mut keyboard.keys)
                    .with_context(|| format!("In row {row_index}"))?;
            }
            other => anyhow::bail!(
                "Row {row_index} must be an array, got {}",
                json_type_name(other)
            ),
        }
    }

    Ok(keyboard)
}

/// Running state applied to the next key.
#[derive(Debug, Clone)]
struct ParseState {
    key: Key,
    alignment: usize,
    cluster_x: f64,
    cluster_y: f64,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            key: Key::default(),
            alignment: DEFAULT_ALIGNMENT,
            cluster_x: 0.0,
            cluster_y: 0.0,
        }
    }
}

fn parse_row(row: &[Value], state: &mut ParseState, keys: &mut Vec<Key>) -> Result<()> {
    for (index, item) in row.iter().enumerate() {
        match item {
            Value::String(legend) => {
                let mut key = state.key.clone();
                key.labels = reorder_labels(legend, state.alignment);
                keys.push(key);

                let current = &mut state.key;
                current.x += current.width;
                current.width = 1.0;
                current.height = 1.0;
            }
            Value::Object(props) => apply_properties(props, index, state)?,
            other => anyhow::bail!(
                "Item {index} must be a string or an object, got {}",
                json_type_name(other)
            ),
        }
    }

    state.key.y += 1.0;
    state.key.x = state.key.rotation_x;
    Ok(())
}

fn apply_properties(props: &Map<String, Value>, index: usize, state: &mut ParseState) -> Result<()> {
    if let Some(angle) = number(props, "r")? {
        ensure_first(index, "r")?;
        state.key.rotation_angle = angle;
    }
    if let Some(rx) = number(props, "rx")? {
        ensure_first(index, "rx")?;
        state.cluster_x = rx;
        state.key.rotation_x = rx;
        state.key.x = state.cluster_x;
        state.key.y = state.cluster_y;
    }
    if let Some(ry) = number(props, "ry")? {
        ensure_first(index, "ry")?;
        state.cluster_y = ry;
        state.key.rotation_y = ry;
        state.key.x = state.cluster_x;
        state.key.y = state.cluster_y;
    }
    if let Some(alignment) = number(props, "a")? {
        state.alignment = alignment_index(alignment)?;
    }
    if let Some(color) = string(props, "c")? {
        state.key.color = color.to_string();
    }
    if let Some(text_color) = string(props, "t")? {
        let first = text_color.split('\n').next().unwrap_or_default();
        if !first.is_empty() {
            state.key.default_text_color = first.to_string();
        }
    }
    if let Some(x) = number(props, "x")? {
        state.key.x += x;
    }
    if let Some(y) = number(props, "y")? {
        state.key.y += y;
    }
    if let Some(width) = number(props, "w")? {
        state.key.width = width;
    }
    if let Some(height) = number(props, "h")? {
        state.key.height = height;
    }
    Ok(())
}

fn read_metadata(metadata: &Map<String, Value>, keyboard: &mut Keyboard) -> Result<()> {
    if let Some(name) = string(metadata, "name")? {
        keyboard.name = name.to_string();
    }
    if let Some(author) = string(metadata, "author")? {
        keyboard.author = author.to_string();
    }
    if let Some(margin) = number(metadata, "iconMargin")? {
        anyhow::ensure!(margin >= 0.0, "iconMargin must not be negative, got {margin}");
        keyboard.icon_margin = margin;
    }
    if let Some(scale) = number(metadata, "scale")? {
        anyhow::ensure!(scale > 0.0, "scale must be positive, got {scale}");
        keyboard.scale = scale;
    }
    Ok(())
}

/// Splits a legend string on newlines and moves each part to its canonical slot.
fn reorder_labels(legend: &str, alignment: usize) -> Vec<String> {
    let mut labels = vec![String::new(); LABEL_SLOTS];
    for (position, label) in legend.split('\n').take(LABEL_SLOTS).enumerate() {
        if label.is_empty() {
            continue;
        }
        if let Ok(slot) = usize::try_from(LABEL_MAP[alignment][position]) {
            labels[slot] = label.to_string();
        }
    }
    labels
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alignment_index(value: f64) -> Result<usize> {
    if value.fract() != 0.0 || !(0.0..8.0).contains(&value) {
        anyhow::bail!("Alignment 'a' must be an integer from 0 to 7, got {value}");
    }
    Ok(value as usize)
}

fn ensure_first(index: usize, property: &str) -> Result<()> {
    if index != 0 {
        anyhow::bail!("'{property}' can only be used on the first key in a row");
    }
    Ok(())
}

fn number(props: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    match props.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .with_context(|| format!("Property '{name}' must be a number")),
    }
}

fn string<'a>(props: &'a Map<String, Value>, name: &str) -> Result<Option<&'a str>> {
    match props.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .with_context(|| format!("Property '{name}' must be a string")),
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::CENTER_LABEL;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_rows_advance_and_sizes_reset() {
        let layout = parse_layout(&json!([
            ["A", {"w": 2}, "B", "C"],
            [{"y": 0.5}, "D"],
        ]))
        .unwrap();

        let positions: Vec<_> = layout.keys.iter().map(|k| (k.x, k.y, k.width)).collect();
        assert_eq!(
            positions,
            [(0.0, 0.0, 1.0), (1.0, 0.0, 2.0), (3.0, 0.0, 1.0), (0.0, 1.5, 1.0)]
        );
    }

    #[test]
    fn test_default_alignment_puts_single_label_in_center() {
        let layout = parse_layout(&json!([["[esc]"]])).unwrap();
        assert_eq!(layout.keys[0].labels[CENTER_LABEL], "");
        assert_eq!(layout.keys[0].labels[0], "[esc]");

        let layout = parse_layout(&json!([[{"a": 7}, "[esc]"]])).unwrap();
        assert_eq!(layout.keys[0].center_label(), "[esc]");
    }

    #[test]
    fn test_alignment_reorders_multiline_legends() {
        let layout = parse_layout(&json!([[{"a": 4}, "top\nbottom"]])).unwrap();
        assert_eq!(layout.keys[0].labels[0], "top");
        assert_eq!(layout.keys[0].labels[6], "bottom");
    }

    #[test]
    fn test_colors_persist() {
        let layout = parse_layout(&json!([
            [{"c": "bg_accent", "t": "fg_1\n\nfg_2"}, "A", "B"],
            [{"t": ""}, "C"],
        ]))
        .unwrap();
        for key in &layout.keys {
            assert_eq!(key.color, "bg_accent");
            assert_eq!(key.default_text_color, "fg_1");
        }
    }

    #[test]
    fn test_rotation_cluster() {
        let layout = parse_layout(&json!([
            [{"r": 15, "rx": 2, "ry": 1}, "A", "B"],
            ["C"],
        ]))
        .unwrap();

        let a = &layout.keys[0];
        assert_eq!((a.x, a.y), (2.0, 1.0));
        assert_eq!(a.rotation_angle, 15.0);
        assert_eq!((a.rotation_x, a.rotation_y), (2.0, 1.0));
        assert_eq!(layout.keys[1].x, 3.0);

        let c = &layout.keys[2];
        assert_eq!((c.x, c.y), (2.0, 2.0));
        assert_eq!(c.rotation_angle, 15.0);
    }

    #[test]
    fn test_rotation_after_first_key_is_rejected() {
        let err = parse_layout(&json!([["A", {"r": 10}, "B"]])).unwrap_err();
        assert!(format!("{err:#}").contains("first key in a row"));
    }

    #[test]
    fn test_metadata_extensions() {
        let layout = parse_layout(&json!([
            {"name": "Kittencaps", "author": "me", "iconMargin": 12.5, "scale": 2},
            ["A"],
        ]))
        .unwrap();
        assert_eq!(layout.name, "Kittencaps");
        assert_eq!(layout.icon_margin, 12.5);
        assert_eq!(layout.scale, 2.0);

        let layout = parse_layout(&json!([["A"]])).unwrap();
        assert_eq!(layout.icon_margin, 0.0);
        assert_eq!(layout.scale, 1.0);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(parse_layout(&json!({"rows": []})).is_err());
        assert!(parse_layout(&json!([["A"], {"name": "late"}])).is_err());
        assert!(parse_layout(&json!([[42]])).is_err());
        assert!(parse_layout(&json!([[{"w": "wide"}, "A"]])).is_err());
        assert!(parse_layout(&json!([[{"a": 9}, "A"]])).is_err());
    }

    #[test]
    fn test_parse_layout_file_json5() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layout.json");
        std::fs::write(&path, "// comment\n[[{a: 7, c: 'bg_main'}, '[esc]',],]").unwrap();

        let layout = parse_layout_file(&path).unwrap();
        assert_eq!(layout.keys.len(), 1);
        assert_eq!(layout.keys[0].color, "bg_main");
    }
}
