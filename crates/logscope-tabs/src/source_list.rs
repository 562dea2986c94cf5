//! Declarative source-list configuration and selection state.
//!
//! A source list is the field-selection widget most tabs embed: a set of
//! selectable "types" (each accepting certain log value kinds and carrying
//! nested options) plus the ordered list of fields the user has added.
//! Serialized names stay camelCase so saved layouts round-trip with the
//! desktop app's JSON format.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use logscope_core::error::{LogscopeError, Result};

/// Auto-advance rule applied after a field is added: move focus to the next
/// type, or to a named option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoAdvance {
    NextType(bool),
    ToOption(String),
}

impl Default for AutoAdvance {
    fn default() -> Self {
        AutoAdvance::NextType(false)
    }
}

/// Configuration for a source list component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListConfig {
    /// Title displayed for this source list.
    pub title: String,
    /// True advances type, string advances option.
    #[serde(default)]
    pub auto_advance: AutoAdvance,
    /// Should be false if parent types (arrays/structs) are supported directly.
    #[serde(default)]
    pub allow_children_from_drag: bool,
    /// If provided, remember types and options for fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_memory_id: Option<String>,
    /// Available types for this source list.
    pub types: Vec<SourceListTypeConfig>,
}

/// Configuration for a single type in a source list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListTypeConfig {
    /// Unique key for this type.
    pub key: String,
    /// Display name for this type.
    pub display: String,
    /// Symbol name for the icon.
    pub symbol: String,
    /// Whether to show this type in the type name.
    #[serde(default)]
    pub show_in_type_name: bool,
    /// Option key or hex color (starting with #).
    pub color: String,
    /// Optional dark mode color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_color: Option<String>,
    /// Allowed source types from the log.
    pub source_types: Vec<String>,
    /// Enable deprecation warning for number arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_array_deprecated: Option<bool>,
    /// Identifies parents with shared children types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
    /// Parent key this child is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_of: Option<String>,
    /// Preview geometry type for this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_type: Option<String>,
    /// Initial option to select when adding this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_selection_option: Option<String>,
    /// Whether to show documentation for this type.
    #[serde(default)]
    pub show_docs: bool,
    /// Available options for this type.
    #[serde(default)]
    pub options: Vec<SourceListOptionConfig>,
}

/// Configuration for an option in a source list type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListOptionConfig {
    /// Unique key for this option.
    pub key: String,
    /// Display name for this option.
    pub display: String,
    /// Whether to show this option in the type name.
    #[serde(default)]
    pub show_in_type_name: bool,
    /// Available values for this option.
    pub values: Vec<SourceListOptionValueConfig>,
}

/// Configuration for a value in a source list option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceListOptionValueConfig {
    /// Unique key for this value.
    pub key: String,
    /// Display name for this value.
    pub display: String,
}

/// State of a source list: ordered item records, order drives display order.
pub type SourceListState = Vec<SourceListItemState>;

/// State of a single item in a source list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListItemState {
    /// Type key.
    #[serde(rename = "type")]
    pub type_key: String,
    /// Log field key.
    pub log_key: String,
    /// Log field type.
    pub log_type: String,
    /// Whether this item is visible.
    pub visible: bool,
    /// Selected option values.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Remembered type/option choices, by memory id then log key.
pub type SourceListTypeMemory = HashMap<String, HashMap<String, SourceListTypeMemoryEntry>>;

/// Entry in the type memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListTypeMemoryEntry {
    /// Type key.
    #[serde(rename = "type")]
    pub type_key: String,
    /// Selected option values.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Standard graph colors for visualizations.
pub fn graph_colors() -> Vec<SourceListOptionValueConfig> {
    [
        ("#2b66a2", "Blue"),
        ("#e5b31b", "Gold"),
        ("#af2437", "Red"),
        ("#80588e", "Purple"),
        ("#e48b32", "Orange"),
        ("#c0b487", "Tan"),
        ("#858584", "Gray"),
        ("#3b875a", "Green"),
        ("#d993aa", "Pink"),
        ("#5f4528", "Brown"),
    ]
    .into_iter()
    .map(|(key, display)| SourceListOptionValueConfig {
        key: key.to_string(),
        display: display.to_string(),
    })
    .collect()
}

/// Neon colors for high-contrast visualizations.
pub fn neon_colors() -> Vec<SourceListOptionValueConfig> {
    [
        ("#00ff00", "Green"),
        ("#ff0000", "Red"),
        ("#0000ff", "Blue"),
        ("#ff8c00", "Orange"),
        ("#00ffff", "Cyan"),
        ("#ffff00", "Yellow"),
        ("#ff00ff", "Magenta"),
    ]
    .into_iter()
    .map(|(key, display)| SourceListOptionValueConfig {
        key: key.to_string(),
        display: display.to_string(),
    })
    .collect()
}

impl SourceListConfig {
    /// Check the key-uniqueness invariants: type keys unique within the
    /// config, option keys unique within each type.
    pub fn validate(&self) -> Result<()> {
        let mut type_keys = HashSet::new();
        for type_config in &self.types {
            if !type_keys.insert(type_config.key.as_str()) {
                return Err(LogscopeError::Config(format!(
                    "Duplicate source list type key: {}",
                    type_config.key
                )));
            }
            let mut option_keys = HashSet::new();
            for option in &type_config.options {
                if !option_keys.insert(option.key.as_str()) {
                    return Err(LogscopeError::Config(format!(
                        "Duplicate option key '{}' in type '{}'",
                        option.key, type_config.key
                    )));
                }
            }
        }
        Ok(())
    }

    fn type_config(&self, key: &str) -> Option<&SourceListTypeConfig> {
        self.types.iter().find(|t| t.key == key)
    }

    /// The first declared type accepting this log value kind.
    fn type_for_source(&self, log_type: &str) -> Option<&SourceListTypeConfig> {
        self.types
            .iter()
            .find(|t| t.source_types.iter().any(|s| s == log_type))
    }
}

/// Supplies extra selection state from outside the widget (e.g. a paired
/// list sharing its fields).
pub type StateSupplier = Box<dyn Fn() -> SourceListState + Send>;

/// The selection handle returned by [`create_source_list`]. Controllers
/// compose their `active_fields`/`command` output from its state.
pub struct SourceList {
    config: SourceListConfig,
    state: SourceListState,
    suppliers: Vec<StateSupplier>,
    stopped: bool,
}

/// Construct the selection model for `config`, with zero or more
/// supplemental state suppliers.
pub fn create_source_list(
    config: SourceListConfig,
    suppliers: Vec<StateSupplier>,
) -> Result<SourceList> {
    config.validate()?;
    Ok(SourceList {
        config,
        state: Vec::new(),
        suppliers,
        stopped: false,
    })
}

impl SourceList {
    pub fn config(&self) -> &SourceListConfig {
        &self.config
    }

    /// Current selection state. With `only_displayed` set, hidden items are
    /// skipped.
    pub fn get_state(&self, only_displayed: bool) -> SourceListState {
        self.state
            .iter()
            .filter(|item| !only_displayed || item.visible)
            .cloned()
            .collect()
    }

    /// Replace the selection state. Items with undeclared type keys are
    /// dropped; option maps are filtered to declared keys, with declared
    /// options missing a value filled from their first choice.
    pub fn set_state(&mut self, state: SourceListState) {
        if self.stopped {
            return;
        }
        self.state = state
            .into_iter()
            .filter_map(|item| self.normalize_item(item))
            .collect();
    }

    fn normalize_item(&self, mut item: SourceListItemState) -> Option<SourceListItemState> {
        let Some(type_config) = self.config.type_config(&item.type_key) else {
            warn!(type_key = %item.type_key, "Dropping source list item with unknown type");
            return None;
        };
        let mut options = BTreeMap::new();
        for option in &type_config.options {
            let value = item
                .options
                .remove(&option.key)
                .filter(|v| option.values.iter().any(|c| &c.key == v))
                .or_else(|| option.values.first().map(|c| c.key.clone()));
            if let Some(value) = value {
                options.insert(option.key.clone(), value);
            }
        }
        item.options = options;
        Some(item)
    }

    /// Add a field, picking the first declared type that accepts its log
    /// value kind. Returns false when no type accepts it.
    pub fn add_field(&mut self, log_key: &str, log_type: &str) -> bool {
        if self.stopped {
            return false;
        }
        let Some(type_config) = self.config.type_for_source(log_type) else {
            return false;
        };
        let item = SourceListItemState {
            type_key: type_config.key.clone(),
            log_key: log_key.to_string(),
            log_type: log_type.to_string(),
            visible: true,
            options: BTreeMap::new(),
        };
        // normalize_item fills option defaults
        if let Some(item) = self.normalize_item(item) {
            self.state.push(item);
            true
        } else {
            false
        }
    }

    /// Toggle an item's visibility. Out-of-range indices are ignored.
    pub fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(item) = self.state.get_mut(index) {
            item.visible = visible;
        }
    }

    /// Field keys currently referenced, including supplemental suppliers,
    /// deduplicated in first-seen order.
    pub fn active_fields(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for item in &self.state {
            if seen.insert(item.log_key.clone()) {
                fields.push(item.log_key.clone());
            }
        }
        for supplier in &self.suppliers {
            for item in supplier() {
                if seen.insert(item.log_key.clone()) {
                    fields.push(item.log_key);
                }
            }
        }
        fields
    }

    /// Re-normalize state against the config. Called when new log data may
    /// have changed field types.
    pub fn refresh(&mut self) {
        if self.stopped {
            return;
        }
        let state = std::mem::take(&mut self.state);
        self.set_state(state);
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Detach the list; further mutations are ignored.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Record a type/option choice for a field under a memory id.
pub fn remember_type(
    memory: &mut SourceListTypeMemory,
    memory_id: &str,
    log_key: &str,
    entry: SourceListTypeMemoryEntry,
) {
    memory
        .entry(memory_id.to_string())
        .or_default()
        .insert(log_key.to_string(), entry);
}

/// Look up a remembered type/option choice.
pub fn recall_type<'a>(
    memory: &'a SourceListTypeMemory,
    memory_id: &str,
    log_key: &str,
) -> Option<&'a SourceListTypeMemoryEntry> {
    memory.get(memory_id)?.get(log_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_config() -> SourceListConfig {
        SourceListConfig {
            title: "Sources".to_string(),
            auto_advance: AutoAdvance::NextType(false),
            allow_children_from_drag: false,
            type_memory_id: None,
            types: vec![
                SourceListTypeConfig {
                    key: "number".to_string(),
                    display: "Number".to_string(),
                    symbol: "number".to_string(),
                    color: "#4287f5".to_string(),
                    source_types: vec!["Number".to_string()],
                    show_docs: true,
                    options: vec![SourceListOptionConfig {
                        key: "color".to_string(),
                        display: "Color".to_string(),
                        show_in_type_name: false,
                        values: graph_colors(),
                    }],
                    ..Default::default()
                },
                SourceListTypeConfig {
                    key: "boolean".to_string(),
                    display: "Boolean".to_string(),
                    symbol: "checkmark.circle.fill".to_string(),
                    color: "#f5a442".to_string(),
                    source_types: vec!["Boolean".to_string()],
                    show_docs: true,
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_duplicate_type_key_rejected() {
        let mut config = number_config();
        config.types[1].key = "number".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_option_key_rejected() {
        let mut config = number_config();
        config.types[0].options.push(SourceListOptionConfig {
            key: "color".to_string(),
            display: "Color again".to_string(),
            show_in_type_name: false,
            values: neon_colors(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_add_field_picks_matching_type() {
        let mut list = create_source_list(number_config(), Vec::new()).unwrap();
        assert!(list.add_field("/drive/speed", "Number"));
        assert!(list.add_field("/drive/enabled", "Boolean"));
        assert!(!list.add_field("/drive/name", "String"));

        let state = list.get_state(false);
        assert_eq!(state.len(), 2);
        assert_eq!(state[0].type_key, "number");
        // Declared option defaulted to the first color
        assert_eq!(state[0].options.get("color"), Some(&"#2b66a2".to_string()));
    }

    #[test]
    fn test_set_state_drops_unknown_types_and_options() {
        let mut list = create_source_list(number_config(), Vec::new()).unwrap();
        let mut bogus_options = BTreeMap::new();
        bogus_options.insert("linewidth".to_string(), "3".to_string());
        list.set_state(vec![
            SourceListItemState {
                type_key: "number".to_string(),
                log_key: "/a".to_string(),
                log_type: "Number".to_string(),
                visible: true,
                options: bogus_options,
            },
            SourceListItemState {
                type_key: "mystery".to_string(),
                log_key: "/b".to_string(),
                log_type: "Number".to_string(),
                visible: true,
                options: BTreeMap::new(),
            },
        ]);

        let state = list.get_state(false);
        assert_eq!(state.len(), 1);
        assert!(!state[0].options.contains_key("linewidth"));
        assert!(state[0].options.contains_key("color"));
    }

    #[test]
    fn test_only_displayed_filter() {
        let mut list = create_source_list(number_config(), Vec::new()).unwrap();
        list.add_field("/a", "Number");
        list.add_field("/b", "Number");
        list.set_visible(1, false);
        assert_eq!(list.get_state(false).len(), 2);
        assert_eq!(list.get_state(true).len(), 1);
    }

    #[test]
    fn test_active_fields_include_suppliers() {
        let supplier: StateSupplier = Box::new(|| {
            vec![SourceListItemState {
                type_key: "number".to_string(),
                log_key: "/extra".to_string(),
                log_type: "Number".to_string(),
                visible: true,
                options: BTreeMap::new(),
            }]
        });
        let mut list = create_source_list(number_config(), vec![supplier]).unwrap();
        list.add_field("/a", "Number");
        list.add_field("/a", "Number");
        assert_eq!(list.active_fields(), vec!["/a", "/extra"]);
    }

    #[test]
    fn test_stop_freezes_state() {
        let mut list = create_source_list(number_config(), Vec::new()).unwrap();
        list.add_field("/a", "Number");
        list.stop();
        assert!(!list.add_field("/b", "Number"));
        assert_eq!(list.get_state(false).len(), 1);
        // Refreshing a detached list must not wipe its state either
        list.refresh();
        assert_eq!(list.get_state(false).len(), 1);
    }

    #[test]
    fn test_state_serialization_shape() {
        let mut list = create_source_list(number_config(), Vec::new()).unwrap();
        list.add_field("/drive/speed", "Number");
        let json = serde_json::to_value(list.get_state(false)).unwrap();
        assert_eq!(json[0]["type"], "number");
        assert_eq!(json[0]["logKey"], "/drive/speed");
        assert_eq!(json[0]["logType"], "Number");
        assert_eq!(json[0]["visible"], true);
    }

    #[test]
    fn test_type_memory_round_trip() {
        let mut memory = SourceListTypeMemory::new();
        remember_type(
            &mut memory,
            "lineGraph",
            "/drive/speed",
            SourceListTypeMemoryEntry {
                type_key: "number".to_string(),
                options: BTreeMap::new(),
            },
        );
        let entry = recall_type(&memory, "lineGraph", "/drive/speed").unwrap();
        assert_eq!(entry.type_key, "number");
        assert!(recall_type(&memory, "lineGraph", "/other").is_none());
    }
}
