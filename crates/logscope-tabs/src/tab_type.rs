//! Tab kinds and their display metadata.
//!
//! The set of built-in kinds is fixed at compile time. The five plugin kinds
//! are positionally bound to loader slots; their metadata is a live read of
//! the registry passed in by the caller, never cached, since plugins may
//! load after the first lookup.

use serde::{Deserialize, Serialize};

use crate::plugin::PluginRegistry;

/// One kind of tab: the built-in visualizations plus five reserved plugin
/// bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabType {
    Documentation,
    LineGraph,
    Field2d,
    Field3d,
    Table,
    Console,
    Statistics,
    Video,
    Joysticks,
    Swerve,
    Mechanism,
    Points,
    Metadata,
    Plugin0,
    Plugin1,
    Plugin2,
    Plugin3,
    Plugin4,
}

/// Every tab type, in menu order.
pub const ALL_TAB_TYPES: [TabType; 18] = [
    TabType::Documentation,
    TabType::LineGraph,
    TabType::Field2d,
    TabType::Field3d,
    TabType::Table,
    TabType::Console,
    TabType::Statistics,
    TabType::Video,
    TabType::Joysticks,
    TabType::Swerve,
    TabType::Mechanism,
    TabType::Points,
    TabType::Metadata,
    TabType::Plugin0,
    TabType::Plugin1,
    TabType::Plugin2,
    TabType::Plugin3,
    TabType::Plugin4,
];

/// Built-in kinds usable in the restricted (lite) operating mode. Plugin
/// kinds are never included, independent of runtime state.
pub const LITE_COMPATIBLE_TABS: [TabType; 12] = [
    TabType::Documentation,
    TabType::LineGraph,
    TabType::Field2d,
    TabType::Field3d,
    TabType::Table,
    TabType::Console,
    TabType::Statistics,
    TabType::Joysticks,
    TabType::Swerve,
    TabType::Mechanism,
    TabType::Points,
    TabType::Metadata,
];

impl TabType {
    /// The slot index bound to a plugin kind, or `None` for built-ins.
    pub fn plugin_index(&self) -> Option<usize> {
        match self {
            TabType::Plugin0 => Some(0),
            TabType::Plugin1 => Some(1),
            TabType::Plugin2 => Some(2),
            TabType::Plugin3 => Some(3),
            TabType::Plugin4 => Some(4),
            _ => None,
        }
    }

    /// The plugin kind bound to a slot index, if one is reserved for it.
    pub fn plugin(index: usize) -> Option<TabType> {
        match index {
            0 => Some(TabType::Plugin0),
            1 => Some(TabType::Plugin1),
            2 => Some(TabType::Plugin2),
            3 => Some(TabType::Plugin3),
            4 => Some(TabType::Plugin4),
            _ => None,
        }
    }

    pub fn is_plugin(&self) -> bool {
        self.plugin_index().is_some()
    }
}

/// Default title for a tab of this type. Plugin kinds read the bound
/// plugin's title, or an empty string when the slot is absent.
pub fn default_tab_title(tab_type: TabType, plugins: &PluginRegistry) -> String {
    match tab_type {
        TabType::Documentation => String::new(),
        TabType::LineGraph => "Line Graph".to_string(),
        TabType::Field2d => "2D Field".to_string(),
        TabType::Field3d => "3D Field".to_string(),
        TabType::Table => "Table".to_string(),
        TabType::Console => "Console".to_string(),
        TabType::Statistics => "Statistics".to_string(),
        TabType::Video => "Video".to_string(),
        TabType::Joysticks => "Joysticks".to_string(),
        TabType::Swerve => "Swerve".to_string(),
        TabType::Mechanism => "Mechanism".to_string(),
        TabType::Points => "Points".to_string(),
        TabType::Metadata => "Metadata".to_string(),
        _ => plugins
            .plugin_for(tab_type)
            .map(|p| p.title.clone())
            .unwrap_or_default(),
    }
}

/// Icon for a tab of this type. Plugin kinds read the bound plugin's icon,
/// falling back to a generic plug.
pub fn tab_icon(tab_type: TabType, plugins: &PluginRegistry) -> String {
    match tab_type {
        TabType::Documentation => "📖".to_string(),
        TabType::LineGraph => "📉".to_string(),
        TabType::Field2d => "🗺".to_string(),
        TabType::Field3d => "👀".to_string(),
        TabType::Table => "🔢".to_string(),
        TabType::Console => "💬".to_string(),
        TabType::Statistics => "📊".to_string(),
        TabType::Video => "🎬".to_string(),
        TabType::Joysticks => "🎮".to_string(),
        TabType::Swerve => "🦀".to_string(),
        TabType::Mechanism => "⚙️".to_string(),
        TabType::Points => "📍".to_string(),
        TabType::Metadata => "🔍".to_string(),
        _ => plugins
            .plugin_for(tab_type)
            .map(|p| p.icon.clone())
            .unwrap_or_else(|| "🔌".to_string()),
    }
}

/// Keyboard shortcut for creating a tab of this type. The documentation tab
/// and plugin kinds have none.
pub fn tab_accelerator(tab_type: TabType) -> Option<&'static str> {
    match tab_type {
        TabType::LineGraph => Some("Alt+G"),
        TabType::Field2d => Some("Alt+2"),
        TabType::Field3d => Some("Alt+3"),
        TabType::Table => Some("Alt+T"),
        TabType::Console => Some("Alt+C"),
        TabType::Statistics => Some("Alt+S"),
        TabType::Video => Some("Alt+V"),
        TabType::Joysticks => Some("Alt+J"),
        TabType::Swerve => Some("Alt+D"),
        TabType::Mechanism => Some("Alt+M"),
        TabType::Points => Some("Alt+P"),
        TabType::Metadata => Some("Alt+I"),
        _ => None,
    }
}

/// The full enumeration with unoccupied plugin kinds filtered out: what a
/// "new tab" menu should offer.
pub fn all_tab_types_with_plugins(plugins: &PluginRegistry) -> Vec<TabType> {
    ALL_TAB_TYPES
        .into_iter()
        .filter(|t| !t.is_plugin() || plugins.is_plugin_defined(*t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_index_round_trip() {
        for index in 0..5 {
            let tab_type = TabType::plugin(index).unwrap();
            assert_eq!(tab_type.plugin_index(), Some(index));
        }
        assert_eq!(TabType::plugin(5), None);
        assert_eq!(TabType::LineGraph.plugin_index(), None);
    }

    #[test]
    fn test_builtin_metadata_ignores_registry() {
        let empty = PluginRegistry::default();
        assert_eq!(default_tab_title(TabType::Field2d, &empty), "2D Field");
        assert_eq!(tab_icon(TabType::LineGraph, &empty), "📉");
        assert_eq!(default_tab_title(TabType::Documentation, &empty), "");
    }

    #[test]
    fn test_absent_plugin_metadata() {
        let empty = PluginRegistry::default();
        assert_eq!(default_tab_title(TabType::Plugin0, &empty), "");
        assert_eq!(tab_icon(TabType::Plugin3, &empty), "🔌");
    }

    #[test]
    fn test_accelerators() {
        assert_eq!(tab_accelerator(TabType::LineGraph), Some("Alt+G"));
        assert_eq!(tab_accelerator(TabType::Documentation), None);
        assert_eq!(tab_accelerator(TabType::Plugin2), None);
    }

    #[test]
    fn test_lite_tabs_exclude_plugins_and_video() {
        assert!(!LITE_COMPATIBLE_TABS.contains(&TabType::Video));
        assert!(LITE_COMPATIBLE_TABS.iter().all(|t| !t.is_plugin()));
    }
}
