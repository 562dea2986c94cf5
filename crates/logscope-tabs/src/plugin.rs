//! Loaded-plugin representation and the host-owned slot registry.

use std::fmt;
use std::sync::Arc;

use crate::controller::{NoopController, TabController};
use crate::renderer::{NoopRenderer, TabRenderer};
use crate::tab_type::TabType;

/// Number of plugin kinds addressable from [`TabType`].
pub const PLUGIN_SLOT_COUNT: usize = 5;

/// Constructs a fresh controller instance for one tab.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn TabController> + Send + Sync>;

/// Constructs a fresh renderer instance for one tab.
pub type RendererFactory = Arc<dyn Fn() -> Box<dyn TabRenderer> + Send + Sync>;

/// A validated, loaded plugin. Immutable once installed in a slot.
#[derive(Clone)]
pub struct Plugin {
    pub title: String,
    pub icon: String,
    pub controller: ControllerFactory,
    pub renderer: RendererFactory,
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("title", &self.title)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// One positional binding point: a stable identifier (the source directory)
/// plus the plugin occupying it, if any.
#[derive(Debug, Clone, Default)]
pub struct PluginSlot {
    pub id: String,
    pub plugin: Option<Plugin>,
}

/// Host-owned table of plugin slots.
///
/// Ordered and keyed by the stable slot identifier; the reserved
/// `TabType::Plugin0..4` kinds address the first five positions. The loader
/// replaces the whole registry on each load cycle, so consumers never see a
/// partially-updated table.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    slots: Vec<PluginSlot>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot. Called by the loader while assembling a fresh table.
    pub fn install(&mut self, id: impl Into<String>, plugin: Option<Plugin>) {
        self.slots.push(PluginSlot {
            id: id.into(),
            plugin,
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[PluginSlot] {
        &self.slots
    }

    /// The plugin at a slot position, if occupied.
    pub fn get(&self, index: usize) -> Option<&Plugin> {
        self.slots.get(index).and_then(|s| s.plugin.as_ref())
    }

    /// The plugin bound to a tab type, if the type is a plugin kind and its
    /// slot is occupied.
    pub fn plugin_for(&self, tab_type: TabType) -> Option<&Plugin> {
        self.get(tab_type.plugin_index()?)
    }

    /// The controller factory for a tab type. Total: absent slots and
    /// non-plugin types resolve to the no-op fallback.
    pub fn controller_factory(&self, tab_type: TabType) -> ControllerFactory {
        match self.plugin_for(tab_type) {
            Some(plugin) => plugin.controller.clone(),
            None => Arc::new(|| Box::new(NoopController) as Box<dyn TabController>),
        }
    }

    /// The renderer factory for a tab type, with the same fallback rule as
    /// [`controller_factory`](Self::controller_factory).
    pub fn renderer_factory(&self, tab_type: TabType) -> RendererFactory {
        match self.plugin_for(tab_type) {
            Some(plugin) => plugin.renderer.clone(),
            None => Arc::new(|| Box::new(NoopRenderer::new()) as Box<dyn TabRenderer>),
        }
    }

    pub fn is_plugin_defined(&self, tab_type: TabType) -> bool {
        self.plugin_for(tab_type).is_some()
    }

    /// Tab types whose slots are occupied, in positional order.
    pub fn defined_plugin_types(&self) -> Vec<TabType> {
        (0..PLUGIN_SLOT_COUNT)
            .filter(|i| self.get(*i).is_some())
            .filter_map(TabType::plugin)
            .collect()
    }
}
