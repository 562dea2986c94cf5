//! Tab contract and registry for Logscope.
//!
//! Every tab, built-in or plugin-provided, is a controller/renderer pair:
//! the controller derives an opaque per-frame command from the current
//! selection and log data via [`HostApi`], and the renderer paints it. Tab
//! kinds are the closed [`TabType`] enumeration; the five plugin kinds
//! resolve through the host-owned [`PluginRegistry`].

pub mod controller;
pub mod host;
pub mod plugin;
pub mod renderer;
pub mod source_list;
pub mod tab_type;

pub use controller::{NoopController, TabController};
pub use host::HostApi;
pub use plugin::{
    ControllerFactory, Plugin, PluginRegistry, PluginSlot, RendererFactory, PLUGIN_SLOT_COUNT,
};
pub use renderer::{NoopRenderer, TabRenderer};
pub use source_list::{
    create_source_list, SourceList, SourceListConfig, SourceListItemState, SourceListOptionConfig,
    SourceListOptionValueConfig, SourceListState, SourceListTypeConfig, SourceListTypeMemory,
};
pub use tab_type::{
    all_tab_types_with_plugins, default_tab_title, tab_accelerator, tab_icon, TabType,
    ALL_TAB_TYPES, LITE_COMPATIBLE_TABS,
};
