//! Plugin loading for Logscope.
//!
//! Three pieces cooperate to bring externally-authored tab plugins into the
//! host: the loopback [`PluginServer`] exposes registered bundle directories
//! over HTTP, the [`PluginLoader`] imports each bundle's entry module and
//! publishes the slot table, and the [`dialog`] protocol lets the settings
//! window manage the directory list. Failures stay inside their slot; a
//! broken plugin never takes down the host or its neighbors.

pub mod dialog;
pub mod import;
pub mod loader;
pub mod server;

pub use dialog::{DialogEffect, DialogRequest, DialogUpdate, PluginInfo, PluginSettings};
pub use import::{HttpModuleImporter, ModuleImporter, PluginManifest, PLUGIN_ENTRY_FILE};
pub use loader::{load_plugins, plugin_entry_url, PluginLoader};
pub use server::{PluginServer, PLUGIN_SERVER_PORT};
