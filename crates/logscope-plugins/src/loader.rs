//! Plugin loader — turns registered directories into populated slots.
//!
//! Each directory is imported through the file server URL for its slot
//! index. Failures never cross the slot boundary: a bad manifest, a missing
//! library, or a transport error leaves that one slot absent and the rest of
//! the load untouched.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use tracing::{debug, error, info, warn};

use logscope_tabs::{
    ControllerFactory, PluginRegistry, RendererFactory, TabType, PLUGIN_SLOT_COUNT,
};

use crate::import::{ModuleImporter, PLUGIN_ENTRY_FILE};

/// Entry URL for a slot index against the file server.
pub fn plugin_entry_url(port: u16, index: usize) -> String {
    // Literal IPv4 loopback, not `localhost`: the server binds 127.0.0.1 and
    // `localhost` may resolve to ::1

    format!("http://127.0.0.1:{port}/plugin/{index}/{PLUGIN_ENTRY_FILE}")
}

/// Import every directory into a fresh registry. Directories beyond the
/// addressable slot count are ignored.
pub async fn load_plugins(
    importer: &dyn ModuleImporter,
    directories: &[PathBuf],
    port: u16,
) -> PluginRegistry {
    if directories.len() > PLUGIN_SLOT_COUNT {
        warn!(
            count = directories.len(),
            limit = PLUGIN_SLOT_COUNT,
            "Ignoring plugin directories beyond slot capacity"
        );
    }
    info!(count = directories.len(), "Loading plugins");

    let mut registry = PluginRegistry::new();
    for (index, directory) in directories.iter().take(PLUGIN_SLOT_COUNT).enumerate() {
        let url = plugin_entry_url(port, index);
        debug!(index, url = %url, "Importing plugin");
        let plugin = match importer.import(&url, directory).await {
            Ok(plugin) => {
                info!(index, title = %plugin.title, "Plugin loaded");
                Some(plugin)
            }
            Err(e) => {
                error!(index, directory = %directory.display(), %e, "Failed to load plugin");
                None
            }
        };
        registry.install(directory.display().to_string(), plugin);
    }
    registry
}

/// Owns the published registry and republishes it wholesale on each load.
///
/// Consumers read through the lock, so a load in progress is never visible:
/// the table swaps from the old state to the fully-built new one in a single
/// write.
pub struct PluginLoader {
    importer: Box<dyn ModuleImporter>,
    port: u16,
    registry: RwLock<PluginRegistry>,
}

impl PluginLoader {
    pub fn new(importer: Box<dyn ModuleImporter>, port: u16) -> Self {
        Self {
            importer,
            port,
            registry: RwLock::new(PluginRegistry::new()),
        }
    }

    /// Load (or reload) plugins from `directories`, replacing the published
    /// table. Idempotent; per-slot failures stay in their slots.
    pub async fn load(&self, directories: &[impl AsRef<Path>]) {
        let directories: Vec<PathBuf> = directories
            .iter()
            .map(|d| d.as_ref().to_path_buf())
            .collect();
        let new_registry = load_plugins(self.importer.as_ref(), &directories, self.port).await;
        *self.registry.write().unwrap_or_else(|e| e.into_inner()) = new_registry;
    }

    /// Read access to the current registry.
    pub fn registry(&self) -> RwLockReadGuard<'_, PluginRegistry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    /// The controller factory bound to a tab type, or the no-op fallback.
    pub fn controller_factory(&self, tab_type: TabType) -> ControllerFactory {
        self.registry().controller_factory(tab_type)
    }

    /// The renderer factory bound to a tab type, or the no-op fallback.
    pub fn renderer_factory(&self, tab_type: TabType) -> RendererFactory {
        self.registry().renderer_factory(tab_type)
    }

    pub fn is_plugin_defined(&self, tab_type: TabType) -> bool {
        self.registry().is_plugin_defined(tab_type)
    }

    pub fn defined_plugin_types(&self) -> Vec<TabType> {
        self.registry().defined_plugin_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    use logscope_tabs::{all_tab_types_with_plugins, NoopController, NoopRenderer, Plugin};

    /// Importer that succeeds for every directory except those whose name
    /// starts with "bad".
    struct StubImporter;

    #[async_trait]
    impl ModuleImporter for StubImporter {
        async fn import(&self, _url: &str, directory: &Path) -> anyhow::Result<Plugin> {
            let name = directory
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if name.starts_with("bad") {
                anyhow::bail!("import failed for {name}");
            }
            Ok(Plugin {
                title: name,
                icon: "🧪".to_string(),
                controller: Arc::new(|| {
                    Box::new(NoopController) as Box<dyn logscope_tabs::TabController>
                }),
                renderer: Arc::new(|| {
                    Box::new(NoopRenderer::new()) as Box<dyn logscope_tabs::TabRenderer>
                }),
            })
        }
    }

    fn directories(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/plugins").join(n)).collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_one_slot() {
        let registry = load_plugins(
            &StubImporter,
            &directories(&["a", "b", "bad-c", "d", "e"]),
            56329,
        )
        .await;

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.defined_plugin_types().len(), 4);
        assert!(registry.is_plugin_defined(TabType::Plugin0));
        assert!(!registry.is_plugin_defined(TabType::Plugin2));
        assert!(registry.is_plugin_defined(TabType::Plugin4));
    }

    #[tokio::test]
    async fn test_directories_beyond_capacity_ignored() {
        let registry = load_plugins(
            &StubImporter,
            &directories(&["a", "b", "c", "d", "e", "f", "g"]),
            56329,
        )
        .await;
        assert_eq!(registry.len(), PLUGIN_SLOT_COUNT);
    }

    #[tokio::test]
    async fn test_fallback_factories_iff_undefined() {
        let loader = PluginLoader::new(Box::new(StubImporter), 56329);
        loader.load(&directories(&["a", "bad-b"])).await;

        for tab_type in [TabType::Plugin0, TabType::Plugin1, TabType::Plugin2] {
            let defined = loader.is_plugin_defined(tab_type);
            let mut controller = (loader.controller_factory(tab_type))();
            let host = logscope_tabs::HostApi::default();
            if defined {
                assert_eq!(tab_type, TabType::Plugin0);
            } else {
                // Fallback no-op produces the benign empty command
                assert_eq!(controller.command(&host), Value::Null);
            }
        }
    }

    #[tokio::test]
    async fn test_reload_replaces_table_wholesale() {
        let loader = PluginLoader::new(Box::new(StubImporter), 56329);
        loader.load(&directories(&["a", "b"])).await;
        assert_eq!(
            loader.defined_plugin_types(),
            vec![TabType::Plugin0, TabType::Plugin1]
        );

        loader.load(&directories(&["bad-a"])).await;
        assert!(loader.defined_plugin_types().is_empty());
        assert_eq!(loader.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_tab_menu_reflects_slot_occupancy() {
        let loader = PluginLoader::new(Box::new(StubImporter), 56329);
        loader.load(&directories(&["a", "bad-b", "c"])).await;

        let menu = all_tab_types_with_plugins(&loader.registry());
        // All 13 built-ins plus the two occupied plugin slots
        assert_eq!(menu.len(), 15);
        assert!(menu.contains(&TabType::Plugin0));
        assert!(!menu.contains(&TabType::Plugin1));
        assert!(menu.contains(&TabType::Plugin2));
        assert!(menu.contains(&TabType::LineGraph));
    }

    #[test]
    fn test_entry_url_shape() {
        assert_eq!(
            plugin_entry_url(56329, 2),
            "http://127.0.0.1:56329/plugin/2/plugin.json"
        );
    }
}
