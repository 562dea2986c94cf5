//! Plugin module import.
//!
//! A plugin bundle's entry file is a `plugin.json` manifest naming the
//! bundle's native library and its constructor symbols. The production
//! importer fetches the manifest through the plugin file server (imports are
//! URL-based, like the rest of the host's module loading) and opens the
//! library from the registered directory. The [`ModuleImporter`] trait is
//! the seam the loader is tested through.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use libloading::Library;
use serde::{Deserialize, Serialize};
use tracing::error;

use logscope_core::error::LogscopeError;
use logscope_tabs::{
    ControllerFactory, NoopController, NoopRenderer, Plugin, RendererFactory, TabController,
    TabRenderer,
};

/// File name of a bundle's entry manifest.
pub const PLUGIN_ENTRY_FILE: &str = "plugin.json";

/// Manifest served at a bundle's entry path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    /// Display name of the plugin.
    #[serde(default)]
    pub title: String,
    /// Icon for the plugin (emoji or text).
    #[serde(default)]
    pub icon: String,
    /// File name of the bundle's native library.
    #[serde(default)]
    pub library: String,
    /// Controller constructor symbol exported by the library.
    #[serde(default)]
    pub controller: String,
    /// Renderer constructor symbol exported by the library.
    #[serde(default)]
    pub renderer: String,
}

impl PluginManifest {
    /// Shape validation: every field must be present and non-empty.
    pub fn validate(&self) -> Result<(), LogscopeError> {
        let missing = [
            ("title", &self.title),
            ("icon", &self.icon),
            ("library", &self.library),
            ("controller", &self.controller),
            ("renderer", &self.renderer),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty());
        if let Some((field, _)) = missing {
            return Err(LogscopeError::Config(format!(
                "Plugin manifest missing required field: {field}"
            )));
        }
        Ok(())
    }
}

/// Performs the dynamic import for one plugin slot.
#[async_trait]
pub trait ModuleImporter: Send + Sync {
    /// Import the module at `url`, backed by the registered `directory`.
    /// Returns a validated plugin or an error the loader isolates to the
    /// slot.
    async fn import(&self, url: &str, directory: &Path) -> anyhow::Result<Plugin>;
}

/// Production importer: manifest over loopback HTTP, factories from the
/// bundle's native library.
pub struct HttpModuleImporter {
    client: reqwest::Client,
}

impl Default for HttpModuleImporter {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl HttpModuleImporter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModuleImporter for HttpModuleImporter {
    async fn import(&self, url: &str, directory: &Path) -> anyhow::Result<Plugin> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LogscopeError::Transport(format!("Plugin fetch failed: {e}")))?;
        if !response.status().is_success() {
            return Err(LogscopeError::Transport(format!(
                "Plugin fetch failed: HTTP {}",
                response.status()
            ))
            .into());
        }
        let manifest: PluginManifest = response
            .json()
            .await
            .map_err(|e| LogscopeError::Config(format!("Invalid plugin manifest: {e}")))?;
        manifest.validate()?;

        let module = NativeModule::open(directory.join(&manifest.library), &manifest)?;
        Ok(Plugin {
            title: manifest.title,
            icon: manifest.icon,
            controller: module.controller_factory(),
            renderer: module.renderer_factory(),
        })
    }
}

/// Constructor signatures exported by plugin libraries. The returned pointer
/// is owned by the caller.
type ControllerCreate = unsafe fn() -> *mut dyn TabController;
type RendererCreate = unsafe fn() -> *mut dyn TabRenderer;

/// An opened plugin library with its constructor symbols validated.
///
/// The `Library` stays alive inside the factories, so constructed instances
/// never outlive their code.
struct NativeModule {
    library: Arc<Library>,
    controller_symbol: Vec<u8>,
    renderer_symbol: Vec<u8>,
}

impl NativeModule {
    fn open(path: PathBuf, manifest: &PluginManifest) -> anyhow::Result<Self> {
        // Safety: the library is an opaque plugin bundle; the host trusts
        // locally-installed plugins and does not sandbox their execution.
        let library = unsafe {
            Library::new(&path).map_err(|e| {
                LogscopeError::Config(format!(
                    "Cannot open plugin library {}: {e}",
                    path.display()
                ))
            })?
        };

        let controller_symbol = manifest.controller.as_bytes().to_vec();
        let renderer_symbol = manifest.renderer.as_bytes().to_vec();

        // Resolve both constructors eagerly so shape validation fails at
        // load time, not on first use
        unsafe {
            library
                .get::<ControllerCreate>(&controller_symbol)
                .map_err(|e| {
                    LogscopeError::Config(format!(
                        "Plugin controller symbol '{}' not found: {e}",
                        manifest.controller
                    ))
                })?;
            library
                .get::<RendererCreate>(&renderer_symbol)
                .map_err(|e| {
                    LogscopeError::Config(format!(
                        "Plugin renderer symbol '{}' not found: {e}",
                        manifest.renderer
                    ))
                })?;
        }

        Ok(Self {
            library: Arc::new(library),
            controller_symbol,
            renderer_symbol,
        })
    }

    fn controller_factory(&self) -> ControllerFactory {
        let library = self.library.clone();
        let symbol = self.controller_symbol.clone();
        Arc::new(move || -> Box<dyn TabController> {
            // Safety: the symbol was resolved during open() and the library
            // is kept alive by this closure. A constructor returning null is
            // treated as a failed plugin and degraded to the no-op fallback.
            unsafe {
                match library.get::<ControllerCreate>(&symbol) {
                    Ok(create) => {
                        let ptr = create();
                        if ptr.is_null() {
                            error!("Plugin controller constructor returned null");
                            Box::new(NoopController)
                        } else {
                            Box::from_raw(ptr)
                        }
                    }
                    Err(e) => {
                        error!(%e, "Plugin controller symbol lookup failed");
                        Box::new(NoopController)
                    }
                }
            }
        })
    }

    fn renderer_factory(&self) -> RendererFactory {
        let library = self.library.clone();
        let symbol = self.renderer_symbol.clone();
        Arc::new(move || -> Box<dyn TabRenderer> {
            // Safety: same contract as the controller factory
            unsafe {
                match library.get::<RendererCreate>(&symbol) {
                    Ok(create) => {
                        let ptr = create();
                        if ptr.is_null() {
                            error!("Plugin renderer constructor returned null");
                            Box::new(NoopRenderer::new())
                        } else {
                            Box::from_raw(ptr)
                        }
                    }
                    Err(e) => {
                        error!(%e, "Plugin renderer symbol lookup failed");
                        Box::new(NoopRenderer::new())
                    }
                }
            }
        })
    }
}
