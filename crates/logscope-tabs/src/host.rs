//! Host API façade.
//!
//! Controllers reach host state (log, selection, preferences, assets,
//! platform info) through this surface instead of host internals. One value
//! is shared by every tab; interior locks keep reads cheap on the UI thread.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use logscope_core::{Log, LoggableType, LogscopeAssets, Preferences, Selection};

/// Stable, explicit surface over host globals.
pub struct HostApi {
    log: Arc<RwLock<Log>>,
    selection: Arc<RwLock<Selection>>,
    preferences: Arc<RwLock<Preferences>>,
    assets: Arc<RwLock<LogscopeAssets>>,
    platform: String,
    app_version: String,
}

impl Default for HostApi {
    fn default() -> Self {
        Self::new(std::env::consts::OS, env!("CARGO_PKG_VERSION"))
    }
}

impl HostApi {
    pub fn new(platform: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            log: Arc::new(RwLock::new(Log::new())),
            selection: Arc::new(RwLock::new(Selection::new())),
            preferences: Arc::new(RwLock::new(Preferences::default())),
            assets: Arc::new(RwLock::new(LogscopeAssets::default())),
            platform: platform.into(),
            app_version: app_version.into(),
        }
    }

    /// Read access to the log store.
    pub fn log(&self) -> RwLockReadGuard<'_, Log> {
        self.log.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Write access to the log store. Reserved for the host's data sources;
    /// tabs only read.
    pub fn log_mut(&self) -> RwLockWriteGuard<'_, Log> {
        self.log.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn selection(&self) -> RwLockReadGuard<'_, Selection> {
        self.selection.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn selection_mut(&self) -> RwLockWriteGuard<'_, Selection> {
        self.selection.write().unwrap_or_else(|e| e.into_inner())
    }

    /// The timestamp tabs should render this frame, or `None` when nothing
    /// is selected.
    pub fn render_time(&self) -> Option<f64> {
        self.selection().render_time()
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_preferences(&self, preferences: Preferences) {
        *self.preferences.write().unwrap_or_else(|e| e.into_inner()) = preferences;
    }

    pub fn assets(&self) -> LogscopeAssets {
        self.assets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_assets(&self, assets: LogscopeAssets) {
        *self.assets.write().unwrap_or_else(|e| e.into_inner()) = assets;
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// One stable identity per controller instance; the log layer scopes its
    /// per-subscriber caching by it.
    pub fn create_uuid(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// The most recent sample of `key` at or before `timestamp` if present
    /// and of the expected type, else `default`. Never fails for a missing
    /// field.
    pub fn get_or_default(
        &self,
        key: &str,
        expected: LoggableType,
        timestamp: f64,
        default: Value,
        subscriber: Option<&str>,
    ) -> Value {
        self.log()
            .get_or_default(key, expected, timestamp, default, subscriber)
    }
}
