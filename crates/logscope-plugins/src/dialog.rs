//! Management-dialog protocol.
//!
//! The plugin settings dialog runs in a separate browsing context and talks
//! to its opener over a message port. These are the serialized message
//! shapes plus the directory-list state the opener mutates on its behalf.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One registered plugin as shown in the dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub directory: String,
    pub name: Option<String>,
}

/// Dialog → opener messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum DialogRequest {
    GetPlugins,
    AddPlugin,
    RemovePlugin { index: usize },
    Reload,
    Close {
        #[serde(rename = "hasChanges")]
        has_changes: bool,
    },
}

/// Opener → dialog messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialogUpdate {
    PluginList { plugins: Vec<PluginInfo> },
    Focus {
        #[serde(rename = "isFocused")]
        is_focused: bool,
    },
}

/// Effect a dialog request asks of the opener. Directory selection and
/// window teardown stay with the host's UI chrome.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogEffect {
    /// Send the current plugin list back to the dialog.
    SendPluginList,
    /// Open a directory picker and add the chosen directory.
    PickDirectory,
    /// Reload all plugins from the current directory list.
    Reload,
    /// Close the dialog, reloading first when directories changed.
    Close { reload_needed: bool },
}

/// The ordered plugin directory list backing the dialog, the file server,
/// and the loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSettings {
    directories: Vec<PathBuf>,
}

impl PluginSettings {
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Register a directory at the end of the list. Duplicates are ignored.
    pub fn add(&mut self, directory: PathBuf) -> bool {
        if self.directories.contains(&directory) {
            warn!(directory = %directory.display(), "Plugin directory already registered");
            return false;
        }
        self.directories.push(directory);
        true
    }

    /// Remove the directory at `index`, keeping later slots shifted down.
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index < self.directories.len() {
            Some(self.directories.remove(index))
        } else {
            warn!(index, "Ignoring remove for out-of-range plugin index");
            None
        }
    }

    /// The list as shown in the dialog; the name is the final path
    /// component.
    pub fn infos(&self) -> Vec<PluginInfo> {
        self.directories
            .iter()
            .map(|d| PluginInfo {
                directory: d.display().to_string(),
                name: plugin_name(d),
            })
            .collect()
    }

    /// Apply a dialog request, returning the effect the opener must perform.
    pub fn handle(&mut self, request: &DialogRequest) -> DialogEffect {
        match request {
            DialogRequest::GetPlugins => DialogEffect::SendPluginList,
            DialogRequest::AddPlugin => DialogEffect::PickDirectory,
            DialogRequest::RemovePlugin { index } => {
                self.remove(*index);
                DialogEffect::SendPluginList
            }
            DialogRequest::Reload => DialogEffect::Reload,
            DialogRequest::Close { has_changes } => DialogEffect::Close {
                reload_needed: *has_changes,
            },
        }
    }
}

fn plugin_name(directory: &Path) -> Option<String> {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shapes() {
        let remove: DialogRequest =
            serde_json::from_value(json!({ "action": "remove-plugin", "index": 2 })).unwrap();
        assert_eq!(remove, DialogRequest::RemovePlugin { index: 2 });

        let close = serde_json::to_value(DialogRequest::Close { has_changes: true }).unwrap();
        assert_eq!(close, json!({ "action": "close", "hasChanges": true }));

        let get: DialogRequest = serde_json::from_value(json!({ "action": "get-plugins" })).unwrap();
        assert_eq!(get, DialogRequest::GetPlugins);
    }

    #[test]
    fn test_update_wire_shapes() {
        let focus = serde_json::to_value(DialogUpdate::Focus { is_focused: false }).unwrap();
        assert_eq!(focus, json!({ "isFocused": false }));

        let list = serde_json::to_value(DialogUpdate::PluginList {
            plugins: vec![PluginInfo {
                directory: "/opt/plugins/demo".to_string(),
                name: Some("demo".to_string()),
            }],
        })
        .unwrap();
        assert_eq!(list["plugins"][0]["directory"], "/opt/plugins/demo");
    }

    #[test]
    fn test_settings_add_remove() {
        let mut settings = PluginSettings::default();
        assert!(settings.add(PathBuf::from("/opt/plugins/a")));
        assert!(settings.add(PathBuf::from("/opt/plugins/b")));
        assert!(!settings.add(PathBuf::from("/opt/plugins/a")));

        assert_eq!(settings.remove(0), Some(PathBuf::from("/opt/plugins/a")));
        assert_eq!(settings.remove(5), None);
        assert_eq!(settings.directories(), &[PathBuf::from("/opt/plugins/b")]);

        let infos = settings.infos();
        assert_eq!(infos[0].name.as_deref(), Some("b"));
    }

    #[test]
    fn test_handle_requests() {
        let mut settings = PluginSettings::new(vec![
            PathBuf::from("/opt/plugins/a"),
            PathBuf::from("/opt/plugins/b"),
        ]);

        assert_eq!(
            settings.handle(&DialogRequest::GetPlugins),
            DialogEffect::SendPluginList
        );
        assert_eq!(
            settings.handle(&DialogRequest::RemovePlugin { index: 0 }),
            DialogEffect::SendPluginList
        );
        assert_eq!(settings.directories().len(), 1);
        assert_eq!(
            settings.handle(&DialogRequest::Close { has_changes: true }),
            DialogEffect::Close {
                reload_needed: true
            }
        );
    }
}
