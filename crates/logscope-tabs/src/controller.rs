//! Tab controller contract.

use serde_json::Value;

use crate::host::HostApi;

/// A controller for a single tab. Updates user selections and produces
/// commands to be consumed by the paired renderer.
///
/// Lifecycle: constructed by a factory, then driven from the UI thread with
/// repeated `refresh`/`command` cycles until the host discards the instance.
/// There is no explicit teardown hook.
pub trait TabController: Send {
    /// Returns the current state for saving. Must be JSON-serializable so
    /// layouts can round-trip through disk.
    fn save_state(&self) -> Value;

    /// Restores to the provided state. Must tolerate `null` or missing
    /// fields and leave defaults in place.
    fn restore_state(&mut self, state: Value);

    /// Refresh based on new log data.
    fn refresh(&mut self, host: &HostApi);

    /// Notify that the set of assets was updated.
    fn new_assets(&mut self, host: &HostApi) {
        let _ = host;
    }

    /// The field-key prefixes this tab currently needs. Live sources narrow
    /// what they fetch to keys matching these prefixes.
    fn active_fields(&self) -> Vec<String>;

    /// Whether to display the timeline under this tab.
    fn show_timeline(&self) -> bool {
        true
    }

    /// Compute this frame's command from the current selection and log data.
    /// Must return a benign empty-state value, not fail, when no time is
    /// selected.
    fn command(&mut self, host: &HostApi) -> Value;
}

/// Fallback controller used when a plugin slot is absent.
#[derive(Debug, Default)]
pub struct NoopController;

impl TabController for NoopController {
    fn save_state(&self) -> Value {
        Value::Null
    }

    fn restore_state(&mut self, _state: Value) {}

    fn refresh(&mut self, _host: &HostApi) {}

    fn active_fields(&self) -> Vec<String> {
        Vec::new()
    }

    fn command(&mut self, _host: &HostApi) -> Value {
        Value::Null
    }
}
