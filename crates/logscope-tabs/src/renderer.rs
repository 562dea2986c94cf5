//! Tab renderer contract.

use serde_json::Value;

/// A renderer for a single tab. Receives one command per frame from its
/// paired controller and paints it. The command payload is private to the
/// controller/renderer pair; the host only forwards it.
pub trait TabRenderer: Send {
    /// Returns display-only preferences for saving.
    fn save_state(&self) -> Value;

    /// Restores display-only preferences.
    fn restore_state(&mut self, state: Value);

    /// The desired window aspect ratio for satellite windows, or `None` for
    /// no constraint.
    fn aspect_ratio(&self) -> Option<f64> {
        None
    }

    /// Called once per frame with the command from the controller. An absent
    /// or empty command must produce a neutral placeholder, never an error.
    fn render(&mut self, command: &Value);
}

/// Fallback renderer used when a plugin slot is absent. Always shows the
/// "No data" placeholder.
#[derive(Debug, Default)]
pub struct NoopRenderer {
    status: String,
}

impl NoopRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text currently displayed, for host status queries.
    pub fn status(&self) -> &str {
        &self.status
    }
}

impl TabRenderer for NoopRenderer {
    fn save_state(&self) -> Value {
        Value::Null
    }

    fn restore_state(&mut self, _state: Value) {}

    fn render(&mut self, _command: &Value) {
        self.status = "No data".to_string();
    }
}
