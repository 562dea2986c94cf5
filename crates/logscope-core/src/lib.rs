//! Shared types, config, errors, and log model for Logscope.

pub mod config;
pub mod error;
pub mod log;
pub mod selection;
pub mod types;

pub use config::{Config, Preferences};
pub use error::{LogscopeError, Result};
pub use log::Log;
pub use selection::{Selection, SelectionMode};
pub use types::{LogValue, LogValueSet, LoggableType, LogscopeAssets};
