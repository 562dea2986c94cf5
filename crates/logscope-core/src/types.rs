use serde::{Deserialize, Serialize};

/// A type of log data that can be stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggableType {
    Raw,
    Boolean,
    Number,
    String,
    BooleanArray,
    NumberArray,
    StringArray,
    #[default]
    Empty,
}

/// A single sample value stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogValue {
    Boolean(bool),
    Number(f64),
    String(String),
    BooleanArray(Vec<bool>),
    NumberArray(Vec<f64>),
    StringArray(Vec<String>),
    Raw(Vec<u8>),
}

impl LogValue {
    /// The loggable type this value belongs to.
    pub fn loggable_type(&self) -> LoggableType {
        match self {
            LogValue::Boolean(_) => LoggableType::Boolean,
            LogValue::Number(_) => LoggableType::Number,
            LogValue::String(_) => LoggableType::String,
            LogValue::BooleanArray(_) => LoggableType::BooleanArray,
            LogValue::NumberArray(_) => LoggableType::NumberArray,
            LogValue::StringArray(_) => LoggableType::StringArray,
            LogValue::Raw(_) => LoggableType::Raw,
        }
    }
}

/// A set of samples read from one field: parallel timestamp/value arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogValueSet {
    pub timestamps: Vec<f64>,
    pub values: Vec<LogValue>,
}

/// A single configurable asset (field image, robot model, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub name: String,
    pub path: String,
}

/// The full asset catalog shared with tabs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogscopeAssets {
    pub field2ds: Vec<AssetConfig>,
    pub field3ds: Vec<AssetConfig>,
    pub robots: Vec<AssetConfig>,
    pub joysticks: Vec<AssetConfig>,
}

// Geometry aliases carried by the plugin API.

/// 2D translation in meters (x, y).
pub type Translation2d = [f64; 2];

/// 2D rotation in radians.
pub type Rotation2d = f64;

/// 3D translation in meters (x, y, z).
pub type Translation3d = [f64; 3];

/// 3D rotation as a quaternion (w, x, y, z).
pub type Rotation3d = [f64; 4];

/// 2D pose with translation and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2d {
    pub translation: Translation2d,
    pub rotation: Rotation2d,
}

/// 3D pose with translation and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose3d {
    pub translation: Translation3d,
    pub rotation: Rotation3d,
}
