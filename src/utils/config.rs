use crate::core::{
    AnchorId, AnchorLayout, MapBounds, Point2, SequencePolicy, LAB_MAP_HEIGHT, LAB_MAP_WIDTH,
};
use crate::utils::logging::LogLevel;
use crate::validation::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine configuration, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Valid output rectangle (m)
    pub map: MapBounds,
    /// Fixed anchor positions
    pub anchors: Vec<AnchorConfig>,
    /// Treatment of out-of-order reports
    #[serde(default)]
    pub sequence_policy: SequencePolicy,
    /// Fail a whole payload when any entry is malformed
    #[serde(default)]
    pub strict_payloads: bool,
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One anchor's fixed map position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub id: AnchorId,
    /// X coordinate (m)
    pub x: f64,
    /// Y coordinate (m)
    pub y: f64,
}

impl AnchorConfig {
    pub fn new(id: impl Into<AnchorId>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }
}

impl Default for EngineConfig {
    /// The 11.55 m x 5.85 m lab with four wall anchors
    fn default() -> Self {
        Self {
            map: MapBounds::new(LAB_MAP_WIDTH, LAB_MAP_HEIGHT),
            anchors: vec![
                AnchorConfig::new("ANC3", 0.5, 1.40),
                AnchorConfig::new("ANC4", 6.3, 1.7),
                AnchorConfig::new("ANC5", 5.85, 4.05),
                AnchorConfig::new("ANC6", 9.9, 3.62),
            ],
            sequence_policy: SequencePolicy::default(),
            strict_payloads: false,
            log_level: LogLevel::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_json_pretty()?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.map.is_valid() {
            return Err(ConfigError::InvalidMapSize {
                width: self.map.width,
                height: self.map.height,
            });
        }
        self.anchor_layout().map(|_| ())
    }

    pub fn anchor_layout(&self) -> Result<AnchorLayout, ConfigError> {
        AnchorLayout::from_positions(
            self.anchors
                .iter()
                .map(|anchor| (anchor.id.clone(), Point2::new(anchor.x, anchor.y))),
        )
    }
}
