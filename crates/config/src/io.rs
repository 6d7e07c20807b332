//! Config files on disk, JSON or YAML chosen by extension.

use std::path::Path;

use tracing::debug;

use crate::{ConfigError, SimConfig};

/// On-disk encoding of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// `.yaml` and `.yml` are YAML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl SimConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let format = ConfigFormat::from_path(path);
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&text)?,
            ConfigFormat::Yaml => serde_yaml::from_str(&text)?,
        };
        config.validate()?;
        debug!(
            path = %path.display(),
            ?format,
            robots = config.robots.len(),
            boxes = config.world.boxes.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Write the config, pretty-printed, in the format implied by the path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path);
        let text = match format {
            ConfigFormat::Json => self.to_json_pretty()?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        };
        std::fs::write(path, text)?;
        debug!(path = %path.display(), ?format, "saved config");
        Ok(())
    }
}
