use std::fs;
use std::path::{Path, PathBuf};

use scene::components::Rgb;
use scene::highlight::{PickerConfig, PointerPickers};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::mesher::{GeoSphereMesher, MesherConfig, MesherError};

/// Everything a globe view needs, loadable from one JSON document.
///
/// Every field is optional in the source; missing ones keep their defaults.
/// A partial picker section keeps the defaults of its own mode, so
/// `"click": { "base_color": "#00ff00" }` still highlights in yellow.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub mesher: MesherConfig,
    #[serde(deserialize_with = "hover_section")]
    pub hover: PickerConfig,
    #[serde(deserialize_with = "click_section")]
    pub click: PickerConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            mesher: MesherConfig::default(),
            hover: PickerConfig::hover(),
            click: PickerConfig::click(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(MesherError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid config JSON: {e}"),
            ConfigError::Invalid(e) => write!(f, "invalid mesher config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(e) => Some(e),
        }
    }
}

impl From<MesherError> for ConfigError {
    fn from(e: MesherError) -> Self {
        ConfigError::Invalid(e)
    }
}

impl GlobeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_json_str(&payload)?;
        debug!(path = %path.display(), ?config, "loaded globe config");
        Ok(config)
    }

    /// Parse and validate.
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mesher.validate()?;
        Ok(())
    }

    pub fn mesher(&self) -> Result<GeoSphereMesher, ConfigError> {
        Ok(GeoSphereMesher::new(self.mesher)?)
    }

    pub fn pickers(&self) -> PointerPickers {
        PointerPickers::new(self.hover, self.click)
    }
}

/// Picker section with every field optional, laid over a mode default.
#[derive(Deserialize)]
struct PickerSection {
    #[serde(default)]
    highlight_color: Option<Rgb>,
    #[serde(default)]
    base_color: Option<Rgb>,
}

impl PickerSection {
    fn over(self, defaults: PickerConfig) -> PickerConfig {
        PickerConfig {
            highlight_color: self.highlight_color.unwrap_or(defaults.highlight_color),
            base_color: self.base_color.or(defaults.base_color),
        }
    }
}

fn hover_section<'de, D: Deserializer<'de>>(d: D) -> Result<PickerConfig, D::Error> {
    Ok(PickerSection::deserialize(d)?.over(PickerConfig::hover()))
}

fn click_section<'de, D: Deserializer<'de>>(d: D) -> Result<PickerConfig, D::Error> {
    Ok(PickerSection::deserialize(d)?.over(PickerConfig::click()))
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GlobeConfig};
    use crate::mesher::{MesherConfig, MesherError};
    use scene::components::Rgb;
    use scene::highlight::PickerConfig;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = GlobeConfig::from_json_str("{}").expect("parse");
        assert_eq!(cfg, GlobeConfig::default());
        assert_eq!(cfg.mesher, MesherConfig::default());
        assert_eq!(cfg.mesher.color, Rgb::from_hex(0xff0000));
        assert_eq!(cfg.hover.highlight_color, Rgb::from_hex(0xffc0cb));
        assert_eq!(cfg.click.highlight_color, Rgb::from_hex(0xffff00));
    }

    #[test]
    fn partial_sections_keep_their_own_defaults() {
        let cfg = GlobeConfig::from_json_str(
            r##"{
                "mesher": { "rise": 0.02, "max_subdivision_depth": 5, "color": "#00ff00" },
                "click": { "base_color": "0x00ff00" }
            }"##,
        )
        .expect("parse");

        assert_eq!(cfg.mesher.rise, 0.02);
        assert_eq!(cfg.mesher.max_subdivision_depth, 5);
        assert_eq!(cfg.mesher.radius, 1.0);
        assert_eq!(cfg.mesher.color, Rgb::from_hex(0x00ff00));
        assert_eq!(cfg.hover, PickerConfig::hover());
        assert_eq!(cfg.click.highlight_color, Rgb::from_hex(0xffff00));
        assert_eq!(cfg.click.base_color, Some(Rgb::from_hex(0x00ff00)));
    }

    #[test]
    fn invalid_mesher_values_are_rejected() {
        let err = GlobeConfig::from_json_str(r#"{ "mesher": { "radius": -2.0 } }"#)
            .expect_err("negative radius");
        assert!(matches!(
            err,
            ConfigError::Invalid(MesherError::NonPositiveRadius(r)) if r == -2.0
        ));

        let err = GlobeConfig::from_json_str("{ not json").expect_err("bad json");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builds_mesher_and_pickers() {
        let cfg = GlobeConfig::default();
        let mesher = cfg.mesher().expect("valid");
        assert_eq!(mesher.config(), &cfg.mesher);

        let pickers = cfg.pickers();
        assert_eq!(pickers.hover.config(), &cfg.hover);
        assert_eq!(pickers.click.config(), &cfg.click);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GlobeConfig::load("/definitely/not/here.json").expect_err("missing");
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
