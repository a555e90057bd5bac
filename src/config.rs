//! Crate configuration
//!
//! Every section has conservative defaults that match the website's
//! conventions, so an empty JSON object is a valid configuration.

use crate::image::{ImageUrlBuilder, DEFAULT_BASE_PATH};
use crate::{Error, Result, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where optimized image variants are served from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub base_path: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

impl ImageConfig {
    pub fn url_builder(&self) -> ImageUrlBuilder {
        ImageUrlBuilder::new(self.base_path.clone())
    }
}

/// DOM contract of the lazy-load controller
///
/// ```
/// let cfg = luxeimg::LazyLoadConfig::default();
/// assert_eq!(cfg.pending_attribute, "data-src");
/// assert_eq!(cfg.marker_class, "lazy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyLoadConfig {
    /// Attribute holding the deferred source
    pub pending_attribute: String,
    /// Class removed once the image has been given its source
    pub marker_class: String,
    /// Pixels the observation region extends past each viewport edge
    pub root_margin: u32,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            pending_attribute: "data-src".to_string(),
            marker_class: "lazy".to_string(),
            root_margin: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub image: ImageConfig,
    pub lazy: LazyLoadConfig,
    pub viewport: Viewport,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lazy.pending_attribute.trim().is_empty() {
            return Err(Error::ConfigError("lazy.pending_attribute must not be empty".into()));
        }
        if self.lazy.pending_attribute == "src" {
            return Err(Error::ConfigError("lazy.pending_attribute cannot be `src`".into()));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError("viewport dimensions must be non-zero".into()));
        }
        Ok(())
    }
}
