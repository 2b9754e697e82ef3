//! Named per-style parameter overrides loaded from a TOML file.
//!
//! ```toml
//! [styles.mosaic]
//! threshold = 80
//! dilation_radius = 4
//! ```

use anyhow::{Context, Result, bail};
use descreen::PostprocessConfig;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverride {
    pub apply_filter: Option<bool>,
    pub threshold: Option<f64>,
    pub dilation_radius: Option<u32>,
    pub middle_ratio: Option<u32>,
    pub target_length: Option<f64>,
    pub contrast_factor: Option<f64>,
}

impl StyleOverride {
    /// Replace every field of `config` that this override sets.
    pub fn merge(&self, mut config: PostprocessConfig) -> PostprocessConfig {
        if let Some(v) = self.apply_filter {
            config = config.with_apply_filter(v);
        }
        if let Some(v) = self.threshold {
            config = config.with_threshold(v);
        }
        if let Some(v) = self.dilation_radius {
            config = config.with_dilation_radius(v);
        }
        if let Some(v) = self.middle_ratio {
            config = config.with_middle_ratio(v);
        }
        if let Some(v) = self.target_length {
            config = config.with_target_length(v);
        }
        if let Some(v) = self.contrast_factor {
            config = config.with_contrast_factor(v);
        }

        config
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct StyleBook {
    #[serde(default)]
    pub styles: BTreeMap<String, StyleOverride>,
}

impl StyleBook {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str::<StyleBook>(text).with_context(|| "parse styles failed".to_string())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read styles file {} failed", path.display()))?;

        Self::parse(&text).with_context(|| format!("invalid styles file {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Result<&StyleOverride> {
        match self.styles.get(name) {
            Some(style) => Ok(style),
            None => bail!(
                "unknown style `{name}`, available: [{}]",
                self.styles.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}
