use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level Skillcast configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SkillcastConfig {
    /// Dataset directory and file naming.
    #[serde(default)]
    pub data: DataToml,

    /// Skill evaluation settings.
    #[serde(default)]
    pub skill: SkillToml,
}

impl SkillcastConfig {
    /// Load `path`, falling back to the defaults when the file does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataToml {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_reference_file")]
    pub reference_file: String,
    #[serde(default = "default_hindcast_prefix")]
    pub hindcast_prefix: String,
    #[serde(default = "default_hindcast_suffix")]
    pub hindcast_suffix: String,
    #[serde(default = "default_operational_prefix")]
    pub operational_prefix: String,
    /// Model id -> precipitation variable name, for files using a
    /// non-standard name.
    #[serde(default)]
    pub native_variables: BTreeMap<String, String>,
}

impl Default for DataToml {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            reference_file: default_reference_file(),
            hindcast_prefix: default_hindcast_prefix(),
            hindcast_suffix: default_hindcast_suffix(),
            operational_prefix: default_operational_prefix(),
            native_variables: BTreeMap::new(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("data_bsas")
}
fn default_reference_file() -> String {
    "era5_obs_bsas_1993_2016.nc".to_string()
}
fn default_hindcast_prefix() -> String {
    "hc_".to_string()
}
fn default_hindcast_suffix() -> String {
    "_bsas.nc".to_string()
}
fn default_operational_prefix() -> String {
    "operational_".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillToml {
    #[serde(default = "default_min_pairs")]
    pub min_pairs: usize,
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,
    #[serde(default = "default_medium_confidence")]
    pub medium_confidence: f64,
}

impl Default for SkillToml {
    fn default() -> Self {
        Self {
            min_pairs: default_min_pairs(),
            high_confidence: default_high_confidence(),
            medium_confidence: default_medium_confidence(),
        }
    }
}

fn default_min_pairs() -> usize {
    11
}
fn default_high_confidence() -> f64 {
    0.5
}
fn default_medium_confidence() -> f64 {
    0.3
}
