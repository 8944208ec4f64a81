//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};

use skillcast_io::CatalogConfig;
use skillcast_skill::{NetcdfSource, SkillConfig, SkillService};

use crate::config::{DataToml, SkillToml, SkillcastConfig};

/// Builds a [`CatalogConfig`] from the TOML data configuration.
pub fn build_catalog_config(data: &DataToml) -> Result<CatalogConfig> {
    let cfg = CatalogConfig::default()
        .with_dir(&data.dir)
        .with_reference_file(&data.reference_file)
        .with_hindcast_prefix(&data.hindcast_prefix)
        .with_hindcast_suffix(&data.hindcast_suffix)
        .with_operational_prefix(&data.operational_prefix);
    cfg.validate().context("invalid [data] configuration")?;
    Ok(cfg)
}

/// Builds a [`SkillConfig`] from the TOML skill configuration.
pub fn build_skill_config(skill: &SkillToml) -> Result<SkillConfig> {
    let cfg = SkillConfig::default()
        .with_min_pairs(skill.min_pairs)
        .with_high_confidence(skill.high_confidence)
        .with_medium_confidence(skill.medium_confidence);
    cfg.validate().context("invalid [skill] configuration")?;
    Ok(cfg)
}

/// Builds a [`NetcdfSource`] including any model-specific variable names.
pub fn build_source(data: &DataToml) -> Result<NetcdfSource> {
    let source = data.native_variables.iter().fold(
        NetcdfSource::new(build_catalog_config(data)?),
        |source, (model, variable)| source.with_native_variable(model, variable),
    );
    Ok(source)
}

/// Builds the service every command runs against.
pub fn build_service(config: &SkillcastConfig) -> Result<SkillService<NetcdfSource>> {
    let source = build_source(&config.data)?;
    let skill = build_skill_config(&config.skill)?;
    SkillService::new(source, skill).context("failed to start skill service")
}
