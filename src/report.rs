//! Writing command results as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use skillcast_skill::{ErrorReport, SkillError, to_json};

/// Write `output` as pretty JSON to `path`, or to stdout when `None`.
pub fn write_json<T: Serialize>(output: &T, path: Option<&Path>) -> Result<()> {
    let json = to_json(output).context("failed to serialize output")?;
    match path {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Emit a service result: the payload on success, `{"error": ...}` on
/// failure. A failure is still returned so the process exits non-zero.
pub fn emit<T: Serialize>(
    result: Result<T, SkillError>,
    path: Option<&Path>,
    what: &str,
) -> Result<()> {
    match result {
        Ok(output) => write_json(&output, path),
        Err(e) => {
            write_json(&ErrorReport::from(&e), path)?;
            Err(e).with_context(|| format!("{what} failed"))
        }
    }
}
