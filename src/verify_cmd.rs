//! Verify command: full verification table of every model.

use anyhow::Result;
use tracing::{info, info_span};

use crate::cli::PointArgs;
use crate::config::SkillcastConfig;
use crate::{convert, report};

/// Evaluate all start months and leads and emit the table.
pub fn run(args: PointArgs, config: &SkillcastConfig) -> Result<()> {
    let _cmd = info_span!("verify").entered();
    let service = convert::build_service(config)?;

    info!(lat = args.lat, lon = args.lon, "building verification table");
    let result = service.verification_table(args.lat, args.lon);
    report::emit(result, args.output.as_deref(), "verification")
}
