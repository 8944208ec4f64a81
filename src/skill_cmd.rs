//! Skill command: hindcast skill matrix for one start month.

use anyhow::Result;
use tracing::{info, info_span};

use crate::cli::SkillArgs;
use crate::config::SkillcastConfig;
use crate::{convert, report};

/// Compute and emit the skill matrix at the requested point.
pub fn run(args: SkillArgs, config: &SkillcastConfig) -> Result<()> {
    let _cmd = info_span!("skill").entered();
    let service = convert::build_service(config)?;
    let point = &args.point;

    info!(lat = point.lat, lon = point.lon, month = %args.month, "computing skill matrix");
    let result = service.skill_matrix(point.lat, point.lon, args.month);
    if let Ok(matrix) = &result {
        info!(n_models = matrix.acc.len(), base_month = matrix.base_month, "skill matrix ready");
    }
    report::emit(result, point.output.as_deref(), "skill matrix")
}
