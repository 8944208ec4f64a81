//! Forecast command: best model and calibrated forecast per lead.

use anyhow::Result;
use tracing::{info, info_span};

use crate::cli::ForecastArgs;
use crate::config::SkillcastConfig;
use crate::{convert, report};

/// Select the champion model per lead and emit the calibrated forecast.
pub fn run(args: ForecastArgs, config: &SkillcastConfig) -> Result<()> {
    let _cmd = info_span!("forecast").entered();
    let service = convert::build_service(config)?;
    let point = &args.point;

    info!(lat = point.lat, lon = point.lon, "selecting best models");
    let result = service.best_models(point.lat, point.lon, args.month);
    if let Ok(records) = &result {
        let calibrated = records.iter().filter(|r| r.forecast_mm.is_some()).count();
        info!(calibrated, leads = records.len(), "forecast ready");
    }
    report::emit(result, point.output.as_deref(), "forecast")
}
