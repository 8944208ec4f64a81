//! Inventory command: what the data directory holds.

use anyhow::Result;
use tracing::{info, info_span, warn};

use crate::cli::InventoryArgs;
use crate::config::SkillcastConfig;
use crate::{convert, report};

/// Scan the data directory and emit the inventory.
pub fn run(args: InventoryArgs, config: &SkillcastConfig) -> Result<()> {
    let _cmd = info_span!("inventory").entered();
    let service = convert::build_service(config)?;

    let result = service.inventory();
    if let Ok(inventory) = &result {
        if !inventory.reference_present {
            warn!(path = %inventory.reference.display(), "observation reference missing");
        }
        info!(
            n_hindcasts = inventory.hindcasts.len(),
            n_operational = inventory.operational.len(),
            "inventory scanned"
        );
    }
    report::emit(result, args.output.as_deref(), "inventory")
}
