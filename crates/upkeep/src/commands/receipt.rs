use anyhow::Result;
use chrono::Utc;

use crate::cli::ReceiptArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::storage;
use upkeep_core::types::Receipt;

pub fn run(ctx: &RuntimeContext, args: &ReceiptArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;
    let date = match &args.date {
        Some(value) => parse_timestamp(value)?,
        None => Utc::now(),
    };

    let mut receipt = Receipt {
        id: None,
        equipment_id: unit.id.clone().unwrap_or_default(),
        maintenance_record_id: args.record.clone(),
        vendor: args.vendor.clone(),
        category: parse_cost_category(&args.category)?,
        amount: args.amount,
        date,
    };
    storage::append_row(&paths.receipts, &mut receipt)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "receipt",
            "receipt": receipt,
        }));
    } else {
        print_success(&format!(
            "Logged {} receipt from {} ({:.2}) for {}.",
            receipt.category, receipt.vendor, receipt.amount, unit.code
        ));
    }

    Ok(())
}
