use anyhow::{Result, bail};

use crate::cli::AddArgs;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::config;

pub fn run(ctx: &RuntimeContext, args: &AddArgs) -> Result<()> {
    config::ensure_upkeep_dir(&ctx.cwd)?;
    config::validate_tenant_name(&args.tenant)?;

    let mut cfg = config::read_config(&ctx.cwd)?;

    if cfg.tenants.contains(&args.tenant) {
        if ctx.json {
            output_json_error(
                "add",
                &format!("Tenant \"{}\" already exists.", args.tenant),
            );
            return Ok(());
        }
        bail!("Tenant \"{}\" already exists.", args.tenant);
    }

    cfg.tenants.push(args.tenant.clone());
    config::write_config(&cfg, &ctx.cwd)?;

    let tenant_dir = config::get_tenant_dir(&args.tenant, &ctx.cwd)?;
    std::fs::create_dir_all(&tenant_dir)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "add",
            "tenant": args.tenant,
        }));
    } else {
        print_success(&format!("Added tenant \"{}\".", args.tenant));
    }

    Ok(())
}
