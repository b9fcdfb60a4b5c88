use anyhow::Result;

use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::config;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let already = config::get_config_path(&ctx.cwd).is_file();
    config::init_upkeep_dir(&ctx.cwd)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "init",
            "created": !already,
        }));
    } else if already {
        print_warning("An .upkeep directory already exists here.");
    } else {
        print_success("Initialized .upkeep directory.");
    }

    Ok(())
}
