mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    let result = match &cli.command {
        Commands::Init => commands::init::run(&ctx),
        Commands::Add(args) => commands::add::run(&ctx, args),
        Commands::Equipment(args) => commands::equipment::run(&ctx, args),
        Commands::Schedule(args) => commands::schedule::run(&ctx, args),
        Commands::Due(args) => commands::due::run(&ctx, args),
        Commands::Order(args) => commands::order::run(&ctx, args),
        Commands::Orders(args) => commands::orders::run(&ctx, args),
        Commands::Transition(args) => commands::transition::run(&ctx, args),
        Commands::Record(args) => commands::record::run(&ctx, args),
        Commands::Receipt(args) => commands::receipt::run(&ctx, args),
        Commands::Downtime(args) => commands::downtime::run(&ctx, args),
        Commands::Costs(args) => commands::costs::run(&ctx, args),
        Commands::Availability(args) => commands::availability::run(&ctx, args),
        Commands::History(args) => commands::history::run(&ctx, args),
        Commands::Score(args) => commands::score::run(&ctx, args),
        Commands::Evidence(args) => commands::evidence::run(&ctx, args),
        Commands::Export(args) => commands::export::run(&ctx, args),
    };

    if let Err(e) = result {
        if ctx.json {
            output::output_json_error("unknown", &format!("{e:#}"));
        } else {
            output::print_error(&format!("Error: {e:#}"));
        }
        std::process::exit(1);
    }
}
