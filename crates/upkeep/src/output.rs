use owo_colors::OwoColorize;
use serde::Serialize;

use upkeep_core::scoring::EvidenceSummary;

/// Pretty-printed JSON envelope for `--json` consumers.
pub fn output_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("{}", format!("failed to serialize output: {e}").red());
        std::process::exit(1);
    });
    println!("{json}");
}

pub fn output_json_error(command: &str, error: &str) {
    output_json(&serde_json::json!({
        "success": false,
        "command": command,
        "error": error,
    }));
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green());
}

pub fn print_error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn print_warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Count table shared by the evidence command and summary-mode scoring.
pub fn print_evidence_counts(heading: &str, summary: &EvidenceSummary) {
    println!("Evidence for {heading}:");
    for count in &summary.counts {
        let latest = count
            .latest
            .map(|d| format!("  latest {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "  {:<28} {} of {}{latest}",
            count.name, count.evidence_count, count.required_count
        );
    }
    if summary.unclassified_count > 0 {
        print_warning(&format!(
            "  {} unclassified item(s).",
            summary.unclassified_count
        ));
    }
}
