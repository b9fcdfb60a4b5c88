use serde::Serialize;

use crate::error::{Result, UpkeepError};
use crate::evidence::{EvidenceBundle, EvidenceItem};
use crate::scoring::ComplianceScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            other => Err(UpkeepError::Validation(format!(
                "unknown export format \"{other}\" (expected json, csv, or html)"
            ))),
        }
    }
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    score: &'a ComplianceScore,
    evidence: &'a EvidenceBundle,
}

/// Render a full evidence bundle plus its score for external consumption.
/// Export mode is the one place the unclassified bucket always surfaces.
pub fn export_evidence(
    bundle: &EvidenceBundle,
    score: &ComplianceScore,
    format: ExportFormat,
) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let doc = ExportDocument {
                score,
                evidence: bundle,
            };
            Ok(serde_json::to_string_pretty(&doc)?)
        }
        ExportFormat::Csv => Ok(render_csv(bundle)),
        ExportFormat::Html => Ok(render_html(bundle, score)),
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row(sub_requirement: &str, item: &EvidenceItem) -> String {
    [
        sub_requirement,
        item.kind.as_str(),
        &item.id,
        &item.equipment_id,
        &item.date.to_rfc3339(),
        &item.summary,
    ]
    .iter()
    .map(|f| csv_escape(f))
    .collect::<Vec<_>>()
    .join(",")
}

fn render_csv(bundle: &EvidenceBundle) -> String {
    let mut out = String::from("sub_requirement,kind,id,equipment_id,date,summary\n");
    for bucket in &bundle.buckets {
        for item in &bucket.items {
            out.push_str(&csv_row(&bucket.sub_requirement.id, item));
            out.push('\n');
        }
    }
    for item in &bundle.unclassified {
        out.push_str(&csv_row("(unclassified)", item));
        out.push('\n');
    }
    out
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_html(bundle: &EvidenceBundle, score: &ComplianceScore) -> String {
    let mut out = String::new();
    out.push_str("<html><body>\n");
    out.push_str(&format!(
        "<h1>Audit element: {}</h1>\n",
        html_escape(&bundle.element_id)
    ));
    out.push_str(&format!("<p>Overall score: {:.1}</p>\n", score.overall));

    out.push_str("<h2>Sub-requirements</h2>\n<table>\n");
    out.push_str("<tr><th>Sub-requirement</th><th>Score</th><th>Evidence</th></tr>\n");
    for s in &score.sub_scores {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td><td>{} of {}</td></tr>\n",
            html_escape(&s.name),
            s.score,
            s.evidence_count,
            s.required_count
        ));
    }
    out.push_str("</table>\n");

    if !score.gaps.is_empty() {
        out.push_str("<h2>Gaps</h2>\n<ul>\n");
        for gap in &score.gaps {
            out.push_str(&format!(
                "<li>{}: {}</li>\n",
                html_escape(&gap.sub_requirement_id),
                html_escape(&gap.missing)
            ));
        }
        out.push_str("</ul>\n");
    }

    out.push_str("<h2>Evidence</h2>\n<table>\n");
    out.push_str("<tr><th>Sub-requirement</th><th>Kind</th><th>Date</th><th>Summary</th></tr>\n");
    for bucket in &bundle.buckets {
        for item in &bucket.items {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&bucket.sub_requirement.id),
                item.kind.as_str(),
                item.date.to_rfc3339(),
                html_escape(&item.summary)
            ));
        }
    }
    for item in &bundle.unclassified {
        out.push_str(&format!(
            "<tr><td>(unclassified)</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            item.kind.as_str(),
            item.date.to_rfc3339(),
            html_escape(&item.summary)
        ));
    }
    out.push_str("</table>\n</body></html>\n");
    out
}
