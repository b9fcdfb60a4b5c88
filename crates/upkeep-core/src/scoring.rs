use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::{Element, EvidenceBucket, EvidenceBundle, EvidenceRule};
use crate::types::{ScoringPolicy, WeightingMode};

/// Cap applied to a sub-requirement whose regulatory schedules are all
/// overdue. The audit source never fixes this number; it is policy, so it
/// stays a named constant overridable via `ScoringPolicy.overdue_cap`.
pub const OVERDUE_REGULATORY_CAP: f64 = 50.0;

/// Sub-requirements scoring below this default land in the gaps list.
pub const DEFAULT_GAP_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    Quick,
    Full,
    Summary,
    Export,
}

impl ScoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Full => "full",
            Self::Summary => "summary",
            Self::Export => "export",
        }
    }
}

impl std::fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubScore {
    pub sub_requirement_id: String,
    pub name: String,
    pub score: f64,
    pub evidence_count: usize,
    pub required_count: usize,
    /// True when the overdue-regulatory cap was applied.
    pub capped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Gap {
    pub sub_requirement_id: String,
    pub score: f64,
    /// What is missing, phrased from the matching rule.
    pub missing: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceScore {
    pub element_id: String,
    pub mode: ScoreMode,
    pub overall: f64,
    /// Empty in quick mode; the headline number is all a dashboard needs.
    pub sub_scores: Vec<SubScore>,
    pub gaps: Vec<Gap>,
    pub generated_at: DateTime<Utc>,
}

/// Evidence counts without scoring, for the summary mode.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceSummary {
    pub element_id: String,
    pub counts: Vec<EvidenceCount>,
    pub unclassified_count: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceCount {
    pub sub_requirement_id: String,
    pub name: String,
    pub evidence_count: usize,
    pub required_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<DateTime<Utc>>,
}

fn score_bucket(bucket: &EvidenceBucket, policy: &ScoringPolicy) -> SubScore {
    let required = bucket.sub_requirement.required_count.max(1);
    let count = bucket.items.len();
    let mut score = (count as f64 / required as f64 * 100.0).min(100.0);

    // An overdue regulatory schedule caps the sub-requirement no matter how
    // much historical evidence exists; one current schedule lifts the cap.
    let mut capped = false;
    if bucket.sub_requirement.rule == EvidenceRule::RegulatorySchedule
        && !bucket.items.is_empty()
        && !bucket.has_current_schedule
        && score > policy.overdue_cap
    {
        score = policy.overdue_cap;
        capped = true;
    }

    SubScore {
        sub_requirement_id: bucket.sub_requirement.id.clone(),
        name: bucket.sub_requirement.name.clone(),
        score,
        evidence_count: count,
        required_count: bucket.sub_requirement.required_count,
        capped,
    }
}

fn overall(sub_scores: &[SubScore], weighting: WeightingMode) -> f64 {
    if sub_scores.is_empty() {
        return 0.0;
    }
    match weighting {
        WeightingMode::Equal => {
            sub_scores.iter().map(|s| s.score).sum::<f64>() / sub_scores.len() as f64
        }
        WeightingMode::Evidence => {
            // Weight each line by how much evidence backs it; an element
            // with no evidence at all degrades to the equal-weighted mean.
            let total_weight: usize = sub_scores.iter().map(|s| s.evidence_count).sum();
            if total_weight == 0 {
                return overall(sub_scores, WeightingMode::Equal);
            }
            sub_scores
                .iter()
                .map(|s| s.score * s.evidence_count as f64)
                .sum::<f64>()
                / total_weight as f64
        }
    }
}

/// What a score request yields. Summary mode reports evidence counts
/// without running the scorer; the other modes carry a full score.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScoreReport {
    Scored(ComplianceScore),
    Counts(EvidenceSummary),
}

/// Answer a score request in the given mode. Summary delegates to
/// [`evidence_summary`]; quick, full, and export run the scorer.
pub fn score_element(
    element: &Element,
    bundle: &EvidenceBundle,
    policy: &ScoringPolicy,
    mode: ScoreMode,
) -> ScoreReport {
    match mode {
        ScoreMode::Summary => ScoreReport::Counts(evidence_summary(bundle)),
        mode => ScoreReport::Scored(score_breakdown(element, bundle, policy, mode)),
    }
}

/// Score one audit element from its evidence bundle.
///
/// Computed fresh on every call from the bundle it is handed; there is no
/// cache to go stale, so a just-created maintenance record shows up in the
/// next score.
pub fn score_breakdown(
    element: &Element,
    bundle: &EvidenceBundle,
    policy: &ScoringPolicy,
    mode: ScoreMode,
) -> ComplianceScore {
    let sub_scores: Vec<SubScore> = bundle
        .buckets
        .iter()
        .map(|b| score_bucket(b, policy))
        .collect();

    let gaps: Vec<Gap> = sub_scores
        .iter()
        .filter(|s| s.score < policy.gap_threshold)
        .map(|s| {
            let rule = element
                .sub_requirements
                .iter()
                .find(|r| r.id == s.sub_requirement_id)
                .map(|r| r.rule.describe())
                .unwrap_or_else(|| "evidence".to_string());
            Gap {
                sub_requirement_id: s.sub_requirement_id.clone(),
                score: s.score,
                missing: format!(
                    "{} of {} required {rule}",
                    s.evidence_count, s.required_count
                ),
            }
        })
        .collect();

    ComplianceScore {
        element_id: element.id.clone(),
        mode,
        overall: overall(&sub_scores, policy.weighting),
        sub_scores: if mode == ScoreMode::Quick {
            Vec::new()
        } else {
            sub_scores
        },
        gaps,
        generated_at: bundle.generated_at,
    }
}

pub fn evidence_summary(bundle: &EvidenceBundle) -> EvidenceSummary {
    EvidenceSummary {
        element_id: bundle.element_id.clone(),
        counts: bundle
            .buckets
            .iter()
            .map(|b| EvidenceCount {
                sub_requirement_id: b.sub_requirement.id.clone(),
                name: b.sub_requirement.name.clone(),
                evidence_count: b.items.len(),
                required_count: b.sub_requirement.required_count,
                latest: b.items.first().map(|i| i.date),
            })
            .collect(),
        unclassified_count: bundle.unclassified.len(),
        generated_at: bundle.generated_at,
    }
}
