use serde::{Deserialize, Serialize};

use super::components::MatchSignals;
use super::{MatchFactor, ScoreComponent};

/// Risk flags surfaced alongside a score, independent of the reason list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFlag {
    BudgetExceedsBand,
    AvailabilityShortfall,
    UnverifiedToolClaim,
}

impl MatchFlag {
    pub const fn label(self) -> &'static str {
        match self {
            MatchFlag::BudgetExceedsBand => "budget_exceeds_band",
            MatchFlag::AvailabilityShortfall => "availability_shortfall",
            MatchFlag::UnverifiedToolClaim => "unverified_tool_claim",
        }
    }
}

/// Maximum number of human-readable reasons attached to one result.
const MAX_REASONS: usize = 4;

/// Components only justify a reason once they clear the neutral midpoint.
const REASON_THRESHOLD: f64 = 0.5;

/// Emit reasons in fixed priority order: outcome, tools, industry,
/// certification. Each names the terms that actually matched.
pub(crate) fn reasons(
    components: &[ScoreComponent],
    signals: &MatchSignals,
    cert_bonus: f64,
) -> Vec<String> {
    let mut reasons = Vec::with_capacity(MAX_REASONS);

    if component_score(components, MatchFactor::Outcome) > REASON_THRESHOLD
        && !signals.outcome_matches.is_empty()
    {
        reasons.push(format!(
            "outcome focus matches: {}",
            signals.outcome_matches.join(", ")
        ));
    }

    if component_score(components, MatchFactor::Tools) > REASON_THRESHOLD
        && !signals.tool_matches.is_empty()
    {
        reasons.push(format!(
            "works with required tools: {}",
            signals.tool_matches.join(", ")
        ));
    }

    if component_score(components, MatchFactor::Industry) > REASON_THRESHOLD
        && !signals.industry_matches.is_empty()
    {
        reasons.push(format!(
            "industry experience in {}",
            signals.industry_matches.join(", ")
        ));
    }

    if cert_bonus > 0.0 && !signals.certified_tools.is_empty() {
        reasons.push(format!(
            "verified certification for {}",
            signals.certified_tools.join(", ")
        ));
    }

    reasons.truncate(MAX_REASONS);
    reasons
}

pub(crate) fn flags(signals: &MatchSignals) -> Vec<MatchFlag> {
    let mut flags = Vec::new();

    if signals.band_exceeds_budget {
        flags.push(MatchFlag::BudgetExceedsBand);
    }
    if signals.availability < 0.5 {
        flags.push(MatchFlag::AvailabilityShortfall);
    }
    if !signals.unverified_tool_claims.is_empty() {
        flags.push(MatchFlag::UnverifiedToolClaim);
    }

    flags
}

fn component_score(components: &[ScoreComponent], factor: MatchFactor) -> f64 {
    components
        .iter()
        .find(|component| component.factor == factor)
        .map(|component| component.score)
        .unwrap_or(0.0)
}
