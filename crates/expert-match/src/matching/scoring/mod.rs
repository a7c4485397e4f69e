mod components;
mod explain;

pub use explain::MatchFlag;

use serde::{Deserialize, Serialize};

use super::domain::{BriefRequirements, CandidateProfile, CertificationStatus, ExpertId};
use super::settings::MatchSettings;

/// Stateless engine applying the weighted multi-factor model to one
/// candidate at a time. Pure function of (brief, candidate, settings).
pub struct ScoringEngine {
    settings: MatchSettings,
}

impl ScoringEngine {
    pub fn new(settings: MatchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn score(
        &self,
        requirements: &BriefRequirements,
        candidate: &CandidateProfile,
    ) -> ScoreBreakdown {
        let (component_rows, signals) =
            components::component_scores(requirements, candidate, &self.settings);

        let cert_bonus = if signals.certified_tools.is_empty() {
            0.0
        } else {
            // Flat bonus, applied once regardless of how many required
            // tools carry a verified certification.
            self.settings.cert_boost
        };

        let weighted: f64 = component_rows
            .iter()
            .map(|component| component.weight * component.score)
            .sum();

        // Deliberately unclamped: totals above 1.0 let operators spot
        // mis-tuned weights.
        let total = round3(weighted + cert_bonus);

        let reasons = explain::reasons(&component_rows, &signals, cert_bonus);
        let flags = explain::flags(&signals);

        ScoreBreakdown {
            total,
            components: component_rows,
            cert_bonus,
            reasons,
            flags,
        }
    }

    /// The ephemeral ranked-output row for one candidate, carrying the
    /// band/tools snapshot the shortlist UI renders from.
    pub fn result_for(
        &self,
        requirements: &BriefRequirements,
        candidate: &CandidateProfile,
    ) -> MatchCandidateResult {
        let breakdown = self.score(requirements, candidate);
        MatchCandidateResult {
            expert_id: candidate.expert_id.clone(),
            score: breakdown.total,
            reasons: breakdown.reasons,
            flags: breakdown.flags,
            band_min: candidate.band_min,
            band_max: candidate.band_max,
            tools: candidate.tools.clone(),
            verified_certifications: candidate
                .certifications
                .iter()
                .filter(|certification| certification.status == CertificationStatus::Verified)
                .map(|certification| certification.tool.clone())
                .collect(),
        }
    }
}

/// The five factors of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Outcome,
    Tools,
    Industry,
    Availability,
    History,
}

impl MatchFactor {
    pub const fn label(self) -> &'static str {
        match self {
            MatchFactor::Outcome => "outcome",
            MatchFactor::Tools => "tools",
            MatchFactor::Industry => "industry",
            MatchFactor::Availability => "availability",
            MatchFactor::History => "history",
        }
    }
}

/// Discrete contribution to a score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: MatchFactor,
    pub score: f64,
    pub weight: f64,
    pub notes: String,
}

/// Full scoring output for one candidate against one brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub components: Vec<ScoreComponent>,
    pub cert_bonus: f64,
    pub reasons: Vec<String>,
    pub flags: Vec<MatchFlag>,
}

/// Ephemeral ranked output; exists only for the duration of a ranking
/// response and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidateResult {
    pub expert_id: ExpertId,
    pub score: f64,
    pub reasons: Vec<String>,
    pub flags: Vec<MatchFlag>,
    pub band_min: Option<u32>,
    pub band_max: Option<u32>,
    pub tools: Vec<String>,
    pub verified_certifications: Vec<String>,
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
