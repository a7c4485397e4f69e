use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::settings::ScoreWeights;

/// Identifier wrapper for client briefs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BriefId(pub String);

/// Identifier wrapper for candidate experts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExpertId(pub String);

/// Identifier wrapper for the clients who author briefs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

/// Identifier wrapper for audited matching runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

/// Lifecycle of a brief as seen by the matching core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefStatus {
    Submitted,
    ProposalReady,
    ExpertSelected,
}

impl BriefStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BriefStatus::Submitted => "submitted",
            BriefStatus::ProposalReady => "proposal_ready",
            BriefStatus::ExpertSelected => "expert_selected",
        }
    }
}

/// A client's requirement set. Authored externally; the matching core only
/// ever mutates `selected_expert_id` and `status`, through selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub id: BriefId,
    pub client_id: ClientId,
    pub headline: String,
    /// Loosely-typed structured fields as authored by the brief flow.
    pub details: Value,
    pub status: BriefStatus,
    pub selected_expert_id: Option<ExpertId>,
}

/// Urgency levels map onto the weekly hours a candidate must have free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Asap,
    Urgent,
    Standard,
    Flexible,
}

impl Urgency {
    pub const fn required_weekly_hours(self) -> u32 {
        match self {
            Urgency::Asap => 50,
            Urgency::Urgent => 40,
            Urgency::Standard => 30,
            Urgency::Flexible => 20,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Urgency::Asap => "asap",
            Urgency::Urgent => "urgent",
            Urgency::Standard => "standard",
            Urgency::Flexible => "flexible",
        }
    }

    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "asap" => Self::Asap,
            "urgent" => Self::Urgent,
            "flexible" => Self::Flexible,
            _ => Self::Standard,
        }
    }
}

/// Typed extraction of a brief's loosely-typed `details` payload.
///
/// Produced by a single parsing step so scoring never reaches into raw JSON.
/// Missing or malformed fields degrade to empty/`None`, never to an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefRequirements {
    pub outcome_tags: Vec<String>,
    pub tools: Vec<String>,
    pub industry: Option<String>,
    pub budget_min: Option<u32>,
    pub budget_max: Option<u32>,
    pub urgency: Urgency,
}

impl BriefRequirements {
    pub fn parse(brief: &Brief) -> Self {
        let details = &brief.details;

        Self {
            outcome_tags: string_list(details, "outcome_tags"),
            tools: string_list(details, "tools"),
            industry: details
                .get("industry")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            budget_min: u32_field(details, "budget_min"),
            budget_max: u32_field(details, "budget_max"),
            urgency: details
                .get("urgency")
                .and_then(Value::as_str)
                .map(Urgency::from_str)
                .unwrap_or(Urgency::Standard),
        }
    }
}

fn string_list(details: &Value, key: &str) -> Vec<String> {
    details
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn u32_field(details: &Value, key: &str) -> Option<u32> {
    details
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}

/// Verification state of a declared tool certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Verified,
    Pending,
    Rejected,
}

/// A tool certification claimed by an expert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub tool: String,
    pub status: CertificationStatus,
}

/// A delivered engagement an expert can point to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub title: String,
    pub outcome_tags: Vec<String>,
    pub verified: bool,
}

/// An expert's declared capability set. Read-only to the matching core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub expert_id: ExpertId,
    pub display_name: String,
    pub email: String,
    pub outcome_preferences: Vec<String>,
    pub tools: Vec<String>,
    pub industries: Vec<String>,
    pub weekly_hours: u32,
    pub band_min: Option<u32>,
    pub band_max: Option<u32>,
    pub certifications: Vec<Certification>,
    pub case_studies: Vec<CaseStudy>,
}

impl CandidateProfile {
    pub fn contact(&self) -> Contact {
        Contact {
            id: self.expert_id.0.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Resolved delivery details for a notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// Immutable audit record of one scoring pass over the candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRun {
    pub id: RunId,
    pub brief_id: BriefId,
    pub min_score: f64,
    pub weights: ScoreWeights,
    pub cert_boost: f64,
    pub pool_size: usize,
    pub result_count: usize,
    pub widened: bool,
    pub created_at: DateTime<Utc>,
}
