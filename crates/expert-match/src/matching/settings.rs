use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalizer::SynonymTable;

const DEFAULT_OUTCOME_WEIGHT: f64 = 0.40;
const DEFAULT_TOOLS_WEIGHT: f64 = 0.30;
const DEFAULT_INDUSTRY_WEIGHT: f64 = 0.15;
const DEFAULT_AVAILABILITY_WEIGHT: f64 = 0.10;
const DEFAULT_HISTORY_WEIGHT: f64 = 0.05;
const DEFAULT_CERT_BOOST: f64 = 0.10;

/// Relative weight of each component in the composite score.
///
/// Weights need not sum to 1.0; the certification boost is additive headroom
/// on top, so totals above 1.0 are observable when weights are mis-tuned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub outcome: f64,
    pub tools: f64,
    pub industry: f64,
    pub availability: f64,
    pub history: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            outcome: DEFAULT_OUTCOME_WEIGHT,
            tools: DEFAULT_TOOLS_WEIGHT,
            industry: DEFAULT_INDUSTRY_WEIGHT,
            availability: DEFAULT_AVAILABILITY_WEIGHT,
            history: DEFAULT_HISTORY_WEIGHT,
        }
    }
}

/// The full admin-tunable matching configuration.
///
/// Passed explicitly into the scoring engine rather than read from ambient
/// state, so scoring stays a pure function of (brief, candidate, settings).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    pub weights: ScoreWeights,
    pub cert_boost: f64,
    pub tool_synonyms: SynonymTable,
    pub industry_synonyms: SynonymTable,
}

impl MatchSettings {
    /// Build settings from the admin key/value table. Any key that is
    /// missing or malformed falls back to its documented default.
    pub fn from_admin_settings(settings: &BTreeMap<String, Value>) -> Self {
        let defaults = ScoreWeights::default();
        Self {
            weights: ScoreWeights {
                outcome: weight(settings, "outcome_weight", defaults.outcome),
                tools: weight(settings, "tools_weight", defaults.tools),
                industry: weight(settings, "industry_weight", defaults.industry),
                availability: weight(settings, "availability_weight", defaults.availability),
                history: weight(settings, "history_weight", defaults.history),
            },
            cert_boost: weight(settings, "cert_boost", DEFAULT_CERT_BOOST),
            tool_synonyms: synonyms(settings, "tool_synonyms"),
            industry_synonyms: synonyms(settings, "industry_synonyms"),
        }
    }
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            cert_boost: DEFAULT_CERT_BOOST,
            tool_synonyms: SynonymTable::default(),
            industry_synonyms: SynonymTable::default(),
        }
    }
}

fn weight(settings: &BTreeMap<String, Value>, key: &str, fallback: f64) -> f64 {
    settings
        .get(key)
        .and_then(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => raw.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|parsed| parsed.is_finite() && *parsed >= 0.0)
        .unwrap_or(fallback)
}

fn synonyms(settings: &BTreeMap<String, Value>, key: &str) -> SynonymTable {
    settings
        .get(key)
        .map(SynonymTable::from_value)
        .unwrap_or_default()
}
