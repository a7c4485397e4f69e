use super::super::domain::{BriefRequirements, CandidateProfile, CertificationStatus};
use super::super::normalizer::{matched_terms, SynonymTable};
use super::super::settings::MatchSettings;
use super::{MatchFactor, ScoreComponent};

/// Neutral score for a component the brief states no requirement for.
const NEUTRAL: f64 = 0.5;

/// Raw facts gathered while scoring, reused by reason and flag emission.
pub(crate) struct MatchSignals {
    pub outcome_matches: Vec<String>,
    pub tool_matches: Vec<String>,
    pub industry_matches: Vec<String>,
    pub certified_tools: Vec<String>,
    pub unverified_tool_claims: Vec<String>,
    pub availability: f64,
    pub band_exceeds_budget: bool,
}

pub(crate) fn component_scores(
    requirements: &BriefRequirements,
    candidate: &CandidateProfile,
    settings: &MatchSettings,
) -> (Vec<ScoreComponent>, MatchSignals) {
    let mut components = Vec::with_capacity(5);

    // Outcome tags compare on canonical form only; synonym tables are
    // configured for tools and industries.
    let plain = SynonymTable::default();

    let outcome_matches = matched_terms(
        &requirements.outcome_tags,
        &candidate.outcome_preferences,
        &plain,
    );
    components.push(fractional_component(
        MatchFactor::Outcome,
        settings.weights.outcome,
        requirements.outcome_tags.len(),
        outcome_matches.len(),
        "outcome focus",
    ));

    let tool_matches = matched_terms(&requirements.tools, &candidate.tools, &settings.tool_synonyms);
    components.push(fractional_component(
        MatchFactor::Tools,
        settings.weights.tools,
        requirements.tools.len(),
        tool_matches.len(),
        "required tools",
    ));

    let required_industry: Vec<String> = requirements.industry.clone().into_iter().collect();
    let industry_matches = matched_terms(
        &required_industry,
        &candidate.industries,
        &settings.industry_synonyms,
    );
    components.push(fractional_component(
        MatchFactor::Industry,
        settings.weights.industry,
        required_industry.len(),
        industry_matches.len(),
        "industry",
    ));

    let required_hours = requirements.urgency.required_weekly_hours();
    let availability =
        (f64::from(candidate.weekly_hours) / f64::from(required_hours)).min(1.0);
    components.push(ScoreComponent {
        factor: MatchFactor::Availability,
        score: availability,
        weight: settings.weights.availability,
        notes: format!(
            "{}h/week declared against {}h needed for {} urgency",
            candidate.weekly_hours,
            required_hours,
            requirements.urgency.label()
        ),
    });

    components.push(history_component(requirements, candidate, settings));

    let certified_tools = certified_required_tools(requirements, candidate, settings);
    let unverified_tool_claims = tool_matches
        .iter()
        .filter(|tool| !certified_tools.contains(tool))
        .cloned()
        .collect();

    let band_exceeds_budget = match (candidate.band_min, requirements.budget_max) {
        (Some(band_min), Some(budget_max)) => band_min > budget_max,
        _ => false,
    };

    let signals = MatchSignals {
        outcome_matches,
        tool_matches,
        industry_matches,
        certified_tools,
        unverified_tool_claims,
        availability,
        band_exceeds_budget,
    };

    (components, signals)
}

fn fractional_component(
    factor: MatchFactor,
    weight: f64,
    required: usize,
    matched: usize,
    subject: &str,
) -> ScoreComponent {
    if required == 0 {
        return ScoreComponent {
            factor,
            score: NEUTRAL,
            weight,
            notes: format!("brief states no {subject}; neutral"),
        };
    }

    ScoreComponent {
        factor,
        score: matched as f64 / required as f64,
        weight,
        notes: format!("matched {matched} of {required} {subject} terms"),
    }
}

fn history_component(
    requirements: &BriefRequirements,
    candidate: &CandidateProfile,
    settings: &MatchSettings,
) -> ScoreComponent {
    let verified: Vec<_> = candidate
        .case_studies
        .iter()
        .filter(|case_study| case_study.verified)
        .collect();

    if verified.is_empty() {
        return ScoreComponent {
            factor: MatchFactor::History,
            score: 0.0,
            weight: settings.weights.history,
            notes: "no verified case studies".to_string(),
        };
    }

    let plain = SynonymTable::default();
    let relevant = verified.iter().any(|case_study| {
        !matched_terms(&requirements.outcome_tags, &case_study.outcome_tags, &plain).is_empty()
    });

    ScoreComponent {
        factor: MatchFactor::History,
        score: if relevant { 0.5 } else { 0.0 },
        weight: settings.weights.history,
        notes: if relevant {
            "verified case study overlaps required outcomes".to_string()
        } else {
            format!("{} verified case studies, none on-outcome", verified.len())
        },
    }
}

/// Required tools covered by a *verified* certification, after synonym
/// normalization on both sides.
fn certified_required_tools(
    requirements: &BriefRequirements,
    candidate: &CandidateProfile,
    settings: &MatchSettings,
) -> Vec<String> {
    let verified_cert_tools: Vec<String> = candidate
        .certifications
        .iter()
        .filter(|certification| certification.status == CertificationStatus::Verified)
        .map(|certification| certification.tool.clone())
        .collect();

    matched_terms(
        &requirements.tools,
        &verified_cert_tools,
        &settings.tool_synonyms,
    )
}
