//! Candidate matching: requirement extraction, synonym normalization,
//! weighted multi-factor scoring, and audited ranking runs.

pub mod domain;
pub mod normalizer;
pub mod ranker;
pub mod repository;
pub mod scoring;
pub mod settings;

#[cfg(test)]
mod tests;

pub use domain::{
    Brief, BriefId, BriefRequirements, BriefStatus, CandidateProfile, CaseStudy, Certification,
    CertificationStatus, ClientId, Contact, ExpertId, MatchingRun, RunId, Urgency,
};
pub use normalizer::{normalize, SynonymTable};
pub use ranker::{CandidateRanker, RankDisposition, RankMetadata, RankOptions, RankOutcome};
pub use repository::{MarketplaceStore, MatchStoreError, MatchingRunStore};
pub use scoring::{
    MatchCandidateResult, MatchFactor, MatchFlag, ScoreBreakdown, ScoreComponent, ScoringEngine,
};
pub use settings::{MatchSettings, ScoreWeights};
