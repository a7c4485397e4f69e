use super::domain::{Brief, BriefId, CandidateProfile, ClientId, Contact, ExpertId, MatchingRun};

/// Read access to the marketplace data the matching core consumes, plus the
/// single brief mutation the selection coordinator owns.
///
/// Briefs and candidate profiles are authored by excluded subsystems; this
/// trait is their interface boundary.
pub trait MarketplaceStore: Send + Sync {
    fn brief(&self, id: &BriefId) -> Result<Option<Brief>, MatchStoreError>;
    fn candidates(&self) -> Result<Vec<CandidateProfile>, MatchStoreError>;
    fn candidate(&self, id: &ExpertId) -> Result<Option<CandidateProfile>, MatchStoreError>;
    fn client_contact(&self, id: &ClientId) -> Result<Option<Contact>, MatchStoreError>;
    /// Point the brief at its finalized expert and advance its status.
    /// Only the selection coordinator calls this.
    fn record_selection(&self, id: &BriefId, expert: &ExpertId) -> Result<Brief, MatchStoreError>;
}

/// Append-only audit log of ranking executions.
pub trait MatchingRunStore: Send + Sync {
    fn append(&self, run: MatchingRun) -> Result<MatchingRun, MatchStoreError>;
    fn for_brief(&self, id: &BriefId) -> Result<Vec<MatchingRun>, MatchStoreError>;
}

/// Error enumeration for marketplace storage failures.
#[derive(Debug, thiserror::Error)]
pub enum MatchStoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
