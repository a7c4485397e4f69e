use crate::matching::domain::{BriefId, ExpertId};

use super::domain::{ExpertInvite, InviteId};
use super::selection::{SelectionError, SelectionMode, SelectionTransition};

/// Storage abstraction for invitations.
///
/// Implementations must uphold two contracts: `insert` rejects a second
/// invite for an existing (brief, expert) pair with `Conflict`, and
/// `finalize_selection` evaluates and applies the selection plan (see
/// [`super::selection::plan_selection`]) as a single atomic unit with
/// respect to concurrent `finalize_selection` calls on the same brief.
/// Losers of a selection race must observe `SelectionError::BriefResolved`,
/// never a partial or merged state.
pub trait InviteRepository: Send + Sync {
    fn insert(&self, invite: ExpertInvite) -> Result<ExpertInvite, InviteRepositoryError>;
    fn fetch(&self, id: &InviteId) -> Result<Option<ExpertInvite>, InviteRepositoryError>;
    fn fetch_pair(
        &self,
        brief: &BriefId,
        expert: &ExpertId,
    ) -> Result<Option<ExpertInvite>, InviteRepositoryError>;
    fn update(&self, invite: ExpertInvite) -> Result<(), InviteRepositoryError>;
    fn for_brief(&self, brief: &BriefId) -> Result<Vec<ExpertInvite>, InviteRepositoryError>;
    fn finalize_selection(
        &self,
        brief: &BriefId,
        expert: &ExpertId,
        mode: SelectionMode,
    ) -> Result<SelectionTransition, SelectionError>;
}

/// Error enumeration for invitation storage failures.
#[derive(Debug, thiserror::Error)]
pub enum InviteRepositoryError {
    #[error("an invite already exists for this brief and expert")]
    Conflict,
    #[error("invite not found")]
    NotFound,
    #[error("invite store unavailable: {0}")]
    Unavailable(String),
}
