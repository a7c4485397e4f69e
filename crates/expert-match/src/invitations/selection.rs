use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matching::domain::{Brief, BriefId, ExpertId};
use crate::matching::repository::{MarketplaceStore, MatchStoreError};

use super::domain::{ExpertInvite, InviteStatus};
use super::repository::{InviteRepository, InviteRepositoryError};

/// Which actor path a selection runs on. Both paths share one atomic
/// update; reassignment only widens the set of promotable statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Standard,
    Reassign,
}

/// The computed status changes of one selection: the promoted winner and
/// every sibling that gets demoted in the same unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTransition {
    pub winner: ExpertInvite,
    pub displaced: Vec<ExpertInvite>,
}

/// Errors raised while finalizing a winner.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no invite exists for this brief and expert")]
    InviteNotFound,
    #[error("invite is not eligible for selection from status '{}'", .status.label())]
    InviteNotEligible { status: InviteStatus },
    #[error("brief already resolved to a selected expert")]
    BriefResolved,
    #[error(transparent)]
    Invites(#[from] InviteRepositoryError),
    #[error(transparent)]
    Marketplace(#[from] MatchStoreError),
}

/// Pure selection planner shared by every repository implementation.
///
/// Given the full invite set of a brief, decide the winner promotion and
/// sibling demotions, or reject. Implementations of
/// [`InviteRepository::finalize_selection`] must call this inside their
/// serializing boundary so the at-most-one-winner invariant holds under
/// concurrent calls regardless of actor.
pub fn plan_selection(
    invites: &[ExpertInvite],
    expert: &ExpertId,
    mode: SelectionMode,
) -> Result<SelectionTransition, SelectionError> {
    let target = invites
        .iter()
        .find(|invite| &invite.expert_id == expert)
        .ok_or(SelectionError::InviteNotFound)?;

    if target.status == InviteStatus::Selected {
        return Err(SelectionError::BriefResolved);
    }

    let current_winner = invites
        .iter()
        .find(|invite| invite.status == InviteStatus::Selected);

    if current_winner.is_some() && mode == SelectionMode::Standard {
        return Err(SelectionError::BriefResolved);
    }

    let eligible = match mode {
        SelectionMode::Standard => target.status == InviteStatus::Accepted,
        // A demoted sibling had necessarily reached `accepted` before the
        // first selection, so the admin path may promote it back.
        SelectionMode::Reassign => matches!(
            target.status,
            InviteStatus::Accepted | InviteStatus::NotSelected
        ),
    };
    if !eligible {
        return Err(SelectionError::InviteNotEligible {
            status: target.status,
        });
    }

    let mut winner = target.clone();
    winner.status = InviteStatus::Selected;

    let displaced = invites
        .iter()
        .filter(|invite| invite.id != target.id)
        .filter(|invite| {
            invite.status == InviteStatus::Accepted || invite.status == InviteStatus::Selected
        })
        .map(|invite| {
            let mut demoted = invite.clone();
            demoted.status = InviteStatus::NotSelected;
            demoted
        })
        .collect();

    Ok(SelectionTransition { winner, displaced })
}

/// Outcome of a committed selection, carrying everything event dispatch
/// needs without re-reading storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub brief: Brief,
    pub winner: ExpertInvite,
    pub displaced: Vec<ExpertInvite>,
}

/// Enforces the at-most-one-winner invariant per brief and transitions all
/// sibling invitations when a winner is chosen.
pub struct SelectionCoordinator<I, M> {
    invites: Arc<I>,
    marketplace: Arc<M>,
}

impl<I, M> SelectionCoordinator<I, M>
where
    I: InviteRepository + 'static,
    M: MarketplaceStore + 'static,
{
    pub fn new(invites: Arc<I>, marketplace: Arc<M>) -> Self {
        Self {
            invites,
            marketplace,
        }
    }

    /// Finalize the given expert as the brief's winner. A concurrent call
    /// for a different expert on the same brief loses with `BriefResolved`.
    pub fn select_expert(
        &self,
        brief_id: &BriefId,
        expert_id: &ExpertId,
    ) -> Result<SelectionOutcome, SelectionError> {
        self.finalize(brief_id, expert_id, SelectionMode::Standard)
    }

    /// Admin reassignment. Same atomic path as `select_expert`; never a
    /// separate unsynchronized route.
    pub fn reassign_expert(
        &self,
        brief_id: &BriefId,
        expert_id: &ExpertId,
    ) -> Result<SelectionOutcome, SelectionError> {
        self.finalize(brief_id, expert_id, SelectionMode::Reassign)
    }

    fn finalize(
        &self,
        brief_id: &BriefId,
        expert_id: &ExpertId,
        mode: SelectionMode,
    ) -> Result<SelectionOutcome, SelectionError> {
        let transition = self.invites.finalize_selection(brief_id, expert_id, mode)?;
        let brief = self.marketplace.record_selection(brief_id, expert_id)?;

        info!(
            brief_id = %brief_id.0,
            expert_id = %expert_id.0,
            displaced = transition.displaced.len(),
            mode = ?mode,
            "expert selection finalized"
        );

        Ok(SelectionOutcome {
            brief,
            winner: transition.winner,
            displaced: transition.displaced,
        })
    }
}
