use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::matching::domain::BriefId;
use crate::matching::scoring::MatchCandidateResult;

use super::domain::{ExpertInvite, InviteAction, InviteId, InviteStatus, ProposalDetails};
use super::repository::{InviteRepository, InviteRepositoryError};

static INVITE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_invite_id() -> InviteId {
    let id = INVITE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InviteId(format!("invite-{id:06}"))
}

/// Error raised by invitation lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("invite not found")]
    NotFound,
    #[error("invite not respondable (status '{}', expired: {expired})", .status.label())]
    NotRespondable {
        status: InviteStatus,
        expired: bool,
    },
    #[error("an invite already exists for this brief and expert")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] InviteRepositoryError),
}

/// Turns ranked candidates into invitation records and drives each through
/// its response lifecycle.
pub struct InvitationService<I> {
    invites: Arc<I>,
    response_window: Duration,
}

impl<I> InvitationService<I>
where
    I: InviteRepository + 'static,
{
    pub fn new(invites: Arc<I>, response_window_hours: i64) -> Self {
        Self {
            invites,
            response_window: Duration::hours(response_window_hours),
        }
    }

    /// Create one invite for a ranked candidate, freezing the score it was
    /// ranked with. A second invite for the same (brief, expert) pair is a
    /// conflict.
    pub fn invite_expert(
        &self,
        brief_id: &BriefId,
        candidate: &MatchCandidateResult,
        now: DateTime<Utc>,
    ) -> Result<ExpertInvite, InviteError> {
        let invite = ExpertInvite {
            id: next_invite_id(),
            brief_id: brief_id.clone(),
            expert_id: candidate.expert_id.clone(),
            status: InviteStatus::Sent,
            score_at_invite: candidate.score,
            sent_at: now,
            expires_at: now + self.response_window,
            viewed_at: None,
            responded_at: None,
            response_message: None,
            proposal: None,
        };

        match self.invites.insert(invite) {
            Ok(stored) => {
                info!(
                    invite_id = %stored.id.0,
                    brief_id = %brief_id.0,
                    expert_id = %stored.expert_id.0,
                    score = stored.score_at_invite,
                    "invite created"
                );
                Ok(stored)
            }
            Err(InviteRepositoryError::Conflict) => Err(InviteError::Conflict),
            Err(other) => Err(InviteError::Storage(other)),
        }
    }

    /// Create invites for a whole rank result. Pairs that already hold an
    /// invite are skipped as a no-op; only newly created invites return.
    pub fn create_invites(
        &self,
        brief_id: &BriefId,
        ranked: &[MatchCandidateResult],
        now: DateTime<Utc>,
    ) -> Result<Vec<ExpertInvite>, InviteError> {
        let mut created = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            match self.invite_expert(brief_id, candidate, now) {
                Ok(invite) => created.push(invite),
                Err(InviteError::Conflict) => {
                    debug!(
                        brief_id = %brief_id.0,
                        expert_id = %candidate.expert_id.0,
                        "invite already exists, skipping"
                    );
                }
                Err(other) => return Err(other),
            }
        }
        Ok(created)
    }

    /// Record the first time an expert opens a pending invite. Idempotent:
    /// later views never re-set `viewed_at`.
    pub fn mark_viewed(
        &self,
        invite_id: &InviteId,
        now: DateTime<Utc>,
    ) -> Result<ExpertInvite, InviteError> {
        let mut invite = self
            .invites
            .fetch(invite_id)?
            .ok_or(InviteError::NotFound)?;

        if invite.status == InviteStatus::Sent && invite.viewed_at.is_none() {
            invite.viewed_at = Some(now);
            self.invites.update(invite.clone())?;
        }

        Ok(invite)
    }

    /// Expert accepts or declines. Valid only while the invite is `sent`
    /// and unexpired; anything else is a typed invalid transition and the
    /// stored row stays untouched.
    pub fn respond(
        &self,
        invite_id: &InviteId,
        action: InviteAction,
        message: Option<String>,
        proposal: Option<ProposalDetails>,
        now: DateTime<Utc>,
    ) -> Result<ExpertInvite, InviteError> {
        let mut invite = self
            .invites
            .fetch(invite_id)?
            .ok_or(InviteError::NotFound)?;

        if !invite.is_respondable(now) {
            return Err(InviteError::NotRespondable {
                status: invite.status,
                expired: invite.is_expired(now),
            });
        }

        invite.status = match action {
            InviteAction::Accept => InviteStatus::Accepted,
            InviteAction::Decline => InviteStatus::Declined,
        };
        invite.responded_at = Some(now);
        invite.response_message = message;
        if action == InviteAction::Accept {
            invite.proposal = proposal;
        }

        self.invites.update(invite.clone())?;

        info!(
            invite_id = %invite.id.0,
            brief_id = %invite.brief_id.0,
            expert_id = %invite.expert_id.0,
            status = invite.status.label(),
            "invite response recorded"
        );

        Ok(invite)
    }

    /// Invites still awaiting an answer: `sent` and unexpired, with expiry
    /// applied at read time.
    pub fn pending_for_brief(
        &self,
        brief_id: &BriefId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExpertInvite>, InviteError> {
        Ok(self
            .invites
            .for_brief(brief_id)?
            .into_iter()
            .filter(|invite| invite.is_pending(now))
            .collect())
    }

    /// Every invite for a brief, for reporting reads.
    pub fn invites_for_brief(&self, brief_id: &BriefId) -> Result<Vec<ExpertInvite>, InviteError> {
        Ok(self.invites.for_brief(brief_id)?)
    }

    pub fn fetch(&self, invite_id: &InviteId) -> Result<Option<ExpertInvite>, InviteError> {
        Ok(self.invites.fetch(invite_id)?)
    }
}
