use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::domain::{BriefId, ExpertId};

/// Identifier wrapper for expert invitations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteId(pub String);

/// The invitation state machine.
///
/// `Sent` is initial; `Accepted`/`Declined` are expert actions valid only
/// before expiry; `Selected`/`NotSelected` are terminal client/admin
/// outcomes reachable from `Accepted` (or, for `NotSelected`,
/// administratively during reassignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Sent,
    Accepted,
    Declined,
    Selected,
    NotSelected,
}

impl InviteStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InviteStatus::Sent => "sent",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
            InviteStatus::Selected => "selected",
            InviteStatus::NotSelected => "not_selected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, InviteStatus::Selected | InviteStatus::NotSelected)
    }
}

/// Expert response actions on a pending invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteAction {
    Accept,
    Decline,
}

/// Structured proposal details captured on accept for the external
/// proposal-creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDetails {
    pub hours_per_week: u32,
    pub rate: u32,
    pub timeline: String,
}

/// The stateful record of one candidate being offered one brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertInvite {
    pub id: InviteId,
    pub brief_id: BriefId,
    pub expert_id: ExpertId,
    pub status: InviteStatus,
    /// Frozen at creation; later re-scoring never alters historical invites.
    pub score_at_invite: f64,
    pub sent_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub response_message: Option<String>,
    pub proposal: Option<ProposalDetails>,
}

impl ExpertInvite {
    /// Expiry is evaluated at read time; no background sweep mutates rows.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_respondable(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Sent && !self.is_expired(now)
    }

    /// Pending means awaiting a response and still answerable. Queries
    /// computing "pending" must all go through this filter.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.is_respondable(now)
    }
}
