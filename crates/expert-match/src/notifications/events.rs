use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::invitations::domain::{InviteId, InviteStatus, ProposalDetails};
use crate::matching::domain::{BriefId, ExpertId};

/// Typed lifecycle transitions consumed by the dispatcher.
///
/// Milestone and QA events originate in adjacent subsystems and pass
/// through for delivery; everything else is produced by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    InviteSent {
        brief_id: BriefId,
        expert_id: ExpertId,
        invite_id: InviteId,
        score: f64,
        expires_at: DateTime<Utc>,
    },
    ProposalAccepted {
        brief_id: BriefId,
        expert_id: ExpertId,
        invite_id: InviteId,
        message: Option<String>,
        proposal: Option<ProposalDetails>,
    },
    ExpertSelected {
        brief_id: BriefId,
        expert_id: ExpertId,
    },
    SelectionClosed {
        brief_id: BriefId,
        expert_id: ExpertId,
    },
    MilestoneReached {
        brief_id: BriefId,
        expert_id: ExpertId,
        milestone: String,
    },
    QaReviewRequested {
        brief_id: BriefId,
        expert_id: ExpertId,
        notes: String,
    },
}

/// Who a given event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Expert,
    Client,
    ExpertAndClient,
}

impl MatchEvent {
    /// Template name used for rendering and recorded on the outbox row.
    pub const fn template(&self) -> &'static str {
        match self {
            MatchEvent::InviteSent { .. } => "invite_sent",
            MatchEvent::ProposalAccepted { .. } => "proposal_accepted",
            MatchEvent::ExpertSelected { .. } => "expert_selected",
            MatchEvent::SelectionClosed { .. } => "selection_not_selected",
            MatchEvent::MilestoneReached { .. } => "milestone_reached",
            MatchEvent::QaReviewRequested { .. } => "qa_review_requested",
        }
    }

    pub const fn audience(&self) -> Audience {
        match self {
            MatchEvent::InviteSent { .. } | MatchEvent::SelectionClosed { .. } => Audience::Expert,
            MatchEvent::ProposalAccepted { .. } => Audience::Client,
            MatchEvent::ExpertSelected { .. }
            | MatchEvent::MilestoneReached { .. }
            | MatchEvent::QaReviewRequested { .. } => Audience::ExpertAndClient,
        }
    }

    pub fn brief_id(&self) -> &BriefId {
        match self {
            MatchEvent::InviteSent { brief_id, .. }
            | MatchEvent::ProposalAccepted { brief_id, .. }
            | MatchEvent::ExpertSelected { brief_id, .. }
            | MatchEvent::SelectionClosed { brief_id, .. }
            | MatchEvent::MilestoneReached { brief_id, .. }
            | MatchEvent::QaReviewRequested { brief_id, .. } => brief_id,
        }
    }

    pub fn expert_id(&self) -> &ExpertId {
        match self {
            MatchEvent::InviteSent { expert_id, .. }
            | MatchEvent::ProposalAccepted { expert_id, .. }
            | MatchEvent::ExpertSelected { expert_id, .. }
            | MatchEvent::SelectionClosed { expert_id, .. }
            | MatchEvent::MilestoneReached { expert_id, .. }
            | MatchEvent::QaReviewRequested { expert_id, .. } => expert_id,
        }
    }

    /// The typed fact handed to the realtime layer. The core's obligation
    /// ends at emitting it; transport is someone else's problem.
    pub fn invite_change(&self) -> Option<InviteChanged> {
        let status = match self {
            MatchEvent::InviteSent { .. } => InviteStatus::Sent,
            MatchEvent::ProposalAccepted { .. } => InviteStatus::Accepted,
            MatchEvent::ExpertSelected { .. } => InviteStatus::Selected,
            MatchEvent::SelectionClosed { .. } => InviteStatus::NotSelected,
            MatchEvent::MilestoneReached { .. } | MatchEvent::QaReviewRequested { .. } => {
                return None
            }
        };
        Some(InviteChanged {
            brief_id: self.brief_id().clone(),
            expert_id: self.expert_id().clone(),
            status,
        })
    }
}

/// Fact emitted whenever an invite's status changes, consumed by the
/// external realtime subscription layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteChanged {
    pub brief_id: BriefId,
    pub expert_id: ExpertId,
    pub status: InviteStatus,
}
