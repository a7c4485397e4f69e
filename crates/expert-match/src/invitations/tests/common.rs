use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::invitations::domain::{ExpertInvite, InviteId};
use crate::invitations::repository::{InviteRepository, InviteRepositoryError};
use crate::invitations::selection::{
    plan_selection, SelectionError, SelectionMode, SelectionTransition,
};
use crate::invitations::service::InvitationService;
use crate::matching::domain::{
    Brief, BriefId, BriefStatus, CandidateProfile, ClientId, Contact, ExpertId,
};
use crate::matching::repository::{MarketplaceStore, MatchStoreError};
use crate::matching::scoring::MatchCandidateResult;

pub(super) const RESPONSE_WINDOW_HOURS: i64 = 72;

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).single().expect("valid timestamp")
}

pub(super) fn brief_id() -> BriefId {
    BriefId("brief-growth".to_string())
}

pub(super) fn brief() -> Brief {
    Brief {
        id: brief_id(),
        client_id: ClientId("client-aster".to_string()),
        headline: "Lift inbound pipeline for a B2B SaaS".to_string(),
        details: json!({
            "outcome_tags": ["lead generation"],
            "tools": ["HubSpot"],
            "urgency": "urgent",
        }),
        status: BriefStatus::Submitted,
        selected_expert_id: None,
    }
}

pub(super) fn candidate_result(expert: &str, score: f64) -> MatchCandidateResult {
    MatchCandidateResult {
        expert_id: ExpertId(expert.to_string()),
        score,
        reasons: vec!["outcome focus matches: lead generation".to_string()],
        flags: Vec::new(),
        band_min: Some(4000),
        band_max: Some(7000),
        tools: vec!["HubSpot".to_string()],
        verified_certifications: vec!["HubSpot".to_string()],
    }
}

pub(super) fn build_service() -> (
    InvitationService<MemoryInviteRepository>,
    Arc<MemoryInviteRepository>,
) {
    let repository = Arc::new(MemoryInviteRepository::default());
    let service = InvitationService::new(repository.clone(), RESPONSE_WINDOW_HOURS);
    (service, repository)
}

/// Single-mutex invite store: every operation, `finalize_selection`
/// included, runs under one lock, which is exactly the serializing
/// boundary the repository contract asks for.
#[derive(Default)]
pub(super) struct MemoryInviteRepository {
    invites: Mutex<Vec<ExpertInvite>>,
}

impl MemoryInviteRepository {
    pub(super) fn snapshot(&self) -> Vec<ExpertInvite> {
        self.invites.lock().expect("invite mutex poisoned").clone()
    }
}

impl InviteRepository for MemoryInviteRepository {
    fn insert(&self, invite: ExpertInvite) -> Result<ExpertInvite, InviteRepositoryError> {
        let mut guard = self.invites.lock().expect("invite mutex poisoned");
        if guard
            .iter()
            .any(|row| row.brief_id == invite.brief_id && row.expert_id == invite.expert_id)
        {
            return Err(InviteRepositoryError::Conflict);
        }
        guard.push(invite.clone());
        Ok(invite)
    }

    fn fetch(&self, id: &InviteId) -> Result<Option<ExpertInvite>, InviteRepositoryError> {
        let guard = self.invites.lock().expect("invite mutex poisoned");
        Ok(guard.iter().find(|row| &row.id == id).cloned())
    }

    fn fetch_pair(
        &self,
        brief: &BriefId,
        expert: &ExpertId,
    ) -> Result<Option<ExpertInvite>, InviteRepositoryError> {
        let guard = self.invites.lock().expect("invite mutex poisoned");
        Ok(guard
            .iter()
            .find(|row| &row.brief_id == brief && &row.expert_id == expert)
            .cloned())
    }

    fn update(&self, invite: ExpertInvite) -> Result<(), InviteRepositoryError> {
        let mut guard = self.invites.lock().expect("invite mutex poisoned");
        match guard.iter_mut().find(|row| row.id == invite.id) {
            Some(row) => {
                *row = invite;
                Ok(())
            }
            None => Err(InviteRepositoryError::NotFound),
        }
    }

    fn for_brief(&self, brief: &BriefId) -> Result<Vec<ExpertInvite>, InviteRepositoryError> {
        let guard = self.invites.lock().expect("invite mutex poisoned");
        Ok(guard
            .iter()
            .filter(|row| &row.brief_id == brief)
            .cloned()
            .collect())
    }

    fn finalize_selection(
        &self,
        brief: &BriefId,
        expert: &ExpertId,
        mode: SelectionMode,
    ) -> Result<SelectionTransition, SelectionError> {
        let mut guard = self.invites.lock().expect("invite mutex poisoned");
        let brief_invites: Vec<ExpertInvite> = guard
            .iter()
            .filter(|row| &row.brief_id == brief)
            .cloned()
            .collect();

        let transition = plan_selection(&brief_invites, expert, mode)?;

        for updated in std::iter::once(&transition.winner).chain(transition.displaced.iter()) {
            if let Some(row) = guard.iter_mut().find(|row| row.id == updated.id) {
                *row = updated.clone();
            }
        }

        Ok(transition)
    }
}

#[derive(Default)]
pub(super) struct MemoryMarketplace {
    briefs: Mutex<HashMap<BriefId, Brief>>,
    candidates: Mutex<Vec<CandidateProfile>>,
}

impl MemoryMarketplace {
    pub(super) fn with_brief(brief: Brief) -> Arc<Self> {
        Self::seeded(brief, Vec::new())
    }

    pub(super) fn seeded(brief: Brief, candidates: Vec<CandidateProfile>) -> Arc<Self> {
        let store = Self::default();
        store
            .briefs
            .lock()
            .expect("brief mutex poisoned")
            .insert(brief.id.clone(), brief);
        *store.candidates.lock().expect("candidate mutex poisoned") = candidates;
        Arc::new(store)
    }
}

impl MarketplaceStore for MemoryMarketplace {
    fn brief(&self, id: &BriefId) -> Result<Option<Brief>, MatchStoreError> {
        Ok(self
            .briefs
            .lock()
            .expect("brief mutex poisoned")
            .get(id)
            .cloned())
    }

    fn candidates(&self) -> Result<Vec<CandidateProfile>, MatchStoreError> {
        Ok(self
            .candidates
            .lock()
            .expect("candidate mutex poisoned")
            .clone())
    }

    fn candidate(&self, id: &ExpertId) -> Result<Option<CandidateProfile>, MatchStoreError> {
        Ok(self
            .candidates
            .lock()
            .expect("candidate mutex poisoned")
            .iter()
            .find(|candidate| &candidate.expert_id == id)
            .cloned())
    }

    fn client_contact(&self, id: &ClientId) -> Result<Option<Contact>, MatchStoreError> {
        Ok(Some(Contact {
            id: id.0.clone(),
            display_name: "Aster Labs".to_string(),
            email: "ops@asterlabs.example".to_string(),
        }))
    }

    fn record_selection(&self, id: &BriefId, expert: &ExpertId) -> Result<Brief, MatchStoreError> {
        let mut guard = self.briefs.lock().expect("brief mutex poisoned");
        let brief = guard.get_mut(id).ok_or(MatchStoreError::NotFound)?;
        brief.selected_expert_id = Some(expert.clone());
        brief.status = BriefStatus::ExpertSelected;
        Ok(brief.clone())
    }
}
