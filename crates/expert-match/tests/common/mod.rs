//! Shared fixtures for the integration suites: in-memory stores standing in
//! for the external persistence layer, plus a seeded brief and pool.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use expert_match::invitations::{
    plan_selection, ExpertInvite, InviteId, InviteRepository, InviteRepositoryError,
    SelectionError, SelectionMode, SelectionTransition,
};
use expert_match::matching::{
    Brief, BriefId, BriefStatus, CandidateProfile, CaseStudy, Certification, CertificationStatus,
    ClientId, Contact, ExpertId, MarketplaceStore, MatchSettings, MatchStoreError, MatchingRun,
    MatchingRunStore,
};
use expert_match::notifications::{
    DeliveryError, DispatchStore, DispatchStoreError, EmailSender, InAppNotification,
    InviteChanged, NotificationId, OutboxEntry,
};

pub const RESPONSE_WINDOW_HOURS: i64 = 72;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).single().expect("valid timestamp")
}

pub fn match_settings() -> MatchSettings {
    let mut admin = BTreeMap::new();
    admin.insert(
        "tool_synonyms".to_string(),
        json!({"hubspot": ["hubspot crm"]}),
    );
    admin.insert(
        "industry_synonyms".to_string(),
        json!({"saas": ["software"]}),
    );
    MatchSettings::from_admin_settings(&admin)
}

pub fn brief_id() -> BriefId {
    BriefId("brief-growth".to_string())
}

pub fn brief() -> Brief {
    Brief {
        id: brief_id(),
        client_id: ClientId("client-aster".to_string()),
        headline: "Lift inbound pipeline for a B2B SaaS".to_string(),
        details: json!({
            "outcome_tags": ["lead generation", "content strategy"],
            "tools": ["HubSpot"],
            "industry": "SaaS",
            "budget_min": 3000,
            "budget_max": 8000,
            "urgency": "urgent",
        }),
        status: BriefStatus::Submitted,
        selected_expert_id: None,
    }
}

pub fn anna() -> CandidateProfile {
    CandidateProfile {
        expert_id: ExpertId("expert-anna".to_string()),
        display_name: "Anna Kovacs".to_string(),
        email: "anna@example.com".to_string(),
        outcome_preferences: vec![
            "lead generation".to_string(),
            "content strategy".to_string(),
        ],
        tools: vec!["HubSpot CRM".to_string()],
        industries: vec!["software".to_string()],
        weekly_hours: 40,
        band_min: Some(4000),
        band_max: Some(7000),
        certifications: vec![Certification {
            tool: "HubSpot".to_string(),
            status: CertificationStatus::Verified,
        }],
        case_studies: vec![CaseStudy {
            title: "Pipeline rebuild for Northwind".to_string(),
            outcome_tags: vec!["lead generation".to_string()],
            verified: true,
        }],
    }
}

pub fn ben() -> CandidateProfile {
    CandidateProfile {
        expert_id: ExpertId("expert-ben".to_string()),
        display_name: "Ben Ortega".to_string(),
        email: "ben@example.com".to_string(),
        outcome_preferences: vec![
            "lead generation".to_string(),
            "content strategy".to_string(),
        ],
        tools: vec!["HubSpot".to_string()],
        industries: vec!["saas".to_string()],
        weekly_hours: 45,
        band_min: Some(3500),
        band_max: Some(6000),
        certifications: Vec::new(),
        case_studies: vec![CaseStudy {
            title: "Content engine for Acme".to_string(),
            outcome_tags: vec!["content strategy".to_string()],
            verified: true,
        }],
    }
}

pub fn cleo() -> CandidateProfile {
    CandidateProfile {
        expert_id: ExpertId("expert-cleo".to_string()),
        display_name: "Cleo Marsh".to_string(),
        email: "cleo@example.com".to_string(),
        outcome_preferences: vec!["brand awareness".to_string()],
        tools: vec!["Canva".to_string()],
        industries: vec!["retail".to_string()],
        weekly_hours: 10,
        band_min: Some(9000),
        band_max: Some(15000),
        certifications: Vec::new(),
        case_studies: Vec::new(),
    }
}

#[derive(Default)]
pub struct MemoryMarketplace {
    briefs: Mutex<HashMap<BriefId, Brief>>,
    candidates: Mutex<Vec<CandidateProfile>>,
    clients: Mutex<HashMap<ClientId, Contact>>,
}

impl MemoryMarketplace {
    pub fn seeded(brief: Brief, candidates: Vec<CandidateProfile>) -> Arc<Self> {
        let store = Self::default();
        store.clients.lock().expect("client mutex poisoned").insert(
            brief.client_id.clone(),
            Contact {
                id: brief.client_id.0.clone(),
                display_name: "Aster Labs".to_string(),
                email: "ops@asterlabs.example".to_string(),
            },
        );
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
        Ok(self
            .clients
            .lock()
            .expect("client mutex poisoned")
            .get(id)
            .cloned())
    }

    fn record_selection(&self, id: &BriefId, expert: &ExpertId) -> Result<Brief, MatchStoreError> {
        let mut guard = self.briefs.lock().expect("brief mutex poisoned");
        let brief = guard.get_mut(id).ok_or(MatchStoreError::NotFound)?;
        brief.selected_expert_id = Some(expert.clone());
        brief.status = BriefStatus::ExpertSelected;
        Ok(brief.clone())
    }
}

#[derive(Default)]
pub struct MemoryInviteRepository {
    invites: Mutex<Vec<ExpertInvite>>,
}

impl MemoryInviteRepository {
    pub fn snapshot(&self) -> Vec<ExpertInvite> {
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
pub struct MemoryRunStore {
    runs: Mutex<Vec<MatchingRun>>,
}

impl MemoryRunStore {
    pub fn all(&self) -> Vec<MatchingRun> {
        self.runs.lock().expect("run mutex poisoned").clone()
    }
}

impl MatchingRunStore for MemoryRunStore {
    fn append(&self, run: MatchingRun) -> Result<MatchingRun, MatchStoreError> {
        self.runs
            .lock()
            .expect("run mutex poisoned")
            .push(run.clone());
        Ok(run)
    }

    fn for_brief(&self, id: &BriefId) -> Result<Vec<MatchingRun>, MatchStoreError> {
        Ok(self
            .runs
            .lock()
            .expect("run mutex poisoned")
            .iter()
            .filter(|run| &run.brief_id == id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryDispatchStore {
    outbox: Mutex<Vec<OutboxEntry>>,
    notifications: Mutex<Vec<InAppNotification>>,
    changes: Mutex<Vec<InviteChanged>>,
}

impl MemoryDispatchStore {
    pub fn outbox(&self) -> Vec<OutboxEntry> {
        self.outbox.lock().expect("outbox mutex poisoned").clone()
    }

    pub fn notifications(&self) -> Vec<InAppNotification> {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }

    pub fn changes(&self) -> Vec<InviteChanged> {
        self.changes.lock().expect("change mutex poisoned").clone()
    }
}

impl DispatchStore for MemoryDispatchStore {
    fn append_outbox(&self, entry: OutboxEntry) -> Result<OutboxEntry, DispatchStoreError> {
        self.outbox
            .lock()
            .expect("outbox mutex poisoned")
            .push(entry.clone());
        Ok(entry)
    }

    fn update_outbox(&self, entry: OutboxEntry) -> Result<(), DispatchStoreError> {
        let mut guard = self.outbox.lock().expect("outbox mutex poisoned");
        match guard.iter_mut().find(|row| row.id == entry.id) {
            Some(row) => {
                *row = entry;
                Ok(())
            }
            None => Err(DispatchStoreError::NotFound),
        }
    }

    fn append_notification(
        &self,
        notification: InAppNotification,
    ) -> Result<InAppNotification, DispatchStoreError> {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .push(notification.clone());
        Ok(notification)
    }

    fn mark_notification_read(
        &self,
        id: &NotificationId,
        now: DateTime<Utc>,
    ) -> Result<InAppNotification, DispatchStoreError> {
        let mut guard = self
            .notifications
            .lock()
            .expect("notification mutex poisoned");
        let row = guard
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(DispatchStoreError::NotFound)?;
        if row.read_at.is_none() {
            row.read_at = Some(now);
        }
        Ok(row.clone())
    }

    fn record_change(&self, change: InviteChanged) -> Result<(), DispatchStoreError> {
        self.changes
            .lock()
            .expect("change mutex poisoned")
            .push(change);
        Ok(())
    }
}

/// Delivers to every address except those listed as failing.
#[derive(Default)]
pub struct SelectiveEmail {
    pub failing: Vec<String>,
}

impl EmailSender for SelectiveEmail {
    fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<String, DeliveryError> {
        if self.failing.iter().any(|address| address == to) {
            return Err(DeliveryError::Transport("mailbox unavailable".to_string()));
        }
        Ok(format!("provider-{to}"))
    }
}
