use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

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

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Briefs, candidate profiles, and client contacts, owned by external
/// subsystems in production and seeded in-memory here.
#[derive(Default)]
pub(crate) struct InMemoryMarketplace {
    briefs: Mutex<HashMap<BriefId, Brief>>,
    candidates: Mutex<Vec<CandidateProfile>>,
    clients: Mutex<HashMap<ClientId, Contact>>,
}

impl InMemoryMarketplace {
    pub(crate) fn insert_brief(&self, brief: Brief) {
        self.briefs
            .lock()
            .expect("brief mutex poisoned")
            .insert(brief.id.clone(), brief);
    }

    pub(crate) fn insert_candidate(&self, candidate: CandidateProfile) {
        self.candidates
            .lock()
            .expect("candidate mutex poisoned")
            .push(candidate);
    }

    pub(crate) fn insert_client(&self, contact: Contact) {
        self.clients
            .lock()
            .expect("client mutex poisoned")
            .insert(ClientId(contact.id.clone()), contact);
    }
}

impl MarketplaceStore for InMemoryMarketplace {
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

/// Invite rows behind a single mutex; `finalize_selection` reads, plans,
/// and writes under one lock, which is the serializing boundary the
/// repository contract requires.
#[derive(Default)]
pub(crate) struct InMemoryInviteRepository {
    invites: Mutex<Vec<ExpertInvite>>,
}

impl InviteRepository for InMemoryInviteRepository {
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
pub(crate) struct InMemoryRunStore {
    runs: Mutex<Vec<MatchingRun>>,
}

impl MatchingRunStore for InMemoryRunStore {
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
pub(crate) struct InMemoryDispatchStore {
    outbox: Mutex<Vec<OutboxEntry>>,
    notifications: Mutex<Vec<InAppNotification>>,
    changes: Mutex<Vec<InviteChanged>>,
}

impl InMemoryDispatchStore {
    pub(crate) fn outbox(&self) -> Vec<OutboxEntry> {
        self.outbox.lock().expect("outbox mutex poisoned").clone()
    }

    pub(crate) fn notifications(&self) -> Vec<InAppNotification> {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }

    pub(crate) fn changes(&self) -> Vec<InviteChanged> {
        self.changes.lock().expect("change mutex poisoned").clone()
    }
}

impl DispatchStore for InMemoryDispatchStore {
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

/// Email transport that logs instead of sending. Swapped for a real
/// provider adapter in production deployments.
#[derive(Default)]
pub(crate) struct LoggingEmailSender;

impl EmailSender for LoggingEmailSender {
    fn send(&self, to: &str, subject: &str, _body: &str) -> Result<String, DeliveryError> {
        info!(recipient = %to, subject = %subject, "email handed to transport");
        Ok(format!("local-{to}"))
    }
}

/// The admin settings a fresh deployment starts with: default weights plus
/// a starter synonym table for common tool and industry aliases.
pub(crate) fn default_admin_settings() -> BTreeMap<String, serde_json::Value> {
    let mut settings = BTreeMap::new();
    settings.insert(
        "tool_synonyms".to_string(),
        json!({
            "hubspot": ["hubspot crm"],
            "chatgpt": ["gpt-4", "openai"],
            "google analytics": ["ga4"],
        }),
    );
    settings.insert(
        "industry_synonyms".to_string(),
        json!({
            "saas": ["software", "b2b saas"],
            "ecommerce": ["e-commerce", "online retail"],
        }),
    );
    settings
}

pub(crate) fn default_match_settings() -> MatchSettings {
    MatchSettings::from_admin_settings(&default_admin_settings())
}

/// Seed one brief and a small candidate pool so the service and the demo
/// have something to match against.
pub(crate) fn seed_marketplace(marketplace: &InMemoryMarketplace) -> BriefId {
    let brief_id = BriefId("brief-000001".to_string());

    marketplace.insert_client(Contact {
        id: "client-aster".to_string(),
        display_name: "Aster Labs".to_string(),
        email: "ops@asterlabs.example".to_string(),
    });

    marketplace.insert_brief(Brief {
        id: brief_id.clone(),
        client_id: ClientId("client-aster".to_string()),
        headline: "Lift inbound pipeline for a B2B SaaS".to_string(),
        details: json!({
            "outcome_tags": ["lead generation", "content strategy"],
            "tools": ["HubSpot", "Google Analytics"],
            "industry": "SaaS",
            "budget_min": 3000,
            "budget_max": 8000,
            "urgency": "urgent",
        }),
        status: BriefStatus::Submitted,
        selected_expert_id: None,
    });

    marketplace.insert_candidate(CandidateProfile {
        expert_id: ExpertId("expert-anna".to_string()),
        display_name: "Anna Kovacs".to_string(),
        email: "anna@example.com".to_string(),
        outcome_preferences: vec![
            "lead generation".to_string(),
            "content strategy".to_string(),
        ],
        tools: vec!["HubSpot CRM".to_string(), "GA4".to_string()],
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
    });

    marketplace.insert_candidate(CandidateProfile {
        expert_id: ExpertId("expert-ben".to_string()),
        display_name: "Ben Ortega".to_string(),
        email: "ben@example.com".to_string(),
        outcome_preferences: vec!["lead generation".to_string()],
        tools: vec!["HubSpot".to_string()],
        industries: vec!["saas".to_string()],
        weekly_hours: 45,
        band_min: Some(3500),
        band_max: Some(6000),
        certifications: vec![Certification {
            tool: "HubSpot".to_string(),
            status: CertificationStatus::Pending,
        }],
        case_studies: vec![CaseStudy {
            title: "Content engine for Acme".to_string(),
            outcome_tags: vec!["content strategy".to_string()],
            verified: true,
        }],
    });

    marketplace.insert_candidate(CandidateProfile {
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
    });

    brief_id
}
