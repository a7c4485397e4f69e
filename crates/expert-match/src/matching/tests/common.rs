use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::matching::domain::{
    Brief, BriefId, BriefStatus, CandidateProfile, CaseStudy, Certification, CertificationStatus,
    ClientId, Contact, ExpertId, MatchingRun,
};
use crate::matching::repository::{MarketplaceStore, MatchStoreError, MatchingRunStore};
use crate::matching::settings::MatchSettings;

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).single().expect("valid timestamp")
}

pub(super) fn match_settings() -> MatchSettings {
    let mut admin = BTreeMap::new();
    admin.insert(
        "tool_synonyms".to_string(),
        json!({"hubspot": ["hubspot crm"], "chatgpt": ["gpt-4"]}),
    );
    admin.insert("industry_synonyms".to_string(), json!({"saas": ["software"]}));
    MatchSettings::from_admin_settings(&admin)
}

pub(super) fn brief() -> Brief {
    Brief {
        id: BriefId("brief-growth".to_string()),
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

pub(super) fn strong_candidate() -> CandidateProfile {
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

pub(super) fn partial_candidate() -> CandidateProfile {
    CandidateProfile {
        expert_id: ExpertId("expert-ben".to_string()),
        display_name: "Ben Ortega".to_string(),
        email: "ben@example.com".to_string(),
        outcome_preferences: vec!["lead generation".to_string()],
        tools: vec!["Salesforce".to_string()],
        industries: vec!["retail".to_string()],
        weekly_hours: 15,
        band_min: Some(9000),
        band_max: Some(12000),
        certifications: Vec::new(),
        case_studies: Vec::new(),
    }
}

pub(super) fn uncertified_candidate() -> CandidateProfile {
    CandidateProfile {
        expert_id: ExpertId("expert-cleo".to_string()),
        display_name: "Cleo Marsh".to_string(),
        email: "cleo@example.com".to_string(),
        outcome_preferences: vec![
            "lead generation".to_string(),
            "content strategy".to_string(),
        ],
        tools: vec!["HubSpot".to_string()],
        industries: vec!["saas".to_string()],
        weekly_hours: 45,
        band_min: Some(3500),
        band_max: Some(6500),
        certifications: vec![Certification {
            tool: "HubSpot".to_string(),
            status: CertificationStatus::Pending,
        }],
        case_studies: vec![CaseStudy {
            title: "Content engine for Acme".to_string(),
            outcome_tags: vec!["content strategy".to_string()],
            verified: true,
        }],
    }
}

#[derive(Default)]
pub(super) struct MemoryMarketplace {
    briefs: Mutex<HashMap<BriefId, Brief>>,
    candidates: Mutex<Vec<CandidateProfile>>,
    clients: Mutex<HashMap<ClientId, Contact>>,
}

impl MemoryMarketplace {
    pub(super) fn seeded(brief: Brief, candidates: Vec<CandidateProfile>) -> Arc<Self> {
        let store = Self::default();
        store
            .clients
            .lock()
            .expect("client mutex poisoned")
            .insert(
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
pub(super) struct MemoryRunStore {
    runs: Mutex<Vec<MatchingRun>>,
}

impl MemoryRunStore {
    pub(super) fn all(&self) -> Vec<MatchingRun> {
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
