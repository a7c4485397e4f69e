use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::matching::domain::Contact;
use crate::matching::repository::MarketplaceStore;

use super::events::{Audience, MatchEvent};
use super::store::{
    DispatchStore, EmailSender, InAppNotification, NotificationId, OutboxEntry, OutboxId,
    OutboxStatus,
};
use super::templates;

static OUTBOX_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_outbox_id() -> OutboxId {
    let id = OUTBOX_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OutboxId(format!("outbox-{id:06}"))
}

fn next_notification_id() -> NotificationId {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NotificationId(format!("notif-{id:06}"))
}

/// What happened for one recipient of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub recipient: String,
    pub template: &'static str,
    pub emailed: bool,
    pub error: Option<String>,
}

/// Dispatch result handed back to callers for logging and demos. Carries
/// no failure semantics: delivery problems never fail the business
/// operation that triggered the event.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSummary {
    pub event: &'static str,
    pub deliveries: Vec<DeliveryRecord>,
    pub change_recorded: bool,
}

/// Fans lifecycle events out to email and in-app notifications.
///
/// Called strictly after the triggering operation commits, never inside
/// it. Delivery is at-least-once and per-recipient independent: one
/// recipient's email failure neither blocks siblings nor rolls anything
/// back.
pub struct EventDispatcher<S, E, M> {
    store: Arc<S>,
    email: Arc<E>,
    directory: Arc<M>,
}

impl<S, E, M> EventDispatcher<S, E, M>
where
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
    M: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, email: Arc<E>, directory: Arc<M>) -> Self {
        Self {
            store,
            email,
            directory,
        }
    }

    pub fn dispatch(&self, event: &MatchEvent, now: DateTime<Utc>) -> DispatchSummary {
        let template = event.template();
        let brief_headline = self.brief_headline(event);
        let recipients = self.resolve_recipients(event);

        let mut deliveries = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            deliveries.push(self.deliver_to(event, &brief_headline, &recipient, now));
        }

        let mut change_recorded = false;
        if let Some(change) = event.invite_change() {
            match self.store.record_change(change) {
                Ok(()) => change_recorded = true,
                Err(err) => error!(error = %err, template, "failed to record invite change"),
            }
        }

        info!(
            template,
            recipients = deliveries.len(),
            failures = deliveries.iter().filter(|record| record.error.is_some()).count(),
            "event dispatched"
        );

        DispatchSummary {
            event: template,
            deliveries,
            change_recorded,
        }
    }

    fn deliver_to(
        &self,
        event: &MatchEvent,
        brief_headline: &str,
        recipient: &Contact,
        now: DateTime<Utc>,
    ) -> DeliveryRecord {
        let rendered = templates::render(event, brief_headline, recipient);

        let mut entry = OutboxEntry {
            id: next_outbox_id(),
            template: rendered.template,
            recipient_email: recipient.email.clone(),
            subject: rendered.subject.clone(),
            body: rendered.body.clone(),
            status: OutboxStatus::Queued,
            provider_id: None,
            attempts: 0,
            created_at: now,
        };
        if let Err(err) = self.store.append_outbox(entry.clone()) {
            error!(error = %err, recipient = %recipient.email, "failed to queue outbox row");
        }

        // One retry on email failure; nothing else in this core is
        // auto-retried.
        let mut email_error = None;
        for attempt in 1..=2u32 {
            entry.attempts = attempt;
            match self
                .email
                .send(&recipient.email, &rendered.subject, &rendered.body)
            {
                Ok(provider_id) => {
                    entry.status = OutboxStatus::Sent;
                    entry.provider_id = Some(provider_id);
                    email_error = None;
                    break;
                }
                Err(err) => {
                    debug!(
                        error = %err,
                        recipient = %recipient.email,
                        attempt,
                        "email delivery attempt failed"
                    );
                    email_error = Some(err.to_string());
                }
            }
        }
        if let Some(error) = &email_error {
            entry.status = OutboxStatus::Failed {
                error: error.clone(),
            };
            error!(error = %error, recipient = %recipient.email, "email delivery failed");
        }
        if let Err(err) = self.store.update_outbox(entry.clone()) {
            error!(error = %err, recipient = %recipient.email, "failed to update outbox row");
        }

        // In-app creation is not gated on email delivery success.
        let notification = InAppNotification {
            id: next_notification_id(),
            recipient_id: recipient.id.clone(),
            template: rendered.template,
            title: rendered.title,
            body: rendered.body,
            call_to_action: rendered.call_to_action,
            read_at: None,
            created_at: now,
        };
        if let Err(err) = self.store.append_notification(notification) {
            error!(error = %err, recipient = %recipient.id, "failed to write in-app notification");
        }

        DeliveryRecord {
            recipient: recipient.email.clone(),
            template: rendered.template,
            emailed: email_error.is_none(),
            error: email_error,
        }
    }

    fn brief_headline(&self, event: &MatchEvent) -> String {
        match self.directory.brief(event.brief_id()) {
            Ok(Some(brief)) => brief.headline,
            Ok(None) => {
                debug!(brief_id = %event.brief_id().0, "brief missing during dispatch");
                "your brief".to_string()
            }
            Err(err) => {
                error!(error = %err, "brief lookup failed during dispatch");
                "your brief".to_string()
            }
        }
    }

    fn resolve_recipients(&self, event: &MatchEvent) -> Vec<Contact> {
        let mut recipients = Vec::with_capacity(2);
        let audience = event.audience();

        if matches!(audience, Audience::Expert | Audience::ExpertAndClient) {
            match self.directory.candidate(event.expert_id()) {
                Ok(Some(profile)) => recipients.push(profile.contact()),
                Ok(None) => {
                    error!(expert_id = %event.expert_id().0, "expert profile missing for dispatch")
                }
                Err(err) => error!(error = %err, "expert lookup failed during dispatch"),
            }
        }

        if matches!(audience, Audience::Client | Audience::ExpertAndClient) {
            let client = self
                .directory
                .brief(event.brief_id())
                .ok()
                .flatten()
                .map(|brief| brief.client_id);
            match client {
                Some(client_id) => match self.directory.client_contact(&client_id) {
                    Ok(Some(contact)) => recipients.push(contact),
                    Ok(None) => {
                        error!(client_id = %client_id.0, "client contact missing for dispatch")
                    }
                    Err(err) => error!(error = %err, "client lookup failed during dispatch"),
                },
                None => debug!("no brief, skipping client recipient"),
            }
        }

        recipients
    }
}
