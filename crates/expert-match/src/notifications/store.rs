use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::events::InviteChanged;

/// Identifier wrapper for outbox rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutboxId(pub String);

/// Identifier wrapper for in-app notification rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

/// Delivery state of one outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutboxStatus {
    Queued,
    Sent,
    Failed { error: String },
}

/// One rendered email awaiting (or past) delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboxEntry {
    pub id: OutboxId,
    pub template: &'static str,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub status: OutboxStatus,
    pub provider_id: Option<String>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

/// One in-app notification. Written unconditionally at dispatch time so the
/// recipient always sees in-product state, even when email fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InAppNotification {
    pub id: NotificationId,
    pub recipient_id: String,
    pub template: &'static str,
    pub title: String,
    pub body: String,
    pub call_to_action: String,
    /// Set once on first read; later reads keep the original timestamp, so
    /// at-least-once redelivery stays harmless.
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Storage for the dispatch-time record pair (outbox + in-app rows) and the
/// realtime change feed.
pub trait DispatchStore: Send + Sync {
    fn append_outbox(&self, entry: OutboxEntry) -> Result<OutboxEntry, DispatchStoreError>;
    fn update_outbox(&self, entry: OutboxEntry) -> Result<(), DispatchStoreError>;
    fn append_notification(
        &self,
        notification: InAppNotification,
    ) -> Result<InAppNotification, DispatchStoreError>;
    /// Set-once: the first call stamps `read_at`, every later call returns
    /// the row unchanged.
    fn mark_notification_read(
        &self,
        id: &NotificationId,
        now: DateTime<Utc>,
    ) -> Result<InAppNotification, DispatchStoreError>;
    fn record_change(&self, change: InviteChanged) -> Result<(), DispatchStoreError>;
}

/// Error enumeration for dispatch storage failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchStoreError {
    #[error("record not found")]
    NotFound,
    #[error("dispatch store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound email transport. Returns the provider's message id.
pub trait EmailSender: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, DeliveryError>;
}

/// Email transport failure. Recorded on the outbox row, never propagated
/// as a business error.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
}
