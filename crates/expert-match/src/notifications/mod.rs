//! Event dispatch: lifecycle transitions fan out to email and in-app
//! notifications, strictly after the business operation that produced them.

pub mod dispatcher;
pub mod events;
pub mod store;
pub mod templates;

pub use dispatcher::{DeliveryRecord, DispatchSummary, EventDispatcher};
pub use events::{InviteChanged, MatchEvent};
pub use store::{
    DeliveryError, DispatchStore, DispatchStoreError, EmailSender, InAppNotification,
    NotificationId, OutboxEntry, OutboxId, OutboxStatus,
};
pub use templates::RenderedMessage;
