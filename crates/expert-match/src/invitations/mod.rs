//! Invitation lifecycle and winner selection.
//!
//! An `ExpertInvite` is the central stateful record of the subsystem: one
//! row per (brief, expert), never deleted, driven from `sent` through
//! expert responses to a terminal `selected`/`not_selected`. Expiry is
//! derived from `expires_at` at read time and never persisted.

pub mod domain;
pub mod repository;
pub mod selection;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ExpertInvite, InviteAction, InviteId, InviteStatus, ProposalDetails};
pub use repository::{InviteRepository, InviteRepositoryError};
pub use selection::{
    plan_selection, SelectionCoordinator, SelectionError, SelectionMode, SelectionOutcome,
    SelectionTransition,
};
pub use service::{InvitationService, InviteError};
