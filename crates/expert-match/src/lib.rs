//! Matching, invitation, and selection engine for the expert marketplace.
//!
//! The crate turns a client brief and a pool of candidate experts into a
//! ranked shortlist, drives time-boxed invitations through their response
//! lifecycle, finalizes exactly one winning expert per brief, and fans the
//! resulting events out to email and in-app notifications.

pub mod config;
pub mod error;
pub mod invitations;
pub mod matching;
pub mod notifications;
pub mod router;
pub mod telemetry;
