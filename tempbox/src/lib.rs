//! Core engines for a disposable-mailbox client: provisioning with background
//! pre-fetch, message polling with id-set reconciliation and on-demand detail
//! fetching, all behind the [`Tempbox`] facade.
//!
//! Polling cadence is caller-scheduled; this crate exposes no timers of its own.

pub mod client;
pub mod inbox;
pub mod mailbox;

pub use client::{Error, Tempbox};
pub use inbox::PollOutput;

pub use mailtm_api;
pub use tempbox_http as http;
