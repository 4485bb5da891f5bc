//! Typed bindings for mail.tm compatible disposable email providers.

pub mod auth;
pub mod client;
pub mod domain;
pub mod requests;
pub mod session;

#[cfg(feature = "mocks")]
pub mod mocks;

pub use session::{ActiveMailbox, Session};
pub use tempbox_http as http;
