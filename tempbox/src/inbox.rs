//! Message polling and reconciliation.
//!
//! The provider has no "since" cursor; every poll returns the full summary list.
//! The inbox tracks every id it has ever surfaced for the current mailbox and
//! classifies each polled message as already seen or new, which keeps the result
//! stable under provider-side re-ordering.

use mailtm_api::domain::message::{Id, Summary};
use mailtm_api::requests::GetMessagesRequest;
use mailtm_api::Session;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// Result of a single poll.
#[derive(Debug)]
pub struct PollOutput {
    /// The full current message list, for display.
    pub messages: Vec<Summary>,
    /// The subset never surfaced before, for notification side effects.
    pub new: Vec<Summary>,
}

/// Message polling engine.
pub struct Inbox {
    session: Session,
    known_ids: Mutex<HashSet<Id>>,
    polling: AtomicBool,
}

impl Inbox {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            known_ids: Mutex::new(HashSet::new()),
            polling: AtomicBool::new(false),
        }
    }

    /// Poll the provider for the current message list.
    ///
    /// Returns `None` without surfacing an error when no mailbox is active, a poll
    /// is already in flight (the newly triggered poll is dropped, not queued), or
    /// the fetch failed after retries. Polling runs unattended on a caller-side
    /// timer; the next tick simply retries.
    pub fn poll(&self) -> Option<PollOutput> {
        if !self.session.has_active() {
            debug!("No active mailbox, skipping poll");
            return None;
        }

        if self
            .polling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Poll already in flight, skipping");
            return None;
        }

        let output = match self.session.execute_with_auth(GetMessagesRequest {}) {
            Ok(response) => {
                let messages = response.map_or_else(Vec::new, |list| list.members);

                let mut known = self.known_ids.lock();
                let new: Vec<Summary> = messages
                    .iter()
                    .filter(|message| !known.contains(&message.id))
                    .cloned()
                    .collect();
                for message in &new {
                    known.insert(message.id.clone());
                }
                drop(known);

                if !new.is_empty() {
                    debug!("Poll returned {} new message(s)", new.len());
                }
                Some(PollOutput { messages, new })
            }
            Err(e) => {
                error!("Failed to fetch messages: {e}");
                None
            }
        };

        self.polling.store(false, Ordering::SeqCst);
        output
    }

    /// Forget every id observed so far. Called whenever the mailbox is replaced.
    pub fn clear(&self) {
        self.known_ids.lock().clear();
    }
}
