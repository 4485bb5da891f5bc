//! Mailbox provisioning against the upstream provider, with a one-slot
//! background pre-fetch pipeline so that "new mailbox" requests are instant.

use crate::client::Error;
use mailtm_api::auth::Token;
use mailtm_api::requests::{PostAccountRequest, PostTokenRequest};
use mailtm_api::{ActiveMailbox, Session};
use parking_lot::Mutex;
use rand::Rng;
use secrecy::SecretString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, Level};

const ALIAS_LENGTH: usize = 8;
const PASSWORD_LENGTH: usize = 12;
const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Time to wait after a failed pre-fetch before trying again.
pub const PREFETCH_COOLDOWN: Duration = Duration::from_secs(30);

fn random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// A provisioned mailbox that has not been bound to the session yet.
struct ProvisionedMailbox {
    address: String,
    token: Token,
}

/// Mailbox provisioning engine.
///
/// Owns the pending pre-fetched mailbox and its in-flight guard. The guard is set
/// before the background thread is spawned, so two rapid triggers can never start
/// two provisioning round trips.
pub struct Provisioner {
    inner: Arc<Inner>,
}

struct Inner {
    session: Session,
    pending: Mutex<Option<ProvisionedMailbox>>,
    prefetching: AtomicBool,
    last_prefetch_failure: Mutex<Option<Instant>>,
    cooldown: Duration,
}

impl Provisioner {
    pub(crate) fn new(session: Session, cooldown: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                session,
                pending: Mutex::new(None),
                prefetching: AtomicBool::new(false),
                last_prefetch_failure: Mutex::new(None),
                cooldown,
            }),
        }
    }

    /// Generate a random mailbox and make it the active session.
    ///
    /// Consumes the pre-fetched mailbox when one is ready, otherwise provisions one
    /// synchronously. Either way the next pre-fetch is triggered before returning.
    ///
    /// # Errors
    /// Returns error if provisioning failed.
    #[tracing::instrument(level = Level::DEBUG, skip(self))]
    pub fn generate_random_mailbox(&self) -> Result<String, Error> {
        let pending = self.inner.pending.lock().take();
        let mailbox = match pending {
            Some(mailbox) => {
                debug!("Serving pre-fetched mailbox {}", mailbox.address);
                mailbox
            }
            None => self.inner.provision(None)?,
        };

        let address = mailbox.address.clone();
        self.inner.session.set_active(ActiveMailbox {
            address: mailbox.address,
            token: mailbox.token,
        });
        self.spawn_prefetch();
        Ok(address)
    }

    /// Register `address` verbatim and make it the active session.
    ///
    /// # Errors
    /// Returns [`Error::AddressTaken`] if the provider rejects the address as already
    /// in use; this is never retried.
    #[tracing::instrument(level = Level::DEBUG, skip(self))]
    pub fn create_custom_mailbox(&self, address: &str) -> Result<String, Error> {
        let mailbox = self.inner.provision(Some(address))?;
        let address = mailbox.address.clone();
        self.inner.session.set_active(ActiveMailbox {
            address: mailbox.address,
            token: mailbox.token,
        });
        self.spawn_prefetch();
        Ok(address)
    }

    /// Address of the pre-fetched mailbox, if one is ready.
    #[must_use]
    pub fn pending_address(&self) -> Option<String> {
        self.inner.pending.lock().as_ref().map(|m| m.address.clone())
    }

    /// Provision the next mailbox on a detached background thread.
    ///
    /// Skipped when a pending mailbox exists, a pre-fetch is already running, or a
    /// previous failure happened less than the cooldown ago. The thread communicates
    /// only through the pending slot and the failure timestamp.
    pub fn spawn_prefetch(&self) {
        if self.inner.pending.lock().is_some() {
            return;
        }

        if let Some(failed_at) = *self.inner.last_prefetch_failure.lock() {
            if failed_at.elapsed() < self.inner.cooldown {
                debug!("Skipping pre-fetch, last failure was {:?} ago", failed_at.elapsed());
                return;
            }
        }

        // Claim the guard before spawning so a concurrent trigger can not start a
        // second round trip.
        if self
            .inner
            .prefetching
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let spawned = std::thread::Builder::new()
            .name("tempbox-prefetch".to_owned())
            .spawn(move || {
                match inner.provision(None) {
                    Ok(mailbox) => {
                        debug!("Pre-fetched mailbox {}", mailbox.address);
                        *inner.pending.lock() = Some(mailbox);
                        *inner.last_prefetch_failure.lock() = None;
                    }
                    Err(e) => {
                        error!("Background mailbox pre-fetch failed: {e}");
                        *inner.last_prefetch_failure.lock() = Some(Instant::now());
                    }
                }
                inner.prefetching.store(false, Ordering::SeqCst);
            });

        if let Err(e) = spawned {
            error!("Failed to spawn pre-fetch thread: {e}");
            self.inner.prefetching.store(false, Ordering::SeqCst);
        }
    }
}

impl Inner {
    /// Create an account and issue its token.
    ///
    /// An account orphaned by a failed token issuance is not recovered; accounts are
    /// free and ephemeral on the provider side.
    fn provision(&self, explicit: Option<&str>) -> Result<ProvisionedMailbox, Error> {
        let address = match explicit {
            Some(address) => address.to_owned(),
            None => {
                let domains = self.session.domains().map_err(|e| {
                    error!("Failed to fetch domains: {e}");
                    Error::ServiceUnavailable(Some(e))
                })?;
                if domains.is_empty() {
                    error!("Provider returned no provisionable domains");
                    return Err(Error::ServiceUnavailable(None));
                }
                let domain = &domains[rand::thread_rng().gen_range(0..domains.len())];
                format!("{}@{domain}", random_string(ALIAS_LENGTH))
            }
        };

        let password = SecretString::new(random_string(PASSWORD_LENGTH));

        self.session
            .execute(PostAccountRequest::new(&address, &password))
            .map_err(|e| {
                if e.status() == Some(400) {
                    Error::AddressTaken(address.clone())
                } else {
                    Error::from(e)
                }
            })?;

        let token = self
            .session
            .execute(PostTokenRequest::new(&address, &password))?
            .token;

        Ok(ProvisionedMailbox { address, token })
    }
}

#[cfg(test)]
mod tests {
    use super::random_string;

    #[test]
    fn random_strings_use_the_lowercase_alphanumeric_charset() {
        for _ in 0..32 {
            let alias = random_string(8);
            assert_eq!(alias.len(), 8);
            assert!(alias
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
