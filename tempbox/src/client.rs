//! Client-context facade owning the session, the provisioning engine and the inbox.

use crate::inbox::{Inbox, PollOutput};
use crate::mailbox::{Provisioner, PREFETCH_COOLDOWN};
use mailtm_api::domain::message::{Detail, Id};
use mailtm_api::requests::{GetAttachmentRequest, GetMessageRequest};
use mailtm_api::Session;
use std::sync::Arc;
use std::time::Duration;
use tempbox_http::Client;
use tracing::error;

/// Errors surfaced by the mailbox client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An authenticated operation was invoked with no active mailbox.
    #[error("Not authenticated.")]
    NotAuthenticated,
    /// Account creation was rejected because the address exists. Recoverable by
    /// retrying with a different alias.
    #[error("Address '{0}' is already taken. Please try another.")]
    AddressTaken(String),
    /// The domain list could not be retrieved.
    #[error("Service temporarily unavailable. Could not fetch domains.")]
    ServiceUnavailable(#[source] Option<tempbox_http::Error>),
    /// The provider returned nothing for a valid-looking message id.
    #[error("Message with ID {0} not found or could not be loaded.")]
    MessageNotFound(String),
    /// A response declared as json could not be parsed.
    #[error("Received invalid data from the server.")]
    InvalidData(#[source] serde_json::Error),
    /// Any other http failure, including transient errors that exhausted retries.
    #[error("Http: {0}")]
    Http(#[source] tempbox_http::Error),
}

impl From<tempbox_http::Error> for Error {
    fn from(value: tempbox_http::Error) -> Self {
        match value {
            tempbox_http::Error::Json(e) => Self::InvalidData(e),
            e => Self::Http(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Builder for [`Tempbox`].
pub struct Builder {
    client: Arc<Client>,
    prefetch_cooldown: Duration,
}

impl Builder {
    /// Time to wait after a failed background pre-fetch before trying again.
    #[must_use]
    pub fn prefetch_cooldown(mut self, cooldown: Duration) -> Self {
        self.prefetch_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn build(self) -> Tempbox {
        let session = Session::new(self.client);
        Tempbox {
            provisioner: Provisioner::new(session.clone(), self.prefetch_cooldown),
            inbox: Inbox::new(session.clone()),
            session,
        }
    }
}

/// Disposable-mailbox client main entry point.
///
/// None of the operations support cancellation; results of requests issued against a
/// superseded mailbox must be discarded by comparing [`Tempbox::active_address`] at
/// request and at resolution time.
pub struct Tempbox {
    session: Session,
    provisioner: Provisioner,
    inbox: Inbox,
}

impl Tempbox {
    /// Create a new instance with default settings on `client`.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self::builder(client).build()
    }

    /// Create a new builder on `client`.
    #[must_use]
    pub fn builder(client: Arc<Client>) -> Builder {
        Builder {
            client,
            prefetch_cooldown: PREFETCH_COOLDOWN,
        }
    }

    /// Access the underlying [`Session`].
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Address of the active mailbox, if any.
    #[must_use]
    pub fn active_address(&self) -> Option<String> {
        self.session.active_address()
    }

    /// Address of the pre-fetched spare mailbox, if one is ready.
    #[must_use]
    pub fn pending_address(&self) -> Option<String> {
        self.provisioner.pending_address()
    }

    /// The provisionable domains, cached after the first successful fetch.
    ///
    /// # Errors
    /// Returns [`Error::ServiceUnavailable`] if the list could not be retrieved.
    pub fn domains(&self) -> Result<Vec<String>> {
        let domains = self.session.domains().map_err(|e| {
            error!("Failed to fetch domains: {e}");
            Error::ServiceUnavailable(Some(e))
        })?;
        if domains.is_empty() {
            return Err(Error::ServiceUnavailable(None));
        }
        Ok(domains)
    }

    /// Replace the active mailbox with a freshly generated random one.
    ///
    /// Served from the pre-fetched spare when available. The known message ids of
    /// the previous mailbox are forgotten.
    ///
    /// # Errors
    /// Returns error if provisioning failed.
    pub fn generate_random_mailbox(&self) -> Result<String> {
        let address = self.provisioner.generate_random_mailbox()?;
        self.inbox.clear();
        Ok(address)
    }

    /// Replace the active mailbox with one registered under `address` verbatim.
    ///
    /// # Errors
    /// Returns [`Error::AddressTaken`] when the provider reports the address as
    /// already in use; this is surfaced, never retried.
    pub fn create_custom_mailbox(&self, address: &str) -> Result<String> {
        let address = self.provisioner.create_custom_mailbox(address)?;
        self.inbox.clear();
        Ok(address)
    }

    /// Warm the pre-fetch slot without replacing the active mailbox.
    pub fn prefetch(&self) {
        self.provisioner.spawn_prefetch();
    }

    /// Poll the active mailbox. See [`Inbox::poll`].
    pub fn poll(&self) -> Option<PollOutput> {
        self.inbox.poll()
    }

    /// Fetch the full message with `id`.
    ///
    /// # Errors
    /// Returns [`Error::MessageNotFound`] if the provider produced an empty body for
    /// the id, [`Error::NotAuthenticated`] if no mailbox is active.
    pub fn message(&self, id: &Id) -> Result<Detail> {
        if !self.session.has_active() {
            return Err(Error::NotAuthenticated);
        }

        let detail = self.session.execute_with_auth(GetMessageRequest::new(id))?;
        detail.ok_or_else(|| Error::MessageNotFound(id.to_string()))
    }

    /// Download the attachment `attachment_id` of message `message_id`.
    ///
    /// # Errors
    /// Returns [`Error::NotAuthenticated`] if no mailbox is active, or the http error
    /// if the download failed.
    pub fn attachment(&self, message_id: &Id, attachment_id: &str) -> Result<Vec<u8>> {
        if !self.session.has_active() {
            return Err(Error::NotAuthenticated);
        }

        Ok(self
            .session
            .execute_with_auth(GetAttachmentRequest::new(message_id, attachment_id))?)
    }
}
