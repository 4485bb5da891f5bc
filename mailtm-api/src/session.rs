use crate::auth::Token;
use crate::requests::GetDomainsRequest;
use parking_lot::RwLock;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tempbox_http::{Client, FromResponse, Method, Request, RequestBuilder};
use tracing::debug;

/// The mailbox the session is currently bound to.
#[derive(Clone)]
pub struct ActiveMailbox {
    /// Full email address of the mailbox.
    pub address: String,
    /// Bearer token issued for the mailbox.
    pub token: Token,
}

#[derive(Default)]
struct State {
    active: Option<ActiveMailbox>,
    domains: Option<Vec<String>>,
}

/// Process-wide holder of the active mailbox credentials and the cached domain list.
///
/// Replacing the active mailbox is a single wholesale write; requests snapshot the
/// token before any I/O, so an individual request uses either the old credentials or
/// the new ones, never a mix. Results of requests issued against a superseded mailbox
/// must be discarded by the caller (compare [`Session::active_address`] at request and
/// resolution time).
#[derive(Clone)]
pub struct Session {
    client: Arc<Client>,
    state: Arc<RwLock<State>>,
}

struct AuthRequest<T: Request> {
    token: Option<Token>,
    request: T,
}

impl<T: Request> Request for AuthRequest<T> {
    type Response = T::Response;
    const METHOD: Method = T::METHOD;

    fn url(&self) -> String {
        self.request.url()
    }

    fn build(&self, mut builder: RequestBuilder) -> tempbox_http::Result<RequestBuilder> {
        if let Some(token) = &self.token {
            builder = builder.bearer_token(token.0.expose_secret());
        } else {
            debug!("No active mailbox, sending request unauthenticated");
        }
        self.request.build(builder)
    }
}

impl Session {
    /// Create a new instance with a given `client` and no active mailbox.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Get http client.
    #[must_use]
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Atomically replace the active mailbox.
    pub fn set_active(&self, mailbox: ActiveMailbox) {
        self.state.write().active = Some(mailbox);
    }

    /// Address of the active mailbox, if any.
    #[must_use]
    pub fn active_address(&self) -> Option<String> {
        self.state.read().active.as_ref().map(|m| m.address.clone())
    }

    /// Whether a mailbox is currently active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.state.read().active.is_some()
    }

    /// The provisionable domains, fetched once and cached.
    ///
    /// A failed fetch leaves the cache untouched so the next call retries; an empty
    /// result is likewise not cached.
    ///
    /// # Errors
    /// Returns error if the request failed.
    pub fn domains(&self) -> tempbox_http::Result<Vec<String>> {
        if let Some(domains) = &self.state.read().domains {
            return Ok(domains.clone());
        }

        let response = self.execute_with_auth(GetDomainsRequest {})?;
        let domains: Vec<String> = response.map_or_else(Vec::new, |list| {
            list.members.into_iter().map(|d| d.domain).collect()
        });

        if !domains.is_empty() {
            self.state.write().domains = Some(domains.clone());
        }

        Ok(domains)
    }

    /// Execute a non-authenticated request with this client.
    ///
    /// # Errors
    /// Returns error if the request failed.
    pub fn execute<T: Request>(
        &self,
        request: T,
    ) -> tempbox_http::Result<<T::Response as FromResponse>::Output> {
        self.client.execute(&request)
    }

    /// Execute an authenticated request with this client.
    ///
    /// The token of the active mailbox is snapshotted before the request is issued.
    ///
    /// # Errors
    /// Returns error if the request failed.
    pub fn execute_with_auth<T: Request>(
        &self,
        request: T,
    ) -> tempbox_http::Result<<T::Response as FromResponse>::Output> {
        let token = self.state.read().active.as_ref().map(|m| m.token.clone());
        self.client.execute(&AuthRequest { token, request })
    }
}

pub const DEFAULT_HOST_URL: &str = "https://api.mail.tm/";
