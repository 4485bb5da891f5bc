use mailtm_api::auth::Token;
use mailtm_api::mocks::mockito;
use mailtm_api::ActiveMailbox;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempbox::http::Client;
use tempbox::Tempbox;

/// Create a client against a mock server with fast retries and the given
/// pre-fetch cooldown.
pub fn new_tempbox_and_server(prefetch_cooldown: Duration) -> (Tempbox, mockito::Server) {
    let server = mailtm_api::mocks::new();
    let mut url = server.url();
    if !url.ends_with('/') {
        url.push('/');
    }
    let url = tempbox::http::url::Url::parse(&url).unwrap();
    let client: Arc<Client> = Client::builder(url)
        .allow_http()
        .retry_base_delay(Duration::from_millis(5))
        .build()
        .expect("Failed to build client");
    let tempbox = Tempbox::builder(client)
        .prefetch_cooldown(prefetch_cooldown)
        .build();
    (tempbox, server)
}

/// Bind the client to a mailbox using the default mock token.
#[allow(dead_code)]
pub fn activate_default_mailbox(tempbox: &Tempbox) {
    tempbox.session().set_active(ActiveMailbox {
        address: mailtm_api::mocks::DEFAULT_ADDRESS.to_owned(),
        token: Token::new(SecretString::new(
            mailtm_api::mocks::DEFAULT_TOKEN.to_owned(),
        )),
    });
}

/// Wait until `predicate` holds or the timeout expires.
#[allow(dead_code)]
pub fn wait_for(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    predicate()
}
