use mailtm_api::auth::Token;
use mailtm_api::http::Client;
use mailtm_api::mocks::mockito;
use mailtm_api::{ActiveMailbox, Session};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

/// Create a new session backed by a mock server.
pub fn new_session_and_server() -> (Session, mockito::Server) {
    let server = mailtm_api::mocks::new();
    let mut url = server.url();
    if !url.ends_with('/') {
        url.push('/');
    }
    let url = mailtm_api::http::url::Url::parse(&url).unwrap();
    let client: Arc<Client> = Client::builder(url)
        .allow_http()
        .retry_base_delay(Duration::from_millis(5))
        .build()
        .expect("Failed to build client");
    (Session::new(client), server)
}

/// Bind the session to a mailbox using the default mock token.
#[allow(dead_code)]
pub fn activate_default_mailbox(session: &Session) {
    session.set_active(ActiveMailbox {
        address: mailtm_api::mocks::DEFAULT_ADDRESS.to_owned(),
        token: Token::new(SecretString::new(
            mailtm_api::mocks::DEFAULT_TOKEN.to_owned(),
        )),
    });
}
