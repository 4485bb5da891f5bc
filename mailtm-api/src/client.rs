use crate::session::DEFAULT_HOST_URL;
use tempbox_http::{Client, ClientBuilder};

pub trait MailtmExtension {
    /// Prepare a client builder for the default mail.tm server.
    fn mailtm_client() -> ClientBuilder;
}

impl MailtmExtension for Client {
    fn mailtm_client() -> ClientBuilder {
        // This should never fail.
        let base_url = tempbox_http::url::Url::parse(DEFAULT_HOST_URL).unwrap();
        Client::builder(base_url)
    }
}
