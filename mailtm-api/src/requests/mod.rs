//! Representation of all the JSON data types that need to be submitted.

use crate::auth::Token;
use crate::domain::message::{Detail, Id, Summary};
use crate::domain::Domain;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tempbox_http::{
    BytesResponse, JsonResponse, Method, NoResponse, OptionalJsonResponse, RequestBuilder,
};

/// List envelope used by the provider on collection endpoints.
#[derive(Deserialize)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
pub struct HydraList<T> {
    #[serde(rename = "hydra:member", default = "Vec::new")]
    pub members: Vec<T>,
}

/// Fetch the list of provisionable domains.
#[derive(Copy, Clone)]
pub struct GetDomainsRequest;

impl tempbox_http::Request for GetDomainsRequest {
    type Response = OptionalJsonResponse<HydraList<Domain>>;
    const METHOD: Method = Method::Get;

    fn url(&self) -> String {
        "domains".to_owned()
    }

    fn build(&self, builder: RequestBuilder) -> tempbox_http::Result<RequestBuilder> {
        Ok(builder.header("Accept", "application/ld+json"))
    }
}

/// Create a new account. One of the two unauthenticated bootstrap endpoints.
pub struct PostAccountRequest<'a> {
    address: &'a str,
    password: &'a SecretString,
}

impl<'a> PostAccountRequest<'a> {
    #[must_use]
    pub fn new(address: &'a str, password: &'a SecretString) -> Self {
        Self { address, password }
    }
}

impl tempbox_http::Request for PostAccountRequest<'_> {
    type Response = NoResponse;
    const METHOD: Method = Method::Post;

    fn url(&self) -> String {
        "accounts".to_owned()
    }

    fn build(&self, builder: RequestBuilder) -> tempbox_http::Result<RequestBuilder> {
        Ok(builder
            .header("Accept", "application/json")
            .json(serde_json::json!({
                "address": self.address,
                "password": self.password.expose_secret(),
            })))
    }
}

#[doc(hidden)]
#[derive(Deserialize)]
pub struct PostTokenResponse {
    pub token: Token,
}

/// Issue a bearer token for an account. One of the two unauthenticated bootstrap endpoints.
pub struct PostTokenRequest<'a> {
    address: &'a str,
    password: &'a SecretString,
}

impl<'a> PostTokenRequest<'a> {
    #[must_use]
    pub fn new(address: &'a str, password: &'a SecretString) -> Self {
        Self { address, password }
    }
}

impl tempbox_http::Request for PostTokenRequest<'_> {
    type Response = JsonResponse<PostTokenResponse>;
    const METHOD: Method = Method::Post;

    fn url(&self) -> String {
        "token".to_owned()
    }

    fn build(&self, builder: RequestBuilder) -> tempbox_http::Result<RequestBuilder> {
        Ok(builder
            .header("Accept", "application/json")
            .json(serde_json::json!({
                "address": self.address,
                "password": self.password.expose_secret(),
            })))
    }
}

/// Fetch the current message summaries of the active mailbox.
#[derive(Copy, Clone)]
pub struct GetMessagesRequest;

impl tempbox_http::Request for GetMessagesRequest {
    type Response = OptionalJsonResponse<HydraList<Summary>>;
    const METHOD: Method = Method::Get;

    fn url(&self) -> String {
        "messages".to_owned()
    }

    fn build(&self, builder: RequestBuilder) -> tempbox_http::Result<RequestBuilder> {
        Ok(builder.header("Accept", "application/ld+json"))
    }
}

/// Fetch a full message by id.
pub struct GetMessageRequest<'a> {
    id: &'a Id,
}

impl<'a> GetMessageRequest<'a> {
    #[must_use]
    pub fn new(id: &'a Id) -> Self {
        Self { id }
    }
}

impl tempbox_http::Request for GetMessageRequest<'_> {
    type Response = OptionalJsonResponse<Detail>;
    const METHOD: Method = Method::Get;

    fn url(&self) -> String {
        format!("messages/{}", self.id)
    }

    fn build(&self, builder: RequestBuilder) -> tempbox_http::Result<RequestBuilder> {
        Ok(builder.header("Accept", "application/ld+json"))
    }
}

/// Download a message attachment as raw bytes.
pub struct GetAttachmentRequest<'a> {
    message_id: &'a Id,
    attachment_id: &'a str,
}

impl<'a> GetAttachmentRequest<'a> {
    #[must_use]
    pub fn new(message_id: &'a Id, attachment_id: &'a str) -> Self {
        Self {
            message_id,
            attachment_id,
        }
    }
}

impl tempbox_http::Request for GetAttachmentRequest<'_> {
    type Response = BytesResponse;
    const METHOD: Method = Method::Get;

    fn url(&self) -> String {
        format!(
            "messages/{}/attachments/{}",
            self.message_id, self.attachment_id
        )
    }
}
