use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// Opaque provider-assigned message id, stable and unique within a mailbox lifetime.
#[derive(Debug, Deserialize, Eq, PartialEq, Hash, Clone)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
#[serde(transparent)]
pub struct Id(pub String);

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: Into<String>> From<T> for Id {
    fn from(value: T) -> Self {
        Self(value.into())
    }
}

/// Sender or recipient address.
#[derive(Debug, Deserialize, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
pub struct Address {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Message header as returned by the message list endpoint.
#[derive(Debug, Deserialize, Clone)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Id,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Summary {
    /// Sender address, falling back when the provider omits it.
    #[must_use]
    pub fn sender(&self) -> &str {
        self.from
            .as_ref()
            .map_or("Unknown Sender", |from| from.address.as_str())
    }

    /// Subject line, falling back when the provider omits it.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("(no subject)")
    }
}

/// Attachment metadata, provider-assigned and immutable.
#[derive(Debug, Deserialize, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// Full message as returned by the single message endpoint.
#[derive(Debug, Deserialize, Clone)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    pub id: Id,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Detail {
    /// Sender address, falling back when the provider omits it.
    #[must_use]
    pub fn sender(&self) -> &str {
        self.from
            .as_ref()
            .map_or("Unknown Sender", |from| from.address.as_str())
    }

    /// Subject line, falling back when the provider omits it.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("(no subject)")
    }

    /// Plain text body, empty when the provider sent none.
    #[must_use]
    pub fn text_body(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// First html part, if any.
    #[must_use]
    pub fn html_body(&self) -> Option<&str> {
        self.html.first().map(String::as_str)
    }

    /// Preferred display body: plain text, else the first html part, else empty.
    #[must_use]
    pub fn body(&self) -> &str {
        match &self.text {
            Some(text) if !text.is_empty() => text,
            _ => self.html_body().unwrap_or_default(),
        }
    }
}
