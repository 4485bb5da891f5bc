pub mod message;

use serde::Deserialize;

/// A domain on which mailboxes can be provisioned.
#[derive(Debug, Deserialize, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "mocks", derive(serde::Serialize))]
pub struct Domain {
    pub domain: String,
}
