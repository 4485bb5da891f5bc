use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Bearer token for access to protected API endpoints.
#[derive(Clone)]
pub struct Token(pub SecretString);

impl Token {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(SecretString::deserialize(deserializer)?))
    }
}
