pub mod account;
pub mod message;

pub use mockito;
use mockito::{Matcher, Mock, Server, ServerOpts};

/// Create new server.
#[must_use]
pub fn new() -> Server {
    Server::new_with_opts(ServerOpts {
        host: "127.0.0.1",
        port: 0,
        assert_on_drop: true,
    })
}

/// Token used by all mocked authenticated endpoints.
pub const DEFAULT_TOKEN: &str = "mock-bearer-token";

/// Address used by the account mocks unless overridden.
pub const DEFAULT_ADDRESS: &str = "foo@bar.example";

pub trait MatchExtension {
    /// Match against the default authentication token.
    fn match_auth(self) -> Self;
}

impl MatchExtension for Mock {
    fn match_auth(self) -> Self {
        self.match_header(
            "Authorization",
            Matcher::Exact(format!("Bearer {DEFAULT_TOKEN}")),
        )
    }
}
