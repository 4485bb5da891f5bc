use crate::mocks::DEFAULT_TOKEN;
use mockito::{Mock, Server};

/// Mock the domain list endpoint with the given `domains`.
pub fn domains(server: &mut Server, domains: &[&str]) -> Mock {
    let members: Vec<_> = domains
        .iter()
        .map(|d| serde_json::json!({"domain": d}))
        .collect();
    server
        .mock("GET", "/domains")
        .with_status(200)
        .with_header("Content-Type", "application/ld+json")
        .with_body(serde_json::json!({"hydra:member": members}).to_string())
        .create()
}

/// Mock the domain list endpoint failing with a server error `hits` times.
pub fn domains_unavailable(server: &mut Server, hits: usize) -> Mock {
    server
        .mock("GET", "/domains")
        .with_status(503)
        .expect(hits)
        .create()
}

/// Mock successful account creation for any address, expected `hits` times.
pub fn create_any_account(server: &mut Server, hits: usize) -> Mock {
    server
        .mock("POST", "/accounts")
        .with_status(201)
        .with_header("Content-Type", "application/ld+json")
        .with_body("{}")
        .expect(hits)
        .create()
}

/// Mock account creation rejected because the address exists.
pub fn account_taken(server: &mut Server) -> Mock {
    server
        .mock("POST", "/accounts")
        .with_status(400)
        .with_header("Content-Type", "application/ld+json")
        .with_body("{\"detail\":\"address: This value is already used.\"}")
        .create()
}

/// Mock token issuance returning [`DEFAULT_TOKEN`], expected `hits` times.
pub fn token(server: &mut Server, hits: usize) -> Mock {
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(serde_json::json!({"token": DEFAULT_TOKEN}).to_string())
        .expect(hits)
        .create()
}
