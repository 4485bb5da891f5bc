use crate::domain::message::{Detail, Summary};
use crate::mocks::MatchExtension;
use mockito::{Mock, Server};

/// Mock the message list endpoint returning the given `summaries`.
pub fn messages(server: &mut Server, summaries: &[Summary]) -> Mock {
    server
        .mock("GET", "/messages")
        .match_auth()
        .with_status(200)
        .with_header("Content-Type", "application/ld+json")
        .with_body(
            serde_json::json!({"hydra:member": summaries})
                .to_string(),
        )
        .create()
}

/// Mock the message list endpoint failing with a server error `hits` times.
pub fn messages_unavailable(server: &mut Server, hits: usize) -> Mock {
    server
        .mock("GET", "/messages")
        .match_auth()
        .with_status(500)
        .expect(hits)
        .create()
}

/// Mock the single message endpoint for `detail`.
pub fn message(server: &mut Server, detail: &Detail) -> Mock {
    server
        .mock("GET", format!("/messages/{}", detail.id).as_str())
        .match_auth()
        .with_status(200)
        .with_header("Content-Type", "application/ld+json")
        .with_body(serde_json::to_vec(detail).unwrap())
        .create()
}

/// Mock the single message endpoint returning an empty body for `id`.
pub fn message_not_found(server: &mut Server, id: &str) -> Mock {
    server
        .mock("GET", format!("/messages/{id}").as_str())
        .match_auth()
        .with_status(200)
        .with_header("Content-Type", "application/ld+json")
        .with_body("")
        .create()
}

/// Mock an attachment download returning `bytes`.
pub fn attachment(server: &mut Server, message_id: &str, attachment_id: &str, bytes: &[u8]) -> Mock {
    server
        .mock(
            "GET",
            format!("/messages/{message_id}/attachments/{attachment_id}").as_str(),
        )
        .match_auth()
        .with_status(200)
        .with_header("Content-Type", "application/octet-stream")
        .with_body(bytes)
        .create()
}
