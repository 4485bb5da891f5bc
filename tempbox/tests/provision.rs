mod common;

use crate::common::{new_tempbox_and_server, wait_for};
use mailtm_api::mocks;
use std::time::Duration;
use tempbox::Error;

#[test]
fn random_mailbox_is_generated_and_a_spare_is_prefetched() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let _domains = mocks::account::domains(&mut server, &["tmp.example"]);
    // One round trip for the active mailbox, one for the background spare.
    let _accounts = mocks::account::create_any_account(&mut server, 2);
    let _token = mocks::account::token(&mut server, 2);

    let address = tempbox.generate_random_mailbox().unwrap();
    let (alias, domain) = address.split_once('@').unwrap();
    assert_eq!(domain, "tmp.example");
    assert_eq!(alias.len(), 8);
    assert!(alias
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

    assert_eq!(tempbox.active_address(), Some(address));
    assert!(wait_for(Duration::from_secs(2), || tempbox
        .pending_address()
        .is_some()));
    assert_ne!(tempbox.pending_address(), tempbox.active_address());
}

#[test]
fn prefetched_spare_is_consumed_by_the_next_generation() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let _domains = mocks::account::domains(&mut server, &["tmp.example"]);
    // First generation + its spare + the spare's replacement.
    let _accounts = mocks::account::create_any_account(&mut server, 3);
    let _token = mocks::account::token(&mut server, 3);

    tempbox.generate_random_mailbox().unwrap();
    assert!(wait_for(Duration::from_secs(2), || tempbox
        .pending_address()
        .is_some()));
    let spare = tempbox.pending_address().unwrap();

    let second = tempbox.generate_random_mailbox().unwrap();
    assert_eq!(second, spare);
    assert!(wait_for(Duration::from_secs(2), || tempbox
        .pending_address()
        .is_some()));
}

#[test]
fn custom_address_conflict_surfaces_address_taken_without_retry() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let taken = mocks::account::account_taken(&mut server);

    let err = tempbox
        .create_custom_mailbox("wanted@tmp.example")
        .unwrap_err();
    assert!(matches!(err, Error::AddressTaken(_)));
    assert!(!tempbox.session().has_active());
    // Exactly one request: 400 is a non-retriable client error.
    taken.assert();
}

#[test]
fn custom_mailbox_becomes_active_and_triggers_prefetch() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let _domains = mocks::account::domains(&mut server, &["tmp.example"]);
    // The custom mailbox itself plus the background spare.
    let _accounts = mocks::account::create_any_account(&mut server, 2);
    let _token = mocks::account::token(&mut server, 2);

    let address = tempbox.create_custom_mailbox("wanted@tmp.example").unwrap();
    assert_eq!(address, "wanted@tmp.example");
    assert_eq!(tempbox.active_address().as_deref(), Some("wanted@tmp.example"));
    assert!(wait_for(Duration::from_secs(2), || tempbox
        .pending_address()
        .is_some()));
}

#[test]
fn rapid_prefetch_triggers_run_a_single_round_trip() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let _domains = mocks::account::domains(&mut server, &["tmp.example"]);
    let _accounts = mocks::account::create_any_account(&mut server, 1);
    let _token = mocks::account::token(&mut server, 1);

    tempbox.prefetch();
    tempbox.prefetch();

    assert!(wait_for(Duration::from_secs(2), || tempbox
        .pending_address()
        .is_some()));
    // Exact hit counts are asserted when the mocks drop.
}

#[test]
fn failed_prefetch_is_skipped_until_the_cooldown_elapses() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_millis(500));
    let _domains = mocks::account::domains(&mut server, &["tmp.example"]);

    let first = mocks::account::account_taken(&mut server);
    tempbox.prefetch();
    std::thread::sleep(Duration::from_millis(200));
    first.assert();

    // Still within the cooldown window: no network call.
    tempbox.prefetch();
    std::thread::sleep(Duration::from_millis(150));
    first.assert();
    // `remove` drops the server-side hit state, so the assert-on-drop
    // performed by our mock server would panic; leak the handles instead.
    first.remove();
    std::mem::forget(first);

    // Past the cooldown: the pre-fetch goes out again.
    std::thread::sleep(Duration::from_millis(300));
    let second = mocks::account::account_taken(&mut server);
    tempbox.prefetch();
    std::thread::sleep(Duration::from_millis(200));
    second.assert();
    second.remove();
    std::mem::forget(second);
}

#[test]
fn missing_domains_surface_service_unavailable() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let unavailable = mocks::account::domains_unavailable(&mut server, 5);

    let err = tempbox.generate_random_mailbox().unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
    assert_eq!(
        err.to_string(),
        "Service temporarily unavailable. Could not fetch domains."
    );
    unavailable.assert();
}

#[test]
fn empty_domain_list_surfaces_service_unavailable() {
    let (tempbox, mut server) = new_tempbox_and_server(Duration::from_secs(30));
    let _domains = mocks::account::domains(&mut server, &[]);

    let err = tempbox.generate_random_mailbox().unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(None)));
}
