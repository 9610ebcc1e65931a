//! Console round trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives a `Session` over
//! real HTTP through `UreqTransport`, so request building, response parsing
//! and the page patches are checked end-to-end against the actual server.

use std::time::Duration;

use mock_server::AppState;
use roster_core::transport::UreqTransport;
use roster_core::{
    ClientError, Console, DraftField, LoadOutcome, NotificationKind, Session, User, UserClient, UserId,
    ValidationError,
};

/// Start the mock server on a random port and return its base URL.
fn start_server(state: AppState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A server holding `count` users, plus a session on it.
fn seeded_session(count: usize, page_size: u32) -> (AppState, Session<UreqTransport>) {
    let state = AppState::new();
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(async {
        for i in 0..count {
            state
                .insert(&format!("User{i}"), "Test", &format!("u{i}@example.com"), "1234567890")
                .await;
        }
    });
    let url = start_server(state.clone());
    let console = Console::new(UserClient::new(&url), page_size, Duration::from_secs(3)).unwrap();
    (state, Session::new(console, UreqTransport::new(Duration::from_secs(5))))
}

fn ids(users: &[User]) -> Vec<UserId> {
    users.iter().map(|u| u.id).collect()
}

fn fill(session: &mut Session<UreqTransport>, first: &str, phone: &str) {
    let console = session.console_mut();
    console.set_field(DraftField::FirstName, Some(first)).unwrap();
    console.set_field(DraftField::LastName, Some("Morgan")).unwrap();
    console
        .set_field(DraftField::Email, Some("casey@example.com"))
        .unwrap();
    console.set_field(DraftField::PhoneNumber, Some(phone)).unwrap();
}

#[test]
fn paging_forward_and_back_returns_same_records() {
    let (_state, mut session) = seeded_session(13, 6);

    assert_eq!(session.load_page(1).unwrap(), LoadOutcome::Applied);
    let list = session.console().list();
    assert_eq!(list.total_pages(), Some(3));
    assert!(!list.can_go_previous());
    assert!(list.can_go_next());

    assert_eq!(session.next_page().unwrap(), LoadOutcome::Applied);
    let page_two = ids(session.console().list().records());
    assert_eq!(page_two.len(), 6);

    session.next_page().unwrap();
    assert_eq!(session.console().list().records().len(), 1);
    assert!(!session.console().list().can_go_next());
    assert!(matches!(
        session.next_page(),
        Err(ValidationError::PageOutOfRange { page: 4, last: 3 })
    ));

    session.previous_page().unwrap();
    assert_eq!(ids(session.console().list().records()), page_two);
}

#[test]
fn create_update_delete_patch_the_page() {
    let (_state, mut session) = seeded_session(2, 6);
    session.load_page(1).unwrap();

    // create
    session.console_mut().open_add();
    fill(&mut session, "Casey", "1122334455");
    session.submit_form().unwrap();
    let records = session.console().list().records();
    assert_eq!(records.len(), 3);
    let created = records[2].clone();
    assert_eq!(created.first_name, "Casey");
    assert!(session
        .console()
        .notifications()
        .is_active(NotificationKind::Saved));

    // update
    session.console_mut().open_edit(created.id).unwrap();
    session
        .console_mut()
        .set_field(DraftField::FirstName, Some("Kasey"))
        .unwrap();
    session.submit_form().unwrap();
    let updated = session.console().list().get(created.id).unwrap().clone();
    assert_eq!(updated.first_name, "Kasey");
    assert_eq!(updated.last_name, "Morgan");

    // server agrees with the local patch
    session.reload();
    assert_eq!(session.console().list().get(created.id), Some(&updated));

    // delete
    session.delete(created.id).unwrap();
    assert!(session.console().list().get(created.id).is_none());
    assert_eq!(session.console().list().records().len(), 2);

    // deleting again is an API error
    let err = session.delete(created.id).unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
    assert_eq!(session.console().list().error(), Some("User not found"));
}

#[test]
fn invalid_phone_never_reaches_the_server() {
    let (_state, mut session) = seeded_session(0, 6);
    session.load_page(1).unwrap();

    session.console_mut().open_add();
    fill(&mut session, "Casey", "12345");
    let err = session.submit_form().unwrap_err();
    assert_eq!(err, ClientError::Validation(ValidationError::InvalidPhoneNumber));
    assert!(session.console().form().is_open());

    session.reload();
    assert_eq!(session.console().list().total_count(), Some(0));
}

#[test]
fn health_reports_both_checks() {
    let (state, session) = seeded_session(0, 6);

    let summary = session.check_health();
    assert_eq!(summary.backend.status, 200);
    assert_eq!(summary.backend.data, Some(serde_json::json!("Pong")));
    assert_eq!(summary.database.status, 200);

    state.set_database_available(false);
    let summary = session.check_health();
    assert_eq!(summary.database.status, 500);
    assert_eq!(summary.database.error.as_deref(), Some("database is unavailable"));
}

#[test]
fn unreachable_host_is_reported_not_raised() {
    let console = Console::new(UserClient::new("http://127.0.0.1:1"), 6, Duration::from_secs(3)).unwrap();
    let mut session = Session::new(console, UreqTransport::new(Duration::from_secs(5)));

    let summary = session.check_health();
    assert_eq!(summary.backend.status, 500);
    assert!(summary.backend.error.is_some());

    let outcome = session.load_page(1).unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Failed("No response from server. Please try again.".to_string())
    );
}
