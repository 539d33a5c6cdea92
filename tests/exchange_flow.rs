// End-to-end donate and reject flows through the public client surface.
use bookbridge::api::{
    BookCondition, BookDraft, BookFilter, BookStatus, ErrorKind, LocalClient, RequestStatus, Role,
};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn client(dir: &Path) -> LocalClient {
    LocalClient::new().with_state_dir(dir)
}

fn draft(title: &str, category: &str, condition: BookCondition) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        description: "Read twice, spine intact".to_string(),
        cover_image: "https://covers.example/book.jpg".to_string(),
        category: category.to_string(),
        condition,
        location: "Springfield".to_string(),
    }
}

#[test]
fn donate_flow_from_listing_to_handover() {
    let dir = tempdir().expect("tempdir");
    let client = client(dir.path());
    let mut session = client
        .open_session()
        .expect("session")
        .with_auth_delay(Duration::ZERO);
    let mut exchange = client.open_exchange().expect("exchange");

    let donor = session
        .signup("Alice", "alice@example.org", "pw", Role::Donor)
        .expect("signup");
    let book = exchange
        .add_book(draft("Dune", "Fiction", BookCondition::Good), &session.context())
        .expect("add");
    assert_eq!(book.status, BookStatus::Available);

    session
        .login("bea@example.org", "pw", Role::Receiver)
        .expect("login");
    let receiver = session.current_user().expect("receiver").clone();
    let request = exchange
        .request_book(&book.id, Some("Happy to pick it up".to_string()), &session.context())
        .expect("request");
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(
        exchange.find_book(&book.id).expect("book").status,
        BookStatus::Requested
    );

    exchange
        .update_request_status(&request.id, RequestStatus::Accepted)
        .expect("accept");
    let reserved = exchange.find_book(&book.id).expect("book");
    assert_eq!(reserved.status, BookStatus::Reserved);
    assert_eq!(reserved.receiver_id.as_deref(), Some(receiver.id.as_str()));

    exchange
        .update_request_status(&request.id, RequestStatus::Completed)
        .expect("complete");
    let donated = exchange.find_book(&book.id).expect("book");
    assert_eq!(donated.status, BookStatus::Donated);
    assert_eq!(donated.receiver_id.as_deref(), Some(receiver.id.as_str()));

    let received = exchange.received_books(&receiver.id);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, book.id);

    // Donor saw every workflow event, newest first.
    let donor_notes = exchange.notifications_for(&donor.id);
    assert_eq!(donor_notes.len(), 4);
    assert_eq!(
        donor_notes[0].message,
        "You've successfully donated \"Dune\". Thank you for sharing knowledge!"
    );
    assert_eq!(
        donor_notes[3].message,
        "You've successfully added \"Dune\" to your donations."
    );

    let counts = exchange.request_counts(&receiver.id);
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.pending, 0);
}

#[test]
fn reject_flow_releases_the_book_for_others() {
    let dir = tempdir().expect("tempdir");
    let client = client(dir.path());
    let mut session = client
        .open_session()
        .expect("session")
        .with_auth_delay(Duration::ZERO);
    let mut exchange = client.open_exchange().expect("exchange");

    session
        .signup("Alice", "alice@example.org", "pw", Role::Donor)
        .expect("signup");
    let book = exchange
        .add_book(draft("Dune", "Fiction", BookCondition::Good), &session.context())
        .expect("add");

    session
        .login("bea@example.org", "pw", Role::Receiver)
        .expect("login");
    let first = exchange
        .request_book(&book.id, None, &session.context())
        .expect("request");
    exchange
        .update_request_status(&first.id, RequestStatus::Rejected)
        .expect("reject");

    let released = exchange.find_book(&book.id).expect("book");
    assert_eq!(released.status, BookStatus::Available);
    assert!(released.receiver_id.is_none());

    // Every available book is free of live requests.
    for available in exchange.browse_available(&BookFilter::new()) {
        assert!(
            exchange
                .requests()
                .iter()
                .all(|request| request.book_id != available.id || request.status.is_terminal())
        );
    }

    // A different receiver can now request the same copy.
    session
        .login("cal@example.org", "pw", Role::Receiver)
        .expect("login");
    let second = exchange
        .request_book(&book.id, None, &session.context())
        .expect("second request");
    assert_eq!(second.status, RequestStatus::Pending);
    assert_ne!(second.receiver_id, first.receiver_id);
}

#[test]
fn browse_reflects_filters_and_live_requests() {
    let dir = tempdir().expect("tempdir");
    let client = client(dir.path());
    let mut session = client
        .open_session()
        .expect("session")
        .with_auth_delay(Duration::ZERO);
    let mut exchange = client.open_exchange().expect("exchange");

    session
        .signup("Alice", "alice@example.org", "pw", Role::Donor)
        .expect("signup");
    let ctx = session.context();
    let dune = exchange
        .add_book(draft("Dune", "Fiction", BookCondition::Good), &ctx)
        .expect("add");
    exchange
        .add_book(draft("Sapiens", "History", BookCondition::LikeNew), &ctx)
        .expect("add");
    exchange
        .add_book(draft("Dune Messiah", "Fiction", BookCondition::Fair), &ctx)
        .expect("add");

    assert_eq!(exchange.categories(), ["Fiction", "History"]);

    let mut filter = BookFilter::new();
    filter.search = Some("dune".to_string());
    assert_eq!(exchange.browse_available(&filter).len(), 2);

    filter.condition = Some(BookCondition::Fair);
    let narrowed = exchange.browse_available(&filter);
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].title, "Dune Messiah");

    // A live request removes the copy from browse.
    session
        .login("bea@example.org", "pw", Role::Receiver)
        .expect("login");
    exchange
        .request_book(&dune.id, None, &session.context())
        .expect("request");
    let mut by_title = BookFilter::new();
    by_title.search = Some("Dune".to_string());
    let remaining = exchange.browse_available(&by_title);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Dune Messiah");
}

#[test]
fn unread_counts_track_fanout_until_each_is_read() {
    let dir = tempdir().expect("tempdir");
    let client = client(dir.path());
    let mut session = client
        .open_session()
        .expect("session")
        .with_auth_delay(Duration::ZERO);
    let mut exchange = client.open_exchange().expect("exchange");

    let donor = session
        .signup("Alice", "alice@example.org", "pw", Role::Donor)
        .expect("signup");
    let book = exchange
        .add_book(draft("Dune", "Fiction", BookCondition::Good), &session.context())
        .expect("add");

    session
        .login("bea@example.org", "pw", Role::Receiver)
        .expect("login");
    let receiver = session.current_user().expect("receiver").clone();
    let request = exchange
        .request_book(&book.id, None, &session.context())
        .expect("request");
    exchange
        .update_request_status(&request.id, RequestStatus::Accepted)
        .expect("accept");

    assert_eq!(exchange.unread_count(&donor.id), 3);
    assert_eq!(exchange.unread_count(&receiver.id), 2);

    let donor_note_ids: Vec<String> = exchange
        .notifications_for(&donor.id)
        .iter()
        .map(|note| note.id.clone())
        .collect();
    for (marked, id) in donor_note_ids.iter().enumerate() {
        exchange.mark_notification_read(id).expect("mark");
        assert_eq!(exchange.unread_count(&donor.id), 3 - marked - 1);
    }
    // The receiver's count is untouched by the donor's reads.
    assert_eq!(exchange.unread_count(&receiver.id), 2);
}

#[test]
fn state_survives_reopening_the_client() {
    let dir = tempdir().expect("tempdir");
    let client = client(dir.path());
    {
        let mut session = client
            .open_session()
            .expect("session")
            .with_auth_delay(Duration::ZERO);
        let mut exchange = client.open_exchange().expect("exchange");
        session
            .signup("Alice", "alice@example.org", "pw", Role::Donor)
            .expect("signup");
        let book = exchange
            .add_book(draft("Dune", "Fiction", BookCondition::Good), &session.context())
            .expect("add");
        session
            .login("bea@example.org", "pw", Role::Receiver)
            .expect("login");
        exchange
            .request_book(&book.id, None, &session.context())
            .expect("request");
    }

    let exchange = client.open_exchange().expect("reopen");
    assert_eq!(exchange.books().len(), 1);
    assert_eq!(exchange.books()[0].status, BookStatus::Requested);
    assert_eq!(exchange.requests().len(), 1);
    assert_eq!(exchange.requests()[0].status, RequestStatus::Pending);
    assert_eq!(exchange.notifications().len(), 3);

    let session = client.open_session().expect("session");
    let user = session.current_user().expect("restored user");
    assert_eq!(user.email, "bea@example.org");
    assert_eq!(user.role, Role::Receiver);
}

#[test]
fn mutations_fail_cleanly_without_an_actor() {
    let dir = tempdir().expect("tempdir");
    let client = client(dir.path());
    let session = client.open_session().expect("session");
    let mut exchange = client.open_exchange().expect("exchange");

    let err = exchange
        .add_book(draft("Dune", "Fiction", BookCondition::Good), &session.context())
        .expect_err("anonymous add");
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    assert!(exchange.books().is_empty());
    assert!(exchange.books_for(&session.context()).is_empty());
}
