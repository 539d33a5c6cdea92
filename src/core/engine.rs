//! Purpose: Book/request workflow engine over snapshot-persisted collections.
//! Exports: `Exchange` with its mutation operations and derived views.
//! Role: Single owner of books, requests, and notifications.
//! Invariants: Mutations rewrite the snapshots of every collection they touch.
//! Invariants: Request-driven transitions keep book and request status consistent.

use crate::core::catalog::{self, BookFilter, RequestStatusCounts};
use crate::core::clock::now_rfc3339;
use crate::core::error::{Error, ErrorKind};
use crate::core::ids::new_entity_id;
use crate::core::model::{Book, BookDraft, BookRequest, BookStatus, Notification, RequestStatus};
use crate::core::notify::{DONOR_DASHBOARD, NotificationLog, RECEIVER_DASHBOARD};
use crate::core::session::ActorContext;
use crate::core::slot::{Slot, SlotStore};

pub struct Exchange {
    store: SlotStore,
    books: Vec<Book>,
    requests: Vec<BookRequest>,
    notifications: NotificationLog,
}

impl Exchange {
    /// Open an exchange over `store`, loading the persisted collections.
    pub fn open(store: SlotStore) -> Self {
        let books = store.load(Slot::Books);
        let requests = store.load(Slot::Requests);
        let notifications = store.load(Slot::Notifications);
        Self {
            store,
            books,
            requests,
            notifications,
        }
    }

    /// List a book for donation, owned by the context's actor.
    pub fn add_book(&mut self, draft: BookDraft, ctx: &ActorContext) -> Result<Book, Error> {
        let actor = ctx.actor()?;
        let book = Book {
            id: new_entity_id()?,
            title: draft.title,
            author: draft.author,
            description: draft.description,
            cover_image: draft.cover_image,
            category: draft.category,
            condition: draft.condition,
            donor_id: actor.id.clone(),
            donor_name: actor.name.clone(),
            status: BookStatus::Available,
            location: draft.location,
            created_at: now_rfc3339()?,
            receiver_id: None,
        };
        let title = book.title.clone();
        self.notifications.record(
            &actor.id,
            format!("You've successfully added \"{title}\" to your donations."),
            Some(DONOR_DASHBOARD),
        )?;
        tracing::debug!(book = %book.id, donor = %book.donor_id, "book listed");
        self.books.push(book.clone());
        self.save_books()?;
        self.save_notifications()?;
        Ok(book)
    }

    /// Raw status transition with an existence check only. `receiver`
    /// rebinds the book when given; `None` keeps the current binding.
    /// The request operations layer the state machine on top of this.
    pub fn update_book_status(
        &mut self,
        book_id: &str,
        status: BookStatus,
        receiver: Option<&str>,
    ) -> Result<(), Error> {
        let book = self.find_book_mut(book_id)?;
        book.status = status;
        if let Some(receiver_id) = receiver {
            book.receiver_id = Some(receiver_id.to_string());
        }
        tracing::debug!(book = book_id, status = ?status, "book status updated");
        self.save_books()
    }

    /// Ask for a book. The book must currently be available: a book carries
    /// at most one live request.
    pub fn request_book(
        &mut self,
        book_id: &str,
        message: Option<String>,
        ctx: &ActorContext,
    ) -> Result<BookRequest, Error> {
        let actor = ctx.actor()?;
        let (title, donor_id) = {
            let book = self.find_book(book_id)?;
            if book.status != BookStatus::Available {
                return Err(Error::new(ErrorKind::Conflict)
                    .with_message("book is not available to request")
                    .with_entity(book_id)
                    .with_hint("Wait for the current request to be rejected or withdrawn."));
            }
            (book.title.clone(), book.donor_id.clone())
        };

        let request = BookRequest {
            id: new_entity_id()?,
            book_id: book_id.to_string(),
            receiver_id: actor.id.clone(),
            receiver_name: actor.name.clone(),
            status: RequestStatus::Pending,
            message,
            created_at: now_rfc3339()?,
        };
        self.requests.push(request.clone());
        if let Some(book) = self.books.iter_mut().find(|book| book.id == book_id) {
            book.status = BookStatus::Requested;
        }

        let requester = actor.name.clone();
        self.notifications.record(
            &donor_id,
            format!("{requester} has requested your book \"{title}\". Click to review the request."),
            Some(DONOR_DASHBOARD),
        )?;
        self.notifications.record(
            &actor.id,
            format!("You've requested \"{title}\". The donor will review your request."),
            Some(RECEIVER_DASHBOARD),
        )?;
        tracing::debug!(book = book_id, request = %request.id, "book requested");
        self.save_books()?;
        self.save_requests()?;
        self.save_notifications()?;
        Ok(request)
    }

    /// Resolve a request. Legal moves: pending to accepted or rejected,
    /// accepted to completed. Anything else is a conflict.
    pub fn update_request_status(
        &mut self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), Error> {
        let (book_id, receiver_id, current) = {
            let request = self.find_request(request_id)?;
            (
                request.book_id.clone(),
                request.receiver_id.clone(),
                request.status,
            )
        };
        let (title, donor_id) = {
            let book = self.find_book(&book_id)?;
            (book.title.clone(), book.donor_id.clone())
        };

        match status {
            RequestStatus::Pending => {
                return Err(Error::new(ErrorKind::Conflict)
                    .with_message("a request cannot return to pending")
                    .with_entity(request_id));
            }
            RequestStatus::Accepted => {
                if current != RequestStatus::Pending {
                    return Err(Error::new(ErrorKind::Conflict)
                        .with_message("only a pending request can be accepted")
                        .with_entity(request_id));
                }
                self.set_request_status(request_id, status);
                let book = self.find_book_mut(&book_id)?;
                book.status = BookStatus::Reserved;
                book.receiver_id = Some(receiver_id.clone());
                self.notifications.record(
                    &receiver_id,
                    format!(
                        "Good news! Your request for \"{title}\" has been accepted. Contact the donor to arrange pickup."
                    ),
                    Some(RECEIVER_DASHBOARD),
                )?;
                self.notifications.record(
                    &donor_id,
                    format!(
                        "You've accepted the request for \"{title}\". Please arrange the handover with the receiver."
                    ),
                    Some(DONOR_DASHBOARD),
                )?;
            }
            RequestStatus::Rejected => {
                if current != RequestStatus::Pending {
                    return Err(Error::new(ErrorKind::Conflict)
                        .with_message("only a pending request can be rejected")
                        .with_entity(request_id));
                }
                self.set_request_status(request_id, status);
                let book = self.find_book_mut(&book_id)?;
                book.status = BookStatus::Available;
                book.receiver_id = None;
                self.notifications.record(
                    &receiver_id,
                    format!("Your request for \"{title}\" was not accepted at this time."),
                    Some(RECEIVER_DASHBOARD),
                )?;
                self.notifications.record(
                    &donor_id,
                    format!(
                        "You've declined the request for \"{title}\". The book is now available for others."
                    ),
                    Some(DONOR_DASHBOARD),
                )?;
            }
            RequestStatus::Completed => {
                if current != RequestStatus::Accepted {
                    return Err(Error::new(ErrorKind::Conflict)
                        .with_message("only an accepted request can be completed")
                        .with_entity(request_id));
                }
                self.set_request_status(request_id, status);
                let book = self.find_book_mut(&book_id)?;
                book.status = BookStatus::Donated;
                book.receiver_id = Some(receiver_id.clone());
                self.notifications.record(
                    &receiver_id,
                    format!("The book \"{title}\" has been marked as received. Happy reading!"),
                    Some(RECEIVER_DASHBOARD),
                )?;
                self.notifications.record(
                    &donor_id,
                    format!(
                        "You've successfully donated \"{title}\". Thank you for sharing knowledge!"
                    ),
                    Some(DONOR_DASHBOARD),
                )?;
            }
        }

        tracing::debug!(request = request_id, status = ?status, "request resolved");
        self.save_books()?;
        self.save_requests()?;
        self.save_notifications()
    }

    /// Flip a notification to read. Unknown ids are ignored; the snapshot
    /// is rewritten either way.
    pub fn mark_notification_read(&mut self, notification_id: &str) -> Result<(), Error> {
        self.notifications.mark_read(notification_id);
        self.save_notifications()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn requests(&self) -> &[BookRequest] {
        &self.requests
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.entries()
    }

    pub fn find_book(&self, book_id: &str) -> Result<&Book, Error> {
        self.books
            .iter()
            .find(|book| book.id == book_id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message("no such book")
                    .with_entity(book_id)
            })
    }

    pub fn find_request(&self, request_id: &str) -> Result<&BookRequest, Error> {
        self.requests
            .iter()
            .find(|request| request.id == request_id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message("no such request")
                    .with_entity(request_id)
            })
    }

    /// Available books matching `filter` (the browse page view).
    pub fn browse_available(&self, filter: &BookFilter) -> Vec<&Book> {
        catalog::available_books(&self.books)
            .into_iter()
            .filter(|book| filter.matches(book))
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        catalog::unique_categories(&self.books)
    }

    /// The context actor's books: listings for a donor, bound copies for a
    /// receiver. Anonymous contexts see nothing.
    pub fn books_for(&self, ctx: &ActorContext) -> Vec<&Book> {
        ctx.actor()
            .map(|actor| catalog::books_for_user(&self.books, actor))
            .unwrap_or_default()
    }

    pub fn received_books(&self, receiver_id: &str) -> Vec<&Book> {
        catalog::received_books(&self.books, receiver_id)
    }

    pub fn requests_for_donor(&self, donor_id: &str) -> Vec<&BookRequest> {
        catalog::requests_for_donor(&self.requests, &self.books, donor_id)
    }

    /// Requests on the donor's listings awaiting a decision.
    pub fn pending_requests_for_donor(&self, donor_id: &str) -> Vec<&BookRequest> {
        let mut requests = self.requests_for_donor(donor_id);
        requests.retain(|request| request.status == RequestStatus::Pending);
        requests
    }

    /// Accepted requests on the donor's listings with a handover to arrange.
    pub fn accepted_requests_for_donor(&self, donor_id: &str) -> Vec<&BookRequest> {
        let mut requests = self.requests_for_donor(donor_id);
        requests.retain(|request| request.status == RequestStatus::Accepted);
        requests
    }

    pub fn requests_by_receiver(&self, receiver_id: &str) -> Vec<&BookRequest> {
        catalog::requests_by_receiver(&self.requests, receiver_id)
    }

    pub fn request_counts(&self, receiver_id: &str) -> RequestStatusCounts {
        RequestStatusCounts::tally(catalog::requests_by_receiver(&self.requests, receiver_id))
    }

    pub fn notifications_for(&self, user_id: &str) -> Vec<&Notification> {
        self.notifications.for_user(user_id)
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.notifications.unread_count(user_id)
    }

    fn find_book_mut(&mut self, book_id: &str) -> Result<&mut Book, Error> {
        self.books
            .iter_mut()
            .find(|book| book.id == book_id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message("no such book")
                    .with_entity(book_id)
            })
    }

    fn set_request_status(&mut self, request_id: &str, status: RequestStatus) {
        if let Some(request) = self
            .requests
            .iter_mut()
            .find(|request| request.id == request_id)
        {
            request.status = status;
        }
    }

    fn save_books(&self) -> Result<(), Error> {
        self.store.save(Slot::Books, &self.books)
    }

    fn save_requests(&self) -> Result<(), Error> {
        self.store.save(Slot::Requests, &self.requests)
    }

    fn save_notifications(&self) -> Result<(), Error> {
        self.store.save(Slot::Notifications, &self.notifications)
    }
}
