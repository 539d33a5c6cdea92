// Derived read views over the exchange collections: search, filters, dashboards.
use crate::core::model::{Book, BookCondition, BookRequest, BookStatus, RequestStatus, Role, User};

/// Optional criteria over the book collection. Absent fields match
/// everything; search is a case-insensitive substring test over title,
/// author, and description.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BookFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<BookCondition>,
    pub status: Option<BookStatus>,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
                || book.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &book.category != category {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if book.condition != condition {
                return false;
            }
        }
        if let Some(status) = self.status {
            if book.status != status {
                return false;
            }
        }
        true
    }
}

pub fn filter_books<'a>(books: &'a [Book], filter: &BookFilter) -> Vec<&'a Book> {
    books.iter().filter(|book| filter.matches(book)).collect()
}

/// Books open to new requests.
pub fn available_books(books: &[Book]) -> Vec<&Book> {
    books
        .iter()
        .filter(|book| book.status == BookStatus::Available)
        .collect()
}

/// Unique, sorted categories among available books (the browse dropdown).
pub fn unique_categories(books: &[Book]) -> Vec<String> {
    let mut categories: Vec<String> = books
        .iter()
        .filter(|book| book.status == BookStatus::Available)
        .map(|book| book.category.clone())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// The books a user sees as theirs: listings for a donor, bound copies for
/// a receiver.
pub fn books_for_user<'a>(books: &'a [Book], user: &User) -> Vec<&'a Book> {
    books
        .iter()
        .filter(|book| match user.role {
            Role::Donor => book.donor_id == user.id,
            Role::Receiver => book.receiver_id.as_deref() == Some(user.id.as_str()),
        })
        .collect()
}

/// Books handed over to the receiver.
pub fn received_books<'a>(books: &'a [Book], receiver_id: &str) -> Vec<&'a Book> {
    books
        .iter()
        .filter(|book| {
            book.receiver_id.as_deref() == Some(receiver_id) && book.status == BookStatus::Donated
        })
        .collect()
}

/// Requests targeting any of the donor's listings.
pub fn requests_for_donor<'a>(
    requests: &'a [BookRequest],
    books: &[Book],
    donor_id: &str,
) -> Vec<&'a BookRequest> {
    requests
        .iter()
        .filter(|request| {
            books
                .iter()
                .any(|book| book.id == request.book_id && book.donor_id == donor_id)
        })
        .collect()
}

pub fn requests_by_receiver<'a>(
    requests: &'a [BookRequest],
    receiver_id: &str,
) -> Vec<&'a BookRequest> {
    requests
        .iter()
        .filter(|request| request.receiver_id == receiver_id)
        .collect()
}

/// Per-status request tally (the receiver dashboard summary row).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RequestStatusCounts {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub completed: usize,
}

impl RequestStatusCounts {
    pub fn tally<'a>(requests: impl IntoIterator<Item = &'a BookRequest>) -> Self {
        let mut counts = Self::default();
        for request in requests {
            match request.status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Accepted => counts.accepted += 1,
                RequestStatus::Rejected => counts.rejected += 1,
                RequestStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}
