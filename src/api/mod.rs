//! Purpose: Define the stable public Rust API boundary for BookBridge.
//! Exports: Core types and operations needed by hosting applications.
//! Role: Public, additive-only surface; storage internals stay behind it.
//! Invariants: This module is the intended public path to the exchange.
//! Invariants: Persisted snapshot shapes are stable once published.

mod client;

pub use crate::core::catalog::{BookFilter, RequestStatusCounts};
pub use crate::core::engine::Exchange;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::model::{
    Book, BookCondition, BookDraft, BookRequest, BookStatus, Notification, ProfileUpdate,
    RequestStatus, Role, User,
};
pub use crate::core::notify::{DONOR_DASHBOARD, NotificationLog, RECEIVER_DASHBOARD};
pub use crate::core::session::{ActorContext, DEFAULT_AUTH_DELAY, Session};
pub use crate::core::slot::{Slot, SlotStore};
pub use client::{ApiResult, LocalClient};
