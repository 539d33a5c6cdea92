//! Purpose: Per-user notification fan-out with read tracking.
//! Exports: `NotificationLog` and the dashboard link targets.
//! Role: Side-effect channel of the exchange; newest entries first.
//! Invariants: Entries are prepended and never deleted; only the read flag mutates.
//! Invariants: No deduplication, expiry, or batching.

use crate::core::clock::now_rfc3339;
use crate::core::error::Error;
use crate::core::ids::new_entity_id;
use crate::core::model::Notification;
use serde::{Deserialize, Serialize};

/// Link targets carried on workflow notifications. The hosting UI treats
/// them as routes; the exchange treats them as opaque strings.
pub const DONOR_DASHBOARD: &str = "/donor/dashboard";
pub const RECEIVER_DASHBOARD: &str = "/receiver/dashboard";

/// Notification sequence for all users, newest first.
///
/// Serializes transparently as the plain JSON array stored in the
/// notifications slot.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Prepend an unread notification for `user_id`.
    pub fn record(
        &mut self,
        user_id: &str,
        message: impl Into<String>,
        link_to: Option<&str>,
    ) -> Result<(), Error> {
        let notification = Notification {
            id: new_entity_id()?,
            user_id: user_id.to_string(),
            message: message.into(),
            read: false,
            created_at: now_rfc3339()?,
            link_to: link_to.map(str::to_string),
        };
        tracing::debug!(user = user_id, "notification recorded");
        self.entries.insert(0, notification);
        Ok(())
    }

    /// Mark a notification read, reporting whether an unread entry flipped.
    /// Unknown ids are ignored.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) if !entry.read => {
                entry.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn for_user(&self, user_id: &str) -> Vec<&Notification> {
        self.entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .collect()
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.user_id == user_id && !entry.read)
            .count()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationLog, RECEIVER_DASHBOARD};

    #[test]
    fn record_prepends_newest_first() {
        let mut log = NotificationLog::new();
        log.record("u1", "first", None).expect("record");
        log.record("u1", "second", None).expect("record");
        let messages: Vec<&str> = log
            .entries()
            .iter()
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(messages, ["second", "first"]);
    }

    #[test]
    fn record_defaults_unread_with_link() {
        let mut log = NotificationLog::new();
        log.record("u1", "hello", Some(RECEIVER_DASHBOARD))
            .expect("record");
        let entry = &log.entries()[0];
        assert!(!entry.read);
        assert_eq!(entry.link_to.as_deref(), Some("/receiver/dashboard"));
        assert_eq!(entry.id.len(), 9);
    }

    #[test]
    fn mark_read_flips_once() {
        let mut log = NotificationLog::new();
        log.record("u1", "hello", None).expect("record");
        let id = log.entries()[0].id.clone();
        assert!(log.mark_read(&id));
        assert!(!log.mark_read(&id));
        assert!(log.entries()[0].read);
    }

    #[test]
    fn mark_read_ignores_unknown_id() {
        let mut log = NotificationLog::new();
        log.record("u1", "hello", None).expect("record");
        assert!(!log.mark_read("missing00"));
        assert!(!log.entries()[0].read);
    }

    #[test]
    fn per_user_views_and_counts() {
        let mut log = NotificationLog::new();
        log.record("u1", "a", None).expect("record");
        log.record("u2", "b", None).expect("record");
        log.record("u1", "c", None).expect("record");
        assert_eq!(log.for_user("u1").len(), 2);
        assert_eq!(log.unread_count("u1"), 2);
        assert_eq!(log.unread_count("u2"), 1);

        let id = log.for_user("u1")[0].id.clone();
        log.mark_read(&id);
        assert_eq!(log.unread_count("u1"), 1);
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut log = NotificationLog::new();
        log.record("u1", "hello", None).expect("record");
        let blob = serde_json::to_string(&log).expect("encode");
        assert!(blob.starts_with('['));
        let back: NotificationLog = serde_json::from_str(&blob).expect("decode");
        assert_eq!(back, log);
    }
}
