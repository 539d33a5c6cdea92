//! Purpose: Persist whole-collection JSON snapshots in named slot files.
//! Exports: `Slot`, `SlotStore`, and default state-directory resolution.
//! Role: Local storage adapter; the exchange and session treat slots as opaque blobs.
//! Invariants: Every save rewrites the full snapshot; the last writer wins.
//! Invariants: Absent or malformed slots load as the empty default, never an error.

use crate::core::error::{Error, ErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    User,
    Books,
    Requests,
    Notifications,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::User => "user",
            Slot::Books => "books",
            Slot::Requests => "requests",
            Slot::Notifications => "notifications",
        }
    }

    fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

pub(crate) fn default_state_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".bookbridge").join("state")
}

#[derive(Clone, Debug)]
pub struct SlotStore {
    dir: PathBuf,
}

impl SlotStore {
    /// Open a store rooted at `dir`, creating the directory when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|err| {
            Error::new(map_io_error_kind(&err))
                .with_message("failed to create state directory")
                .with_path(&dir)
                .with_source(err)
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    /// Load a slot's snapshot, or the type's default when the file is absent
    /// or does not parse. A malformed blob is dropped with a warning; the
    /// next save overwrites it.
    pub fn load<T>(&self, slot: Slot) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.slot_path(slot);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(err) => {
                tracing::warn!(
                    slot = slot.name(),
                    path = %path.display(),
                    error = %err,
                    "failed to read slot; starting empty"
                );
                return T::default();
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    slot = slot.name(),
                    path = %path.display(),
                    error = %err,
                    "malformed slot snapshot; starting empty"
                );
                T::default()
            }
        }
    }

    /// Replace a slot's snapshot wholesale.
    pub fn save<T>(&self, slot: Slot, value: &T) -> Result<(), Error>
    where
        T: Serialize,
    {
        let path = self.slot_path(slot);
        let blob = serde_json::to_vec(value).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode slot snapshot")
                .with_slot(slot.name())
                .with_source(err)
        })?;
        std::fs::write(&path, blob).map_err(|err| {
            Error::new(map_io_error_kind(&err))
                .with_message("failed to write slot snapshot")
                .with_slot(slot.name())
                .with_path(&path)
                .with_source(err)
        })
    }

    /// Remove a slot file if present. Used when logout clears the stored user.
    pub fn clear(&self, slot: Slot) -> Result<(), Error> {
        let path = self.slot_path(slot);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::new(map_io_error_kind(&err))
                .with_message("failed to clear slot")
                .with_slot(slot.name())
                .with_path(&path)
                .with_source(err)),
        }
    }
}

fn map_io_error_kind(err: &std::io::Error) -> ErrorKind {
    match err.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound,
        _ => ErrorKind::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::{Slot, SlotStore, default_state_dir};
    use tempfile::tempdir;

    #[test]
    fn default_dir_is_under_home() {
        let dir = default_state_dir();
        assert!(dir.to_string_lossy().contains(".bookbridge"));
        assert!(dir.ends_with("state"));
    }

    #[test]
    fn slot_files_use_fixed_names() {
        let dir = tempdir().expect("tempdir");
        let store = SlotStore::open(dir.path()).expect("open");
        assert_eq!(
            store.slot_path(Slot::Books),
            dir.path().join("books.json")
        );
        assert_eq!(store.slot_path(Slot::User), dir.path().join("user.json"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().expect("tempdir");
        let store = SlotStore::open(dir.path()).expect("open");
        let values = vec!["a".to_string(), "b".to_string()];
        store.save(Slot::Books, &values).expect("save");
        let loaded: Vec<String> = store.load(Slot::Books);
        assert_eq!(loaded, values);
    }

    #[test]
    fn absent_slot_loads_default() {
        let dir = tempdir().expect("tempdir");
        let store = SlotStore::open(dir.path()).expect("open");
        let loaded: Vec<String> = store.load(Slot::Requests);
        assert!(loaded.is_empty());
    }

    #[test]
    fn malformed_slot_loads_default() {
        let dir = tempdir().expect("tempdir");
        let store = SlotStore::open(dir.path()).expect("open");
        std::fs::write(store.slot_path(Slot::Books), b"{not json").expect("write");
        let loaded: Vec<String> = store.load(Slot::Books);
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_overwrites_whole_snapshot() {
        let dir = tempdir().expect("tempdir");
        let store = SlotStore::open(dir.path()).expect("open");
        store
            .save(Slot::Books, &vec!["a".to_string(), "b".to_string()])
            .expect("save");
        store.save(Slot::Books, &vec!["c".to_string()]).expect("save");
        let loaded: Vec<String> = store.load(Slot::Books);
        assert_eq!(loaded, vec!["c".to_string()]);
    }

    #[test]
    fn clear_removes_slot_and_tolerates_absence() {
        let dir = tempdir().expect("tempdir");
        let store = SlotStore::open(dir.path()).expect("open");
        store.save(Slot::User, &Some("u".to_string())).expect("save");
        store.clear(Slot::User).expect("clear");
        assert!(!store.slot_path(Slot::User).exists());
        store.clear(Slot::User).expect("clear absent");
    }
}
