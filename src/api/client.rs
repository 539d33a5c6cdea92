//! Purpose: Define the public API client surface for local state resolution.
//! Exports: `LocalClient` and exchange/session lifecycle operations.
//! Role: Stable boundary for applications; one place resolves the state directory.
//! Invariants: Default state directory remains `~/.bookbridge/state`.
//! Invariants: Handles opened from one client share the same slot files.
#![allow(clippy::result_large_err)]

use crate::core::engine::Exchange;
use crate::core::error::Error;
use crate::core::session::Session;
use crate::core::slot::{SlotStore, default_state_dir};
use std::path::{Path, PathBuf};

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug)]
pub struct LocalClient {
    state_dir: PathBuf,
}

impl LocalClient {
    pub fn new() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }

    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Open the slot store, creating the state directory when missing.
    pub fn open_store(&self) -> ApiResult<SlotStore> {
        SlotStore::open(&self.state_dir)
    }

    pub fn open_exchange(&self) -> ApiResult<Exchange> {
        Ok(Exchange::open(self.open_store()?))
    }

    pub fn open_session(&self) -> ApiResult<Session> {
        Ok(Session::open(self.open_store()?))
    }
}

impl Default for LocalClient {
    fn default() -> Self {
        Self::new()
    }
}
