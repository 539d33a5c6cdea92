//! Purpose: Book donation exchange core: workflow state, notifications, snapshots.
//! Exports: `api` (stable surface) and `core` (engine, session, slots, errors).
//! Role: Library behind a donation marketplace UI; no server or CLI lives here.
//! Invariants: State persists as whole-snapshot JSON slots; the last writer wins.
//! Invariants: Status enums are closed and transitions are matched exhaustively.
pub mod api;
pub mod core;
