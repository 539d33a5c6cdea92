// Core modules implementing domain state, persistence, identity, and error modeling.
pub mod catalog;
pub mod clock;
pub mod engine;
pub mod error;
pub mod ids;
pub mod model;
pub mod notify;
pub mod session;
pub mod slot;
