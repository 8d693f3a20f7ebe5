//! Shared utilities for the Parlor chat relay.
//!
//! Transport-independent pieces used by the server crate and its tests:
//! clock abstraction and logging setup.

pub mod logger;
pub mod time;
