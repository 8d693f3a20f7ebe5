//! Use case error types.

/// Message send is the only operation with a hard failure path; everything
/// else degrades silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendMessageError {
    #[error("failed to persist message: {0}")]
    PersistFailed(String),
}
