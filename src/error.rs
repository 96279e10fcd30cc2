//! Unified error handling for linecast.
//!
//! Each concern gets its own error enum; binaries surface them through
//! `anyhow` at the top level.

use thiserror::Error;

// ============================================================================
// Coordinator Errors (actor operations)
// ============================================================================

/// Errors returned by [`crate::state::CoordinatorHandle`] operations.
///
/// Registry operations themselves never fail; the only failure is the
/// coordinator task having stopped, which happens during shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("coordinator is not running")]
    Closed,
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CoordinatorError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for CoordinatorError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::Closed
    }
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur while a command handler runs.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Writing the reply to the client failed; the session is over.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Coordinator(_) => "coordinator_closed",
        }
    }
}

// ============================================================================
// Session Errors (connection lifecycle)
// ============================================================================

/// Errors that end a session before its read loop starts.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

// ============================================================================
// Storage Errors (session log, metrics store)
// ============================================================================

/// Failures of the storage collaborators. Always recoverable: the caller logs
/// them and carries on without the side effect.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
