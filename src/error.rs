//! Error types used by the dispatch engine and handlers.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] — errors surfaced to the caller of a raise or a
//!   registration operation.
//! - [`HandlerError`] — errors produced by individual handler bodies.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.
//!
//! Handler errors are never swallowed: they always reach the raise caller as
//! a [`DispatchError::HandlerFailed`] (or, for a concurrent pass with several
//! failures, a [`DispatchError::PassFailed`]). The engine provides no
//! automatic retry; retry, if desired, is the caller's responsibility.

use std::sync::Arc;
use thiserror::Error;

/// # Errors produced by handler bodies.
///
/// A handler either fails with a message ([`HandlerError::Failed`]) or
/// panics; panics are caught by the engine and reported as
/// [`HandlerError::Panicked`] instead of unwinding through a raise.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {0}")]
    Failed(String),

    /// Handler panicked; the payload message is captured when possible.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed(_) => "handler_failed",
            HandlerError::Panicked(_) => "handler_panicked",
        }
    }
}

impl From<String> for HandlerError {
    fn from(msg: String) -> Self {
        HandlerError::Failed(msg)
    }
}

impl From<&str> for HandlerError {
    fn from(msg: &str) -> Self {
        HandlerError::Failed(msg.to_string())
    }
}

/// # Errors surfaced by registration and raise operations.
///
/// Registration argument errors ([`DispatchError::InvalidHandler`]) are
/// local, synchronous, and never deferred into a dispatch pass. Handler
/// failures abort the remainder of a sync/sequential pass; a concurrent pass
/// lets already-started handlers finish and then reports the outcome.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A structurally invalid handler or binding was passed to a
    /// registration operation (for example, re-registering a binding handle
    /// that is still live in the container).
    #[error("invalid handler: {reason}")]
    InvalidHandler {
        /// What was wrong with the argument.
        reason: String,
    },

    /// A handler failed during dispatch. In sync and sequential passes this
    /// aborts the remaining handlers of that pass.
    #[error("handler '{handler}' failed: {source}")]
    HandlerFailed {
        /// Name of the failing handler.
        handler: Arc<str>,
        /// The underlying handler error.
        source: HandlerError,
    },

    /// Several handlers of a concurrent pass failed. Every started handler
    /// was allowed to run to completion before this was reported; `handler`
    /// and `source` identify the first observed failure.
    #[error("{failed} of {started} handlers failed; first '{handler}': {source}")]
    PassFailed {
        /// Number of failing handlers.
        failed: usize,
        /// Number of handlers started in the pass.
        started: usize,
        /// Name of the first failing handler.
        handler: Arc<str>,
        /// Error of the first failing handler.
        source: HandlerError,
    },
}

impl DispatchError {
    pub(crate) fn invalid_handler(reason: impl Into<String>) -> Self {
        DispatchError::InvalidHandler { reason: reason.into() }
    }

    pub(crate) fn handler_failed(handler: &Arc<str>, source: HandlerError) -> Self {
        DispatchError::HandlerFailed { handler: Arc::clone(handler), source }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use evoke::DispatchError;
    ///
    /// let err = DispatchError::InvalidHandler { reason: "null".into() };
    /// assert_eq!(err.as_label(), "invalid_handler");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::InvalidHandler { .. } => "invalid_handler",
            DispatchError::HandlerFailed { .. } => "handler_failed",
            DispatchError::PassFailed { .. } => "pass_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::InvalidHandler { reason } => format!("invalid handler: {reason}"),
            DispatchError::HandlerFailed { handler, source } => {
                format!("handler '{handler}' failed: {source}")
            }
            DispatchError::PassFailed { failed, started, handler, source } => {
                format!("{failed}/{started} handlers failed; first '{handler}': {source}")
            }
        }
    }

    /// The first handler failure behind this error, if any.
    pub fn first_failure(&self) -> Option<&HandlerError> {
        match self {
            DispatchError::InvalidHandler { .. } => None,
            DispatchError::HandlerFailed { source, .. }
            | DispatchError::PassFailed { source, .. } => Some(source),
        }
    }
}
