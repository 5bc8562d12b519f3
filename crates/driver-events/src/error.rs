//! # Hub Errors
//!
//! Failures surfaced by [`EventHub::subscribe`](crate::EventHub::subscribe),
//! [`EventPublisher::publish`](crate::EventPublisher::publish) and
//! configuration parsing.

use thiserror::Error;

/// Boxed error produced by a listener, kept as the `source` of a failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from parsing hub configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A policy setting had a value outside its known set.
    #[error("unknown {setting} `{value}`")]
    UnknownValue {
        /// The setting being parsed.
        setting: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// A single listener that returned an error while handling an event.
#[derive(Debug, Error)]
#[error("listener `{listener}` failed handling `{event}`: {source}")]
pub struct HandlerFailure {
    /// Name of the failing subscriber.
    pub listener: &'static str,
    /// Type name of the event being delivered.
    pub event: &'static str,
    /// The error returned by the listener.
    #[source]
    pub source: BoxError,
}

/// Errors from hub operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// The subscriber declared no listener contract for any event type.
    #[error("`{subscriber}` does not listen to any event type; nothing was subscribed")]
    InvalidSubscriber {
        /// Name of the rejected subscriber.
        subscriber: &'static str,
    },

    /// The same subscriber instance was registered twice under
    /// [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject).
    #[error("`{subscriber}` is already subscribed")]
    DuplicateSubscriber {
        /// Name of the rejected subscriber.
        subscriber: &'static str,
    },

    /// A listener failed and delivery stopped there.
    #[error(transparent)]
    HandlerFailure(#[from] HandlerFailure),

    /// One or more listeners failed under isolated delivery.
    /// Every listener was still invoked.
    #[error("{} of {attempted} listeners failed handling `{event}`", .failures.len())]
    HandlerFailures {
        /// Type name of the event being delivered.
        event: &'static str,
        /// Number of listeners invoked.
        attempted: usize,
        /// Failures in registration order.
        failures: Vec<HandlerFailure>,
    },
}

impl HubError {
    /// Returns a short stable label for logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::InvalidSubscriber { .. } => "invalid_subscriber",
            HubError::DuplicateSubscriber { .. } => "duplicate_subscriber",
            HubError::HandlerFailure(_) => "handler_failure",
            HubError::HandlerFailures { .. } => "handler_failures",
        }
    }

    /// True if the error came from a listener rather than from the caller.
    pub fn is_handler_failure(&self) -> bool {
        matches!(
            self,
            HubError::HandlerFailure(_) | HubError::HandlerFailures { .. }
        )
    }
}
