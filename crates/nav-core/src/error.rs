//! Navigation error types

use thiserror::Error;

use crate::step::Identity;

/// Failure of a single surface commit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The presenter refused the mutation
    #[error("Commit rejected: {0}")]
    Rejected(String),

    /// The mutation was interrupted before completing
    #[error("Commit interrupted")]
    Interrupted,

    /// The commit named a target outside the new live list
    #[error("Commit target {target} out of range for {len} screens")]
    InvalidTarget {
        /// Requested target index
        target: usize,
        /// Length of the committed list
        len: usize,
    },
}

/// Navigation errors
///
/// Delivered through the request's completion, never raised across the
/// core/adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The step's identity exists nowhere in the reachable subtree
    #[error("Unreachable step: {step}")]
    Unreachable {
        /// Identity that could not be resolved
        step: Identity,
    },

    /// A surface adapter failed to commit
    #[error("Commit failed: {0}")]
    Commit(#[from] CommitError),

    /// A relative move had nothing to move within
    #[error("No relative target: {0}")]
    NoRelativeTarget(String),

    /// The navigator is no longer running
    #[error("Navigator closed")]
    Closed,

    /// Too many requests are already waiting
    #[error("Navigation queue full ({0} pending)")]
    QueueFull(usize),

    /// An interactive transition could not be handed over
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),
}

impl NavigationError {
    /// Build an unreachable error for an identity
    pub fn unreachable(step: &Identity) -> Self {
        Self::Unreachable { step: step.clone() }
    }
}

/// Interactive transition errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// A transition is already in progress
    #[error("Transition already in progress")]
    NotIdle,

    /// No transition is in progress
    #[error("No transition in progress")]
    NotActive,

    /// Committing the pending target failed
    #[error("Transition commit failed: {0}")]
    Commit(#[from] CommitError),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;
