//! Recoverable gameplay errors.
//!
//! Nothing in the gameplay core is fatal. These values are either returned
//! (bad indices) or logged and then the operation degrades (missing modules,
//! exhausted pools).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A required module or reference is absent.
    #[error("{owner}: missing {collaborator}")]
    MissingCollaborator {
        owner: String,
        collaborator: &'static str,
    },

    /// Fewer items available than requested; as many as possible were used.
    #[error("not enough {resource}: requested {requested}, available {available}")]
    ResourceExhausted {
        resource: &'static str,
        requested: usize,
        available: usize,
    },

    /// Out-of-range selection or revert index.
    #[error("invalid {what} index {index} (len {len})")]
    InvalidIndex {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl GameError {
    pub fn missing(owner: impl Into<String>, collaborator: &'static str) -> Self {
        Self::MissingCollaborator {
            owner: owner.into(),
            collaborator,
        }
    }
}
