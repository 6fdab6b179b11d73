//! Error types for remote API interactions
//!
//! The remote side distinguishes three conditions this crate cares about:
//! a missing target group (a precondition failure, not transient), the two
//! convergent rule errors (duplicate-on-add, not-found-on-remove — the
//! desired end state is already reached), and everything else, which is
//! surfaced unchanged so the caller's scheduler can retry the whole
//! reconciliation.

use thiserror::Error;

/// Remote code for an add that already exists. Convergent: swallowed by the
/// apply engine.
pub const CODE_PERMISSION_DUPLICATE: &str = "InvalidPermission.Duplicate";

/// Remote code for a remove of a rule that is already absent. Convergent.
pub const CODE_PERMISSION_NOT_FOUND: &str = "InvalidPermission.NotFound";

/// Remote code for a mutating call against a group that does not exist.
pub const CODE_GROUP_NOT_FOUND: &str = "InvalidGroupId.NotFound";

#[derive(Error, Debug)]
pub enum Error {
    /// The target security group does not exist. Callers should treat this
    /// as a failed precondition rather than a transient fault.
    #[error("security group not found: {0}")]
    GroupNotFound(String),

    /// Any other remote API failure, with the remote code and message kept
    /// together for diagnostics.
    #[error("remote API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    fn has_code(&self, wanted: &str) -> bool {
        matches!(self, Error::Api { code, .. } if code == wanted)
    }

    /// True for the convergent duplicate-on-add condition.
    pub fn is_duplicate(&self) -> bool {
        self.has_code(CODE_PERMISSION_DUPLICATE)
    }

    /// True for the convergent not-found-on-remove condition.
    pub fn is_rule_absent(&self) -> bool {
        self.has_code(CODE_PERMISSION_NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
