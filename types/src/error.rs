//! The move-error family.
//!
//! Every variant is a defect in caller discipline. None of them are retried or
//! recovered from inside the guard; they propagate to whoever opened the
//! transfer.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::{ObjectId, Tombstone, TransferId};

/// Where a uniqueness violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSite {
    /// Census at the start of a transfer found extra owners.
    Acquire,
    /// A handle was unwrapped a second time.
    Consume,
}

impl fmt::Display for AccessSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessSite::Acquire => "acquire",
            AccessSite::Consume => "consume",
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("no unique access to {object} ({type_name}) at {site}: {aliases} other owner(s)")]
pub struct NoUniqueAccessError {
    pub object: ObjectId,
    pub type_name: &'static str,
    pub site: AccessSite,
    /// Owners past the claim: extra bindings at acquire, the earlier
    /// consumer at consume.
    pub aliases: usize,
}

#[derive(Debug, Clone, Error)]
#[error("{transfer} leaked {object} through {}", leaked_names(.leaked))]
pub struct LeakedMoveError {
    pub transfer: TransferId,
    pub object: ObjectId,
    /// Leaked binding name -> the tombstone now installed there.
    pub leaked: BTreeMap<String, Tombstone>,
}

impl LeakedMoveError {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.leaked.keys().map(String::as_str)
    }
}

fn leaked_names(leaked: &BTreeMap<String, Tombstone>) -> String {
    leaked
        .keys()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reading a binding that does not hold what the caller expected.
#[derive(Debug, Clone, Error)]
pub enum BindingError {
    #[error("binding `{name}` is unbound")]
    Unbound { name: String },
    #[error("binding `{name}` was moved out and now holds {tombstone}")]
    Moved { name: String, tombstone: Tombstone },
    #[error("binding `{name}` holds a transfer handle, not a value")]
    NotAValue { name: String },
    #[error("binding `{name}` does not hold a transfer handle")]
    NotAHandle { name: String },
}

#[derive(Debug, Clone, Error)]
pub enum MoveError {
    #[error(transparent)]
    NoUniqueAccess(#[from] NoUniqueAccessError),
    #[error(transparent)]
    Leaked(#[from] LeakedMoveError),
    #[error("handle for {object} used after {transfer} ended")]
    Expired {
        transfer: TransferId,
        object: ObjectId,
    },
    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl MoveError {
    #[must_use]
    pub fn is_no_unique_access(&self) -> bool {
        matches!(self, MoveError::NoUniqueAccess(_))
    }

    #[must_use]
    pub fn is_leak(&self) -> bool {
        matches!(self, MoveError::Leaked(_))
    }

    #[must_use]
    pub fn as_leak(&self) -> Option<&LeakedMoveError> {
        match self {
            MoveError::Leaked(err) => Some(err),
            _ => None,
        }
    }
}
