//! Core ownership-transfer types for Handoff.
//!
//! This crate contains pure domain types with no IO and no logging:
//! object identity, aliasable values, tombstones, the compile-time
//! [`Moved`] token and the move-error family. The runtime audit that
//! uses them lives in `handoff-core`.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod checks;
mod error;
mod ids;
mod moved;
mod tombstone;
mod value;

pub use checks::RuntimeChecks;
pub use error::{AccessSite, BindingError, LeakedMoveError, MoveError, NoUniqueAccessError};
pub use ids::{ObjectId, TransferId};
pub use moved::{Moved, give};
pub use tombstone::Tombstone;
pub use value::{Shared, Value, ValueKind, WeakShared};
