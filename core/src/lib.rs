//! Runtime ownership-transfer audit for Handoff.
//!
//! The pieces, bottom-up:
//!
//! - [`Frame`]: an explicit binding scope (name -> value, handle or tombstone)
//! - [`scrub`]: rewriting a frame so aliases of a moved object become tombstones
//! - [`Handle`]: the one-shot consumption guard
//! - [`Auditor`]: the ownership guard that ties them into a scoped transfer
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use handoff_core::{Auditor, Frame, Handle};
//! use handoff_types::{MoveError, Value};
//!
//! type Record = BTreeMap<String, String>;
//!
//! fn get_id(value: &Handle<Record>) -> Result<Option<String>, MoveError> {
//!     let record = value.consume()?.into_object().expect("records are objects");
//!     Ok(record.borrow_mut().remove("id"))
//! }
//!
//! let mut record = Record::new();
//! record.insert("id".to_string(), "foobar".to_string());
//!
//! let mut frame = Frame::new("caller");
//! frame.bind("value", Value::object(record));
//!
//! let id = Auditor::enabled().transfer_binding(&mut frame, "value", |frame, moved_value| {
//!     let id = get_id(&moved_value)?;
//!     frame.unbind("value")?;
//!     Ok::<_, MoveError>(id)
//! })?;
//! assert_eq!(id.as_deref(), Some("foobar"));
//! # Ok::<(), MoveError>(())
//! ```

mod auditor;
mod frame;
mod handle;
pub mod scrub;

pub use auditor::Auditor;
pub use frame::{Binding, Frame};
pub use handle::{Handle, consume};
