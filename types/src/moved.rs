//! Compile-time ownership token.
//!
//! `Moved<T>` is the zero-overhead counterpart of an audited transfer: the
//! compiler already refuses a second owner, so there is nothing to check at
//! runtime.
//!
//! Unpacking twice does not compile:
//!
//! ```compile_fail
//! use handoff_types::give;
//!
//! let moved = give(String::from("foobar"));
//! let first = moved.unpack();
//! let second = moved.unpack();
//! ```
//!
//! Neither does touching the source after giving it away:
//!
//! ```compile_fail
//! use handoff_types::give;
//!
//! let value = vec![1, 2, 3];
//! let moved = give(value);
//! value.len();
//! ```
//!
//! And a token cannot be duplicated to hand to two consumers:
//!
//! ```compile_fail
//! use handoff_types::Moved;
//!
//! fn consume(value: Moved<String>) -> String {
//!     value.unpack()
//! }
//!
//! let moved = Moved::new(String::from("foobar"));
//! let copy = moved.clone();
//! consume(moved);
//! consume(copy);
//! ```

/// A value whose ownership is being handed to a callee.
#[must_use = "a moved value must be unpacked by its new owner"]
#[derive(Debug)]
pub struct Moved<T>(T);

impl<T> Moved<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Take ownership. Consumes the token.
    pub fn unpack(self) -> T {
        self.0
    }

    /// Transform the payload without releasing the token.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Moved<U> {
        Moved(f(self.0))
    }

    #[must_use]
    pub fn peek(&self) -> &T {
        &self.0
    }
}

/// Give `value` away.
///
/// ```
/// use std::collections::BTreeMap;
/// use handoff_types::{Moved, give};
///
/// fn get_id(value: Moved<BTreeMap<String, String>>) -> Option<String> {
///     value.unpack().remove("id")
/// }
///
/// let mut value = BTreeMap::new();
/// value.insert("id".to_string(), "foobar".to_string());
/// assert_eq!(get_id(give(value)).as_deref(), Some("foobar"));
/// ```
pub const fn give<T>(value: T) -> Moved<T> {
    Moved::new(value)
}
