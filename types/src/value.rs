//! Values that can sit in a binding.
//!
//! [`Shared`] is the aliasable heap object whose ownership gets audited: cloning
//! it creates another alias, and its strong count is the owner census.
//! [`Value`] adds the primitive kinds that are exempt from auditing.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::ObjectId;
use crate::tombstone::Tombstone;

struct Inner<T> {
    id: ObjectId,
    value: RefCell<T>,
}

/// An identity-comparable, reference-counted heap object.
///
/// `Clone` is aliasing, not copying: both handles observe the same payload and
/// the same [`ObjectId`].
pub struct Shared<T>(Rc<Inner<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            id: ObjectId::next(),
            value: RefCell::new(value),
        }))
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Number of live aliases, this one included.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.value.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.value.borrow_mut()
    }

    /// Placeholder naming this object, for a binding it was moved out of.
    #[must_use]
    pub fn tombstone(&self) -> Tombstone {
        Tombstone::of(self)
    }

    /// An observer that does not count as an alias.
    #[must_use]
    pub fn downgrade(&self) -> WeakShared<T> {
        WeakShared {
            id: self.0.id,
            inner: Rc::downgrade(&self.0),
        }
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Shared");
        s.field("id", &self.0.id);
        match self.0.value.try_borrow() {
            Ok(value) => s.field("value", &*value),
            Err(_) => s.field("value", &"<borrowed>"),
        };
        s.finish()
    }
}

/// Non-owning observer of a [`Shared`].
pub struct WeakShared<T> {
    id: ObjectId,
    inner: Weak<Inner<T>>,
}

impl<T> WeakShared<T> {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn upgrade(&self) -> Option<Shared<T>> {
        self.inner.upgrade().map(Shared)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> Clone for WeakShared<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakShared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakShared")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Text,
    Object,
}

impl ValueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Text => "text",
            ValueKind::Object => "object",
        }
    }
}

/// Anything a binding can hold as a live value.
///
/// `Int` and `Text` behave like interned primitives: their sharing is an
/// artifact of representation, so they are never audited.
pub enum Value<T> {
    Int(i64),
    Text(Rc<str>),
    Object(Shared<T>),
}

impl<T> Value<T> {
    pub fn object(value: T) -> Self {
        Value::Object(Shared::new(value))
    }

    pub fn text(value: &str) -> Self {
        Value::Text(Rc::from(value))
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Text(_) => ValueKind::Text,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Exempt values skip the uniqueness census and alias scrubbing; the
    /// auditor hands them through untracked.
    #[must_use]
    pub const fn is_exempt(&self) -> bool {
        !matches!(self, Value::Object(_))
    }

    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Object(shared) => Some(shared.id()),
            Value::Int(_) | Value::Text(_) => None,
        }
    }

    #[must_use]
    pub fn into_object(self) -> Option<Shared<T>> {
        match self {
            Value::Object(shared) => Some(shared),
            Value::Int(_) | Value::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(_) | Value::Object(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Int(_) | Value::Object(_) => None,
        }
    }

    /// True if `self` denotes `object` by identity.
    #[must_use]
    pub fn is(&self, object: ObjectId) -> bool {
        self.object_id() == Some(object)
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        match self {
            Value::Int(n) => Value::Int(*n),
            Value::Text(text) => Value::Text(Rc::clone(text)),
            Value::Object(shared) => Value::Object(shared.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Object(shared) => f.debug_tuple("Object").field(shared).finish(),
        }
    }
}

impl<T> From<Shared<T>> for Value<T> {
    fn from(value: Shared<T>) -> Self {
        Value::Object(value)
    }
}

impl<T> From<i64> for Value<T> {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl<T> From<&str> for Value<T> {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}
