//! Explicit binding scopes.
//!
//! A [`Frame`] is the name -> binding table of one invocation. The auditor
//! rewrites it through `&mut`, so a scrubbed binding is observed as a
//! tombstone by every later read in the same scope.

use std::collections::BTreeMap;
use std::collections::btree_map::IterMut;

use handoff_types::{BindingError, ObjectId, Tombstone, Value};

use crate::Handle;

/// What a name is bound to.
#[derive(Debug)]
pub enum Binding<T> {
    Value(Value<T>),
    Handle(Handle<T>),
    /// The value was moved out; only its tombstone remains.
    Moved(Tombstone),
}

impl<T> Binding<T> {
    /// True if this binding still refers to `object`, by value, by handle or
    /// by tombstone.
    #[must_use]
    pub fn denotes(&self, object: ObjectId) -> bool {
        match self {
            Binding::Value(value) => value.is(object),
            Binding::Handle(handle) => handle.object() == Some(object),
            Binding::Moved(tombstone) => tombstone.object() == object,
        }
    }

    #[must_use]
    pub fn is_moved(&self) -> bool {
        matches!(self, Binding::Moved(_))
    }

    #[must_use]
    pub fn as_tombstone(&self) -> Option<&Tombstone> {
        match self {
            Binding::Moved(tombstone) => Some(tombstone),
            Binding::Value(_) | Binding::Handle(_) => None,
        }
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Binding::Value(value) => Binding::Value(value.clone()),
            Binding::Handle(handle) => Binding::Handle(handle.clone()),
            Binding::Moved(tombstone) => Binding::Moved(*tombstone),
        }
    }
}

impl<T> From<Value<T>> for Binding<T> {
    fn from(value: Value<T>) -> Self {
        Binding::Value(value)
    }
}

impl<T> From<Handle<T>> for Binding<T> {
    fn from(handle: Handle<T>) -> Self {
        Binding::Handle(handle)
    }
}

impl<T> From<Tombstone> for Binding<T> {
    fn from(tombstone: Tombstone) -> Self {
        Binding::Moved(tombstone)
    }
}

/// The bindings of one lexical scope.
#[derive(Debug)]
pub struct Frame<T> {
    name: String,
    bindings: BTreeMap<String, Binding<T>>,
}

impl<T> Frame<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `name`, returning whatever it was bound to before.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        binding: impl Into<Binding<T>>,
    ) -> Option<Binding<T>> {
        self.bindings.insert(name.into(), binding.into())
    }

    /// Remove `name` from the scope (`del name`).
    pub fn unbind(&mut self, name: &str) -> Result<Binding<T>, BindingError> {
        self.bindings.remove(name).ok_or_else(|| unbound(name))
    }

    /// Bind `target` to whatever `source` is bound to (`target = source`).
    pub fn alias(&mut self, target: impl Into<String>, source: &str) -> Result<(), BindingError> {
        let binding = self.get(source)?.clone();
        self.bindings.insert(target.into(), binding);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Binding<T>, BindingError> {
        self.bindings.get(name).ok_or_else(|| unbound(name))
    }

    /// Read a live value. A tombstone in its place is an error, never the value.
    pub fn value(&self, name: &str) -> Result<&Value<T>, BindingError> {
        match self.get(name)? {
            Binding::Value(value) => Ok(value),
            Binding::Moved(tombstone) => Err(BindingError::Moved {
                name: name.to_string(),
                tombstone: *tombstone,
            }),
            Binding::Handle(_) => Err(BindingError::NotAValue {
                name: name.to_string(),
            }),
        }
    }

    pub fn handle(&self, name: &str) -> Result<&Handle<T>, BindingError> {
        match self.get(name)? {
            Binding::Handle(handle) => Ok(handle),
            Binding::Moved(tombstone) => Err(BindingError::Moved {
                name: name.to_string(),
                tombstone: *tombstone,
            }),
            Binding::Value(_) => Err(BindingError::NotAHandle {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Names whose binding still refers to `object`.
    pub fn aliases_of(&self, object: ObjectId) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter(move |(_, binding)| binding.denotes(object))
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, String, Binding<T>> {
        self.bindings.iter_mut()
    }
}

fn unbound(name: &str) -> BindingError {
    BindingError::Unbound {
        name: name.to_string(),
    }
}
