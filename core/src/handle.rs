//! The consumption guard.
//!
//! A tracked [`Handle`] owns the transferred object until someone unwraps it.
//! Unwrapping moves the object out and sets the handle's consumed-bit; a
//! second unwrap finds the slot empty and is reported as a second owner.
//! Clones of a handle share the slot, so forwarding one handle to two
//! consumers is caught the same way.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use handoff_types::{
    AccessSite, MoveError, NoUniqueAccessError, ObjectId, Shared, Tombstone, TransferId, Value,
};

pub(crate) struct HandleState<T> {
    transfer: TransferId,
    tombstone: Tombstone,
    slot: RefCell<Option<Shared<T>>>,
    consumed: Cell<bool>,
    open: Cell<bool>,
}

impl<T> HandleState<T> {
    pub(crate) fn new(transfer: TransferId, shared: Shared<T>) -> Self {
        Self {
            transfer,
            tombstone: shared.tombstone(),
            slot: RefCell::new(Some(shared)),
            consumed: Cell::new(false),
            open: Cell::new(true),
        }
    }

    pub(crate) fn transfer(&self) -> TransferId {
        self.transfer
    }

    pub(crate) fn object(&self) -> ObjectId {
        self.tombstone.object()
    }

    pub(crate) fn tombstone(&self) -> &Tombstone {
        &self.tombstone
    }

    /// Retire the handle. An object nobody claimed is released here.
    /// Returns whether the object had been consumed.
    pub(crate) fn close(&self) -> bool {
        self.open.set(false);
        drop(self.slot.borrow_mut().take());
        self.consumed.get()
    }

    fn take(&self) -> Result<Shared<T>, MoveError> {
        if !self.open.get() {
            return Err(MoveError::Expired {
                transfer: self.transfer,
                object: self.object(),
            });
        }
        let shared = self.slot.borrow_mut().take().ok_or(NoUniqueAccessError {
            object: self.object(),
            type_name: self.tombstone.type_name(),
            site: AccessSite::Consume,
            aliases: 1,
        })?;
        self.consumed.set(true);
        Ok(shared)
    }
}

enum Mode<T> {
    Tracked(Rc<HandleState<T>>),
    /// Exempt values, or any value when runtime checks are off.
    PassThrough(Value<T>),
}

/// Branded proxy for a value inside an open transfer.
pub struct Handle<T> {
    mode: Mode<T>,
}

impl<T> Handle<T> {
    pub(crate) fn tracked(state: Rc<HandleState<T>>) -> Self {
        Self {
            mode: Mode::Tracked(state),
        }
    }

    pub(crate) fn pass_through(value: Value<T>) -> Self {
        Self {
            mode: Mode::PassThrough(value),
        }
    }

    /// Unwrap the handle into the real value.
    ///
    /// Succeeds once per tracked handle. A second call, through this handle or
    /// any clone of it, fails with [`MoveError::NoUniqueAccess`]; a call after
    /// the transfer ended fails with [`MoveError::Expired`]. Pass-through
    /// handles keep no state and always succeed.
    pub fn consume(&self) -> Result<Value<T>, MoveError> {
        match &self.mode {
            Mode::PassThrough(value) => Ok(value.clone()),
            Mode::Tracked(state) => match state.take() {
                Ok(shared) => {
                    tracing::debug!(
                        transfer = %state.transfer(),
                        object = %state.object(),
                        "Handle consumed"
                    );
                    Ok(Value::Object(shared))
                }
                Err(err) => {
                    tracing::warn!(transfer = %state.transfer(), "Handle consume rejected: {err}");
                    Err(err)
                }
            },
        }
    }

    /// Identity of the object this handle denotes, if it is an object.
    #[must_use]
    pub fn object(&self) -> Option<ObjectId> {
        match &self.mode {
            Mode::Tracked(state) => Some(state.object()),
            Mode::PassThrough(value) => value.object_id(),
        }
    }

    #[must_use]
    pub fn transfer(&self) -> Option<TransferId> {
        match &self.mode {
            Mode::Tracked(state) => Some(state.transfer()),
            Mode::PassThrough(_) => None,
        }
    }

    #[must_use]
    pub fn is_tracked(&self) -> bool {
        matches!(self.mode, Mode::Tracked(_))
    }

    #[must_use]
    pub fn is_consumed(&self) -> bool {
        match &self.mode {
            Mode::Tracked(state) => state.consumed.get(),
            Mode::PassThrough(_) => false,
        }
    }

    /// False once the owning transfer has ended.
    #[must_use]
    pub fn is_open(&self) -> bool {
        match &self.mode {
            Mode::Tracked(state) => state.open.get(),
            Mode::PassThrough(_) => true,
        }
    }
}

/// Free-function form of [`Handle::consume`].
pub fn consume<T>(handle: &Handle<T>) -> Result<Value<T>, MoveError> {
    handle.consume()
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        let mode = match &self.mode {
            Mode::Tracked(state) => Mode::Tracked(Rc::clone(state)),
            Mode::PassThrough(value) => Mode::PassThrough(value.clone()),
        };
        Self { mode }
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Mode::Tracked(state) => f
                .debug_struct("Handle")
                .field("transfer", &state.transfer())
                .field("object", &state.object())
                .field("open", &state.open.get())
                .field("consumed", &self.is_consumed())
                .finish(),
            Mode::PassThrough(value) => f.debug_tuple("Handle").field(value).finish(),
        }
    }
}
