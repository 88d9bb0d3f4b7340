//! The ownership guard.
//!
//! [`Auditor::transfer`] wraps a value hand-off in a scoped region:
//!
//! ```text
//! census -> scrub caller frame -> body(frame, handle) -> sweep frame -> retire handle
//!   |                                                        |
//!   v                                                        v
//! NoUniqueAccess                                         Leaked (body returned Ok)
//! ```
//!
//! The sweep and the handle retirement run whether the body returns `Ok` or
//! `Err`. A panic unwinding out of the body still retires the handle.

use std::any::type_name;
use std::collections::BTreeMap;
use std::rc::Rc;

use handoff_config::HandoffConfig;
use handoff_types::{
    AccessSite, LeakedMoveError, MoveError, NoUniqueAccessError, RuntimeChecks, Shared,
    Tombstone, TransferId, Value,
};

use crate::handle::HandleState;
use crate::{Frame, Handle, scrub};

/// Owners allowed at acquisition: the caller's binding plus the value moved
/// into the call.
const ACQUIRE_BASELINE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Auditor {
    checks: RuntimeChecks,
}

impl Auditor {
    #[must_use]
    pub const fn new(checks: RuntimeChecks) -> Self {
        Self { checks }
    }

    #[must_use]
    pub const fn enabled() -> Self {
        Self::new(RuntimeChecks::Enabled)
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(RuntimeChecks::Disabled)
    }

    #[must_use]
    pub fn from_config(config: &HandoffConfig) -> Self {
        Self::new(config.runtime_checks())
    }

    #[must_use]
    pub const fn checks(&self) -> RuntimeChecks {
        self.checks
    }

    /// Transfer ownership of `value` to `body`.
    ///
    /// `frame` is the caller's scope. On entry every binding in it that is
    /// `value` is replaced by a tombstone; `body` receives the frame and a
    /// [`Handle`] to unwrap with [`Handle::consume`]. On exit every binding
    /// that still denotes the value is tombstoned and reported.
    ///
    /// Exempt values, and every value when checks are disabled, pass straight
    /// through: no census, no scrubbing, an untracked handle.
    pub fn transfer<T, R, E, F>(
        &self,
        frame: &mut Frame<T>,
        value: Value<T>,
        body: F,
    ) -> Result<R, E>
    where
        E: From<MoveError>,
        F: FnOnce(&mut Frame<T>, Handle<T>) -> Result<R, E>,
    {
        let audited = self.checks.is_enabled() && !value.is_exempt();
        let shared = match value {
            Value::Object(shared) if audited => shared,
            value => {
                tracing::trace!(
                    kind = value.kind().as_str(),
                    checks = self.checks.as_str(),
                    "Pass-through transfer"
                );
                return body(frame, Handle::pass_through(value));
            }
        };

        let state = Rc::new(acquire(frame, shared)?);
        let open = OpenTransfer {
            state: Rc::clone(&state),
        };

        let outcome = body(frame, Handle::tracked(Rc::clone(&state)));

        let leaked = scrub::sweep(frame, state.object(), state.tombstone());
        let consumed = open.close();
        settle(frame, &state, outcome, leaked, consumed)
    }

    /// [`transfer`](Self::transfer) the value bound to `name` in `frame`.
    pub fn transfer_binding<T, R, E, F>(
        &self,
        frame: &mut Frame<T>,
        name: &str,
        body: F,
    ) -> Result<R, E>
    where
        E: From<MoveError>,
        F: FnOnce(&mut Frame<T>, Handle<T>) -> Result<R, E>,
    {
        let value = frame.value(name).map_err(MoveError::from)?.clone();
        self.transfer(frame, value, body)
    }
}

fn acquire<T>(
    frame: &mut Frame<T>,
    shared: Shared<T>,
) -> Result<HandleState<T>, MoveError> {
    let owners = shared.alias_count();
    if owners > ACQUIRE_BASELINE {
        let err = NoUniqueAccessError {
            object: shared.id(),
            type_name: type_name::<T>(),
            site: AccessSite::Acquire,
            aliases: owners - ACQUIRE_BASELINE,
        };
        tracing::warn!(frame = frame.name(), owners, "Transfer refused: {err}");
        return Err(err.into());
    }

    let transfer = TransferId::next();
    let scrubbed: Vec<String> = scrub::scrub(frame, &shared).into_keys().collect();
    tracing::debug!(
        %transfer,
        object = %shared.id(),
        frame = frame.name(),
        ?scrubbed,
        "Transfer opened"
    );
    Ok(HandleState::new(transfer, shared))
}

fn settle<T, R, E: From<MoveError>>(
    frame: &Frame<T>,
    state: &HandleState<T>,
    outcome: Result<R, E>,
    leaked: BTreeMap<String, Tombstone>,
    consumed: bool,
) -> Result<R, E> {
    let transfer = state.transfer();
    let object = state.object();

    if leaked.is_empty() {
        tracing::debug!(%transfer, consumed, ok = outcome.is_ok(), "Transfer closed");
        return outcome;
    }

    let names = leaked.keys().cloned().collect::<Vec<_>>();
    match outcome {
        Ok(_) => {
            tracing::warn!(
                %transfer,
                %object,
                frame = frame.name(),
                leaked = ?names,
                "Transfer leaked"
            );
            Err(MoveError::from(LeakedMoveError {
                transfer,
                object,
                leaked,
            })
            .into())
        }
        Err(err) => {
            // The body's failure is the root cause; the aliases it left behind
            // are already tombstoned.
            tracing::warn!(
                %transfer,
                %object,
                frame = frame.name(),
                leaked = ?names,
                "Transfer body failed with aliases still bound"
            );
            Err(err)
        }
    }
}

/// Retires the handle on every way out of [`Auditor::transfer`], unwinding
/// included.
struct OpenTransfer<T> {
    state: Rc<HandleState<T>>,
}

impl<T> OpenTransfer<T> {
    fn close(self) -> bool {
        self.state.close()
    }
}

impl<T> Drop for OpenTransfer<T> {
    fn drop(&mut self) {
        self.state.close();
    }
}
