//! Walkthrough scenarios.
//!
//! Each scenario plays one caller discipline against the auditor: the
//! record `{"id": "foobar"}` is bound as `value`, transferred, and the body
//! binds the handle as `moved_value` the way a `with move(value) as
//! moved_value:` block would.

use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::{Context, Result};

use handoff_core::{Auditor, Frame, Handle};
use handoff_types::{MoveError, RuntimeChecks, Shared, Value};

type Record = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Leak,
    NoUniqueAccess,
    Other,
}

impl Outcome {
    pub fn of(result: &Result<String>) -> Self {
        let Err(err) = result else {
            return Outcome::Ok;
        };
        match err.downcast_ref::<MoveError>() {
            Some(MoveError::Leaked(_)) => Outcome::Leak,
            Some(MoveError::NoUniqueAccess(_)) => Outcome::NoUniqueAccess,
            _ => Outcome::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Leak => "leak",
            Outcome::NoUniqueAccess => "no-unique-access",
            Outcome::Other => "error",
        }
    }
}

pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    /// Outcome with runtime checks enabled. With checks disabled every
    /// scenario runs to completion.
    audited: Outcome,
    run: fn(&Auditor) -> Result<String>,
}

impl Scenario {
    pub fn expected(&self, checks: RuntimeChecks) -> Outcome {
        if checks.is_enabled() {
            self.audited
        } else {
            Outcome::Ok
        }
    }

    pub fn run(&self, auditor: &Auditor) -> Result<String> {
        (self.run)(auditor)
    }
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "get-id",
        summary: "consume inside the transfer, pop `id`, delete both bindings",
        audited: Outcome::Ok,
        run: get_id_then_release,
    },
    Scenario {
        name: "del-missing",
        summary: "leave the transfer without deleting anything",
        audited: Outcome::Leak,
        run: del_missing,
    },
    Scenario {
        name: "del-value-only",
        summary: "delete `value` but keep `moved_value`",
        audited: Outcome::Leak,
        run: del_value_only,
    },
    Scenario {
        name: "del-handle-only",
        summary: "delete `moved_value` but keep the tombstoned `value`",
        audited: Outcome::Leak,
        run: del_handle_only,
    },
    Scenario {
        name: "multiple-references",
        summary: "copy both bindings, delete only the originals",
        audited: Outcome::Leak,
        run: multiple_references,
    },
    Scenario {
        name: "store-value",
        summary: "callee stores the unpacked record outside the frame",
        audited: Outcome::Ok,
        run: store_value,
    },
    Scenario {
        name: "shared-before-move",
        summary: "a second binding exists before the transfer starts",
        audited: Outcome::NoUniqueAccess,
        run: shared_before_move,
    },
    Scenario {
        name: "double-consume",
        summary: "the same handle is forwarded to two consumers",
        audited: Outcome::NoUniqueAccess,
        run: double_consume,
    },
    Scenario {
        name: "nested-transfer",
        summary: "each layer unpacks and re-transfers before forwarding",
        audited: Outcome::Ok,
        run: nested_transfer,
    },
    Scenario {
        name: "exempt-int",
        summary: "an aliased integer is transferred without auditing",
        audited: Outcome::Ok,
        run: exempt_int,
    },
];

pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name == name)
}

fn record() -> Value<Record> {
    let mut map = Record::new();
    map.insert("id".to_string(), "foobar".to_string());
    Value::object(map)
}

fn caller() -> Frame<Record> {
    let mut frame = Frame::new("caller");
    frame.bind("value", record());
    frame
}

fn unpack(handle: &Handle<Record>) -> Result<Shared<Record>> {
    handle
        .consume()?
        .into_object()
        .context("transferred value is not a record")
}

fn get_id(handle: &Handle<Record>) -> Result<String> {
    let record = unpack(handle)?;
    let id = record.borrow_mut().remove("id");
    id.context("record has no `id`")
}

fn get_id_then_release(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.bind("moved_value", handle);
        let id = get_id(frame.handle("moved_value")?)?;
        frame.unbind("value")?;
        frame.unbind("moved_value")?;
        Ok(id)
    })
}

fn del_missing(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.bind("moved_value", handle);
        Ok(String::new())
    })
}

fn del_value_only(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.bind("moved_value", handle);
        frame.unbind("value")?;
        Ok(String::new())
    })
}

fn del_handle_only(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.bind("moved_value", handle);
        frame.unbind("moved_value")?;
        Ok(String::new())
    })
}

fn multiple_references(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.bind("moved_value", handle);
        frame.alias("moved_value2", "moved_value")?;
        frame.alias("value2", "value")?;
        frame.unbind("value")?;
        frame.unbind("moved_value")?;
        Ok(String::new())
    })
}

fn store_value(auditor: &Auditor) -> Result<String> {
    let storage: RefCell<Vec<Shared<Record>>> = RefCell::new(Vec::new());
    let store = |handle: &Handle<Record>| -> Result<()> {
        storage.borrow_mut().push(unpack(handle)?);
        Ok(())
    };

    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        store(&handle)?;
        frame.unbind("value")?;
        Ok::<_, anyhow::Error>(())
    })?;

    let stored = storage.borrow();
    let id = stored
        .first()
        .and_then(|record| record.borrow().get("id").cloned())
        .context("storage is empty")?;
    Ok(id)
}

fn shared_before_move(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    frame.alias("value2", "value")?;
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        let id = get_id(&handle)?;
        frame.unbind("value")?;
        frame.unbind("value2")?;
        Ok(id)
    })
}

fn double_consume(auditor: &Auditor) -> Result<String> {
    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.unbind("value")?;
        let first = get_id(&handle)?;
        let forwarded = handle.clone();
        let second = unpack(&forwarded)?;
        let len = second.borrow().len();
        Ok(format!("{first} then {len} field(s)"))
    })
}

fn nested_transfer(auditor: &Auditor) -> Result<String> {
    fn layer(auditor: &Auditor, handle: &Handle<Record>, depth: usize) -> Result<String> {
        let mut frame = Frame::new(format!("layer{depth}"));
        frame.bind("value", Value::Object(unpack(handle)?));
        if depth == 0 {
            return auditor.transfer_binding(&mut frame, "value", |frame, handle| {
                frame.unbind("value")?;
                get_id(&handle)
            });
        }
        auditor.transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            layer(auditor, &handle, depth - 1)
        })
    }

    let mut frame = caller();
    auditor.transfer_binding(&mut frame, "value", |frame, handle| {
        frame.unbind("value")?;
        layer(auditor, &handle, 2)
    })
}

fn exempt_int(auditor: &Auditor) -> Result<String> {
    let mut frame = Frame::<Record>::new("caller");
    frame.bind("n", Value::Int(42));
    frame.alias("m", "n")?;
    let seen = auditor.transfer_binding(&mut frame, "n", |_, handle| {
        handle.consume()?.as_int().context("not an int")
    })?;
    frame.value("n")?;
    Ok(seen.to_string())
}
