//! Ownership and consumption guard behavior, end to end.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};

use handoff_core::{Auditor, Binding, Frame, Handle, consume};
use handoff_types::{AccessSite, MoveError, Value};

use crate::common::{Record, caller, get_id, record, unpack};

#[test]
fn exempt_values_ignore_alias_count() {
    let mut frame = Frame::<Record>::new("caller");
    frame.bind("n", Value::Int(3));
    frame.bind("s", Value::text("foobar"));
    for i in 0..4 {
        frame.alias(format!("n{i}"), "n").unwrap();
        frame.alias(format!("s{i}"), "s").unwrap();
    }
    let before: Vec<String> = frame.names().map(str::to_string).collect();

    let auditor = Auditor::enabled();
    for name in ["n", "s"] {
        auditor
            .transfer_binding(&mut frame, name, |frame, handle| {
                assert!(!handle.is_tracked());
                assert!(frame.value(name).is_ok());
                Ok::<_, MoveError>(())
            })
            .unwrap();
    }

    let after: Vec<String> = frame.names().map(str::to_string).collect();
    assert_eq!(before, after);
    assert_eq!(frame.value("n3").unwrap().as_int(), Some(3));
    assert_eq!(frame.value("s3").unwrap().as_text(), Some("foobar"));
}

#[test]
fn single_alias_is_acquired() {
    let mut frame = caller();
    let result = Auditor::enabled().transfer_binding(&mut frame, "value", |frame, handle| {
        frame.unbind("value")?;
        get_id(&handle)
    });
    assert_eq!(result.unwrap(), "foobar");
}

#[test]
fn second_alias_blocks_acquisition() {
    let mut frame = caller();
    frame.alias("value2", "value").unwrap();

    let mut ran = false;
    let err = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |_, _| {
            ran = true;
            Ok::<_, MoveError>(())
        })
        .unwrap_err();

    assert!(!ran);
    let MoveError::NoUniqueAccess(err) = err else {
        panic!("expected NoUniqueAccess, got {err:?}");
    };
    assert_eq!(err.site, AccessSite::Acquire);
    assert!(err.type_name.contains("BTreeMap"));
}

#[test]
fn caller_binding_reads_as_tombstone_inside_transfer() {
    let mut frame = caller();
    let object = frame.value("value").unwrap().object_id().unwrap();

    Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            let err = frame.value("value").unwrap_err();
            assert!(err.to_string().contains("moved"));

            let tombstone = frame.get("value")?.as_tombstone().copied().unwrap();
            assert_eq!(tombstone.object(), object);
            assert_eq!(handle.object(), Some(object));

            frame.unbind("value")?;
            handle.consume().map(drop)
        })
        .unwrap();
}

#[test]
fn untouched_caller_binding_is_a_leak() {
    let mut frame = caller();
    let object = frame.value("value").unwrap().object_id().unwrap();
    let err = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |_, handle| handle.consume().map(drop))
        .unwrap_err();

    assert!(err.is_leak());
    let leak = err.as_leak().unwrap();
    assert_eq!(leak.names().collect::<Vec<_>>(), ["value"]);
    assert_eq!(leak.object, object);
    assert!(leak.leaked.values().all(|tombstone| tombstone.object() == object));
    assert!(err.to_string().contains("`value`"));
}

#[test]
fn reintroduced_alias_is_a_leak() {
    let mut frame = caller();
    let object = frame.value("value").unwrap().object_id().unwrap();
    let err = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            let shared = unpack(&handle)?;
            frame.bind("again", Value::Object(shared));
            Ok::<_, MoveError>(())
        })
        .unwrap_err();

    let leak = err.as_leak().unwrap();
    assert_eq!(leak.names().collect::<Vec<_>>(), ["again"]);
    assert_eq!(leak.leaked["again"].object(), object);
    // The swept alias no longer holds the object.
    assert!(frame.get("again").unwrap().is_moved());
}

#[test]
fn copied_handle_binding_is_a_leak() {
    let mut frame = caller();
    let object = frame.value("value").unwrap().object_id().unwrap();
    let err = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.bind("moved_value", handle);
            frame.alias("moved_value2", "moved_value")?;
            frame.unbind("value")?;
            frame.unbind("moved_value")?;
            Ok::<_, MoveError>(())
        })
        .unwrap_err();

    let leak = err.as_leak().unwrap();
    assert_eq!(leak.names().collect::<Vec<_>>(), ["moved_value2"]);
    assert_eq!(leak.leaked["moved_value2"].object(), object);
    assert!(leak.leaked["moved_value2"].type_name().contains("BTreeMap"));
}

#[test]
fn clean_exit_keeps_consumed_value_intact() {
    let mut frame = caller();
    let shared = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.bind("moved_value", handle);
            let shared = unpack(frame.handle("moved_value")?)?;
            shared.borrow_mut().remove("id");
            shared
                .borrow_mut()
                .insert("seen".to_string(), "yes".to_string());
            frame.unbind("value")?;
            frame.unbind("moved_value")?;
            Ok::<_, MoveError>(shared)
        })
        .unwrap();

    assert!(frame.is_empty());
    assert_eq!(shared.alias_count(), 1);
    assert!(!shared.borrow().contains_key("id"));
    assert_eq!(shared.borrow().get("seen").map(String::as_str), Some("yes"));
}

#[test]
fn second_consume_on_same_handle_conflicts() {
    let mut frame = caller();
    let err = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            consume(&handle)?;
            handle.consume()
        })
        .unwrap_err();

    let MoveError::NoUniqueAccess(err) = err else {
        panic!("expected NoUniqueAccess, got {err:?}");
    };
    assert_eq!(err.site, AccessSite::Consume);
}

#[test]
fn consume_through_two_call_paths_conflicts() {
    fn first_path(handle: &Handle<Record>) -> Result<String, MoveError> {
        get_id(handle)
    }
    fn second_path(handle: Handle<Record>) -> Result<String, MoveError> {
        get_id(&handle)
    }

    let mut frame = caller();
    let err = Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            first_path(&handle)?;
            second_path(handle.clone())
        })
        .unwrap_err();

    assert!(err.is_no_unique_access());
}

#[test]
fn nested_transfers_forward_without_conflict() {
    fn forward(auditor: &Auditor, handle: &Handle<Record>, depth: usize) -> Result<String, MoveError> {
        let mut frame = Frame::new(format!("layer{depth}"));
        frame.bind("value", Value::Object(unpack(handle)?));
        auditor.transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            if depth == 0 {
                get_id(&handle)
            } else {
                forward(auditor, &handle, depth - 1)
            }
        })
    }

    let auditor = Auditor::enabled();
    let mut frame = caller();
    let id = auditor
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            forward(&auditor, &handle, 3)
        })
        .unwrap();
    assert_eq!(id, "foobar");
}

#[test]
fn forwarding_without_nesting_conflicts() {
    let auditor = Auditor::enabled();
    let mut frame = caller();
    let err = auditor
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.unbind("value")?;
            // Unwrapped for inspection, then the stale handle is passed on.
            let shared = unpack(&handle)?;
            assert_eq!(shared.borrow().len(), 1);
            get_id(&handle)
        })
        .unwrap_err();
    assert!(err.is_no_unique_access());
}

#[test]
fn panic_in_body_still_retires_the_handle() {
    let escaped: RefCell<Option<Handle<Record>>> = RefCell::new(None);
    let mut frame = caller();

    let unwound = catch_unwind(AssertUnwindSafe(|| {
        Auditor::enabled().transfer_binding(&mut frame, "value", |_, handle| {
            *escaped.borrow_mut() = Some(handle.clone());
            if handle.is_open() {
                panic!("body failed");
            }
            Ok::<_, MoveError>(())
        })
    }));
    assert!(unwound.is_err());

    let handle = escaped.borrow_mut().take().unwrap();
    assert!(!handle.is_open());
    assert!(matches!(handle.consume(), Err(MoveError::Expired { .. })));
}

#[test]
fn handle_binding_counts_as_moved_value() {
    let mut frame = caller();
    Auditor::enabled()
        .transfer_binding(&mut frame, "value", |frame, handle| {
            frame.bind("moved_value", handle);
            assert!(matches!(frame.get("moved_value")?, Binding::Handle(_)));
            assert!(frame.value("moved_value").is_err());
            frame.unbind("value")?;
            frame.unbind("moved_value")?;
            Ok::<_, MoveError>(())
        })
        .unwrap();
}

#[test]
fn transfer_of_unbound_value_is_clean() {
    let mut frame = Frame::<Record>::new("caller");
    let id = Auditor::enabled()
        .transfer(&mut frame, record(), |_, handle| get_id(&handle))
        .unwrap();
    assert_eq!(id, "foobar");
}
