//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::collections::BTreeMap;

use handoff_core::{Frame, Handle};
use handoff_types::{MoveError, Shared, Value};

pub type Record = BTreeMap<String, String>;

/// A fresh `{"id": "foobar"}` record.
pub fn record() -> Value<Record> {
    let mut map = Record::new();
    map.insert("id".to_string(), "foobar".to_string());
    Value::object(map)
}

/// A caller frame holding `value = record()`.
pub fn caller() -> Frame<Record> {
    let mut frame = Frame::new("caller");
    frame.bind("value", record());
    frame
}

pub fn unpack(handle: &Handle<Record>) -> Result<Shared<Record>, MoveError> {
    Ok(handle
        .consume()?
        .into_object()
        .expect("transferred value is a record"))
}

/// Unpack the handle and pop its `id`.
pub fn get_id(handle: &Handle<Record>) -> Result<String, MoveError> {
    let record = unpack(handle)?;
    let id = record.borrow_mut().remove("id");
    Ok(id.expect("record has an id"))
}
