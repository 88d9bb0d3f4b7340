//! Alias scrubbing.
//!
//! Rewrites a frame so bindings that denote the transferred object hold a
//! tombstone instead. Continued use of such a binding then surfaces as a
//! [`BindingError::Moved`](handoff_types::BindingError::Moved) rather than as
//! silent aliasing.

use std::collections::BTreeMap;

use handoff_types::{ObjectId, Shared, Tombstone};

use crate::{Binding, Frame};

/// Entry-side scrub: every binding that denotes `target` and is not already a
/// tombstone becomes one. That covers value aliases and handles from an
/// enclosing transfer of the same object. Returns the rewritten names.
pub fn scrub<T>(
    frame: &mut Frame<T>,
    target: &Shared<T>,
) -> BTreeMap<String, Tombstone> {
    let object = target.id();
    let mut scrubbed = BTreeMap::new();
    for (name, binding) in frame.iter_mut() {
        if !binding.is_moved() && binding.denotes(object) {
            let tombstone = target.tombstone();
            *binding = Binding::Moved(tombstone);
            scrubbed.insert(name.clone(), tombstone);
        }
    }
    scrubbed
}

/// Exit-side sweep: every binding that still denotes `object` (a live alias,
/// a handle, or the tombstone left at entry) is a leak. Each is replaced by a
/// tombstone, which drops the alias, and reported.
pub fn sweep<T>(
    frame: &mut Frame<T>,
    object: ObjectId,
    tombstone: &Tombstone,
) -> BTreeMap<String, Tombstone> {
    let mut leaked = BTreeMap::new();
    for (name, binding) in frame.iter_mut() {
        if !binding.denotes(object) {
            continue;
        }
        let installed = binding.as_tombstone().copied().unwrap_or(*tombstone);
        *binding = Binding::Moved(installed);
        leaked.insert(name.clone(), installed);
    }
    leaked
}
