use std::any::type_name;
use std::fmt;

use crate::ObjectId;
use crate::value::Shared;

/// Placeholder installed in place of a scrubbed alias.
///
/// Remembers which object used to be bound, for diagnostics only. It holds no
/// reference to the object at all, so it can never count as an owner or hand
/// the live value back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tombstone {
    object: ObjectId,
    type_name: &'static str,
}

impl Tombstone {
    pub(crate) fn of<T>(shared: &Shared<T>) -> Self {
        Self {
            object: shared.id(),
            type_name: type_name::<T>(),
        }
    }

    #[must_use]
    pub fn object(&self) -> ObjectId {
        self.object
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for Tombstone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<moved {} ({})>", self.object, self.type_name)
    }
}
