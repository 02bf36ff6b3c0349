use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fos_types::Oid;

/// Opaque handle to an in-memory object, carried by optimistic conflicts.
pub type ObjectRef = Arc<dyn fmt::Debug + Send + Sync>;

/// Maps an object identity back to the object the client holds for it.
pub trait StateResolver: Send + Sync {
    fn resolve(&self, oid: Oid) -> Option<ObjectRef>;
}

/// Resolver backed by a fixed table of known objects.
#[derive(Default)]
pub struct StateTable {
    objects: HashMap<Oid, ObjectRef>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, oid: Oid, object: ObjectRef) -> Option<ObjectRef> {
        self.objects.insert(oid, object)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl StateResolver for StateTable {
    fn resolve(&self, oid: Oid) -> Option<ObjectRef> {
        self.objects.get(&oid).cloned()
    }
}
