//! Identity-keyed table of composites already cloned in one traversal.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Identity of a composite allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn of<T>(rc: &Rc<T>) -> Self {
        NodeId(Rc::as_ptr(rc) as *const () as usize)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug)]
struct Entry {
    // Holding the original keeps its address from being reused while the
    // map is alive.
    #[allow(dead_code)]
    original: Value,
    clone: Value,
}

/// Maps each original sequence or record to its clone.
///
/// A map belongs to a single top-level clone call; build a fresh one per
/// call. Clones are registered before their members are filled in, so a
/// lookup may return a container that is still being populated.
#[derive(Debug, Default)]
pub struct VisitedMap {
    entries: HashMap<NodeId, Entry>,
}

impl VisitedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone previously registered for `original`, if any.
    pub fn get(&self, original: &Value) -> Option<Value> {
        let id = original.node_id()?;
        self.entries.get(&id).map(|entry| entry.clone.clone())
    }

    pub fn contains(&self, original: &Value) -> bool {
        original
            .node_id()
            .is_some_and(|id| self.entries.contains_key(&id))
    }

    /// Record `clone` as the copy of `original`. Non-composite originals are
    /// not tracked and are ignored. Returns `false` if `original` was
    /// already registered, leaving the first clone in place.
    pub fn register(&mut self, original: &Value, clone: Value) -> bool {
        let Some(id) = original.node_id() else {
            return false;
        };
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(
            id,
            Entry {
                original: original.clone(),
                clone,
            },
        );
        true
    }

    /// Number of composites registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clones(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.values().map(|entry| &entry.clone)
    }

    /// Empty every registered clone. A traversal that stops early may leave
    /// clones pointing at each other; clearing them breaks those `Rc` cycles.
    pub(crate) fn clear_clones(&mut self) {
        for clone in self.clones() {
            match clone {
                Value::Sequence(seq) => seq.clear(),
                Value::Record(record) => record.clear(),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    #[test]
    fn test_register_and_get_by_identity() {
        let mut visited = VisitedMap::new();
        let original = Value::record([("a", Value::from(1))]);
        let twin = Value::record([("a", Value::from(1))]);
        let copy = Value::from(Record::new());

        assert!(visited.register(&original, copy.clone()));
        assert!(visited.get(&original).unwrap().same_instance(&copy));
        assert!(visited.get(&original.clone()).is_some());
        // Equal by value but a different allocation.
        assert!(!visited.contains(&twin));
    }

    #[test]
    fn test_first_registration_wins() {
        let mut visited = VisitedMap::new();
        let original = Value::sequence([]);
        let first = Value::sequence([]);
        assert!(visited.register(&original, first.clone()));
        assert!(!visited.register(&original, Value::sequence([])));
        assert!(visited.get(&original).unwrap().same_instance(&first));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_clear_clones_breaks_cycles_among_clones() {
        let mut visited = VisitedMap::new();
        let original = Value::record([("x", Value::from(1))]);
        let copy = Record::new();
        copy.set("self", copy.clone());
        visited.register(&original, Value::from(copy.clone()));

        visited.clear_clones();
        assert!(copy.is_empty());
        assert_eq!(original.as_record().unwrap().len(), 1);
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_scalars_are_not_tracked() {
        let mut visited = VisitedMap::new();
        assert!(!visited.register(&Value::from(1), Value::from(1)));
        assert!(visited.get(&Value::from(1)).is_none());
        assert!(visited.is_empty());
    }
}
