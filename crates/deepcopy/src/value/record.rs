//! String-keyed records with own/inherited and enumerable/hidden members.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Value;
use crate::visited::NodeId;

/// An own member of a record.
#[derive(Clone, Debug)]
pub struct Property {
    pub value: Value,
    /// Hidden members are reachable through lookup but are skipped by
    /// iteration, equality, cloning and serialization.
    pub enumerable: bool,
}

#[derive(Default)]
struct RecordData {
    properties: IndexMap<String, Property>,
    prototype: Option<Record>,
}

/// Shared, mutable handle to an insertion-ordered record.
///
/// A record may delegate lookups to a prototype record. Prototype members
/// are inherited, never own, so they are not copied by a deep clone.
#[derive(Clone, Default)]
pub struct Record(Rc<RefCell<RecordData>>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty record inheriting from `prototype`.
    ///
    /// The prototype is fixed at construction, so prototype chains are
    /// always acyclic.
    pub fn with_prototype(prototype: Record) -> Self {
        Record(Rc::new(RefCell::new(RecordData {
            properties: IndexMap::new(),
            prototype: Some(prototype),
        })))
    }

    pub fn prototype(&self) -> Option<Record> {
        self.0.borrow().prototype.clone()
    }

    /// Assign an own member. A new key is enumerable and goes last; an
    /// existing key keeps its position and enumerability.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let mut data = self.0.borrow_mut();
        match data.properties.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut slot) => slot.get_mut().value = value,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(Property {
                    value,
                    enumerable: true,
                });
            }
        }
    }

    /// Define a non-enumerable own member, replacing any existing one.
    pub fn define_hidden(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().properties.insert(
            key.into(),
            Property {
                value: value.into(),
                enumerable: false,
            },
        );
    }

    /// Look up a member, own first, then along the prototype chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.get_own(key) {
            return Some(value);
        }
        let mut next = self.prototype();
        while let Some(record) = next {
            if let Some(value) = record.get_own(key) {
                return Some(value);
            }
            next = record.prototype();
        }
        None
    }

    /// Own member regardless of enumerability.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .properties
            .get(key)
            .map(|prop| prop.value.clone())
    }

    pub fn get_own_enumerable(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .properties
            .get(key)
            .filter(|prop| prop.enumerable)
            .map(|prop| prop.value.clone())
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    pub fn property(&self, key: &str) -> Option<Property> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Remove an own member, keeping the order of the rest.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0
            .borrow_mut()
            .properties
            .shift_remove(key)
            .map(|prop| prop.value)
    }

    /// Own enumerable keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0
            .borrow()
            .properties
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Snapshot of own enumerable members in insertion order.
    ///
    /// Values are handles, so the snapshot is cheap and releases the borrow
    /// before the caller touches any member.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .properties
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, prop)| (key.clone(), prop.value.clone()))
            .collect()
    }

    /// Number of own enumerable members.
    pub fn len(&self) -> usize {
        self.0
            .borrow()
            .properties
            .values()
            .filter(|prop| prop.enumerable)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every own member. Breaks reference cycles running through this
    /// record so the graph can be freed.
    pub fn clear(&self) {
        self.0.borrow_mut().properties.clear();
    }

    pub fn ptr_eq(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }
}

// Shallow on purpose: printing members would not terminate on cycles.
impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.node_id())
            .field("keys", &self.keys())
            .finish()
    }
}
