//! Ordered sequences.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Value;
use crate::visited::NodeId;

/// Shared, mutable handle to an ordered list of values.
#[derive(Clone, Default)]
pub struct Sequence(Rc<RefCell<Vec<Value>>>);

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Sequence(Rc::new(RefCell::new(items)))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Assign at `index`. Writing past the end pads the gap with
    /// `Undefined`.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the items in index order.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Drop every item. Breaks reference cycles running through this
    /// sequence so the graph can be freed.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn ptr_eq(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("id", &self.node_id())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_past_end_pads_with_undefined() {
        let seq = Sequence::new();
        seq.set(2, "x");
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get(0), Some(Value::Undefined));
        assert_eq!(seq.get(2), Some(Value::from("x")));
    }

    #[test]
    fn test_items_is_a_snapshot() {
        let seq = Sequence::from_vec(vec![Value::from(1)]);
        let snapshot = seq.items();
        seq.push(2);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.pop(), Some(Value::from(2)));
    }
}
