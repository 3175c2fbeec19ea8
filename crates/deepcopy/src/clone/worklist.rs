//! Structural cloning with an explicit stack.
//!
//! Same dispatch and visited-map rules as the recursive cloner, but pending
//! members are kept as `(source, target container, key)` slots on a heap
//! stack, so nesting depth is not bounded by the thread stack.
//!
//! A new container is pre-shaped (sequence filled with placeholders, record
//! keys inserted in order) and registered before its slots are pushed. Slots
//! are pushed in reverse so they pop in index/insertion order, which makes
//! the order of first encounters match the recursive cloner exactly.

use tracing::debug;

use super::{classify, into_value, revisit, DepthLimit, Shape, Unlimited};
use crate::value::{Record, Sequence, Value};
use crate::visited::VisitedMap;

enum Target {
    Index(Sequence, usize),
    Key(Record, String),
}

impl Target {
    fn assign(self, value: Value) {
        match self {
            Target::Index(seq, index) => seq.set(index, value),
            Target::Key(record, key) => record.set(key, value),
        }
    }
}

struct Slot {
    source: Value,
    target: Target,
    depth: usize,
}

/// Deep-copy `value` without native recursion, using a fresh visited map.
pub fn structural_clone_iterative(value: &Value) -> Value {
    let mut visited = VisitedMap::new();
    let cloned = structural_clone_iterative_with(value, &mut visited);
    debug!(
        kind = value.kind(),
        composites = visited.len(),
        strategy = "worklist",
        "structural clone complete"
    );
    cloned
}

/// Deep-copy `value` without native recursion, threading `visited`.
pub fn structural_clone_iterative_with(value: &Value, visited: &mut VisitedMap) -> Value {
    into_value(clone_graph(value, visited, Unlimited))
}

pub(crate) fn clone_graph<L: DepthLimit>(
    value: &Value,
    visited: &mut VisitedMap,
    limit: L,
) -> Result<Value, L::Error> {
    let mut pending = Vec::new();
    let root = visit(value, visited, 1, limit, &mut pending)?;
    while let Some(slot) = pending.pop() {
        let cloned = visit(&slot.source, visited, slot.depth, limit, &mut pending)?;
        slot.target.assign(cloned);
    }
    Ok(root)
}

fn visit<L: DepthLimit>(
    value: &Value,
    visited: &mut VisitedMap,
    depth: usize,
    limit: L,
    pending: &mut Vec<Slot>,
) -> Result<Value, L::Error> {
    match classify(value) {
        Shape::Leaf(copy) => Ok(copy),
        Shape::Sequence(source) => {
            if let Some(existing) = revisit(value, visited, depth, limit)? {
                return Ok(existing);
            }
            let items = source.items();
            let target = Sequence::from_vec(vec![Value::Undefined; items.len()]);
            visited.register(value, Value::Sequence(target.clone()));
            for (index, item) in items.into_iter().enumerate().rev() {
                pending.push(Slot {
                    source: item,
                    target: Target::Index(target.clone(), index),
                    depth: depth + 1,
                });
            }
            Ok(Value::Sequence(target))
        }
        Shape::Record(source) => {
            if let Some(existing) = revisit(value, visited, depth, limit)? {
                return Ok(existing);
            }
            let entries = source.entries();
            let target = Record::new();
            for (key, _) in &entries {
                target.set(key.clone(), Value::Undefined);
            }
            visited.register(value, Value::Record(target.clone()));
            for (key, member) in entries.into_iter().rev() {
                pending.push(Slot {
                    source: member,
                    target: Target::Key(target.clone(), key),
                    depth: depth + 1,
                });
            }
            Ok(Value::Record(target))
        }
    }
}
