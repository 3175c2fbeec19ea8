//! Dynamic value model.
//!
//! `Value` is a closed sum type. Scalars are stored inline and are immutable;
//! dates, patterns, sequences and records are reference-counted handles, so
//! `Value::clone()` aliases them the same way assigning an object reference
//! does in a dynamic language. Use [`Value::deep_clone`] for an independent
//! copy.
//!
//! Composite handles use `Rc`/`RefCell`, so a value graph is confined to the
//! thread that built it.

mod date;
mod pattern;
mod record;
mod sequence;

use std::collections::HashSet;

pub use date::DateValue;
pub use pattern::{Pattern, PatternError, PatternFlags};
pub use record::{Property, Record};
pub use sequence::Sequence;

use crate::visited::NodeId;

/// A dynamic value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateValue),
    Pattern(Pattern),
    Sequence(Sequence),
    Record(Record),
}

impl Value {
    /// Build a sequence value from items.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Sequence(Sequence::from_vec(items.into_iter().collect()))
    }

    /// Build a record value from `(key, value)` pairs, in order.
    pub fn record<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let record = Record::new();
        for (key, value) in entries {
            record.set(key, value);
        }
        Value::Record(record)
    }

    /// Short name of the variant, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Pattern(_) => "pattern",
            Value::Sequence(_) => "sequence",
            Value::Record(_) => "record",
        }
    }

    /// True for sequences and records, the variants tracked by identity
    /// during a clone.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Record(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Value::Pattern(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Identity of a composite allocation; `None` for every other variant.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::Sequence(s) => Some(s.node_id()),
            Value::Record(r) => Some(r.node_id()),
            _ => None,
        }
    }

    /// Reference identity.
    ///
    /// Handles compare by allocation. Scalars have no identity of their own,
    /// so they compare by value (`NaN` is the same as `NaN`).
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => numbers_equal(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a.ptr_eq(b),
            (Value::Pattern(a), Value::Pattern(b)) => a.ptr_eq(b),
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(b),
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Structural equality that terminates on cyclic graphs.
    ///
    /// Only own enumerable record members take part; record key order is
    /// ignored. Dates compare by instant, patterns by source and flags.
    pub fn deep_equals(&self, other: &Value) -> bool {
        let mut assumed = HashSet::new();
        deep_equals_inner(self, other, &mut assumed)
    }

    /// Independent structural copy of this value.
    ///
    /// Shorthand for [`crate::structural_clone`].
    pub fn deep_clone(&self) -> Value {
        crate::clone::structural_clone(self)
    }
}

fn numbers_equal(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

// A pair already under comparison is assumed equal; any real difference is
// still found along another edge.
fn deep_equals_inner(a: &Value, b: &Value, assumed: &mut HashSet<(NodeId, NodeId)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(*x, *y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x.instant() == y.instant(),
        (Value::Pattern(x), Value::Pattern(y)) => x.source() == y.source() && x.flags() == y.flags(),
        (Value::Sequence(x), Value::Sequence(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.node_id(), y.node_id())) {
                return true;
            }
            let left = x.items();
            let right = y.items();
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(l, r)| deep_equals_inner(l, r, assumed))
        }
        (Value::Record(x), Value::Record(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.node_id(), y.node_id())) {
                return true;
            }
            let left = x.entries();
            if left.len() != y.len() {
                return false;
            }
            left.iter().all(|(key, l)| match y.get_own_enumerable(key) {
                Some(r) => deep_equals_inner(l, &r, assumed),
                None => false,
            })
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_equals(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateValue> for Value {
    fn from(d: DateValue) -> Self {
        Value::Date(d)
    }
}

impl From<Pattern> for Value {
    fn from(p: Pattern) -> Self {
        Value::Pattern(p)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
