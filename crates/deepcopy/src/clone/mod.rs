//! Structural cloning.
//!
//! # Dispatch
//!
//! ```text
//! Null                       -> Null
//! Date                       -> new date, same instant
//! Pattern                    -> new pattern, same source + flags
//! Undefined/Bool/Number/Str  -> returned as-is
//! Sequence/Record, visited   -> clone registered earlier (cycle or sharing)
//! Sequence/Record, new       -> empty container, registered, then filled
//! ```
//!
//! The new container is registered in the [`VisitedMap`] *before* any
//! member is cloned. A member that leads back to an ancestor therefore
//! resolves to the ancestor's clone, and two paths to one composite in the
//! input become two paths to one composite in the output.

pub mod worklist;

use std::convert::Infallible;

use tracing::{debug, trace};

use crate::config::{CloneOptions, Strategy};
use crate::error::{CloneError, CloneResult, SerializationError};
use crate::serializing;
use crate::value::{Record, Sequence, Value};
use crate::visited::VisitedMap;

/// Deep-copy `value` with a fresh visited map.
///
/// Never fails; cyclic and shared structure is reproduced. Nesting depth is
/// bounded only by the thread stack, see [`worklist::structural_clone_iterative`]
/// for very deep inputs.
pub fn structural_clone(value: &Value) -> Value {
    let mut visited = VisitedMap::new();
    let cloned = structural_clone_with(value, &mut visited);
    debug!(
        kind = value.kind(),
        composites = visited.len(),
        strategy = "recursive",
        "structural clone complete"
    );
    cloned
}

/// Deep-copy `value`, threading `visited` through the traversal.
///
/// Pass an empty map for an independent copy. Composites already present in
/// `visited` are not copied again.
pub fn structural_clone_with(value: &Value, visited: &mut VisitedMap) -> Value {
    into_value(clone_node(value, visited, 1, Unlimited))
}

pub(crate) fn into_value(result: Result<Value, Infallible>) -> Value {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Depth check run before a composite is copied for the first time.
pub(crate) trait DepthLimit: Copy {
    type Error;

    fn check(self, depth: usize) -> Result<(), Self::Error>;
}

/// No limit; traversals using it cannot fail.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Unlimited;

impl DepthLimit for Unlimited {
    type Error = Infallible;

    fn check(self, _depth: usize) -> Result<(), Infallible> {
        Ok(())
    }
}

impl DepthLimit for Option<usize> {
    type Error = CloneError;

    fn check(self, depth: usize) -> CloneResult<()> {
        check_depth(depth, self)
    }
}

/// Variant dispatch in priority order.
pub(crate) enum Shape<'a> {
    /// Null, date, pattern or scalar, already copied.
    Leaf(Value),
    Sequence(&'a Sequence),
    Record(&'a Record),
}

pub(crate) fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::Null => Shape::Leaf(Value::Null),
        Value::Date(date) => Shape::Leaf(Value::Date(date.duplicate())),
        Value::Pattern(pattern) => Shape::Leaf(Value::Pattern(pattern.duplicate())),
        Value::Undefined | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Shape::Leaf(value.clone())
        }
        Value::Sequence(seq) => Shape::Sequence(seq),
        Value::Record(record) => Shape::Record(record),
    }
}

/// Clone already registered for the composite `value`, or a depth check
/// before it is copied for the first time.
pub(crate) fn revisit<L: DepthLimit>(
    value: &Value,
    visited: &VisitedMap,
    depth: usize,
    limit: L,
) -> Result<Option<Value>, L::Error> {
    if let Some(existing) = visited.get(value) {
        trace!(kind = value.kind(), id = ?value.node_id(), "reusing clone of visited composite");
        return Ok(Some(existing));
    }
    limit.check(depth)?;
    Ok(None)
}

pub(crate) fn check_depth(depth: usize, limit: Option<usize>) -> CloneResult<()> {
    match limit {
        Some(limit) if depth > limit => Err(CloneError::RecursionLimitExceeded { depth, limit }),
        _ => Ok(()),
    }
}

fn clone_node<L: DepthLimit>(
    value: &Value,
    visited: &mut VisitedMap,
    depth: usize,
    limit: L,
) -> Result<Value, L::Error> {
    match classify(value) {
        Shape::Leaf(copy) => Ok(copy),
        Shape::Sequence(source) => {
            if let Some(existing) = revisit(value, visited, depth, limit)? {
                return Ok(existing);
            }
            let items = source.items();
            let target = Sequence::with_capacity(items.len());
            visited.register(value, Value::Sequence(target.clone()));
            for item in &items {
                target.push(clone_node(item, visited, depth + 1, limit)?);
            }
            Ok(Value::Sequence(target))
        }
        Shape::Record(source) => {
            if let Some(existing) = revisit(value, visited, depth, limit)? {
                return Ok(existing);
            }
            let target = Record::new();
            visited.register(value, Value::Record(target.clone()));
            for (key, member) in source.entries() {
                target.set(key, clone_node(&member, visited, depth + 1, limit)?);
            }
            Ok(Value::Record(target))
        }
    }
}

/// Cloner configured by [`CloneOptions`].
#[derive(Debug, Clone, Default)]
pub struct Cloner {
    options: CloneOptions,
}

impl Cloner {
    pub fn new(options: CloneOptions) -> Self {
        Self { options }
    }

    /// Cloner configured from `DEEPCOPY_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(CloneOptions::from_env())
    }

    pub fn options(&self) -> &CloneOptions {
        &self.options
    }

    /// Deep-copy `value` with the configured strategy and depth limit.
    pub fn clone_value(&self, value: &Value) -> CloneResult<Value> {
        let mut visited = VisitedMap::new();
        self.clone_tracked(value, &mut visited)
    }

    /// On failure every clone registered in `visited` is cleared, so a
    /// partial copy that already holds a back-edge is freed with the map.
    fn clone_tracked(&self, value: &Value, visited: &mut VisitedMap) -> CloneResult<Value> {
        let limit = self.options.max_depth;
        let result = match self.options.strategy {
            Strategy::Recursive => clone_node(value, visited, 1, limit),
            Strategy::Worklist => worklist::clone_graph(value, visited, limit),
            Strategy::Serializing => {
                serializing::round_trip(value, limit).map_err(|err| match err {
                    SerializationError::NestingTooDeep { depth, limit } => {
                        CloneError::RecursionLimitExceeded { depth, limit }
                    }
                    other => CloneError::Serialization(other),
                })
            }
        };

        match &result {
            Ok(_) if self.options.strategy == Strategy::Serializing => debug!(
                kind = value.kind(),
                strategy = self.options.strategy.as_str(),
                "structural clone complete"
            ),
            Ok(_) => debug!(
                kind = value.kind(),
                composites = visited.len(),
                strategy = self.options.strategy.as_str(),
                "structural clone complete"
            ),
            Err(err) => {
                visited.clear_clones();
                debug!(
                    kind = value.kind(),
                    strategy = self.options.strategy.as_str(),
                    error = %err,
                    "structural clone failed"
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(depth: usize) -> Value {
        let mut value = Value::from(0);
        for _ in 0..depth {
            value = Value::sequence([value]);
        }
        value
    }

    #[test]
    fn test_check_depth() {
        assert!(check_depth(10, None).is_ok());
        assert!(check_depth(3, Some(3)).is_ok());
        assert!(matches!(
            check_depth(4, Some(3)),
            Err(CloneError::RecursionLimitExceeded { depth: 4, limit: 3 })
        ));
    }

    #[test]
    fn test_dispatch_order() {
        assert!(matches!(classify(&Value::Null), Shape::Leaf(Value::Null)));
        assert!(matches!(classify(&Value::from("s")), Shape::Leaf(_)));
        assert!(matches!(classify(&Value::sequence([])), Shape::Sequence(_)));
        assert!(matches!(
            classify(&Value::record([("a", Value::Null)])),
            Shape::Record(_)
        ));
    }

    #[test]
    fn test_cloner_enforces_depth_limit() {
        let cloner = Cloner::new(CloneOptions::default().with_max_depth(3));
        assert!(cloner.clone_value(&nested(3)).is_ok());

        let err = cloner.clone_value(&nested(4)).unwrap_err();
        assert!(matches!(
            err,
            CloneError::RecursionLimitExceeded { depth: 4, limit: 3 }
        ));
    }

    /// `a = {b: {a: <a>, c: 1}, d: {x: {}}}`; the back-edge sits at depth 3
    /// and `x` is the only composite at depth 3.
    fn cyclic_fixture() -> Record {
        let a = Record::new();
        let b = Record::new();
        a.set("b", b.clone());
        b.set("a", a.clone());
        b.set("c", 1);
        a.set("d", Value::record([("x", Value::from(Record::new()))]));
        a
    }

    #[test]
    fn test_failed_clone_clears_partial_copy() {
        let a = cyclic_fixture();
        let original = Value::from(a.clone());

        for strategy in [Strategy::Recursive, Strategy::Worklist] {
            let options = CloneOptions::default()
                .with_max_depth(2)
                .with_strategy(strategy);
            let cloner = Cloner::new(options);
            let mut visited = VisitedMap::new();

            let err = cloner.clone_tracked(&original, &mut visited).unwrap_err();
            assert!(err.is_limit(), "{:?}", strategy);
            // The clones of `a` and `b` were registered and linked before
            // the limit was hit.
            assert!(visited.len() >= 2, "{:?}", strategy);
            for clone in visited.clones() {
                let emptied = match clone {
                    Value::Record(record) => record.is_empty(),
                    Value::Sequence(seq) => seq.is_empty(),
                    _ => false,
                };
                assert!(emptied, "{:?}: {:?}", strategy, clone);
            }
            assert_eq!(a.len(), 2);
        }
        a.clear();
    }

    #[test]
    fn test_back_edge_beyond_limit_resolves_through_visited_map() {
        // `a = {s: <s>, b: {a: <a>, s: <s>}, d: {e: 2}}`: both `b.a` and
        // `b.s` are met again at depth 3.
        let shared = Value::record([("n", Value::from(1))]);
        let a = Record::new();
        let b = Record::new();
        a.set("s", shared.clone());
        a.set("b", b.clone());
        b.set("a", a.clone());
        b.set("s", shared);
        a.set("d", Value::record([("e", Value::from(2))]));
        let original = Value::from(a.clone());

        for strategy in [Strategy::Recursive, Strategy::Worklist] {
            let options = CloneOptions::default()
                .with_max_depth(2)
                .with_strategy(strategy);
            let copy = Cloner::new(options).clone_value(&original).unwrap();

            let copy_a = copy.as_record().unwrap();
            let copy_b = copy_a.get("b").unwrap();
            let back = copy_b.as_record().unwrap().get("a").unwrap();
            assert!(back.same_instance(&copy), "{:?}", strategy);
            let shared_top = copy_a.get("s").unwrap();
            let shared_deep = copy_b.as_record().unwrap().get("s").unwrap();
            assert!(shared_top.same_instance(&shared_deep), "{:?}", strategy);
            assert_eq!(copy, original);
            copy_a.clear();
        }
        a.clear();
    }

    #[test]
    fn test_depth_counts_composites_only() {
        let date = Value::from(crate::value::DateValue::now());
        let value = Value::sequence([date, Value::from("leaf")]);
        let cloner = Cloner::new(CloneOptions::default().with_max_depth(1));
        assert!(cloner.clone_value(&value).is_ok());
    }

    #[test]
    fn test_every_strategy_honours_depth_limit() {
        for strategy in [Strategy::Recursive, Strategy::Worklist, Strategy::Serializing] {
            let options = CloneOptions::default()
                .with_max_depth(2)
                .with_strategy(strategy);
            let cloner = Cloner::new(options);
            assert!(cloner.clone_value(&nested(2)).is_ok(), "{:?}", strategy);
            assert!(
                cloner.clone_value(&nested(5)).unwrap_err().is_limit(),
                "{:?}",
                strategy
            );
        }
    }

    #[test]
    fn test_structural_clone_with_reuses_caller_map() {
        let shared = Value::record([("n", Value::from(1))]);
        let mut visited = VisitedMap::new();
        let first = structural_clone_with(&shared, &mut visited);
        let second = structural_clone_with(&shared, &mut visited);
        assert!(first.same_instance(&second));
        assert_eq!(visited.len(), 1);
    }
}
