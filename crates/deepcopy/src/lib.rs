//! Structural deep cloning of dynamic value graphs.
//!
//! Values are built from scalars, dates, patterns, sequences and records.
//! Composites are shared, mutable handles, so a graph can contain shared
//! substructure and cycles. [`structural_clone`] produces a copy that shares
//! no mutable handle with its input while reproducing both.
//!
//! # Quick Start
//!
//! ```
//! use deepcopy::{structural_clone, Record, Value};
//!
//! // a = { b: { a: <a>, c: 1 }, d: { e: 2 } }
//! let a = Record::new();
//! let b = Record::new();
//! b.set("a", a.clone());
//! b.set("c", 1);
//! a.set("b", b.clone());
//! a.set("d", Value::record([("e", Value::from(2))]));
//! let original = Value::from(a.clone());
//!
//! let copy = structural_clone(&original);
//! assert_eq!(copy, original);
//! assert!(!copy.same_instance(&original));
//!
//! // The cycle is reproduced inside the copy.
//! let copy_b = copy.as_record().unwrap().get("b").unwrap();
//! let back = copy_b.as_record().unwrap().get("a").unwrap();
//! assert!(back.same_instance(&copy));
//! # a.clear();
//! # copy.as_record().unwrap().clear();
//! ```
//!
//! # Strategies
//!
//! | Entry point | Traversal | Cycles | Fidelity |
//! |-------------|-----------|--------|----------|
//! | [`structural_clone`] | recursion | preserved | full |
//! | [`structural_clone_iterative`] | explicit stack | preserved | full |
//! | [`clone_via_serialization`] | JSON round-trip | error | lossy |
//!
//! [`Cloner`] selects a strategy and an optional depth limit from
//! [`CloneOptions`], which can be read from `DEEPCOPY_*` environment
//! variables.
//!
//! Reference-counted cycles are not collected; call `clear()` on a record or
//! sequence in the cycle when the graph is no longer needed.

pub mod clone;
pub mod config;
pub mod error;
pub mod serializing;
pub mod value;
pub mod visited;

pub use clone::worklist::{structural_clone_iterative, structural_clone_iterative_with};
pub use clone::{structural_clone, structural_clone_with, Cloner};
pub use config::{CloneOptions, Strategy};
pub use error::{CloneError, CloneResult, SerializationError, SerializationResult};
pub use serializing::clone_via_serialization;
pub use value::{
    DateValue, Pattern, PatternError, PatternFlags, Property, Record, Sequence, Value,
};
pub use visited::{NodeId, VisitedMap};
