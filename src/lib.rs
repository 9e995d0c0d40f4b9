//! Aggregate Schema Graph
//!
//! Validated, in-memory model of an application's data aggregates: root
//! aggregates, the child, children and variation aggregates they own, and the
//! references between roots. Code emitters read the frozen [`AppSchema`] and
//! never see an unvalidated graph.
//!
//! ## Features
//!
//! - **Phased Validation**: structure, references, keys, variations and naming are
//!   checked in order, and every defect of a phase is reported together
//! - **Composite Keys**: ancestor keys are inherited root-first; keyless
//!   `children` aggregates get an implicit sequence key
//! - **Physical Names**: generated identifiers are sanitized, reserved words are
//!   avoided and clashes are reported before any code is emitted
//! - **Interchange JSON**: schemas load from files or directories and export back
//!   to an equivalent document
//!
//! ## Pipeline
//!
//! ```text
//! *.json ──► SchemaDocument ──► SchemaSource ──► SchemaBuilder ──► AppSchema
//!            (nested)           (flat)           (5 phases)        (read-only)
//! ```
//!
//! ```rust
//! use aggregate_schema::{AggregateDef, AggregateKind, AppSchema, MemberDef, SchemaSource};
//!
//! let mut source = SchemaSource::new();
//! source.add_aggregate(
//!     AggregateDef::root("Order")
//!         .with_member(MemberDef::value("OrderNo", "word").key())
//!         .with_member(MemberDef::children("Lines", "Order/Lines")),
//! );
//! source.add_aggregate(
//!     AggregateDef::new("Order/Lines", "Lines", AggregateKind::Children)
//!         .with_member(MemberDef::value("Quantity", "integer")),
//! );
//!
//! let schema = AppSchema::try_from(source).unwrap();
//! let lines = schema.find("Order/Lines").unwrap();
//! let key: Vec<_> = schema.key_members(lines.id).map(|m| m.name.as_str()).collect();
//! assert_eq!(key, ["OrderNo", "seq"]);
//! ```

pub mod builder;
pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
pub mod graph;
pub mod naming;
pub mod schema;
pub mod source;

pub use builder::{
    BuildFailure, BuildPhase, BuildState, DiagnosticCode, DiagnosticItem, Diagnostics,
    SchemaBuilder, Severity,
};
pub use catalog::{
    Backend, EnumDefinition, EnumItem, MemberType, MemberTypeCatalog, SearchBehavior, ValueKind,
};
pub use checksum::Checksum;
pub use config::SchemaConfig;
pub use error::{Result, SchemaError};
pub use graph::{DirectedGraph, GraphError, NodeHandle};
pub use schema::{
    Aggregate, AggregateId, AggregateKind, AppSchema, Member, MemberId, MemberKind, Relation,
    Variant,
};
pub use source::{AggregateDef, MemberDef, MemberSource, SchemaDocument, SchemaSource};
