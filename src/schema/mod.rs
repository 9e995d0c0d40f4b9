//! Built Aggregate Schema
//!
//! [`AppSchema`] is the frozen result of a successful build and the only thing
//! emitters see. Every query is a pure read; none can fail for ids handed out
//! by the same schema. The schema is `Send + Sync` and may be shared across
//! threads without locking.

pub mod export;
pub mod model;

pub use model::{
    Aggregate, AggregateId, AggregateKind, Member, MemberId, MemberKind, Relation, Variant,
};

use crate::builder::{BuildFailure, Diagnostics, SchemaBuilder};
use crate::catalog::EnumDefinition;
use crate::checksum::Checksum;
use crate::config::SchemaConfig;
use crate::graph::DirectedGraph;
use crate::source::SchemaSource;

/// Immutable, validated aggregate graph
#[derive(Debug)]
pub struct AppSchema {
    application: Option<String>,
    aggregates: Vec<Aggregate>,
    graph: DirectedGraph<AggregateId, Relation>,
    enums: Vec<EnumDefinition>,
    warnings: Diagnostics,
    fingerprint: Option<Checksum>,
}

impl AppSchema {
    pub(crate) fn from_parts(
        application: Option<String>,
        aggregates: Vec<Aggregate>,
        graph: DirectedGraph<AggregateId, Relation>,
        enums: Vec<EnumDefinition>,
        warnings: Diagnostics,
        fingerprint: Option<Checksum>,
    ) -> Self {
        Self {
            application,
            aggregates,
            graph,
            enums,
            warnings,
            fingerprint,
        }
    }

    /// Validate and freeze `source`
    pub fn build(source: SchemaSource, config: &SchemaConfig) -> Result<Self, BuildFailure> {
        SchemaBuilder::with_config(source, config.clone()).build()
    }

    pub fn application_name(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Every aggregate, roots and owned alike, in build order
    pub fn all_aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Aggregate> {
        self.aggregates.iter().filter(|a| a.is_root())
    }

    /// # Panics
    ///
    /// Panics for an id that did not come from this schema.
    pub fn aggregate(&self, id: AggregateId) -> &Aggregate {
        &self.aggregates[id.0]
    }

    /// Look an aggregate up by its schema id
    pub fn find(&self, schema_id: &str) -> Option<&Aggregate> {
        let handle = self.graph.lookup(schema_id)?;
        self.graph.node(handle).map(|id| self.aggregate(*id))
    }

    /// Members in declaration order; an implicit sequence key comes first
    pub fn members(&self, id: AggregateId) -> &[Member] {
        &self.aggregate(id).members
    }

    pub fn member(&self, id: MemberId) -> &Member {
        &self.aggregate(id.aggregate).members[id.index]
    }

    /// Composite key: every ancestor's own keys from the root down, then the
    /// aggregate's own
    pub fn keys(&self, id: AggregateId) -> &[MemberId] {
        &self.aggregate(id).keys
    }

    pub fn key_members(&self, id: AggregateId) -> impl Iterator<Item = &Member> {
        self.keys(id).iter().map(move |member| self.member(*member))
    }

    pub fn instance_name_member(&self, id: AggregateId) -> Option<&Member> {
        self.aggregate(id).instance_name.map(|member| self.member(member))
    }

    /// `None` for roots
    pub fn owner(&self, id: AggregateId) -> Option<&Aggregate> {
        let node = self.aggregate(id).node;
        self.graph
            .edges_to(node, &Relation::OWNERSHIP)
            .first()
            .and_then(|owner| self.graph.node(*owner))
            .map(|owner| self.aggregate(*owner))
    }

    /// Owners from the nearest up to the root
    pub fn ancestors(&self, id: AggregateId) -> impl Iterator<Item = &Aggregate> + '_ {
        self.graph
            .ancestors(self.aggregate(id).node, &Relation::OWNERSHIP)
            .filter_map(move |handle| self.graph.node(handle))
            .map(move |owned| self.aggregate(*owned))
    }

    /// Owned aggregates in depth-first pre-order, optionally of one kind only
    pub fn descendants(
        &self,
        id: AggregateId,
        kind: Option<AggregateKind>,
    ) -> impl Iterator<Item = &Aggregate> + '_ {
        self.graph
            .descendants(self.aggregate(id).node, &Relation::OWNERSHIP)
            .filter_map(move |handle| self.graph.node(handle))
            .map(move |owned| self.aggregate(*owned))
            .filter(move |aggregate| kind.map_or(true, |k| aggregate.kind == k))
    }

    /// Target of a `ref` member; `None` when the member is not a reference
    pub fn resolve_ref(&self, member: &Member) -> Option<&Aggregate> {
        match member.kind {
            MemberKind::Ref { target } => Some(self.aggregate(target)),
            _ => None,
        }
    }

    /// Aggregates holding a `ref` member that points at `id`
    pub fn referrers(&self, id: AggregateId) -> Vec<&Aggregate> {
        let mut found: Vec<&Aggregate> = Vec::new();
        for source in self.graph.edges_to(self.aggregate(id).node, &[Relation::Reference]) {
            if let Some(referrer) = self.graph.node(source) {
                if !found.iter().any(|a| a.id == *referrer) {
                    found.push(self.aggregate(*referrer));
                }
            }
        }
        found
    }

    pub fn enumerations(&self) -> &[EnumDefinition] {
        &self.enums
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Non-fatal diagnostics of the build
    pub fn warnings(&self) -> &Diagnostics {
        &self.warnings
    }

    /// Digest of the source files, when loaded from disk or a string
    pub fn fingerprint(&self) -> Option<&Checksum> {
        self.fingerprint.as_ref()
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (AggregateId, AggregateId, Relation)> + '_ {
        self.graph.edges().filter_map(move |(from, to, relation)| {
            let from = self.graph.node(from)?;
            let to = self.graph.node(to)?;
            Some((*from, *to, relation))
        })
    }
}

impl TryFrom<SchemaSource> for AppSchema {
    type Error = BuildFailure;

    fn try_from(source: SchemaSource) -> Result<Self, Self::Error> {
        SchemaBuilder::new(source).build()
    }
}
