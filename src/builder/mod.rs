//! Schema Builder
//!
//! Validates a [`SchemaSource`] and freezes it into an [`AppSchema`]. The build
//! runs five phases in order:
//!
//! 1. structural: ids, member types, enumerations, ownership forest, cycles
//! 2. reference: `ref` targets exist and are roots
//! 3. key: own keys, implicit sequence keys, composite keys
//! 4. variation: discriminators and variant keys
//! 5. naming: physical identifiers
//!
//! A phase reports every defect it finds. The build stops after the first phase
//! that reported an error, since later phases assume earlier invariants hold.
//! Warnings never stop a build and are kept on the built schema.

pub mod diagnostics;

pub use diagnostics::{BuildPhase, DiagnosticCode, DiagnosticItem, Diagnostics, Severity};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{EnumDefinition, MemberType, MemberTypeCatalog, ValueKind};
use crate::config::SchemaConfig;
use crate::graph::{DirectedGraph, NodeHandle};
use crate::naming::{AggregateName, NameResolver};
use crate::schema::{
    Aggregate, AggregateId, AggregateKind, AppSchema, Member, MemberId, MemberKind, Relation,
    Variant,
};
use crate::source::{MemberDef, MemberSource, SchemaSource};

/// A build that ended with errors. Carries every diagnostic of the run,
/// warnings included.
#[derive(Error, Debug)]
#[error("schema build failed with {} error(s):\n{}", .diagnostics.error_count(), .diagnostics)]
pub struct BuildFailure {
    pub diagnostics: Diagnostics,
}

impl BuildFailure {
    /// Codes of the errors, in report order
    pub fn error_codes(&self) -> Vec<DiagnosticCode> {
        self.diagnostics.errors().map(|d| d.code).collect()
    }

    pub fn has(&self, code: DiagnosticCode) -> bool {
        self.diagnostics.with_code(code).next().is_some()
    }
}

/// Lifecycle of a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Unvalidated,
    Validating(BuildPhase),
    Built,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unvalidated => write!(f, "unvalidated"),
            Self::Validating(phase) => write!(f, "validating ({phase})"),
            Self::Built => write!(f, "built"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Turns a [`SchemaSource`] into an [`AppSchema`]
pub struct SchemaBuilder {
    source: SchemaSource,
    config: SchemaConfig,
    state: BuildState,
    diagnostics: Diagnostics,
    graph: DirectedGraph<AggregateId, Relation>,
    /// Node of each source aggregate, by source position
    handles: Vec<NodeHandle>,
    catalog: MemberTypeCatalog,
    enums: Vec<EnumDefinition>,
    aggregates: Vec<Aggregate>,
}

impl SchemaBuilder {
    pub fn new(source: SchemaSource) -> Self {
        Self::with_config(source, SchemaConfig::default())
    }

    pub fn with_config(source: SchemaSource, config: SchemaConfig) -> Self {
        let count = source.aggregates.len();
        Self {
            source,
            config,
            state: BuildState::Unvalidated,
            diagnostics: Diagnostics::new(),
            graph: DirectedGraph::with_capacity(count, count * 2),
            handles: Vec::with_capacity(count),
            catalog: MemberTypeCatalog::new(),
            enums: Vec::new(),
            aggregates: Vec::with_capacity(count),
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Run every phase and freeze the result
    pub fn build(mut self) -> Result<AppSchema, BuildFailure> {
        info!(
            aggregates = self.source.aggregates.len(),
            enums = self.source.enums.len(),
            "building aggregate schema"
        );

        self.enter(BuildPhase::Structural);
        let ids_unique = self.register();
        if !ids_unique {
            return Err(self.fail());
        }
        self.structure();
        self.gate()?;

        self.enter(BuildPhase::Reference);
        self.references();
        self.gate()?;

        self.enter(BuildPhase::Key);
        self.keys();
        self.gate()?;

        self.enter(BuildPhase::Variation);
        self.variations();
        self.gate()?;

        self.enter(BuildPhase::Naming);
        self.naming();
        self.gate()?;

        self.state = BuildState::Built;
        let warnings = std::mem::take(&mut self.diagnostics).into_non_errors();
        for warning in warnings.iter() {
            warn!(code = %warning.code, "{}", warning.message);
        }
        info!(
            aggregates = self.aggregates.len(),
            warnings = warnings.len(),
            "aggregate schema built"
        );

        Ok(AppSchema::from_parts(
            self.source.application,
            self.aggregates,
            self.graph,
            self.enums,
            warnings,
            self.source.fingerprint,
        ))
    }

    fn enter(&mut self, phase: BuildPhase) {
        self.state = BuildState::Validating(phase);
        debug!(state = %self.state, "entering phase");
    }

    fn gate(&mut self) -> Result<(), BuildFailure> {
        let errors = self.diagnostics.error_count();
        debug!(state = %self.state, errors, "phase finished");
        if errors > 0 {
            return Err(self.fail());
        }
        Ok(())
    }

    fn fail(&mut self) -> BuildFailure {
        warn!(
            state = %self.state,
            errors = self.diagnostics.error_count(),
            "aggregate schema build failed"
        );
        self.state = BuildState::Failed;
        BuildFailure {
            diagnostics: std::mem::take(&mut self.diagnostics),
        }
    }

    // =========================================================================
    // Structural
    // =========================================================================

    /// Enumerations, node ids and member-level checks. Returns `false` when
    /// node ids are not unique, which leaves the graph unusable.
    fn register(&mut self) -> bool {
        let phase = BuildPhase::Structural;
        let mut found = Vec::new();

        let mut enum_names = HashSet::new();
        for source in &self.source.enums {
            if MemberTypeCatalog::is_reserved(&source.name) {
                found.push(defect(
                    phase,
                    DiagnosticCode::InvalidEnumeration,
                    format!("enumeration '{}' uses the name of a built-in member type", source.name),
                    vec![source.name.clone()],
                ));
                continue;
            }
            if !enum_names.insert(source.name.as_str()) {
                found.push(defect(
                    phase,
                    DiagnosticCode::InvalidEnumeration,
                    format!("enumeration '{}' is declared more than once", source.name),
                    vec![source.name.clone()],
                ));
                continue;
            }
            match EnumDefinition::build(&source.name, &source.items) {
                Ok(definition) => {
                    self.catalog.register_enumeration(definition.name.clone());
                    self.enums.push(definition);
                }
                Err(problems) => found.extend(problems.into_iter().map(|problem| {
                    defect(phase, DiagnosticCode::InvalidEnumeration, problem, vec![source.name.clone()])
                })),
            }
        }

        let mut ids_unique = true;
        for (index, def) in self.source.aggregates.iter().enumerate() {
            match self.graph.add_node(def.id.clone(), AggregateId(index)) {
                Ok(handle) => self.handles.push(handle),
                Err(err) => {
                    ids_unique = false;
                    found.push(defect(
                        phase,
                        DiagnosticCode::DuplicateNodeId,
                        err.to_string(),
                        vec![def.id.clone()],
                    ));
                }
            }
        }

        for def in &self.source.aggregates {
            let mut names = HashSet::new();
            for member in &def.members {
                let path = member_path(&def.id, &member.name);
                if !names.insert(member.name.as_str()) {
                    found.push(defect(
                        phase,
                        DiagnosticCode::DuplicateMemberName,
                        format!("member '{}' is declared more than once in '{}'", member.name, def.id),
                        vec![path.clone()],
                    ));
                }
                if let MemberSource::Value { type_name } = &member.kind {
                    if self.catalog.resolve(type_name).is_none() {
                        let mut known: Vec<&str> = Vec::new();
                        for tag in MemberTypeCatalog::builtin_tags() {
                            known.push(tag);
                        }
                        known.extend(self.enums.iter().map(|e| e.name.as_str()));
                        found.push(with_hint(
                            defect(
                                phase,
                                DiagnosticCode::UnknownMemberType,
                                format!("'{path}' has unknown member type '{type_name}'"),
                                vec![path],
                            ),
                            suggest(type_name, known),
                        ));
                    }
                }
            }

            let flagged: Vec<String> = def
                .members
                .iter()
                .filter(|m| m.is_instance_name)
                .map(|m| member_path(&def.id, &m.name))
                .collect();
            if flagged.len() > 1 {
                found.push(defect(
                    phase,
                    DiagnosticCode::DuplicateInstanceName,
                    format!("'{}' flags {} members as its instance name", def.id, flagged.len()),
                    flagged,
                ));
            }
        }

        self.diagnostics.extend(found);
        ids_unique
    }

    /// Ownership edges, owner counts and cycles
    fn structure(&mut self) {
        let phase = BuildPhase::Structural;
        let mut found = Vec::new();
        let mut owners: Vec<Vec<String>> = vec![Vec::new(); self.source.aggregates.len()];

        for (index, def) in self.source.aggregates.iter().enumerate() {
            for member in &def.members {
                let relation = match member.kind {
                    MemberSource::Child { .. } => Relation::ParentChild,
                    MemberSource::Children { .. } => Relation::ParentChildren,
                    MemberSource::Variation { .. } => Relation::ParentVariation,
                    MemberSource::Value { .. } | MemberSource::Ref { .. } => continue,
                };
                let path = member_path(&def.id, &member.name);

                for target in member.owned_targets() {
                    let Some((handle, owned)) = self.resolve(target) else {
                        let ids = self.source.aggregates.iter().map(|a| a.id.as_str());
                        found.push(with_hint(
                            defect(
                                phase,
                                DiagnosticCode::UnknownAggregate,
                                format!("'{path}' owns '{target}', which is not a declared aggregate"),
                                vec![path.clone()],
                            ),
                            suggest(target, ids),
                        ));
                        continue;
                    };

                    let declared = self.source.aggregates[owned.0].kind;
                    if let Some(expected) = relation.owned_kind() {
                        if declared != expected {
                            found.push(defect(
                                phase,
                                DiagnosticCode::OwnershipKindMismatch,
                                format!("'{path}' owns '{target}' as {expected}, but it is declared {declared}"),
                                vec![path.clone(), target.to_string()],
                            ));
                        }
                    }
                    self.graph.add_edge(self.handles[index], handle, relation);
                    owners[owned.0].push(path.clone());
                }
            }
        }

        for (def, owned_by) in self.source.aggregates.iter().zip(&owners) {
            match (def.kind, owned_by.len()) {
                // owned roots were reported as kind mismatches above
                (AggregateKind::Root, _) | (_, 1) => {}
                (kind, 0) => found.push(defect(
                    phase,
                    DiagnosticCode::OrphanAggregate,
                    format!("{kind} aggregate '{}' has no owner", def.id),
                    vec![def.id.clone()],
                )),
                (_, n) => {
                    let mut paths = vec![def.id.clone()];
                    paths.extend(owned_by.iter().cloned());
                    found.push(defect(
                        phase,
                        DiagnosticCode::MultipleOwners,
                        format!("'{}' is owned by {n} members", def.id),
                        paths,
                    ));
                }
            }
        }

        if let Err(cycles) = self.graph.seal_acyclic(&Relation::OWNERSHIP) {
            for cycle in cycles {
                let ids: Vec<String> = cycle
                    .iter()
                    .filter_map(|h| self.graph.id(*h))
                    .map(str::to_string)
                    .collect();
                let mut walk = ids.clone();
                walk.extend(ids.first().cloned());
                found.push(defect(
                    phase,
                    DiagnosticCode::CyclicOwnership,
                    format!("ownership cycle: {}", walk.join(" -> ")),
                    ids,
                ));
            }
        }

        self.diagnostics.extend(found);
    }

    fn resolve(&self, id: &str) -> Option<(NodeHandle, AggregateId)> {
        let handle = self.graph.lookup(id)?;
        let aggregate = self.graph.node(handle)?;
        Some((handle, *aggregate))
    }

    // =========================================================================
    // Reference
    // =========================================================================

    fn references(&mut self) {
        let phase = BuildPhase::Reference;
        let mut found = Vec::new();
        let roots: Vec<&str> = self
            .source
            .aggregates
            .iter()
            .filter(|a| a.kind == AggregateKind::Root)
            .map(|a| a.id.as_str())
            .collect();

        for (index, def) in self.source.aggregates.iter().enumerate() {
            for member in &def.members {
                let MemberSource::Ref { target } = &member.kind else {
                    continue;
                };
                let path = member_path(&def.id, &member.name);
                match self.resolve(target) {
                    None => {
                        let hint = if self.config.validation.suggest_references {
                            suggest(target, roots.iter().copied())
                        } else {
                            None
                        };
                        found.push(with_hint(
                            defect(
                                phase,
                                DiagnosticCode::UnresolvedReference,
                                format!("'{path}' refers to '{target}', which does not exist"),
                                vec![path, target.clone()],
                            ),
                            hint,
                        ));
                    }
                    Some((handle, referenced)) => {
                        if self.source.aggregates[referenced.0].kind == AggregateKind::Root {
                            self.graph.add_edge(self.handles[index], handle, Relation::Reference);
                        } else {
                            found.push(defect(
                                phase,
                                DiagnosticCode::RefTargetNotRoot,
                                format!("'{path}' refers to '{target}', which is not a root aggregate"),
                                vec![path, target.clone()],
                            ));
                        }
                    }
                }
            }
        }

        self.diagnostics.extend(found);
    }

    // =========================================================================
    // Key
    // =========================================================================

    /// Freeze members and derive composite keys
    fn keys(&mut self) {
        let phase = BuildPhase::Key;
        let mut found = Vec::new();
        let sequence_name = self.config.naming.sequence_member.clone();

        for (index, def) in self.source.aggregates.iter().enumerate() {
            let id = AggregateId(index);
            let mut members: Vec<Member> = Vec::with_capacity(def.members.len() + 1);

            let keyless = !def.members.iter().any(|m| m.is_key);
            if def.kind == AggregateKind::Children && keyless {
                members.push(Member {
                    id: MemberId { aggregate: id, index: 0 },
                    name: sequence_name.clone(),
                    display_name: sequence_name.clone(),
                    physical_name: String::new(),
                    path: member_path(&def.id, &sequence_name),
                    kind: MemberKind::Value {
                        value: ValueKind::Sequence,
                    },
                    nullable: false,
                    is_key: true,
                    is_instance_name: false,
                    implicit: true,
                });
            }

            for member in &def.members {
                let Some(kind) = self.member_kind(member) else {
                    continue;
                };
                let path = member_path(&def.id, &member.name);
                if member.is_key && !kind.can_be_key() {
                    found.push(defect(
                        phase,
                        DiagnosticCode::KeyNotAllowed,
                        format!("'{path}' is a {} member and cannot be part of a key", kind.tag()),
                        vec![path.clone()],
                    ));
                }
                members.push(Member {
                    id: MemberId {
                        aggregate: id,
                        index: members.len(),
                    },
                    name: member.name.clone(),
                    display_name: member.display_name.clone().unwrap_or_else(|| member.name.clone()),
                    physical_name: String::new(),
                    path,
                    kind,
                    nullable: member.nullable && !member.is_key,
                    is_key: member.is_key,
                    is_instance_name: member.is_instance_name,
                    implicit: false,
                });
            }

            let keys = members.iter().filter(|m| m.is_key).map(|m| m.id).collect();
            let instance_name = members.iter().find(|m| m.is_instance_name).map(|m| m.id);

            self.aggregates.push(Aggregate {
                id,
                schema_id: def.id.clone(),
                name: def.name.clone(),
                display_name: def.display_name.clone().unwrap_or_else(|| def.name.clone()),
                physical_name: String::new(),
                kind: def.kind,
                members,
                keys,
                instance_name,
                node: self.handles[index],
            });
        }

        // own keys are in place; prepend every ancestor's, root first
        let resolver = NameResolver::new(&self.config.naming);
        let mut composites = Vec::with_capacity(self.aggregates.len());
        for aggregate in &self.aggregates {
            let mut chain: Vec<AggregateId> = self
                .graph
                .ancestors(aggregate.node, &Relation::OWNERSHIP)
                .filter_map(|h| self.graph.node(h).copied())
                .collect();
            chain.reverse();
            chain.push(aggregate.id);

            let composite =
                resolver.composite_key(chain.iter().map(|a| self.aggregates[a.0].keys.as_slice()));
            if composite.is_empty() {
                found.push(defect(
                    phase,
                    DiagnosticCode::MissingKey,
                    format!(
                        "{} aggregate '{}' neither declares nor inherits a key member",
                        aggregate.kind, aggregate.schema_id
                    ),
                    vec![aggregate.schema_id.clone()],
                ));
            }
            composites.push(composite);
        }
        for (aggregate, composite) in self.aggregates.iter_mut().zip(composites) {
            aggregate.keys = composite;
        }

        self.diagnostics.extend(found);
    }

    fn member_kind(&self, member: &MemberDef) -> Option<MemberKind> {
        let target = |id: &str| self.resolve(id).map(|(_, aggregate)| aggregate);
        let kind = match &member.kind {
            MemberSource::Value { type_name } => MemberKind::Value {
                value: self.catalog.resolve(type_name)?,
            },
            MemberSource::Child { target: id } => MemberKind::Child { target: target(id)? },
            MemberSource::Children { target: id } => MemberKind::Children { target: target(id)? },
            MemberSource::Ref { target: id } => MemberKind::Ref { target: target(id)? },
            MemberSource::Variation { variants } => MemberKind::Variation {
                enumeration: format!("{SWITCH_ENUM_PREFIX}{}", member.name),
                variants: variants
                    .iter()
                    .map(|(discriminator, id)| {
                        let owned = target(id)?;
                        Some(Variant {
                            discriminator: discriminator.clone(),
                            name: self.source.aggregates[owned.0].name.clone(),
                            target: owned,
                        })
                    })
                    .collect::<Option<Vec<_>>>()?,
            },
        };
        Some(kind)
    }

    // =========================================================================
    // Variation
    // =========================================================================

    /// Discriminator checks, then one enumeration per well-formed switch
    fn variations(&mut self) {
        let phase = BuildPhase::Variation;
        let mut found = Vec::new();
        let single_variant = promoted(self.config.validation.require_multiple_variants);
        let non_integer = promoted(self.config.validation.integer_discriminators);
        let mut reported_targets = HashSet::new();
        let mut enum_names: HashSet<String> = self.enums.iter().map(|e| e.name.clone()).collect();
        let mut synthesized = Vec::new();

        for aggregate in &self.aggregates {
            for member in &aggregate.members {
                let MemberKind::Variation { enumeration, variants } = &member.kind else {
                    continue;
                };
                match variants.len() {
                    0 => found.push(defect(
                        phase,
                        DiagnosticCode::EmptyVariationSwitch,
                        format!("'{}' declares no variants", member.path),
                        vec![member.path.clone()],
                    )),
                    1 => found.push(
                        defect(
                            phase,
                            DiagnosticCode::SingleVariantSwitch,
                            format!("'{}' declares a single variant", member.path),
                            vec![member.path.clone()],
                        )
                        .with_severity(single_variant),
                    ),
                    _ => {}
                }

                let mut well_formed = !variants.is_empty();
                let mut seen = HashSet::new();
                for variant in variants {
                    if variant.discriminator.trim().is_empty() {
                        well_formed = false;
                        found.push(defect(
                            phase,
                            DiagnosticCode::EmptyDiscriminator,
                            format!("'{}' has a variant with an empty discriminator", member.path),
                            vec![member.path.clone()],
                        ));
                    } else if !seen.insert(variant.discriminator.as_str()) {
                        well_formed = false;
                        found.push(defect(
                            phase,
                            DiagnosticCode::DuplicateDiscriminator,
                            format!(
                                "'{}' uses discriminator '{}' more than once",
                                member.path, variant.discriminator
                            ),
                            vec![member.path.clone()],
                        ));
                    } else if discriminator_value(&variant.discriminator).is_none() {
                        found.push(
                            defect(
                                phase,
                                DiagnosticCode::NonIntegerDiscriminator,
                                format!(
                                    "'{}' uses discriminator '{}', which is not an integer",
                                    member.path, variant.discriminator
                                ),
                                vec![member.path.clone()],
                            )
                            .with_severity(non_integer),
                        );
                    }

                    let target = &self.aggregates[variant.target.0];
                    if target.own_key_members().any(|m| !m.implicit) && reported_targets.insert(target.id) {
                        found.push(defect(
                            phase,
                            DiagnosticCode::VariantHasOwnKey,
                            format!(
                                "variation aggregate '{}' declares key members of its own",
                                target.schema_id
                            ),
                            vec![target.schema_id.clone(), member.path.clone()],
                        ));
                    }
                }

                if !well_formed {
                    continue;
                }
                if !enum_names.insert(enumeration.clone()) {
                    found.push(defect(
                        phase,
                        DiagnosticCode::InvalidEnumeration,
                        format!(
                            "'{}' needs enumeration '{enumeration}', which is already declared",
                            member.path
                        ),
                        vec![member.path.clone(), enumeration.clone()],
                    ));
                    continue;
                }
                // non-integer discriminators take the smallest unused value
                let items: Vec<(String, Option<i32>)> = variants
                    .iter()
                    .map(|v| (v.name.clone(), discriminator_value(&v.discriminator)))
                    .collect();
                match EnumDefinition::build(enumeration, &items) {
                    Ok(mut definition) => {
                        definition.switch = Some(member.path.clone());
                        synthesized.push(definition);
                    }
                    Err(problems) => found.extend(problems.into_iter().map(|problem| {
                        defect(phase, DiagnosticCode::InvalidEnumeration, problem, vec![member.path.clone()])
                    })),
                }
            }
        }

        debug!(switches = synthesized.len(), "switch enumerations derived");
        self.enums.extend(synthesized);
        self.diagnostics.extend(found);
    }

    // =========================================================================
    // Naming
    // =========================================================================

    fn naming(&mut self) {
        let phase = BuildPhase::Naming;
        let mut found = Vec::new();
        let resolver = NameResolver::new(&self.config.naming);

        // owners first: each root followed by its tree in pre-order
        let mut order: Vec<AggregateId> = Vec::with_capacity(self.aggregates.len());
        for aggregate in self.aggregates.iter().filter(|a| a.is_root()) {
            order.push(aggregate.id);
            order.extend(
                self.graph
                    .descendants(aggregate.node, &Relation::OWNERSHIP)
                    .filter_map(|h| self.graph.node(h).copied()),
            );
        }
        let mut position = vec![0usize; self.aggregates.len()];
        for (at, id) in order.iter().enumerate() {
            position[id.0] = at;
        }

        let inputs: Vec<AggregateName<'_>> = order
            .iter()
            .map(|id| {
                let aggregate = &self.aggregates[id.0];
                let owner = self
                    .graph
                    .edges_to(aggregate.node, &Relation::OWNERSHIP)
                    .first()
                    .and_then(|h| self.graph.node(*h))
                    .map(|owner| position[owner.0]);
                AggregateName {
                    name: &aggregate.name,
                    owner,
                }
            })
            .collect();
        let resolved = resolver.resolve_aggregates(&inputs);

        for (first, second) in &resolved.collisions {
            let a = &self.aggregates[order[*first].0];
            let b = &self.aggregates[order[*second].0];
            found.push(defect(
                phase,
                DiagnosticCode::NameCollision,
                format!(
                    "aggregates '{}' and '{}' both resolve to '{}'",
                    a.schema_id, b.schema_id, resolved.physical[*second]
                ),
                vec![a.schema_id.clone(), b.schema_id.clone()],
            ));
        }
        for (id, physical) in order.iter().zip(resolved.physical) {
            self.aggregates[id.0].physical_name = physical;
        }

        for aggregate in &mut self.aggregates {
            let names: Vec<&str> = aggregate.members.iter().map(|m| m.name.as_str()).collect();
            let members = resolver.resolve_members(&aggregate.physical_name, &names);
            for (first, second) in &members.collisions {
                let a = &aggregate.members[*first];
                let b = &aggregate.members[*second];
                found.push(defect(
                    phase,
                    DiagnosticCode::NameCollision,
                    format!(
                        "members '{}' and '{}' both resolve to '{}'",
                        a.path, b.path, members.physical[*second]
                    ),
                    vec![a.path.clone(), b.path.clone()],
                ));
            }
            for (member, physical) in aggregate.members.iter_mut().zip(members.physical) {
                member.physical_name = physical;
            }
        }

        self.diagnostics.extend(found);
    }
}

/// Enumeration name prefix for a variation switch: `E_{member name}`
const SWITCH_ENUM_PREFIX: &str = "E_";

fn discriminator_value(discriminator: &str) -> Option<i32> {
    discriminator.trim().parse().ok()
}

/// Error when the strict setting is on, warning otherwise
fn promoted(strict: bool) -> Severity {
    if strict {
        Severity::Error
    } else {
        Severity::Warning
    }
}

fn defect(phase: BuildPhase, code: DiagnosticCode, message: String, paths: Vec<String>) -> DiagnosticItem {
    let mut item = DiagnosticItem::new(phase, code, message);
    item.paths = paths;
    item
}

fn with_hint(item: DiagnosticItem, hint: Option<&str>) -> DiagnosticItem {
    match hint {
        Some(hint) => item.with_context(format!("did you mean '{hint}'?")),
        None => item,
    }
}

fn member_path(aggregate_id: &str, member: &str) -> String {
    format!("{aggregate_id}.{member}")
}

/// Closest candidate by fuzzy score
fn suggest<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default();
    candidates
        .into_iter()
        .filter(|candidate| *candidate != query)
        .filter_map(|candidate| matcher.fuzzy_match(candidate, query).map(|score| (score, candidate)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate)
}
