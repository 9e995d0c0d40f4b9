//! Schema Source
//!
//! The mutable, unvalidated set of aggregate definitions a build starts from.
//! It is filled either by the JSON loader or programmatically, and may contain
//! anything: dangling targets, duplicate ids, cycles. The builder finds out.
//!
//! Ownership is declared by the owner: a `child`, `children` or `variation`
//! member names the aggregate ids it owns.

pub mod document;
pub mod loader;

pub use document::{AggregateNode, EnumItemNode, EnumNode, MemberNode, SchemaDocument};
pub use loader::{load_from_directory, load_from_path, parse_str, LoadConfig};

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};
use crate::schema::AggregateKind;

/// Mutable set of definitions awaiting a build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSource {
    pub application: Option<String>,
    pub enums: Vec<EnumSource>,
    pub aggregates: Vec<AggregateDef>,
    /// Digest of the files this source was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Checksum>,
}

/// Enumeration as written; values may be left for numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSource {
    pub name: String,
    pub items: Vec<(String, Option<i32>)>,
}

/// One aggregate definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDef {
    /// Unique id; references and ownership members name this
    pub id: String,
    pub name: String,
    pub kind: AggregateKind,
    pub display_name: Option<String>,
    pub members: Vec<MemberDef>,
}

/// One member definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDef {
    pub name: String,
    pub display_name: Option<String>,
    pub kind: MemberSource,
    pub nullable: bool,
    pub is_key: bool,
    pub is_instance_name: bool,
}

/// Member kind with targets still given as aggregate ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberSource {
    Value { type_name: String },
    Child { target: String },
    Children { target: String },
    /// (discriminator, target id) in declaration order
    Variation { variants: Vec<(String, String)> },
    Ref { target: String },
}

impl SchemaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_application(mut self, name: impl Into<String>) -> Self {
        self.application = Some(name.into());
        self
    }

    /// Append an aggregate definition. Duplicate ids are accepted here and
    /// rejected by the build.
    pub fn add_aggregate(&mut self, aggregate: AggregateDef) -> &mut AggregateDef {
        self.aggregates.push(aggregate);
        let last = self.aggregates.len() - 1;
        &mut self.aggregates[last]
    }

    /// Append a member to the first aggregate with id `aggregate_id`
    pub fn add_member(&mut self, aggregate_id: &str, member: MemberDef) -> Result<()> {
        let aggregate = self
            .aggregates
            .iter_mut()
            .find(|a| a.id == aggregate_id)
            .ok_or_else(|| SchemaError::UnknownAggregate(aggregate_id.to_string()))?;
        aggregate.members.push(member);
        Ok(())
    }

    pub fn add_enum(&mut self, name: impl Into<String>, items: Vec<(String, Option<i32>)>) {
        self.enums.push(EnumSource {
            name: name.into(),
            items,
        });
    }

    /// Append another source's definitions after this one's
    pub fn merge(&mut self, other: SchemaSource) {
        if self.application.is_none() {
            self.application = other.application;
        }
        self.enums.extend(other.enums);
        self.aggregates.extend(other.aggregates);
    }

    pub fn aggregate(&self, id: &str) -> Option<&AggregateDef> {
        self.aggregates.iter().find(|a| a.id == id)
    }
}

impl AggregateDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AggregateKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            display_name: None,
            members: Vec::new(),
        }
    }

    /// Root aggregate whose id is its name
    pub fn root(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, AggregateKind::Root)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }
}

impl MemberDef {
    fn new(name: impl Into<String>, kind: MemberSource) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            kind,
            nullable: false,
            is_key: false,
            is_instance_name: false,
        }
    }

    pub fn value(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(
            name,
            MemberSource::Value {
                type_name: type_name.into(),
            },
        )
    }

    pub fn child(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, MemberSource::Child { target: target.into() })
    }

    pub fn children(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, MemberSource::Children { target: target.into() })
    }

    pub fn variation<D, T>(name: impl Into<String>, variants: impl IntoIterator<Item = (D, T)>) -> Self
    where
        D: Into<String>,
        T: Into<String>,
    {
        let variants = variants
            .into_iter()
            .map(|(discriminator, target)| (discriminator.into(), target.into()))
            .collect();
        Self::new(name, MemberSource::Variation { variants })
    }

    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, MemberSource::Ref { target: target.into() })
    }

    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    pub fn instance_name(mut self) -> Self {
        self.is_instance_name = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Aggregate ids this member owns, in declaration order
    pub fn owned_targets(&self) -> Vec<&str> {
        match &self.kind {
            MemberSource::Child { target } | MemberSource::Children { target } => vec![target.as_str()],
            MemberSource::Variation { variants } => variants.iter().map(|(_, t)| t.as_str()).collect(),
            MemberSource::Value { .. } | MemberSource::Ref { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programmatic_source() {
        let mut source = SchemaSource::new().with_application("販売管理");
        source
            .add_aggregate(AggregateDef::root("営業所"))
            .members
            .push(MemberDef::value("営業所コード", "word").key());
        source.add_aggregate(AggregateDef::new("営業所/担当者", "担当者", AggregateKind::Children));
        source
            .add_member("営業所", MemberDef::children("担当者", "営業所/担当者"))
            .unwrap();

        let office = source.aggregate("営業所").unwrap();
        assert_eq!(office.members.len(), 2);
        assert_eq!(office.members[1].owned_targets(), vec!["営業所/担当者"]);
    }

    #[test]
    fn test_add_member_to_unknown_aggregate() {
        let mut source = SchemaSource::new();
        let err = source.add_member("nowhere", MemberDef::value("x", "word")).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownAggregate(id) if id == "nowhere"));
    }

    #[test]
    fn test_variation_targets_keep_order() {
        let member = MemberDef::variation("種別", [("個人", "顧客/個人"), ("法人", "顧客/法人")]);
        assert_eq!(member.owned_targets(), vec!["顧客/個人", "顧客/法人"]);
    }
}
