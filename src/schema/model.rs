//! Frozen aggregate and member types
//!
//! Everything here is produced by [`crate::builder::SchemaBuilder`] and handed
//! out by reference from [`crate::schema::AppSchema`]. Nothing mutates after the
//! build.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Backend, MemberType, SearchBehavior, ValueKind};
use crate::graph::NodeHandle;

/// Label of an edge in the aggregate graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    ParentChild,
    ParentChildren,
    ParentVariation,
    Reference,
}

impl Relation {
    /// The three ownership labels; their edges form a forest
    pub const OWNERSHIP: [Relation; 3] = [
        Relation::ParentChild,
        Relation::ParentChildren,
        Relation::ParentVariation,
    ];

    pub fn is_ownership(self) -> bool {
        self != Relation::Reference
    }

    /// Aggregate kind an ownership edge requires at its target
    pub fn owned_kind(self) -> Option<AggregateKind> {
        match self {
            Relation::ParentChild => Some(AggregateKind::Child),
            Relation::ParentChildren => Some(AggregateKind::Children),
            Relation::ParentVariation => Some(AggregateKind::Variation),
            Relation::Reference => None,
        }
    }
}

/// Position of an aggregate in the built schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregateId(pub(crate) usize);

impl AggregateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aggregate#{}", self.0)
    }
}

/// A member, addressed by its aggregate and its position in that aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId {
    pub aggregate: AggregateId,
    pub(crate) index: usize,
}

impl MemberId {
    pub fn index(self) -> usize {
        self.index
    }
}

/// Role an aggregate plays in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    #[default]
    Root,
    Child,
    Children,
    Variation,
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Child => "child",
            Self::Children => "children",
            Self::Variation => "variation",
        };
        f.write_str(name)
    }
}

/// One branch of a variation switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub discriminator: String,
    /// Name of the variation aggregate; also its item name in the switch enumeration
    pub name: String,
    pub target: AggregateId,
}

/// What a member holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberKind {
    Value { value: ValueKind },
    Child { target: AggregateId },
    Children { target: AggregateId },
    /// `enumeration` names the enumeration the build derives from the switch
    Variation {
        enumeration: String,
        variants: Vec<Variant>,
    },
    Ref { target: AggregateId },
}

impl MemberKind {
    /// Aggregate this member points at, for single-target kinds
    pub fn target(&self) -> Option<AggregateId> {
        match self {
            Self::Child { target } | Self::Children { target } | Self::Ref { target } => Some(*target),
            Self::Value { .. } | Self::Variation { .. } => None,
        }
    }

    pub fn value_kind(&self) -> Option<&ValueKind> {
        match self {
            Self::Value { value } => Some(value),
            _ => None,
        }
    }

    /// Tag written in the interchange form
    pub fn tag(&self) -> &str {
        match self {
            Self::Value { value } => value.tag(),
            Self::Child { .. } => "child",
            Self::Children { .. } => "children",
            Self::Variation { .. } => "variation",
            Self::Ref { .. } => "ref",
        }
    }
}

impl MemberType for MemberKind {
    fn can_be_key(&self) -> bool {
        match self {
            Self::Value { value } => value.can_be_key(),
            Self::Ref { .. } => true,
            Self::Child { .. } | Self::Children { .. } | Self::Variation { .. } => false,
        }
    }

    fn search_behavior(&self) -> Option<SearchBehavior> {
        match self {
            Self::Value { value } => value.search_behavior(),
            Self::Ref { .. } | Self::Variation { .. } => Some(SearchBehavior::Strict),
            Self::Child { .. } | Self::Children { .. } => None,
        }
    }

    fn representable_type_name(&self, backend: Backend) -> Option<String> {
        match self {
            Self::Value { value } => value.representable_type_name(backend),
            Self::Variation { enumeration, .. } if backend == Backend::Server => {
                Some(enumeration.clone())
            }
            Self::Variation { variants, .. } => Some(
                variants
                    .iter()
                    .map(|v| format!("'{}'", v.name))
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
            Self::Child { .. } | Self::Children { .. } | Self::Ref { .. } => None,
        }
    }
}

/// A named field of an aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub display_name: String,
    /// Unique within its aggregate after disambiguation
    pub physical_name: String,
    /// `{aggregate id}.{name}`, used in diagnostics
    pub path: String,
    pub kind: MemberKind,
    pub nullable: bool,
    /// Part of the aggregate's own key
    pub is_key: bool,
    pub is_instance_name: bool,
    /// Added by the builder rather than declared
    pub implicit: bool,
}

impl Member {
    pub fn is_value(&self) -> bool {
        matches!(self.kind, MemberKind::Value { .. })
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.kind, MemberKind::Ref { .. })
    }
}

impl MemberType for Member {
    fn can_be_key(&self) -> bool {
        self.kind.can_be_key()
    }

    fn search_behavior(&self) -> Option<SearchBehavior> {
        self.kind.search_behavior()
    }

    fn representable_type_name(&self, backend: Backend) -> Option<String> {
        self.kind.representable_type_name(backend)
    }
}

/// A node of the schema: a record type with members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub id: AggregateId,
    /// Stable identifier used in source and references
    pub schema_id: String,
    pub name: String,
    pub display_name: String,
    /// Globally unique generated identifier
    pub physical_name: String,
    pub kind: AggregateKind,
    pub members: Vec<Member>,
    pub(crate) keys: Vec<MemberId>,
    pub(crate) instance_name: Option<MemberId>,
    #[serde(skip)]
    pub(crate) node: NodeHandle,
}

impl Aggregate {
    pub fn is_root(&self) -> bool {
        self.kind == AggregateKind::Root
    }

    /// Members flagged as this aggregate's own key, excluding inherited ones
    pub fn own_key_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_key)
    }

    pub fn member_named(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_labels() {
        assert!(Relation::OWNERSHIP.iter().all(|r| r.is_ownership()));
        assert!(!Relation::Reference.is_ownership());
        assert_eq!(Relation::ParentChildren.owned_kind(), Some(AggregateKind::Children));
        assert_eq!(Relation::Reference.owned_kind(), None);
    }

    #[test]
    fn test_member_kind_capabilities() {
        let reference = MemberKind::Ref { target: AggregateId(0) };
        assert!(reference.can_be_key());
        assert_eq!(reference.search_behavior(), Some(SearchBehavior::Strict));
        assert_eq!(reference.representable_type_name(Backend::Server), None);

        let child = MemberKind::Children { target: AggregateId(1) };
        assert!(!child.can_be_key());
        assert_eq!(child.search_behavior(), None);

        let text = MemberKind::Value { value: ValueKind::Sentence };
        assert!(!text.can_be_key());
        assert_eq!(text.search_behavior(), Some(SearchBehavior::Ambiguous));
        assert_eq!(text.tag(), "sentence");
    }

    #[test]
    fn test_switch_type_names() {
        let switch = MemberKind::Variation {
            enumeration: "E_種別".to_string(),
            variants: vec![
                Variant {
                    discriminator: "1".to_string(),
                    name: "個人".to_string(),
                    target: AggregateId(1),
                },
                Variant {
                    discriminator: "2".to_string(),
                    name: "法人".to_string(),
                    target: AggregateId(2),
                },
            ],
        };
        assert!(!switch.can_be_key());
        assert_eq!(switch.search_behavior(), Some(SearchBehavior::Strict));
        assert_eq!(switch.representable_type_name(Backend::Server).as_deref(), Some("E_種別"));
        assert_eq!(
            switch.representable_type_name(Backend::Client).as_deref(),
            Some("'個人' | '法人'")
        );
    }
}
