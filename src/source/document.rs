//! Interchange Document
//!
//! The JSON form schemas are authored in. Owned aggregates are written inline
//! as subtrees of the member that owns them:
//!
//! ```json
//! {
//!   "application": "販売管理",
//!   "aggregates": [
//!     { "name": "営業所", "members": [
//!       { "name": "営業所コード", "kind": "word", "primary": true },
//!       { "name": "担当者", "kind": "children", "children": {
//!           "name": "担当者", "members": [
//!             { "name": "氏名", "kind": "word", "isInstanceName": true } ] } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Variation maps keep the order they are written in.

use serde::{Deserialize, Serialize};

use super::{AggregateDef, EnumSource, MemberDef, MemberSource, SchemaSource};
use crate::schema::AggregateKind;

/// Top level of an interchange file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumNode>,

    #[serde(default)]
    pub aggregates: Vec<AggregateNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumNode {
    pub name: String,
    pub items: Vec<EnumItemNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumItemNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

/// An aggregate with its owned aggregates nested inside its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateNode {
    pub name: String,

    /// Implied by the owning member when nested; `root` at top level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AggregateKind>,

    /// Defaults to the name at top level, `{owner id}/{name}` when nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub members: Vec<MemberNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberNode {
    pub name: String,

    /// `child`, `children`, `variation`, `ref`, or a value type tag
    pub kind: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub primary: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_instance_name: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<AggregateNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Box<AggregateNode>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "ordered_variations"
    )]
    pub variations: Option<Vec<(String, AggregateNode)>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_target: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A JSON object read into a `Vec` so document order survives
mod ordered_variations {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::AggregateNode;

    type Entries = Option<Vec<(String, AggregateNode)>>;

    pub fn serialize<S: Serializer>(value: &Entries, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            None => serializer.serialize_none(),
            Some(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (discriminator, node) in entries {
                    map.serialize_entry(discriminator, node)?;
                }
                map.end()
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Entries, D::Error> {
        deserializer.deserialize_option(OrderedVisitor)
    }

    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Entries;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from discriminator to aggregate")
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((discriminator, node)) = access.next_entry::<String, AggregateNode>()? {
                entries.push((discriminator, node));
            }
            Ok(Some(entries))
        }
    }
}

impl SchemaDocument {
    /// Flatten nested aggregates into a [`SchemaSource`] in document pre-order.
    ///
    /// Only structural problems are reported here: an ownership member without
    /// its subtree, a `ref` without a target. Everything else is left to the
    /// build. All problems are returned together.
    pub fn into_source(self) -> Result<SchemaSource, Vec<String>> {
        let mut source = SchemaSource {
            application: self.application,
            ..SchemaSource::default()
        };
        let mut problems = Vec::new();

        for node in self.enums {
            let items = node.items.into_iter().map(|i| (i.name, i.value)).collect();
            source.enums.push(EnumSource { name: node.name, items });
        }

        for node in self.aggregates {
            let id = node.id.clone().unwrap_or_else(|| node.name.clone());
            let kind = node.kind.unwrap_or_default();
            flatten(node, id, kind, &mut source.aggregates, &mut problems);
        }

        if problems.is_empty() {
            Ok(source)
        } else {
            Err(problems)
        }
    }
}

fn flatten(
    node: AggregateNode,
    id: String,
    kind: AggregateKind,
    out: &mut Vec<AggregateDef>,
    problems: &mut Vec<String>,
) {
    let slot = out.len();
    out.push(AggregateDef {
        id: id.clone(),
        name: node.name,
        kind,
        display_name: node.display_name,
        members: Vec::new(),
    });

    let mut members = Vec::with_capacity(node.members.len());
    for member in node.members {
        let path = format!("{id}.{}", member.name);
        let kind = match member.kind.as_str() {
            "child" => match member.child {
                Some(subtree) => {
                    let target = nested(*subtree, &id, AggregateKind::Child, out, problems);
                    MemberSource::Child { target }
                }
                None => {
                    problems.push(format!("{path}: member of kind 'child' has no 'child' subtree"));
                    continue;
                }
            },
            "children" => match member.children {
                Some(subtree) => {
                    let target = nested(*subtree, &id, AggregateKind::Children, out, problems);
                    MemberSource::Children { target }
                }
                None => {
                    problems.push(format!("{path}: member of kind 'children' has no 'children' subtree"));
                    continue;
                }
            },
            "variation" => match member.variations {
                Some(entries) => {
                    let variants = entries
                        .into_iter()
                        .map(|(discriminator, subtree)| {
                            let target = nested(subtree, &id, AggregateKind::Variation, out, problems);
                            (discriminator, target)
                        })
                        .collect();
                    MemberSource::Variation { variants }
                }
                None => {
                    problems.push(format!("{path}: member of kind 'variation' has no 'variations' map"));
                    continue;
                }
            },
            "ref" => match member.ref_target {
                Some(target) => MemberSource::Ref { target },
                None => {
                    problems.push(format!("{path}: member of kind 'ref' has no 'refTarget'"));
                    continue;
                }
            },
            _ => MemberSource::Value {
                type_name: member.kind.clone(),
            },
        };

        members.push(MemberDef {
            name: member.name,
            display_name: member.display_name,
            kind,
            nullable: member.nullable,
            is_key: member.primary,
            is_instance_name: member.is_instance_name,
        });
    }
    out[slot].members = members;
}

/// Flatten an owned subtree and return the id it was stored under
fn nested(
    subtree: AggregateNode,
    owner_id: &str,
    implied: AggregateKind,
    out: &mut Vec<AggregateDef>,
    problems: &mut Vec<String>,
) -> String {
    let id = subtree
        .id
        .clone()
        .unwrap_or_else(|| format!("{owner_id}/{}", subtree.name));
    // a declared kind that disagrees is kept for the build to report
    let kind = subtree.kind.unwrap_or(implied);
    flatten(subtree, id.clone(), kind, out, problems);
    id
}
