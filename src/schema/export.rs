//! Schema export
//!
//! Writes a built schema back out as an interchange document, or as a Graphviz
//! DOT digraph for visual inspection.

use super::{Aggregate, AggregateId, AggregateKind, AppSchema, MemberKind, Relation};
use crate::source::{AggregateNode, EnumItemNode, EnumNode, MemberNode, SchemaDocument};

impl AppSchema {
    /// Interchange document that loads back into an isomorphic schema.
    ///
    /// Implicit members are left out; the build adds them again. Ids are only
    /// written where they differ from the id the loader would derive.
    pub fn to_document(&self) -> SchemaDocument {
        let enums = self
            .enumerations()
            .iter()
            // switch enumerations are derived again on load
            .filter(|definition| !definition.is_synthesized())
            .map(|definition| EnumNode {
                name: definition.name.clone(),
                items: definition
                    .items
                    .iter()
                    .map(|item| EnumItemNode {
                        name: item.name.clone(),
                        value: Some(item.value),
                    })
                    .collect(),
            })
            .collect();

        let aggregates = self
            .roots()
            .map(|root| self.node_for(root.id, root.name.clone()))
            .collect();

        SchemaDocument {
            application: self.application_name().map(str::to_string),
            enums,
            aggregates,
        }
    }

    fn node_for(&self, id: AggregateId, derived_id: String) -> AggregateNode {
        let aggregate = self.aggregate(id);
        let members = aggregate
            .members
            .iter()
            .filter(|member| !member.implicit)
            .map(|member| {
                let mut node = MemberNode {
                    name: member.name.clone(),
                    kind: member.kind.tag().to_string(),
                    primary: member.is_key,
                    is_instance_name: member.is_instance_name,
                    nullable: member.nullable,
                    display_name: differs(&member.display_name, &member.name),
                    child: None,
                    children: None,
                    variations: None,
                    ref_target: None,
                };
                match &member.kind {
                    MemberKind::Value { .. } => {}
                    MemberKind::Child { target } => {
                        node.child = Some(Box::new(self.owned_node(aggregate, *target)));
                    }
                    MemberKind::Children { target } => {
                        node.children = Some(Box::new(self.owned_node(aggregate, *target)));
                    }
                    MemberKind::Variation { variants, .. } => {
                        node.variations = Some(
                            variants
                                .iter()
                                .map(|v| (v.discriminator.clone(), self.owned_node(aggregate, v.target)))
                                .collect(),
                        );
                    }
                    MemberKind::Ref { target } => {
                        node.ref_target = Some(self.aggregate(*target).schema_id.clone());
                    }
                }
                node
            })
            .collect();

        AggregateNode {
            name: aggregate.name.clone(),
            kind: None,
            id: differs(&aggregate.schema_id, &derived_id),
            display_name: differs(&aggregate.display_name, &aggregate.name),
            members,
        }
    }

    fn owned_node(&self, owner: &Aggregate, target: AggregateId) -> AggregateNode {
        let derived = format!("{}/{}", owner.schema_id, self.aggregate(target).name);
        self.node_for(target, derived)
    }

    /// Graphviz rendering: ownership edges solid, references dashed
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph AggregateSchema {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n");
        output.push('\n');

        for aggregate in self.all_aggregates() {
            let color = match aggregate.kind {
                AggregateKind::Root => "#00BCD4",
                AggregateKind::Child => "#4CAF50",
                AggregateKind::Children => "#FF9800",
                AggregateKind::Variation => "#9C27B0",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                escape(&aggregate.schema_id),
                escape(&aggregate.display_name),
                color
            ));
        }

        output.push('\n');

        for (from, to, relation) in self.edges() {
            let style = match relation {
                Relation::ParentChild => "label=\"child\"",
                Relation::ParentChildren => "label=\"children\"",
                Relation::ParentVariation => "label=\"variation\"",
                Relation::Reference => "label=\"ref\", style=dashed",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [{}];\n",
                escape(&self.aggregate(from).schema_id),
                escape(&self.aggregate(to).schema_id),
                style
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn differs(value: &str, default: &str) -> Option<String> {
    (value != default).then(|| value.to_string())
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
