//! Member Type Catalog
//!
//! Closed set of value-member kinds plus one behaviour row per kind:
//! - whether a member of that kind may take part in a key
//! - how downstream search emitters should match it ([`SearchBehavior`])
//! - the type name each backend represents it with
//!
//! The catalog only classifies. Matching, rendering and platform type binding
//! belong to the emitters.
//!
//! Enumerations declared by a schema are registered here by name so that value
//! members can refer to them with their type tag.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

// =============================================================================
// Capabilities
// =============================================================================

/// How a member is matched by generated search/filter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBehavior {
    /// Exact, discrete match
    Strict,
    /// Substring / fuzzy match
    Ambiguous,
}

/// Abstract code generation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Server,
    Client,
}

/// Capability set shared by every member kind
pub trait MemberType {
    fn can_be_key(&self) -> bool;

    /// `None` for members that are not searchable on their own (owned children)
    fn search_behavior(&self) -> Option<SearchBehavior>;

    /// `None` for members the backend represents as a nested object
    fn representable_type_name(&self, backend: Backend) -> Option<String>;
}

// =============================================================================
// Value Kinds
// =============================================================================

/// Kind of a scalar value member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Identifier,
    Uuid,
    Word,
    Sentence,
    Integer,
    Numeric,
    Boolean,
    Timestamp,
    Date,
    YearMonth,
    /// Ordinal position inside a child collection
    Sequence,
    /// Value backed by a schema-declared enumeration
    Enumeration(String),
}

struct TypeEntry {
    tag: &'static str,
    aliases: &'static [&'static str],
    can_be_key: bool,
    search: SearchBehavior,
    server: &'static str,
    client: &'static str,
}

static IDENTIFIER: TypeEntry = TypeEntry {
    tag: "identifier",
    aliases: &["id"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "string",
    client: "string",
};
static UUID: TypeEntry = TypeEntry {
    tag: "uuid",
    aliases: &["guid"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "uuid",
    client: "string",
};
static WORD: TypeEntry = TypeEntry {
    tag: "word",
    aliases: &[],
    can_be_key: true,
    search: SearchBehavior::Ambiguous,
    server: "string",
    client: "string",
};
static SENTENCE: TypeEntry = TypeEntry {
    tag: "sentence",
    aliases: &["text"],
    can_be_key: false,
    search: SearchBehavior::Ambiguous,
    server: "text",
    client: "string",
};
static INTEGER: TypeEntry = TypeEntry {
    tag: "integer",
    aliases: &["int"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "int32",
    client: "number",
};
static NUMERIC: TypeEntry = TypeEntry {
    tag: "numeric",
    aliases: &["decimal", "number"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "decimal",
    client: "number",
};
static BOOLEAN: TypeEntry = TypeEntry {
    tag: "boolean",
    aliases: &["bool"],
    can_be_key: false,
    search: SearchBehavior::Strict,
    server: "bool",
    client: "boolean",
};
static TIMESTAMP: TypeEntry = TypeEntry {
    tag: "timestamp",
    aliases: &["datetime"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "datetime",
    client: "string",
};
static DATE: TypeEntry = TypeEntry {
    tag: "date",
    aliases: &[],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "date",
    client: "string",
};
static YEAR_MONTH: TypeEntry = TypeEntry {
    tag: "year-month",
    aliases: &["yearmonth"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "year_month",
    client: "number",
};
static SEQUENCE: TypeEntry = TypeEntry {
    tag: "sequence",
    aliases: &["seq"],
    can_be_key: true,
    search: SearchBehavior::Strict,
    server: "int32",
    client: "number",
};

/// Every built-in row, in documentation order
static BUILTIN: [&TypeEntry; 11] = [
    &IDENTIFIER, &UUID, &WORD, &SENTENCE, &INTEGER, &NUMERIC,
    &BOOLEAN, &TIMESTAMP, &DATE, &YEAR_MONTH, &SEQUENCE,
];

impl ValueKind {
    fn entry(&self) -> Option<&'static TypeEntry> {
        match self {
            Self::Identifier => Some(&IDENTIFIER),
            Self::Uuid => Some(&UUID),
            Self::Word => Some(&WORD),
            Self::Sentence => Some(&SENTENCE),
            Self::Integer => Some(&INTEGER),
            Self::Numeric => Some(&NUMERIC),
            Self::Boolean => Some(&BOOLEAN),
            Self::Timestamp => Some(&TIMESTAMP),
            Self::Date => Some(&DATE),
            Self::YearMonth => Some(&YEAR_MONTH),
            Self::Sequence => Some(&SEQUENCE),
            Self::Enumeration(_) => None,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "identifier" => Self::Identifier,
            "uuid" => Self::Uuid,
            "word" => Self::Word,
            "sentence" => Self::Sentence,
            "integer" => Self::Integer,
            "numeric" => Self::Numeric,
            "boolean" => Self::Boolean,
            "timestamp" => Self::Timestamp,
            "date" => Self::Date,
            "year-month" => Self::YearMonth,
            "sequence" => Self::Sequence,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical type tag used in the interchange form
    pub fn tag(&self) -> &str {
        match self {
            Self::Enumeration(name) => name,
            other => other.entry().map(|e| e.tag).unwrap_or_default(),
        }
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self, Self::Enumeration(_))
    }
}

impl MemberType for ValueKind {
    fn can_be_key(&self) -> bool {
        self.entry().map(|e| e.can_be_key).unwrap_or(true)
    }

    fn search_behavior(&self) -> Option<SearchBehavior> {
        Some(self.entry().map(|e| e.search).unwrap_or(SearchBehavior::Strict))
    }

    fn representable_type_name(&self, backend: Backend) -> Option<String> {
        let name = match (self.entry(), backend) {
            (Some(entry), Backend::Server) => entry.server,
            (Some(entry), Backend::Client) => entry.client,
            (None, _) => self.tag(),
        };
        Some(name.to_string())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Resolves type tags written in a schema to [`ValueKind`]s
#[derive(Debug, Clone, Default)]
pub struct MemberTypeCatalog {
    enumerations: HashSet<String>,
}

impl MemberTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an enumeration name usable as a member type tag
    pub fn register_enumeration(&mut self, name: impl Into<String>) {
        self.enumerations.insert(name.into());
    }

    /// Resolve a tag or alias. Built-in tags win over enumeration names.
    pub fn resolve(&self, type_name: &str) -> Option<ValueKind> {
        let lowered = type_name.trim().to_lowercase();
        if let Some(kind) = ValueKind::from_tag(&lowered) {
            return Some(kind);
        }
        if let Some(entry) = BUILTIN.iter().find(|e| e.aliases.contains(&lowered.as_str())) {
            return ValueKind::from_tag(entry.tag);
        }
        if self.enumerations.contains(type_name) {
            return Some(ValueKind::Enumeration(type_name.to_string()));
        }
        None
    }

    /// Built-in type tags, for "unknown type" messages
    pub fn builtin_tags() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|e| e.tag)
    }

    /// Whether `name` is taken by a built-in tag, an alias or a member kind
    /// keyword, compared the way [`MemberTypeCatalog::resolve`] compares.
    /// Such a name can never be used as an enumeration.
    pub fn is_reserved(name: &str) -> bool {
        let lowered = name.trim().to_lowercase();
        MEMBER_KIND_TAGS.contains(&lowered.as_str())
            || BUILTIN
                .iter()
                .any(|e| e.tag == lowered || e.aliases.contains(&lowered.as_str()))
    }
}

/// Kind tags the interchange form reads before any type lookup
const MEMBER_KIND_TAGS: [&str; 4] = ["child", "children", "variation", "ref"];

// =============================================================================
// Enumerations
// =============================================================================

/// One item of a declared enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumItem {
    pub name: String,
    pub value: i32,
}

/// A named enumeration with fully numbered items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub items: Vec<EnumItem>,
    /// Path of the variation member this enumeration was derived from.
    /// `None` for enumerations declared in the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
}

impl EnumDefinition {
    /// Number items and validate them.
    ///
    /// Items without an explicit value take the smallest non-negative integer not
    /// used by any other item. All problems are returned together.
    pub fn build(name: &str, items: &[(String, Option<i32>)]) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        if name.trim().is_empty() {
            errors.push("enumeration name is empty".to_string());
        }
        if items.is_empty() {
            errors.push(format!("enumeration '{name}' has no items"));
        }

        let mut seen_names = HashSet::new();
        for (item, _) in items {
            if !seen_names.insert(item.as_str()) {
                errors.push(format!("enumeration '{name}' declares item '{item}' twice"));
            }
        }

        let mut value_owner: HashMap<i32, &str> = HashMap::new();
        for (item, value) in items {
            if let Some(value) = value {
                if let Some(previous) = value_owner.insert(*value, item) {
                    errors.push(format!(
                        "enumeration '{name}' gives value {value} to both '{previous}' and '{item}'"
                    ));
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut next_free = 0;
        let numbered = items
            .iter()
            .map(|(item, value)| {
                let value = match value {
                    Some(v) => *v,
                    None => {
                        while value_owner.contains_key(&next_free) {
                            next_free += 1;
                        }
                        value_owner.insert(next_free, item);
                        next_free
                    }
                };
                EnumItem {
                    name: item.clone(),
                    value,
                }
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            items: numbered,
            switch: None,
        })
    }

    pub fn is_synthesized(&self) -> bool {
        self.switch.is_some()
    }
}
