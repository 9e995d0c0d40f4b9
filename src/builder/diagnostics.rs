//! Diagnostics
//!
//! Schema defects found while building. Every validation phase pushes into one
//! ordered collection so a schema author sees all defects of a run together.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Kind of schema defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Registration ===
    /// Two aggregates share one identifier
    DuplicateNodeId,
    /// Value member type tag is neither built in nor a declared enumeration
    UnknownMemberType,
    /// Two members of one aggregate share a name
    DuplicateMemberName,
    /// More than one member flagged as instance name
    DuplicateInstanceName,
    /// Enumeration with duplicate items or values
    InvalidEnumeration,

    // === Structure ===
    /// Ownership member points at an aggregate id that does not exist
    UnknownAggregate,
    /// Ownership member kind disagrees with the owned aggregate's kind
    OwnershipKindMismatch,
    /// Non-root aggregate nobody owns
    OrphanAggregate,
    /// Aggregate owned by more than one member
    MultipleOwners,
    /// Aggregate owns itself, directly or transitively
    CyclicOwnership,

    // === References ===
    /// Ref target id does not exist
    UnresolvedReference,
    /// Ref target exists but is not a root aggregate
    RefTargetNotRoot,

    // === Keys ===
    /// Aggregate ends up with an empty composite key
    MissingKey,
    /// Key flag on a member kind that cannot be part of a key
    KeyNotAllowed,

    // === Variations ===
    /// Discriminator value used twice in one switch
    DuplicateDiscriminator,
    /// Blank discriminator value
    EmptyDiscriminator,
    /// Variation aggregate declares its own key members
    VariantHasOwnKey,
    /// Switch without any variant
    EmptyVariationSwitch,
    /// Switch with exactly one variant
    SingleVariantSwitch,
    /// Discriminator that is not an integer
    NonIntegerDiscriminator,

    // === Naming ===
    /// Two generated identifiers would be identical
    NameCollision,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateNodeId => "E001",
            Self::UnknownMemberType => "E002",
            Self::DuplicateMemberName => "E003",
            Self::DuplicateInstanceName => "E004",
            Self::InvalidEnumeration => "E005",
            Self::UnknownAggregate => "E010",
            Self::OwnershipKindMismatch => "E011",
            Self::OrphanAggregate => "E012",
            Self::MultipleOwners => "E013",
            Self::CyclicOwnership => "E014",
            Self::UnresolvedReference => "E020",
            Self::RefTargetNotRoot => "E021",
            Self::MissingKey => "E030",
            Self::KeyNotAllowed => "E031",
            Self::DuplicateDiscriminator => "E040",
            Self::EmptyDiscriminator => "E041",
            Self::VariantHasOwnKey => "E042",
            Self::EmptyVariationSwitch => "E043",
            Self::SingleVariantSwitch => "W044",
            Self::NonIntegerDiscriminator => "W045",
            Self::NameCollision => "E050",
        }
    }

    /// Severity unless configuration promotes it
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::SingleVariantSwitch | Self::NonIntegerDiscriminator => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Build Phase
// =============================================================================

/// Validation phase that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPhase {
    Structural,
    Reference,
    Key,
    Variation,
    Naming,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structural => "structural",
            Self::Reference => "reference",
            Self::Key => "key",
            Self::Variation => "variation",
            Self::Naming => "naming",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single schema defect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub phase: BuildPhase,
    /// Human-readable message
    pub message: String,
    /// Schema paths implicated, most specific first
    pub paths: Vec<String>,
    /// Additional context (suggestions, related paths)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(phase: BuildPhase, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            phase,
            message: message.into(),
            paths: Vec::new(),
            context: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.message)?;
        if !self.paths.is_empty() {
            write!(f, " ({})", self.paths.join(", "))?;
        }
        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }
        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Ordered collection of diagnostics from every phase of one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = DiagnosticItem>) {
        self.items.extend(items);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(DiagnosticItem::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Items carrying `code`, in report order
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.items.iter().map(|d| d.code).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop the errors, keeping the warnings
    pub(crate) fn into_non_errors(self) -> Self {
        Self {
            items: self.items.into_iter().filter(|d| !d.is_error()).collect(),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticItem;
    type IntoIter = std::vec::IntoIter<DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
