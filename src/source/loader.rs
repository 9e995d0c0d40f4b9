//! Schema Loading
//!
//! Reads interchange JSON from a string, a file or a directory tree and
//! flattens it into a [`SchemaSource`]. Directory loads are deterministic:
//! files are read in sorted path order and fingerprinted in that order.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{SchemaDocument, SchemaSource};
use crate::checksum::{Checksum, SourceHasher};
use crate::error::{Result, SchemaError};

/// Configuration for directory loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip files whose relative path starts with one of these
    pub skip_prefixes: Vec<String>,
    /// When non-empty, only load files whose relative path starts with one of these
    pub include_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
            include_prefixes: Vec::new(),
        }
    }
}

/// Parse one interchange document
pub fn parse_str(content: &str) -> Result<SchemaSource> {
    let document: SchemaDocument = serde_json::from_str(content)?;
    let mut source = document.into_source().map_err(SchemaError::Malformed)?;
    source.fingerprint = Some(Checksum::of_text(content));
    Ok(source)
}

/// Load one interchange file
pub fn load_from_path(path: &Path) -> Result<SchemaSource> {
    let content = fs::read_to_string(path)?;
    let document: SchemaDocument = serde_json::from_str(&content)?;
    let mut source = document.into_source().map_err(|problems| {
        SchemaError::Malformed(
            problems
                .into_iter()
                .map(|p| format!("{}: {p}", path.display()))
                .collect(),
        )
    })?;
    source.fingerprint = Some(Checksum::of_text(&content));
    debug!(path = %path.display(), aggregates = source.aggregates.len(), "loaded schema file");
    Ok(source)
}

/// Load and merge every `*.json` file under `schema_dir`.
///
/// Structural problems from all files are reported together.
pub fn load_from_directory(schema_dir: &Path, config: &LoadConfig) -> Result<SchemaSource> {
    let mut files: Vec<(PathBuf, String)> = Vec::new();
    for entry in WalkDir::new(schema_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        let relative = path.strip_prefix(schema_dir).unwrap_or(path);
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        if !config.include_prefixes.is_empty()
            && !config.include_prefixes.iter().any(|p| relative_str.starts_with(p))
        {
            continue;
        }
        if config.skip_prefixes.iter().any(|p| relative_str.starts_with(p)) {
            continue;
        }
        files.push((path.to_path_buf(), relative_str));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));

    let mut merged = SchemaSource::new();
    let mut hasher = SourceHasher::new();
    let mut problems = Vec::new();

    for (path, relative) in &files {
        let content = fs::read_to_string(path)?;
        hasher.update(relative, &content);

        let document: SchemaDocument = serde_json::from_str(&content)?;
        match document.into_source() {
            Ok(source) => merged.merge(source),
            Err(found) => problems.extend(found.into_iter().map(|p| format!("{relative}: {p}"))),
        }
    }

    if !problems.is_empty() {
        return Err(SchemaError::Malformed(problems));
    }

    info!(
        dir = %schema_dir.display(),
        files = hasher.files(),
        aggregates = merged.aggregates.len(),
        "loaded schema directory"
    );
    merged.fingerprint = Some(hasher.finish());
    Ok(merged)
}
