//! Physical Name Resolution
//!
//! Turns declared aggregate and member names into identifiers that are safe to
//! emit into generated code, tables and files:
//! - characters outside letters, digits and `_` become `_`
//! - a leading digit gets a `_` prefix
//! - aggregates share one global namespace; a name used by several aggregates
//!   or equal to a reserved word is prefixed with its owner's physical name
//! - members share a namespace per aggregate; only reserved words are prefixed
//!
//! Whatever still collides afterwards is reported, never silently renamed.
//!
//! Disambiguation is idempotent: resolving an already-resolved name returns it
//! unchanged.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::config::NamingConfig;
use crate::schema::MemberId;

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_]").expect("identifier pattern is valid"))
}

/// Name input for one aggregate, in build order
#[derive(Debug, Clone)]
pub struct AggregateName<'a> {
    pub name: &'a str,
    /// Position of the owning aggregate in the same input slice
    pub owner: Option<usize>,
}

/// Result of resolving one namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedNames {
    /// One physical name per input, same order
    pub physical: Vec<String>,
    /// Input positions whose physical names are identical, earlier first
    pub collisions: Vec<(usize, usize)>,
}

/// Resolves declared names to physical identifiers
#[derive(Debug, Clone)]
pub struct NameResolver {
    /// Lower-cased reserved words
    reserved: HashSet<String>,
    separator: String,
}

impl NameResolver {
    pub fn new(config: &NamingConfig) -> Self {
        Self {
            reserved: config.reserved_words.iter().map(|w| w.to_lowercase()).collect(),
            separator: config.separator.clone(),
        }
    }

    /// Replace characters that cannot appear in an identifier
    pub fn sanitize(&self, name: &str) -> String {
        let replaced = invalid_chars().replace_all(name.trim(), "_");
        match replaced.chars().next() {
            None => "_".to_string(),
            Some(first) if first.is_numeric() => format!("_{replaced}"),
            Some(_) => replaced.into_owned(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(&name.to_lowercase())
    }

    /// Prefix `name` with `owner_physical`. A name that already carries the
    /// prefix is returned as-is.
    pub fn disambiguate(&self, name: &str, owner_physical: &str) -> String {
        let prefix = format!("{owner_physical}{}", self.separator);
        if name.starts_with(&prefix) && name.len() > prefix.len() {
            return name.to_string();
        }
        format!("{prefix}{name}")
    }

    /// Escape a reserved word that has no owner to prefix it with
    fn escape(&self, name: &str) -> String {
        if self.is_reserved(name) {
            format!("{name}{}", self.separator)
        } else {
            name.to_string()
        }
    }

    /// Resolve the global aggregate namespace.
    ///
    /// Owners must come before the aggregates they own.
    pub fn resolve_aggregates(&self, aggregates: &[AggregateName<'_>]) -> ResolvedNames {
        let bases: Vec<String> = aggregates.iter().map(|a| self.sanitize(a.name)).collect();

        let mut usage: HashMap<String, usize> = HashMap::new();
        for base in &bases {
            *usage.entry(base.to_lowercase()).or_default() += 1;
        }

        let mut physical: Vec<String> = Vec::with_capacity(bases.len());
        for (aggregate, base) in aggregates.iter().zip(&bases) {
            let shared = usage[&base.to_lowercase()] > 1;
            let name = match aggregate.owner.and_then(|owner| physical.get(owner)) {
                Some(owner) if shared || self.is_reserved(base) => self.disambiguate(base, owner),
                _ => self.escape(base),
            };
            physical.push(name);
        }

        let collisions = find_collisions(&physical);
        ResolvedNames { physical, collisions }
    }

    /// Resolve the member namespace of one aggregate
    pub fn resolve_members(&self, aggregate_physical: &str, names: &[&str]) -> ResolvedNames {
        let physical: Vec<String> = names
            .iter()
            .map(|name| {
                let base = self.sanitize(name);
                if self.is_reserved(&base) {
                    self.disambiguate(&base, aggregate_physical)
                } else {
                    base
                }
            })
            .collect();

        let collisions = find_collisions(&physical);
        ResolvedNames { physical, collisions }
    }

    /// Concatenate own-key lists walked from the root down to the aggregate
    /// itself into its composite key.
    pub fn composite_key<'k>(&self, chain_root_first: impl IntoIterator<Item = &'k [MemberId]>) -> Vec<MemberId> {
        chain_root_first.into_iter().flatten().copied().collect()
    }
}

/// Pairs of positions whose names compare equal ignoring case
fn find_collisions(names: &[String]) -> Vec<(usize, usize)> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut collisions = Vec::new();
    for (index, name) in names.iter().enumerate() {
        match first_seen.get(&name.to_lowercase()) {
            Some(&first) => collisions.push((first, index)),
            None => {
                first_seen.insert(name.to_lowercase(), index);
            }
        }
    }
    collisions
}
