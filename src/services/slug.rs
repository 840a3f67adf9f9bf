use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::database::{DatabaseError, DocumentStore};
use crate::filter::Filter;

static STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").expect("valid regex"));
static VALID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// Canonical URL-safe form of a display name. May be empty.
pub fn generate_slug(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = STRIP.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    hyphenated.trim_matches('-').to_string()
}

pub fn is_valid_slug(slug: &str) -> bool {
    VALID.is_match(slug)
}

/// Trim and lowercase a caller-supplied slug, then check its format
pub fn normalize_slug(raw: &str) -> Option<String> {
    let slug = raw.trim().to_lowercase();
    is_valid_slug(&slug).then_some(slug)
}

/// Whether `slug` is used in `collection`, ignoring documents whose
/// `exclude.0` field equals `exclude.1`.
pub async fn slug_taken(
    store: &dyn DocumentStore,
    collection: &str,
    slug: &str,
    exclude: Option<(&str, Value)>,
) -> Result<bool, DatabaseError> {
    let mut conditions = json!({ "slug": slug });
    if let Some((field, value)) = exclude {
        conditions[field] = json!({ "$ne": value });
    }
    Ok(store.count(collection, &Filter::from_where(conditions)?).await? > 0)
}

/// First of `base`, `base-1`, `base-2`, ... that is free in `collection`.
/// An empty base slug is returned unchanged.
pub async fn generate_unique_slug(
    store: &dyn DocumentStore,
    collection: &str,
    name: &str,
    exclude: Option<(&str, Value)>,
) -> Result<String, DatabaseError> {
    let base = generate_slug(name);
    if base.is_empty() {
        return Ok(base);
    }

    let mut candidate = base.clone();
    let mut counter = 1u64;
    while slug_taken(store, collection, &candidate, exclude.clone()).await? {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    Ok(candidate)
}

/// Same suffix rule against an in-memory set of used slugs
pub fn next_free_slug(base: &str, used: &HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut counter = 1u64;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    candidate
}
