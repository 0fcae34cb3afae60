//! URL slug generation.
//!
//! A slug is derived from a display name by lower-casing it, turning runs of
//! whitespace into single hyphens, dropping everything outside `[a-z0-9-]`,
//! collapsing repeated hyphens and trimming hyphens from both ends.
//!
//! Uniqueness is resolved against a caller-supplied existence check: the base
//! slug is tried first, then `base-1`, `base-2`, ... until a free one is found.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::shared::constants::MAX_SLUG_LENGTH;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9-]").unwrap());
static HYPHEN_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Independent slug spaces. A slug only has to be unique within its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlugNamespace {
    Categories,
    Posts,
    Tags,
}

impl SlugNamespace {
    /// Base slug used when a name strips down to nothing
    pub fn default_fallback(&self) -> &'static str {
        match self {
            SlugNamespace::Categories => "category",
            SlugNamespace::Posts => "post",
            SlugNamespace::Tags => "tag",
        }
    }
}

impl fmt::Display for SlugNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlugNamespace::Categories => "categories",
            SlugNamespace::Posts => "posts",
            SlugNamespace::Tags => "tags",
        };
        f.write_str(name)
    }
}

/// Normalize arbitrary text into slug form. May return an empty string.
pub fn slugify(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(&lowered, "-");
    let stripped = DISALLOWED_CHARS.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN.replace_all(&stripped, "-");
    truncate_slug(collapsed.trim_matches('-'), MAX_SLUG_LENGTH)
}

/// Cut an ASCII slug to `max_len` bytes without leaving a trailing hyphen
fn truncate_slug(slug: &str, max_len: usize) -> String {
    let cut = if slug.len() > max_len {
        &slug[..max_len]
    } else {
        slug
    };
    cut.trim_end_matches('-').to_string()
}

/// Sequence of candidate slugs: `base`, `base-1`, `base-2`, ...
///
/// Every candidate fits in [`MAX_SLUG_LENGTH`]; the base is shortened when a
/// suffix would overflow it.
#[derive(Debug, Clone)]
pub struct SlugCandidates {
    base: String,
    attempt: u64,
}

impl SlugCandidates {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            attempt: 0,
        }
    }

    pub fn next_candidate(&mut self) -> String {
        let candidate = if self.attempt == 0 {
            self.base.clone()
        } else {
            let suffix = format!("-{}", self.attempt);
            let base = truncate_slug(&self.base, MAX_SLUG_LENGTH - suffix.len());
            format!("{}{}", base, suffix)
        };
        self.attempt += 1;
        candidate
    }
}

/// Slug generator bound to a fallback base for names without slug-safe characters
#[derive(Debug, Clone)]
pub struct SlugGenerator {
    fallback: String,
}

impl SlugGenerator {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    pub fn for_namespace(namespace: SlugNamespace) -> Self {
        Self::new(namespace.default_fallback())
    }

    /// Base slug for `raw`, never empty
    pub fn base_slug(&self, raw: &str) -> String {
        let slug = slugify(raw);
        if slug.is_empty() {
            self.fallback.clone()
        } else {
            slug
        }
    }

    /// First candidate for which `exists` resolves to false. Candidates are
    /// tried strictly in order; lookup errors are returned unchanged.
    pub async fn generate_async<F, Fut, E>(&self, raw: &str, mut exists: F) -> Result<String, E>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        let mut candidates = SlugCandidates::new(self.base_slug(raw));
        loop {
            let candidate = candidates.next_candidate();
            if !exists(candidate.clone()).await? {
                return Ok(candidate);
            }
        }
    }
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::for_namespace(SlugNamespace::Categories)
    }
}
