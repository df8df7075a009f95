//! Version string cleaning
//!
//! Reduces whatever follows a package name to a single version token:
//! - Leading range operators are stripped: `^1.2.3`, `~1.2.3`, `>=1.2.3` → `1.2.3`
//! - Compound ranges are truncated: `>=1.0.0 <2.0.0`, `1.0.0, 2.0.0` → `1.0.0`
//! - Wildcards and non-registry specs (`*`, `x`, `git+https://…`) → `latest`

use crate::domain::LATEST;
use regex::Regex;
use std::sync::LazyLock;

/// Characters stripped from the front of a version
const RANGE_OPERATORS: &[char] = &['^', '~', '>', '=', '<'];

// A registry-resolvable version or dist-tag: 1.2.3, 1.2.3-beta.1, 1.x, next
static VERSION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z.+_-]*$").unwrap());

/// Clean a raw version spec, falling back to [`LATEST`]
pub fn clean_version(raw: &str) -> String {
    let stripped = raw.trim().trim_start_matches(RANGE_OPERATORS);
    let token = stripped
        .split(|c: char| c == ',' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .trim();

    if token.is_empty() || is_wildcard(token) || !VERSION_TOKEN_RE.is_match(token) {
        return LATEST.to_string();
    }

    token.to_string()
}

fn is_wildcard(token: &str) -> bool {
    matches!(token, "*" | "x" | "X")
}
