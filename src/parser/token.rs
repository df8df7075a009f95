//! Line-oriented reference grammars
//!
//! Handles, in priority order:
//! - Quoted pair: `"react": "^18.2.0",` (a pasted dependencies fragment)
//! - Unscoped token: `react@18.2.0`
//! - Scoped token: `@types/node@20.1.0`, `@types/node`
//! - Bare name: `express`

use super::manifest::QUOTED_PAIR_RE;
use super::version::clean_version;
use crate::domain::PackageReference;
use regex::Regex;
use std::sync::LazyLock;

// npm-style name, optionally scoped; uppercase is accepted for legacy packages
static PACKAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[A-Za-z0-9][A-Za-z0-9._~-]*/)?[A-Za-z0-9][A-Za-z0-9._~-]*$").unwrap()
});

/// Which grammar matched a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineGrammar {
    QuotedPair,
    NameAtVersion,
    ScopedNameAtVersion,
    BareName,
}

/// Parse a single line, returning `None` when no grammar applies
pub fn parse_line(line: &str) -> Option<(LineGrammar, PackageReference)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(reference) = parse_quoted_pair(line) {
        return Some((LineGrammar::QuotedPair, reference));
    }

    if line.starts_with('@') {
        return parse_scoped(line).map(|r| (LineGrammar::ScopedNameAtVersion, r));
    }

    if line.contains('@') {
        return parse_name_at_version(line).map(|r| (LineGrammar::NameAtVersion, r));
    }

    parse_bare_name(line).map(|r| (LineGrammar::BareName, r))
}

fn parse_quoted_pair(line: &str) -> Option<PackageReference> {
    if !line.contains(':') {
        return None;
    }
    let caps = QUOTED_PAIR_RE.captures(line)?;
    let name = caps[1].trim();
    if !is_package_name(name) {
        return None;
    }
    Some(PackageReference::new(name, clean_version(&caps[2])))
}

/// `name@version`, split on the last `@`
fn parse_name_at_version(line: &str) -> Option<PackageReference> {
    let (name, version) = line.rsplit_once('@')?;
    let name = name.trim();
    if !is_loose_token(name) {
        return None;
    }
    Some(PackageReference::new(name, clean_version(version)))
}

/// `@scope/name@version` or `@scope/name`
fn parse_scoped(line: &str) -> Option<PackageReference> {
    let parts: Vec<&str> = line.split('@').collect();
    // parts[0] is the empty string before the leading '@'
    let scoped = parts.get(1)?;
    let (scope, name) = scoped.split_once('/')?;
    let full_name = format!("@{}/{}", scope.trim(), name.trim());
    if !is_package_name(&full_name) {
        return None;
    }

    let version = if parts.len() >= 3 {
        clean_version(&parts[2..].join("@"))
    } else {
        clean_version("")
    };
    Some(PackageReference::new(full_name, version))
}

/// A lone token with no `@`, whitespace or braces
fn parse_bare_name(line: &str) -> Option<PackageReference> {
    if line.contains(char::is_whitespace) || line.contains(['{', '}', '@']) {
        return None;
    }
    if !is_package_name(line) {
        return None;
    }
    Some(PackageReference::latest(line))
}

/// Looser check for the left side of `name@version`, which may itself contain `@`
fn is_loose_token(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(char::is_whitespace)
        && !name.contains(['{', '}', '"', '\''])
        && name.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Returns true if the string looks like a registry package name
pub fn is_package_name(name: &str) -> bool {
    PACKAGE_NAME_RE.is_match(name)
}
