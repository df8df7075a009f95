//! Input parser: free-form text → ordered package references
//!
//! Accepted input shapes:
//! - A package.json-style document (or one embedded in surrounding text)
//! - A malformed manifest with recognizable dependency sections
//! - One reference per line: `name@version`, `@scope/name@version`, `name`,
//!   or a quoted `"name": "version"` pair
//!
//! Parsing never fails. Text around an embedded manifest or outside a
//! dependency section still goes through the line grammars. Lines that match
//! no grammar are skipped, and duplicates are kept in input order.

mod manifest;
mod token;
mod version;

pub use token::{is_package_name, parse_line, LineGrammar};
pub use version::clean_version;

use crate::domain::PackageReference;
use manifest::{JsonParse, ScannedLine};
use tracing::{debug, trace};

/// Parse raw input into package references
pub fn parse(raw: &str) -> Vec<PackageReference> {
    let input = raw.trim();
    if input.is_empty() {
        return Vec::new();
    }

    match manifest::parse_json(input) {
        JsonParse::Document(references) => {
            debug!(count = references.len(), "parsed JSON manifest");
            references
        }
        JsonParse::Embedded {
            before,
            references,
            after,
        } => {
            debug!(count = references.len(), "parsed JSON manifest embedded in text");
            let mut all = parse_text(before);
            all.extend(references);
            all.extend(parse_text(after));
            all
        }
        JsonParse::NotJson => parse_text(input),
    }
}

/// Parse text that is not a JSON object, scanning any dependency sections it names
fn parse_text(input: &str) -> Vec<PackageReference> {
    if !manifest::mentions_dependency_sections(input) {
        return parse_lines(input);
    }

    let mut references = Vec::new();
    for line in manifest::scan_dependency_sections(input) {
        match line {
            ScannedLine::Section(found) => references.extend(found),
            // Quoted pairs outside a dependency section are other manifest fields
            ScannedLine::Outside(text) => match match_line(text) {
                Some((LineGrammar::QuotedPair, _)) | None => {}
                Some((_, reference)) => references.push(reference),
            },
        }
    }
    debug!(
        count = references.len(),
        "scanned text for dependency sections"
    );
    references
}

/// Apply the per-line grammars to every line independently
pub fn parse_lines(input: &str) -> Vec<PackageReference> {
    input
        .lines()
        .filter_map(|line| match_line(line).map(|(_, reference)| reference))
        .collect()
}

fn match_line(line: &str) -> Option<(LineGrammar, PackageReference)> {
    let matched = parse_line(line);
    match &matched {
        Some((grammar, reference)) => trace!(?grammar, %reference, "matched line"),
        None if !line.trim().is_empty() => trace!(line, "skipped line matching no grammar"),
        None => {}
    }
    matched
}
