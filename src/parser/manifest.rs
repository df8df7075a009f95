//! Structured dependency map extraction (package.json style)
//!
//! Two paths:
//! - Strict: the input (or the outermost `{...}` inside it) parses as JSON
//! - Best-effort: a line scan that tracks `"dependencies"` / `"devDependencies"`
//!   sections by brace depth and collects the quoted pairs inside them
//!
//! Both paths hand back the text they did not consume so the line grammars
//! can still run over it.

use super::version::clean_version;
use crate::domain::PackageReference;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Manifest keys whose entries are package references, in extraction order
const DEPENDENCY_KEYS: [&str; 2] = ["dependencies", "devDependencies"];

// "name": "version" or 'name': 'version', possibly several per line
pub(super) static QUOTED_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']([^"']+)["']\s*:\s*["']([^"']*)["']"#).unwrap()
});

// Section header: "dependencies": or "devDependencies":
static SECTION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["'](?:dependencies|devDependencies)["']\s*:"#).unwrap()
});

/// Result of trying the strict JSON path
#[derive(Debug, PartialEq)]
pub(super) enum JsonParse<'a> {
    /// The whole input is a JSON object; empty when it has no dependency sections
    Document(Vec<PackageReference>),
    /// A JSON object sits between two stretches of other text
    Embedded {
        before: &'a str,
        references: Vec<PackageReference>,
        after: &'a str,
    },
    /// No JSON object found
    NotJson,
}

/// Try to read the input as, or as containing, a JSON manifest
pub(super) fn parse_json(input: &str) -> JsonParse<'_> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(input) {
        return JsonParse::Document(dependency_references(&object));
    }

    // Outermost brace-delimited slice
    let (Some(start), Some(end)) = (input.find('{'), input.rfind('}')) else {
        return JsonParse::NotJson;
    };
    if end <= start || (start == 0 && end == input.len() - 1) {
        return JsonParse::NotJson;
    }

    match serde_json::from_str::<Value>(&input[start..=end]) {
        Ok(Value::Object(object)) => JsonParse::Embedded {
            before: &input[..start],
            references: dependency_references(&object),
            after: &input[end + 1..],
        },
        _ => JsonParse::NotJson,
    }
}

/// Entries of the dependency sections of a manifest object, in extraction order
fn dependency_references(object: &Map<String, Value>) -> Vec<PackageReference> {
    let mut references = Vec::new();
    for key in DEPENDENCY_KEYS {
        let Some(Value::Object(section)) = object.get(key) else {
            continue;
        };
        for (name, version) in section {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let version = match version {
                Value::String(s) => clean_version(s),
                _ => clean_version(""),
            };
            references.push(PackageReference::new(name, version));
        }
    }

    references
}

/// Returns true if the text names a dependency section anywhere
pub(super) fn mentions_dependency_sections(input: &str) -> bool {
    SECTION_HEADER_RE.is_match(input)
}

/// One input line as seen by the section scan
#[derive(Debug, PartialEq)]
pub(super) enum ScannedLine<'a> {
    /// The line opens, continues or closes a dependency section
    Section(Vec<PackageReference>),
    /// The line lies outside every dependency section
    Outside(&'a str),
}

/// Best-effort scan of dependency sections in malformed JSON
///
/// Never fails; nested objects inside a section are walked through and any
/// quoted pair found in them is collected as well. Lines are returned in
/// input order.
pub(super) fn scan_dependency_sections(input: &str) -> Vec<ScannedLine<'_>> {
    let mut lines = Vec::new();
    let mut in_section = false;
    let mut opened = false;
    let mut depth: i64 = 0;

    for line in input.lines() {
        let mut body = line;

        if let Some(header) = SECTION_HEADER_RE.find(line) {
            in_section = true;
            opened = false;
            depth = 0;
            body = &line[header.end()..];
        }

        if !in_section {
            lines.push(ScannedLine::Outside(line));
            continue;
        }

        // Only the part of the line up to the section's closing brace counts
        let mut end = body.len();
        for (i, c) in body.char_indices() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
            if opened && depth <= 0 {
                end = i + c.len_utf8();
                in_section = false;
                break;
            }
        }

        let references = QUOTED_PAIR_RE
            .captures_iter(&body[..end])
            .filter_map(|caps| {
                let name = caps[1].trim();
                if name.is_empty() || DEPENDENCY_KEYS.contains(&name) {
                    return None;
                }
                Some(PackageReference::new(name, clean_version(&caps[2])))
            })
            .collect();
        lines.push(ScannedLine::Section(references));
    }

    lines
}
