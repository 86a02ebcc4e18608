//! Context extraction (§4.4): harvests file-path references and
//! back-tick-quoted identifiers from a message body so the compact prompt
//! can ask the summarizer to preserve them explicitly.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static FILE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b
        [\w./-]+
        \.
        (?:rs|ts|tsx|js|jsx|mjs|py|go|java|kt|rb|php|c|cc|cpp|h|hpp|cs|swift|
           md|mdx|json|ya?ml|toml|css|scss|html|sh|sql)
        \b
        ",
    )
    .expect("static regex is valid")
});

#[allow(clippy::expect_used)]
static BACKTICK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("static regex is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContext {
    pub file_paths: Vec<String>,
    pub identifiers: Vec<String>,
}

/// Order-preserving, deduplicated harvest of file paths and inline-code
/// spans from `content`. A backtick span that is itself a file path is
/// reported only as a file path.
pub fn extract_context(content: &str) -> ExtractedContext {
    let mut seen_paths = HashSet::new();
    let file_paths: Vec<String> = FILE_PATH_RE
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .filter(|path| seen_paths.insert(path.clone()))
        .collect();

    let mut seen_idents = HashSet::new();
    let identifiers: Vec<String> = BACKTICK_RE
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .filter(|ident| !seen_paths.contains(ident))
        .filter(|ident| seen_idents.insert(ident.clone()))
        .collect();

    ExtractedContext {
        file_paths,
        identifiers,
    }
}

#[cfg(test)]
#[path = "extraction.test.rs"]
mod tests;
