//! Delimited-region scanning for `<tag>...</tag>` sections.
//!
//! This is not an XML parser: there is no nesting, no attributes and no
//! entity decoding. Only the exact delimiters of the requested tag are
//! significant, matched case-insensitively, and a region ends at the first
//! closing delimiter after its opening one.

use crate::{Result, TagName};
use regex::Regex;

/// Separator placed between the contents of repeated regions.
pub const JOIN_SEPARATOR: &str = "\n\n";

/// Pre-compiled scanners for a fixed, ordered set of tags.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    patterns: Vec<(TagName, Regex)>,
}

impl TagExtractor {
    pub fn new(tags: &[TagName]) -> Result<Self> {
        let patterns = tags
            .iter()
            .map(|tag| Ok((tag.clone(), tag_pattern(tag)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Configured tags, in configuration order.
    pub fn tags(&self) -> impl Iterator<Item = &TagName> {
        self.patterns.iter().map(|(tag, _)| tag)
    }

    /// Extract the content of every `tag` region in `text`.
    ///
    /// Each region's content is trimmed; several regions are joined by a
    /// blank line in document order. Returns `None` when the tag does not
    /// occur, and also for tags this extractor was not built with; use
    /// [`extract`] for an arbitrary tag.
    #[must_use]
    pub fn extract(&self, text: &str, tag: &str) -> Option<String> {
        self.patterns
            .iter()
            .find(|(name, _)| name.as_str() == tag)
            .and_then(|(_, pattern)| scan(pattern, text))
    }

    /// Run every configured tag over `text`, keeping configuration order.
    pub fn extract_all<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (&'a TagName, Option<String>)> + 'a {
        self.patterns
            .iter()
            .map(move |(tag, pattern)| (tag, scan(pattern, text)))
    }

    /// Remove every complete configured region from `text`.
    ///
    /// Unterminated opening delimiters are left in place.
    #[must_use]
    pub fn strip(&self, text: &str) -> String {
        let stripped = self
            .patterns
            .iter()
            .fold(text.to_string(), |acc, (_, pattern)| {
                pattern.replace_all(&acc, "").into_owned()
            });
        stripped.trim().to_string()
    }
}

/// Extract `tag` from `text` without a pre-built [`TagExtractor`].
///
/// Same matching rules as [`TagExtractor::extract`]. Fails only if the tag's
/// pattern cannot be compiled.
pub fn extract(text: &str, tag: &TagName) -> Result<Option<String>> {
    Ok(scan(&tag_pattern(tag)?, text))
}

fn tag_pattern(tag: &TagName) -> Result<Regex> {
    let name = regex::escape(tag.as_str());
    Ok(Regex::new(&format!(r"(?is)<{name}>(.*?)</{name}>"))?)
}

fn scan(pattern: &Regex, text: &str) -> Option<String> {
    let matches: Vec<&str> = pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect();

    if matches.is_empty() {
        None
    } else {
        Some(matches.join(JOIN_SEPARATOR))
    }
}
