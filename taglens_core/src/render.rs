//! Template substitution for command output.

use crate::{GroupState, TagName};

/// Placeholder for the configured character name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Text substituted for a tag with no stored content.
#[must_use]
pub fn fallback_marker(tag: &TagName) -> String {
    format!("（无{tag}内容）")
}

/// Render `format` against one group's stored values.
///
/// Only the first `{name}` is replaced with `display_name`, while every
/// occurrence of each `{tag}` is replaced. Placeholders that are neither
/// `{name}` nor a configured tag stay verbatim.
#[must_use]
pub fn render(format: &str, display_name: &str, tags: &[TagName], state: &GroupState) -> String {
    let mut rendered = format.replacen(NAME_PLACEHOLDER, display_name, 1);

    for tag in tags {
        let placeholder = tag.placeholder();
        if !rendered.contains(&placeholder) {
            continue;
        }
        let content = state
            .get(tag.as_str())
            .filter(|c| !c.is_empty())
            .map_or_else(|| fallback_marker(tag), str::to_string);
        rendered = rendered.replace(&placeholder, &content);
    }

    rendered
}
