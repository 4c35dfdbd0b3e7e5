//! User-agent defaults for the tags the reference host knows about.

use pagecut_style::{ComputedStyle, Display, WhiteSpace};

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "canvas", "code", "em", "embed", "i", "iframe", "img", "kbd",
    "label", "mark", "object", "q", "s", "samp", "small", "span", "strong", "sub", "sup",
    "svg", "tt", "u", "var", "video",
];

const HIDDEN_TAGS: &[&str] = &[
    "head", "link", "meta", "noscript", "script", "source", "style", "template", "title",
];

/// Computed style an element starts with before its inline style is applied.
pub fn style_for_tag(tag: &str) -> ComputedStyle {
    let tag = tag.to_ascii_lowercase();
    let display = match tag.as_str() {
        "table" => Display::Table,
        "tr" => Display::TableRow,
        "thead" => Display::TableHeaderGroup,
        "tbody" => Display::TableRowGroup,
        "tfoot" => Display::TableFooterGroup,
        "td" | "th" => Display::TableCell,
        "caption" => Display::TableCaption,
        "li" => Display::ListItem,
        t if INLINE_TAGS.contains(&t) => Display::Inline,
        t if HIDDEN_TAGS.contains(&t) => Display::None,
        _ => Display::Block,
    };

    let mut style = ComputedStyle::with_display(display);
    if tag == "pre" {
        style.white_space = WhiteSpace::Pre;
    }
    style
}

/// Elements whose content is an opaque box (images, embedded objects).
pub fn is_replaced_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "img" | "svg" | "object" | "embed" | "video" | "canvas" | "iframe"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_family_gets_table_displays() {
        assert_eq!(style_for_tag("TABLE").display, Display::Table);
        assert_eq!(style_for_tag("tr").display, Display::TableRow);
        assert_eq!(style_for_tag("tbody").display, Display::TableRowGroup);
    }

    #[test]
    fn pre_keeps_white_space() {
        assert!(style_for_tag("pre").white_space.is_preformatted());
        assert_eq!(style_for_tag("script").display, Display::None);
        assert_eq!(style_for_tag("custom-element").display, Display::Block);
    }
}
