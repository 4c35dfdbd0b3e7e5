/// Service elements the paginator inserts into the host tree.
///
/// They are plain elements with reserved tag names, so they survive in the
/// output tree and downstream consumers can recognise them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticTag {
    FlowStart,
    FlowEnd,
    ComplexTextBlock,
    TextNode,
    TextLine,
    TextGroup,
    Word,
    Neutral,
    ForcedPageBreak,
}

impl SyntheticTag {
    pub const ALL: [SyntheticTag; 9] = [
        SyntheticTag::FlowStart,
        SyntheticTag::FlowEnd,
        SyntheticTag::ComplexTextBlock,
        SyntheticTag::TextNode,
        SyntheticTag::TextLine,
        SyntheticTag::TextGroup,
        SyntheticTag::Word,
        SyntheticTag::Neutral,
        SyntheticTag::ForcedPageBreak,
    ];

    pub fn as_tag(&self) -> &'static str {
        match self {
            SyntheticTag::FlowStart => "pagecut-flow-start",
            SyntheticTag::FlowEnd => "pagecut-flow-end",
            SyntheticTag::ComplexTextBlock => "pagecut-complex-text-block",
            SyntheticTag::TextNode => "pagecut-text-node",
            SyntheticTag::TextLine => "pagecut-text-line",
            SyntheticTag::TextGroup => "pagecut-text-group",
            SyntheticTag::Word => "pagecut-word",
            SyntheticTag::Neutral => "pagecut-neutral",
            SyntheticTag::ForcedPageBreak => "pagecut-forced-page-break",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_tag().eq_ignore_ascii_case(tag))
    }

    /// The `display` value the element is created with.
    pub fn default_display(&self) -> &'static str {
        match self {
            SyntheticTag::TextNode
            | SyntheticTag::TextLine
            | SyntheticTag::Word
            | SyntheticTag::Neutral => "inline",
            SyntheticTag::FlowStart
            | SyntheticTag::FlowEnd
            | SyntheticTag::ComplexTextBlock
            | SyntheticTag::TextGroup
            | SyntheticTag::ForcedPageBreak => "block",
        }
    }
}
