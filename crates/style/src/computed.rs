//! The subset of computed style the paginator reads from its host.

use crate::parsers::{self, StyleParseError};
use serde::{Deserialize, Serialize};

/// Font size used to resolve unitless line heights when nothing is inherited.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    InlineFlex,
    InlineGrid,
    InlineTable,
    Flex,
    Grid,
    Table,
    TableRow,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableCell,
    TableCaption,
    ListItem,
    FlowRoot,
    Contents,
    None,
}

impl Display {
    /// Any `inline*` display value. Such boxes share line boxes with their siblings.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            Display::Inline
                | Display::InlineBlock
                | Display::InlineFlex
                | Display::InlineGrid
                | Display::InlineTable
        )
    }

    pub fn is_row_group(self) -> bool {
        matches!(
            self,
            Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GridAutoFlow {
    #[default]
    Row,
    Column,
    RowDense,
    ColumnDense,
}

impl GridAutoFlow {
    pub fn is_row(self) -> bool {
        matches!(self, GridAutoFlow::Row | GridAutoFlow::RowDense)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    pub fn is_preformatted(self) -> bool {
        matches!(self, WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::PreLine)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum LineHeight {
    Normal,
    Px(f32),
    Number(f32),
}

impl LineHeight {
    /// Resolves to pixels against the given font size.
    pub fn resolve(self, font_size: f32) -> f32 {
        match self {
            LineHeight::Normal => font_size * 1.2,
            LineHeight::Px(px) => px,
            LineHeight::Number(factor) => font_size * factor,
        }
    }
}

/// Computed style as seen by the paginator.
///
/// Inheritable values (`line_height`, `font_size`) are `None` when the element
/// does not set them itself; hosts resolve them through the ancestor chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedStyle {
    pub display: Display,
    pub position: Position,
    pub visibility: Visibility,
    pub float: Float,
    pub flex_direction: FlexDirection,
    pub grid_auto_flow: GridAutoFlow,
    pub white_space: WhiteSpace,
    pub line_height: Option<LineHeight>,
    pub font_size: Option<f32>,
    pub height: Option<f32>,
    pub width: Option<f32>,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl ComputedStyle {
    pub fn with_display(display: Display) -> Self {
        Self {
            display,
            ..Default::default()
        }
    }

    pub fn is_floated(&self) -> bool {
        self.float != Float::None
    }

    pub fn is_flex_row(&self) -> bool {
        matches!(self.display, Display::Flex | Display::InlineFlex) && self.flex_direction.is_row()
    }

    pub fn is_grid_auto_flow_row(&self) -> bool {
        matches!(self.display, Display::Grid | Display::InlineGrid) && self.grid_auto_flow.is_row()
    }

    /// Applies a single `property: value` declaration.
    ///
    /// Properties the paginator never reads (colours, transforms, ...) are
    /// accepted and ignored so that hosts can pass their inline style through.
    pub fn apply_declaration(&mut self, property: &str, value: &str) -> Result<(), StyleParseError> {
        let value = value.trim().trim_end_matches("!important").trim();
        match property.trim().to_ascii_lowercase().as_str() {
            "display" => self.display = parsers::parse_display(value)?,
            "position" => self.position = parsers::parse_keyword(property, value)?,
            "visibility" => self.visibility = parsers::parse_keyword(property, value)?,
            "float" => self.float = parsers::parse_keyword(property, value)?,
            "flex-direction" => self.flex_direction = parsers::parse_keyword(property, value)?,
            "grid-auto-flow" => self.grid_auto_flow = parsers::parse_grid_auto_flow(value)?,
            "white-space" => self.white_space = parsers::parse_keyword(property, value)?,
            "line-height" => self.line_height = Some(parsers::parse_line_height(value)?),
            "font-size" => self.font_size = Some(parsers::parse_px(property, value)?),
            "height" => self.height = parsers::parse_optional_px(property, value)?,
            "width" => self.width = parsers::parse_optional_px(property, value)?,
            "margin-top" => self.margin_top = parsers::parse_px(property, value)?,
            "margin-bottom" => self.margin_bottom = parsers::parse_px(property, value)?,
            _ => {}
        }
        Ok(())
    }

    /// Applies every declaration of an inline style string (`"a: b; c: d"`).
    pub fn apply_declarations(&mut self, declarations: &str) -> Result<(), StyleParseError> {
        for (property, value) in parsers::parse_declarations(declarations)? {
            self.apply_declaration(&property, &value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_family_is_detected() {
        assert!(Display::InlineBlock.is_inline());
        assert!(Display::Inline.is_inline());
        assert!(!Display::Block.is_inline());
        assert!(!Display::Contents.is_inline());
    }

    #[test]
    fn declarations_update_typed_fields() {
        let mut style = ComputedStyle::default();
        style
            .apply_declarations("display: inline-block; position:absolute; height: 24px; color: red")
            .unwrap();
        assert_eq!(style.display, Display::InlineBlock);
        assert_eq!(style.position, Position::Absolute);
        assert_eq!(style.height, Some(24.0));
    }

    #[test]
    fn important_suffix_is_ignored() {
        let mut style = ComputedStyle::default();
        style.apply_declaration("margin-top", "0 !important").unwrap();
        assert_eq!(style.margin_top, 0.0);
    }

    #[test]
    fn unitless_line_height_scales_with_font() {
        assert_eq!(LineHeight::Number(2.0).resolve(DEFAULT_FONT_SIZE), 32.0);
        assert_eq!(LineHeight::Px(18.0).resolve(DEFAULT_FONT_SIZE), 18.0);
    }

    #[test]
    fn flex_and_grid_shapes() {
        let mut flex = ComputedStyle::with_display(Display::Flex);
        assert!(flex.is_flex_row());
        flex.flex_direction = FlexDirection::Column;
        assert!(!flex.is_flex_row());
        assert!(ComputedStyle::with_display(Display::Grid).is_grid_auto_flow_row());
    }
}
