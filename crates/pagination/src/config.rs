use crate::PaginationError;
use serde::{Deserialize, Serialize};

/// Knobs of the page break decision engine.
///
/// Selector fields take comma separated selector lists (`"h1, .chapter > h2"`).
/// An empty string disables the constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    /// Height of the printable page body, in pixels.
    pub reference_height: f32,
    /// Width of the printable page body, in pixels.
    pub reference_width: f32,

    pub no_hanging_selectors: String,
    pub no_break_selectors: String,
    pub page_break_before_selectors: String,
    pub page_break_after_selectors: String,
    /// Forced break marker elements are always matched in addition to these.
    pub forced_page_break_selectors: String,
    /// Matches are removed from the tree before scanning.
    pub garbage_selectors: String,

    pub min_left_lines: usize,
    pub min_dangling_lines: usize,
    pub min_left_rows: usize,
    pub min_dangling_rows: usize,
    pub min_breakable_rows: usize,
    pub min_pre_first_block_lines: usize,
    pub min_pre_last_block_lines: usize,
    pub min_breakable_grid_rows: usize,

    /// Smallest accepted scale factor when shrinking media to fit the page remainder.
    pub image_reduction_ratio: f32,
    /// Subpixel slack when deciding whether the next inline item starts a new line.
    pub vertical_drop_tolerance: f32,
    /// Line height forced on a container while probing where its lines start.
    pub new_line_probe_line_height: String,

    /// Fail on internal invariant violations instead of logging them.
    pub strict_assertions: bool,
    /// Zero the collapsing margins at every page edge once pages are known.
    pub reset_page_edge_margins: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            reference_height: 1000.0,
            reference_width: 700.0,
            no_hanging_selectors: String::new(),
            no_break_selectors: String::new(),
            page_break_before_selectors: String::new(),
            page_break_after_selectors: String::new(),
            forced_page_break_selectors: String::new(),
            garbage_selectors: String::new(),
            min_left_lines: 2,
            min_dangling_lines: 2,
            min_left_rows: 1,
            min_dangling_rows: 1,
            min_breakable_rows: 1,
            min_pre_first_block_lines: 3,
            min_pre_last_block_lines: 3,
            min_breakable_grid_rows: 4,
            image_reduction_ratio: 0.8,
            vertical_drop_tolerance: 2.0,
            new_line_probe_line_height: "2".to_string(),
            strict_assertions: false,
            reset_page_edge_margins: true,
        }
    }
}

/// Orphan/widow policy of a line splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePolicy {
    pub min_left: usize,
    pub min_dangling: usize,
}

impl LinePolicy {
    /// Fewer lines than this and the block is not broken at all.
    pub fn min_breakable(&self) -> usize {
        (self.min_left + self.min_dangling).max(2)
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), PaginationError> {
        if !(self.reference_height > 0.0) {
            return Err(invalid(format!(
                "referenceHeight must be positive, got {}",
                self.reference_height
            )));
        }
        if !(self.reference_width > 0.0) {
            return Err(invalid(format!(
                "referenceWidth must be positive, got {}",
                self.reference_width
            )));
        }
        if !(self.image_reduction_ratio > 0.0 && self.image_reduction_ratio <= 1.0) {
            return Err(invalid(format!(
                "imageReductionRatio must be in (0, 1], got {}",
                self.image_reduction_ratio
            )));
        }
        if self.vertical_drop_tolerance < 0.0 {
            return Err(invalid("verticalDropTolerance must not be negative".into()));
        }
        let counts = [
            ("minLeftLines", self.min_left_lines),
            ("minDanglingLines", self.min_dangling_lines),
            ("minLeftRows", self.min_left_rows),
            ("minDanglingRows", self.min_dangling_rows),
            ("minBreakableRows", self.min_breakable_rows),
            ("minPreFirstBlockLines", self.min_pre_first_block_lines),
            ("minPreLastBlockLines", self.min_pre_last_block_lines),
            ("minBreakableGridRows", self.min_breakable_grid_rows),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(format!("{name} must be at least 1")));
        }
        Ok(())
    }

    pub fn paragraph_policy(&self) -> LinePolicy {
        LinePolicy {
            min_left: self.min_left_lines,
            min_dangling: self.min_dangling_lines,
        }
    }

    pub fn pre_policy(&self) -> LinePolicy {
        LinePolicy {
            min_left: self.min_pre_first_block_lines,
            min_dangling: self.min_pre_last_block_lines,
        }
    }

    /// Minimum number of lines a block needs before splitting it is worth trying.
    pub fn min_breakable_lines(&self) -> usize {
        self.min_left_lines + self.min_dangling_lines
    }
}

fn invalid(message: String) -> PaginationError {
    PaginationError::InvalidConfig(message)
}
