//! Layout planner: tile copies of a fixed-size photo onto a print sheet,
//! maximizing photo count under a minimum cutting-spacing constraint.

use serde::Serialize;

use crate::error::PassfotoError;
use crate::profile::{mm_to_px, DocumentRatioProfile};

/// Minimum space between photos (and around the sheet) for cutting, in mm.
pub const MIN_SPACING_MM: f64 = 2.0;

/// Paper and photo dimensions for one print job.
#[derive(Debug, Clone, Serialize)]
pub struct PrintFormatSpec {
    /// Paper width in pixels.
    pub paper_width_px: u32,
    /// Paper height in pixels.
    pub paper_height_px: u32,
    /// Photo width in pixels.
    pub photo_width_px: u32,
    /// Photo height in pixels.
    pub photo_height_px: u32,
    /// Minimum cutting spacing between photos and at the sheet edges.
    pub min_spacing_px: u32,
    /// Cap on the number of photos placed; `None` fills the sheet.
    pub requested_count: Option<u32>,
}

impl PrintFormatSpec {
    /// Build a format spec from paper dimensions in millimeters and a
    /// document profile, at the standard print resolution.
    pub fn from_paper_mm(
        paper_width_mm: u32,
        paper_height_mm: u32,
        profile: &DocumentRatioProfile,
    ) -> Self {
        Self {
            paper_width_px: mm_to_px(paper_width_mm as f64),
            paper_height_px: mm_to_px(paper_height_mm as f64),
            photo_width_px: profile.photo_width_px,
            photo_height_px: profile.photo_height_px,
            min_spacing_px: mm_to_px(MIN_SPACING_MM),
            requested_count: None,
        }
    }
}

/// Predefined paper sizes, as (code, width mm, height mm).
///
/// Photo paper is fed landscape, so 10x15 cm is 150x100 mm here.
pub const PAPER_PRESETS: &[(&str, u32, u32)] = &[("10x15", 150, 100), ("13x18", 180, 130)];

/// Look up a predefined paper size by code.
pub fn paper_preset(code: &str) -> Result<(u32, u32), PassfotoError> {
    PAPER_PRESETS
        .iter()
        .find(|(key, _, _)| *key == code)
        .map(|&(_, w, h)| (w, h))
        .ok_or_else(|| PassfotoError::UnknownFormat(code.to_string()))
}

/// Grid plan describing how photos are tiled onto the sheet.
///
/// Paper dimensions are post-swap: when `orientation_swapped` is true the
/// planner chose the rotated paper, and `paper_width_px`/`paper_height_px`
/// already reflect that.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutPlan {
    /// Number of photo columns.
    pub columns: u32,
    /// Number of photo rows.
    pub rows: u32,
    /// `columns · rows`, capped by the requested count.
    pub placed_count: u32,
    /// X coordinate of the first cell's top-left corner.
    pub origin_x: u32,
    /// Y coordinate of the first cell's top-left corner.
    pub origin_y: u32,
    /// Horizontal gap between adjacent cells.
    pub spacing_x: u32,
    /// Vertical gap between adjacent cells.
    pub spacing_y: u32,
    /// The rotated paper orientation fit more photos.
    pub orientation_swapped: bool,
    /// Paper width in pixels, post-swap.
    pub paper_width_px: u32,
    /// Paper height in pixels, post-swap.
    pub paper_height_px: u32,
    /// Photo width in pixels.
    pub photo_width_px: u32,
    /// Photo height in pixels.
    pub photo_height_px: u32,
}

impl LayoutPlan {
    /// Top-left corners of the placed cells, row-major, capped at
    /// `placed_count`.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.placed_count).map(|i| {
            let col = i % self.columns;
            let row = i / self.columns;
            (
                self.origin_x + col * (self.photo_width_px + self.spacing_x),
                self.origin_y + row * (self.photo_height_px + self.spacing_y),
            )
        })
    }

    /// Whether a cell at `(x, y)` lies entirely within the paper.
    ///
    /// This is the no-crop invariant the compositor enforces: a photo is
    /// placed whole or not at all, never clipped.
    pub fn cell_in_bounds(&self, x: u32, y: u32) -> bool {
        x + self.photo_width_px <= self.paper_width_px
            && y + self.photo_height_px <= self.paper_height_px
    }
}

/// Columns and rows that fit one paper orientation with minimum margins and
/// spacing, or `None` if not even one photo fits.
fn grid_for_orientation(
    paper_w: u32,
    paper_h: u32,
    photo_w: u32,
    photo_h: u32,
    spacing: u32,
) -> Option<(u32, u32)> {
    // (paper - 2*margin) >= n*photo + (n-1)*spacing, with margin = spacing,
    // rearranged to n <= (paper - 2*margin + spacing) / (photo + spacing).
    let cols = (paper_w as i64 - spacing as i64) / (photo_w + spacing) as i64;
    let rows = (paper_h as i64 - spacing as i64) / (photo_h + spacing) as i64;
    if cols >= 1 && rows >= 1 {
        Some((cols as u32, rows as u32))
    } else {
        None
    }
}

/// Distribute leftover space along one axis: keep interior spacing at the
/// minimum and center the block, or widen every gap evenly when the outer
/// margins would otherwise fall below the minimum.
fn distribute_axis(paper: u32, photo: u32, count: u32, min_spacing: u32) -> (u32, u32) {
    let remaining = paper - count * photo;
    if count > 1 {
        // Centered margins can come out negative for a degenerate axis, so
        // the comparison runs signed before narrowing back.
        let margin = (remaining as i64 - (count as i64 - 1) * min_spacing as i64) / 2;
        if margin < min_spacing as i64 {
            let spacing = remaining / count;
            (spacing / 2, spacing)
        } else {
            (margin as u32, min_spacing)
        }
    } else {
        (remaining / 2, 0)
    }
}

/// Plan the grid that fits the most photos, trying both paper orientations.
///
/// Ties keep the original orientation. Fails with
/// [`PassfotoError::InvalidPrintFormat`] when neither orientation hosts one
/// photo plus two minimum margins.
pub fn plan(format: &PrintFormatSpec) -> Result<LayoutPlan, PassfotoError> {
    let spacing = format.min_spacing_px;
    let (photo_w, photo_h) = (format.photo_width_px, format.photo_height_px);

    let original = grid_for_orientation(
        format.paper_width_px,
        format.paper_height_px,
        photo_w,
        photo_h,
        spacing,
    );
    let swapped = grid_for_orientation(
        format.paper_height_px,
        format.paper_width_px,
        photo_w,
        photo_h,
        spacing,
    );

    let (cols, rows, orientation_swapped) = match (original, swapped) {
        (None, None) => return Err(PassfotoError::InvalidPrintFormat),
        (Some((c, r)), None) => (c, r, false),
        (None, Some((c, r))) => (c, r, true),
        (Some((c1, r1)), Some((c2, r2))) => {
            if c2 * r2 > c1 * r1 {
                (c2, r2, true)
            } else {
                (c1, r1, false)
            }
        }
    };

    let (paper_w, paper_h) = if orientation_swapped {
        (format.paper_height_px, format.paper_width_px)
    } else {
        (format.paper_width_px, format.paper_height_px)
    };

    let (origin_x, spacing_x) = distribute_axis(paper_w, photo_w, cols, spacing);
    let (origin_y, spacing_y) = distribute_axis(paper_h, photo_h, rows, spacing);

    let total = cols * rows;
    let placed_count = match format.requested_count {
        Some(cap) => total.min(cap),
        None => total,
    };

    log::debug!(
        "layout: {cols}x{rows} on {paper_w}x{paper_h}{} origin ({origin_x},{origin_y}) spacing ({spacing_x},{spacing_y})",
        if orientation_swapped { " (rotated)" } else { "" },
    );

    Ok(LayoutPlan {
        columns: cols,
        rows,
        placed_count,
        origin_x,
        origin_y,
        spacing_x,
        spacing_y,
        orientation_swapped,
        paper_width_px: paper_w,
        paper_height_px: paper_h,
        photo_width_px: photo_w,
        photo_height_px: photo_h,
    })
}
