//! Pre-defined page sizes for common paper formats.
//!
//! All sizes are in portrait orientation (width ≤ height); pass
//! [Orientation::Landscape](crate::document::Orientation) when starting a
//! page grouping to turn one sideways.
//!
//! ```
//! use pdf_flow::pagesize;
//!
//! let doc = pdf_flow::Document::new(pagesize::LETTER);
//! ```

use crate::geom::Dim;
use crate::units::Pt;

const fn size(width: f32, height: f32) -> Dim {
    Dim {
        width: Pt(width),
        height: Pt(height),
    }
}

// north american sizes
pub const LETTER: Dim = size(8.5 * 72.0, 11.0 * 72.0);
pub const HALF_LETTER: Dim = size(5.5 * 72.0, 8.5 * 72.0);
pub const JUNIOR_LEGAL: Dim = size(5.0 * 72.0, 8.0 * 72.0);
pub const LEGAL: Dim = size(8.5 * 72.0, 13.0 * 72.0);
pub const TABLOID: Dim = size(11.0 * 72.0, 17.0 * 72.0);

// iso a-series (converted from mm)
pub const A0: Dim = size(841.0 * 72.0 / 25.4, 1189.0 * 72.0 / 25.4);
pub const A1: Dim = size(594.0 * 72.0 / 25.4, 841.0 * 72.0 / 25.4);
pub const A2: Dim = size(420.0 * 72.0 / 25.4, 594.0 * 72.0 / 25.4);
pub const A3: Dim = size(297.0 * 72.0 / 25.4, 420.0 * 72.0 / 25.4);
pub const A4: Dim = size(210.0 * 72.0 / 25.4, 297.0 * 72.0 / 25.4);
pub const A5: Dim = size(148.0 * 72.0 / 25.4, 210.0 * 72.0 / 25.4);
pub const A6: Dim = size(105.0 * 72.0 / 25.4, 148.0 * 72.0 / 25.4);
