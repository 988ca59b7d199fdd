//! A mid-level, opinionated layout engine that flows styled text, images,
//! and tables across PDF pages.
//!
//! Wrap [Content] into [Line]s with [wrap_lines], start a
//! [PageGrouping](crate::page_grouping::PageGrouping) on a [Document], and
//! render the lines down the page: the grouping grows new pages as content
//! runs past the bottom of the body. See [Document] for a full example.

mod cell;
pub use cell::*;

mod colour;
pub use colour::*;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod geom;
pub use geom::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

mod page;
pub use page::*;

mod page_grouping;
pub use page_grouping::*;

/// Pre-defined page sizes for common paper formats
pub mod pagesize;

pub(crate) mod refs;

mod style;
pub use style::*;

mod table;
pub use table::*;

mod text;
pub use text::*;

mod units;
pub use units::*;

mod wrap;
pub use wrap::*;

#[cfg(test)]
pub(crate) mod test_util;

/// Re-export pdf-writer, mostly for downstream code that pokes at the output
pub use pdf_writer;
