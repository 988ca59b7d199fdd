use crate::error::LayoutError;
use crate::font::Font;
use crate::geom::{Coord, Dim, PageArea};
use crate::image::Image;
use crate::info::Info;
use crate::page::SinglePage;
use crate::page_grouping::PageGrouping;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use pdf_writer::{Pdf, Ref};
use std::io::Write;
use std::rc::Rc;

/// The space between the edge of the page and the default body area, applied
/// on all four sides when [Document::start_page_grouping] is given no body.
pub const DEFAULT_MARGIN: Pt = Pt(37.0);

/// Which way a page grouping's pages are turned. The document's page
/// dimensions are given in portrait; landscape swaps them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// The main object that accumulates pages of content and then renders them
/// out with a call to [Document::write].
///
/// Content goes on pages through [page groupings](PageGrouping): start one,
/// draw or flow content into it (it grows new pages as content runs past the
/// bottom of the body), then commit it. Repeat for each logical section.
///
/// ```no_run
/// use pdf_flow::*;
///
/// # fn main() -> Result<(), LayoutError> {
/// let mut doc = Document::new(pagesize::LETTER);
/// let font = doc.add_font(Font::load(std::fs::read("fonts/DejaVuSans.ttf")?)?);
/// let style = TextStyle::new(font, Pt(12.0), colours::BLACK);
///
/// let mut section = doc.start_page_grouping(Orientation::Portrait, None)?;
/// let start = section.body_top_left();
/// let lines = wrap_lines(&[Text::new(style, "Hello there, world!").into()], Pt(200.0))?;
/// let mut top_left = start;
/// for line in &lines {
///     let rendered = line.render(&mut section, top_left, true);
///     top_left = top_left.minus_y(rendered.dim.height);
/// }
/// section.commit();
///
/// doc.write(std::fs::File::create("hello.pdf")?)?;
/// # Ok(())
/// # }
/// ```
pub struct Document {
    page_dim: Dim,
    pub info: Info,
    fonts: Vec<Rc<Font>>,
    pages: Vec<SinglePage>,
}

impl Document {
    /// Creates an empty document whose pages are `page_dim` (in portrait
    /// orientation), e.g. one of the [pagesize](crate::pagesize) constants.
    pub fn new(page_dim: Dim) -> Document {
        Document {
            page_dim,
            info: Info::new(),
            fonts: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn set_info(&mut self, info: Info) {
        self.info = info;
    }

    /// The page dimensions in portrait orientation.
    pub fn page_dim(&self) -> Dim {
        self.page_dim
    }

    /// Registers a font with the document so text styles can use it. Fonts
    /// are stored document-wide; any page can use any registered font.
    pub fn add_font(&mut self, font: Font) -> Rc<Font> {
        let font = Rc::new(font);
        self.fonts.push(font.clone());
        font
    }

    /// How many pages have been committed so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Starts a logical section of the document. Content drawn to the
    /// returned grouping flows within `body` on each page, spilling onto new
    /// pages as it runs past the bottom; when `body` is [None] the whole page
    /// inside [DEFAULT_MARGIN] is used. The grouping borrows the document
    /// until it is committed.
    pub fn start_page_grouping(
        &mut self,
        orientation: Orientation,
        body: Option<PageArea>,
    ) -> Result<PageGrouping<'_>, LayoutError> {
        let page_dim = match orientation {
            Orientation::Portrait => self.page_dim,
            Orientation::Landscape => self.page_dim.swap_wh(),
        };
        let body = body.unwrap_or(PageArea {
            lower_left: Coord::new(DEFAULT_MARGIN, DEFAULT_MARGIN),
            dim: Dim {
                width: page_dim.width - DEFAULT_MARGIN * 2.0,
                height: page_dim.height - DEFAULT_MARGIN * 2.0,
            },
        });
        if body.dim.width <= Pt::ZERO || body.dim.height <= Pt::ZERO {
            return Err(LayoutError::DegenerateBody {
                width: body.dim.width.0,
                height: body.dim.height.0,
            });
        }
        log::debug!(
            "starting {orientation:?} page grouping at page {}, body {body:?}",
            self.pages.len()
        );
        Ok(PageGrouping::new(self, page_dim, body))
    }

    pub(crate) fn logical_page_end(&mut self, pages: Vec<SinglePage>) {
        log::debug!("committing {} page(s) to the document", pages.len());
        self.pages.extend(pages);
    }

    /// Writes the entire document out. Note: although this can write to any
    /// stream, the whole document is rendered in memory first.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), LayoutError> {
        let Document {
            info,
            fonts,
            pages,
            ..
        } = self;

        let mut refs = ObjectReferences::new();
        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        info.write(&mut refs, &mut writer);

        let page_refs: Vec<Ref> = pages
            .iter()
            .enumerate()
            .map(|(i, _)| refs.gen(RefType::Page(i)))
            .collect();
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (i, font) in fonts.iter().enumerate() {
            font.write(&mut refs, i, &mut writer);
        }

        // images are shared by Rc: each distinct one is embedded exactly once
        // no matter how many times it was placed
        let mut images: Vec<Rc<Image>> = Vec::new();
        for page in &pages {
            for image in page.images() {
                if !images.iter().any(|known| Rc::ptr_eq(known, image)) {
                    images.push(image.clone());
                }
            }
        }
        for (i, image) in images.iter().enumerate() {
            image.write(&mut refs, i, &mut writer);
        }

        for (i, page) in pages.iter().enumerate() {
            page.write(&mut refs, i, &fonts, &images, &mut writer)?;
        }

        writer.catalog(catalog_id).pages(page_tree_id);

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}
