use crate::colour::Colour;
use crate::error::LayoutError;
use crate::font::Font;
use crate::geom::{Coord, Dim, HeightAndPage, PageArea, PageRange};
use crate::image::{Image, WrappedImage};
use crate::refs::{ObjectReferences, RefType};
use crate::style::{JoinStyle, LineStyle};
use crate::text::TextStyle;
use crate::units::Pt;
use pdf_writer::{Finish, Name, Pdf, Rect};
use std::io::Write;
use std::rc::Rc;

pub const DEFAULT_Z_INDEX: f32 = 0.0;

/// Something to be drawn to. For page-breaking, use the
/// [PageGrouping](crate::page_grouping::PageGrouping) implementation. For a
/// fixed, single page use the [SinglePage] implementation.
///
/// Every drawing operation takes a `really_render` flag; pass false to only
/// measure where the content would land. Page numbers in the returned values
/// are document-wide page indices.
pub trait RenderTarget {
    /// The offset and size of the body area.
    fn body(&self) -> PageArea;

    /// Draws lines from the first point to the last using one line style.
    /// This does *not* connect the last point back to the first; if you want
    /// that, use [RenderTarget::draw_line_loop].
    fn draw_line_strip(
        &mut self,
        points: &[Coord],
        line_style: &LineStyle,
        join_style: JoinStyle,
        really_render: bool,
    ) -> PageRange;

    /// Draws a line between two points. Direction matters when mitering.
    fn draw_line(
        &mut self,
        start: Coord,
        end: Coord,
        line_style: &LineStyle,
        really_render: bool,
    ) -> PageRange {
        self.draw_line_strip(&[start, end], line_style, JoinStyle::Miter, really_render)
    }

    /// Draws a closed path, the last point connecting back to the first,
    /// optionally filled (nonzero winding rule).
    fn draw_line_loop(
        &mut self,
        points: &[Coord],
        line_style: &LineStyle,
        join_style: JoinStyle,
        fill: Option<Colour>,
        really_render: bool,
    ) -> PageRange;

    /// Puts styled text on this target. `baseline_left` is the left end of
    /// the baseline: ascent goes above, descent and leading below. The
    /// returned height is the effective height after page breaking, which
    /// may include extra space above that pushed the text to a new page.
    fn draw_styled_text(
        &mut self,
        baseline_left: Coord,
        text: &str,
        text_style: &TextStyle,
        really_render: bool,
    ) -> HeightAndPage;

    /// Puts an image on this target, anchored at its lower-left corner.
    fn draw_image(
        &mut self,
        bottom_left: Coord,
        image: &WrappedImage,
        really_render: bool,
    ) -> HeightAndPage;

    /// Puts a borderless colored rectangle on this target, anchored at its
    /// lower-left corner. Returns the effective height after page breaking.
    fn fill_rect(&mut self, bottom_left: Coord, dim: Dim, colour: Colour, really_render: bool)
        -> Pt;

    /// The top margin necessary to push an item of `height` whose bottom is
    /// at `bottom_y` onto a new page if it won't fit on this one; zero when
    /// it fits. If less than `required_space_below` would remain under the
    /// item, it is also pushed to the next page. May allocate the page the
    /// item would land on.
    fn page_breaking_top_margin(&mut self, bottom_y: Pt, height: Pt, required_space_below: Pt)
        -> Pt;

    /// The page index for the given y value. MAY ALLOCATE THAT PAGE, so only
    /// call when really rendering.
    fn page_num_for(&mut self, y: Pt) -> isize;
}

enum ItemKind {
    LineStrip {
        points: Vec<Coord>,
        style: LineStyle,
        join: JoinStyle,
    },
    LineLoop {
        points: Vec<Coord>,
        style: LineStyle,
        join: JoinStyle,
        fill: Option<Colour>,
    },
    FillRect {
        bottom_left: Coord,
        dim: Dim,
        colour: Colour,
    },
    Text {
        baseline_left: Coord,
        string: String,
        style: TextStyle,
    },
    Image {
        bottom_left: Coord,
        image: Rc<Image>,
        dim: Dim,
    },
}

/// One buffered drawing command: drawn in z order, then insertion order.
struct PageItem {
    z: f32,
    ord: u64,
    kind: ItemKind,
}

/// Caches the contents of one specific page for later writing. You generally
/// want [PageGrouping](crate::page_grouping::PageGrouping) for automatic
/// page-breaking; `SinglePage` is for forcing something onto one page only.
pub struct SinglePage {
    pub page_num: usize,
    page_dim: Dim,
    body: PageArea,
    items: Vec<PageItem>,
    last_ord: u64,
}

impl SinglePage {
    pub(crate) fn new(page_num: usize, page_dim: Dim, body: PageArea) -> SinglePage {
        SinglePage {
            page_num,
            page_dim,
            body,
            items: Vec::new(),
            last_ord: 0,
        }
    }

    fn push(&mut self, z: f32, kind: ItemKind) {
        self.items.push(PageItem {
            z,
            ord: self.last_ord,
            kind,
        });
        self.last_ord += 1;
    }

    pub(crate) fn images(&self) -> impl Iterator<Item = &Rc<Image>> {
        self.items.iter().filter_map(|item| match &item.kind {
            ItemKind::Image { image, .. } => Some(image),
            _ => None,
        })
    }

    /// Emit the buffered items as content-stream operators, z-ordered so
    /// backgrounds always paint beneath content and borders.
    pub(crate) fn render(
        &self,
        fonts: &[Rc<Font>],
        images: &[Rc<Image>],
    ) -> Result<Vec<u8>, LayoutError> {
        if self.items.is_empty() {
            return Ok(Vec::default());
        }

        let mut order: Vec<&PageItem> = self.items.iter().collect();
        order.sort_by(|a, b| {
            a.z.partial_cmp(&b.z)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.ord.cmp(&b.ord))
        });

        let mut content: Vec<u8> = Vec::default();
        for item in order {
            match &item.kind {
                ItemKind::LineStrip {
                    points,
                    style,
                    join,
                } => {
                    if !style.is_drawn() || points.len() < 2 {
                        continue;
                    }
                    writeln!(&mut content, "q")?;
                    write_path(&mut content, points, style, *join)?;
                    writeln!(&mut content, "S")?;
                    writeln!(&mut content, "Q")?;
                }
                ItemKind::LineLoop {
                    points,
                    style,
                    join,
                    fill,
                } => {
                    if points.len() < 3 || (!style.is_drawn() && fill.is_none()) {
                        continue;
                    }
                    writeln!(&mut content, "q")?;
                    if let Some(fill) = fill {
                        fill.write_fill(&mut content)?;
                    }
                    write_path(&mut content, points, style, *join)?;
                    match (fill.is_some(), style.is_drawn()) {
                        // close, fill, and stroke
                        (true, true) => writeln!(&mut content, "b")?,
                        (true, false) => writeln!(&mut content, "h f")?,
                        (false, true) => writeln!(&mut content, "s")?,
                        (false, false) => unreachable!(),
                    }
                    writeln!(&mut content, "Q")?;
                }
                ItemKind::FillRect {
                    bottom_left,
                    dim,
                    colour,
                } => {
                    writeln!(&mut content, "q")?;
                    colour.write_fill(&mut content)?;
                    writeln!(
                        &mut content,
                        "{} {} {} {} re",
                        bottom_left.x, bottom_left.y, dim.width, dim.height
                    )?;
                    writeln!(&mut content, "f")?;
                    writeln!(&mut content, "Q")?;
                }
                ItemKind::Text {
                    baseline_left,
                    string,
                    style,
                } => {
                    let font_index = fonts
                        .iter()
                        .position(|f| Rc::as_ptr(f) as *const () == style.font_ptr())
                        .ok_or(LayoutError::UnregisteredFont)?;
                    let font = &fonts[font_index];

                    writeln!(&mut content, "q")?;
                    writeln!(&mut content, "/F{} {} Tf", font_index, style.size)?;
                    style.colour.write_fill(&mut content)?;
                    writeln!(&mut content, "BT")?;
                    writeln!(&mut content, "{} {} Td", baseline_left.x, baseline_left.y)?;
                    write!(&mut content, "<")?;
                    for ch in string.chars() {
                        let gid = font
                            .glyph_id(ch)
                            .or_else(|| font.replacement_glyph_id())
                            .unwrap_or(0);
                        write!(&mut content, "{gid:04x}")?;
                    }
                    writeln!(&mut content, "> Tj")?;
                    writeln!(&mut content, "ET")?;
                    writeln!(&mut content, "Q")?;
                }
                ItemKind::Image {
                    bottom_left,
                    image,
                    dim,
                } => {
                    let image_index = images
                        .iter()
                        .position(|i| Rc::ptr_eq(i, image))
                        .expect("image registered with document");
                    writeln!(&mut content, "q")?;
                    writeln!(
                        &mut content,
                        "{} 0 0 {} {} {} cm",
                        dim.width, dim.height, bottom_left.x, bottom_left.y
                    )?;
                    writeln!(&mut content, "/I{image_index} Do")?;
                    writeln!(&mut content, "Q")?;
                }
            }
        }

        Ok(content)
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &[Rc<Font>],
        images: &[Rc<Image>],
        writer: &mut Pdf,
    ) -> Result<(), LayoutError> {
        let id = refs.get(RefType::Page(page_index)).expect("page id exists");
        let mut page = writer.page(id);
        page.media_box(Rect {
            x1: 0.0,
            y1: 0.0,
            x2: self.page_dim.width.0,
            y2: self.page_dim.height.0,
        });
        page.art_box(Rect {
            x1: self.body.lower_left.x.0,
            y1: self.body.lower_left.y.0,
            x2: (self.body.lower_left.x + self.body.dim.width).0,
            y2: (self.body.lower_left.y + self.body.dim.height).0,
        });
        page.parent(refs.get(RefType::PageTree).expect("page tree id exists"));

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (i, _) in fonts.iter().enumerate() {
            resource_fonts.pair(
                Name(format!("F{i}").as_bytes()),
                refs.get(RefType::Font(i)).expect("font id exists"),
            );
        }
        resource_fonts.finish();
        let mut resource_xobjects = resources.x_objects();
        for (i, _) in images.iter().enumerate() {
            resource_xobjects.pair(
                Name(format!("I{i}").as_bytes()),
                refs.get(RefType::Image(i)).expect("image id exists"),
            );
        }
        resource_xobjects.finish();
        resources.finish();

        let content_id = refs.gen(RefType::ContentForPage(page_index));
        page.contents(content_id);
        page.finish();

        let rendered = self.render(fonts, images)?;
        writer.stream(content_id, rendered.as_slice());
        Ok(())
    }
}

fn write_path(
    content: &mut Vec<u8>,
    points: &[Coord],
    style: &LineStyle,
    join: JoinStyle,
) -> Result<(), std::io::Error> {
    writeln!(content, "{} j", join.operator_value())?;
    if style.is_drawn() {
        writeln!(content, "{} w", style.thickness)?;
        style.colour.write_stroke(content)?;
    }
    writeln!(content, "{} {} m", points[0].x, points[0].y)?;
    for point in &points[1..] {
        writeln!(content, "{} {} l", point.x, point.y)?;
    }
    Ok(())
}

impl RenderTarget for SinglePage {
    fn body(&self) -> PageArea {
        self.body
    }

    fn draw_line_strip(
        &mut self,
        points: &[Coord],
        line_style: &LineStyle,
        join_style: JoinStyle,
        really_render: bool,
    ) -> PageRange {
        if really_render {
            self.push(
                DEFAULT_Z_INDEX,
                ItemKind::LineStrip {
                    points: points.to_vec(),
                    style: *line_style,
                    join: join_style,
                },
            );
        }
        PageRange::single(self.page_num as isize)
    }

    fn draw_line_loop(
        &mut self,
        points: &[Coord],
        line_style: &LineStyle,
        join_style: JoinStyle,
        fill: Option<Colour>,
        really_render: bool,
    ) -> PageRange {
        if really_render {
            self.push(
                DEFAULT_Z_INDEX,
                ItemKind::LineLoop {
                    points: points.to_vec(),
                    style: *line_style,
                    join: join_style,
                    fill,
                },
            );
        }
        PageRange::single(self.page_num as isize)
    }

    fn draw_styled_text(
        &mut self,
        baseline_left: Coord,
        text: &str,
        text_style: &TextStyle,
        really_render: bool,
    ) -> HeightAndPage {
        if really_render {
            self.push(
                DEFAULT_Z_INDEX,
                ItemKind::Text {
                    baseline_left,
                    string: text.into(),
                    style: text_style.clone(),
                },
            );
        }
        HeightAndPage {
            height: text_style.line_height(),
            page: self.page_num as isize,
        }
    }

    fn draw_image(
        &mut self,
        bottom_left: Coord,
        image: &WrappedImage,
        really_render: bool,
    ) -> HeightAndPage {
        if really_render {
            self.push(
                DEFAULT_Z_INDEX,
                ItemKind::Image {
                    bottom_left,
                    image: image.image.clone(),
                    dim: image.dim,
                },
            );
        }
        // no page break to account for: this is a single page
        HeightAndPage {
            height: image.dim.height,
            page: self.page_num as isize,
        }
    }

    fn fill_rect(
        &mut self,
        bottom_left: Coord,
        dim: Dim,
        colour: Colour,
        really_render: bool,
    ) -> Pt {
        if really_render {
            // backgrounds sink beneath everything drawn at the default z
            self.push(
                -1.0,
                ItemKind::FillRect {
                    bottom_left,
                    dim,
                    colour,
                },
            );
        }
        dim.height
    }

    /// A single page always returns zero: nothing flows onto another page,
    /// though it may be truncated going off the edge of this one.
    fn page_breaking_top_margin(
        &mut self,
        _bottom_y: Pt,
        _height: Pt,
        _required_space_below: Pt,
    ) -> Pt {
        Pt::ZERO
    }

    fn page_num_for(&mut self, _y: Pt) -> isize {
        self.page_num as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::test_util::FakeFont;

    fn page() -> SinglePage {
        let dim = Dim::new(Pt(200.0), Pt(300.0)).unwrap();
        let body = PageArea {
            lower_left: Coord::new(Pt(10.0), Pt(10.0)),
            dim: Dim::new(Pt(180.0), Pt(280.0)).unwrap(),
        };
        SinglePage::new(0, dim, body)
    }

    #[test]
    fn backgrounds_paint_beneath_lines() {
        let mut page = page();
        // stroke first, background after: z-order still puts the rect first
        page.draw_line(
            Coord::new(Pt(0.0), Pt(0.0)),
            Coord::new(Pt(50.0), Pt(50.0)),
            &LineStyle::hairline(colours::BLACK),
            true,
        );
        page.fill_rect(
            Coord::new(Pt(0.0), Pt(0.0)),
            Dim::new(Pt(50.0), Pt(50.0)).unwrap(),
            colours::RED,
            true,
        );
        let content = String::from_utf8(page.render(&[], &[]).unwrap()).unwrap();
        let rect_at = content.find("re").unwrap();
        let stroke_at = content.find("S").unwrap();
        assert!(rect_at < stroke_at);
    }

    #[test]
    fn measuring_buffers_nothing() {
        let mut page = page();
        page.fill_rect(
            Coord::new(Pt(0.0), Pt(0.0)),
            Dim::new(Pt(50.0), Pt(50.0)).unwrap(),
            colours::RED,
            false,
        );
        assert!(page.render(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn text_with_unknown_font_fails_at_render() {
        use std::rc::Rc;
        let mut page = page();
        let style = TextStyle::new(Rc::new(FakeFont), Pt(12.0), colours::BLACK);
        let hp = page.draw_styled_text(Coord::new(Pt(0.0), Pt(100.0)), "hi", &style, true);
        assert_eq!(hp.height, style.line_height());
        assert!(matches!(
            page.render(&[], &[]),
            Err(LayoutError::UnregisteredFont)
        ));
    }

    #[test]
    fn single_page_never_breaks() {
        let mut page = page();
        assert_eq!(
            page.page_breaking_top_margin(Pt(-500.0), Pt(100.0), Pt::ZERO),
            Pt::ZERO
        );
    }
}
