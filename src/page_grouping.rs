use crate::colour::Colour;
use crate::document::Document;
use crate::geom::{Coord, Dim, HeightAndPage, PageArea, PageRange, INVALID_PAGE_RANGE};
use crate::image::WrappedImage;
use crate::page::{RenderTarget, SinglePage};
use crate::style::{JoinStyle, LineStyle};
use crate::text::TextStyle;
use crate::units::Pt;

/// A group of content that logically belongs on the same page but may spill
/// over onto subsequent pages as necessary in order to fit. Maybe better
/// called a "document section".
///
/// The grouping presents an endless canvas: the body area of its first page,
/// extended downward forever. Y values below the bottom of the body flow onto
/// later pages, which are created on demand; drawing commands report the
/// document-wide page range they actually landed on. Call
/// [PageGrouping::commit] to end the section and attach its pages to the
/// document.
///
/// Here is the model of a single page:
/// ```text
/// +--------------------+
/// |                    |
/// |   +------------+   | <- body.y_top()
/// |   |           h|   |
/// |   |           e|   |
/// |   |    Body   i|   |
/// |   |           g|   |
/// |   |w i d t h  t|   |
/// |   #------------+   | <- body.y_bottom()
/// |   ^                |
/// | body.lower_left    |
/// #--------------------+
/// (0,0)
/// ```
pub struct PageGrouping<'a> {
    mgr: &'a mut Document,
    body: PageArea,
    page_dim: Dim,
    pages: Vec<SinglePage>,
    page_offset: usize,
}

/// Where a y value on the endless canvas actually lands: the page (as an
/// index into the grouping's pages), the y value on that page, and any
/// downward shove that was applied to keep the item from poking out over the
/// top of the body.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageIdxAndY {
    idx: usize,
    y: Pt,
    adj: Pt,
}

impl<'a> PageGrouping<'a> {
    pub(crate) fn new(mgr: &'a mut Document, page_dim: Dim, body: PageArea) -> PageGrouping<'a> {
        let page_offset = mgr.page_count();
        PageGrouping {
            mgr,
            body,
            page_dim,
            pages: Vec::new(),
            page_offset,
        }
    }

    /// The upper-left corner of the body area, where flowed content usually
    /// starts.
    pub fn body_top_left(&self) -> Coord {
        self.body.top_left()
    }

    /// Width of the entire page (not just the body) in document units.
    pub fn page_width(&self) -> Pt {
        self.page_dim.width
    }

    fn ensure_page(&mut self, idx: usize) {
        while self.pages.len() <= idx {
            let page_num = self.page_offset + self.pages.len();
            log::trace!("extending page grouping to page {page_num}");
            self.pages
                .push(SinglePage::new(page_num, self.page_dim, self.body));
        }
    }

    /// Maps a y value on the endless canvas to a page and the y value on that
    /// page, creating new pages as needed. If an item of `height` sitting at
    /// that y would poke out over the top of the body, it is shoved down to
    /// fit instead and `adj` reports by how much. If less than
    /// `required_space_below` would remain under the item, it rolls to the
    /// next page as well.
    fn appropriate_page(
        &mut self,
        bottom_y: Pt,
        height: Pt,
        required_space_below: Pt,
    ) -> PageIdxAndY {
        let mut y = bottom_y - required_space_below;
        let mut idx = 0;
        // keep moving to the top of the next page until we're in the body
        while y < self.body.y_bottom() {
            y += self.body.dim.height;
            idx += 1;
        }
        self.ensure_page(idx);
        y += required_space_below;

        let mut adj = Pt::ZERO;
        if y + height > self.body.y_top() {
            let old_y = y;
            y = self.body.y_top() - height;
            adj = old_y - y;
        }
        PageIdxAndY { idx, y, adj }
    }

    fn global(&self, idx: usize) -> isize {
        (self.page_offset + idx) as isize
    }

    /// Ends this logical section, attaching its pages to the document. Since
    /// this consumes the grouping, nothing can draw to a committed section.
    pub fn commit(self) -> &'a mut Document {
        let PageGrouping { mgr, pages, .. } = self;
        mgr.logical_page_end(pages);
        mgr
    }
}

impl RenderTarget for PageGrouping<'_> {
    fn body(&self) -> PageArea {
        self.body
    }

    fn draw_line_strip(
        &mut self,
        points: &[Coord],
        line_style: &LineStyle,
        _join_style: JoinStyle,
        really_render: bool,
    ) -> PageRange {
        // Segments that cross a page boundary can't share one path, so each
        // segment is drawn on its own.
        let mut range = INVALID_PAGE_RANGE;
        for pair in points.windows(2) {
            range = range.max_extents(self.draw_line(pair[0], pair[1], line_style, really_render));
        }
        range
    }

    fn draw_line(
        &mut self,
        start: Coord,
        end: Coord,
        line_style: &LineStyle,
        really_render: bool,
    ) -> PageRange {
        let flip = end.y > start.y;
        let (top, bottom) = if flip { (end, start) } else { (start, end) };
        let pby1 = self.appropriate_page(top.y, Pt::ZERO, Pt::ZERO);
        let pby2 = self.appropriate_page(bottom.y, Pt::ZERO, Pt::ZERO);

        let total_pages = pby2.idx - pby1.idx + 1;
        let x_diff = end.x - start.x;
        let y_diff = start.y - end.y;

        // The first x and y are correct for the first page; later pages pick
        // up at the x where the line left the bottom of the page before.
        let mut xa = top.x;
        let mut xb = Pt::ZERO;
        for page_num in 1..=total_pages {
            let idx = pby1.idx + page_num - 1;
            if page_num > 1 {
                xa = xb;
            }
            let ya = if page_num > 1 {
                self.body.y_top()
            } else {
                pby1.y
            };
            let yb = if page_num == total_pages {
                xb = bottom.x;
                pby2.y
            } else {
                // (ya - yb) / y_diff is the proportion of the line shown on
                // this page; the sign of x_diff reflects the slope.
                let yb = self.body.y_bottom();
                xb = xa + x_diff * ((ya - yb).0 / y_diff.0);
                yb
            };

            // The direction of lines matters when mitering: if we flipped the
            // line to break it across pages, flip each piece back.
            let (a, b) = if flip {
                (Coord::new(xb, yb), Coord::new(xa, ya))
            } else {
                (Coord::new(xa, ya), Coord::new(xb, yb))
            };
            self.pages[idx].draw_line(a, b, line_style, really_render);
        }
        PageRange::new(self.global(pby1.idx), self.global(pby2.idx))
    }

    fn draw_line_loop(
        &mut self,
        points: &[Coord],
        line_style: &LineStyle,
        join_style: JoinStyle,
        fill: Option<Colour>,
        really_render: bool,
    ) -> PageRange {
        if points.len() < 3 {
            return INVALID_PAGE_RANGE;
        }
        let min_y = points.iter().map(|p| p.y).fold(Pt(f32::MAX), Pt::min);
        let max_y = points.iter().map(|p| p.y).fold(Pt(f32::MIN), Pt::max);
        let pby_top = self.appropriate_page(max_y, Pt::ZERO, Pt::ZERO);
        let pby_bottom = self.appropriate_page(min_y, Pt::ZERO, Pt::ZERO);

        if pby_top.idx == pby_bottom.idx {
            // the whole loop fits one page: shift it there and keep the fill
            let shift = pby_bottom.y - min_y;
            let shifted: Vec<Coord> = points.iter().map(|p| p.plus_y(shift)).collect();
            self.pages[pby_bottom.idx].draw_line_loop(
                &shifted,
                line_style,
                join_style,
                fill,
                really_render,
            );
            return PageRange::single(self.global(pby_bottom.idx));
        }

        // A loop cut apart by a page break is only stroked: there's no
        // sensible way to fill the cut-open pieces.
        if fill.is_some() {
            log::debug!(
                "dropping fill on a line loop spanning pages {}..={}",
                self.global(pby_top.idx),
                self.global(pby_bottom.idx)
            );
        }
        let mut range = INVALID_PAGE_RANGE;
        for pair in points.windows(2) {
            range = range.max_extents(self.draw_line(pair[0], pair[1], line_style, really_render));
        }
        let closing = self.draw_line(points[points.len() - 1], points[0], line_style, really_render);
        range.max_extents(closing)
    }

    fn draw_styled_text(
        &mut self,
        baseline_left: Coord,
        text: &str,
        text_style: &TextStyle,
        really_render: bool,
    ) -> HeightAndPage {
        let below_baseline = text_style.descent_and_leading();
        let pby = self.appropriate_page(
            baseline_left.y - below_baseline,
            text_style.line_height(),
            Pt::ZERO,
        );
        self.pages[pby.idx].draw_styled_text(
            baseline_left.with_y(pby.y + below_baseline),
            text,
            text_style,
            really_render,
        );
        HeightAndPage {
            height: text_style.line_height() + pby.adj,
            page: self.global(pby.idx),
        }
    }

    fn draw_image(
        &mut self,
        bottom_left: Coord,
        image: &WrappedImage,
        really_render: bool,
    ) -> HeightAndPage {
        // calculate what page the image should start on
        let pby = self.appropriate_page(bottom_left.y, image.dim.height, Pt::ZERO);
        self.pages[pby.idx].draw_image(bottom_left.with_y(pby.y), image, really_render);
        HeightAndPage {
            height: image.dim.height + pby.adj,
            page: self.global(pby.idx),
        }
    }

    fn fill_rect(
        &mut self,
        bottom_left: Coord,
        dim: Dim,
        colour: Colour,
        really_render: bool,
    ) -> Pt {
        let top_y = bottom_left.y + dim.height;
        let pby1 = self.appropriate_page(top_y, Pt::ZERO, Pt::ZERO);
        let pby2 = self.appropriate_page(bottom_left.y, Pt::ZERO, Pt::ZERO);

        let total_pages = pby2.idx - pby1.idx + 1;
        for page_num in 1..=total_pages {
            let idx = pby1.idx + page_num - 1;
            // on all except the first page, the slice starts at the top of
            // the body; on all except the last, it runs to the bottom
            let ya = if page_num > 1 {
                self.body.y_top()
            } else {
                pby1.y
            };
            let yb = if page_num == total_pages {
                pby2.y
            } else {
                self.body.y_bottom()
            };
            self.pages[idx].fill_rect(
                Coord::new(bottom_left.x, yb),
                dim.with_height(ya - yb),
                colour,
                really_render,
            );
        }
        dim.height + pby2.adj
    }

    fn page_breaking_top_margin(
        &mut self,
        bottom_y: Pt,
        height: Pt,
        required_space_below: Pt,
    ) -> Pt {
        self.appropriate_page(bottom_y, height, required_space_below).adj
    }

    fn page_num_for(&mut self, y: Pt) -> isize {
        let pby = self.appropriate_page(y, Pt::ZERO, Pt::ZERO);
        self.global(pby.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::document::{Document, Orientation};
    use crate::test_util::FakeFont;
    use std::rc::Rc;

    // page 200x300 with a 10pt margin: body spans y in [10, 290]
    fn doc() -> Document {
        Document::new(Dim::new(Pt(200.0), Pt(300.0)).unwrap())
    }

    fn body() -> PageArea {
        PageArea {
            lower_left: Coord::new(Pt(10.0), Pt(10.0)),
            dim: Dim::new(Pt(180.0), Pt(280.0)).unwrap(),
        }
    }

    #[test]
    fn y_values_below_the_body_flow_onto_later_pages() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        assert_eq!(lp.page_num_for(Pt(150.0)), 0);
        assert_eq!(lp.page_num_for(Pt(10.0)), 0);
        assert_eq!(lp.page_num_for(Pt(9.0)), 1);
        assert_eq!(lp.page_num_for(Pt(-270.0)), 1);
        assert_eq!(lp.page_num_for(Pt(-271.0)), 2);
        assert_eq!(lp.pages.len(), 3);
    }

    #[test]
    fn top_margin_is_zero_when_the_item_fits() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        assert_eq!(
            lp.page_breaking_top_margin(Pt(100.0), Pt(50.0), Pt::ZERO),
            Pt::ZERO
        );
        // bottom 250 + height 100 pokes 60 over the top of the body
        assert_eq!(
            lp.page_breaking_top_margin(Pt(250.0), Pt(100.0), Pt::ZERO),
            Pt(60.0)
        );
    }

    #[test]
    fn required_space_below_rolls_an_item_to_the_next_page() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        // fits when nothing is required below it...
        assert_eq!(
            lp.page_breaking_top_margin(Pt(15.0), Pt(20.0), Pt::ZERO),
            Pt::ZERO
        );
        // ...but only 5pt of body remains below, so requiring 10 moves it.
        // Shifting the bottom down by the returned margin lands it at the top
        // of the next page's body with the full 10pt free below it.
        let adj = lp.page_breaking_top_margin(Pt(15.0), Pt(20.0), Pt(10.0));
        assert_eq!(adj, Pt(25.0));
        assert_eq!(lp.page_num_for(Pt(15.0) - adj), 1);
    }

    #[test]
    fn rects_split_across_the_page_break() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        // top 40 above the break, bottom 60 below it
        let height = lp.fill_rect(
            Coord::new(Pt(20.0), Pt(-50.0)),
            Dim::new(Pt(160.0), Pt(100.0)).unwrap(),
            colours::RED,
            true,
        );
        assert_eq!(height, Pt(100.0));
        assert_eq!(lp.pages.len(), 2);
        let first = String::from_utf8(lp.pages[0].render(&[], &[]).unwrap()).unwrap();
        let second = String::from_utf8(lp.pages[1].render(&[], &[]).unwrap()).unwrap();
        assert!(first.contains("20 10 160 40 re"), "{first}");
        assert!(second.contains("20 230 160 60 re"), "{second}");
    }

    #[test]
    fn lines_interpolate_x_at_the_page_break() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        // drops 280pt while moving right 140: halfway down is 70 across
        let range = lp.draw_line(
            Coord::new(Pt(20.0), Pt(150.0)),
            Coord::new(Pt(160.0), Pt(-130.0)),
            &LineStyle::new(colours::BLACK, Pt(1.0)).unwrap(),
            true,
        );
        assert_eq!(range, PageRange::new(0, 1));
        let first = String::from_utf8(lp.pages[0].render(&[], &[]).unwrap()).unwrap();
        let second = String::from_utf8(lp.pages[1].render(&[], &[]).unwrap()).unwrap();
        // leaves page 0 at the body bottom, 140 * (140/280) = 70pt across
        assert!(first.contains("20 150 m"), "{first}");
        assert!(first.contains("90 10 l"), "{first}");
        // picks up at the same x at the top of page 1
        assert!(second.contains("90 290 m"), "{second}");
        assert!(second.contains("160 150 l"), "{second}");
    }

    #[test]
    fn loops_on_one_page_keep_their_fill() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        // below the first page's body, but all on page 1
        let points = [
            Coord::new(Pt(50.0), Pt(-50.0)),
            Coord::new(Pt(100.0), Pt(-100.0)),
            Coord::new(Pt(50.0), Pt(-100.0)),
        ];
        let range = lp.draw_line_loop(
            &points,
            &LineStyle::new(colours::BLACK, Pt(1.0)).unwrap(),
            JoinStyle::Miter,
            Some(colours::GREEN),
            true,
        );
        assert_eq!(range, PageRange::single(1));
        let second = String::from_utf8(lp.pages[1].render(&[], &[]).unwrap()).unwrap();
        // close, fill, and stroke in one operator
        assert!(second.contains("\nb\n"), "{second}");
        // shifted up by one body height: -100 lands at 180
        assert!(second.contains("50 180"), "{second}");
    }

    #[test]
    fn text_near_the_bottom_moves_to_the_next_page() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        let style = TextStyle::new(Rc::new(FakeFont), Pt(10.0), colours::BLACK);
        // descent and leading reach below the body bottom
        let hp = lp.draw_styled_text(Coord::new(Pt(20.0), Pt(11.0)), "flows", &style, true);
        assert_eq!(hp.page, 1);
        assert!(hp.height >= style.line_height());
    }

    #[test]
    fn commit_hands_the_pages_to_the_document() {
        let mut doc = doc();
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        lp.page_num_for(Pt(-50.0));
        let doc = lp.commit();
        assert_eq!(doc.page_count(), 2);

        // a second grouping numbers its pages after the committed ones
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body()))
            .unwrap();
        assert_eq!(lp.page_num_for(Pt(100.0)), 2);
    }
}
