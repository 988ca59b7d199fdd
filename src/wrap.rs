use crate::error::LayoutError;
use crate::geom::{Coord, Dim, DimAndPageNums, PageRange, INVALID_PAGE_RANGE};
use crate::image::{ScaledImage, WrappedImage};
use crate::page::RenderTarget;
use crate::table::{Table, WrappedTable};
use crate::text::{Text, TextWrapper, WrappedText};
use crate::units::Pt;

/// Anything that can flow through the line-wrapping engine.
#[derive(Clone)]
pub enum Content {
    Text(Text),
    Image(ScaledImage),
    Table(Table),
}

impl Content {
    fn wrapper(&self) -> Result<ContentWrapper<'_>, LayoutError> {
        Ok(match self {
            // An empty run still occupies a line: it becomes a zero-width row
            // carrying its style's metrics.
            Content::Text(text) if text.content().is_empty() => ContentWrapper::Single(Some(
                WrappedItem::Text(WrappedText::new(text.style.clone(), String::new())),
            )),
            Content::Text(text) => ContentWrapper::Text(TextWrapper::new(text)),
            Content::Image(image) => {
                ContentWrapper::Single(Some(WrappedItem::Image(image.wrap())))
            }
            Content::Table(table) => {
                ContentWrapper::Single(Some(WrappedItem::Table(table.wrap()?)))
            }
        })
    }
}

impl From<Text> for Content {
    fn from(text: Text) -> Content {
        Content::Text(text)
    }
}

impl From<ScaledImage> for Content {
    fn from(image: ScaledImage) -> Content {
        Content::Image(image)
    }
}

impl From<Table> for Content {
    fn from(table: Table) -> Content {
        Content::Table(table)
    }
}

/// One measured item on a line: a row of text, an image, or a whole table.
pub enum WrappedItem {
    Text(WrappedText),
    Image(WrappedImage),
    Table(WrappedTable),
}

impl WrappedItem {
    pub fn dim(&self) -> Dim {
        match self {
            WrappedItem::Text(text) => text.dim(),
            WrappedItem::Image(image) => image.dim,
            WrappedItem::Table(table) => table.dim(),
        }
    }

    /// Distance from the top of this item down to the baseline it sits on.
    /// Non-text items sit entirely above the baseline.
    pub fn ascent(&self) -> Pt {
        match self {
            WrappedItem::Text(text) => text.ascent(),
            WrappedItem::Image(image) => image.ascent(),
            WrappedItem::Table(table) => table.dim().height,
        }
    }

    pub fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        match self {
            WrappedItem::Text(text) => text.render(lp, top_left, really_render),
            WrappedItem::Image(image) => image.render(lp, top_left, really_render),
            WrappedItem::Table(table) => table.render(lp, top_left, really_render),
        }
    }
}

/// The incremental wrapping state for one [Content] item. Text yields many
/// rows; images and tables yield themselves exactly once.
enum ContentWrapper<'a> {
    Text(TextWrapper<'a>),
    Single(Option<WrappedItem>),
}

impl ContentWrapper<'_> {
    fn has_more(&self) -> bool {
        match self {
            ContentWrapper::Text(wrapper) => wrapper.has_more(),
            ContentWrapper::Single(item) => item.is_some(),
        }
    }

    /// `(item, terminal, has_more)`: the item always comes back, even
    /// overflowing; `terminal` means a hard break ended it.
    fn get_something(&mut self, max_width: Pt) -> (WrappedItem, bool, bool) {
        match self {
            ContentWrapper::Text(wrapper) => {
                let (row, terminal, has_more) = wrapper.get_something(max_width);
                (WrappedItem::Text(row), terminal, has_more)
            }
            ContentWrapper::Single(item) => {
                let item = item.take().expect("get_something called after exhaustion");
                (item, false, false)
            }
        }
    }

    fn get_if_fits(&mut self, remaining_width: Pt) -> Option<(WrappedItem, bool, bool)> {
        match self {
            ContentWrapper::Text(wrapper) => wrapper
                .get_if_fits(remaining_width)
                .map(|(row, terminal, has_more)| (WrappedItem::Text(row), terminal, has_more)),
            ContentWrapper::Single(opt) => {
                let dim = opt.as_ref().map(WrappedItem::dim)?;
                if dim.width <= remaining_width {
                    Some((opt.take().unwrap(), false, false))
                } else {
                    None
                }
            }
        }
    }
}

/// A single wrapped line holding multiple items that share a baseline.
/// A line with no items is a blank line that still consumes height.
pub struct Line {
    items: Vec<WrappedItem>,
    width: Pt,
    ascent: Pt,
    descent_leading: Pt,
}

impl Line {
    fn new() -> Line {
        Line {
            items: Vec::new(),
            width: Pt::ZERO,
            ascent: Pt::ZERO,
            descent_leading: Pt::ZERO,
        }
    }

    /// A blank line taking its vertical metrics from the line before it.
    fn blank_after(prev: &Line) -> Line {
        let (height, ascent) = match prev.items.last() {
            Some(item) => (item.dim().height, item.ascent()),
            None => (prev.line_height(), prev.ascent),
        };
        Line {
            items: Vec::new(),
            width: Pt::ZERO,
            ascent,
            descent_leading: height - ascent,
        }
    }

    pub fn items(&self) -> &[WrappedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn width(&self) -> Pt {
        self.width
    }

    pub fn ascent(&self) -> Pt {
        self.ascent
    }

    pub fn line_height(&self) -> Pt {
        self.ascent + self.descent_leading
    }

    pub fn dim(&self) -> Dim {
        Dim {
            width: self.width,
            height: self.line_height(),
        }
    }

    fn append(&mut self, item: WrappedItem) {
        // line height has to be ascent + descent-leading because items align
        // on the baseline
        self.ascent = self.ascent.max(item.ascent());
        self.descent_leading = self
            .descent_leading
            .max(item.dim().height - item.ascent());
        self.width += item.dim().width;
        self.items.push(item);
    }

    /// Trim trailing spaces off the final item so a break space never hangs
    /// past the line's reported width.
    fn trim_trailing_space(&mut self) {
        if let Some(WrappedItem::Text(last)) = self.items.last_mut() {
            let trimmed = last.without_trailing_space();
            self.width -= last.width - trimmed.width;
            *last = trimmed;
        }
    }

    /// Draw this line with its top-left corner at `top_left`, baseline
    /// aligning every item. With `really_render` false, only measures and
    /// reports where the line would land.
    pub fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        let dim = self.dim();
        // Using height.next_up() so that on a rounding error the whole line
        // gets thrown to the next page, not just the fragment with the
        // highest ascent.
        let adj = lp.page_breaking_top_margin(
            top_left.y - dim.height,
            dim.height.next_up(),
            Pt::ZERO,
        );
        let y = if adj == Pt::ZERO {
            top_left.y
        } else {
            top_left.y - adj
        };

        let mut page_nums = INVALID_PAGE_RANGE;
        let mut x = top_left.x;

        if really_render {
            // ascent is the maximum ascent of anything on this line;
            // subtracting each item's own ascent from it yields the baseline
            // offset that item needs.
            for item in &self.items {
                let ascent_diff = self.ascent - item.ascent();
                let inner_upper_left = Coord::new(x, y - ascent_diff);
                let dpn = item.render(lp, inner_upper_left, true);
                x += item.dim().width;
                page_nums = dpn.max_extents(page_nums);
            }
        } else {
            page_nums = PageRange::new(lp.page_num_for(y), lp.page_num_for(y - dim.height));
            x = top_left.x + dim.width;
        }

        DimAndPageNums {
            dim: Dim {
                width: x - top_left.x,
                height: (top_left.y - y) + dim.height,
            },
            page_nums,
        }
    }
}

/// Turn an ordered sequence of contents into baseline-aligned lines no wider
/// than `max_width` (except where a single unbreakable item alone exceeds
/// it). An empty input yields no lines; a non-empty input with a
/// non-positive width is an error.
pub fn wrap_lines(contents: &[Content], max_width: Pt) -> Result<Vec<Line>, LayoutError> {
    if contents.is_empty() {
        return Ok(Vec::new());
    }
    if max_width <= Pt::ZERO {
        return Err(LayoutError::InvalidWrapWidth(max_width.0));
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut curr = Line::new();
    let mut unused_width = max_width;

    for content in contents {
        let mut wrapper = content.wrapper()?;
        while wrapper.has_more() {
            if curr.is_empty() {
                unused_width = max_width;
                let (item, terminal, has_more) = wrapper.get_something(max_width);
                unused_width -= item.dim().width;
                curr.append(item);
                if terminal || has_more {
                    // hard break, or we took as much as fits and more
                    // remains: this line is done
                    add_line_check_blank(curr, &mut lines);
                    curr = Line::new();
                    unused_width = max_width;
                }
            } else {
                match wrapper.get_if_fits(unused_width) {
                    Some((item, terminal, has_more)) => {
                        unused_width -= item.dim().width;
                        curr.append(item);
                        if terminal || has_more {
                            add_line_check_blank(curr, &mut lines);
                            curr = Line::new();
                            unused_width = max_width;
                        }
                    }
                    None => {
                        add_line_check_blank(curr, &mut lines);
                        curr = Line::new();
                        unused_width = max_width;
                    }
                }
            }
        }
    }

    // don't forget the line in progress
    add_line_check_blank(curr, &mut lines);

    Ok(lines)
}

fn add_line_check_blank(mut curr: Line, lines: &mut Vec<Line>) {
    if curr.is_empty() {
        // A trailing hard break leaves an empty accumulator: emit a blank
        // line with the previous line's metrics. With no previous line there
        // was no content at all and nothing is emitted.
        if let Some(prev) = lines.last() {
            lines.push(Line::blank_after(prev));
        }
        return;
    }
    curr.trim_trailing_space();
    lines.push(curr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::test_util::FakeFont;
    use crate::text::TextStyle;
    use std::rc::Rc;

    fn style(size: f32) -> TextStyle {
        TextStyle::new(Rc::new(FakeFont), Pt(size), colours::BLACK)
    }

    fn text(ts: &TextStyle, s: &str) -> Content {
        Content::Text(Text::new(ts.clone(), s))
    }

    fn line_string(line: &Line) -> String {
        line.items()
            .iter()
            .map(|item| match item {
                WrappedItem::Text(t) => t.string.as_str(),
                _ => "",
            })
            .collect()
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(wrap_lines(&[], Pt(100.0)).unwrap().is_empty());
        // even with a nonsensical width
        assert!(wrap_lines(&[], Pt(-5.0)).unwrap().is_empty());
    }

    #[test]
    fn non_positive_width_fails_for_content() {
        let contents = [text(&style(10.0), "hi")];
        assert!(matches!(
            wrap_lines(&contents, Pt::ZERO),
            Err(LayoutError::InvalidWrapWidth(_))
        ));
        assert!(wrap_lines(&contents, Pt(-1.0)).is_err());
    }

    #[test]
    fn newline_count_law() {
        let ts = style(10.0);
        let contents = [text(&ts, "Hello\nthere world! This\nis great stuff.\n")];
        let lines = wrap_lines(&contents, Pt(300.0)).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(line_string(&lines[0]), "Hello");
        assert_eq!(line_string(&lines[1]), "there world! This");
        assert_eq!(line_string(&lines[2]), "is great stuff.");
        assert!(lines[3].is_empty());
        // the trailing blank inherits the previous line's metrics
        assert_eq!(lines[3].line_height(), lines[2].line_height());
        assert_eq!(lines[3].ascent(), lines[2].ascent());
    }

    #[test]
    fn greedy_packing_across_styles() {
        // style A: 4.05/char, line height 9.81; style B: 5.85/char, 14.17
        let a = style(9.0);
        let b = style(13.0);
        let contents = [
            text(&a, "Hello "),
            text(&b, "there "),
            text(&a, "world! This is great stuff."),
        ];
        let lines = wrap_lines(&contents, Pt(90.0)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(line_string(&lines[0]), "Hello there world!");
        assert_eq!(line_string(&lines[1]), "This is great stuff.");
        // the taller style governs the first line's height
        assert!((lines[0].line_height().0 - b.line_height().0).abs() < 1e-4);
        assert!((lines[1].line_height().0 - a.line_height().0).abs() < 1e-4);
        // and the max ascent governs the shared baseline
        assert_eq!(lines[0].ascent(), b.ascent());
    }

    #[test]
    fn width_bound_holds() {
        let ts = style(9.0);
        let contents = [
            text(&ts, "Hello "),
            text(&style(13.0), "there "),
            text(&ts, "world! This is great stuff."),
        ];
        for max in [60.0, 90.0, 150.0, 300.0] {
            for line in wrap_lines(&contents, Pt(max)).unwrap() {
                assert!(
                    line.width() <= Pt(max),
                    "line {:?} wider than {max}",
                    line_string(&line)
                );
            }
        }
    }

    #[test]
    fn narrow_width_breaks_three_lines() {
        let a = style(9.0);
        let b = style(13.0);
        let contents = [
            text(&a, "Hello "),
            text(&b, "there "),
            text(&a, "world! This is great stuff."),
        ];
        let lines = wrap_lines(&contents, Pt(60.0)).unwrap();
        let strings: Vec<String> = lines.iter().map(line_string).collect();
        assert_eq!(strings, ["Hello there", "world! This is", "great stuff."]);
    }

    #[test]
    fn unbreakable_item_gets_its_own_overflowing_line() {
        let ts = style(10.0);
        let contents = [text(&ts, "tiny incomprehensibilities end")];
        let lines = wrap_lines(&contents, Pt(25.0)).unwrap();
        let strings: Vec<String> = lines.iter().map(line_string).collect();
        assert_eq!(strings, ["tiny", "incomprehensibilities", "end"]);
        assert!(lines[1].width() > Pt(25.0));
    }

    #[test]
    fn empty_text_run_still_takes_a_line() {
        let ts = style(10.0);
        let lines = wrap_lines(&[text(&ts, "")], Pt(100.0)).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width(), Pt::ZERO);
        assert_eq!(lines[0].line_height(), ts.line_height());
        assert_eq!(lines[0].ascent(), ts.ascent());
    }

    #[test]
    fn contents_are_cloneable() {
        let ts = style(10.0);
        let contents = vec![text(&ts, "hello world")];
        let copy = contents.clone();
        let a = wrap_lines(&contents, Pt(100.0)).unwrap();
        let b = wrap_lines(&copy, Pt(100.0)).unwrap();
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].width(), b[0].width());
    }

    #[test]
    fn bare_newline_makes_styled_blank_line() {
        let ts = style(10.0);
        let lines = wrap_lines(&[text(&ts, "a\n\nb")], Pt(100.0)).unwrap();
        assert_eq!(lines.len(), 3);
        // the middle line is an empty text row carrying the style's metrics
        assert_eq!(line_string(&lines[1]), "");
        assert_eq!(lines[1].line_height(), ts.line_height());
    }

    #[test]
    fn image_flows_inline_with_text() {
        use crate::image::{Image, ScaledImage};
        use image::DynamicImage;

        let ts = style(10.0);
        let img = Rc::new(Image::new_raster(DynamicImage::new_rgb8(100, 50)));
        // 24 x 12 document units
        let contents = [
            text(&ts, "before "),
            Content::Image(ScaledImage::new(img)),
            text(&ts, " after"),
        ];
        let lines = wrap_lines(&contents, Pt(200.0)).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].items().len(), 3);
        // image bottom sits on the baseline: 12 above, text descent below
        assert_eq!(lines[0].ascent(), Pt(12.0));
        assert!((lines[0].line_height().0 - (12.0 + 2.9)).abs() < 1e-4);
    }
}
