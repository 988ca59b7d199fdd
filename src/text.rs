use std::rc::Rc;

use crate::colour::Colour;
use crate::font::FontMetrics;
use crate::geom::{Coord, Dim, DimAndPageNums};
use crate::page::RenderTarget;
use crate::units::Pt;

/// A font, size, and colour for a run of text, with the vertical metrics
/// pre-computed so layout never goes back to the font for them.
#[derive(Clone)]
pub struct TextStyle {
    pub font: Rc<dyn FontMetrics>,
    pub size: Pt,
    pub colour: Colour,
    ascent: Pt,
    line_height: Pt,
    avg_char_width: Pt,
}

impl TextStyle {
    pub fn new(font: Rc<dyn FontMetrics>, size: Pt, colour: Colour) -> TextStyle {
        let line_height = font.line_height(size);
        TextStyle::with_line_height(font, size, colour, line_height)
    }

    /// Like [TextStyle::new] but with an explicit line height, e.g. for
    /// single-spaced or padded text.
    pub fn with_line_height(
        font: Rc<dyn FontMetrics>,
        size: Pt,
        colour: Colour,
        line_height: Pt,
    ) -> TextStyle {
        let ascent = font.ascent(size);
        let avg_char_width = font.avg_char_width(size);
        TextStyle {
            font,
            size,
            colour,
            ascent,
            line_height,
            avg_char_width,
        }
    }

    pub fn ascent(&self) -> Pt {
        self.ascent
    }

    /// Everything below the baseline: descent plus leading. With a line
    /// height override this absorbs the override too.
    pub fn descent_and_leading(&self) -> Pt {
        self.line_height - self.ascent
    }

    pub fn line_height(&self) -> Pt {
        self.line_height
    }

    pub fn avg_char_width(&self) -> Pt {
        self.avg_char_width
    }

    pub fn string_width(&self, text: &str) -> Pt {
        self.font.advance_width(self.size, text)
    }

    /// The address of the underlying font allocation, used to match this
    /// style back to a document-registered font at write time.
    pub(crate) fn font_ptr(&self) -> *const () {
        Rc::as_ptr(&self.font) as *const ()
    }
}

impl std::fmt::Debug for TextStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStyle")
            .field("size", &self.size)
            .field("colour", &self.colour)
            .field("line_height", &self.line_height)
            .finish()
    }
}

impl PartialEq for TextStyle {
    fn eq(&self, other: &Self) -> bool {
        self.font_ptr() == other.font_ptr()
            && self.size == other.size
            && self.colour == other.colour
            && self.line_height == other.line_height
    }
}

/// Normalize text before wrapping: remove all tabs (there is no good
/// assumption for how wide they are), turn every line terminator into `\n`,
/// and drop runs of spaces that precede a hard break. Consecutive spaces
/// within a line are preserved.
pub fn clean_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\t' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                push_hard_break(&mut out);
            }
            '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}' => push_hard_break(&mut out),
            _ => out.push(ch),
        }
    }
    out
}

fn push_hard_break(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

/// A run of text in a single style, like a text node in HTML. Embedded `\n`
/// characters force line breaks; all other line breaks are chosen by the
/// wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub style: TextStyle,
    content: String,
}

impl Text {
    pub fn new(style: TextStyle, content: impl Into<String>) -> Text {
        Text {
            style,
            content: clean_str(&content.into()),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A single already-measured row of single-style text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub style: TextStyle,
    pub string: String,
    pub width: Pt,
}

impl WrappedText {
    pub(crate) fn new(style: TextStyle, string: String) -> WrappedText {
        let width = style.string_width(&string);
        WrappedText {
            style,
            string,
            width,
        }
    }

    pub fn dim(&self) -> Dim {
        Dim {
            width: self.width,
            height: self.style.line_height(),
        }
    }

    pub fn ascent(&self) -> Pt {
        self.style.ascent()
    }

    /// A copy with any trailing spaces removed, applied to the last item on
    /// a completed line so alignment is not thrown off by a break space.
    pub(crate) fn without_trailing_space(&self) -> WrappedText {
        if self.string.ends_with(' ') {
            WrappedText::new(self.style.clone(), self.string.trim_end_matches(' ').into())
        } else {
            self.clone()
        }
    }

    pub(crate) fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        let hp = lp.draw_styled_text(
            top_left.minus_y(self.style.ascent()),
            &self.string,
            &self.style,
            really_render,
        );
        hp.dim_and_pages_from_width(self.width)
    }
}

/// How far text wrapping has progressed: the row produced, the index of the
/// next character to consume, and whether the row ended at a hard break.
pub(crate) struct RowIdx {
    pub row: WrappedText,
    pub idx: usize,
    pub found_cr: bool,
}

/// Incrementally breaks one [Text] into [WrappedText] rows.
pub(crate) struct TextWrapper<'a> {
    text: &'a Text,
    chars: Vec<char>,
    idx: usize,
}

impl<'a> TextWrapper<'a> {
    pub fn new(text: &'a Text) -> TextWrapper<'a> {
        TextWrapper {
            text,
            chars: text.content().chars().collect(),
            idx: 0,
        }
    }

    pub fn has_more(&self) -> bool {
        self.idx < self.chars.len()
    }

    /// Take the longest row that fits in `max_width`, always producing
    /// something, even a row that overflows when a single word is wider than
    /// the whole line. Returns `(row, terminal, has_more)`.
    pub fn get_something(&mut self, max_width: Pt) -> (WrappedText, bool, bool) {
        let row_idx = try_getting_text(max_width, self.idx, &self.chars, &self.text.style);
        self.idx = row_idx.idx;
        (row_idx.row, row_idx.found_cr, self.has_more())
    }

    /// Like [TextWrapper::get_something] but refuses rather than overflow:
    /// `None` when nothing fits in the remaining width.
    pub fn get_if_fits(&mut self, remaining_width: Pt) -> Option<(WrappedText, bool, bool)> {
        if remaining_width <= Pt::ZERO {
            return None;
        }
        let row_idx = try_getting_text(remaining_width, self.idx, &self.chars, &self.text.style);
        if row_idx.row.width <= remaining_width {
            self.idx = row_idx.idx;
            let has_more = self.has_more();
            Some((row_idx.row, row_idx.found_cr, has_more))
        } else {
            None
        }
    }
}

/// Find the longest prefix of `chars[start_idx..]` (stopping at any hard
/// break) that fits in `max_width`, breaking at whitespace. Guessing from the
/// average character width lands near the right word, then the exact break is
/// found by growing word-by-word and shrinking back.
pub(crate) fn try_getting_text(
    max_width: Pt,
    start_idx: usize,
    chars: &[char],
    style: &TextStyle,
) -> RowIdx {
    debug_assert!(max_width > Pt::ZERO);
    debug_assert!(start_idx < chars.len());

    let (end, found_cr) = match chars[start_idx..].iter().position(|&c| c == '\n') {
        Some(p) => (start_idx + p, true),
        None => (chars.len(), false),
    };
    let text = &chars[start_idx..end];
    let text_len = text.len();

    let width_of = |n: usize| style.string_width(&text[..n].iter().collect::<String>());

    // Knowing the average width of a character lets us guess and generally be
    // near the word where the line break will occur. Since the font reports a
    // narrow average (possibly due to the predominance of spaces in text) we
    // widen it a little for a better first guess.
    let guess = (max_width.0 * 1.22 / style.avg_char_width().0) as usize;
    let mut len = guess.min(text_len);
    let mut str_width = width_of(len);

    // If too short, find the shortest string that is too long.
    while str_width < max_width && len < text_len {
        // consume any whitespace, then run to the end of the next word
        while len < text_len && text[len].is_whitespace() {
            len += 1;
        }
        while len < text_len && !text[len].is_whitespace() {
            len += 1;
        }
        str_width = width_of(len);
    }

    // Too long: find the longest string that is short enough, scanning
    // backward a whitespace run at a time.
    if str_width > max_width {
        let mut i = len as isize - 1;
        loop {
            while i > -1 && !text[i as usize].is_whitespace() {
                i -= 1;
            }
            while i > -1 && text[i as usize].is_whitespace() {
                i -= 1;
            }
            if i < 1 {
                // No break point: the first word goes in whole and runs over.
                len = 0;
                while len < text_len && text[len].is_whitespace() {
                    len += 1;
                }
                while len < text_len && !text[len].is_whitespace() {
                    len += 1;
                }
                str_width = width_of(len);
                break;
            }
            len = i as usize + 1;
            str_width = width_of(len);
            if str_width <= max_width {
                break;
            }
        }
    }
    let _ = str_width;

    let row = WrappedText::new(style.clone(), text[..len].iter().collect());
    // the +1 consumes the break character (a space or the hard break itself)
    RowIdx {
        row,
        idx: start_idx + len + 1,
        found_cr: found_cr && len == text_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::test_util::FakeFont;

    fn style(size: f32) -> TextStyle {
        TextStyle::new(Rc::new(FakeFont), Pt(size), colours::BLACK)
    }

    #[test]
    fn clean_str_normalizes_terminators() {
        assert_eq!(clean_str("a\r\nb\rc\nd\u{2029}e"), "a\nb\nc\nd\ne");
        assert_eq!(clean_str("tabs\tgone"), "tabsgone");
        assert_eq!(clean_str("trailing   \nnext"), "trailing\nnext");
        assert_eq!(clean_str("keep  inner  spaces"), "keep  inner  spaces");
    }

    #[test]
    fn cached_metrics() {
        let ts = style(10.0);
        assert_eq!(ts.ascent(), Pt(8.0));
        assert_eq!(ts.line_height(), Pt(10.9));
        assert!((ts.descent_and_leading().0 - 2.9).abs() < 1e-5);
        assert_eq!(ts.avg_char_width(), Pt(4.5));
        assert_eq!(ts.string_width("ab"), Pt(9.0));
    }

    #[test]
    fn wrapper_breaks_at_spaces() {
        // 4.5/char at size 10; "hello world again" = 17 chars
        let text = Text::new(style(10.0), "hello world again");
        let mut wrapper = TextWrapper::new(&text);
        let (row, terminal, has_more) = wrapper.get_something(Pt(55.0));
        assert_eq!(row.string, "hello world");
        assert!(!terminal);
        assert!(has_more);
        let (row, _, has_more) = wrapper.get_something(Pt(55.0));
        assert_eq!(row.string, "again");
        assert!(!has_more);
    }

    #[test]
    fn wrapper_stops_at_hard_break() {
        let text = Text::new(style(10.0), "ab\ncd");
        let mut wrapper = TextWrapper::new(&text);
        let (row, terminal, _) = wrapper.get_something(Pt(1000.0));
        assert_eq!(row.string, "ab");
        assert!(terminal);
        let (row, terminal, has_more) = wrapper.get_something(Pt(1000.0));
        assert_eq!(row.string, "cd");
        assert!(!terminal);
        assert!(!has_more);
    }

    #[test]
    fn too_long_word_overflows_one_row() {
        let text = Text::new(style(10.0), "incomprehensibilities");
        let mut wrapper = TextWrapper::new(&text);
        let (row, _, has_more) = wrapper.get_something(Pt(20.0));
        assert_eq!(row.string, "incomprehensibilities");
        assert!(row.width > Pt(20.0));
        assert!(!has_more);
    }

    #[test]
    fn get_if_fits_refuses_overflow() {
        let text = Text::new(style(10.0), "hello");
        let mut wrapper = TextWrapper::new(&text);
        assert!(wrapper.get_if_fits(Pt(10.0)).is_none());
        assert!(wrapper.get_if_fits(Pt::ZERO).is_none());
        let (row, _, _) = wrapper.get_if_fits(Pt(23.0)).unwrap();
        assert_eq!(row.string, "hello");
        assert_eq!(row.width, Pt(22.5));
    }

    #[test]
    fn trailing_space_trim() {
        let wt = WrappedText::new(style(10.0), "word  ".into());
        let trimmed = wt.without_trailing_space();
        assert_eq!(trimmed.string, "word");
        assert_eq!(trimmed.width, Pt(18.0));
    }
}
