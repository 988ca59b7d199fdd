use crate::font::FontMetrics;
use crate::units::Pt;

/// Deterministic font metrics for layout tests, shaped like a 1000-upem face:
/// ascender 800, descender -200, line gap 90, every glyph 450 units wide.
pub struct FakeFont;

impl FontMetrics for FakeFont {
    fn ascent(&self, size: Pt) -> Pt {
        size * 0.8
    }

    fn descent(&self, size: Pt) -> Pt {
        size * -0.2
    }

    fn leading(&self, size: Pt) -> Pt {
        size * 0.09
    }

    fn advance_width(&self, size: Pt, text: &str) -> Pt {
        size * 0.45 * text.chars().count() as f32
    }
}
