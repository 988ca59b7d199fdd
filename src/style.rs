use crate::colour::{colours, Colour};
use crate::error::LayoutError;
use crate::geom::{Coord, Dim, Padding, NO_PADDING};
use crate::units::Pt;

/// The stroke style of a line: a colour and a thickness. A zero thickness
/// means the line is not drawn at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub colour: Colour,
    pub thickness: Pt,
}

pub const NO_LINE: LineStyle = LineStyle {
    colour: colours::BLACK,
    thickness: Pt::ZERO,
};

impl LineStyle {
    pub fn new(colour: Colour, thickness: Pt) -> Result<LineStyle, LayoutError> {
        if thickness < Pt::ZERO {
            return Err(LayoutError::InvalidLineThickness(thickness.0));
        }
        Ok(LineStyle { colour, thickness })
    }

    /// A one-unit-thick line of the given colour.
    pub fn hairline(colour: Colour) -> LineStyle {
        LineStyle {
            colour,
            thickness: Pt(1.0),
        }
    }

    pub fn is_drawn(self) -> bool {
        self.thickness > Pt::ZERO
    }
}

/// How adjoining line segments are joined when stroking a strip or loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl JoinStyle {
    /// The PDF line join parameter for the `j` operator.
    pub(crate) fn operator_value(self) -> u8 {
        match self {
            JoinStyle::Miter => 0,
            JoinStyle::Round => 1,
            JoinStyle::Bevel => 2,
        }
    }
}

/// Line styles for the four edges of a box. Any edge may be [NO_LINE].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStyle {
    pub top: LineStyle,
    pub right: LineStyle,
    pub bottom: LineStyle,
    pub left: LineStyle,
}

pub const NO_BORDERS: BorderStyle = BorderStyle {
    top: NO_LINE,
    right: NO_LINE,
    bottom: NO_LINE,
    left: NO_LINE,
};

impl BorderStyle {
    pub fn uniform(line: LineStyle) -> BorderStyle {
        BorderStyle {
            top: line,
            right: line,
            bottom: line,
            left: line,
        }
    }
}

/// The box model around a piece of content: padding, an optional background
/// colour, and a border. Borders straddle the box edge, so half of each
/// border's thickness intrudes into the interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub padding: Padding,
    pub background: Option<Colour>,
    pub border: BorderStyle,
}

pub const NO_PAD_NO_BORDER: BoxStyle = BoxStyle {
    padding: NO_PADDING,
    background: None,
    border: NO_BORDERS,
};

impl BoxStyle {
    pub fn new(padding: Padding, background: Option<Colour>, border: BorderStyle) -> BoxStyle {
        BoxStyle {
            padding,
            background,
            border,
        }
    }

    pub fn interior_space_top(self) -> Pt {
        self.padding.top + self.border.top.thickness / 2.0
    }

    pub fn interior_space_right(self) -> Pt {
        self.padding.right + self.border.right.thickness / 2.0
    }

    pub fn interior_space_bottom(self) -> Pt {
        self.padding.bottom + self.border.bottom.thickness / 2.0
    }

    pub fn interior_space_left(self) -> Pt {
        self.padding.left + self.border.left.thickness / 2.0
    }

    pub fn top_bottom_interior_space(self) -> Pt {
        self.interior_space_top() + self.interior_space_bottom()
    }

    pub fn left_right_interior_space(self) -> Pt {
        self.interior_space_left() + self.interior_space_right()
    }

    /// Shrink an exterior dimension to the interior available for content.
    pub fn subtract_from(self, outer: Dim) -> Dim {
        Dim {
            width: (outer.width - self.left_right_interior_space()).max(Pt::ZERO),
            height: (outer.height - self.top_bottom_interior_space()).max(Pt::ZERO),
        }
    }

    /// Move an exterior upper-left corner to the interior upper-left corner.
    pub fn apply_top_left(self, outer_top_left: Coord) -> Coord {
        Coord {
            x: outer_top_left.x + self.interior_space_left(),
            y: outer_top_left.y - self.interior_space_top(),
        }
    }
}

/// Where content sits inside a box bigger than itself: one of nine anchors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Align {
    /// The horizontal offset of content `inner_width` wide inside a box
    /// `outer_width` wide.
    pub fn left_offset(self, outer_width: Pt, inner_width: Pt) -> Pt {
        match self {
            Align::TopLeft | Align::MiddleLeft | Align::BottomLeft => Pt::ZERO,
            Align::TopCenter | Align::MiddleCenter | Align::BottomCenter => {
                (outer_width - inner_width) / 2.0
            }
            Align::TopRight | Align::MiddleRight | Align::BottomRight => {
                outer_width - inner_width
            }
        }
    }

    /// The upper-left corner of content of dimension `inner` anchored inside
    /// a box of dimension `outer` whose upper-left corner is `outer_top_left`.
    pub fn inner_top_left(self, outer: Dim, inner: Dim, outer_top_left: Coord) -> Coord {
        let x = outer_top_left.x + self.left_offset(outer.width, inner.width);
        let y = match self {
            Align::TopLeft | Align::TopCenter | Align::TopRight => outer_top_left.y,
            Align::MiddleLeft | Align::MiddleCenter | Align::MiddleRight => {
                outer_top_left.y - (outer.height - inner.height) / 2.0
            }
            Align::BottomLeft | Align::BottomCenter | Align::BottomRight => {
                outer_top_left.y - (outer.height - inner.height)
            }
        };
        Coord { x, y }
    }
}

/// The full visual style of a cell: where content is anchored plus the box
/// model around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    pub align: Align,
    pub box_style: BoxStyle,
}

pub const TOP_LEFT_BORDERLESS: CellStyle = CellStyle {
    align: Align::TopLeft,
    box_style: NO_PAD_NO_BORDER,
};

impl CellStyle {
    pub fn new(align: Align, box_style: BoxStyle) -> CellStyle {
        CellStyle { align, box_style }
    }

    pub fn with_align(self, align: Align) -> CellStyle {
        CellStyle { align, ..self }
    }
}
