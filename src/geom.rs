use crate::error::LayoutError;
use crate::units::Pt;

/// A width and height. Both are always non-negative.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Dim {
    pub width: Pt,
    pub height: Pt,
}

impl Dim {
    pub const ZERO: Dim = Dim {
        width: Pt::ZERO,
        height: Pt::ZERO,
    };

    pub fn new(width: Pt, height: Pt) -> Result<Dim, LayoutError> {
        if width < Pt::ZERO || height < Pt::ZERO {
            return Err(LayoutError::InvalidDimensions {
                width: width.0,
                height: height.0,
            });
        }
        Ok(Dim { width, height })
    }

    pub fn with_height(self, height: Pt) -> Dim {
        Dim { height, ..self }
    }

    /// Swap the width and height, e.g. to turn a portrait page landscape.
    pub fn swap_wh(self) -> Dim {
        Dim {
            width: self.height,
            height: self.width,
        }
    }

    /// Whether this dimension fits within `outer` on both axes, allowing a
    /// small tolerance for accumulated floating-point error.
    pub fn lte(self, outer: Dim) -> bool {
        const EPSILON: f32 = 0.0001;
        self.width.0 <= outer.width.0 + EPSILON && self.height.0 <= outer.height.0 + EPSILON
    }

    /// Stack dimensions vertically: the max width and the total height.
    pub fn stacked<I: IntoIterator<Item = Dim>>(dims: I) -> Dim {
        dims.into_iter().fold(Dim::ZERO, |acc, d| Dim {
            width: acc.width.max(d.width),
            height: acc.height + d.height,
        })
    }
}

impl std::ops::Add for Dim {
    type Output = Dim;

    fn add(self, rhs: Dim) -> Dim {
        Dim {
            width: self.width + rhs.width,
            height: self.height + rhs.height,
        }
    }
}

impl std::ops::Sub for Dim {
    type Output = Dim;

    /// Subtraction clamps at zero; callers are expected to only subtract
    /// dimensions that fit (debug builds assert this).
    fn sub(self, rhs: Dim) -> Dim {
        debug_assert!(
            rhs.lte(self),
            "subtracting {:?} from smaller {:?}",
            rhs,
            self
        );
        Dim {
            width: (self.width - rhs.width).max(Pt::ZERO),
            height: (self.height - rhs.height).max(Pt::ZERO),
        }
    }
}

/// An (x, y) position on a page. The origin is the lower-left corner of the
/// page and y increases upward, matching PDF device space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: Pt,
    pub y: Pt,
}

impl Coord {
    pub fn new(x: Pt, y: Pt) -> Coord {
        Coord { x, y }
    }

    pub fn with_x(self, x: Pt) -> Coord {
        Coord { x, ..self }
    }

    pub fn with_y(self, y: Pt) -> Coord {
        Coord { y, ..self }
    }

    pub fn plus_x(self, x: Pt) -> Coord {
        Coord {
            x: self.x + x,
            ..self
        }
    }

    pub fn plus_y(self, y: Pt) -> Coord {
        Coord {
            y: self.y + y,
            ..self
        }
    }

    pub fn minus_y(self, y: Pt) -> Coord {
        Coord {
            y: self.y - y,
            ..self
        }
    }

    /// Offset right by the width and down by the height of `dim`: the
    /// opposite corner of a box whose upper-left is this coordinate.
    pub fn plus_x_minus_y(self, dim: Dim) -> Coord {
        Coord {
            x: self.x + dim.width,
            y: self.y - dim.height,
        }
    }

    /// The dimensions of the axis-aligned box with this coordinate and
    /// `other` at opposite corners.
    pub fn dimension_to(self, other: Coord) -> Dim {
        Dim {
            width: (self.x - other.x).abs(),
            height: (self.y - other.y).abs(),
        }
    }
}

/// Interior spacing of a box: top, right, bottom, left. Never negative.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

pub const NO_PADDING: Padding = Padding {
    top: Pt::ZERO,
    right: Pt::ZERO,
    bottom: Pt::ZERO,
    left: Pt::ZERO,
};

impl Padding {
    pub fn new(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Result<Padding, LayoutError> {
        if top < Pt::ZERO || right < Pt::ZERO || bottom < Pt::ZERO || left < Pt::ZERO {
            return Err(LayoutError::InvalidPadding);
        }
        Ok(Padding {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn uniform(amount: Pt) -> Result<Padding, LayoutError> {
        Padding::new(amount, amount, amount, amount)
    }

    pub fn top_bottom(self) -> Pt {
        self.top + self.bottom
    }

    pub fn left_right(self) -> Pt {
        self.left + self.right
    }

    /// Shrink an outer dimension to the interior it leaves available.
    pub fn subtract_from(self, outer: Dim) -> Dim {
        Dim {
            width: (outer.width - self.left_right()).max(Pt::ZERO),
            height: (outer.height - self.top_bottom()).max(Pt::ZERO),
        }
    }

    /// Move an exterior upper-left corner to the interior upper-left corner.
    pub fn apply_top_left(self, outer_top_left: Coord) -> Coord {
        Coord {
            x: outer_top_left.x + self.left,
            y: outer_top_left.y - self.top,
        }
    }
}

/// The rectangle of a page that content flows within, anchored by its
/// lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageArea {
    pub lower_left: Coord,
    pub dim: Dim,
}

impl PageArea {
    pub fn top_left(self) -> Coord {
        self.lower_left.plus_y(self.dim.height)
    }

    pub fn y_top(self) -> Pt {
        self.lower_left.y + self.dim.height
    }

    pub fn y_bottom(self) -> Pt {
        self.lower_left.y
    }
}

/// An inclusive range of document-wide page indices that a piece of rendered
/// content touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: isize,
    pub last: isize,
}

/// The identity for [PageRange::max_extents]: unioning any real range with
/// this one yields the real range unchanged.
pub const INVALID_PAGE_RANGE: PageRange = PageRange {
    first: isize::MAX,
    last: isize::MIN,
};

impl PageRange {
    pub fn new(first: isize, last: isize) -> PageRange {
        PageRange { first, last }
    }

    pub fn single(page: isize) -> PageRange {
        PageRange {
            first: page,
            last: page,
        }
    }

    pub fn is_valid(self) -> bool {
        self.first <= self.last
    }

    /// The smallest range covering both ranges.
    pub fn max_extents(self, other: PageRange) -> PageRange {
        PageRange {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

/// The outcome of rendering one piece of content: the space it consumed and
/// the pages it touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimAndPageNums {
    pub dim: Dim,
    pub page_nums: PageRange,
}

impl DimAndPageNums {
    pub const INVALID: DimAndPageNums = DimAndPageNums {
        dim: Dim::ZERO,
        page_nums: INVALID_PAGE_RANGE,
    };

    pub fn max_extents(self, other: PageRange) -> PageRange {
        self.page_nums.max_extents(other)
    }
}

/// The height a single draw command consumed (including any page-break
/// adjustment) and the page it landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightAndPage {
    pub height: Pt,
    pub page: isize,
}

impl HeightAndPage {
    pub fn dim_and_pages_from_width(self, width: Pt) -> DimAndPageNums {
        DimAndPageNums {
            dim: Dim {
                width,
                height: self.height,
            },
            page_nums: PageRange::single(self.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_validates() {
        assert!(Dim::new(Pt(-1.0), Pt(1.0)).is_err());
        assert!(Dim::new(Pt(1.0), Pt(-1.0)).is_err());
        let d = Dim::new(Pt(3.0), Pt(4.0)).unwrap();
        assert_eq!(d.swap_wh(), Dim::new(Pt(4.0), Pt(3.0)).unwrap());
    }

    #[test]
    fn dim_lte_tolerates_float_noise() {
        let inner = Dim::new(Pt(10.00005), Pt(5.0)).unwrap();
        let outer = Dim::new(Pt(10.0), Pt(5.0)).unwrap();
        assert!(inner.lte(outer));
        assert!(!Dim::new(Pt(10.1), Pt(5.0)).unwrap().lte(outer));
    }

    #[test]
    fn dim_stacked() {
        let stacked = Dim::stacked([
            Dim::new(Pt(10.0), Pt(2.0)).unwrap(),
            Dim::new(Pt(4.0), Pt(3.0)).unwrap(),
        ]);
        assert_eq!(stacked, Dim::new(Pt(10.0), Pt(5.0)).unwrap());
    }

    #[test]
    fn padding_round_trip() {
        let padding = Padding::new(Pt(1.0), Pt(2.0), Pt(3.0), Pt(4.0)).unwrap();
        let outer = Dim::new(Pt(100.0), Pt(50.0)).unwrap();
        let interior = padding.subtract_from(outer);
        assert_eq!(
            interior + Dim::new(padding.left_right(), padding.top_bottom()).unwrap(),
            outer
        );
        assert!(Padding::new(Pt(-0.1), Pt::ZERO, Pt::ZERO, Pt::ZERO).is_err());
    }

    #[test]
    fn padding_top_left() {
        let padding = Padding::uniform(Pt(2.0)).unwrap();
        let inner = padding.apply_top_left(Coord::new(Pt(10.0), Pt(90.0)));
        assert_eq!(inner, Coord::new(Pt(12.0), Pt(88.0)));
    }

    #[test]
    fn coord_box_corners() {
        let top_left = Coord::new(Pt(10.0), Pt(100.0));
        let dim = Dim::new(Pt(30.0), Pt(20.0)).unwrap();
        let bottom_right = top_left.plus_x_minus_y(dim);
        assert_eq!(bottom_right, Coord::new(Pt(40.0), Pt(80.0)));
        assert_eq!(top_left.dimension_to(bottom_right), dim);
        assert_eq!(bottom_right.dimension_to(top_left), dim);
    }

    #[test]
    fn page_range_union_laws() {
        let r = PageRange::new(3, 5);
        assert_eq!(INVALID_PAGE_RANGE.max_extents(r), r);
        assert_eq!(r.max_extents(INVALID_PAGE_RANGE), r);
        assert_eq!(
            PageRange::new(0, 1).max_extents(PageRange::new(1, 2)),
            PageRange::new(0, 2)
        );
        assert_eq!(
            PageRange::new(0, 1).max_extents(PageRange::new(-1, 0)),
            PageRange::new(-1, 1)
        );
        assert!(!INVALID_PAGE_RANGE.is_valid());
        assert!(PageRange::single(7).is_valid());
    }

    #[test]
    fn height_and_page_to_dim() {
        let hp = HeightAndPage {
            height: Pt(12.0),
            page: 2,
        };
        let dp = hp.dim_and_pages_from_width(Pt(40.0));
        assert_eq!(dp.dim, Dim::new(Pt(40.0), Pt(12.0)).unwrap());
        assert_eq!(dp.page_nums, PageRange::single(2));
    }
}
