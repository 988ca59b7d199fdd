use derive_more::{Add, AddAssign, Display, Div, From, Into, Mul, MulAssign, Sub, SubAssign, Sum};

/// How many document units make up one inch. PDF calls these "points".
pub const UNITS_PER_INCH: f32 = 72.0;

/// A measurement in points, the base unit of all document geometry (1/72 of an inch).
/// Y values increase from the bottom of the page upward.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Mul,
    MulAssign,
    Div,
    Sum,
    From,
    Into,
    Display,
)]
pub struct Pt(pub f32);

impl Pt {
    pub const ZERO: Pt = Pt(0.0);

    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }

    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    pub fn abs(self) -> Pt {
        Pt(self.0.abs())
    }

    /// The smallest representable value greater than this one.
    pub fn next_up(self) -> Pt {
        Pt(self.0.next_up())
    }
}

impl std::ops::Neg for Pt {
    type Output = Pt;

    fn neg(self) -> Pt {
        Pt(-self.0)
    }
}

/// A measurement in millimetres; convert to [Pt] for layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, From, Into, Display)]
pub struct Mm(pub f32);

/// A measurement in inches; convert to [Pt] for layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, From, Into, Display)]
pub struct In(pub f32);

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Pt {
        Pt(mm.0 * UNITS_PER_INCH / 25.4)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Pt {
        Pt(inches.0 * UNITS_PER_INCH)
    }
}

impl From<Pt> for Mm {
    fn from(pt: Pt) -> Mm {
        Mm(pt.0 * 25.4 / UNITS_PER_INCH)
    }
}

impl From<Pt> for In {
    fn from(pt: Pt) -> In {
        In(pt.0 / UNITS_PER_INCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let one_inch: Pt = In(1.0).into();
        assert_eq!(one_inch, Pt(72.0));
        let a4_width: Pt = Mm(210.0).into();
        assert!((a4_width.0 - 595.27563).abs() < 0.001);
        let back: In = Pt(144.0).into();
        assert_eq!(back, In(2.0));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(Pt(1.0) + Pt(2.0), Pt(3.0));
        assert_eq!(Pt(3.0) - Pt(2.0), Pt(1.0));
        assert_eq!(Pt(3.0) * 2.0, Pt(6.0));
        assert_eq!(Pt(6.0) / 2.0, Pt(3.0));
        assert_eq!(-Pt(6.0), Pt(-6.0));
        assert_eq!(Pt(1.0).max(Pt(2.0)), Pt(2.0));
        let total: Pt = [Pt(1.0), Pt(2.0), Pt(3.0)].into_iter().sum();
        assert_eq!(total, Pt(6.0));
    }
}
