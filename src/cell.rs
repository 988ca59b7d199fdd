use crate::error::LayoutError;
use crate::geom::{Coord, Dim, DimAndPageNums, INVALID_PAGE_RANGE};
use crate::page::RenderTarget;
use crate::style::{CellStyle, NO_BORDERS, TOP_LEFT_BORDERLESS};
use crate::units::Pt;
use crate::wrap::{wrap_lines, Content, Line};

/// A styled box of content with a pre-set width: a table cell, or a
/// free-standing block. Height is never given; it falls out of wrapping the
/// contents at the interior width.
#[derive(Clone)]
pub struct Cell {
    pub style: CellStyle,
    pub width: Pt,
    pub contents: Vec<Content>,
    /// Keep at least this much vertical space under the cell at the end of a
    /// page, rolling the whole cell to the next page when it can't be had.
    pub required_space_below: Pt,
}

impl Cell {
    pub fn new(style: CellStyle, width: Pt, contents: Vec<Content>) -> Result<Cell, LayoutError> {
        Cell::with_required_space_below(style, width, contents, Pt::ZERO)
    }

    pub fn with_required_space_below(
        style: CellStyle,
        width: Pt,
        contents: Vec<Content>,
        required_space_below: Pt,
    ) -> Result<Cell, LayoutError> {
        if width < Pt::ZERO {
            return Err(LayoutError::InvalidCellWidth(width.0));
        }
        Ok(Cell {
            style,
            width,
            contents,
            required_space_below,
        })
    }

    /// A borderless, unpadded, top-left-aligned cell.
    pub fn plain(width: Pt, contents: Vec<Content>) -> Result<Cell, LayoutError> {
        Cell::new(TOP_LEFT_BORDERLESS, width, contents)
    }

    /// Wraps the contents at the cell's interior width, fixing the cell's
    /// height.
    pub fn wrap(&self) -> Result<WrappedCell, LayoutError> {
        let interior_width = self.width - self.style.box_style.left_right_interior_space();
        let lines = wrap_lines(&self.contents, interior_width)?;
        let height = self.style.box_style.top_bottom_interior_space()
            + lines.iter().map(|line| line.dim().height).sum::<Pt>();
        Ok(WrappedCell {
            dim: Dim {
                width: self.width,
                height,
            },
            style: self.style,
            lines,
            required_space_below: self.required_space_below,
        })
    }
}

/// A cell whose contents have been wrapped, fixing its dimensions (measured
/// on the border lines).
pub struct WrappedCell {
    dim: Dim,
    style: CellStyle,
    lines: Vec<Line>,
    required_space_below: Pt,
}

impl WrappedCell {
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// The contents stacked up, before alignment: the widest line by the
    /// total height.
    fn wrapped_block_dim(&self) -> Dim {
        Dim::stacked(self.lines.iter().map(Line::dim))
    }

    pub fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        self.render_custom(lp, top_left, self.dim.height, really_render)
    }

    /// Renders the cell stretched to `height` when that is taller than its
    /// natural height. Table rows use this so every cell in a row comes out
    /// the same height.
    pub fn render_custom(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        height: Pt,
        really_render: bool,
    ) -> DimAndPageNums {
        let adj = if self.required_space_below == Pt::ZERO {
            Pt::ZERO
        } else {
            lp.page_breaking_top_margin(
                top_left.y - self.dim.height,
                self.dim.height,
                self.required_space_below,
            )
        };
        let top_left = top_left.minus_y(adj);

        let box_style = self.style.box_style;
        let final_dim = if self.dim.height < height {
            self.dim.with_height(height)
        } else {
            self.dim
        };
        let inner_dim = box_style.subtract_from(final_dim);
        let block_dim = self.wrapped_block_dim();
        let inner_top_left =
            self.style
                .align
                .inner_top_left(inner_dim, block_dim, box_style.apply_top_left(top_left));

        let mut page_nums = INVALID_PAGE_RANGE;
        // y is always the bottom of the lowest line rendered so far
        let mut y = inner_top_left.y;
        for line in &self.lines {
            let x_offset = self.style.align.left_offset(block_dim.width, line.dim().width);
            let rendered = line.render(
                lp,
                Coord::new(inner_top_left.x + x_offset, y),
                really_render,
            );
            y -= rendered.dim.height;
            page_nums = rendered.max_extents(page_nums);
        }
        y = y.min(top_left.y - height);

        // contents go over the background but under the border
        if let Some(background) = box_style.background {
            lp.fill_rect(
                top_left.with_y(y),
                self.dim.with_height(top_left.y - y),
                background,
                really_render,
            );
        }

        let right_x = top_left.x + self.dim.width;
        if box_style.border != NO_BORDERS {
            let border = box_style.border;
            let top_right = Coord::new(right_x, top_left.y);
            let bottom_right = Coord::new(right_x, y);
            let bottom_left = Coord::new(top_left.x, y);

            // Each edge is its own line, not one strip: a page break would
            // cut the strip apart anyway.
            if border.top.is_drawn() {
                lp.draw_line(top_left, top_right, &border.top, really_render);
            }
            if border.right.is_drawn() {
                lp.draw_line(top_right, bottom_right, &border.right, really_render);
            }
            if border.bottom.is_drawn() {
                lp.draw_line(bottom_right, bottom_left, &border.bottom, really_render);
            }
            if border.left.is_drawn() {
                lp.draw_line(bottom_left, top_left, &border.left, really_render);
            }
        }

        DimAndPageNums {
            dim: Dim {
                width: self.dim.width,
                height: (top_left.y - y) + adj,
            },
            page_nums,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::document::{Document, Orientation};
    use crate::geom::{Padding, PageArea};
    use crate::page::SinglePage;
    use crate::style::{Align, BorderStyle, BoxStyle, LineStyle};
    use crate::test_util::FakeFont;
    use crate::text::{Text, TextStyle};
    use std::rc::Rc;

    fn style_10pt() -> TextStyle {
        TextStyle::new(Rc::new(FakeFont), Pt(10.0), colours::BLACK)
    }

    fn single_page() -> SinglePage {
        SinglePage::new(
            0,
            Dim::new(Pt(200.0), Pt(300.0)).unwrap(),
            PageArea {
                lower_left: Coord::new(Pt(10.0), Pt(10.0)),
                dim: Dim::new(Pt(180.0), Pt(280.0)).unwrap(),
            },
        )
    }

    #[test]
    fn negative_width_is_rejected() {
        assert!(matches!(
            Cell::plain(Pt(-1.0), vec![]),
            Err(LayoutError::InvalidCellWidth(_))
        ));
    }

    #[test]
    fn wrapping_fixes_the_height() {
        // interior width 46: "aaaa bbbb" fits, "cccc" goes to a second line
        let cell_style = CellStyle::new(
            Align::TopLeft,
            BoxStyle::new(Padding::uniform(Pt(2.0)).unwrap(), None, NO_BORDERS),
        );
        let cell = Cell::new(
            cell_style,
            Pt(50.0),
            vec![Text::new(style_10pt(), "aaaa bbbb cccc").into()],
        )
        .unwrap();
        let wrapped = cell.wrap().unwrap();
        assert_eq!(wrapped.dim().width, Pt(50.0));
        // 2 lines of 10.9 plus 2pt of padding top and bottom
        assert!((wrapped.dim().height.0 - 25.8).abs() < 1e-4);
    }

    #[test]
    fn background_and_borders_cover_the_stretched_height() {
        let cell_style = CellStyle::new(
            Align::TopLeft,
            BoxStyle::new(
                Padding::uniform(Pt(5.0)).unwrap(),
                Some(colours::RED),
                BorderStyle::uniform(LineStyle::hairline(colours::BLACK)),
            ),
        );
        let cell = Cell::new(cell_style, Pt(60.0), vec![]).unwrap();
        let wrapped = cell.wrap().unwrap();

        let mut page = single_page();
        let rendered =
            wrapped.render_custom(&mut page, Coord::new(Pt(20.0), Pt(100.0)), Pt(40.0), true);
        assert_eq!(rendered.dim, Dim::new(Pt(60.0), Pt(40.0)).unwrap());

        let content = String::from_utf8(page.render(&[], &[]).unwrap()).unwrap();
        // background runs the full stretched height, under the borders
        assert!(content.contains("20 60 60 40 re"), "{content}");
        // all four border edges stroked
        assert_eq!(content.matches(" m\n").count(), 4, "{content}");
    }

    #[test]
    fn natural_render_uses_the_wrapped_height() {
        let cell_style = CellStyle::new(
            Align::TopLeft,
            BoxStyle::new(
                Padding::uniform(Pt(10.0)).unwrap(),
                Some(colours::BLUE),
                NO_BORDERS,
            ),
        );
        let cell = Cell::new(cell_style, Pt(60.0), vec![]).unwrap();
        let wrapped = cell.wrap().unwrap();
        assert_eq!(wrapped.dim().height, Pt(20.0));

        let mut page = single_page();
        let rendered = wrapped.render(&mut page, Coord::new(Pt(20.0), Pt(100.0)), true);
        assert_eq!(rendered.dim.height, Pt(20.0));
    }

    #[test]
    fn required_space_below_rolls_the_cell_to_the_next_page() {
        let cell_style = CellStyle::new(
            Align::TopLeft,
            BoxStyle::new(
                Padding::uniform(Pt(10.0)).unwrap(),
                Some(colours::RED),
                NO_BORDERS,
            ),
        );
        // natural height 20 from padding alone
        let cell =
            Cell::with_required_space_below(cell_style, Pt(100.0), vec![], Pt(10.0)).unwrap();
        let wrapped = cell.wrap().unwrap();

        let mut doc = Document::new(Dim::new(Pt(200.0), Pt(300.0)).unwrap());
        let body = PageArea {
            lower_left: Coord::new(Pt(10.0), Pt(10.0)),
            dim: Dim::new(Pt(180.0), Pt(280.0)).unwrap(),
        };
        let mut lp = doc
            .start_page_grouping(Orientation::Portrait, Some(body))
            .unwrap();
        // only 5pt would remain below the cell on the first page
        let rendered = wrapped.render(&mut lp, Coord::new(Pt(20.0), Pt(25.0)), true);
        // 15pt of top margin pushed it to the top of the next page
        assert_eq!(rendered.dim.height, Pt(35.0));
        assert_eq!(lp.page_num_for(Pt(25.0) - Pt(15.0) - Pt(20.0)), 1);
        let doc = lp.commit();
        assert_eq!(doc.page_count(), 2);
    }
}
