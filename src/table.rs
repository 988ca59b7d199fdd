use crate::cell::{Cell, WrappedCell};
use crate::error::LayoutError;
use crate::geom::{Coord, Dim, DimAndPageNums, INVALID_PAGE_RANGE};
use crate::page::RenderTarget;
use crate::style::{Align, CellStyle, TOP_LEFT_BORDERLESS};
use crate::text::{Text, TextStyle};
use crate::units::Pt;
use crate::wrap::Content;

/// A table with fixed column widths. This strives to remind the programmer
/// of HTML tables, though since paper neither resizes nor scrolls it is
/// fundamentally different: column widths are set up front and every row
/// takes the height of its tallest cell.
///
/// Build it a row at a time:
/// ```
/// use pdf_flow::*;
/// # use std::rc::Rc;
/// # struct F;
/// # impl FontMetrics for F {
/// #     fn ascent(&self, size: Pt) -> Pt { Pt(size.0 * 0.8) }
/// #     fn descent(&self, size: Pt) -> Pt { Pt(size.0 * -0.2) }
/// #     fn leading(&self, size: Pt) -> Pt { Pt(size.0 * 0.09) }
/// #     fn advance_width(&self, size: Pt, text: &str) -> Pt {
/// #         Pt(size.0 * 0.45 * text.chars().count() as f32)
/// #     }
/// # }
/// # fn main() -> Result<(), LayoutError> {
/// # let style = TextStyle::new(Rc::new(F), Pt(10.0), colours::BLACK);
/// let table = Table::new(vec![Pt(120.0), Pt(80.0)])?
///     .text_style(style)
///     .start_row()
///     .text_cells(["Name", "Qty"])?
///     .end_row()
///     .start_row()
///     .align(Align::TopRight)
///     .text_cells(["Widgets", "17"])?
///     .end_row();
/// let wrapped = table.wrap()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Table {
    pub cell_widths: Vec<Pt>,
    pub cell_style: CellStyle,
    pub text_style: Option<TextStyle>,
    pub min_row_height: Pt,
    rows: Vec<TableRow>,
}

#[derive(Clone)]
struct TableRow {
    min_row_height: Pt,
    cells: Vec<Cell>,
}

impl Table {
    pub fn new(cell_widths: Vec<Pt>) -> Result<Table, LayoutError> {
        if let Some(width) = cell_widths.iter().find(|w| **w < Pt::ZERO) {
            return Err(LayoutError::InvalidCellWidth(width.0));
        }
        Ok(Table {
            cell_widths,
            cell_style: TOP_LEFT_BORDERLESS,
            text_style: None,
            min_row_height: Pt::ZERO,
            rows: Vec::new(),
        })
    }

    /// The default style for cells added through the row builder.
    pub fn cell_style(mut self, cell_style: CellStyle) -> Table {
        self.cell_style = cell_style;
        self
    }

    /// The style [TableRowBuilder::text_cells] wraps bare strings in.
    pub fn text_style(mut self, text_style: TextStyle) -> Table {
        self.text_style = Some(text_style);
        self
    }

    pub fn min_row_height(mut self, height: Pt) -> Table {
        self.min_row_height = height;
        self
    }

    /// Starts a row. The builder takes the table over until
    /// [TableRowBuilder::end_row] hands it back, so a half-built row can
    /// never be wrapped.
    pub fn start_row(self) -> TableRowBuilder {
        TableRowBuilder {
            cell_style: self.cell_style,
            min_row_height: self.min_row_height,
            cells: Vec::new(),
            table: self,
        }
    }

    pub fn wrap(&self) -> Result<WrappedTable, LayoutError> {
        let rows = self
            .rows
            .iter()
            .map(|row| row.wrap(&self.cell_widths))
            .collect::<Result<Vec<WrappedRow>, LayoutError>>()?;
        Ok(WrappedTable {
            dim: Dim::stacked(rows.iter().map(|row| row.dim)),
            rows,
        })
    }
}

impl TableRow {
    fn wrap(&self, cell_widths: &[Pt]) -> Result<WrappedRow, LayoutError> {
        let cells = self
            .cells
            .iter()
            .map(Cell::wrap)
            .collect::<Result<Vec<WrappedCell>, LayoutError>>()?;
        // Wrapped height before any page breaking; rendering may still
        // stretch the row if a cell picks up a page-break adjustment.
        let height = cells
            .iter()
            .map(|cell| cell.dim().height)
            .fold(self.min_row_height, Pt::max);
        let width = cell_widths.iter().copied().sum();
        Ok(WrappedRow {
            dim: Dim { width, height },
            min_row_height: self.min_row_height,
            cells,
        })
    }
}

/// Accumulates the cells of one row, left to right. Each cell takes the next
/// column's width.
pub struct TableRowBuilder {
    table: Table,
    cell_style: CellStyle,
    min_row_height: Pt,
    cells: Vec<Cell>,
}

impl TableRowBuilder {
    /// Re-anchors the default cell style for the rest of this row.
    pub fn align(mut self, align: Align) -> TableRowBuilder {
        self.cell_style = self.cell_style.with_align(align);
        self
    }

    pub fn min_row_height(mut self, height: Pt) -> TableRowBuilder {
        self.min_row_height = height;
        self
    }

    /// Adds a cell in the next column with an explicit style.
    pub fn cell(
        mut self,
        cell_style: CellStyle,
        contents: Vec<Content>,
    ) -> Result<TableRowBuilder, LayoutError> {
        let Some(&width) = self.table.cell_widths.get(self.cells.len()) else {
            return Err(LayoutError::TooManyCells {
                widths: self.table.cell_widths.len(),
            });
        };
        self.cells.push(Cell::new(cell_style, width, contents)?);
        Ok(self)
    }

    /// Adds one cell per string, in the table's text style and the row's
    /// current cell style.
    pub fn text_cells<S: Into<String>>(
        mut self,
        texts: impl IntoIterator<Item = S>,
    ) -> Result<TableRowBuilder, LayoutError> {
        let text_style = self
            .table
            .text_style
            .clone()
            .ok_or(LayoutError::MissingTextStyle)?;
        for text in texts {
            let cell_style = self.cell_style;
            self = self.cell(cell_style, vec![Text::new(text_style.clone(), text).into()])?;
        }
        Ok(self)
    }

    /// Finishes the row and hands the table back.
    pub fn end_row(mut self) -> Table {
        self.table.rows.push(TableRow {
            min_row_height: self.min_row_height,
            cells: self.cells,
        });
        self.table
    }
}

/// A table whose cells have all been wrapped, fixing its dimensions.
pub struct WrappedTable {
    dim: Dim,
    rows: Vec<WrappedRow>,
}

impl WrappedTable {
    pub fn dim(&self) -> Dim {
        self.dim
    }

    pub fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        let mut y = top_left.y;
        let mut max_width = Pt::ZERO;
        let mut page_nums = INVALID_PAGE_RANGE;
        for row in &self.rows {
            let rendered = row.render(lp, top_left.with_y(y), really_render);
            max_width = max_width.max(rendered.dim.width);
            y -= rendered.dim.height;
            page_nums = rendered.max_extents(page_nums);
        }
        DimAndPageNums {
            dim: Dim {
                width: max_width,
                height: top_left.y - y,
            },
            page_nums,
        }
    }
}

struct WrappedRow {
    dim: Dim,
    min_row_height: Pt,
    cells: Vec<WrappedCell>,
}

impl WrappedRow {
    fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        let mut page_nums = INVALID_PAGE_RANGE;
        let mut x = top_left.x;
        let mut max_row_height = self.min_row_height;

        // Find the height of the tallest cell (after page breaking) before
        // rendering any of them.
        for cell in &self.cells {
            let measured = cell.render_custom(lp, top_left.with_x(x), max_row_height, false);
            max_row_height = max_row_height.max(measured.dim.height);
            x += measured.dim.width;
            page_nums = measured.max_extents(page_nums);
        }
        let max_width = x - top_left.x;

        if really_render {
            let mut x = top_left.x;
            for cell in &self.cells {
                let width = cell
                    .render_custom(lp, top_left.with_x(x), max_row_height, true)
                    .dim
                    .width;
                x += width;
            }
        }

        DimAndPageNums {
            dim: Dim {
                width: max_width,
                height: max_row_height,
            },
            page_nums,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::geom::PageArea;
    use crate::page::SinglePage;
    use crate::test_util::FakeFont;
    use std::rc::Rc;

    fn style_10pt() -> TextStyle {
        TextStyle::new(Rc::new(FakeFont), Pt(10.0), colours::BLACK)
    }

    fn single_page() -> SinglePage {
        SinglePage::new(
            0,
            Dim::new(Pt(400.0), Pt(300.0)).unwrap(),
            PageArea {
                lower_left: Coord::new(Pt(10.0), Pt(10.0)),
                dim: Dim::new(Pt(380.0), Pt(280.0)).unwrap(),
            },
        )
    }

    #[test]
    fn negative_column_width_is_rejected() {
        assert!(matches!(
            Table::new(vec![Pt(50.0), Pt(-2.0)]),
            Err(LayoutError::InvalidCellWidth(_))
        ));
    }

    #[test]
    fn a_row_cannot_outgrow_the_column_widths() {
        let row = Table::new(vec![Pt(50.0)])
            .unwrap()
            .text_style(style_10pt())
            .start_row()
            .text_cells(["one"])
            .unwrap();
        assert!(matches!(
            row.text_cells(["two"]),
            Err(LayoutError::TooManyCells { widths: 1 })
        ));
    }

    #[test]
    fn text_cells_need_a_text_style() {
        let row = Table::new(vec![Pt(50.0)]).unwrap().start_row();
        assert!(matches!(
            row.text_cells(["one"]),
            Err(LayoutError::MissingTextStyle)
        ));
    }

    #[test]
    fn the_tallest_cell_sets_the_row_height() {
        // first cell wraps to two lines, second stays on one
        let table = Table::new(vec![Pt(50.0), Pt(50.0)])
            .unwrap()
            .text_style(style_10pt())
            .start_row()
            .text_cells(["aaaa bbbb cccc", "zz"])
            .unwrap()
            .end_row();
        let wrapped = table.wrap().unwrap();
        assert_eq!(wrapped.dim().width, Pt(100.0));
        assert!((wrapped.dim().height.0 - 21.8).abs() < 1e-4);

        let mut page = single_page();
        let rendered = wrapped.render(&mut page, Coord::new(Pt(20.0), Pt(280.0)), false);
        assert_eq!(rendered.dim.width, Pt(100.0));
        assert!((rendered.dim.height.0 - 21.8).abs() < 1e-4);
    }

    #[test]
    fn min_row_height_is_a_floor() {
        let table = Table::new(vec![Pt(50.0)])
            .unwrap()
            .text_style(style_10pt())
            .min_row_height(Pt(30.0))
            .start_row()
            .text_cells(["zz"])
            .unwrap()
            .end_row();
        let wrapped = table.wrap().unwrap();
        assert_eq!(wrapped.dim().height, Pt(30.0));
    }

    #[test]
    fn rows_stack_downward() {
        let table = Table::new(vec![Pt(50.0), Pt(50.0)])
            .unwrap()
            .text_style(style_10pt())
            .start_row()
            .text_cells(["a", "b"])
            .unwrap()
            .end_row()
            .start_row()
            .text_cells(["c", "d"])
            .unwrap()
            .end_row();
        let wrapped = table.wrap().unwrap();
        assert!((wrapped.dim().height.0 - 21.8).abs() < 1e-4);

        let mut page = single_page();
        let rendered = wrapped.render(&mut page, Coord::new(Pt(20.0), Pt(280.0)), false);
        assert!((rendered.dim.height.0 - 21.8).abs() < 1e-4);
        assert_eq!(rendered.page_nums.first, 0);
        assert_eq!(rendered.page_nums.last, 0);
    }
}
