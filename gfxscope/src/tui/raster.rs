//! Rasterizes recorded shapes into terminal cells.
//!
//! A band is one terminal row: each cell samples the shapes covering the
//! band's vertical center within the cell's horizontal pixel span.
//!
//! ```text
//!   pixels   |0    4    8    12   16 |
//!   rects    [ idle ][ active   ][ i ]
//!   line            |
//!   cells    [ ░ ][ │ ][ █ ][ █ ][ ░ ]
//! ```

use gfxscope_common::Rgb;
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::theme::{blend, color};
use crate::timeline::{RecordingSurface, Shape};

/// Horizontal pixel window mapped onto terminal columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Columns {
    /// Pixel at the left edge of column 0
    pub start: f64,
    pub pixels_per_column: f64,
    pub count: u16,
}

impl Columns {
    /// Pixel at the center of `column`.
    #[must_use]
    pub fn center(&self, column: u16) -> f64 {
        self.start + (f64::from(column) + 0.5) * self.pixels_per_column
    }

    /// Column containing pixel `x`, if visible.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn column_of(&self, x: f64) -> Option<u16> {
        let column = ((x - self.start) / self.pixels_per_column).floor();
        (column >= 0.0 && column < f64::from(self.count)).then(|| column as u16)
    }
}

/// Paint of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub fill: Option<Rgb>,
    pub marker: Option<Rgb>,
}

/// Sample the row of `surface` at vertical pixel `y`.
#[must_use]
pub fn sample_row(surface: &RecordingSurface, y: f64, columns: &Columns) -> Vec<Cell> {
    let mut cells = vec![Cell::default(); usize::from(columns.count)];
    for shape in surface.shapes() {
        match *shape {
            Shape::Rect { x, y: top, width, height, color, opacity } => {
                if y < top || y >= top + height {
                    continue;
                }
                for (column, cell) in cells.iter_mut().enumerate() {
                    #[allow(clippy::cast_possible_truncation)]
                    let center = columns.center(column as u16);
                    if center < x || center >= x + width {
                        continue;
                    }
                    cell.fill = Some(match (opacity, cell.fill) {
                        (Some(opacity), Some(base)) => blend(base, color, opacity),
                        _ => color,
                    });
                }
            }
            Shape::Line { x1, y1, y2, color, .. } => {
                if y < y1.min(y2) || y > y1.max(y2) {
                    continue;
                }
                if let Some(column) = columns.column_of(x1) {
                    cells[usize::from(column)].marker = Some(color);
                }
            }
            Shape::Circle { .. } | Shape::Text { .. } => {}
        }
    }
    cells
}

/// Render sampled cells as a styled line.
#[must_use]
pub fn to_line(cells: &[Cell]) -> Line<'static> {
    let spans: Vec<Span<'static>> = cells
        .iter()
        .map(|cell| {
            let mut style = Style::new();
            if let Some(fill) = cell.fill {
                style = style.bg(color(fill));
            }
            match cell.marker {
                Some(marker) => Span::styled("│", style.fg(color(marker))),
                None => Span::styled(" ", style),
            }
        })
        .collect();
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Surface;
    use gfxscope_common::{BAND_COLOR, BLACK};

    const ACTIVE: Rgb = Rgb(0xff, 0xbf, 0x00);

    #[test]
    fn test_rects_and_markers_map_to_columns() {
        let mut surface = RecordingSurface::new();
        surface.draw_rect(0.0, 0.0, 8.0, 6.0, BAND_COLOR, None);
        surface.draw_rect(8.0, 0.0, 8.0, 6.0, ACTIVE, None);
        surface.draw_line(5.0, 0.0, 5.0, 6.0, BLACK, 1.0);
        let columns = Columns { start: 0.0, pixels_per_column: 4.0, count: 5 };

        let cells = sample_row(&surface, 3.0, &columns);
        let fills: Vec<Option<Rgb>> = cells.iter().map(|c| c.fill).collect();
        assert_eq!(fills, vec![Some(BAND_COLOR), Some(BAND_COLOR), Some(ACTIVE), Some(ACTIVE), None]);
        assert_eq!(cells[1].marker, Some(BLACK));
        assert!(sample_row(&surface, 7.0, &columns).iter().all(|c| *c == Cell::default()));
    }

    #[test]
    fn test_translucent_rect_blends_over_fill() {
        let mut surface = RecordingSurface::new();
        surface.draw_rect(0.0, 0.0, 4.0, 6.0, BAND_COLOR, None);
        surface.draw_rect(0.0, 0.0, 4.0, 6.0, BLACK, Some(0.1));
        let columns = Columns { start: 0.0, pixels_per_column: 4.0, count: 1 };
        assert_eq!(sample_row(&surface, 1.0, &columns)[0].fill, Some(Rgb(190, 190, 190)));
    }

    #[test]
    fn test_column_of_outside_window() {
        let columns = Columns { start: 10.0, pixels_per_column: 2.0, count: 3 };
        assert_eq!(columns.column_of(9.9), None);
        assert_eq!(columns.column_of(10.0), Some(0));
        assert_eq!(columns.column_of(15.9), Some(2));
        assert_eq!(columns.column_of(16.0), None);
    }
}
