use vitrine_core::{Cell, Grid, Point, Range, Style};

use crate::StyledText;

/// Alignment for border title and footer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Center,
    Left,
    Right,
}

/// A box border drawn around a widget area, with optional title and footer
/// text on the top and bottom edges.
#[derive(Debug, Clone, Default)]
pub struct Border {
    pub style: Style,
    pub title: Option<StyledText>,
    pub footer: Option<StyledText>,
    pub align_title: Alignment,
    pub align_footer: Alignment,
}

impl Border {
    /// A plain border with default style and no title or footer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_title(mut self, title: StyledText) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_footer(mut self, footer: StyledText) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Draw the border into the grid, using relative coordinates. Returns
    /// the inner range (the area inside the border). Grids too small to hold
    /// a border are left untouched and returned whole.
    pub fn draw(&self, grid: &Grid) -> Range {
        let w = grid.width();
        let h = grid.height();
        if w < 2 || h < 2 {
            return grid.range_();
        }

        let s = self.style;

        set(grid, Point::new(0, 0), '\u{250c}', s);
        set(grid, Point::new(w - 1, 0), '\u{2510}', s);
        set(grid, Point::new(0, h - 1), '\u{2514}', s);
        set(grid, Point::new(w - 1, h - 1), '\u{2518}', s);

        for x in 1..(w - 1) {
            set(grid, Point::new(x, 0), '\u{2500}', s);
            set(grid, Point::new(x, h - 1), '\u{2500}', s);
        }

        for y in 1..(h - 1) {
            set(grid, Point::new(0, y), '\u{2502}', s);
            set(grid, Point::new(w - 1, y), '\u{2502}', s);
        }

        if let Some(ref title) = self.title {
            let top = grid.slice(Range::new(1, 0, w - 1, 1));
            draw_aligned(title, &top, self.align_title);
        }

        if let Some(ref footer) = self.footer {
            let bottom = grid.slice(Range::new(1, h - 1, w - 1, h));
            draw_aligned(footer, &bottom, self.align_footer);
        }

        Range::new(1, 1, w - 1, h - 1)
    }
}

fn set(grid: &Grid, p: Point, ch: char, style: Style) {
    grid.set(p, Cell::default().with_char(ch).with_style(style));
}

/// Draw styled text into a single-row grid with the given alignment.
fn draw_aligned(stt: &StyledText, gd: &Grid, align: Alignment) {
    let tw = stt.size().x;
    let w = gd.width();
    let offset = match align {
        Alignment::Left => 0,
        Alignment::Right => (w - tw).max(0),
        Alignment::Center => ((w - tw) / 2).max(0),
    };
    let shifted = gd.slice(Range::new(offset, 0, w, gd.height()));
    stt.draw(&shifted);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_frame_and_returns_inner() {
        let g = Grid::new(6, 4);
        let inner = Border::new().draw(&g);
        assert_eq!(inner, Range::new(1, 1, 5, 3));
        assert_eq!(g.at(Point::new(0, 0)).ch, '\u{250c}');
        assert_eq!(g.at(Point::new(5, 3)).ch, '\u{2518}');
        assert_eq!(g.at(Point::new(3, 0)).ch, '\u{2500}');
        assert_eq!(g.at(Point::new(0, 2)).ch, '\u{2502}');
        // Interior untouched.
        assert_eq!(g.at(Point::new(2, 2)).ch, ' ');
    }

    #[test]
    fn title_alignment() {
        let g = Grid::new(10, 3);
        let b = Border::new().with_title(StyledText::text("hi"));
        b.draw(&g);
        // Centered on the 8 usable top cells: offset 3 inside the slice.
        assert_eq!(g.at(Point::new(4, 0)).ch, 'h');
        assert_eq!(g.at(Point::new(5, 0)).ch, 'i');
    }

    #[test]
    fn footer_renders_on_the_bottom_edge() {
        let g = Grid::new(10, 3);
        let b = Border::new().with_footer(StyledText::text("ok"));
        b.draw(&g);
        // Centered on the 8 usable bottom cells, corners untouched.
        assert_eq!(g.at(Point::new(4, 2)).ch, 'o');
        assert_eq!(g.at(Point::new(5, 2)).ch, 'k');
        assert_eq!(g.at(Point::new(0, 2)).ch, '\u{2514}');
        assert_eq!(g.at(Point::new(9, 2)).ch, '\u{2518}');
    }

    #[test]
    fn left_and_right_alignment_offsets() {
        let g = Grid::new(10, 3);
        let mut b = Border::new()
            .with_title(StyledText::text("hi"))
            .with_footer(StyledText::text("ok"));
        b.align_title = Alignment::Left;
        b.align_footer = Alignment::Right;
        b.draw(&g);
        // Left title starts just after the corner, right footer ends just
        // before it.
        assert_eq!(g.at(Point::new(1, 0)).ch, 'h');
        assert_eq!(g.at(Point::new(2, 0)).ch, 'i');
        assert_eq!(g.at(Point::new(7, 2)).ch, 'o');
        assert_eq!(g.at(Point::new(8, 2)).ch, 'k');
        assert_eq!(g.at(Point::new(0, 0)).ch, '\u{250c}');
        assert_eq!(g.at(Point::new(9, 2)).ch, '\u{2518}');
    }

    #[test]
    fn degenerate_grid_untouched() {
        let g = Grid::new(1, 4);
        let inner = Border::new().draw(&g);
        assert_eq!(inner, g.range_());
        assert!(g.iter().all(|(_, c)| c.ch == ' '));
    }
}
