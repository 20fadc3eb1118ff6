//! The [`Footer`] widget: link groups in columns with an optional note line.
//!
//! Purely presentational. The footer holds no interactive state and handles
//! no input; the host just draws it into a slice at the bottom of the
//! screen.

use vitrine_core::{Cell, Grid, Style};

use crate::StyledText;

/// A titled column of links.
#[derive(Debug, Clone)]
pub struct LinkGroup {
    pub title: StyledText,
    pub links: Vec<StyledText>,
}

impl LinkGroup {
    pub fn new(title: StyledText, links: Vec<StyledText>) -> Self {
        Self { title, links }
    }
}

/// Configuration for a [`Footer`] widget.
#[derive(Debug, Clone, Default)]
pub struct FooterConfig {
    /// Link groups, one column each.
    pub groups: Vec<LinkGroup>,
    /// Note displayed on the footer's last row.
    pub note: Option<StyledText>,
    /// Visual style.
    pub style: FooterStyle,
}

/// Visual style for the footer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FooterStyle {
    pub background: Style,
    pub title: Style,
    pub link: Style,
    pub note: Style,
}

/// The footer widget.
#[derive(Debug, Clone)]
pub struct Footer {
    groups: Vec<LinkGroup>,
    note: Option<StyledText>,
    style: FooterStyle,
}

impl Footer {
    pub fn new(config: FooterConfig) -> Self {
        Self {
            groups: config.groups,
            note: config.note,
            style: config.style,
        }
    }

    /// Rows the footer needs: the tallest column plus the note block.
    pub fn height(&self) -> i32 {
        let body = if self.groups.is_empty() {
            0
        } else {
            1 + self.groups.iter().map(|g| g.links.len()).max().unwrap_or(0) as i32
        };
        body + if self.note.is_some() { 2 } else { 0 }
    }

    /// Render the footer into the given grid. Columns split the width
    /// evenly; rows that do not fit are clipped.
    pub fn draw(&self, grid: &Grid) {
        grid.fill(Cell::default().with_style(self.style.background));
        let w = grid.width();
        let n = self.groups.len() as i32;
        if n > 0 && w > 0 {
            let cw = (w / n).max(1);
            for (i, group) in self.groups.iter().enumerate() {
                let x0 = i as i32 * cw;
                let band = if i as i32 == n - 1 {
                    grid.range_().columns(x0, w)
                } else {
                    grid.range_().columns(x0, x0 + cw)
                };
                let col = grid.slice(band);
                let title_row = col.slice(col.range_().line(0));
                group
                    .title
                    .clone()
                    .with_style(self.style.title)
                    .draw(&title_row);
                for (row, link) in group.links.iter().enumerate() {
                    let line = col.range_().line(row as i32 + 1);
                    if line.is_empty() {
                        break;
                    }
                    link.clone()
                        .with_style(self.style.link)
                        .draw(&col.slice(line));
                }
            }
        }
        if let Some(ref note) = self.note {
            let last = grid.range_().line(grid.height() - 1);
            if !last.is_empty() {
                note.clone().with_style(self.style.note).draw(&grid.slice(last));
            }
        }
    }
}
