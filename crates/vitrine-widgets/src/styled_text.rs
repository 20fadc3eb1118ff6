use std::collections::HashMap;

use vitrine_core::{Cell, Grid, Point, Range, Style};

/// Text with optional per-character style markups.
///
/// A markup character in the text (a caller-chosen marker, usually a control
/// character that cannot appear in real content) switches the style for the
/// characters that follow it. The search widget uses a marker pair to wrap
/// matched spans in a highlight style.
#[derive(Debug, Clone)]
pub struct StyledText {
    text: String,
    style: Style,
    markups: Option<HashMap<char, Style>>,
}

impl StyledText {
    // -- Constructors --

    /// Plain text with the default style.
    pub fn text(s: &str) -> Self {
        Self {
            text: s.to_string(),
            style: Style::default(),
            markups: None,
        }
    }

    /// Text with the given base style.
    pub fn new(text: &str, style: Style) -> Self {
        Self {
            text: text.to_string(),
            style,
            markups: None,
        }
    }

    // -- Builders --

    /// Replace the base style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Add a markup: when `marker` is encountered in the text, switch to
    /// `style` for the characters after it.
    pub fn with_markup(mut self, marker: char, style: Style) -> Self {
        self.markups
            .get_or_insert_with(HashMap::new)
            .insert(marker, style);
        self
    }

    // -- Accessors --

    /// The raw text content, markup markers included.
    pub fn content(&self) -> &str {
        &self.text
    }

    /// The base style.
    pub fn style(&self) -> Style {
        self.style
    }

    // -- Iteration & measurement --

    /// Iterate over styled characters, calling `callback` for each visible
    /// character with its position and cell. Returns the position one past
    /// the last character.
    pub fn iter(&self, mut callback: impl FnMut(Point, Cell)) -> Point {
        let mut x: i32 = 0;
        let mut y: i32 = 0;
        let mut current_style = self.style;

        for ch in self.text.chars() {
            if let Some(markups) = &self.markups {
                if let Some(&s) = markups.get(&ch) {
                    current_style = s;
                    continue;
                }
            }
            if ch == '\n' {
                x = 0;
                y += 1;
                continue;
            }
            let p = Point::new(x, y);
            let cell = Cell::default().with_char(ch).with_style(current_style);
            callback(p, cell);
            x += 1;
        }
        Point::new(x, y)
    }

    /// The minimum bounding size required to display this text.
    pub fn size(&self) -> Point {
        let mut max_x: i32 = 0;
        let mut max_y: i32 = 0;
        self.iter(|p, _| {
            if p.x + 1 > max_x {
                max_x = p.x + 1;
            }
            if p.y + 1 > max_y {
                max_y = p.y + 1;
            }
        });
        Point::new(max_x, max_y)
    }

    /// Word-wrap to the given width, returning a new `StyledText`.
    pub fn format(&self, width: usize) -> StyledText {
        if width == 0 {
            return self.clone();
        }
        let mut result = String::new();
        for line in self.text.split('\n') {
            if !result.is_empty() {
                result.push('\n');
            }
            let mut col = 0usize;
            let mut first_word = true;
            for word in line.split(' ') {
                let word_len = visible_len(word, &self.markups);
                if !first_word && col + 1 + word_len > width {
                    result.push('\n');
                    col = 0;
                    first_word = true;
                }
                if !first_word {
                    result.push(' ');
                    col += 1;
                }
                result.push_str(word);
                col += word_len;
                first_word = false;
            }
        }
        StyledText {
            text: result,
            style: self.style,
            markups: self.markups.clone(),
        }
    }

    /// Split at newlines into single-line `StyledText`s.
    pub fn lines(&self) -> Vec<StyledText> {
        self.text
            .split('\n')
            .map(|line| StyledText {
                text: line.to_string(),
                style: self.style,
                markups: self.markups.clone(),
            })
            .collect()
    }

    /// Draw into the given grid starting at (0,0). Returns the range of
    /// cells actually written.
    pub fn draw(&self, grid: &Grid) -> Range {
        let mut written = Range::default();
        self.iter(|p, cell| {
            if grid.contains(p) {
                grid.set(p, cell);
                written = written.union(Range::with_size(p, 1, 1));
            }
        });
        written
    }
}

/// Count visible (non-markup) characters in a string.
fn visible_len(s: &str, markups: &Option<HashMap<char, Style>>) -> usize {
    let mut count = 0;
    for ch in s.chars() {
        if let Some(m) = markups {
            if m.contains_key(&ch) {
                continue;
            }
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::AttrMask;

    #[test]
    fn markup_switches_style() {
        let hl = Style::default().with_attrs(AttrMask::REVERSE);
        let stt = StyledText::text("ab\u{1}cd").with_markup('\u{1}', hl);
        let mut styles = Vec::new();
        let end = stt.iter(|_, cell| styles.push(cell.style));
        // The marker itself occupies no cell.
        assert_eq!(end, Point::new(4, 0));
        assert_eq!(styles[1], Style::default());
        assert_eq!(styles[2], hl);
        assert_eq!(stt.size(), Point::new(4, 1));
    }

    #[test]
    fn wrap_keeps_words_whole() {
        let stt = StyledText::text("the quick brown fox");
        let wrapped = stt.format(9);
        assert_eq!(wrapped.content(), "the quick\nbrown\nfox");
        assert_eq!(wrapped.size(), Point::new(9, 3));
        assert_eq!(wrapped.lines().len(), 3);
    }

    #[test]
    fn draw_clips_to_grid() {
        let g = Grid::new(3, 1);
        let written = StyledText::text("hello").draw(&g);
        assert_eq!(written, Range::new(0, 0, 3, 1));
        assert_eq!(g.at(Point::new(2, 0)).ch, 'l');
    }
}
