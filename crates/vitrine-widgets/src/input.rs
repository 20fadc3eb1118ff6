//! Single-line text input widget with cursor, prompt, and mouse support.

use vitrine_core::messages::{Key, MouseAction, Msg};
use vitrine_core::{Cell, Grid, Point, Style};

use crate::StyledText;

/// Configuration for a [`TextInput`] widget.
#[derive(Debug, Clone)]
pub struct TextInputConfig {
    /// Visible width in cells (prompt included).
    pub width: i32,
    /// Initial content.
    pub content: String,
    /// Optional prompt text displayed before the input.
    pub prompt: Option<StyledText>,
    /// Key bindings.
    pub keys: TextInputKeys,
    /// Visual style.
    pub style: TextInputStyle,
}

/// Key bindings for text input.
#[derive(Debug, Clone)]
pub struct TextInputKeys {
    /// Keys that confirm/submit the input.
    pub confirm: Vec<Key>,
    /// Keys that cancel the input.
    pub cancel: Vec<Key>,
}

impl Default for TextInputKeys {
    fn default() -> Self {
        Self {
            confirm: vec![Key::Enter],
            cancel: vec![Key::Escape],
        }
    }
}

/// Visual style for text input.
#[derive(Debug, Clone, Default)]
pub struct TextInputStyle {
    /// Style for the text.
    pub text: Style,
    /// Style for the cursor cell.
    pub cursor: Style,
}

/// Actions returned by [`TextInput::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextInputAction {
    /// No meaningful action.
    Pass,
    /// The text content changed.
    Change,
    /// The user confirmed the input.
    Confirm,
    /// The user cancelled the input.
    Cancel,
}

/// A single-line text input widget.
#[derive(Debug, Clone)]
pub struct TextInput {
    width: i32,
    content: String,
    cursor: usize,
    prompt: Option<StyledText>,
    keys: TextInputKeys,
    style: TextInputStyle,
    action: TextInputAction,
}

impl TextInput {
    /// Create a new text input from the given configuration.
    ///
    /// If no explicit cursor style is set (it equals `Style::default()`),
    /// the cursor style is derived by reversing the text style.
    pub fn new(config: TextInputConfig) -> Self {
        let cursor = config.content.len();
        let mut style = config.style;
        if style.cursor == Style::default() {
            style.cursor = style.text.reversed();
        }
        Self {
            width: config.width,
            content: config.content,
            cursor,
            prompt: config.prompt,
            keys: config.keys,
            style,
            action: TextInputAction::Pass,
        }
    }

    /// Process an input message and return the resulting action.
    pub fn update(&mut self, msg: Msg) -> TextInputAction {
        self.action = TextInputAction::Pass;

        match msg {
            Msg::KeyDown { ref key, .. } => {
                if self.keys.confirm.contains(key) {
                    self.action = TextInputAction::Confirm;
                } else if self.keys.cancel.contains(key) {
                    self.action = TextInputAction::Cancel;
                } else {
                    match key {
                        Key::Char(ch) => {
                            self.content.insert(self.cursor, *ch);
                            self.cursor += ch.len_utf8();
                            self.action = TextInputAction::Change;
                        }
                        Key::Backspace => {
                            if self.cursor > 0 {
                                let prev = self.prev_boundary();
                                self.content.remove(prev);
                                self.cursor = prev;
                                self.action = TextInputAction::Change;
                            }
                        }
                        Key::Delete => {
                            if self.cursor < self.content.len() {
                                self.content.remove(self.cursor);
                                self.action = TextInputAction::Change;
                            }
                        }
                        Key::ArrowLeft => {
                            if self.cursor > 0 {
                                self.cursor = self.prev_boundary();
                            }
                        }
                        Key::ArrowRight => {
                            if self.cursor < self.content.len() {
                                self.cursor = self.next_boundary();
                            }
                        }
                        Key::Home => {
                            self.cursor = 0;
                        }
                        Key::End => {
                            self.cursor = self.content.len();
                        }
                        _ => {}
                    }
                }
            }
            Msg::Mouse {
                action: MouseAction::Main,
                pos,
                ..
            } => {
                // Click on the input row repositions the cursor.
                if pos.y == 0 && pos.x >= 0 && pos.x < self.width {
                    let prompt_len = self.prompt_char_len();
                    let click_col = pos.x as usize;
                    if click_col >= prompt_len {
                        let text_col = click_col - prompt_len + self.scroll();
                        let chars: Vec<char> = self.content.chars().collect();
                        let target = text_col.min(chars.len());
                        self.cursor = chars[..target].iter().map(|c| c.len_utf8()).sum();
                    }
                }
            }
            _ => {}
        }

        self.action
    }

    /// Draw the input into the given grid: prompt, scrolled content, cursor.
    pub fn draw(&self, grid: &Grid) {
        let prompt_len = self.prompt_char_len();
        if let Some(ref prompt) = self.prompt {
            prompt.draw(grid);
        }

        let vis_w = (grid.width().min(self.width)).max(0) as usize;
        let input_w = vis_w.saturating_sub(prompt_len);
        if input_w == 0 {
            return;
        }

        let scroll = self.scroll();
        let cursor_col = self.content[..self.cursor].chars().count();
        let chars: Vec<char> = self.content.chars().collect();

        for col in 0..input_w {
            let char_idx = scroll + col;
            let p = Point::new((prompt_len + col) as i32, 0);
            let is_cursor = char_idx == cursor_col;
            let style = if is_cursor {
                self.style.cursor
            } else {
                self.style.text
            };
            let ch = if char_idx < chars.len() {
                chars[char_idx]
            } else {
                ' '
            };
            grid.set(p, Cell::default().with_char(ch).with_style(style));
        }
    }

    /// The current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content and move the cursor to the end.
    pub fn set_content(&mut self, s: &str) {
        self.content = s.to_string();
        self.cursor = self.content.len();
    }

    /// The last action.
    pub fn action(&self) -> TextInputAction {
        self.action
    }

    /// Set the cursor byte position (clamped to the content length).
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.content.len());
    }

    // -- private helpers --

    fn prev_boundary(&self) -> usize {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.content.len())
    }

    fn prompt_char_len(&self) -> usize {
        self.prompt
            .as_ref()
            .map_or(0, |p| p.content().chars().count())
    }

    /// How many leading characters are scrolled out of view so the cursor
    /// stays visible.
    fn scroll(&self) -> usize {
        let input_w = (self.width.max(0) as usize).saturating_sub(self.prompt_char_len());
        if input_w == 0 {
            return 0;
        }
        let cursor_col = self.content[..self.cursor].chars().count();
        if cursor_col >= input_w {
            cursor_col - input_w + 1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_input(content: &str) -> TextInput {
        TextInput::new(TextInputConfig {
            width: 20,
            content: content.to_string(),
            prompt: None,
            keys: TextInputKeys::default(),
            style: TextInputStyle::default(),
        })
    }

    #[test]
    fn type_characters() {
        let mut input = make_input("");
        input.update(Msg::key(Key::Char('h')));
        let action = input.update(Msg::key(Key::Char('i')));
        assert_eq!(action, TextInputAction::Change);
        assert_eq!(input.content(), "hi");
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = make_input("abc");
        input.update(Msg::key(Key::Backspace));
        assert_eq!(input.content(), "ab");

        input.update(Msg::key(Key::Home));
        input.update(Msg::key(Key::Delete));
        assert_eq!(input.content(), "b");
    }

    #[test]
    fn cursor_movement() {
        let mut input = make_input("hello");
        input.update(Msg::key(Key::Home));
        input.update(Msg::key(Key::Char('X')));
        assert_eq!(input.content(), "Xhello");

        input.update(Msg::key(Key::End));
        input.update(Msg::key(Key::Char('Y')));
        assert_eq!(input.content(), "XhelloY");

        input.update(Msg::key(Key::ArrowLeft));
        input.update(Msg::key(Key::ArrowLeft));
        input.update(Msg::key(Key::Char('-')));
        assert_eq!(input.content(), "Xhell-oY");
    }

    #[test]
    fn confirm_and_cancel() {
        let mut input = make_input("test");
        assert_eq!(input.update(Msg::key(Key::Enter)), TextInputAction::Confirm);
        assert_eq!(input.update(Msg::key(Key::Escape)), TextInputAction::Cancel);
        assert_eq!(input.content(), "test");
    }

    #[test]
    fn mouse_click_positions_cursor() {
        let mut input = make_input("hello");
        input.update(Msg::Mouse {
            action: MouseAction::Main,
            pos: Point::new(2, 0),
            modifiers: Default::default(),
            time: std::time::Instant::now(),
        });
        input.update(Msg::key(Key::Char('X')));
        assert_eq!(input.content(), "heXllo");
    }

    #[test]
    fn cursor_style_auto_reverses() {
        let text = Style::default()
            .with_fg(vitrine_core::Color::from_rgb(255, 255, 255))
            .with_bg(vitrine_core::Color::from_rgb(20, 20, 20));
        let input = TextInput::new(TextInputConfig {
            width: 20,
            content: String::new(),
            prompt: None,
            keys: TextInputKeys::default(),
            style: TextInputStyle {
                text,
                cursor: Style::default(),
            },
        });
        assert_eq!(input.style.cursor, text.reversed());
    }

    #[test]
    fn draw_shows_prompt_and_cursor() {
        let input = TextInput::new(TextInputConfig {
            width: 10,
            content: "ab".to_string(),
            prompt: Some(StyledText::text("> ")),
            keys: TextInputKeys::default(),
            style: TextInputStyle::default(),
        });
        let g = Grid::new(10, 1);
        input.draw(&g);
        assert_eq!(g.at(Point::new(0, 0)).ch, '>');
        assert_eq!(g.at(Point::new(2, 0)).ch, 'a');
        assert_eq!(g.at(Point::new(3, 0)).ch, 'b');
    }
}
