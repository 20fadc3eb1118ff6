//! The [`SearchFilter`] widget: a text input whose query is applied to the
//! catalog only after the user pauses typing.
//!
//! Every edit schedules a deferred apply and supersedes the previous one, so
//! a fast typist filters once, not once per keystroke. Enter applies the
//! draft immediately and Escape dismisses the filter. Matching is a
//! case-insensitive substring test; an empty query matches everything.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use vitrine_core::app::Effect;
use vitrine_core::messages::Msg;
use vitrine_core::timer::{self, TimerHandle};
use vitrine_core::{Grid, Style};

use crate::{StyledText, TextInput, TextInputAction, TextInputConfig, TextInputStyle};

/// Pause after the last edit before the draft query is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

static NEXT_FILTER_ID: AtomicU64 = AtomicU64::new(1);

// Style-switch markers used by [`SearchFilter::highlight`].
const MARK_ON: char = '\u{1}';
const MARK_OFF: char = '\u{2}';

/// Configuration for a [`SearchFilter`] widget.
#[derive(Debug, Clone)]
pub struct SearchFilterConfig {
    /// Visible input width in cells (prompt included).
    pub width: i32,
    /// Prompt displayed before the query.
    pub prompt: Option<StyledText>,
    /// Pause before a draft edit is applied.
    pub debounce: Duration,
    /// Input style.
    pub style: TextInputStyle,
}

impl SearchFilterConfig {
    /// A configuration with a `/` prompt and the default debounce.
    pub fn new(width: i32) -> Self {
        Self {
            width,
            prompt: Some(StyledText::text("/")),
            debounce: DEFAULT_DEBOUNCE,
            style: TextInputStyle::default(),
        }
    }
}

/// Actions reported by [`SearchFilter::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    /// Nothing of interest happened.
    Pass,
    /// The draft changed; an apply is scheduled.
    Edit,
    /// The applied query changed after the debounce pause.
    Apply,
    /// Enter: the draft was applied immediately.
    Submit,
    /// Escape: the filter was dismissed.
    Cancel,
}

/// Draft-apply expiry, carrying the owning filter's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DebounceTick {
    filter: u64,
    seq: u64,
}

#[derive(Debug)]
struct PendingApply {
    seq: u64,
    handle: TimerHandle,
}

/// The search filter widget. Instances are fully independent.
#[derive(Debug)]
pub struct SearchFilter {
    id: u64,
    input: TextInput,
    debounce: Duration,
    applied: String,
    pending: Option<PendingApply>,
    seq: u64,
    action: SearchAction,
}

impl SearchFilter {
    /// Create a new filter from the given configuration.
    pub fn new(config: SearchFilterConfig) -> Self {
        let input = TextInput::new(TextInputConfig {
            width: config.width,
            content: String::new(),
            prompt: config.prompt,
            keys: Default::default(),
            style: config.style,
        });
        Self {
            id: NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed),
            input,
            debounce: config.debounce,
            applied: String::new(),
            pending: None,
            seq: 0,
            action: SearchAction::Pass,
        }
    }

    /// Process an input message and collect the resulting effect.
    pub fn update(&mut self, msg: Msg) -> Option<Effect> {
        self.action = SearchAction::Pass;
        if let Some(&tick) = msg.downcast_ref::<DebounceTick>() {
            self.on_tick(tick);
            return None;
        }
        match self.input.update(msg) {
            TextInputAction::Change => {
                self.action = SearchAction::Edit;
                return Some(self.schedule());
            }
            TextInputAction::Confirm => {
                self.cancel_pending();
                self.apply();
                self.action = SearchAction::Submit;
            }
            TextInputAction::Cancel => {
                self.cancel_pending();
                self.action = SearchAction::Cancel;
            }
            TextInputAction::Pass => {}
        }
        None
    }

    /// The last action.
    pub fn action(&self) -> SearchAction {
        self.action
    }

    /// The applied query.
    pub fn query(&self) -> &str {
        &self.applied
    }

    /// The draft under edit, which may not be applied yet.
    pub fn draft(&self) -> &str {
        self.input.content()
    }

    /// Reset draft and applied query and cancel any scheduled apply.
    pub fn clear(&mut self) {
        self.cancel_pending();
        self.input.set_content("");
        self.applied.clear();
        self.action = SearchAction::Pass;
    }

    /// Whether `hay` matches the applied query.
    pub fn matches(&self, hay: &str) -> bool {
        self.applied.is_empty() || find(hay, &self.applied).is_some()
    }

    /// Char span of the first match of the applied query in `hay`, if the
    /// query is non-empty and matches.
    pub fn match_span(&self, hay: &str) -> Option<(usize, usize)> {
        if self.applied.is_empty() {
            return None;
        }
        find(hay, &self.applied)
    }

    /// `text` as styled content with the matched span in `hl`. Texts are
    /// assumed not to contain the `\u{1}` and `\u{2}` control characters.
    pub fn highlight(&self, text: &str, base: Style, hl: Style) -> StyledText {
        let Some((start, end)) = self.match_span(text) else {
            return StyledText::new(text, base);
        };
        let mut marked = String::with_capacity(text.len() + 2);
        for (i, ch) in text.chars().enumerate() {
            if i == start {
                marked.push(MARK_ON);
            }
            if i == end {
                marked.push(MARK_OFF);
            }
            marked.push(ch);
        }
        if end == text.chars().count() {
            marked.push(MARK_OFF);
        }
        StyledText::new(&marked, base)
            .with_markup(MARK_ON, hl)
            .with_markup(MARK_OFF, base)
    }

    /// Draw the input row.
    pub fn draw(&self, grid: &Grid) {
        self.input.draw(grid);
    }

    // -- private --

    fn cancel_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            p.handle.cancel();
        }
    }

    fn schedule(&mut self) -> Effect {
        self.cancel_pending();
        self.seq += 1;
        let seq = self.seq;
        let (effect, handle) = timer::delay(
            self.debounce,
            Msg::custom(DebounceTick {
                filter: self.id,
                seq,
            }),
        );
        self.pending = Some(PendingApply { seq, handle });
        effect
    }

    fn apply(&mut self) -> bool {
        if self.applied == self.input.content() {
            return false;
        }
        self.applied = self.input.content().to_string();
        true
    }

    fn on_tick(&mut self, tick: DebounceTick) {
        if tick.filter != self.id {
            return;
        }
        if !self.pending.as_ref().is_some_and(|p| p.seq == tick.seq) {
            // Superseded by a newer edit or already cancelled.
            return;
        }
        self.pending = None;
        if self.apply() {
            self.action = SearchAction::Apply;
        }
    }
}

impl Drop for SearchFilter {
    /// Dropping the filter retracts its scheduled apply.
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Case-insensitive substring search returning char indices.
fn find(hay: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return Some((0, 0));
    }
    let hay: Vec<char> = hay.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > hay.len() {
        return None;
    }
    for start in 0..=hay.len() - needle.len() {
        let found = hay[start..start + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
        if found {
            return Some((start, start + needle.len()));
        }
    }
    None
}
