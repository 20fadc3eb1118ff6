//! The [`NavMenu`] widget: a storefront navigation bar with dropdown panels.
//!
//! Triggers sit on a single bar row; hovering or focusing a trigger opens
//! its panel below the bar. Moving the pointer off a trigger does not close
//! its panel right away: the close is scheduled after a grace delay and is
//! cancelled if the pointer comes back, so short excursions off the trigger
//! do not make the panel flicker. At most one panel is ever open; switching
//! triggers closes the old panel immediately.
//!
//! Items that do not fit the configured width collapse, in order, into a
//! trailing "More" bucket whose flyout lists them.
//!
//! The widget publishes a [`Backdrop`] measurement after every state change;
//! the host draws one shared background band of that height behind whichever
//! panel is open. The widget itself never draws the backdrop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use vitrine_core::app::Effect;
use vitrine_core::messages::{Key, MouseAction, Msg};
use vitrine_core::timer::{self, TimerHandle};
use vitrine_core::{AttrMask, Cell, Grid, Point, Range, Style};

use crate::{Border, StyledText};

/// Grace delay before an unhovered panel closes.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(200);

static NEXT_MENU_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`NavMenu`] widget.
#[derive(Debug, Clone)]
pub struct NavMenuConfig {
    /// The bar items, in display order.
    pub items: Vec<NavItem>,
    /// Available bar width in cells.
    pub width: i32,
    /// Key bindings.
    pub keys: NavMenuKeys,
    /// Visual style.
    pub style: NavMenuStyle,
    /// Grace delay for deferred closes.
    pub close_delay: Duration,
    /// Label of the overflow bucket trigger.
    pub more_label: StyledText,
}

impl NavMenuConfig {
    /// A configuration with default keys, style, delay and "More" label.
    pub fn new(items: Vec<NavItem>, width: i32) -> Self {
        Self {
            items,
            width,
            keys: NavMenuKeys::default(),
            style: NavMenuStyle::default(),
            close_delay: DEFAULT_CLOSE_DELAY,
            more_label: StyledText::text("More"),
        }
    }
}

/// A single bar item: a trigger label and, optionally, a dropdown panel.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: StyledText,
    pub panel: Option<Panel>,
}

impl NavItem {
    /// A plain item without a panel.
    pub fn new(label: StyledText) -> Self {
        Self { label, panel: None }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = Some(panel);
        self
    }
}

/// A dropdown panel: a list of entry rows.
#[derive(Debug, Clone)]
pub struct Panel {
    pub entries: Vec<StyledText>,
}

impl Panel {
    pub fn new(entries: Vec<StyledText>) -> Self {
        Self { entries }
    }

    /// The number of entry rows. The drawn panel adds a border row above
    /// and below.
    pub fn rows(&self) -> i32 {
        self.entries.len() as i32
    }

    fn content_width(&self) -> i32 {
        self.entries.iter().map(|e| e.size().x).max().unwrap_or(0)
    }
}

/// Key bindings for menu navigation.
#[derive(Debug, Clone)]
pub struct NavMenuKeys {
    /// Move trigger focus forward.
    pub next: Vec<Key>,
    /// Move trigger focus backward.
    pub prev: Vec<Key>,
    /// Move down into / inside the open panel.
    pub down: Vec<Key>,
    /// Move up inside the open panel.
    pub up: Vec<Key>,
    /// Invoke the highlighted entry.
    pub invoke: Vec<Key>,
    /// Close everything.
    pub close: Vec<Key>,
}

impl Default for NavMenuKeys {
    fn default() -> Self {
        Self {
            next: vec![Key::ArrowRight, Key::Tab],
            prev: vec![Key::ArrowLeft, Key::BackTab],
            down: vec![Key::ArrowDown],
            up: vec![Key::ArrowUp],
            invoke: vec![Key::Enter],
            close: vec![Key::Escape],
        }
    }
}

/// Visual style for the menu.
#[derive(Debug, Clone)]
pub struct NavMenuStyle {
    /// Bar row background.
    pub bar: Style,
    /// Focused (keyboard) trigger.
    pub focused: Style,
    /// Expanded trigger.
    pub expanded: Style,
    /// Panel interior.
    pub panel: Style,
    /// Panel and flyout borders.
    pub panel_border: Style,
    /// Highlighted panel row.
    pub highlight: Style,
}

impl Default for NavMenuStyle {
    fn default() -> Self {
        Self {
            bar: Style::default(),
            focused: Style::default().with_attrs(AttrMask::UNDERLINE),
            expanded: Style::default().with_attrs(AttrMask::BOLD),
            panel: Style::default(),
            panel_border: Style::default(),
            highlight: Style::default().with_attrs(AttrMask::REVERSE),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions and published state
// ---------------------------------------------------------------------------

/// Actions reported by [`NavMenu::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Nothing of interest happened.
    Pass,
    /// A panel or the overflow flyout opened.
    Open,
    /// Something closed.
    Close,
    /// Focus or the panel highlight moved.
    Move,
    /// A panel entry was invoked.
    Invoke { item: usize, entry: usize },
}

/// A trigger on the bar: a regular item or the overflow bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Item(usize),
    More,
}

/// The shared measurement published for the host: how many rows below the
/// bar the open panel occupies, and whether the backdrop band should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Backdrop {
    pub height: i32,
    pub visible: bool,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseTarget {
    Item(usize),
    All,
}

#[derive(Debug)]
struct PendingClose {
    seq: u64,
    target: CloseTarget,
    handle: TimerHandle,
}

/// Deferred-close expiry. Carries the owning menu's id so a tick can never
/// cross over between two menu instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CloseTick {
    menu: u64,
    seq: u64,
}

/// Expiry of a trigger's transient animating flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AnimTick {
    menu: u64,
    item: usize,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
struct ItemState {
    expanded: bool,
    animating: bool,
    anim_seq: u64,
    overflow: bool,
    /// Trigger cells on the bar row. Empty while the item is in the bucket.
    bounds: Range,
}

// ---------------------------------------------------------------------------
// NavMenu
// ---------------------------------------------------------------------------

/// The navigation menu widget. One instance per attachment point; instances
/// are fully independent.
#[derive(Debug)]
pub struct NavMenu {
    id: u64,
    items: Vec<NavItem>,
    states: Vec<ItemState>,
    keys: NavMenuKeys,
    style: NavMenuStyle,
    close_delay: Duration,
    more_label: StyledText,
    width: i32,
    active: Option<usize>,
    pending: Option<PendingClose>,
    close_seq: u64,
    overflow_expanded: bool,
    more_bounds: Range,
    focus: Option<Trigger>,
    panel_cursor: Option<usize>,
    inside: bool,
    backdrop: Backdrop,
    action: NavAction,
    effects: Vec<Effect>,
}

impl NavMenu {
    /// Create a new menu from the given configuration.
    pub fn new(config: NavMenuConfig) -> Self {
        let states = vec![ItemState::default(); config.items.len()];
        let mut menu = Self {
            id: NEXT_MENU_ID.fetch_add(1, Ordering::Relaxed),
            items: config.items,
            states,
            keys: config.keys,
            style: config.style,
            close_delay: config.close_delay,
            more_label: config.more_label,
            width: config.width.max(0),
            active: None,
            pending: None,
            close_seq: 0,
            overflow_expanded: false,
            more_bounds: Range::default(),
            focus: None,
            panel_cursor: None,
            inside: false,
            backdrop: Backdrop::default(),
            action: NavAction::Pass,
            effects: Vec::new(),
        };
        menu.layout();
        menu
    }

    /// Process an input message and collect the resulting effects.
    pub fn update(&mut self, msg: Msg) -> Option<Effect> {
        self.action = NavAction::Pass;
        match msg {
            Msg::KeyDown { ref key, .. } => self.update_key(key),
            Msg::Mouse { action, pos, .. } => self.update_mouse(action, pos),
            Msg::Focus { gained, .. } => {
                if !gained {
                    self.leave();
                }
            }
            _ => {
                if let Some(&tick) = msg.downcast_ref::<CloseTick>() {
                    self.on_close_tick(tick);
                } else if let Some(&tick) = msg.downcast_ref::<AnimTick>() {
                    self.on_anim_tick(tick);
                }
            }
        }
        self.flush_effects()
    }

    /// Adjust the available bar width. Closes everything immediately,
    /// cancels any pending close and recomputes the overflow partition.
    pub fn set_width(&mut self, width: i32) {
        if width.max(0) == self.width {
            return;
        }
        self.width = width.max(0);
        self.cancel_pending();
        for st in &mut self.states {
            st.expanded = false;
            st.animating = false;
        }
        self.active = None;
        self.overflow_expanded = false;
        self.focus = None;
        self.panel_cursor = None;
        self.inside = false;
        self.layout();
        self.refresh_backdrop();
    }

    // -- accessors --

    /// The last action.
    pub fn action(&self) -> NavAction {
        self.action
    }

    /// The published backdrop measurement.
    pub fn backdrop(&self) -> Backdrop {
        self.backdrop
    }

    /// Index of the item whose panel is open, if any.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Whether item `i` is expanded. Out of range: `false`.
    pub fn is_expanded(&self, i: usize) -> bool {
        self.states.get(i).is_some_and(|st| st.expanded)
    }

    /// Whether the overflow bucket is expanded.
    pub fn overflow_expanded(&self) -> bool {
        self.overflow_expanded
    }

    /// The keyboard-focused trigger, if any.
    pub fn focused(&self) -> Option<Trigger> {
        self.focus
    }

    // -- layout --

    fn trigger_width(item: &NavItem) -> i32 {
        item.label.size().x + if item.panel.is_some() { 4 } else { 2 }
    }

    fn more_width(&self) -> i32 {
        self.more_label.size().x + 4
    }

    /// Partition items into bar triggers and the overflow bucket and assign
    /// trigger bounds. Once one item overflows, every later item does too,
    /// so bar order is preserved.
    fn layout(&mut self) {
        let total: i32 = self.items.iter().map(Self::trigger_width).sum();
        let overflow_needed = total > self.width;
        let budget = if overflow_needed {
            (self.width - self.more_width()).max(0)
        } else {
            self.width
        };

        let mut x = 0;
        let mut overflowing = false;
        for (i, item) in self.items.iter().enumerate() {
            let w = Self::trigger_width(item);
            let st = &mut self.states[i];
            if overflow_needed && (overflowing || x + w > budget) {
                overflowing = true;
                st.overflow = true;
                st.bounds = Range::default();
            } else {
                st.overflow = false;
                st.bounds = Range::with_size(Point::new(x, 0), w, 1);
                x += w;
            }
        }

        self.more_bounds = if overflow_needed {
            let w = self.more_width().min(self.width - x).max(0);
            Range::with_size(Point::new(x, 0), w, 1)
        } else {
            Range::default()
        };
    }

    fn overflow_members(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, st)| st.overflow)
            .map(|(i, _)| i)
            .collect()
    }

    /// Display rectangle of item `i`'s panel, borders included.
    fn panel_rect(&self, i: usize) -> Option<Range> {
        let panel = self.items[i].panel.as_ref()?;
        let w = panel.content_width() + 2;
        let h = panel.rows() + 2;
        let x = if self.states[i].overflow {
            let fly = self.flyout_rect()?;
            (fly.min.x - w).max(0)
        } else {
            self.states[i].bounds.min.x.min(self.width - w).max(0)
        };
        Some(Range::with_size(Point::new(x, 1), w, h))
    }

    /// Display rectangle of the overflow flyout, borders included.
    fn flyout_rect(&self) -> Option<Range> {
        let members = self.overflow_members();
        if members.is_empty() {
            return None;
        }
        let w = members
            .iter()
            .map(|&i| self.items[i].label.size().x)
            .max()
            .unwrap_or(0)
            + 2;
        let h = members.len() as i32 + 2;
        let x = self.more_bounds.min.x.min(self.width - w).max(0);
        Some(Range::with_size(Point::new(x, 1), w, h))
    }

    // -- hit testing --

    fn trigger_at(&self, pos: Point) -> Option<usize> {
        self.states.iter().position(|st| st.bounds.contains(pos))
    }

    fn panel_entry_at(&self, i: usize, pos: Point) -> Option<usize> {
        let rect = self.panel_rect(i)?;
        if !rect.contains(pos) || pos.x == rect.min.x || pos.x == rect.max.x - 1 {
            return None;
        }
        let row = pos.y - rect.min.y - 1;
        let panel = self.items[i].panel.as_ref()?;
        if row >= 0 && row < panel.rows() {
            Some(row as usize)
        } else {
            None
        }
    }

    fn flyout_member_at(&self, pos: Point) -> Option<usize> {
        if !self.overflow_expanded {
            return None;
        }
        let rect = self.flyout_rect()?;
        if !rect.contains(pos) || pos.x == rect.min.x || pos.x == rect.max.x - 1 {
            return None;
        }
        let row = pos.y - rect.min.y - 1;
        let members = self.overflow_members();
        if row >= 0 && (row as usize) < members.len() {
            Some(members[row as usize])
        } else {
            None
        }
    }

    fn in_open_panel(&self, pos: Point) -> bool {
        let in_panel = self
            .active
            .filter(|&i| self.states[i].expanded)
            .and_then(|i| self.panel_rect(i))
            .is_some_and(|r| r.contains(pos));
        let in_flyout = self.overflow_expanded
            && self.flyout_rect().is_some_and(|r| r.contains(pos));
        in_panel || in_flyout
    }

    /// Whether `pos` is over the widget: the bar row or any open surface.
    fn hit(&self, pos: Point) -> bool {
        (pos.y == 0 && pos.x >= 0 && pos.x < self.width) || self.in_open_panel(pos)
    }

    // -- transitions --

    fn cancel_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            p.handle.cancel();
        }
    }

    fn schedule_close(&mut self, target: CloseTarget) {
        self.cancel_pending();
        self.close_seq += 1;
        let seq = self.close_seq;
        let (effect, handle) = timer::delay(
            self.close_delay,
            Msg::custom(CloseTick { menu: self.id, seq }),
        );
        self.pending = Some(PendingClose {
            seq,
            target,
            handle,
        });
        self.effects.push(effect);
    }

    /// Raise the transient animating flag on item `i` and schedule its
    /// clearing: after the grace delay when opening, on the next loop pass
    /// when closing immediately.
    fn start_anim(&mut self, i: usize, clear_after: Option<Duration>) {
        let st = &mut self.states[i];
        st.anim_seq += 1;
        st.animating = true;
        let tick = Msg::custom(AnimTick {
            menu: self.id,
            item: i,
            seq: st.anim_seq,
        });
        self.effects.push(match clear_after {
            Some(after) => timer::delay(after, tick).0,
            None => timer::next_frame(tick),
        });
    }

    fn open_item(&mut self, i: usize) {
        self.states[i].expanded = true;
        self.start_anim(i, Some(self.close_delay));
        self.overflow_expanded = self.states[i].overflow;
        self.active = Some(i);
        self.refresh_backdrop();
        self.action = NavAction::Open;
    }

    fn close_item_now(&mut self, i: usize) {
        self.states[i].expanded = false;
        self.start_anim(i, None);
        if self.states[i].overflow {
            self.overflow_expanded = false;
        }
        if self.active == Some(i) {
            self.active = None;
        }
        self.panel_cursor = None;
        self.refresh_backdrop();
        self.action = NavAction::Close;
    }

    /// Hover or focus landed on trigger `i`. Re-activating the active item
    /// only cancels a pending close; it restarts nothing.
    fn activate(&mut self, i: usize) {
        self.cancel_pending();
        if self.active == Some(i) {
            return;
        }
        if let Some(old) = self.active {
            self.close_item_now(old);
        }
        self.panel_cursor = None;
        self.open_item(i);
    }

    /// Hover or focus landed on the bucket trigger.
    fn activate_more(&mut self) {
        self.cancel_pending();
        if self.overflow_expanded {
            return;
        }
        if let Some(old) = self.active {
            if !self.states[old].overflow {
                self.close_item_now(old);
            }
        }
        self.overflow_expanded = true;
        self.panel_cursor = None;
        self.action = NavAction::Open;
    }

    /// Hover left trigger `i`: schedule its close after the grace delay.
    fn deactivate(&mut self, i: usize) {
        self.schedule_close(CloseTarget::Item(i));
    }

    /// Pointer left the widget (or the terminal lost focus): schedule a
    /// deferred close of everything.
    fn leave(&mut self) {
        if self.active.is_some() || self.overflow_expanded {
            self.schedule_close(CloseTarget::All);
        } else {
            self.cancel_pending();
        }
    }

    /// Close everything immediately and put the keyboard focus back on the
    /// trigger of the item that was open.
    fn escape(&mut self) {
        self.cancel_pending();
        let prev = self.active;
        if let Some(i) = prev {
            self.close_item_now(i);
        }
        if self.overflow_expanded {
            self.overflow_expanded = false;
            self.action = NavAction::Close;
        }
        if let Some(i) = prev {
            self.focus = Some(if self.states[i].overflow {
                Trigger::More
            } else {
                Trigger::Item(i)
            });
        }
        self.panel_cursor = None;
        self.refresh_backdrop();
    }

    fn on_close_tick(&mut self, tick: CloseTick) {
        if tick.menu != self.id {
            return;
        }
        let current = self.pending.as_ref().is_some_and(|p| p.seq == tick.seq);
        if !current {
            // Superseded or cancelled after expiry. Ignore.
            return;
        }
        let target = self.pending.take().map(|p| p.target);
        match target {
            Some(CloseTarget::Item(i)) => {
                // The grace delay already elapsed, so no animating flag.
                if self.states.get(i).is_some_and(|st| st.expanded) {
                    self.states[i].expanded = false;
                    if self.active == Some(i) {
                        self.active = None;
                    }
                    self.panel_cursor = None;
                    self.refresh_backdrop();
                    self.action = NavAction::Close;
                }
            }
            Some(CloseTarget::All) => {
                let mut closed = false;
                for st in &mut self.states {
                    if st.expanded {
                        st.expanded = false;
                        closed = true;
                    }
                }
                closed |= self.active.take().is_some();
                if self.overflow_expanded {
                    self.overflow_expanded = false;
                    closed = true;
                }
                self.panel_cursor = None;
                self.refresh_backdrop();
                if closed {
                    self.action = NavAction::Close;
                }
            }
            None => {}
        }
    }

    fn on_anim_tick(&mut self, tick: AnimTick) {
        if tick.menu != self.id || tick.item >= self.states.len() {
            return;
        }
        let st = &mut self.states[tick.item];
        if st.anim_seq == tick.seq {
            st.animating = false;
        }
    }

    fn refresh_backdrop(&mut self) {
        let height = self
            .active
            .filter(|&i| self.states[i].expanded)
            .and_then(|i| self.panel_rect(i))
            .map(|r| r.height())
            .unwrap_or(0);
        self.backdrop = Backdrop {
            height,
            visible: height > 0,
        };
    }

    // -- input dispatch --

    fn update_key(&mut self, key: &Key) {
        if self.keys.close.contains(key) {
            self.escape();
        } else if self.keys.next.contains(key) {
            self.focus_move(1);
        } else if self.keys.prev.contains(key) {
            self.focus_move(-1);
        } else if self.keys.down.contains(key) {
            self.cursor_move(1);
        } else if self.keys.up.contains(key) {
            self.cursor_move(-1);
        } else if self.keys.invoke.contains(key) {
            self.invoke();
        }
    }

    fn visible_triggers(&self) -> Vec<Trigger> {
        let mut v: Vec<Trigger> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, st)| !st.overflow)
            .map(|(i, _)| Trigger::Item(i))
            .collect();
        if !self.more_bounds.is_empty() {
            v.push(Trigger::More);
        }
        v
    }

    /// Move trigger focus; focusing a trigger opens it, matching hover.
    fn focus_move(&mut self, delta: i32) {
        let triggers = self.visible_triggers();
        if triggers.is_empty() {
            return;
        }
        let len = triggers.len() as i32;
        let cur = self
            .focus
            .and_then(|f| triggers.iter().position(|&t| t == f));
        let next = match cur {
            Some(i) => (i as i32 + delta).rem_euclid(len),
            None if delta > 0 => 0,
            None => len - 1,
        } as usize;
        self.focus = Some(triggers[next]);
        self.panel_cursor = None;
        self.action = NavAction::Move;
        match triggers[next] {
            Trigger::Item(i) => self.activate(i),
            Trigger::More => self.activate_more(),
        }
    }

    /// Rows the panel cursor can move over: the open panel's entries, or the
    /// flyout members while only the bucket is expanded.
    fn cursor_rows(&self) -> usize {
        if let Some(i) = self.active {
            self.items[i].panel.as_ref().map_or(0, |p| p.entries.len())
        } else if self.overflow_expanded {
            self.overflow_members().len()
        } else {
            0
        }
    }

    fn cursor_move(&mut self, delta: i32) {
        let rows = self.cursor_rows();
        if rows == 0 {
            return;
        }
        let next = match self.panel_cursor {
            None if delta > 0 => Some(0),
            None => None,
            Some(0) if delta < 0 => None,
            Some(r) => Some((r as i32 + delta).clamp(0, rows as i32 - 1) as usize),
        };
        if next != self.panel_cursor {
            self.panel_cursor = next;
            self.action = NavAction::Move;
        }
    }

    fn invoke(&mut self) {
        if let Some(cursor) = self.panel_cursor {
            if let Some(i) = self.active {
                if self.items[i].panel.is_some() {
                    self.action = NavAction::Invoke {
                        item: i,
                        entry: cursor,
                    };
                }
            } else if self.overflow_expanded {
                if let Some(&member) = self.overflow_members().get(cursor) {
                    self.activate(member);
                }
            }
        } else {
            match self.focus {
                Some(Trigger::Item(i)) => self.activate(i),
                Some(Trigger::More) => self.activate_more(),
                None => {}
            }
        }
    }

    fn update_mouse(&mut self, action: MouseAction, pos: Point) {
        match action {
            MouseAction::Move => self.pointer_moved(pos),
            MouseAction::Main => self.pointer_pressed(pos),
            _ => {}
        }
    }

    fn pointer_moved(&mut self, pos: Point) {
        let was_inside = self.inside;
        self.inside = self.hit(pos);

        if let Some(i) = self.trigger_at(pos) {
            self.activate(i);
        } else if self.more_bounds.contains(pos) {
            self.activate_more();
        } else if let Some(member) = self.flyout_member_at(pos) {
            self.activate(member);
        } else if self.in_open_panel(pos) {
            // Hovering the open surface keeps it open.
            self.cancel_pending();
            if let Some(i) = self.active {
                if let Some(entry) = self.panel_entry_at(i, pos) {
                    if self.panel_cursor != Some(entry) {
                        self.panel_cursor = Some(entry);
                        self.action = NavAction::Move;
                    }
                }
            }
        } else if self.inside {
            // On the bar but over nothing interactive.
            if let Some(i) = self.active {
                let already = matches!(
                    &self.pending,
                    Some(p) if p.target == CloseTarget::Item(i)
                );
                if !already {
                    self.deactivate(i);
                }
            }
        } else if was_inside {
            self.leave();
        }
    }

    fn pointer_pressed(&mut self, pos: Point) {
        if let Some(i) = self.trigger_at(pos) {
            self.activate(i);
        } else if self.more_bounds.contains(pos) {
            // A click toggles the bucket.
            if self.overflow_expanded {
                if let Some(member) = self.active.filter(|&m| self.states[m].overflow) {
                    self.close_item_now(member);
                }
                self.overflow_expanded = false;
                self.action = NavAction::Close;
            } else {
                self.activate_more();
            }
        } else if let Some(member) = self.flyout_member_at(pos) {
            self.activate(member);
        } else if let Some((item, entry)) = self
            .active
            .and_then(|i| self.panel_entry_at(i, pos).map(|e| (i, e)))
        {
            self.action = NavAction::Invoke { item, entry };
        } else if !self.hit(pos) {
            self.inside = false;
            self.leave();
        }
    }

    fn flush_effects(&mut self) -> Option<Effect> {
        match self.effects.len() {
            0 => None,
            1 => self.effects.pop(),
            _ => Some(Effect::Batch(std::mem::take(&mut self.effects))),
        }
    }

    // -- drawing --

    /// Render the bar and any open surfaces. The host slices the grid so
    /// row 0 is the bar row.
    pub fn draw(&self, grid: &Grid) {
        let bar = grid.slice(grid.range_().line(0));
        bar.fill(Cell::default().with_style(self.style.bar));

        for (i, item) in self.items.iter().enumerate() {
            let st = &self.states[i];
            if st.overflow {
                continue;
            }
            let style = self.trigger_style(Trigger::Item(i), st.expanded || st.animating);
            self.draw_trigger(&bar, st.bounds, &item.label, item.panel.is_some(), style);
        }

        if !self.more_bounds.is_empty() {
            let style = self.trigger_style(Trigger::More, self.overflow_expanded);
            self.draw_trigger(&bar, self.more_bounds, &self.more_label, true, style);
        }

        if self.overflow_expanded {
            self.draw_flyout(grid);
        }

        if let Some(i) = self.active {
            if self.states[i].expanded {
                self.draw_panel(grid, i);
            }
        }
    }

    fn trigger_style(&self, t: Trigger, expanded: bool) -> Option<Style> {
        if expanded {
            Some(self.style.expanded)
        } else if self.focus == Some(t) {
            Some(self.style.focused)
        } else {
            // Idle triggers keep their label's own style.
            None
        }
    }

    fn draw_trigger(
        &self,
        bar: &Grid,
        bounds: Range,
        label: &StyledText,
        has_panel: bool,
        style: Option<Style>,
    ) {
        if bounds.is_empty() {
            return;
        }
        let style = style.unwrap_or(label.style());
        for p in bounds.iter() {
            bar.set(p, Cell::default().with_style(style));
        }
        let text = bar.slice(Range::new(bounds.min.x + 1, 0, bounds.max.x - 1, 1));
        label.clone().with_style(style).draw(&text);
        if has_panel {
            bar.set(
                Point::new(bounds.max.x - 2, 0),
                Cell::default().with_char('\u{25be}').with_style(style),
            );
        }
    }

    fn draw_flyout(&self, grid: &Grid) {
        let Some(rect) = self.flyout_rect() else {
            return;
        };
        let fly = grid.slice(rect);
        fly.fill(Cell::default().with_style(self.style.panel));
        let inner = Border::new().with_style(self.style.panel_border).draw(&fly);
        let member_highlight = self.active.is_none();
        for (row, &member) in self.overflow_members().iter().enumerate() {
            let line = inner.line(row as i32);
            if line.is_empty() {
                break;
            }
            let row_grid = fly.slice(line);
            let highlighted = self.active == Some(member)
                || (member_highlight && self.panel_cursor == Some(row));
            if highlighted {
                row_grid.fill(Cell::default().with_style(self.style.highlight));
                self.items[member]
                    .label
                    .clone()
                    .with_style(self.style.highlight)
                    .draw(&row_grid);
            } else {
                self.items[member].label.draw(&row_grid);
            }
        }
    }

    fn draw_panel(&self, grid: &Grid, i: usize) {
        let Some(panel) = self.items[i].panel.as_ref() else {
            return;
        };
        let Some(rect) = self.panel_rect(i) else {
            return;
        };
        let pg = grid.slice(rect);
        pg.fill(Cell::default().with_style(self.style.panel));
        let inner = Border::new().with_style(self.style.panel_border).draw(&pg);
        for (row, entry) in panel.entries.iter().enumerate() {
            let line = inner.line(row as i32);
            if line.is_empty() {
                break;
            }
            let row_grid = pg.slice(line);
            if self.panel_cursor == Some(row) {
                row_grid.fill(Cell::default().with_style(self.style.highlight));
                entry.clone().with_style(self.style.highlight).draw(&row_grid);
            } else {
                entry.draw(&row_grid);
            }
        }
    }
}

impl Drop for NavMenu {
    /// Detaching the controller retracts its scheduled close, so no timer
    /// callback outlives the widget.
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use vitrine_core::ModMask;

    fn items() -> Vec<NavItem> {
        vec![
            NavItem::new(StyledText::text("Shop")).with_panel(Panel::new(vec![
                StyledText::text("New arrivals"),
                StyledText::text("Best sellers"),
                StyledText::text("Gift cards"),
            ])),
            NavItem::new(StyledText::text("Stories")).with_panel(Panel::new(vec![
                StyledText::text("Journal"),
                StyledText::text("Lookbook"),
            ])),
            NavItem::new(StyledText::text("About")),
        ]
    }

    fn nav(width: i32) -> NavMenu {
        NavMenu::new(NavMenuConfig::new(items(), width))
    }

    fn mouse_move(x: i32, y: i32) -> Msg {
        Msg::Mouse {
            action: MouseAction::Move,
            pos: Point::new(x, y),
            modifiers: ModMask::NONE,
            time: Instant::now(),
        }
    }

    fn mouse_click(x: i32, y: i32) -> Msg {
        Msg::Mouse {
            action: MouseAction::Main,
            pos: Point::new(x, y),
            modifiers: ModMask::NONE,
            time: Instant::now(),
        }
    }

    /// The tick the currently pending close will deliver.
    fn pending_tick(menu: &NavMenu) -> Msg {
        let p = menu.pending.as_ref().expect("no pending close");
        Msg::custom(CloseTick {
            menu: menu.id,
            seq: p.seq,
        })
    }

    fn expanded_count(menu: &NavMenu) -> usize {
        menu.states.iter().filter(|st| st.expanded).count()
    }

    // Bar layout with the default items and width 60:
    // " Shop ▾ "    columns 0..8
    // " Stories ▾ " columns 8..19
    // " About "     columns 19..26

    #[test]
    fn hover_opens_and_publishes_backdrop() {
        let mut m = nav(60);
        let effect = m.update(mouse_move(1, 0));
        assert!(effect.is_some());
        assert!(m.is_expanded(0));
        assert_eq!(m.active(), Some(0));
        assert_eq!(m.action(), NavAction::Open);
        // 3 entries plus the border rows.
        assert_eq!(m.backdrop(), Backdrop { height: 5, visible: true });
    }

    #[test]
    fn switching_closes_the_old_item_immediately() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(9, 0));
        assert!(!m.is_expanded(0));
        assert!(m.is_expanded(1));
        assert_eq!(m.active(), Some(1));
        assert_eq!(expanded_count(&m), 1);
        assert_eq!(m.backdrop().height, 4);
    }

    #[test]
    fn reactivating_the_active_item_is_a_no_op() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        let seq_before = m.states[0].anim_seq;
        let effect = m.update(mouse_move(3, 0));
        assert!(effect.is_none());
        assert_eq!(m.states[0].anim_seq, seq_before);
        assert_eq!(m.action(), NavAction::Pass);
        assert!(m.pending.is_none());
    }

    #[test]
    fn unhovering_closes_after_the_grace_delay() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(40, 0));
        // Still open: the close is only scheduled.
        assert!(m.is_expanded(0));
        assert!(m.pending.is_some());
        let tick = pending_tick(&m);
        m.update(tick);
        assert!(!m.is_expanded(0));
        assert_eq!(m.active(), None);
        assert_eq!(m.backdrop(), Backdrop::default());
        assert!(m.pending.is_none());
    }

    #[test]
    fn returning_before_expiry_keeps_the_panel_open() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0)); // open Shop
        m.update(mouse_move(9, 0)); // switch to Stories
        assert!(m.is_expanded(1));
        m.update(mouse_move(40, 0)); // leave the trigger
        let stale = pending_tick(&m);
        m.update(mouse_move(9, 0)); // come back before expiry
        assert!(m.pending.is_none());
        m.update(stale); // the superseded tick still arrives
        assert!(m.is_expanded(1));
        assert_eq!(m.active(), Some(1));
    }

    #[test]
    fn jitter_on_the_bar_does_not_reschedule() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(40, 0));
        let seq = m.pending.as_ref().unwrap().seq;
        m.update(mouse_move(41, 0));
        m.update(mouse_move(42, 0));
        assert_eq!(m.pending.as_ref().unwrap().seq, seq);
    }

    #[test]
    fn hovering_the_open_panel_cancels_the_close() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(40, 0));
        assert!(m.pending.is_some());
        // Shop's panel spans (0,1)..(14,6); row y=2 is the first entry.
        m.update(mouse_move(5, 2));
        assert!(m.pending.is_none());
        assert!(m.is_expanded(0));
        assert_eq!(m.panel_cursor, Some(0));
    }

    #[test]
    fn leaving_the_widget_closes_everything_deferred() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(30, 8)); // well below the bar and panel
        assert!(m.is_expanded(0));
        let tick = pending_tick(&m);
        m.update(tick);
        assert_eq!(expanded_count(&m), 0);
        assert_eq!(m.active(), None);
        assert!(!m.overflow_expanded());
    }

    #[test]
    fn escape_closes_now_and_returns_focus() {
        let mut m = nav(60);
        m.update(mouse_move(9, 0));
        assert!(m.is_expanded(1));
        m.update(Msg::key(Key::Escape));
        assert_eq!(expanded_count(&m), 0);
        assert_eq!(m.active(), None);
        assert_eq!(m.focused(), Some(Trigger::Item(1)));
        assert_eq!(m.backdrop().height, 0);
    }

    #[test]
    fn focus_loss_behaves_like_leaving() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(Msg::Focus {
            gained: false,
            time: Instant::now(),
        });
        assert!(m.pending.is_some());
        let tick = pending_tick(&m);
        m.update(tick);
        assert_eq!(expanded_count(&m), 0);
    }

    #[test]
    fn stale_animation_ticks_are_ignored() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0)); // Shop: anim_seq 1
        m.update(mouse_move(9, 0)); // Shop closes: anim_seq 2
        m.update(mouse_move(1, 0)); // Shop reopens: anim_seq 3
        assert!(m.states[0].animating);
        m.update(Msg::custom(AnimTick {
            menu: m.id,
            item: 0,
            seq: 2,
        }));
        assert!(m.states[0].animating);
        m.update(Msg::custom(AnimTick {
            menu: m.id,
            item: 0,
            seq: 3,
        }));
        assert!(!m.states[0].animating);
    }

    #[test]
    fn keyboard_walks_triggers_and_panel() {
        let mut m = nav(60);
        m.update(Msg::key(Key::ArrowRight));
        assert_eq!(m.focused(), Some(Trigger::Item(0)));
        assert!(m.is_expanded(0));
        m.update(Msg::key(Key::ArrowDown));
        m.update(Msg::key(Key::ArrowDown));
        assert_eq!(m.panel_cursor, Some(1));
        m.update(Msg::key(Key::Enter));
        assert_eq!(m.action(), NavAction::Invoke { item: 0, entry: 1 });
        // Moving focus onward switches panels.
        m.update(Msg::key(Key::Tab));
        assert_eq!(m.focused(), Some(Trigger::Item(1)));
        assert!(!m.is_expanded(0));
        assert!(m.is_expanded(1));
    }

    #[test]
    fn click_invokes_a_panel_entry() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_click(5, 2));
        assert_eq!(m.action(), NavAction::Invoke { item: 0, entry: 0 });
    }

    #[test]
    fn activating_a_panel_less_item_keeps_the_backdrop_hidden() {
        let mut m = nav(60);
        m.update(mouse_move(20, 0));
        assert!(m.is_expanded(2));
        assert_eq!(m.backdrop(), Backdrop { height: 0, visible: false });
    }

    // Width 20 forces an overflow partition:
    // " Shop ▾ " columns 0..8, " More ▾ " columns 8..16,
    // Stories and About in the bucket.

    #[test]
    fn narrow_width_partitions_into_the_bucket() {
        let m = nav(20);
        assert!(!m.states[0].overflow);
        assert!(m.states[1].overflow);
        assert!(m.states[2].overflow);
        assert_eq!(m.more_bounds, Range::new(8, 0, 16, 1));
        assert_eq!(m.overflow_members(), vec![1, 2]);
    }

    #[test]
    fn bucket_expands_and_members_activate() {
        let mut m = nav(20);
        m.update(mouse_move(9, 0));
        assert!(m.overflow_expanded());
        assert_eq!(m.active(), None);
        // Flyout spans (8,1)..(17,5); row y=2 is the first member (Stories).
        m.update(mouse_move(10, 2));
        assert!(m.is_expanded(1));
        assert!(m.overflow_expanded());
        assert_eq!(m.backdrop().height, 4);
        // Leaving closes the members and collapses the bucket.
        m.update(mouse_move(0, 9));
        let tick = pending_tick(&m);
        m.update(tick);
        assert_eq!(expanded_count(&m), 0);
        assert!(!m.overflow_expanded());
    }

    #[test]
    fn opening_a_bar_item_collapses_the_bucket() {
        let mut m = nav(20);
        m.update(mouse_move(9, 0));
        assert!(m.overflow_expanded());
        m.update(mouse_move(1, 0));
        assert!(!m.overflow_expanded());
        assert!(m.is_expanded(0));
    }

    #[test]
    fn escape_from_a_bucket_member_focuses_the_bucket() {
        let mut m = nav(20);
        m.update(mouse_move(9, 0));
        m.update(mouse_move(10, 2));
        assert!(m.is_expanded(1));
        m.update(Msg::key(Key::Escape));
        assert_eq!(expanded_count(&m), 0);
        assert!(!m.overflow_expanded());
        assert_eq!(m.focused(), Some(Trigger::More));
    }

    #[test]
    fn resize_closes_panels_and_repartitions() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(40, 0));
        assert!(m.pending.is_some());
        m.set_width(20);
        assert_eq!(expanded_count(&m), 0);
        assert!(m.pending.is_none());
        assert!(m.states[2].overflow);
        m.set_width(60);
        assert!(!m.states[2].overflow);
    }

    #[test]
    fn instances_ignore_each_others_ticks() {
        let mut a = nav(60);
        let mut b = nav(60);
        a.update(mouse_move(1, 0));
        a.update(mouse_move(40, 0));
        b.update(mouse_move(1, 0));
        b.update(mouse_move(40, 0));
        let tick_a = pending_tick(&a);
        b.update(tick_a.clone());
        // Same sequence number, different menu: nothing happens in b.
        assert!(b.is_expanded(0));
        assert!(b.pending.is_some());
        a.update(tick_a);
        assert!(!a.is_expanded(0));
    }

    #[test]
    fn dropping_the_menu_cancels_the_pending_close() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        m.update(mouse_move(40, 0));
        let handle = m.pending.as_ref().unwrap().handle.clone();
        assert!(!handle.is_cancelled());
        drop(m);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn draw_renders_bar_and_open_panel() {
        let mut m = nav(60);
        m.update(mouse_move(1, 0));
        let g = Grid::new(60, 10);
        m.draw(&g);
        // Trigger labels on the bar row.
        assert_eq!(g.at(Point::new(1, 0)).ch, 'S');
        assert_eq!(g.at(Point::new(6, 0)).ch, '\u{25be}');
        assert_eq!(g.at(Point::new(9, 0)).ch, 'S');
        // Panel border and first entry below the trigger.
        assert_eq!(g.at(Point::new(0, 1)).ch, '\u{250c}');
        assert_eq!(g.at(Point::new(1, 2)).ch, 'N');
    }

    #[test]
    fn any_interaction_sequence_keeps_at_most_one_item_expanded() {
        let mut m = nav(60);
        let script = [
            mouse_move(1, 0),
            mouse_move(9, 0),
            mouse_move(40, 0),
            mouse_move(1, 0),
            Msg::key(Key::ArrowRight),
            Msg::key(Key::Tab),
            mouse_move(20, 0),
            Msg::key(Key::Escape),
            mouse_move(9, 0),
        ];
        for msg in script {
            m.update(msg);
            assert!(expanded_count(&m) <= 1);
        }
    }
}
