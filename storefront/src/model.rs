//! Elm-architecture model for the storefront screen.
//!
//! Screen layout, top to bottom: header row, nav bar (whose open panels
//! spill over the rows below), search row, product listing, status line,
//! footer. The model routes input to whichever widget owns it, relays the
//! nav's published backdrop measurement into a dimmed band behind the open
//! panel, and filters the product listing through the search query.

use vitrine_core::{
    Cell, Grid, Range, Style,
    app::{Effect, Model},
    messages::{Key, ModMask, Msg},
    style::AttrMask,
};
use vitrine_widgets::{
    Footer, NavAction, NavMenu, NavMenuConfig, NavMenuStyle, SearchAction, SearchFilter,
    SearchFilterConfig, StyledText, TextInputStyle,
};

use crate::catalog;
use crate::colors::*;

pub const UI_WIDTH: i32 = 80;
pub const UI_HEIGHT: i32 = 24;

/// Which surface owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

/// The storefront demo model.
pub struct StorefrontModel {
    nav: NavMenu,
    search: SearchFilter,
    footer: Footer,
    mode: Mode,
    width: i32,
    height: i32,
    status: String,
}

impl Default for StorefrontModel {
    fn default() -> Self {
        Self::new()
    }
}

impl StorefrontModel {
    pub fn new() -> Self {
        let mut nav_config = NavMenuConfig::new(catalog::nav_items(), UI_WIDTH);
        nav_config.style = NavMenuStyle {
            bar: Style::default().with_bg(CHROME_BG),
            focused: Style::default()
                .with_fg(ACCENT)
                .with_bg(CHROME_BG)
                .with_attrs(AttrMask::UNDERLINE),
            expanded: Style::default()
                .with_fg(FG_EMPH)
                .with_bg(PANEL_BG)
                .with_attrs(AttrMask::BOLD),
            panel: Style::default().with_bg(PANEL_BG),
            panel_border: Style::default().with_fg(FG_DIM).with_bg(PANEL_BG),
            highlight: Style::default().with_fg(CHROME_BG).with_bg(ACCENT),
        };
        let mut search_config = SearchFilterConfig::new(40);
        search_config.prompt = Some(StyledText::new("/ ", Style::default().with_fg(ACCENT)));
        search_config.style = TextInputStyle {
            text: Style::default().with_fg(FG_EMPH),
            cursor: Style::default(),
        };
        Self {
            nav: NavMenu::new(nav_config),
            search: SearchFilter::new(search_config),
            footer: Footer::new(catalog::footer_config()),
            mode: Mode::Browse,
            width: UI_WIDTH,
            height: UI_HEIGHT,
            status: String::from("Hover the bar above, or press / to search."),
        }
    }

    // -------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------

    fn update_browse(&mut self, msg: Msg) -> Option<Effect> {
        if let Msg::KeyDown {
            ref key, modifiers, ..
        } = msg
        {
            if quit_requested(key, modifiers) {
                return Some(Effect::End);
            }
            if *key == Key::Char('/') {
                self.mode = Mode::Search;
                return None;
            }
        }
        if matches!(msg, Msg::Custom(_)) {
            return self.update_ticks(msg);
        }
        let effect = self.nav.update(self.nav_range().rel_msg(msg));
        self.sync_nav();
        effect
    }

    fn update_search(&mut self, msg: Msg) -> Option<Effect> {
        if hard_quit(&msg) {
            return Some(Effect::End);
        }
        match msg {
            Msg::Mouse { pos, .. } => {
                // Clicks on the input row edit the query; everything else
                // still drives the nav, so hover stays live while typing.
                if self.search_range().contains(pos) {
                    let effect = self.search.update(self.search_range().rel_msg(msg));
                    self.sync_search();
                    effect
                } else {
                    let effect = self.nav.update(self.nav_range().rel_msg(msg));
                    self.sync_nav();
                    effect
                }
            }
            Msg::Focus { .. } => {
                let effect = self.nav.update(msg);
                self.sync_nav();
                effect
            }
            Msg::Custom(_) => self.update_ticks(msg),
            Msg::KeyDown { .. } => {
                let effect = self.search.update(msg);
                match self.search.action() {
                    SearchAction::Cancel => {
                        self.search.clear();
                        self.mode = Mode::Browse;
                        self.status = String::from("Search cancelled.");
                    }
                    SearchAction::Submit => {
                        self.mode = Mode::Browse;
                        self.sync_search();
                    }
                    _ => {}
                }
                effect
            }
            _ => None,
        }
    }

    /// Deferred-close and debounce expiries arrive as custom messages. Both
    /// widgets inspect every one and ignore those that are not theirs.
    fn update_ticks(&mut self, msg: Msg) -> Option<Effect> {
        let nav_effect = self.nav.update(msg.clone());
        let search_effect = self.search.update(msg);
        self.sync_nav();
        self.sync_search();
        match (nav_effect, search_effect) {
            (Some(a), Some(b)) => Some(Effect::Batch(vec![a, b])),
            (a, None) => a,
            (None, b) => b,
        }
    }

    fn sync_nav(&mut self) {
        if let NavAction::Invoke { item, entry } = self.nav.action() {
            let section = &catalog::NAV[item];
            if let Some(name) = section.entries.get(entry) {
                self.status = format!("Opened {}: {}.", section.label, name);
            }
        }
    }

    fn sync_search(&mut self) {
        match self.search.action() {
            SearchAction::Apply | SearchAction::Submit => {
                self.status = if self.search.query().is_empty() {
                    String::from("Showing the whole catalog.")
                } else {
                    format!(
                        "{} of {} products match \"{}\".",
                        self.match_count(),
                        catalog::PRODUCTS.len(),
                        self.search.query()
                    )
                };
            }
            _ => {}
        }
    }

    fn match_count(&self) -> usize {
        catalog::PRODUCTS
            .iter()
            .filter(|p| self.search.matches(p.name))
            .count()
    }

    fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.nav.set_width(width);
    }

    // -------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------

    /// The nav widget's slice: everything below the header, so its panels
    /// can spill over the content.
    fn nav_range(&self) -> Range {
        Range::new(0, 1, self.width, self.height)
    }

    /// The search input row.
    fn search_range(&self) -> Range {
        Range::new(2, 2, 42.min(self.width), 3)
    }

    // -------------------------------------------------------------------
    // Draw
    // -------------------------------------------------------------------

    fn draw_header(&self, grid: &Grid) {
        let header = grid.slice(grid.range_().line(0));
        header.fill(Cell::default().with_style(Style::default().with_bg(CHROME_BG)));
        StyledText::new(
            " VITRINE SUPPLY CO.",
            Style::default()
                .with_fg(ACCENT)
                .with_bg(CHROME_BG)
                .with_attrs(AttrMask::BOLD),
        )
        .draw(&header);
        let hint = "/ search   q quit ";
        let x = header.width() - hint.len() as i32;
        if x > 0 {
            StyledText::new(hint, Style::default().with_fg(FG_DIM).with_bg(CHROME_BG))
                .draw(&header.slice(header.range_().columns(x, header.width())));
        }
    }

    fn draw_content(&self, grid: &Grid) {
        match self.mode {
            Mode::Search => self.search.draw(&grid.slice(self.search_range())),
            Mode::Browse => {
                if !self.search.query().is_empty() {
                    let text = format!("filter: \"{}\"  (/ to edit)", self.search.query());
                    StyledText::new(&text, Style::default().with_fg(FG_DIM))
                        .draw(&grid.slice(self.search_range()));
                }
            }
        }

        let base = Style::default().with_fg(FG);
        let hl = Style::default().with_fg(CHROME_BG).with_bg(MATCH);
        let top = 4;
        let bottom = (self.height - self.footer.height() - 1).max(top);
        let mut row = top;
        for product in catalog::PRODUCTS {
            if row >= bottom {
                break;
            }
            if !self.search.matches(product.name) {
                continue;
            }
            let line = grid.range_().line(row);
            if line.is_empty() {
                break;
            }
            let lg = grid.slice(line);
            self.search
                .highlight(product.name, base, hl)
                .draw(&lg.slice(lg.range_().columns(2, 24)));
            StyledText::new(product.price, Style::default().with_fg(PRICE))
                .draw(&lg.slice(lg.range_().columns(25, 31)));
            if let Some(tag) = product.tag {
                let color = if tag == "sale" { SALE } else { FRESH };
                StyledText::new(tag, Style::default().with_fg(color))
                    .draw(&lg.slice(lg.range_().columns(32, 38)));
            }
            row += 1;
        }

        let status_row = self.height - self.footer.height() - 1;
        let line = grid.range_().line(status_row);
        if !line.is_empty() {
            StyledText::new(&self.status, Style::default().with_fg(FG_DIM))
                .draw(&grid.slice(line));
        }
    }

    fn draw_footer(&self, grid: &Grid) {
        let fh = self.footer.height();
        let r = grid.range_().lines(grid.height() - fh, grid.height());
        if !r.is_empty() {
            self.footer.draw(&grid.slice(r));
        }
    }

    /// Dim the rows behind the open panel. The nav publishes how tall the
    /// band is; the panel itself is drawn over it afterwards.
    fn draw_backdrop(&self, grid: &Grid) {
        let bd = self.nav.backdrop();
        if !bd.visible {
            return;
        }
        let band = grid.slice(grid.range_().lines(2, 2 + bd.height));
        band.map_cells(|_, cell| {
            cell.with_style(cell.style.with_fg(FG_DIM).with_bg(BACKDROP_BG))
        });
    }
}

impl Model for StorefrontModel {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::Init => None,
            Msg::Quit => Some(Effect::End),
            Msg::Screen { width, height, .. } => {
                self.resize(width, height);
                None
            }
            _ => match self.mode {
                Mode::Browse => self.update_browse(msg),
                Mode::Search => self.update_search(msg),
            },
        }
    }

    fn draw(&self, grid: &mut Grid) {
        grid.fill(Cell::default().with_style(Style::default().with_fg(FG).with_bg(BG)));
        self.draw_header(grid);
        self.draw_content(grid);
        self.draw_footer(grid);
        self.draw_backdrop(grid);
        self.nav.draw(&grid.slice(self.nav_range()));
    }
}

fn quit_requested(key: &Key, modifiers: ModMask) -> bool {
    matches!(key, Key::Char('q') | Key::Char('Q'))
        || (matches!(key, Key::Char('c') | Key::Char('C')) && modifiers.contains(ModMask::CTRL))
}

fn hard_quit(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::KeyDown { key: Key::Char('c'), modifiers, .. } if modifiers.contains(ModMask::CTRL)
    )
}
