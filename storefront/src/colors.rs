//! Color palette for the storefront demo, tuned for a dark terminal.

use vitrine_core::style::Color;

// -- Backgrounds --

/// Default terminal background (reset).
pub const BG: Color = Color::DEFAULT;
/// Chrome background for the nav bar and footer.
pub const CHROME_BG: Color = Color::from_rgb(40, 42, 54);
/// Dropdown panel and flyout background.
pub const PANEL_BG: Color = Color::from_rgb(52, 55, 70);
/// Backdrop band behind an open panel.
pub const BACKDROP_BG: Color = Color::from_rgb(28, 29, 38);

// -- Foregrounds --

/// Default terminal foreground (reset).
pub const FG: Color = Color::DEFAULT;
/// Dimmed foreground for notes and backdropped content.
pub const FG_DIM: Color = Color::from_rgb(98, 100, 106);
/// Bright white for emphasis.
pub const FG_EMPH: Color = Color::from_rgb(248, 248, 242);

// -- Named palette colours --

/// Brand accent.
pub const ACCENT: Color = Color::from_rgb(140, 120, 255);
/// Price tags.
pub const PRICE: Color = Color::from_rgb(220, 200, 60);
/// Sale markers.
pub const SALE: Color = Color::from_rgb(255, 85, 85);
/// New-item markers.
pub const FRESH: Color = Color::from_rgb(80, 200, 80);
/// Matched search span.
pub const MATCH: Color = Color::from_rgb(80, 210, 210);
