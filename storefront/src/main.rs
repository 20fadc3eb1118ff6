//! Storefront demo: a shop screen built on vitrine's nav menu, search
//! filter, and footer widgets, rendered in the terminal.

mod catalog;
mod colors;
mod model;

use vitrine_core::app::{App, AppConfig};
use vitrine_crossterm::CrosstermDriver;

use model::{StorefrontModel, UI_HEIGHT, UI_WIDTH};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let model = StorefrontModel::new();
    let driver = CrosstermDriver::new();
    let mut app = App::new(AppConfig {
        model,
        driver,
        width: UI_WIDTH,
        height: UI_HEIGHT,
    });
    app.run()?;
    Ok(())
}
