//! Static storefront data: navigation structure, products, footer links.

use vitrine_core::Style;
use vitrine_widgets::{FooterConfig, FooterStyle, LinkGroup, NavItem, Panel, StyledText};

use crate::colors::*;

/// A section of the navigation bar. An empty entry list means the section
/// is a plain link without a dropdown.
pub struct NavSection {
    pub label: &'static str,
    pub entries: &'static [&'static str],
}

pub const NAV: &[NavSection] = &[
    NavSection {
        label: "Shop",
        entries: &[
            "New arrivals",
            "Best sellers",
            "Apparel",
            "Home goods",
            "Gift cards",
        ],
    },
    NavSection {
        label: "Collections",
        entries: &["Summer", "Autumn", "Essentials"],
    },
    NavSection {
        label: "Stories",
        entries: &["Journal", "Lookbook"],
    },
    NavSection {
        label: "Sale",
        entries: &[],
    },
    NavSection {
        label: "About",
        entries: &["Our craft", "Stockists", "Contact"],
    },
];

/// A catalog product row.
pub struct Product {
    pub name: &'static str,
    pub price: &'static str,
    pub tag: Option<&'static str>,
}

pub const PRODUCTS: &[Product] = &[
    Product { name: "Linen Shirt", price: "$68", tag: None },
    Product { name: "Wool Socks", price: "$14", tag: Some("sale") },
    Product { name: "Canvas Tote", price: "$32", tag: None },
    Product { name: "Sun Hat", price: "$24", tag: None },
    Product { name: "Denim Apron", price: "$46", tag: None },
    Product { name: "Ceramic Mug", price: "$18", tag: Some("new") },
    Product { name: "Beeswax Candle", price: "$12", tag: None },
    Product { name: "Walnut Tray", price: "$54", tag: None },
    Product { name: "Field Notebook", price: "$9", tag: None },
    Product { name: "Enamel Kettle", price: "$72", tag: Some("sale") },
    Product { name: "Alpaca Throw", price: "$120", tag: None },
    Product { name: "Brass Opener", price: "$16", tag: Some("new") },
];

/// Build the nav items from [`NAV`].
pub fn nav_items() -> Vec<NavItem> {
    NAV.iter()
        .map(|section| {
            let label = StyledText::new(
                section.label,
                Style::default().with_fg(FG_EMPH).with_bg(CHROME_BG),
            );
            let item = NavItem::new(label);
            if section.entries.is_empty() {
                item
            } else {
                let entries = section
                    .entries
                    .iter()
                    .map(|e| StyledText::new(e, Style::default().with_fg(FG).with_bg(PANEL_BG)))
                    .collect();
                item.with_panel(Panel::new(entries))
            }
        })
        .collect()
}

/// Build the footer configuration.
pub fn footer_config() -> FooterConfig {
    let link = |s: &str| StyledText::text(s);
    FooterConfig {
        groups: vec![
            LinkGroup::new(
                StyledText::text("Help"),
                vec![link("Shipping"), link("Returns"), link("Size guide")],
            ),
            LinkGroup::new(
                StyledText::text("Company"),
                vec![link("Our craft"), link("Careers")],
            ),
            LinkGroup::new(
                StyledText::text("Follow"),
                vec![link("Newsletter"), link("Journal")],
            ),
        ],
        note: Some(StyledText::text(
            "Made in small batches. Shipped in plain boxes.",
        )),
        style: FooterStyle {
            background: Style::default().with_bg(CHROME_BG),
            title: Style::default().with_fg(FG_EMPH).with_bg(CHROME_BG),
            link: Style::default().with_fg(FG_DIM).with_bg(CHROME_BG),
            note: Style::default().with_fg(FG_DIM).with_bg(CHROME_BG),
        },
    }
}
