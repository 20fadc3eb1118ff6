//! Storefront chrome widgets for vitrine: nav menu, search filter, footer.

mod styled_text;
mod border;
mod input;
mod menu;
mod search;
mod footer;

pub use styled_text::StyledText;
pub use border::{Alignment, Border};
pub use input::{TextInput, TextInputAction, TextInputConfig, TextInputKeys, TextInputStyle};
pub use menu::{
    Backdrop, NavAction, NavItem, NavMenu, NavMenuConfig, NavMenuKeys, NavMenuStyle, Panel,
    Trigger, DEFAULT_CLOSE_DELAY,
};
pub use search::{SearchAction, SearchFilter, SearchFilterConfig, DEFAULT_DEBOUNCE};
pub use footer::{Footer, FooterConfig, FooterStyle, LinkGroup};
