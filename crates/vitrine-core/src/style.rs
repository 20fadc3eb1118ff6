//! Cell styling: [`Color`], [`AttrMask`], and [`Style`].

use std::ops::{BitAnd, BitOr};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB color packed into a `u32` as 0x00RRGGBB. The zero value means
/// "unset" and lets the driver fall back to the terminal default.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// The unset color (terminal default).
    pub const DEFAULT: Self = Self(0);

    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

// ---------------------------------------------------------------------------
// AttrMask
// ---------------------------------------------------------------------------

/// Bitmask of text attributes applied to a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttrMask(pub u32);

impl AttrMask {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1 << 0);
    pub const ITALIC: Self = Self(1 << 1);
    pub const UNDERLINE: Self = Self(1 << 2);
    pub const BLINK: Self = Self(1 << 3);
    pub const REVERSE: Self = Self(1 << 4);
    pub const DIM: Self = Self(1 << 5);

    /// Whether every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AttrMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for AttrMask {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// The full visual style of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: AttrMask,
}

impl Style {
    #[inline]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    #[inline]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    #[inline]
    pub const fn with_attrs(mut self, attrs: AttrMask) -> Self {
        self.attrs = attrs;
        self
    }

    /// The style with foreground and background swapped. Handy for cursors
    /// and highlighted rows.
    #[inline]
    pub const fn reversed(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
            attrs: self.attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_components() {
        let c = Color::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x123456);
        assert_eq!((c.r(), c.g(), c.b()), (0x12, 0x34, 0x56));
        assert_eq!(Color::DEFAULT, Color(0));
    }

    #[test]
    fn attr_mask_combination() {
        let m = AttrMask::BOLD | AttrMask::DIM;
        assert!(m.contains(AttrMask::BOLD));
        assert!(m.contains(AttrMask::DIM));
        assert!(!m.contains(AttrMask::REVERSE));
        assert!(AttrMask::NONE.is_empty());
        assert_eq!(m & AttrMask::DIM, AttrMask::DIM);
    }

    #[test]
    fn style_builders_and_reverse() {
        let s = Style::default()
            .with_fg(Color::from_rgb(1, 2, 3))
            .with_bg(Color::from_rgb(9, 8, 7))
            .with_attrs(AttrMask::UNDERLINE);
        assert_eq!(s.fg, Color::from_rgb(1, 2, 3));
        let r = s.reversed();
        assert_eq!(r.fg, s.bg);
        assert_eq!(r.bg, s.fg);
        assert_eq!(r.attrs, s.attrs);
    }
}
