//! Input events: [`Msg`], [`Key`], [`MouseAction`], [`ModMask`].

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use crate::geom::Point;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A keyboard key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Tab,
    /// Shift+Tab as reported by the terminal.
    BackTab,
    Space,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    /// A printable character.
    Char(char),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::ArrowUp => write!(f, "↑"),
            Key::ArrowDown => write!(f, "↓"),
            Key::ArrowLeft => write!(f, "←"),
            Key::ArrowRight => write!(f, "→"),
            Key::Escape => write!(f, "esc"),
            Key::Enter => write!(f, "enter"),
            Key::Tab => write!(f, "tab"),
            Key::BackTab => write!(f, "shift+tab"),
            Key::Space => write!(f, "space"),
            Key::Backspace => write!(f, "backspace"),
            Key::Delete => write!(f, "delete"),
            Key::Home => write!(f, "home"),
            Key::End => write!(f, "end"),
            Key::PageUp => write!(f, "pgup"),
            Key::PageDown => write!(f, "pgdn"),
            Key::Insert => write!(f, "insert"),
            Key::Char(c) => write!(f, "{c}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ModMask
// ---------------------------------------------------------------------------

/// Bitmask of modifier keys held during an input event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModMask(pub u8);

impl ModMask {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CTRL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    pub const META: Self = Self(1 << 3);

    /// Whether this mask contains all bits of `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ModMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ModMask {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// MouseAction
// ---------------------------------------------------------------------------

/// A mouse action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseAction {
    /// Primary (left) button pressed.
    Main,
    /// Middle button pressed.
    Auxiliary,
    /// Secondary (right) button pressed.
    Secondary,
    WheelUp,
    WheelDown,
    /// Button released.
    Release,
    /// Mouse moved (no button state change).
    Move,
}

// ---------------------------------------------------------------------------
// Msg
// ---------------------------------------------------------------------------

/// An input message delivered to the application.
#[derive(Clone)]
pub enum Msg {
    /// A key was pressed.
    KeyDown {
        key: Key,
        modifiers: ModMask,
        time: Instant,
    },
    /// A mouse event.
    Mouse {
        action: MouseAction,
        pos: Point,
        modifiers: ModMask,
        time: Instant,
    },
    /// The screen / terminal was resized.
    Screen {
        width: i32,
        height: i32,
        time: Instant,
    },
    /// The terminal gained or lost input focus.
    Focus { gained: bool, time: Instant },
    /// Sent once when the application starts.
    Init,
    /// Request to quit.
    Quit,
    /// An application- or widget-defined message, typically delivered by an
    /// [`Effect::Cmd`](crate::app::Effect) closure. Inspect it with
    /// [`Msg::downcast_ref`].
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Msg {
    /// Convenience: create a `KeyDown` with no modifiers.
    pub fn key(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: ModMask::NONE,
            time: Instant::now(),
        }
    }

    /// Convenience: create a `KeyDown` with modifiers.
    pub fn key_mod(key: Key, modifiers: ModMask) -> Self {
        Self::KeyDown {
            key,
            modifiers,
            time: Instant::now(),
        }
    }

    /// Wrap an arbitrary value as a custom message.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// If this is a `Custom` message carrying a `T`, borrow it.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Msg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyDown {
                key,
                modifiers,
                time,
            } => f
                .debug_struct("KeyDown")
                .field("key", key)
                .field("modifiers", modifiers)
                .field("time", time)
                .finish(),
            Self::Mouse {
                action,
                pos,
                modifiers,
                time,
            } => f
                .debug_struct("Mouse")
                .field("action", action)
                .field("pos", pos)
                .field("modifiers", modifiers)
                .field("time", time)
                .finish(),
            Self::Screen {
                width,
                height,
                time,
            } => f
                .debug_struct("Screen")
                .field("width", width)
                .field("height", height)
                .field("time", time)
                .finish(),
            Self::Focus { gained, time } => f
                .debug_struct("Focus")
                .field("gained", gained)
                .field("time", time)
                .finish(),
            Self::Init => write!(f, "Init"),
            Self::Quit => write!(f, "Quit"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[test]
    fn custom_downcast() {
        let msg = Msg::custom(Ping(7));
        assert_eq!(msg.downcast_ref::<Ping>(), Some(&Ping(7)));
        assert!(msg.downcast_ref::<String>().is_none());
        assert!(Msg::Quit.downcast_ref::<Ping>().is_none());
    }

    #[test]
    fn key_helpers() {
        match Msg::key(Key::Escape) {
            Msg::KeyDown { key, modifiers, .. } => {
                assert_eq!(key, Key::Escape);
                assert_eq!(modifiers, ModMask::NONE);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match Msg::key_mod(Key::Char('c'), ModMask::CTRL) {
            Msg::KeyDown { modifiers, .. } => assert!(modifiers.contains(ModMask::CTRL)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn mod_mask_ops() {
        let m = ModMask::SHIFT | ModMask::ALT;
        assert!(m.contains(ModMask::SHIFT));
        assert!(!m.contains(ModMask::CTRL));
        assert!((m & ModMask::ALT) == ModMask::ALT);
        assert!(ModMask::NONE.is_empty());
    }
}
