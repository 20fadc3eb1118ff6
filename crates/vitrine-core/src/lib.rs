//! **vitrine-core** — Grid-based storefront UI framework (core types).
//!
//! This crate provides the foundational types used across the *vitrine*
//! ecosystem: geometry primitives, styled cells, a shared-buffer grid, input
//! events, cancellable timers, and the Elm-architecture application loop.

pub mod app;
pub mod geom;
pub mod grid;
pub mod messages;
pub mod style;
pub mod timer;

pub use app::{App, AppConfig, Context, Driver, Effect, Model, cmd};
pub use geom::{Point, Range};
pub use grid::{Cell, Frame, FrameCell, Grid, compute_frame};
pub use messages::*;
pub use style::{AttrMask, Color, Style};
pub use timer::{TimerHandle, delay, next_frame};
