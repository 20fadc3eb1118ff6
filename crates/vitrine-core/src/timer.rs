//! Cancellable deferred messages, built on [`Effect::Cmd`].
//!
//! [`delay`] schedules a message for later delivery and returns a
//! [`TimerHandle`]; cancelling the handle before the timer fires means the
//! message is never delivered. Widgets that schedule work they may need to
//! retract (a debounce, a grace period before closing) hold the handle and
//! cancel it when the plan changes or when they are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::app::Effect;
use crate::messages::Msg;

/// One display frame at ~60Hz.
pub const FRAME: Duration = Duration::from_millis(16);

/// Handle to a message scheduled with [`delay`].
///
/// Cloning the handle shares the underlying flag. Cancelling is idempotent
/// and has no effect once the timer has already fired.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Prevent the scheduled message from being delivered.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Schedule `msg` for delivery after `after`.
///
/// Returns the [`Effect`] to hand back from `update` together with the
/// handle that cancels delivery. The cancellation check happens when the
/// timer fires, so a cancel any time before then wins.
pub fn delay(after: Duration, msg: Msg) -> (Effect, TimerHandle) {
    let handle = TimerHandle::new();
    let fired = handle.clone();
    let effect = Effect::Cmd(Box::new(move || {
        thread::sleep(after);
        if fired.is_cancelled() { None } else { Some(msg) }
    }));
    (effect, handle)
}

/// Deliver `msg` after roughly one display frame.
///
/// Used for state changes that must land on a later draw than the one that
/// requested them, such as clearing a widget's animation flag.
pub fn next_frame(msg: Msg) -> Effect {
    Effect::Cmd(Box::new(move || {
        thread::sleep(FRAME);
        Some(msg)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_cmd(effect: Effect) -> Option<Msg> {
        match effect {
            Effect::Cmd(f) => f(),
            other => panic!("expected Cmd, got {other:?}"),
        }
    }

    #[test]
    fn fires_when_not_cancelled() {
        let (effect, _handle) = delay(Duration::from_millis(1), Msg::Quit);
        assert!(matches!(run_cmd(effect), Some(Msg::Quit)));
    }

    #[test]
    fn cancel_before_fire_suppresses_delivery() {
        let (effect, handle) = delay(Duration::from_millis(1), Msg::Quit);
        handle.cancel();
        assert!(run_cmd(effect).is_none());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let (_effect, handle) = delay(Duration::from_millis(1), Msg::Quit);
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn next_frame_delivers() {
        assert!(matches!(run_cmd(next_frame(Msg::Quit)), Some(Msg::Quit)));
    }
}
