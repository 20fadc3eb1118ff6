//! The Elm-architecture application loop: [`Model`], [`Driver`], [`Effect`],
//! [`App`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::grid::{Cell, Frame, Grid, compute_frame};
use crate::messages::Msg;

// ---------------------------------------------------------------------------
// Context (cancellation token)
// ---------------------------------------------------------------------------

/// A simple cooperative-cancellation token backed by an [`AtomicBool`].
#[derive(Clone, Debug)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    /// Create a new, non-cancelled context.
    pub fn new() -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Relaxed);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Effect / Cmd
// ---------------------------------------------------------------------------

/// A side-effect returned by [`Model::update`].
pub enum Effect {
    /// A one-shot command that produces an optional follow-up message.
    Cmd(Box<dyn FnOnce() -> Option<Msg> + Send>),
    /// A long-running subscription that may send many messages.
    Sub(Box<dyn FnOnce(Context, Sender<Msg>) + Send>),
    /// Multiple effects batched together.
    Batch(Vec<Effect>),
    /// Signal the application loop to stop.
    End,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmd(_) => f.write_str("Effect::Cmd(..)"),
            Self::Sub(_) => f.write_str("Effect::Sub(..)"),
            Self::Batch(v) => f.debug_tuple("Effect::Batch").field(&v.len()).finish(),
            Self::End => f.write_str("Effect::End"),
        }
    }
}

/// Convenience constructor for an [`Effect::Cmd`].
pub fn cmd<F>(f: F) -> Effect
where
    F: FnOnce() -> Option<Msg> + Send + 'static,
{
    Effect::Cmd(Box::new(f))
}

// ---------------------------------------------------------------------------
// Model trait
// ---------------------------------------------------------------------------

/// The application model (Elm architecture).
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;

    /// Render the current state into `grid`.
    fn draw(&self, grid: &mut Grid);
}

// ---------------------------------------------------------------------------
// Driver trait
// ---------------------------------------------------------------------------

/// Back-end driver (e.g. terminal, graphical tile engine).
pub trait Driver {
    /// Initialise the back-end.
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Poll for input messages, sending them through `tx`.
    ///
    /// Called repeatedly from the main loop; the implementation should push
    /// whatever input is currently available and return within a bounded
    /// time, and should return early when `ctx.is_done()` becomes `true`.
    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: Sender<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Flush a computed frame to the screen.
    fn flush(&mut self, frame: Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Clean up / restore the terminal.
    fn close(&mut self);
}

// ---------------------------------------------------------------------------
// AppConfig / App
// ---------------------------------------------------------------------------

/// Configuration for creating an [`App`].
pub struct AppConfig<M: Model, D: Driver> {
    pub model: M,
    pub driver: D,
    pub width: i32,
    pub height: i32,
}

/// The main application runner.
pub struct App<M: Model, D: Driver> {
    model: M,
    driver: D,
    width: i32,
    height: i32,
}

impl<M: Model, D: Driver> App<M, D> {
    /// Create a new application from a configuration.
    pub fn new(config: AppConfig<M, D>) -> Self {
        Self {
            model: config.model,
            driver: config.driver,
            width: config.width,
            height: config.height,
        }
    }

    /// Run the main Model-View-Update loop.
    ///
    /// 1. Initialises the driver.
    /// 2. Sends `Msg::Init` through the model.
    /// 3. Enters the event loop: poll → update → draw → diff → flush.
    /// 4. Stops when the model returns `Effect::End`.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.driver.init()?;

        let ctx = Context::new();
        let (tx, rx): (Sender<Msg>, Receiver<Msg>) = mpsc::channel();

        // Seed with Init.
        tx.send(Msg::Init).ok();

        let mut prev_grid = Grid::new(self.width, self.height);
        let mut curr_grid = Grid::new(self.width, self.height);

        // Process the Init message first.
        self.process_pending(&rx, &ctx, &tx, &mut prev_grid, &mut curr_grid)?;

        // Main loop. The driver polls inline on this thread and returns
        // within a bounded time, so command results queued by background
        // threads are picked up on the next pass.
        while !ctx.is_done() {
            match self.driver.poll_msgs(&ctx, tx.clone()) {
                Ok(()) => {}
                Err(e) => {
                    ctx.cancel();
                    self.driver.close();
                    return Err(e);
                }
            }

            if ctx.is_done() {
                break;
            }

            self.process_pending(&rx, &ctx, &tx, &mut prev_grid, &mut curr_grid)?;
        }

        self.driver.close();
        Ok(())
    }

    /// Drain queued messages, update the model, draw, diff, and flush.
    fn process_pending(
        &mut self,
        rx: &Receiver<Msg>,
        ctx: &Context,
        tx: &Sender<Msg>,
        prev_grid: &mut Grid,
        curr_grid: &mut Grid,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut needs_draw = false;

        // Drain all currently available messages.
        while let Ok(msg) = rx.try_recv() {
            if let Msg::Screen { width, height, .. } = &msg {
                if *width != curr_grid.width() || *height != curr_grid.height() {
                    // The driver cleared the screen, so forget the previous
                    // frame to force a full repaint.
                    curr_grid.resize(*width, *height);
                    prev_grid.resize(*width, *height);
                    prev_grid.fill(Cell::default());
                }
            }
            if let Some(effect) = self.model.update(msg) {
                self.handle_effect(effect, ctx, tx);
                if ctx.is_done() {
                    return Ok(());
                }
            }
            needs_draw = true;
        }

        if needs_draw && !ctx.is_done() {
            self.model.draw(curr_grid);
            let frame = compute_frame(prev_grid, curr_grid);
            if !frame.cells.is_empty() {
                self.driver.flush(frame)?;
            }
            prev_grid.copy_from(curr_grid);
        }

        Ok(())
    }

    fn handle_effect(&self, effect: Effect, ctx: &Context, tx: &Sender<Msg>) {
        match effect {
            Effect::End => ctx.cancel(),
            Effect::Cmd(f) => {
                // Commands may sleep, so they run off the main thread and
                // feed their result back through the message channel.
                let tx = tx.clone();
                thread::spawn(move || {
                    if let Some(msg) = f() {
                        tx.send(msg).ok();
                    }
                });
            }
            Effect::Sub(f) => {
                let tx = tx.clone();
                let sub_ctx = ctx.clone();
                thread::spawn(move || f(sub_ctx, tx));
            }
            Effect::Batch(effects) => {
                for e in effects {
                    self.handle_effect(e, ctx, tx);
                    if ctx.is_done() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Key;
    use std::time::Duration;

    /// Records every message it sees; quits on `Quit` or on the key `q`.
    struct Script {
        seen: Vec<String>,
        effect_on_init: bool,
    }

    impl Model for Script {
        fn update(&mut self, msg: Msg) -> Option<Effect> {
            match msg {
                Msg::Init => {
                    self.seen.push("init".into());
                    if self.effect_on_init {
                        Some(cmd(|| Some(Msg::key(Key::Char('q')))))
                    } else {
                        None
                    }
                }
                Msg::KeyDown {
                    key: Key::Char('q'),
                    ..
                } => {
                    self.seen.push("q".into());
                    Some(Effect::End)
                }
                Msg::Quit => {
                    self.seen.push("quit".into());
                    Some(Effect::End)
                }
                _ => None,
            }
        }

        fn draw(&self, grid: &mut Grid) {
            grid.set(
                crate::geom::Point::ZERO,
                Cell::default().with_char('*'),
            );
        }
    }

    /// Pushes a fixed message sequence, one per poll.
    struct FakeDriver {
        queue: Vec<Msg>,
        inited: bool,
        closed: bool,
        flushes: usize,
    }

    impl FakeDriver {
        fn new(queue: Vec<Msg>) -> Self {
            Self {
                queue,
                inited: false,
                closed: false,
                flushes: 0,
            }
        }
    }

    impl Driver for FakeDriver {
        fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            self.inited = true;
            Ok(())
        }

        fn poll_msgs(
            &mut self,
            _ctx: &Context,
            tx: Sender<Msg>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.queue.is_empty() {
                // Nothing synthetic left; give background commands a chance.
                thread::sleep(Duration::from_millis(2));
            } else {
                tx.send(self.queue.remove(0)).ok();
            }
            Ok(())
        }

        fn flush(&mut self, _frame: Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.flushes += 1;
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn runs_until_end_effect() {
        let mut app = App::new(AppConfig {
            model: Script {
                seen: Vec::new(),
                effect_on_init: false,
            },
            driver: FakeDriver::new(vec![Msg::Quit]),
            width: 8,
            height: 2,
        });
        app.run().unwrap();
        assert_eq!(app.model.seen, vec!["init", "quit"]);
        assert!(app.driver.inited);
        assert!(app.driver.closed);
        // Init triggered a draw with at least one changed cell.
        assert!(app.driver.flushes >= 1);
    }

    #[test]
    fn command_results_feed_back_into_the_loop() {
        let mut app = App::new(AppConfig {
            model: Script {
                seen: Vec::new(),
                effect_on_init: true,
            },
            driver: FakeDriver::new(Vec::new()),
            width: 8,
            height: 2,
        });
        app.run().unwrap();
        assert_eq!(app.model.seen, vec!["init", "q"]);
    }

    #[test]
    fn screen_msg_resizes_the_grids() {
        let mut app = App::new(AppConfig {
            model: Script {
                seen: Vec::new(),
                effect_on_init: false,
            },
            driver: FakeDriver::new(vec![
                Msg::Screen {
                    width: 20,
                    height: 5,
                    time: std::time::Instant::now(),
                },
                Msg::Quit,
            ]),
            width: 8,
            height: 2,
        });
        app.run().unwrap();
        // After the resize the full 20x5 frame gets flushed again.
        assert!(app.driver.flushes >= 2);
    }
}
