//! Terminal runner: wires the shared game to the ticker, input and render
//! threads.
//!
//! - The **ticker** thread calls `update` on every tick of a
//!   `crossbeam_channel::tick` channel.
//! - The **input** thread polls crossterm events and turns keys into commands.
//! - The calling thread renders frames until quit is requested.
//!
//! All three stop on the same [`QuitSignal`].

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, select, tick, Receiver, RecvTimeoutError, Sender};
use crossterm::event::{self, Event};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::core::{Game, GameSnapshot};
use crate::input::{map_key, KeyAction};
use crate::term::{FrameBuffer, GameView, TerminalRenderer};

/// How long the input thread blocks on the terminal before rechecking quit
pub const INPUT_POLL: Duration = Duration::from_millis(50);

/// Cooperative shutdown shared by every thread.
///
/// Quitting drops the only sender of a channel; every receiver then sees a
/// disconnect, whether it is blocked in `select!` or polling. The first error
/// reported through [`QuitSignal::fail`] is kept for the caller.
#[derive(Debug)]
pub struct QuitSignal {
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
    error: Mutex<Option<anyhow::Error>>,
}

impl Default for QuitSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl QuitSignal {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
            error: Mutex::new(None),
        }
    }

    /// Request shutdown. Returns true only for the call that did it.
    pub fn trigger(&self) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        sender.is_some()
    }

    /// Record an error (the first one wins) and request shutdown
    pub fn fail(&self, err: anyhow::Error) {
        {
            let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.trigger();
    }

    pub fn is_triggered(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// A receiver that disconnects once quit is requested, for `select!`
    pub fn receiver(&self) -> Receiver<()> {
        self.receiver.clone()
    }

    /// Sleep up to `timeout`; returns true as soon as quit is requested
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    pub fn take_error(&self) -> Option<anyhow::Error> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Drive `Game::update` every `period` until quit
pub fn spawn_ticker(
    game: Arc<Game>,
    quit: Arc<QuitSignal>,
    period: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ticker".to_string())
        .spawn(move || {
            let ticks = tick(period);
            let stop = quit.receiver();
            debug!(period_ms = period.as_millis() as u64, "ticker started");
            loop {
                select! {
                    recv(ticks) -> at => {
                        if let Ok(now) = at {
                            game.update_at(now);
                        }
                    }
                    recv(stop) -> _ => break,
                }
            }
            debug!("ticker stopped");
        })
}

/// Read terminal keys until quit. A failing terminal read ends the program
/// with that error.
pub fn spawn_input(game: Arc<Game>, quit: Arc<QuitSignal>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            debug!("input started");
            if let Err(err) = input_loop(&game, &quit) {
                warn!(error = %err, "input thread failed");
                quit.fail(err);
            }
            debug!("input stopped");
        })
}

fn input_loop(game: &Game, quit: &QuitSignal) -> Result<()> {
    while !quit.is_triggered() {
        if !event::poll(INPUT_POLL).context("failed to poll terminal events")? {
            continue;
        }
        let ev = event::read().context("failed to read terminal event")?;
        if let Event::Key(key) = ev {
            if let Some(action) = map_key(key) {
                dispatch(game, quit, action);
            }
        }
    }
    Ok(())
}

/// Apply one key action to the game
pub fn dispatch(game: &Game, quit: &QuitSignal, action: KeyAction) {
    match action {
        KeyAction::Quit => {
            if quit.trigger() {
                info!("quit requested");
            }
        }
        KeyAction::Start => {
            game.start_if_idle();
        }
        KeyAction::Command(cmd) => {
            game.handle_command(cmd);
        }
    }
}

/// Run the game in the terminal until the player quits
pub fn run(config: &AppConfig) -> Result<()> {
    info!(seed = config.seed, tick_ms = config.tick.as_millis() as u64, "starting");

    let game = Arc::new(Game::with_seed(config.seed));
    let quit = Arc::new(QuitSignal::new());

    let mut renderer = TerminalRenderer::new();
    if let Err(err) = renderer.enter() {
        // Undo whatever part of the setup took effect before reporting.
        if let Err(restore) = renderer.exit() {
            warn!(error = %format!("{restore:#}"), "terminal restore failed");
        }
        return Err(err);
    }

    let result = run_session(&game, &quit, &mut renderer, config.tick);

    // Always try to restore terminal state.
    let restored = renderer.exit();
    result?;
    restored
}

fn run_session(
    game: &Arc<Game>,
    quit: &Arc<QuitSignal>,
    renderer: &mut TerminalRenderer,
    frame: Duration,
) -> Result<()> {
    let ticker = spawn_ticker(Arc::clone(game), Arc::clone(quit), frame)
        .context("failed to spawn ticker thread")?;
    let input = match spawn_input(Arc::clone(game), Arc::clone(quit)) {
        Ok(handle) => Some(handle),
        Err(err) => {
            quit.fail(anyhow!(err).context("failed to spawn input thread"));
            None
        }
    };

    if !quit.is_triggered() {
        if let Err(err) = render_loop(game, quit, renderer, frame) {
            quit.fail(err);
        }
    }
    quit.trigger();

    for (name, handle) in [("ticker", Some(ticker)), ("input", input)] {
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(thread = name, "thread panicked");
            }
        }
    }

    match quit.take_error() {
        Some(err) => Err(err),
        None => {
            info!("quit");
            Ok(())
        }
    }
}

fn render_loop(
    game: &Game,
    quit: &QuitSignal,
    renderer: &mut TerminalRenderer,
    frame: Duration,
) -> Result<()> {
    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    loop {
        game.snapshot_into(&mut snap);
        let viewport = renderer.viewport()?;
        view.render_into(&snap, viewport, &mut fb);
        renderer.draw_swap(&mut fb)?;

        if quit.wait_timeout(frame) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SequenceTiles;
    use crate::types::{Command, Tile};
    use std::time::Instant;

    #[test]
    fn test_trigger_is_idempotent() {
        let quit = QuitSignal::new();
        assert!(!quit.is_triggered());
        assert!(quit.trigger());
        assert!(!quit.trigger());
        assert!(quit.is_triggered());
        assert!(quit.wait_timeout(Duration::from_secs(5)));
    }

    #[test]
    fn test_wait_times_out_while_running() {
        let quit = QuitSignal::new();
        let start = Instant::now();
        assert!(!quit.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_first_error_is_kept() {
        let quit = QuitSignal::new();
        quit.fail(anyhow!("first"));
        quit.fail(anyhow!("second"));
        assert!(quit.is_triggered());
        assert_eq!(quit.take_error().unwrap().to_string(), "first");
        assert!(quit.take_error().is_none());
    }

    #[test]
    fn test_ticker_drives_gravity_and_stops_on_quit() {
        let game = Arc::new(Game::new(SequenceTiles::new(vec![Tile::LightBlue])));
        game.start();
        let spawn = game.lock().current().unwrap().loc;
        let quit = Arc::new(QuitSignal::new());

        let handle =
            spawn_ticker(Arc::clone(&game), Arc::clone(&quit), Duration::from_millis(5)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while game.lock().current().map(|p| p.loc) == Some(spawn) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        assert_ne!(game.lock().current().map(|p| p.loc), Some(spawn));

        quit.trigger();
        handle.join().unwrap();
    }

    #[test]
    fn test_dispatch_routes_actions() {
        let game = Game::new(SequenceTiles::new(vec![Tile::Purple]));
        let quit = QuitSignal::new();

        dispatch(&game, &quit, KeyAction::Command(Command::Pause));
        assert!(!game.snapshot().paused, "commands need a running game");

        dispatch(&game, &quit, KeyAction::Start);
        assert!(game.snapshot().started);

        dispatch(&game, &quit, KeyAction::Command(Command::Pause));
        assert!(game.snapshot().paused);

        // Enter while a game runs does not restart it.
        dispatch(&game, &quit, KeyAction::Start);
        assert!(game.snapshot().paused);

        dispatch(&game, &quit, KeyAction::Quit);
        assert!(quit.is_triggered());
    }
}
