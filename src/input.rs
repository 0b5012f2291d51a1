//! Input collection and interpretation.
//!
//! A dedicated thread polls crossterm and forwards primitive events over a
//! channel to the main loop; the [`interpreter::Interpreter`] turns key
//! presses into session-level actions.

pub mod editor;
pub mod interpreter;
pub mod keys;

pub use interpreter::{Action, Interpreter, Mode, OptionKind, PatternKind};
pub use keys::{KeyPress, Operation};

use log::error;
use ratatui::crossterm::event::{self, Event, KeyEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Primitive events delivered to the main loop. Resize arrives through the
/// same channel as keys, so geometry changes are handled in loop order
/// instead of reentrantly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
}

/// Spawn a blocking thread that polls for terminal events and forwards them
/// to the main loop until `shutdown` is set or the receiver goes away.
pub fn spawn_input_thread(
    tx: UnboundedSender<PagerEvent>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !shutdown.load(Ordering::SeqCst) {
            match event::poll(poll_interval) {
                Ok(false) => continue,
                Ok(true) => {
                    let forwarded = match event::read() {
                        Ok(Event::Key(key)) => tx.send(PagerEvent::Key(key)),
                        Ok(Event::Resize(width, height)) => {
                            tx.send(PagerEvent::Resize { width, height })
                        }
                        Ok(_) => Ok(()),
                        Err(err) => {
                            error!("input thread read error: {err}");
                            break;
                        }
                    };
                    if forwarded.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    error!("input thread poll error: {err}");
                    break;
                }
            }
        }
    })
}
