//! Application orchestration layer.
//!
//! Wires the CLI configuration into a [`session::PagerSession`], owns the
//! terminal and the input thread, and runs the event loop. Each loop turn
//! drains every queued event before composing a single frame, so a burst of
//! key repeats costs one repaint instead of one per key.

pub mod session;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::input::{spawn_input_thread, KeyPress, PagerEvent};
use crate::render::{terminal, TerminalUi};
use crate::source::{FileSource, Source, SourceRegistry};
use crate::text::TabStops;
use crate::view::{Flags, Geometry};
use log::debug;
use session::PagerSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything `main` hands over after argument parsing.
pub struct AppConfig {
    pub files: Vec<String>,
    pub flags: Flags,
    pub tabs: TabStops,
}

pub struct Application {
    config: AppConfig,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let cancel = CancelToken::new();
        let working_dir = std::env::current_dir()?;

        let sources: Vec<Box<dyn Source>> = self
            .config
            .files
            .iter()
            .map(|name| {
                Box::new(FileSource::with_name(working_dir.join(name), name)) as Box<dyn Source>
            })
            .collect();
        let registry = SourceRegistry::new(
            sources,
            working_dir,
            self.config.tabs.clone(),
            cancel.clone(),
        )?;

        let mut ui = TerminalUi::new();
        let geom = ui.size()?;
        let mut session = PagerSession::new(registry, self.config.flags, geom)?;

        // With a single source that fits the window, print it to the main
        // screen and leave without ever entering the alternate screen.
        if self.config.flags.quit_if_one_screen && session.real_count() == 1 {
            if let Some(rows) = session.probe_one_screen()? {
                terminal::print_lines(&rows);
                return Ok(());
            }
        }

        ui.initialize()?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let input_thread = spawn_input_thread(tx, Arc::clone(&shutdown), INPUT_POLL_INTERVAL);

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        let result = event_loop(&mut session, &mut ui, &mut rx, &cancel).await;

        shutdown.store(true, Ordering::SeqCst);
        drop(rx);
        if input_thread.join().is_err() {
            debug!("input thread panicked during shutdown");
        }
        ui.cleanup()?;

        match result {
            Err(err) if err.is_interrupted() => Ok(()),
            other => other,
        }
    }
}

async fn event_loop(
    session: &mut PagerSession,
    ui: &mut TerminalUi,
    rx: &mut UnboundedReceiver<PagerEvent>,
    cancel: &CancelToken,
) -> Result<()> {
    let mut frame = session.render_frame(true)?;
    ui.paint(&frame)?;

    loop {
        cancel.checkpoint()?;
        let Some(event) = rx.recv().await else {
            return Ok(());
        };
        let mut batch = vec![event];
        while let Ok(more) = rx.try_recv() {
            batch.push(more);
        }

        let mut index = 0;
        while index < batch.len() {
            match &batch[index] {
                PagerEvent::Key(key) => {
                    if let Some(press) = KeyPress::from_event(*key) {
                        session.handle_key(press)?;
                    }
                }
                PagerEvent::Resize { width, height } => {
                    session.resize(Geometry::new(*width, *height));
                }
            }
            index += 1;
            if session.should_quit() {
                return Ok(());
            }
            // Keys that arrived while handling join this batch.
            while let Ok(more) = rx.try_recv() {
                batch.push(more);
            }
        }

        if session.take_clear() {
            ui.clear()?;
        }
        if session.take_bell() {
            ui.bell();
        }
        frame = session.render_frame(rx.is_empty())?;
        ui.paint(&frame)?;
    }
}
