//! Cooperative cancellation primitives.
//!
//! The pager runs a single driving loop that may block on stream reads while
//! filling the line cache. Cancellation is a shared flag checked at the top of
//! every loop iteration and before every read; a cancelled read fails
//! immediately instead of blocking further, so the session unwinds cleanly
//! and terminal state is restored on the way out.

use crate::error::{PagerError, Result};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation token backed by an atomic flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Checkpoint: fails with [`PagerError::Interrupted`] once cancelled.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(PagerError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Read adapter that fails fast once its token is cancelled.
///
/// Wraps the byte stream of the active source so a cache fill blocked on a
/// slow stream cannot outlive cancellation by more than one read call.
pub struct InterruptibleReader<R> {
    inner: R,
    token: CancelToken,
}

impl<R: Read> InterruptibleReader<R> {
    pub fn new(inner: R, token: CancelToken) -> Self {
        Self { inner, token }
    }
}

impl<R: Read> Read for InterruptibleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.token.is_cancelled() {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "read cancelled",
            ));
        }
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Cursor};

    #[test]
    fn checkpoint_trips_after_cancel() {
        let token = CancelToken::new();
        assert!(token.checkpoint().is_ok());
        token.cancel();
        assert!(matches!(token.checkpoint(), Err(PagerError::Interrupted)));
        // Clones observe the same flag.
        assert!(token.clone().is_cancelled());
    }

    #[test]
    fn cancelled_reader_fails_instead_of_reading() {
        let token = CancelToken::new();
        let mut reader = BufReader::new(InterruptibleReader::new(
            Cursor::new(b"alpha\nbeta\n".to_vec()),
            token.clone(),
        ));

        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "alpha\n");

        token.cancel();
        line.clear();
        let err = reader.read_line(&mut line).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }
}
