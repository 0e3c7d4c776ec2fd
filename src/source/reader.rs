//! Line framing and the background line source.
//!
//! Lines end at `\n`. Carriage returns are dropped wherever they appear and
//! overlong lines are cut to [`MAX_LINE_LEN`] characters. A [`LineSource`]
//! runs the framing on its own thread and hands complete lines to the
//! driver over a channel, so the driver loop never blocks on the transport.

use crate::core::sensor::truncate_chars;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{self, BufRead, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// Maximum number of characters kept from a single line.
pub const MAX_LINE_LEN: usize = 127;

/// Bytes buffered for one line, enough for [`MAX_LINE_LEN`] UTF-8 characters.
/// Anything past this is discarded up to the next `\n`.
pub const MAX_LINE_BYTES: usize = MAX_LINE_LEN * 4;

/// Capacity of the line channel.
const CHANNEL_CAPACITY: usize = 1024;

/// Read the next framed line from `reader`.
///
/// Returns `Ok(None)` at end of input. A final line without terminator is
/// still returned. If the read fails (for example a serial timeout), the
/// bytes received so far stay in `buf` and the next call continues from
/// them, so `buf` must be reused between calls. `buf` never grows past
/// [`MAX_LINE_BYTES`], however long the input goes without a newline.
pub fn next_line<R: BufRead + ?Sized>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            if buf.is_empty() {
                return Ok(None);
            }
            break;
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let content = &available[..newline.unwrap_or(available.len())];
        let room = MAX_LINE_BYTES.saturating_sub(buf.len());
        buf.extend_from_slice(&content[..content.len().min(room)]);

        let consumed = newline.map_or(available.len(), |i| i + 1);
        reader.consume(consumed);
        if newline.is_some() {
            break;
        }
    }

    let line = frame(buf);
    buf.clear();
    Ok(Some(line))
}

fn frame(raw: &[u8]) -> String {
    let bytes: Vec<u8> = raw.iter().copied().filter(|&b| b != b'\r').collect();
    let text = String::from_utf8_lossy(&bytes);
    truncate_chars(&text, MAX_LINE_LEN).to_string()
}

/// Errors raised by a [`LineSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("line source has already been started")]
    AlreadyRunning,
    #[error("could not spawn reader thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Reads lines on a background thread and forwards them over a channel.
///
/// A source is started once. When the input ends the sending side is
/// dropped and the receiver reports disconnection.
pub struct LineSource {
    sender: Option<Sender<String>>,
    receiver: Receiver<String>,
    running: Arc<AtomicBool>,
}

impl LineSource {
    /// Create a stopped line source.
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading lines from `reader` on a new thread.
    pub fn start<R>(&mut self, mut reader: R) -> Result<(), SourceError>
    where
        R: BufRead + Send + 'static,
    {
        let sender = self.sender.take().ok_or(SourceError::AlreadyRunning)?;
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        let spawned = thread::Builder::new()
            .name("line-source".to_string())
            .spawn(move || {
                let mut buf = Vec::new();
                while running.load(Ordering::SeqCst) {
                    match next_line(&mut reader, &mut buf) {
                        Ok(Some(line)) => {
                            if sender.send(line).is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            tracing::debug!("line source reached end of input");
                            break;
                        }
                        Err(e)
                            if matches!(
                                e.kind(),
                                ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                            ) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "line source read failed");
                            break;
                        }
                    }
                }
                running.store(false, Ordering::SeqCst);
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(SourceError::Spawn(e));
        }
        Ok(())
    }

    /// Ask the reader thread to stop after its current read.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Get the receiver for framed lines.
    pub fn receiver(&self) -> &Receiver<String> {
        &self.receiver
    }
}

impl Default for LineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LineSource {
    fn drop(&mut self) {
        self.stop();
    }
}
