//! Server-Sent Events line framing
//!
//! Only the two fields the analysis service uses are understood:
//! `event: <type>` sets the type for the next data line and `data: <json>`
//! carries a payload. Everything else (comments, `id:`, `retry:`, blank
//! separators) is ignored.
//!
//! Lines are cut on raw bytes. `\n` never occurs inside a multi-byte UTF-8
//! sequence, so a code point split across two network chunks is whole again
//! by the time its line is decoded.

use bytes::BytesMut;
use tracing::trace;

const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";

/// One `data:` line together with the event type in force when it arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event_type: Option<String>,
    pub data: String,
}

/// Incremental SSE decoder
///
/// Feed it chunks in arrival order; the frames produced do not depend on
/// where the chunk boundaries fall.
///
/// With a line limit set, a line longer than the limit stops the decoder:
/// the buffer is dropped, [`SseDecoder::overflow`] reports the limit, and
/// further input is ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    /// Buffered bytes already known to hold no newline
    scanned: usize,
    max_line_len: Option<usize>,
    overflow: Option<usize>,
    event_type: Option<String>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that gives up on lines longer than `max_line_len` bytes
    #[must_use]
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            max_line_len: Some(max_line_len),
            ..Self::default()
        }
    }

    /// Append a chunk and return every frame completed by it
    ///
    /// Frames completed before an overlong line are still returned.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        if self.overflow.is_some() {
            return frames;
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let newline = self.scanned + offset;
            if self.exceeds_limit(newline) {
                self.give_up();
                return frames;
            }
            let line = self.buffer.split_to(newline + 1);
            self.scanned = 0;
            if let Some(frame) = self.handle_line(&line[..newline]) {
                frames.push(frame);
            }
        }

        self.scanned = self.buffer.len();
        if self.exceeds_limit(self.buffer.len()) {
            self.give_up();
        }
        frames
    }

    /// Flush an unterminated final line at end of stream
    pub fn finish(&mut self) -> Option<SseFrame> {
        if self.buffer.is_empty() || self.overflow.is_some() {
            return None;
        }
        let line = self.buffer.split();
        self.scanned = 0;
        self.handle_line(&line)
    }

    /// The line limit, once a line has exceeded it
    #[must_use]
    pub const fn overflow(&self) -> Option<usize> {
        self.overflow
    }

    fn exceeds_limit(&self, line_len: usize) -> bool {
        self.max_line_len.is_some_and(|limit| line_len > limit)
    }

    fn give_up(&mut self) {
        trace!(pending = self.buffer.len(), "SSE line over limit");
        self.overflow = self.max_line_len;
        self.buffer.clear();
        self.scanned = 0;
    }

    /// Bytes held back waiting for a newline
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn handle_line(&mut self, raw: &[u8]) -> Option<SseFrame> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        trace!(line = %line, "SSE line");

        if let Some(event_type) = line.strip_prefix(EVENT_PREFIX) {
            let event_type = event_type.trim();
            self.event_type = (!event_type.is_empty()).then(|| event_type.to_string());
            None
        } else if let Some(data) = line.strip_prefix(DATA_PREFIX) {
            Some(SseFrame {
                event_type: self.event_type.take(),
                data: data.to_string(),
            })
        } else {
            None
        }
    }
}
