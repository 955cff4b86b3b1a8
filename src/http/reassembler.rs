//! Reassembles a connection's byte stream into request frames.
//!
//! Requests carry no body, so a frame is everything up to and including
//! the first `\r\n\r\n`. Bytes after the last terminator stay pending until
//! the next read.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

const TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A request head grew past the configured limit.
    #[error("request head exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

pub struct StreamReassembler {
    pending: BytesMut,
    /// Offset up to which `pending` is known not to contain a terminator.
    scanned: usize,
    max_frame: usize,
    failed: bool,
}

impl StreamReassembler {
    pub fn new(max_frame: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(max_frame.min(4096)),
            scanned: 0,
            max_frame,
            failed: false,
        }
    }

    /// Appends `bytes` and returns every frame completed by them, in order.
    ///
    /// A frame longer than the limit, or an unterminated tail longer than
    /// it, ends the sequence with an error and poisons the reassembler.
    /// Both checks apply to whole frames, so the sequence produced over a
    /// stream does not depend on how the stream was split into reads.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<Bytes, FrameError>> {
        if self.failed {
            return Vec::new();
        }
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(end) = self.find_terminator() {
            if end > self.max_frame {
                frames.push(Err(self.fail()));
                return frames;
            }
            frames.push(Ok(self.pending.split_to(end).freeze()));
            self.scanned = 0;
        }

        if self.pending.len() > self.max_frame {
            frames.push(Err(self.fail()));
        }

        frames
    }

    /// Whether a partial request is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn fail(&mut self) -> FrameError {
        self.failed = true;
        self.pending.clear();
        self.scanned = 0;
        FrameError::TooLarge {
            limit: self.max_frame,
        }
    }

    /// Returns the end offset (exclusive) of the first frame, if complete.
    fn find_terminator(&mut self) -> Option<usize> {
        // Back up so a terminator split across reads is still found.
        let start = self.scanned.saturating_sub(TERMINATOR.len() - 1);
        match self.pending[start..]
            .windows(TERMINATOR.len())
            .position(|w| w == TERMINATOR)
        {
            Some(pos) => Some(start + pos + TERMINATOR.len()),
            None => {
                self.scanned = self.pending.len();
                None
            }
        }
    }
}
