//! Line framing codec for tokio.
//!
//! Reads LF-terminated lines (a preceding CR is tolerated) and writes lines
//! terminated with CR-LF. Over-long input lines are truncated rather than
//! rejected so that a chatty client never loses its connection over them.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::names::truncate_utf8_safe;

/// Default line limit, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Line codec used by every connection.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for a newline.
    next_index: usize,
    max_len: usize,
    /// Head of an over-long line whose tail is still being skipped.
    discarding: Option<String>,
}

impl LineCodec {
    /// Codec with the default 512-byte limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Codec with a custom limit. Values below 3 are raised to 3.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: max_len.max(3),
            discarding: None,
        }
    }

    fn content_limit(&self) -> usize {
        self.max_len - 2
    }

    fn to_text(&self, raw: &[u8]) -> String {
        let text = String::from_utf8_lossy(raw);
        let text = text.trim_end_matches(['\r', '\n']);
        truncate_utf8_safe(text, self.content_limit()).to_string()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if let Some(head) = self.discarding.take() {
                return Ok(Some(head));
            }
            return Ok(Some(self.to_text(&line)));
        }

        if self.discarding.is_some() {
            src.clear();
            self.next_index = 0;
            return Ok(None);
        }

        if src.len() > self.max_len {
            let head = self.to_text(&src[..self.max_len]);
            self.discarding = Some(head);
            src.clear();
            self.next_index = 0;
            return Ok(None);
        }

        self.next_index = src.len();
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if let Some(head) = self.discarding.take() {
            return Ok(Some(head));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split_to(src.len());
        self.next_index = 0;
        Ok(Some(self.to_text(&rest)))
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = line.as_ref().trim_end_matches(['\r', '\n']);
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
