//! Newline-delimited text codec with a hard per-line byte limit.
//!
//! Unlike a rejecting codec, lines over the limit are cut down to `max_len`
//! bytes and flagged, and the remainder of the oversized line is discarded
//! without being buffered.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite};

pub type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;
pub type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Framed read half of a session transport.
pub type LineReader = FramedRead<BoxedReader, LineCodec>;
/// Framed write half of a session transport.
pub type LineWriter = FramedWrite<BoxedWriter, LineCodec>;

/// A decoded input line without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// The client sent more than `max_len` bytes and `text` holds only the prefix.
    pub truncated: bool,
}

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length in bytes, excluding the terminator
    max_len: usize,
    /// Prefix kept from an oversized line while the rest is being skipped
    overflow: Option<BytesMut>,
}

impl LineCodec {
    pub fn new(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            overflow: None,
        }
    }

    fn finish(&self, body: &[u8]) -> Line {
        let kept = truncate_utf8(body, self.max_len);
        Line {
            text: String::from_utf8_lossy(kept).into_owned(),
            truncated: kept.len() < body.len(),
        }
    }
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Line>> {
        let newline = src[self.next_index..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|offset| self.next_index + offset);

        if let Some(kept) = self.overflow.take() {
            // Skipping the tail of an oversized line.
            return match newline {
                Some(pos) => {
                    src.advance(pos + 1);
                    self.next_index = 0;
                    let mut line = self.finish(&kept);
                    line.truncated = true;
                    Ok(Some(line))
                }
                None => {
                    src.clear();
                    self.next_index = 0;
                    self.overflow = Some(kept);
                    Ok(None)
                }
            };
        }

        match newline {
            Some(pos) => {
                let line = src.split_to(pos + 1);
                self.next_index = 0;
                Ok(Some(self.finish(strip_terminator(&line))))
            }
            // One spare byte leaves room for a `\r` whose `\n` has not arrived yet.
            None if src.len() > self.max_len + 1 => {
                let end = truncate_utf8(&src[..], self.max_len).len();
                let kept = src.split_to(end);
                src.clear();
                self.next_index = 0;
                self.overflow = Some(kept);
                Ok(None)
            }
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Line>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;

        if let Some(kept) = self.overflow.take() {
            let mut line = self.finish(&kept);
            line.truncated = true;
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // Final line without a terminator.
        let rest = src.split();
        Ok(Some(self.finish(strip_terminator(&rest))))
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> io::Result<()> {
        let text = item.as_ref();
        dst.reserve(text.len() + 1);
        dst.put_slice(text.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Cut `bytes` to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_utf8(bytes: &[u8], max: usize) -> &[u8] {
    if bytes.len() <= max {
        return bytes;
    }
    let mut end = max;
    while end > 0 && (bytes[end] & 0xC0) == 0x80 {
        end -= 1;
    }
    &bytes[..end]
}
