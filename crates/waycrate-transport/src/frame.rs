//! Length-prefixed framing for the broker socket.
//!
//! Every message on the wire is one frame:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ len: u32 (LE, bytes) │ payload: `len` bytes of JSON │
//! └──────────────────────┴──────────────────────────────┘
//! ```
//!
//! The framing layer never looks inside the payload. Turning the bytes
//! into requests and responses is the protocol crate's job.

use bytes::{Buf, BufMut, BytesMut};

use crate::TransportError;

/// Size of the length header in bytes.
pub const HEADER_LEN: usize = 4;

/// Largest payload the decoder will accept (1 MiB).
///
/// Broker messages are tiny; a header claiming more than this means the
/// stream is corrupt, not that a big message is on its way.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Encodes `payload` as a single frame: little-endian byte count, then the
/// payload verbatim.
///
/// # Errors
/// Returns [`TransportError::FrameTooLarge`] if the payload is longer than
/// [`MAX_FRAME_LEN`].
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, TransportError> {
    let len = checked_len(payload.len())?;
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u32_le(len);
    buf.put_slice(payload);
    Ok(buf.to_vec())
}

fn checked_len(len: usize) -> Result<u32, TransportError> {
    if len > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    u32::try_from(len).map_err(|_| TransportError::FrameTooLarge {
        len,
        max: MAX_FRAME_LEN,
    })
}

/// Accumulates inbound bytes and splits them into complete frames.
///
/// Bytes can arrive in any chunking: half a header, three frames at once,
/// a frame split across many reads. `next_frame` only ever hands out a
/// whole payload, and hands them out in the order they arrived.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(4096),
        }
    }

    /// Appends raw bytes read from the stream.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pops the next complete frame payload, if one is buffered.
    ///
    /// # Errors
    /// Returns [`TransportError::FrameTooLarge`] when a header declares a
    /// payload over [`MAX_FRAME_LEN`]. The decoder does not try to resync
    /// after that; the stream should be dropped.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }

        let header = [self.buf[0], self.buf[1], self.buf[2], self.buf[3]];
        let len = u32::from_le_bytes(header) as usize;
        if len > MAX_FRAME_LEN {
            return Err(TransportError::FrameTooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }

        if self.buf.len() < HEADER_LEN + len {
            return Ok(None);
        }

        self.buf.advance(HEADER_LEN);
        Ok(Some(self.buf.split_to(len).to_vec()))
    }

    /// Number of bytes buffered but not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no partial frame is pending.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Mutable access to the read buffer, so a reader can fill it in place
    /// with `read_buf`.
    pub(crate) fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}
