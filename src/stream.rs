//! Incremental frame decoding for bytes that arrive in chunks.
//!
//! [`Framer::decode`] treats a partial trailing frame as an error because
//! its input is complete. When reading from a socket the tail is simply not
//! here yet, so [`StreamDecoder`] keeps it buffered until the next push.

use bytes::{Buf, BytesMut};
use log::{debug, warn};

use crate::buffer::Buffer;
use crate::error::{DecodeError, Error};
use crate::frame::{Frame, FrameHeader, FRAME_HEADER_SIZE};
use crate::framer::{ErrorPolicy, Framer};

/// The HTTP/2 connection preface (24 bytes)
pub const CONNECTION_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// Check if data starts with the HTTP/2 connection preface (h2c detection)
pub fn is_connection_preface(data: &[u8]) -> bool {
    data.starts_with(CONNECTION_PREFACE)
}

/// Buffers partial input and yields frames as they complete.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    framer: Framer,
    /// Bytes of an incomplete frame (or preface) carried between pushes
    buffer: BytesMut,
    expect_preface: bool,
    preface_received: bool,
    /// Set once the input can no longer be framed; cleared by `reset`
    failed: Option<Error>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_framer(framer: Framer) -> Self {
        Self {
            framer,
            ..Self::default()
        }
    }

    /// Require the client connection preface before the first frame
    /// (server side of a connection).
    pub fn expect_preface(mut self) -> Self {
        self.expect_preface = true;
        self
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    pub fn preface_received(&self) -> bool {
        self.preface_received
    }

    /// Number of bytes held back waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// True after an unrecoverable error; every push fails until [`reset`].
    ///
    /// [`reset`]: StreamDecoder::reset
    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }

    /// Feed raw bytes and get back every frame they complete.
    ///
    /// A malformed frame is consumed before it is reported, so bytes after
    /// it stay buffered and pushing an empty slice resumes decoding. An
    /// invalid preface or an oversized frame header leaves no frame
    /// boundary to resume from: the buffer is dropped and the decoder
    /// fails every later push until [`reset`](StreamDecoder::reset).
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>, DecodeError> {
        if let Some(e) = &self.failed {
            return Err(DecodeError::new(Vec::new(), e.clone()));
        }
        self.buffer.extend_from_slice(data);

        if self.expect_preface && !self.preface_received {
            let seen = self.buffer.len().min(CONNECTION_PREFACE.len());
            if self.buffer[..seen] != CONNECTION_PREFACE[..seen] {
                return Err(self.fail(Vec::new(), Error::InvalidPreface));
            }
            if seen < CONNECTION_PREFACE.len() {
                return Ok(Vec::new());
            }
            self.buffer.advance(CONNECTION_PREFACE.len());
            self.preface_received = true;
            debug!("connection preface received");
        }

        let mut frames = Vec::new();
        while self.buffer.len() >= FRAME_HEADER_SIZE {
            let header = match FrameHeader::parse(&self.buffer[..FRAME_HEADER_SIZE]) {
                Ok(header) => header,
                Err(e) => return Err(self.fail(frames, e)),
            };
            if header.length > self.framer.max_frame_size() {
                let e = Error::FrameSize {
                    frame_type: header.frame_type,
                    length: header.length as usize,
                    max: self.framer.max_frame_size(),
                };
                return Err(self.fail(frames, e));
            }
            if self.buffer.len() < header.total_size() {
                break;
            }

            // Only the bytes of this frame are frozen; the tail stays in place.
            let mut buf = Buffer::new(self.buffer.split_to(header.total_size()).freeze());
            match self.framer.decode_frame(&mut buf) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => {}
                Err(e) if self.framer.error_policy() == ErrorPolicy::Skip => {
                    warn!("skipping {} frame: {}", header.frame_type, e);
                }
                Err(e) => return Err(DecodeError::new(frames, e)),
            }
        }
        Ok(frames)
    }

    fn fail(&mut self, frames: Vec<Frame>, error: Error) -> DecodeError {
        warn!("stream decoder failed: {}", error);
        self.buffer.clear();
        self.failed = Some(error.clone());
        DecodeError::new(frames, error)
    }

    /// Drop buffered bytes, forget the preface and clear a failure
    /// (e.g. after reconnect)
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.preface_received = false;
        self.failed = None;
    }
}
