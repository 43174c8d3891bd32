//! Error types for h2-framer.

use thiserror::Error;

use crate::frame::{Frame, FrameType};

/// Errors produced while reading, decoding or encoding HTTP/2 frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A read asked for more bytes than the buffer still holds.
    #[error("buffer underrun: requested {requested} bytes, {remaining} remaining")]
    BufferUnderrun { requested: usize, remaining: usize },

    /// Input ended inside a 9-byte frame header.
    #[error("truncated frame header: {remaining} of 9 bytes available")]
    TruncatedHeader { remaining: usize },

    /// Input ended before the payload length declared by the frame header.
    #[error("truncated frame payload: header declares {declared} bytes, {remaining} available")]
    TruncatedPayload { declared: usize, remaining: usize },

    /// Payload is larger than the configured maximum frame size.
    #[error("{frame_type} frame of {length} bytes exceeds max frame size {max}")]
    FrameSize {
        frame_type: FrameType,
        length: usize,
        max: u32,
    },

    /// Payload violates the layout rules of its frame type.
    #[error("malformed {frame_type} frame: {detail}")]
    FrameFormat {
        frame_type: FrameType,
        detail: String,
    },

    /// Bytes at the start of the connection are not the client preface.
    #[error("invalid HTTP/2 connection preface")]
    InvalidPreface,
}

impl Error {
    pub(crate) fn format(frame_type: FrameType, detail: impl Into<String>) -> Self {
        Error::FrameFormat {
            frame_type,
            detail: detail.into(),
        }
    }

    /// True for errors caused by input ending mid-frame.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Error::TruncatedHeader { .. } | Error::TruncatedPayload { .. }
        )
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A decode failure together with every frame decoded before it.
///
/// Lets callers tell "got N valid frames, then garbage" apart from a stream
/// that was unreadable from the first byte.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error} (after {} decoded frame(s))", .frames.len())]
pub struct DecodeError {
    frames: Vec<Frame>,
    #[source]
    error: Error,
}

impl DecodeError {
    pub(crate) fn new(frames: Vec<Frame>, error: Error) -> Self {
        Self { frames, error }
    }

    /// Frames successfully decoded before the failure, in input order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The error that stopped decoding.
    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn into_parts(self) -> (Vec<Frame>, Error) {
        (self.frames, self.error)
    }
}
