//! Integration tests for frame decoding and encoding

mod error_handling;
mod frame_parsing;

use h2_framer::{Buffer, DecodeError, Frame, Framer};

/// Decode `bytes` with the default framer.
pub fn decode(bytes: &[u8]) -> Result<Vec<Frame>, DecodeError> {
    Framer::new().decode(&mut Buffer::new(bytes.to_vec()))
}
