//! h2-framer: a sans-I/O HTTP/2 binary framing codec
//!
//! This crate decodes raw HTTP/2 octets into typed frames and encodes frames
//! back into octets. It is synchronous and allocation-light: payloads are
//! slices of the input `Bytes`, never copies.
//!
//! # Features
//!
//! - **Every RFC 7540 frame type**: DATA, HEADERS, PRIORITY, RST_STREAM,
//!   SETTINGS, PUSH_PROMISE, PING, GOAWAY, WINDOW_UPDATE, CONTINUATION,
//!   plus ALTSVC (RFC 7838) and an `Unknown` variant for everything else
//! - **Structural validation**: fixed-size payloads, SETTINGS layout,
//!   padding underflow, maximum frame size
//! - **Partial results**: a decode error carries the frames decoded before it
//! - **Configurable error policy**: abort on the first malformed frame, or
//!   skip it and keep going
//! - **Incremental decoding**: [`StreamDecoder`] buffers frames split across reads
//!
//! # Quick Start
//!
//! ```rust
//! use h2_framer::{Buffer, Frame, Framer};
//!
//! // WINDOW_UPDATE, stream 0, increment 5
//! let bytes = vec![0, 0, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 5];
//! let frames = Framer::new().decode(&mut Buffer::new(bytes)).unwrap();
//!
//! for frame in &frames {
//!     match frame {
//!         Frame::WindowUpdate { header, increment } => {
//!             println!("WINDOW_UPDATE on stream {}: +{}", header.stream_id, increment);
//!         }
//!         other => println!("{:?}", other.frame_type()),
//!     }
//! }
//! assert_eq!(frames, vec![Frame::window_update(0, 5)]);
//! ```
//!
//! # Architecture
//!
//! This crate is intentionally minimal. It provides:
//! - A byte cursor ([`Buffer`])
//! - Frame decoding and encoding ([`Framer`])
//! - Chunked input handling ([`StreamDecoder`])
//!
//! It does NOT provide:
//! - HPACK (header blocks are opaque bytes)
//! - Stream state or flow-control bookkeeping
//! - Transport or TLS (you provide the bytes)

pub mod buffer;
pub mod error;
pub mod frame;
pub mod framer;
pub mod stream;

pub use buffer::Buffer;
pub use error::{DecodeError, Error, Result};
pub use frame::{
    Frame, FrameHeader, FrameType, Priority,
    FRAME_HEADER_SIZE, STREAM_ID_MASK,
    error_code, flags, frame_type, settings_id,
};
pub use framer::{ErrorPolicy, Framer, DEFAULT_MAX_FRAME_SIZE, MAX_MAX_FRAME_SIZE};
pub use stream::{StreamDecoder, CONNECTION_PREFACE, is_connection_preface};
