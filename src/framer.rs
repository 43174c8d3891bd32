//! HTTP/2 frame decoder and encoder.
//!
//! The [`Framer`] turns the bytes held by a [`Buffer`] into [`Frame`] values
//! and serializes frames back to bytes. It keeps no per-connection state:
//! it is only configuration (maximum frame size, error policy), so one
//! instance can be shared freely.

use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, trace, warn};

use crate::buffer::Buffer;
use crate::error::{DecodeError, Error, Result};
use crate::frame::{Frame, FrameHeader, FrameType, Priority, FRAME_HEADER_SIZE, STREAM_ID_MASK};

/// Initial SETTINGS_MAX_FRAME_SIZE (RFC 7540 Section 6.5.2).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

/// Largest value SETTINGS_MAX_FRAME_SIZE may take (2^24 - 1).
pub const MAX_MAX_FRAME_SIZE: u32 = 16_777_215;

/// What [`Framer::decode`] does when a single frame is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first error, returning the frames decoded so far.
    #[default]
    Abort,
    /// Drop the malformed frame and continue with the next one. Input that
    /// ends mid-frame still stops decoding.
    Skip,
}

/// HTTP/2 frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    max_frame_size: u32,
    error_policy: ErrorPolicy,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            error_policy: ErrorPolicy::default(),
        }
    }

    /// Set the largest payload accepted on decode and produced on encode.
    /// Values are clamped into the range the protocol allows.
    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size.clamp(DEFAULT_MAX_FRAME_SIZE, MAX_MAX_FRAME_SIZE);
        self
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    pub fn max_frame_size(&self) -> u32 {
        self.max_frame_size
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Decode every frame in `buf` until it is exhausted.
    ///
    /// On failure the returned [`DecodeError`] carries the frames decoded
    /// before the error. Under [`ErrorPolicy::Skip`] malformed frames are
    /// dropped and logged instead, and only truncated input fails.
    pub fn decode(&self, buf: &mut Buffer) -> std::result::Result<Vec<Frame>, DecodeError> {
        let mut frames = Vec::new();
        loop {
            let start = buf.position();
            match self.decode_frame(buf) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                // Skipping is only possible once the bad frame is consumed.
                Err(e) if self.error_policy == ErrorPolicy::Skip && buf.position() > start => {
                    warn!("skipping frame at offset {}: {}", start, e);
                }
                Err(e) => return Err(DecodeError::new(frames, e)),
            }
        }
        Ok(frames)
    }

    /// Decode the next frame, or `Ok(None)` if the buffer is exhausted.
    ///
    /// Truncation errors leave the cursor at the start of the incomplete
    /// frame. Any other error leaves it past the offending frame.
    pub fn decode_frame(&self, buf: &mut Buffer) -> Result<Option<Frame>> {
        if buf.is_exhausted() {
            return Ok(None);
        }

        let remaining = buf.remaining();
        if remaining < FRAME_HEADER_SIZE {
            debug!("input ends inside a frame header ({} bytes left)", remaining);
            return Err(Error::TruncatedHeader { remaining });
        }
        let header = FrameHeader::decode(&mut Buffer::new(buf.peek(FRAME_HEADER_SIZE)?))?;

        let declared = header.length as usize;
        let available = remaining - FRAME_HEADER_SIZE;
        if available < declared {
            // An oversized frame is rejected without waiting for its payload.
            if header.length > self.max_frame_size {
                return Err(self.frame_size_error(&header));
            }
            debug!(
                "{} frame declares {} payload bytes, {} available",
                header.frame_type, declared, available
            );
            return Err(Error::TruncatedPayload {
                declared,
                remaining: available,
            });
        }

        buf.skip(FRAME_HEADER_SIZE)?;
        let payload = buf.read(declared)?;
        if header.length > self.max_frame_size {
            return Err(self.frame_size_error(&header));
        }

        let frame = parse_payload(header, payload)?;
        trace!(
            "decoded {} frame: stream={} flags=0x{:02x} length={}",
            header.frame_type, header.stream_id, header.flags, header.length
        );
        Ok(Some(frame))
    }

    fn frame_size_error(&self, header: &FrameHeader) -> Error {
        Error::FrameSize {
            frame_type: header.frame_type,
            length: header.length as usize,
            max: self.max_frame_size,
        }
    }

    /// Serialize a frame. The length field is computed from the payload
    /// actually written, never copied from the stored header.
    pub fn encode(&self, frame: &Frame) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(FRAME_HEADER_SIZE + frame.payload_len());
        self.encode_into(frame, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Append a serialized frame to `dst`. Nothing is written on error.
    pub fn encode_into(&self, frame: &Frame, dst: &mut BytesMut) -> Result<()> {
        let length = frame.payload_len();
        let stored = frame.header();
        if length > self.max_frame_size as usize {
            return Err(Error::FrameSize {
                frame_type: stored.frame_type,
                length,
                max: self.max_frame_size,
            });
        }
        if let Frame::AltSvc { origin, .. } = frame {
            if origin.len() > u16::MAX as usize {
                return Err(Error::format(
                    stored.frame_type,
                    format!("origin of {} bytes does not fit a 16-bit length", origin.len()),
                ));
            }
        }

        let header = FrameHeader {
            length: length as u32,
            flags: frame.wire_flags(),
            ..*stored
        };
        dst.reserve(header.total_size());
        header.encode(dst);
        encode_payload(frame, dst);

        trace!(
            "encoded {} frame: stream={} flags=0x{:02x} length={}",
            header.frame_type, header.stream_id, header.flags, length
        );
        Ok(())
    }
}

/// Dispatch on the frame type to its payload parser.
fn parse_payload(header: FrameHeader, payload: Bytes) -> Result<Frame> {
    match header.frame_type {
        FrameType::Data => {
            let (data, pad_length) = strip_padding(&header, payload)?;
            Ok(Frame::Data {
                header,
                data,
                pad_length,
            })
        }
        FrameType::Headers => {
            let (content, pad_length) = strip_padding(&header, payload)?;
            let mut body = Buffer::new(content);
            let priority = if header.has_priority() {
                if body.remaining() < Priority::SIZE {
                    return Err(Error::format(
                        header.frame_type,
                        format!(
                            "PRIORITY flag set but only {} bytes of priority data",
                            body.remaining()
                        ),
                    ));
                }
                Some(Priority::decode(&mut body)?)
            } else {
                None
            };
            Ok(Frame::Headers {
                header,
                priority,
                header_block: body.into_remaining(),
                pad_length,
            })
        }
        FrameType::Priority => {
            expect_length(&header, Priority::SIZE)?;
            let priority = Priority::decode(&mut Buffer::new(payload))?;
            Ok(Frame::Priority { header, priority })
        }
        FrameType::RstStream => {
            expect_length(&header, 4)?;
            let error_code = Buffer::new(payload).read_u32()?;
            Ok(Frame::RstStream { header, error_code })
        }
        FrameType::Settings => {
            if header.stream_id != 0 {
                return Err(Error::format(
                    header.frame_type,
                    format!("stream id {} must be 0", header.stream_id),
                ));
            }
            if header.is_ack() && !payload.is_empty() {
                return Err(Error::format(
                    header.frame_type,
                    format!("ACK with {} byte payload", payload.len()),
                ));
            }
            if payload.len() % 6 != 0 {
                return Err(Error::format(
                    header.frame_type,
                    format!("length {} is not a multiple of 6", payload.len()),
                ));
            }
            let mut settings = Vec::with_capacity(payload.len() / 6);
            let mut body = Buffer::new(payload);
            while !body.is_exhausted() {
                let id = body.read_u16()?;
                let value = body.read_u32()?;
                settings.push((id, value));
            }
            Ok(Frame::Settings { header, settings })
        }
        FrameType::PushPromise => {
            let (content, pad_length) = strip_padding(&header, payload)?;
            if content.len() < 4 {
                return Err(Error::format(
                    header.frame_type,
                    format!("{} bytes is too short for a promised stream id", content.len()),
                ));
            }
            let mut body = Buffer::new(content);
            let promised_stream_id = body.read_u32()? & STREAM_ID_MASK;
            Ok(Frame::PushPromise {
                header,
                promised_stream_id,
                header_block: body.into_remaining(),
                pad_length,
            })
        }
        FrameType::Ping => {
            expect_length(&header, 8)?;
            let mut data = [0u8; 8];
            data.copy_from_slice(&payload);
            Ok(Frame::Ping { header, data })
        }
        FrameType::GoAway => {
            if payload.len() < 8 {
                return Err(Error::format(
                    header.frame_type,
                    format!("length {} is shorter than 8", payload.len()),
                ));
            }
            let mut body = Buffer::new(payload);
            let last_stream_id = body.read_u32()? & STREAM_ID_MASK;
            let error_code = body.read_u32()?;
            Ok(Frame::GoAway {
                header,
                last_stream_id,
                error_code,
                debug_data: body.into_remaining(),
            })
        }
        FrameType::WindowUpdate => {
            expect_length(&header, 4)?;
            let increment = Buffer::new(payload).read_u32()? & STREAM_ID_MASK;
            Ok(Frame::WindowUpdate { header, increment })
        }
        FrameType::Continuation => Ok(Frame::Continuation {
            header,
            header_block: payload,
        }),
        FrameType::AltSvc => {
            let mut body = Buffer::new(payload);
            if body.remaining() < 2 {
                return Err(Error::format(
                    header.frame_type,
                    format!("length {} is too short for an origin length", body.remaining()),
                ));
            }
            let origin_len = body.read_u16()? as usize;
            if origin_len > body.remaining() {
                return Err(Error::format(
                    header.frame_type,
                    format!(
                        "origin length {} exceeds remaining payload {}",
                        origin_len,
                        body.remaining()
                    ),
                ));
            }
            let origin = body.read(origin_len)?;
            Ok(Frame::AltSvc {
                header,
                origin,
                field_value: body.into_remaining(),
            })
        }
        FrameType::Unknown(_) => Ok(Frame::Unknown { header, payload }),
    }
}

fn expect_length(header: &FrameHeader, expected: usize) -> Result<()> {
    if header.length as usize != expected {
        return Err(Error::format(
            header.frame_type,
            format!("length {} must be exactly {}", header.length, expected),
        ));
    }
    Ok(())
}

/// Remove the pad-length prefix and trailing padding when PADDED is set.
fn strip_padding(header: &FrameHeader, payload: Bytes) -> Result<(Bytes, Option<u8>)> {
    if !header.is_padded() {
        return Ok((payload, None));
    }
    let Some(&pad_length) = payload.first() else {
        return Err(Error::format(header.frame_type, "PADDED flag set on an empty payload"));
    };
    let content_len = payload.len() - 1;
    if pad_length as usize > content_len {
        return Err(Error::format(
            header.frame_type,
            format!(
                "pad length {} exceeds remaining payload {}",
                pad_length, content_len
            ),
        ));
    }
    let content = payload.slice(1..payload.len() - pad_length as usize);
    Ok((content, Some(pad_length)))
}

fn encode_payload(frame: &Frame, dst: &mut BytesMut) {
    match frame {
        Frame::Data {
            data, pad_length, ..
        } => padded(dst, *pad_length, |dst| dst.put_slice(data)),
        Frame::Headers {
            priority,
            header_block,
            pad_length,
            ..
        } => padded(dst, *pad_length, |dst| {
            if let Some(priority) = priority {
                priority.encode(dst);
            }
            dst.put_slice(header_block);
        }),
        Frame::Priority { priority, .. } => priority.encode(dst),
        Frame::RstStream { error_code, .. } => dst.put_u32(*error_code),
        Frame::Settings { settings, .. } => {
            for &(id, value) in settings {
                dst.put_u16(id);
                dst.put_u32(value);
            }
        }
        Frame::PushPromise {
            promised_stream_id,
            header_block,
            pad_length,
            ..
        } => padded(dst, *pad_length, |dst| {
            dst.put_u32(promised_stream_id & STREAM_ID_MASK);
            dst.put_slice(header_block);
        }),
        Frame::Ping { data, .. } => dst.put_slice(data),
        Frame::GoAway {
            last_stream_id,
            error_code,
            debug_data,
            ..
        } => {
            dst.put_u32(last_stream_id & STREAM_ID_MASK);
            dst.put_u32(*error_code);
            dst.put_slice(debug_data);
        }
        Frame::WindowUpdate { increment, .. } => dst.put_u32(increment & STREAM_ID_MASK),
        Frame::Continuation { header_block, .. } => dst.put_slice(header_block),
        Frame::AltSvc {
            origin,
            field_value,
            ..
        } => {
            dst.put_u16(origin.len() as u16);
            dst.put_slice(origin);
            dst.put_slice(field_value);
        }
        Frame::Unknown { payload, .. } => dst.put_slice(payload),
    }
}

/// Write `body` framed by the pad-length byte and zeroed padding.
fn padded(dst: &mut BytesMut, pad_length: Option<u8>, body: impl FnOnce(&mut BytesMut)) {
    match pad_length {
        Some(pad) => {
            dst.put_u8(pad);
            body(dst);
            dst.put_bytes(0, pad as usize);
        }
        None => body(dst),
    }
}
