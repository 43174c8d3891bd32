//! HTTP/2 frame model: registries, the 9-byte header and the [`Frame`] sum type.
//!
//! Reference: RFC 7540 Sections 4.1 and 6, RFC 7838 Section 4 (ALTSVC)

use std::fmt;

use bytes::Bytes;

use crate::buffer::Buffer;
use crate::error::{Error, Result};

/// HTTP/2 frame types (RFC 7540 Section 6)
pub mod frame_type {
    pub const DATA: u8 = 0x0;
    pub const HEADERS: u8 = 0x1;
    pub const PRIORITY: u8 = 0x2;
    pub const RST_STREAM: u8 = 0x3;
    pub const SETTINGS: u8 = 0x4;
    pub const PUSH_PROMISE: u8 = 0x5;
    pub const PING: u8 = 0x6;
    pub const GOAWAY: u8 = 0x7;
    pub const WINDOW_UPDATE: u8 = 0x8;
    pub const CONTINUATION: u8 = 0x9;
    pub const ALTSVC: u8 = 0xa;
}

/// HTTP/2 frame flags. Bits are shared between types, so `ACK` and
/// `END_STREAM` have the same value.
pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const ACK: u8 = 0x1;
    pub const END_HEADERS: u8 = 0x4;
    pub const PADDED: u8 = 0x8;
    pub const PRIORITY: u8 = 0x20;
}

/// HTTP/2 SETTINGS identifiers (RFC 7540 Section 6.5.2)
pub mod settings_id {
    pub const HEADER_TABLE_SIZE: u16 = 0x1;
    pub const ENABLE_PUSH: u16 = 0x2;
    pub const MAX_CONCURRENT_STREAMS: u16 = 0x3;
    pub const INITIAL_WINDOW_SIZE: u16 = 0x4;
    pub const MAX_FRAME_SIZE: u16 = 0x5;
    pub const MAX_HEADER_LIST_SIZE: u16 = 0x6;
}

/// HTTP/2 error codes (RFC 7540 Section 7)
pub mod error_code {
    pub const NO_ERROR: u32 = 0x0;
    pub const PROTOCOL_ERROR: u32 = 0x1;
    pub const INTERNAL_ERROR: u32 = 0x2;
    pub const FLOW_CONTROL_ERROR: u32 = 0x3;
    pub const SETTINGS_TIMEOUT: u32 = 0x4;
    pub const STREAM_CLOSED: u32 = 0x5;
    pub const FRAME_SIZE_ERROR: u32 = 0x6;
    pub const REFUSED_STREAM: u32 = 0x7;
    pub const CANCEL: u32 = 0x8;
    pub const COMPRESSION_ERROR: u32 = 0x9;
    pub const CONNECT_ERROR: u32 = 0xa;
    pub const ENHANCE_YOUR_CALM: u32 = 0xb;
    pub const INADEQUATE_SECURITY: u32 = 0xc;
    pub const HTTP_1_1_REQUIRED: u32 = 0xd;
}

/// Size of the fixed frame header.
pub const FRAME_HEADER_SIZE: usize = 9;

/// Mask for 31-bit stream identifiers; the high bit is reserved.
pub const STREAM_ID_MASK: u32 = 0x7FFF_FFFF;

/// Frame type code. Codes outside the registry are kept as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    AltSvc,
    Unknown(u8),
}

impl From<u8> for FrameType {
    fn from(code: u8) -> Self {
        match code {
            frame_type::DATA => FrameType::Data,
            frame_type::HEADERS => FrameType::Headers,
            frame_type::PRIORITY => FrameType::Priority,
            frame_type::RST_STREAM => FrameType::RstStream,
            frame_type::SETTINGS => FrameType::Settings,
            frame_type::PUSH_PROMISE => FrameType::PushPromise,
            frame_type::PING => FrameType::Ping,
            frame_type::GOAWAY => FrameType::GoAway,
            frame_type::WINDOW_UPDATE => FrameType::WindowUpdate,
            frame_type::CONTINUATION => FrameType::Continuation,
            frame_type::ALTSVC => FrameType::AltSvc,
            other => FrameType::Unknown(other),
        }
    }
}

impl From<FrameType> for u8 {
    fn from(kind: FrameType) -> u8 {
        match kind {
            FrameType::Data => frame_type::DATA,
            FrameType::Headers => frame_type::HEADERS,
            FrameType::Priority => frame_type::PRIORITY,
            FrameType::RstStream => frame_type::RST_STREAM,
            FrameType::Settings => frame_type::SETTINGS,
            FrameType::PushPromise => frame_type::PUSH_PROMISE,
            FrameType::Ping => frame_type::PING,
            FrameType::GoAway => frame_type::GOAWAY,
            FrameType::WindowUpdate => frame_type::WINDOW_UPDATE,
            FrameType::Continuation => frame_type::CONTINUATION,
            FrameType::AltSvc => frame_type::ALTSVC,
            FrameType::Unknown(code) => code,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameType::Data => "DATA",
            FrameType::Headers => "HEADERS",
            FrameType::Priority => "PRIORITY",
            FrameType::RstStream => "RST_STREAM",
            FrameType::Settings => "SETTINGS",
            FrameType::PushPromise => "PUSH_PROMISE",
            FrameType::Ping => "PING",
            FrameType::GoAway => "GOAWAY",
            FrameType::WindowUpdate => "WINDOW_UPDATE",
            FrameType::Continuation => "CONTINUATION",
            FrameType::AltSvc => "ALTSVC",
            FrameType::Unknown(code) => return write!(f, "UNKNOWN(0x{:02x})", code),
        };
        f.write_str(name)
    }
}

/// A parsed HTTP/2 frame header (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u32,      // 24 bits
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,   // 31 bits (high bit reserved)
}

impl FrameHeader {
    fn new(frame_type: FrameType, flags: u8, stream_id: u32) -> Self {
        Self {
            length: 0,
            frame_type,
            flags,
            stream_id: stream_id & STREAM_ID_MASK,
        }
    }

    /// Parse a 9-byte frame header. Extra trailing bytes are ignored.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FRAME_HEADER_SIZE {
            return Err(Error::TruncatedHeader { remaining: data.len() });
        }
        let mut buf = Buffer::new(Bytes::copy_from_slice(&data[..FRAME_HEADER_SIZE]));
        Self::decode(&mut buf)
    }

    /// Read a header from the cursor. The reserved stream-id bit is dropped.
    pub fn decode(buf: &mut Buffer) -> Result<Self> {
        let remaining = buf.remaining();
        if remaining < FRAME_HEADER_SIZE {
            return Err(Error::TruncatedHeader { remaining });
        }
        let length = buf.read_u24()?;
        let frame_type = FrameType::from(buf.read_u8()?);
        let flags = buf.read_u8()?;
        let stream_id = buf.read_u32()? & STREAM_ID_MASK;
        Ok(Self {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Write the header as-is; the reserved bit is always written as 0.
    pub fn encode(&self, dst: &mut impl bytes::BufMut) {
        dst.put_uint(u64::from(self.length), 3);
        dst.put_u8(self.frame_type.into());
        dst.put_u8(self.flags);
        dst.put_u32(self.stream_id & STREAM_ID_MASK);
    }

    /// Total frame size including header
    pub fn total_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.length as usize
    }

    pub fn is_end_stream(&self) -> bool {
        self.flags & flags::END_STREAM != 0
    }

    pub fn is_end_headers(&self) -> bool {
        self.flags & flags::END_HEADERS != 0
    }

    /// ACK bit, meaningful for SETTINGS and PING only.
    pub fn is_ack(&self) -> bool {
        self.flags & flags::ACK != 0
    }

    pub fn is_padded(&self) -> bool {
        self.flags & flags::PADDED != 0
    }

    pub fn has_priority(&self) -> bool {
        self.flags & flags::PRIORITY != 0
    }
}

/// Stream dependency fields carried by PRIORITY and prioritized HEADERS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub exclusive: bool,
    pub dependency: u32,
    /// Wire value; the effective weight is `weight + 1`.
    pub weight: u8,
}

impl Priority {
    /// Encoded size: 4-byte dependency plus 1-byte weight.
    pub const SIZE: usize = 5;

    pub fn new(dependency: u32, weight: u8, exclusive: bool) -> Self {
        Self {
            exclusive,
            dependency: dependency & STREAM_ID_MASK,
            weight,
        }
    }

    pub(crate) fn decode(buf: &mut Buffer) -> Result<Self> {
        let raw = buf.read_u32()?;
        let weight = buf.read_u8()?;
        Ok(Self {
            exclusive: raw & !STREAM_ID_MASK != 0,
            dependency: raw & STREAM_ID_MASK,
            weight,
        })
    }

    pub(crate) fn encode(&self, dst: &mut impl bytes::BufMut) {
        let exclusive = if self.exclusive { !STREAM_ID_MASK } else { 0 };
        dst.put_u32((self.dependency & STREAM_ID_MASK) | exclusive);
        dst.put_u8(self.weight);
    }
}

/// A decoded HTTP/2 frame.
///
/// Values come out of [`Framer::decode`](crate::Framer::decode) or the
/// constructors below, which keep `header.length` and the PADDED/PRIORITY
/// flags consistent with the payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data {
        header: FrameHeader,
        data: Bytes,
        pad_length: Option<u8>,
    },
    Headers {
        header: FrameHeader,
        priority: Option<Priority>,
        /// HPACK-encoded header block fragment, not decompressed.
        header_block: Bytes,
        pad_length: Option<u8>,
    },
    Priority {
        header: FrameHeader,
        priority: Priority,
    },
    RstStream {
        header: FrameHeader,
        error_code: u32,
    },
    Settings {
        header: FrameHeader,
        /// (identifier, value) pairs in wire order. Use [`Frame::setting`]
        /// for the effective value of an id.
        settings: Vec<(u16, u32)>,
    },
    PushPromise {
        header: FrameHeader,
        promised_stream_id: u32,
        header_block: Bytes,
        pad_length: Option<u8>,
    },
    Ping {
        header: FrameHeader,
        data: [u8; 8],
    },
    GoAway {
        header: FrameHeader,
        last_stream_id: u32,
        error_code: u32,
        debug_data: Bytes,
    },
    WindowUpdate {
        header: FrameHeader,
        increment: u32,
    },
    Continuation {
        header: FrameHeader,
        header_block: Bytes,
    },
    AltSvc {
        header: FrameHeader,
        origin: Bytes,
        field_value: Bytes,
    },
    /// Frame of an unregistered type, payload kept verbatim.
    Unknown {
        header: FrameHeader,
        payload: Bytes,
    },
}

fn padding_len(pad_length: Option<u8>) -> usize {
    pad_length.map_or(0, |pad| 1 + pad as usize)
}

impl Frame {
    pub fn data(stream_id: u32, data: impl Into<Bytes>, end_stream: bool) -> Self {
        let flags = if end_stream { flags::END_STREAM } else { 0 };
        Frame::Data {
            header: FrameHeader::new(FrameType::Data, flags, stream_id),
            data: data.into(),
            pad_length: None,
        }
        .sealed()
    }

    pub fn headers(
        stream_id: u32,
        header_block: impl Into<Bytes>,
        end_stream: bool,
        end_headers: bool,
    ) -> Self {
        let mut flags = 0;
        if end_stream {
            flags |= flags::END_STREAM;
        }
        if end_headers {
            flags |= flags::END_HEADERS;
        }
        Frame::Headers {
            header: FrameHeader::new(FrameType::Headers, flags, stream_id),
            priority: None,
            header_block: header_block.into(),
            pad_length: None,
        }
        .sealed()
    }

    pub fn priority(stream_id: u32, priority: Priority) -> Self {
        Frame::Priority {
            header: FrameHeader::new(FrameType::Priority, 0, stream_id),
            priority,
        }
        .sealed()
    }

    pub fn rst_stream(stream_id: u32, error_code: u32) -> Self {
        Frame::RstStream {
            header: FrameHeader::new(FrameType::RstStream, 0, stream_id),
            error_code,
        }
        .sealed()
    }

    pub fn settings(settings: impl IntoIterator<Item = (u16, u32)>) -> Self {
        Frame::Settings {
            header: FrameHeader::new(FrameType::Settings, 0, 0),
            settings: settings.into_iter().collect(),
        }
        .sealed()
    }

    pub fn settings_ack() -> Self {
        Frame::Settings {
            header: FrameHeader::new(FrameType::Settings, flags::ACK, 0),
            settings: Vec::new(),
        }
        .sealed()
    }

    pub fn push_promise(
        stream_id: u32,
        promised_stream_id: u32,
        header_block: impl Into<Bytes>,
        end_headers: bool,
    ) -> Self {
        let flags = if end_headers { flags::END_HEADERS } else { 0 };
        Frame::PushPromise {
            header: FrameHeader::new(FrameType::PushPromise, flags, stream_id),
            promised_stream_id: promised_stream_id & STREAM_ID_MASK,
            header_block: header_block.into(),
            pad_length: None,
        }
        .sealed()
    }

    pub fn ping(data: [u8; 8]) -> Self {
        Frame::Ping {
            header: FrameHeader::new(FrameType::Ping, 0, 0),
            data,
        }
        .sealed()
    }

    pub fn ping_ack(data: [u8; 8]) -> Self {
        Frame::Ping {
            header: FrameHeader::new(FrameType::Ping, flags::ACK, 0),
            data,
        }
        .sealed()
    }

    pub fn goaway(last_stream_id: u32, error_code: u32, debug_data: impl Into<Bytes>) -> Self {
        Frame::GoAway {
            header: FrameHeader::new(FrameType::GoAway, 0, 0),
            last_stream_id: last_stream_id & STREAM_ID_MASK,
            error_code,
            debug_data: debug_data.into(),
        }
        .sealed()
    }

    /// stream_id=0 targets the connection-level window
    pub fn window_update(stream_id: u32, increment: u32) -> Self {
        Frame::WindowUpdate {
            header: FrameHeader::new(FrameType::WindowUpdate, 0, stream_id),
            increment: increment & STREAM_ID_MASK,
        }
        .sealed()
    }

    pub fn continuation(stream_id: u32, header_block: impl Into<Bytes>, end_headers: bool) -> Self {
        let flags = if end_headers { flags::END_HEADERS } else { 0 };
        Frame::Continuation {
            header: FrameHeader::new(FrameType::Continuation, flags, stream_id),
            header_block: header_block.into(),
        }
        .sealed()
    }

    pub fn altsvc(stream_id: u32, origin: impl Into<Bytes>, field_value: impl Into<Bytes>) -> Self {
        Frame::AltSvc {
            header: FrameHeader::new(FrameType::AltSvc, 0, stream_id),
            origin: origin.into(),
            field_value: field_value.into(),
        }
        .sealed()
    }

    /// Raw frame of an unregistered type code. Registered codes are
    /// rejected: their bytes would decode as the typed variant instead.
    pub fn unknown(code: u8, flags: u8, stream_id: u32, payload: impl Into<Bytes>) -> Result<Self> {
        let frame_type = FrameType::from(code);
        if !matches!(frame_type, FrameType::Unknown(_)) {
            return Err(Error::format(
                frame_type,
                "registered frame type cannot be built as an unknown frame",
            ));
        }
        Ok(Frame::Unknown {
            header: FrameHeader::new(frame_type, flags, stream_id),
            payload: payload.into(),
        }
        .sealed())
    }

    /// Add `pad_length` bytes of padding. Only DATA, HEADERS and
    /// PUSH_PROMISE carry padding; other frames are returned unchanged.
    pub fn with_padding(mut self, pad: u8) -> Self {
        let applied = match &mut self {
            Frame::Data { pad_length, .. }
            | Frame::Headers { pad_length, .. }
            | Frame::PushPromise { pad_length, .. } => {
                *pad_length = Some(pad);
                true
            }
            _ => false,
        };
        if applied { self.sealed() } else { self }
    }

    /// Attach stream dependency fields to a HEADERS frame; other frames
    /// are returned unchanged.
    pub fn with_priority(mut self, dependency: Priority) -> Self {
        if let Frame::Headers { priority, .. } = &mut self {
            *priority = Some(dependency);
            return self.sealed();
        }
        self
    }

    fn sealed(mut self) -> Self {
        let length = self.payload_len() as u32;
        let flags = self.wire_flags();
        let header = self.header_mut();
        header.length = length;
        header.flags = flags;
        self
    }

    pub fn header(&self) -> &FrameHeader {
        match self {
            Frame::Data { header, .. }
            | Frame::Headers { header, .. }
            | Frame::Priority { header, .. }
            | Frame::RstStream { header, .. }
            | Frame::Settings { header, .. }
            | Frame::PushPromise { header, .. }
            | Frame::Ping { header, .. }
            | Frame::GoAway { header, .. }
            | Frame::WindowUpdate { header, .. }
            | Frame::Continuation { header, .. }
            | Frame::AltSvc { header, .. }
            | Frame::Unknown { header, .. } => header,
        }
    }

    fn header_mut(&mut self) -> &mut FrameHeader {
        match self {
            Frame::Data { header, .. }
            | Frame::Headers { header, .. }
            | Frame::Priority { header, .. }
            | Frame::RstStream { header, .. }
            | Frame::Settings { header, .. }
            | Frame::PushPromise { header, .. }
            | Frame::Ping { header, .. }
            | Frame::GoAway { header, .. }
            | Frame::WindowUpdate { header, .. }
            | Frame::Continuation { header, .. }
            | Frame::AltSvc { header, .. }
            | Frame::Unknown { header, .. } => header,
        }
    }

    pub fn frame_type(&self) -> FrameType {
        self.header().frame_type
    }

    pub fn stream_id(&self) -> u32 {
        self.header().stream_id
    }

    pub fn flags(&self) -> u8 {
        self.header().flags
    }

    /// END_STREAM, only meaningful on DATA and HEADERS.
    pub fn is_end_stream(&self) -> bool {
        matches!(self, Frame::Data { .. } | Frame::Headers { .. }) && self.header().is_end_stream()
    }

    /// END_HEADERS, only meaningful on HEADERS, PUSH_PROMISE and CONTINUATION.
    pub fn is_end_headers(&self) -> bool {
        matches!(
            self,
            Frame::Headers { .. } | Frame::PushPromise { .. } | Frame::Continuation { .. }
        ) && self.header().is_end_headers()
    }

    /// Effective value of a SETTINGS parameter: the last occurrence wins,
    /// as entries are applied in order. `None` on other frame types.
    pub fn setting(&self, id: u16) -> Option<u32> {
        match self {
            Frame::Settings { settings, .. } => settings
                .iter()
                .rev()
                .find(|(setting_id, _)| *setting_id == id)
                .map(|&(_, value)| value),
            _ => None,
        }
    }

    /// ACK, only meaningful on SETTINGS and PING.
    pub fn is_ack(&self) -> bool {
        matches!(self, Frame::Settings { .. } | Frame::Ping { .. }) && self.header().is_ack()
    }

    pub fn is_padded(&self) -> bool {
        self.pad_length().is_some()
    }

    pub fn pad_length(&self) -> Option<u8> {
        match self {
            Frame::Data { pad_length, .. }
            | Frame::Headers { pad_length, .. }
            | Frame::PushPromise { pad_length, .. } => *pad_length,
            _ => None,
        }
    }

    /// Serialized payload size, derived from the payload fields.
    pub fn payload_len(&self) -> usize {
        match self {
            Frame::Data { data, pad_length, .. } => padding_len(*pad_length) + data.len(),
            Frame::Headers {
                priority,
                header_block,
                pad_length,
                ..
            } => {
                let priority_len = if priority.is_some() { Priority::SIZE } else { 0 };
                padding_len(*pad_length) + priority_len + header_block.len()
            }
            Frame::Priority { .. } => Priority::SIZE,
            Frame::RstStream { .. } => 4,
            Frame::Settings { settings, .. } => settings.len() * 6,
            Frame::PushPromise {
                header_block,
                pad_length,
                ..
            } => padding_len(*pad_length) + 4 + header_block.len(),
            Frame::Ping { .. } => 8,
            Frame::GoAway { debug_data, .. } => 8 + debug_data.len(),
            Frame::WindowUpdate { .. } => 4,
            Frame::Continuation { header_block, .. } => header_block.len(),
            Frame::AltSvc {
                origin,
                field_value,
                ..
            } => 2 + origin.len() + field_value.len(),
            Frame::Unknown { payload, .. } => payload.len(),
        }
    }

    /// Flags as written on the wire: PADDED and PRIORITY follow the payload
    /// fields, every other bit is taken from the stored header.
    pub fn wire_flags(&self) -> u8 {
        let stored = self.header().flags;
        let padded = if self.is_padded() { flags::PADDED } else { 0 };
        match self {
            Frame::Data { .. } | Frame::PushPromise { .. } => (stored & !flags::PADDED) | padded,
            Frame::Headers { priority, .. } => {
                let prioritized = if priority.is_some() { flags::PRIORITY } else { 0 };
                (stored & !(flags::PADDED | flags::PRIORITY)) | padded | prioritized
            }
            _ => stored,
        }
    }
}
