//! Tests for HTTP/2 frame header parsing

use h2_framer::{Error, Frame, FrameHeader, FrameType, flags};

use crate::decode;

#[test]
fn test_frame_header_parse() {
    // DATA frame, length 5, stream 1, END_STREAM
    let header_bytes = [0, 0, 5, 0, 1, 0, 0, 0, 1];
    let header = FrameHeader::parse(&header_bytes).unwrap();

    assert_eq!(header.length, 5);
    assert_eq!(header.frame_type, FrameType::Data);
    assert_eq!(header.stream_id, 1);
    assert!(header.is_end_stream());
    assert!(!header.is_end_headers());
}

#[test]
fn test_frame_header_headers() {
    // HEADERS frame, length 10, stream 3, END_HEADERS
    let header_bytes = [0, 0, 10, 1, 4, 0, 0, 0, 3];
    let header = FrameHeader::parse(&header_bytes).unwrap();

    assert_eq!(header.length, 10);
    assert_eq!(header.frame_type, FrameType::Headers);
    assert_eq!(header.stream_id, 3);
    assert!(!header.is_end_stream());
    assert!(header.is_end_headers());
}

#[test]
fn test_stream_id_clears_reserved_bit() {
    // Frame header with reserved bit set on stream ID
    let header_bytes = [0, 0, 0, 4, 0, 0x80, 0x00, 0x00, 0x05];
    let header = FrameHeader::parse(&header_bytes).unwrap();
    assert_eq!(header.stream_id, 5, "Reserved bit should be cleared from stream ID");
}

#[test]
fn test_total_size() {
    let header = FrameHeader {
        length: 100,
        frame_type: FrameType::Data,
        flags: 0,
        stream_id: 1,
    };
    assert_eq!(header.total_size(), 109); // 9 + 100
}

#[test]
fn test_window_update_end_to_end() {
    let bytes = [0x00, 0x00, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05];

    let frames = decode(&bytes).unwrap();
    assert_eq!(frames.len(), 1);

    match &frames[0] {
        Frame::WindowUpdate { header, increment } => {
            assert_eq!(header.length, 4);
            assert_eq!(header.stream_id, 0);
            assert_eq!(*increment, 5);
        }
        _ => panic!("Expected WindowUpdate frame"),
    }
}

#[test]
fn test_two_ping_frames_in_order() {
    let mut bytes = vec![0, 0, 8, 6, 0, 0, 0, 0, 0];
    bytes.extend_from_slice(&[1, 1, 1, 1, 1, 1, 1, 1]);
    bytes.extend_from_slice(&[0, 0, 8, 6, flags::ACK, 0, 0, 0, 0]);
    bytes.extend_from_slice(&[2, 2, 2, 2, 2, 2, 2, 2]);

    let frames = decode(&bytes).unwrap();
    assert_eq!(frames, vec![Frame::ping([1; 8]), Frame::ping_ack([2; 8])]);
}

#[test]
fn test_empty_input_yields_no_frames() {
    assert!(decode(&[]).unwrap().is_empty());
}

#[test]
fn test_short_input_is_truncated_header() {
    for len in 1..9 {
        let bytes = vec![0u8; len];
        let err = decode(&bytes).unwrap_err();
        assert!(err.frames().is_empty());
        assert_eq!(*err.error(), Error::TruncatedHeader { remaining: len });
    }
}

#[test]
fn test_trailing_partial_header_is_surfaced() {
    let mut bytes = vec![0, 0, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 5];
    bytes.extend_from_slice(&[0, 0, 8]);

    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.frames(), &[Frame::window_update(0, 5)]);
    assert_eq!(*err.error(), Error::TruncatedHeader { remaining: 3 });
}

#[test]
fn test_truncated_payload() {
    let bytes = [0, 0, 8, 6, 0, 0, 0, 0, 0, 1, 2, 3];
    let err = decode(&bytes).unwrap_err();
    assert!(err.frames().is_empty());
    assert_eq!(*err.error(), Error::TruncatedPayload { declared: 8, remaining: 3 });
}
