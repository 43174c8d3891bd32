//! Tests for structural validation errors

use h2_framer::{Error, Frame, FrameType};

use crate::decode;

fn format_error_type(bytes: &[u8]) -> FrameType {
    match decode(bytes).unwrap_err().into_parts().1 {
        Error::FrameFormat { frame_type, .. } => frame_type,
        other => panic!("Expected FrameFormat error, got {:?}", other),
    }
}

#[test]
fn test_window_update_wrong_length() {
    let frame = [0, 0, 2, 8, 0, 0, 0, 0, 1, 0, 0];
    assert_eq!(format_error_type(&frame), FrameType::WindowUpdate);
}

#[test]
fn test_ping_wrong_length() {
    let frame = [0, 0, 4, 6, 0, 0, 0, 0, 0, 1, 2, 3, 4];
    let err = decode(&frame).unwrap_err();
    assert!(err.to_string().contains("PING"));
}

#[test]
fn test_goaway_too_short() {
    let frame = [0, 0, 4, 7, 0, 0, 0, 0, 0, 0, 0, 0, 5];
    assert_eq!(format_error_type(&frame), FrameType::GoAway);
}

#[test]
fn test_rst_stream_wrong_length() {
    let frame = [0, 0, 2, 3, 0, 0, 0, 0, 1, 0, 0];
    assert_eq!(format_error_type(&frame), FrameType::RstStream);
}

#[test]
fn test_priority_wrong_length() {
    for len in [0u8, 4, 6] {
        let mut frame = vec![0, 0, len, 2, 0, 0, 0, 0, 1];
        frame.extend(std::iter::repeat(0).take(len as usize));
        assert_eq!(format_error_type(&frame), FrameType::Priority, "length {}", len);
    }
}

#[test]
fn test_settings_length_not_multiple_of_six() {
    let mut bytes = vec![0, 0, 7, 4, 0, 0, 0, 0, 0];
    bytes.extend_from_slice(&[0, 1, 0, 0, 16, 0, 9]);
    // A valid frame after the malformed one is not decoded
    bytes.extend_from_slice(&[0, 0, 0, 4, 1, 0, 0, 0, 0]);

    let err = decode(&bytes).unwrap_err();
    assert!(err.frames().is_empty());
    assert!(matches!(
        err.error(),
        Error::FrameFormat { frame_type: FrameType::Settings, .. }
    ));
}

#[test]
fn test_settings_error_keeps_earlier_frames() {
    let mut bytes = vec![0, 0, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 5];
    bytes.extend_from_slice(&[0, 0, 5, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.frames(), &[Frame::window_update(0, 5)]);
    assert!(err.to_string().contains("after 1 decoded frame(s)"));
}

#[test]
fn test_settings_on_stream_rejected() {
    let frame = [0, 0, 0, 4, 0, 0, 0, 0, 1];
    assert_eq!(format_error_type(&frame), FrameType::Settings);
}

#[test]
fn test_settings_ack_with_payload_rejected() {
    let frame = [0, 0, 6, 4, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0];
    assert_eq!(format_error_type(&frame), FrameType::Settings);
}

#[test]
fn test_headers_priority_flag_without_priority_data() {
    let frame = [0, 0, 3, 1, 0x24, 0, 0, 0, 1, 0, 0, 0];
    assert_eq!(format_error_type(&frame), FrameType::Headers);
}

#[test]
fn test_push_promise_missing_promised_stream() {
    let frame = [0, 0, 2, 5, 0x4, 0, 0, 0, 1, 0, 0];
    assert_eq!(format_error_type(&frame), FrameType::PushPromise);
}

#[test]
fn test_altsvc_origin_overruns_payload() {
    let frame = [0, 0, 4, 0xa, 0, 0, 0, 0, 0, 0, 9, b'a', b'b'];
    assert_eq!(format_error_type(&frame), FrameType::AltSvc);
}

#[test]
fn test_oversized_frame() {
    let len = 16_385u32;
    let mut bytes = vec![(len >> 16) as u8, (len >> 8) as u8, len as u8, 0, 0, 0, 0, 0, 1];
    bytes.extend(std::iter::repeat(0).take(len as usize));

    let err = decode(&bytes).unwrap_err();
    assert_eq!(
        *err.error(),
        Error::FrameSize {
            frame_type: FrameType::Data,
            length: 16_385,
            max: 16_384,
        }
    );
}
