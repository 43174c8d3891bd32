//! Tests for Buffer reads, peeks and underrun handling

use h2_framer::{Buffer, Error};

#[test]
fn test_read_returns_bytes_in_order() {
    let mut buf = Buffer::new(vec![1, 2, 3, 4]);
    assert_eq!(&buf.read(1).unwrap()[..], &[1]);
    assert_eq!(&buf.read(3).unwrap()[..], &[2, 3, 4]);
    assert!(buf.is_exhausted());
}

#[test]
fn test_peek_does_not_advance() {
    let mut buf = Buffer::new(vec![0xAA, 0xBB]);
    assert_eq!(&buf.peek(2).unwrap()[..], &[0xAA, 0xBB]);
    assert_eq!(buf.position(), 0);
    assert_eq!(buf.read_u8().unwrap(), 0xAA);
    assert_eq!(&buf.peek(1).unwrap()[..], &[0xBB]);
}

#[test]
fn test_zero_length_read_on_exhausted_buffer() {
    let mut buf = Buffer::new(Vec::new());
    assert!(buf.is_exhausted());
    assert!(buf.read(0).unwrap().is_empty());
}

#[test]
fn test_underrun_is_atomic() {
    let mut buf = Buffer::new(vec![0, 0, 1]);
    let err = buf.read_u32().unwrap_err();
    assert_eq!(err, Error::BufferUnderrun { requested: 4, remaining: 3 });
    assert_eq!(buf.position(), 0);
    assert_eq!(buf.read_u24().unwrap(), 1);
}

#[test]
fn test_exhausted_is_distinct_from_underrun() {
    let mut buf = Buffer::new(vec![7]);
    assert!(!buf.is_exhausted());
    buf.read_u8().unwrap();
    assert!(buf.is_exhausted());
    assert!(matches!(buf.read_u8(), Err(Error::BufferUnderrun { requested: 1, remaining: 0 })));
}

#[test]
fn test_peek_underrun() {
    let buf = Buffer::new(vec![1, 2]);
    assert_eq!(
        buf.peek(3).unwrap_err(),
        Error::BufferUnderrun { requested: 3, remaining: 2 }
    );
}

#[test]
fn test_from_static_slice() {
    let mut buf = Buffer::from(&b"\x00\x10"[..]);
    assert_eq!(buf.len(), 2);
    assert_eq!(buf.read_u16().unwrap(), 16);
}
