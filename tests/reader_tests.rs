//! Tests for the buffered socket reader
//!
//! These tests verify:
//! - Refill-on-underrun with arbitrarily small socket reads
//! - Unread residue survives compaction
//! - Requests larger than the buffer capacity
//! - End-of-stream and socket failures

mod common;

use std::io;

use colwire::io::SocketReader;
use colwire::{BinaryReader, WireError};
use common::{ChunkedSource, FailingSource};

fn data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_read_bytes_in_order() {
    let mut reader = SocketReader::new(ChunkedSource::new(vec![1, 2, 3], 64), 16);

    assert_eq!(reader.read_byte().unwrap(), 1);
    assert_eq!(reader.read_byte().unwrap(), 2);
    assert_eq!(reader.read_byte().unwrap(), 3);
}

#[test]
fn test_read_exact_single_chunk() {
    let expected = data(40);
    let mut reader = SocketReader::new(ChunkedSource::new(expected.clone(), 64), 64);

    let mut buf = vec![0u8; 40];
    assert_eq!(reader.read_exact(&mut buf).unwrap(), 40);
    assert_eq!(buf, expected);
}

#[test]
fn test_read_exact_empty_buffer_does_no_io() {
    let mut reader = SocketReader::new(FailingSource, 8);
    let mut buf = [0u8; 0];

    assert_eq!(reader.read_exact(&mut buf).unwrap(), 0);
}

#[test]
fn test_buffered_counts_unread_bytes() {
    let mut reader = SocketReader::new(ChunkedSource::new(data(10), 10), 16);

    reader.read_byte().unwrap();
    assert_eq!(reader.buffered(), 9);
    assert_eq!(reader.capacity(), 16);
}

// =============================================================================
// Refill Tests
// =============================================================================

#[test]
fn test_one_byte_per_socket_read() {
    let expected = data(100);
    let mut reader = SocketReader::new(ChunkedSource::new(expected.clone(), 1), 8);

    let mut buf = vec![0u8; 100];
    reader.read_exact(&mut buf).unwrap();

    assert_eq!(buf, expected);
    assert_eq!(reader.get_ref().reads, 100);
}

#[test]
fn test_request_larger_than_capacity() {
    let expected = data(1000);
    let mut reader = SocketReader::new(ChunkedSource::new(expected.clone(), 3), 4);

    let mut buf = vec![0u8; 1000];
    reader.read_exact(&mut buf).unwrap();

    assert_eq!(buf, expected);
}

#[test]
fn test_refill_preserves_residue() {
    let expected = data(12);
    // Two reads of 5 bytes land in an 8-byte buffer
    let mut reader = SocketReader::new(ChunkedSource::new(expected.clone(), 5), 8);

    let mut first = [0u8; 3];
    reader.read_exact(&mut first).unwrap();
    assert_eq!(reader.buffered(), 2);

    // Needs the 2 residual bytes plus a refill
    let mut second = [0u8; 6];
    reader.read_exact(&mut second).unwrap();

    let mut rest = [0u8; 3];
    reader.read_exact(&mut rest).unwrap();

    let combined: Vec<u8> = first.iter().chain(&second).chain(&rest).copied().collect();
    assert_eq!(combined, expected);
}

#[test]
fn test_full_buffer_compacts_before_refill() {
    let expected = data(16);
    let mut reader = SocketReader::new(ChunkedSource::new(expected.clone(), 8), 8);

    // Fill the buffer completely, then consume all but one byte
    let mut head = [0u8; 7];
    reader.read_exact(&mut head).unwrap();
    assert_eq!(reader.buffered(), 1);

    let mut tail = [0u8; 9];
    reader.read_exact(&mut tail).unwrap();

    assert_eq!(&head[..], &expected[..7]);
    assert_eq!(&tail[..], &expected[7..]);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_eof_mid_request() {
    let mut reader = SocketReader::new(ChunkedSource::new(vec![1, 2, 3], 2), 8);

    let mut buf = [0u8; 4];
    let err = reader.read_exact(&mut buf).unwrap_err();

    assert!(err.is_eof(), "expected eof, got {:?}", err);
}

#[test]
fn test_eof_on_empty_source() {
    let mut reader = SocketReader::new(ChunkedSource::new(Vec::new(), 8), 8);

    assert!(reader.read_byte().unwrap_err().is_eof());
}

#[test]
fn test_socket_error_is_propagated() {
    let mut reader = SocketReader::new(FailingSource, 8);

    match reader.read_byte() {
        Err(WireError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected io error, got {:?}", other),
    }
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let mut reader = SocketReader::new(ChunkedSource::new(data(4), 4), 8);

    reader.close();
    reader.close();

    assert!(matches!(reader.read_byte(), Err(WireError::Closed)));
    let mut buf = [0u8; 2];
    assert!(matches!(reader.read_exact(&mut buf), Err(WireError::Closed)));
}

#[test]
fn test_close_after_failure() {
    let mut reader = SocketReader::new(FailingSource, 8);

    assert!(reader.read_byte().is_err());
    reader.close();
    reader.close();
}
