//! Integration tests for colwire
//!
//! End-to-end sessions that toggle compression mid-stream.

mod common;

use std::fs::File;

use colwire::io::{BlockHeader, CompressionMethod, SocketReader, SocketWriter, MAX_BLOCK_SIZE};
use colwire::{BinaryDeserializer, BinaryReader, BinarySerializer, Config};
use common::{deserializer, sent, serializer, ChunkedSource};
use tempfile::TempDir;

// =============================================================================
// Switch Ordering Tests
// =============================================================================

#[test]
fn test_disable_flushes_block_before_plain_bytes() {
    let compressed: Vec<u8> = (0..300u32).map(|i| (i % 17) as u8).collect();
    let plain = b"after the block".to_vec();

    let mut ser = serializer(true);
    ser.maybe_enable_compressed();
    ser.write_bytes(&compressed).unwrap();
    ser.maybe_disable_compressed().unwrap();

    // The finalized block is on the wire before any plain byte is written
    let block_len = sent(&ser).len();
    assert!(block_len > 0);

    ser.write_bytes(&plain).unwrap();
    ser.flush(false).unwrap();
    let stream = sent(&ser).to_vec();

    // Exactly one block, then the plain tail
    let mut reader = SocketReader::new(ChunkedSource::new(stream[..block_len].to_vec(), 64), 64);
    let header = BlockHeader::read_from(&mut reader).unwrap();
    let mut payload = vec![0u8; header.payload_len()];
    reader.read_exact(&mut payload).unwrap();
    assert_eq!(header.decode_payload(&payload).unwrap(), compressed);
    assert_eq!(reader.buffered(), 0);
    assert_eq!(reader.get_ref().remaining(), 0);

    assert_eq!(&stream[block_len..], &plain[..]);
}

#[test]
fn test_session_round_trip_with_toggles() {
    let mut ser = serializer(true);

    ser.write_utf8_binary("handshake").unwrap();
    ser.write_var_int(54_451).unwrap();
    ser.flush(true).unwrap();

    for round in 0..3i64 {
        ser.maybe_enable_compressed();
        assert!(ser.is_compressed());
        for i in 0..100 {
            ser.write_long_le(round * 1000 + i).unwrap();
        }
        ser.write_utf8_binary("end of data").unwrap();
        ser.maybe_disable_compressed().unwrap();
        assert!(!ser.is_compressed());

        ser.write_var_int(round as u64).unwrap();
        ser.flush(true).unwrap();
    }
    let stream = sent(&ser).to_vec();

    for (chunk, capacity) in [(1, 4), (5, 16), (4096, 4096)] {
        let mut de = deserializer(stream.clone(), chunk, capacity, true);

        assert_eq!(de.read_utf8_binary().unwrap(), "handshake");
        assert_eq!(de.read_var_int().unwrap(), 54_451);

        for round in 0..3i64 {
            de.maybe_enable_compressed();
            for i in 0..100 {
                assert_eq!(de.read_long_le().unwrap(), round * 1000 + i);
            }
            assert_eq!(de.read_utf8_binary().unwrap(), "end of data");
            de.maybe_disable_compressed();

            assert_eq!(de.read_var_int().unwrap(), round as u64);
        }
    }
}

#[test]
fn test_small_blocks_split_compressed_data() {
    let mut ser = BinarySerializer::with_method(
        SocketWriter::new(Vec::new(), 64),
        true,
        CompressionMethod::Stored,
        10,
    );
    ser.maybe_enable_compressed();
    for i in 0..20 {
        ser.write_int_le(i).unwrap();
    }
    ser.maybe_disable_compressed().unwrap();
    ser.write_byte(0xEE).unwrap();
    ser.flush(false).unwrap();
    let stream = ser.into_inner().into_inner();

    // 80 bytes in blocks of at most 10
    let blocks = 8;
    let expected_len = blocks * (4 + 9) + 80 + 1;
    assert_eq!(stream.len(), expected_len);

    let mut de = deserializer(stream, 3, 8, true);
    de.maybe_enable_compressed();
    for i in 0..20 {
        assert_eq!(de.read_int_le().unwrap(), i);
    }
    de.maybe_disable_compressed();
    assert_eq!(de.read_byte().unwrap(), 0xEE);
}

#[test]
fn test_compression_enabled_but_unused_matches_plain() {
    let write = |ser: &mut common::VecSerializer| {
        ser.write_var_int(99).unwrap();
        ser.write_double_le(6.5).unwrap();
        ser.write_utf8_binary("same bytes").unwrap();
        ser.flush(true).unwrap();
    };

    let mut with = serializer(true);
    let mut without = serializer(false);
    write(&mut with);
    write(&mut without);

    assert_eq!(sent(&with), sent(&without));
}

// =============================================================================
// Config / File-backed Tests
// =============================================================================

#[test]
fn test_file_backed_session_from_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("capture.bin");

    let config = Config::builder()
        .recv_buffer_size(16)
        .send_buffer_size(8)
        .compression(true)
        .compress_block_size(32)
        .build();
    config.validate().unwrap();

    let mut ser = BinarySerializer::from_config(
        SocketWriter::new(File::create(&path).unwrap(), config.send_buffer_size),
        &config,
    );
    ser.write_utf8_binary("plain prefix").unwrap();
    ser.maybe_enable_compressed();
    for i in 0..64u64 {
        ser.write_var_int(i * i * i).unwrap();
    }
    ser.maybe_disable_compressed().unwrap();
    ser.write_boolean(true).unwrap();
    ser.flush(true).unwrap();
    ser.close();

    let mut de = BinaryDeserializer::from_config(
        SocketReader::new(File::open(&path).unwrap(), config.recv_buffer_size),
        &config,
    );
    assert_eq!(de.read_utf8_binary().unwrap(), "plain prefix");
    de.maybe_enable_compressed();
    for i in 0..64u64 {
        assert_eq!(de.read_var_int().unwrap(), i * i * i);
    }
    de.maybe_disable_compressed();
    assert!(de.read_boolean().unwrap());
    assert!(de.read_byte().unwrap_err().is_eof());
    de.close();
}

#[test]
fn test_config_validation() {
    assert!(Config::default().validate().is_ok());
    assert!(Config::builder().recv_buffer_size(0).build().validate().is_err());
    assert!(Config::builder().compress_block_size(0).build().validate().is_err());
}

#[test]
fn test_config_block_size_limit() {
    let at_limit = Config::builder().compress_block_size(MAX_BLOCK_SIZE).build();
    assert!(at_limit.validate().is_ok());

    let over_limit = Config::builder().compress_block_size(MAX_BLOCK_SIZE + 1).build();
    assert!(matches!(over_limit.validate(), Err(colwire::WireError::Config(_))));
}
