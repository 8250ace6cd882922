//! Shared helpers for colwire integration tests

#![allow(dead_code)]

use std::io::{self, Read, Write};

use colwire::io::{SocketReader, SocketWriter};
use colwire::{BinaryDeserializer, BinarySerializer};

/// Byte source that hands out at most `chunk` bytes per read call
pub struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    pub reads: usize,
}

impl ChunkedSource {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk,
            reads: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl Read for ChunkedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let n = self.chunk.min(buf.len()).min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Source whose every read fails
pub struct FailingSource;

impl Read for FailingSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
    }
}

/// Sink whose every write fails
pub struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub type VecSerializer = BinarySerializer<SocketWriter<Vec<u8>>>;
pub type ChunkedDeserializer = BinaryDeserializer<SocketReader<ChunkedSource>>;

/// Serializer writing into memory
pub fn serializer(enable_compress: bool) -> VecSerializer {
    BinarySerializer::new(SocketWriter::new(Vec::new(), 64), enable_compress)
}

/// Bytes that reached the "socket" so far
pub fn sent(ser: &VecSerializer) -> &[u8] {
    ser.get_ref().get_ref()
}

/// Deserializer over `data`, delivered `chunk` bytes at a time through a
/// receive buffer of `capacity` bytes
pub fn deserializer(
    data: impl Into<Vec<u8>>,
    chunk: usize,
    capacity: usize,
    enable_compress: bool,
) -> ChunkedDeserializer {
    BinaryDeserializer::new(
        SocketReader::new(ChunkedSource::new(data, chunk), capacity),
        enable_compress,
    )
}
