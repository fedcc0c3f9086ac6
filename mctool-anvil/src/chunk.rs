//! A single compressed chunk payload.
//!
//! Region files store each chunk as `[len:4][scheme:1][compressed:len-1]`.
//! [`Chunk`] keeps the scheme and compressed bytes as read, so untouched
//! chunks are written back byte for byte.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use mctool_nbt::Compound;

use crate::{Error, Result};

/// Compression scheme byte of a chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zlib,
    /// Any other scheme byte. Kept so the payload survives a rewrite, but it
    /// cannot be decoded or re-encoded.
    Other(u8),
}

impl Compression {
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Compression::Gzip,
            2 => Compression::Zlib,
            other => Compression::Other(other),
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Compression::Gzip => 1,
            Compression::Zlib => 2,
            Compression::Other(id) => id,
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let read = match self {
            Compression::Gzip => GzDecoder::new(data).read_to_end(&mut out),
            Compression::Zlib => ZlibDecoder::new(data).read_to_end(&mut out),
            Compression::Other(id) => return Err(Error::UnknownCompression(id)),
        };
        read.map_err(Error::Decompress)?;
        Ok(out)
    }

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        let level = flate2::Compression::default();
        let out = match self {
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), level);
                encoder.write_all(data)?;
                encoder.finish()?
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), level);
                encoder.write_all(data)?;
                encoder.finish()?
            }
            Compression::Other(id) => return Err(Error::UnknownCompression(id)),
        };
        Ok(out)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Gzip => f.write_str("gzip"),
            Compression::Zlib => f.write_str("zlib"),
            Compression::Other(id) => write!(f, "scheme {id}"),
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            other => Err(format!("unknown compression '{other}', expected gzip or zlib")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    timestamp: u32,
    compression: Compression,
    data: Vec<u8>,
}

impl Chunk {
    /// Wrap already-compressed bytes.
    pub fn new(compression: Compression, timestamp: u32, data: Vec<u8>) -> Self {
        Self { timestamp, compression, data }
    }

    /// Encode and compress `document` into a fresh chunk.
    pub fn from_document(
        document: &Compound,
        compression: Compression,
        timestamp: u32,
    ) -> Result<Self> {
        let mut chunk = Self::new(compression, timestamp, Vec::new());
        chunk.set_tree(document)?;
        Ok(chunk)
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Compressed payload, without the length and scheme prefix.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Value of the on-disk length field: scheme byte plus compressed bytes.
    pub fn payload_len(&self) -> usize {
        self.data.len() + 1
    }

    pub fn decode(&self) -> Result<Compound> {
        let raw = self.compression.decompress(&self.data)?;
        Ok(mctool_nbt::from_bytes(&raw)?)
    }

    /// Replace the payload with `document`, keeping the current scheme.
    /// The timestamp is left alone.
    pub fn set_tree(&mut self, document: &Compound) -> Result<()> {
        let raw = mctool_nbt::to_bytes(document)?;
        self.data = self.compression.compress(&raw)?;
        Ok(())
    }
}
