//! Region file header.
//!
//! The header consists of two tables:
//! - Location table: where each chunk is stored
//! - Timestamp table: when each chunk was last saved

use byteorder::{BigEndian, ByteOrder};

use super::{HEADER_BYTES, SECTOR_BYTES};
use crate::SLOT_COUNT;

/// One location table entry: 3 bytes sector offset + 1 byte sector count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub sector: u32,
    pub count: u8,
}

impl Location {
    /// Sector 0 is the header itself, so it marks an empty slot.
    pub fn is_present(self) -> bool {
        self.sector != 0
    }

    /// Byte offset of the payload in the file.
    pub fn offset(self) -> u64 {
        self.sector as u64 * SECTOR_BYTES
    }
}

/// Parsed location and timestamp tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    locations: Vec<Location>,
    timestamps: Vec<u32>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            locations: vec![Location::default(); SLOT_COUNT],
            timestamps: vec![0; SLOT_COUNT],
        }
    }
}

impl Header {
    /// Parse both tables. Missing trailing bytes read as zero.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut buf = [0u8; HEADER_BYTES as usize];
        let len = bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);

        let (location_table, timestamp_table) = buf.split_at(SECTOR_BYTES as usize);
        let locations = location_table
            .chunks_exact(4)
            .map(|entry| Location {
                sector: BigEndian::read_u24(&entry[..3]),
                count: entry[3],
            })
            .collect();
        let timestamps = timestamp_table.chunks_exact(4).map(BigEndian::read_u32).collect();

        Self { locations, timestamps }
    }

    /// Serialize both tables (8192 bytes).
    pub fn encode(&self) -> Vec<u8> {
        let mut header = vec![0u8; HEADER_BYTES as usize];
        let (location_table, timestamp_table) = header.split_at_mut(SECTOR_BYTES as usize);

        for (entry, location) in location_table.chunks_exact_mut(4).zip(&self.locations) {
            BigEndian::write_u24(&mut entry[..3], location.sector);
            entry[3] = location.count;
        }
        for (entry, timestamp) in timestamp_table.chunks_exact_mut(4).zip(&self.timestamps) {
            BigEndian::write_u32(entry, *timestamp);
        }

        header
    }

    pub fn location(&self, index: usize) -> Location {
        self.locations[index]
    }

    pub fn timestamp(&self, index: usize) -> u32 {
        self.timestamps[index]
    }

    pub fn set(&mut self, index: usize, location: Location, timestamp: u32) {
        self.locations[index] = location;
        self.timestamps[index] = timestamp;
    }

    pub fn clear(&mut self, index: usize) {
        self.set(index, Location::default(), 0);
    }
}
