//! Block, chunk and region coordinate spaces.
//!
//! One chunk is 16x16 blocks, one region is 32x32 chunks. All conversions use
//! floor division so negative coordinates land in the right cell.

use std::path::Path;

use crate::{Bounds, Error, Range, Result};

/// Blocks per chunk edge.
pub const CHUNK_WIDTH: i32 = 16;
/// Chunks per region edge.
pub const REGION_WIDTH: i32 = 32;
/// Chunk slots in one region file.
pub const SLOT_COUNT: usize = (REGION_WIDTH * REGION_WIDTH) as usize;

/// Slot index of a chunk inside its region: `x mod 32 + (z mod 32) * 32`.
#[inline]
pub fn local_index(x: i32, z: i32) -> usize {
    (x.rem_euclid(REGION_WIDTH) + z.rem_euclid(REGION_WIDTH) * REGION_WIDTH) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing block `(x, z)`.
    pub fn from_block(x: i32, z: i32) -> Self {
        Self::new(x.div_euclid(CHUNK_WIDTH), z.div_euclid(CHUNK_WIDTH))
    }

    /// Local coordinate of slot `index`: `(index mod 32, index div 32)`.
    pub fn from_local_index(index: usize) -> Self {
        let index = index as i32;
        Self::new(index.rem_euclid(REGION_WIDTH), index.div_euclid(REGION_WIDTH))
    }

    pub fn region(self) -> RegionPos {
        RegionPos::new(self.x.div_euclid(REGION_WIDTH), self.z.div_euclid(REGION_WIDTH))
    }

    pub fn local_index(self) -> usize {
        local_index(self.x, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    // Keeps `x * 32 + 31` inside i32.
    const LIMIT: i32 = i32::MAX / REGION_WIDTH - 1;

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// `r.<x>.<z>.<ext>`
    pub fn file_name(self, extension: &str) -> String {
        format!("r.{}.{}.{}", self.x, self.z, extension)
    }

    /// Parse `r.<x>.<z>.<ext>`; anything else is `None`.
    pub fn from_file_name(name: &str, extension: &str) -> Option<Self> {
        let mut parts = name.split('.');
        let (Some("r"), Some(x), Some(z), Some(ext), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        if ext != extension {
            return None;
        }
        let x: i32 = x.parse().ok()?;
        let z: i32 = z.parse().ok()?;
        if x.unsigned_abs() > Self::LIMIT as u32 || z.unsigned_abs() > Self::LIMIT as u32 {
            return None;
        }
        Some(Self::new(x, z))
    }

    /// Region position from a path's file name, whatever its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let invalid = || Error::InvalidFileName(path.display().to_string());
        let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let extension = name.rsplit('.').next().unwrap_or_default();
        Self::from_file_name(name, extension).ok_or_else(invalid)
    }

    /// First chunk (lowest x and z) covered by this region.
    pub fn base_chunk(self) -> ChunkPos {
        ChunkPos::new(self.x * REGION_WIDTH, self.z * REGION_WIDTH)
    }

    /// Absolute chunk coordinate of slot `index`.
    pub fn chunk_at(self, index: usize) -> ChunkPos {
        let base = self.base_chunk();
        let local = ChunkPos::from_local_index(index);
        ChunkPos::new(base.x + local.x, base.z + local.z)
    }

    /// Inclusive chunk ranges covered by this region.
    pub fn chunk_bounds(self) -> Bounds {
        let base = self.base_chunk();
        Bounds {
            x: Range::new(base.x, base.x + REGION_WIDTH - 1),
            z: Range::new(base.z, base.z + REGION_WIDTH - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_index_corners() {
        assert_eq!(local_index(0, 0), 0);
        assert_eq!(local_index(31, 0), 31);
        assert_eq!(local_index(0, 1), 32);
        assert_eq!(local_index(31, 31), 1023);
        assert_eq!(local_index(-1, -1), 1023);
        assert_eq!(local_index(-32, -32), 0);
    }

    #[test]
    fn test_local_index_is_periodic() {
        for x in -70..70 {
            for z in [-1000, -33, -1, 0, 5, 31, 32, 999] {
                let index = local_index(x, z);
                assert!(index < SLOT_COUNT);
                assert_eq!(index, local_index(x + 32, z + 32));
            }
        }
    }

    #[test]
    fn test_negative_block_to_slot() {
        // Block (-1, -1) lives in chunk (-1, -1), region (-1, -1), slot 1023.
        let chunk = ChunkPos::from_block(-1, -1);
        assert_eq!(chunk, ChunkPos::new(-1, -1));
        assert_eq!(chunk.region(), RegionPos::new(-1, -1));
        assert_eq!(chunk.local_index(), 31 + 31 * 32);

        assert_eq!(ChunkPos::from_block(-16, 15), ChunkPos::new(-1, 0));
        assert_eq!(ChunkPos::from_block(-17, 16), ChunkPos::new(-2, 1));
    }

    #[test]
    fn test_region_bounds() {
        let bounds = RegionPos::new(-1, -1).chunk_bounds();
        assert_eq!(bounds.x, Range::new(-32, -1));
        assert_eq!(bounds.z, Range::new(-32, -1));

        let bounds = RegionPos::new(2, 0).chunk_bounds();
        assert_eq!(bounds.x, Range::new(64, 95));
        assert_eq!(bounds.z, Range::new(0, 31));
    }

    #[test]
    fn test_slot_round_trip() {
        let region = RegionPos::new(-2, 3);
        for index in 0..SLOT_COUNT {
            let chunk = region.chunk_at(index);
            assert_eq!(chunk.region(), region);
            assert_eq!(chunk.local_index(), index);
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(RegionPos::new(-1, 4).file_name("mca"), "r.-1.4.mca");
        assert_eq!(RegionPos::from_file_name("r.-1.4.mca", "mca"), Some(RegionPos::new(-1, 4)));
        assert_eq!(RegionPos::from_file_name("r.-1.4.mcr", "mca"), None);
        assert_eq!(RegionPos::from_file_name("r.1.mca", "mca"), None);
        assert_eq!(RegionPos::from_file_name("r.a.b.mca", "mca"), None);
        assert_eq!(RegionPos::from_file_name("x.1.2.mca", "mca"), None);
        assert_eq!(RegionPos::from_file_name("r.1.2.mca.bak", "mca"), None);
        assert_eq!(RegionPos::from_file_name("r.99999999.0.mca", "mca"), None);
    }

    #[test]
    fn test_from_path() {
        let pos = RegionPos::from_path(Path::new("/tmp/world/region/r.3.-7.mca")).unwrap();
        assert_eq!(pos, RegionPos::new(3, -7));
        assert!(matches!(
            RegionPos::from_path(Path::new("/tmp/level.dat")),
            Err(Error::InvalidFileName(_))
        ));
    }
}
