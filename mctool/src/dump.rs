//! `nbt` and `list`: read-only views of worlds, region files and NBT files.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone};
use mctool_anvil::region::SECTOR_BYTES;
use mctool_anvil::{ChunkPos, Compression, Region, SlotInfo, World};
use mctool_nbt::Compound;

/// Decode a standalone compressed NBT file such as `level.dat`.
pub fn read_nbt_file(path: &Path, compression: Compression) -> Result<Compound> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let raw = compression
        .decompress(&bytes)
        .with_context(|| format!("decompressing {} as {compression}", path.display()))?;
    mctool_nbt::from_bytes(&raw).with_context(|| format!("decoding {}", path.display()))
}

/// Decode the chunk at `pos` from a single region file. Only the slot index
/// of `pos` matters.
pub fn read_region_chunk(path: &Path, pos: ChunkPos) -> Result<Compound> {
    let mut region = Region::open(path).with_context(|| format!("opening {}", path.display()))?;
    let index = pos.local_index();
    let chunk = region
        .get(index)
        .with_context(|| format!("reading slot {index} of {}", path.display()))?
        .ok_or_else(|| anyhow!("slot {index} of {} is empty", path.display()))?;
    chunk
        .decode()
        .with_context(|| format!("decoding slot {index} of {}", path.display()))
}

/// Decode the chunk at absolute chunk coordinate `pos` from a world directory.
pub fn read_world_chunk(dir: &Path, pos: ChunkPos) -> Result<Compound> {
    let world = World::new(dir);
    let chunk = world
        .get(pos)
        .with_context(|| format!("looking up chunk ({}, {}) in {}", pos.x, pos.z, dir.display()))?
        .ok_or_else(|| {
            anyhow!("chunk ({}, {}) does not exist in {}", pos.x, pos.z, dir.display())
        })?;
    chunk
        .decode()
        .with_context(|| format!("decoding chunk ({}, {})", pos.x, pos.z))
}

/// Text printed by `nbt`: the value of the unnamed root entry, without the
/// wrapping document compound.
pub fn render_document(document: &Compound) -> String {
    match document.iter().next() {
        Some((_, root)) => root.to_string(),
        None => Compound::new().to_string(),
    }
}

/// `index (x,z) => YYYY-MM-DD HH:MM:SS, <size> KB`
pub fn format_slot<Tz: TimeZone>(slot: &SlotInfo, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let saved = DateTime::from_timestamp(slot.timestamp as i64, 0)
        .map(|t| t.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    format!(
        "{} ({},{}) => {}, {} KB",
        slot.index,
        slot.pos.x,
        slot.pos.z,
        saved,
        slot.sectors as u64 * SECTOR_BYTES / 1024
    )
}

pub fn list_region<W: Write, Tz: TimeZone>(path: &Path, out: &mut W, tz: &Tz) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let region = Region::open(path).with_context(|| format!("opening {}", path.display()))?;
    for slot in region.present_slots() {
        writeln!(out, "{}", format_slot(&slot, tz))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mctool_anvil::Chunk;
    use mctool_nbt::Tag;
    use tempfile::TempDir;

    fn document(x: i32) -> Compound {
        let level: Compound = [("xPos", Tag::Int(x))].into_iter().collect();
        [("", Tag::from([("Level", Tag::from(level))].into_iter().collect::<Compound>()))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_format_slot() {
        let slot = SlotInfo {
            index: 33,
            pos: ChunkPos::new(-31, 1),
            timestamp: 1_600_000_000,
            sectors: 2,
        };
        assert_eq!(format_slot(&slot, &Utc), "33 (-31,1) => 2020-09-13 12:26:40, 8 KB");
    }

    #[test]
    fn test_list_region() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.0.-1.mca");
        let mut region = Region::create(&path).unwrap();
        region.put(1023, Chunk::new(Compression::Zlib, 0, vec![0; 5000])).unwrap();
        region.put(0, Chunk::new(Compression::Zlib, 86_400, vec![0; 8])).unwrap();
        region.write().unwrap();

        let mut out = Vec::new();
        list_region(&path, &mut out, &Utc).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0 (0,-32) => 1970-01-02 00:00:00, 4 KB\n\
             1023 (31,-1) => 1970-01-01 00:00:00, 8 KB\n"
        );
    }

    #[test]
    fn test_read_chunks() {
        let dir = TempDir::new().unwrap();
        let mut region = Region::create(dir.path().join("r.-1.0.mca")).unwrap();
        let index = ChunkPos::new(-3, 2).local_index();
        let chunk = Chunk::from_document(&document(-3), Compression::Gzip, 0).unwrap();
        region.put(index, chunk).unwrap();
        region.write().unwrap();

        assert_eq!(read_world_chunk(dir.path(), ChunkPos::new(-3, 2)).unwrap(), document(-3));
        assert!(read_world_chunk(dir.path(), ChunkPos::new(-4, 2)).is_err());
        assert!(read_world_chunk(dir.path(), ChunkPos::new(40, 2)).is_err());

        let path = dir.path().join("r.-1.0.mca");
        assert_eq!(read_region_chunk(&path, ChunkPos::new(29, 2)).unwrap(), document(-3));
    }

    #[test]
    fn test_render_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.0.0.mca");
        let mut region = Region::create(&path).unwrap();
        let chunk = Chunk::from_document(&document(7), Compression::Zlib, 0).unwrap();
        region.put(0, chunk).unwrap();
        region.write().unwrap();

        let decoded = read_region_chunk(&path, ChunkPos::new(0, 0)).unwrap();
        let expected = "{\n\
            \x20   \"Level\" : {\n\
            \x20       \"xPos\" : \"7 i\"\n\
            \x20   }\n\
            }";
        assert_eq!(render_document(&decoded), expected);
        assert_eq!(render_document(&Compound::new()), "{\n}");
    }

    #[test]
    fn test_read_nbt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.dat");
        let raw = mctool_nbt::to_bytes(&document(5)).unwrap();
        fs::write(&path, Compression::Gzip.compress(&raw).unwrap()).unwrap();

        assert_eq!(read_nbt_file(&path, Compression::Gzip).unwrap(), document(5));
        assert!(read_nbt_file(&path, Compression::Zlib).is_err());
    }
}
