//! Region (`.mca`) files: 1024 chunk slots behind an 8 KiB header.
//!
//! Payloads are loaded lazily. [`Region::write`] rewrites the whole file in
//! place, packing chunks from sector 2 in slot order.

mod header;

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub use header::{Header, Location};

use crate::{Chunk, ChunkPos, Compression, Error, RegionPos, Result, SLOT_COUNT, SelectionMap};

pub const SECTOR_BYTES: u64 = 4096; // minecraft uses 4096 bytes per sector
pub const HEADER_BYTES: u64 = 8192; // location table + timestamp table

/// The location table stores the sector count in one byte.
pub const MAX_CHUNK_SECTORS: usize = 255;

const FIRST_DATA_SECTOR: u32 = (HEADER_BYTES / SECTOR_BYTES) as u32;

/// Sectors needed for a payload whose length field is `payload_len`.
pub fn sectors_for(payload_len: usize) -> usize {
    (payload_len + 4).div_ceil(SECTOR_BYTES as usize)
}

#[derive(Debug)]
enum Slot {
    Unloaded,
    Absent,
    Present(Chunk),
}

/// A present slot as recorded in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    pub index: usize,
    pub pos: ChunkPos,
    pub timestamp: u32,
    pub sectors: u8,
}

#[derive(Debug)]
pub struct Region {
    path: PathBuf,
    file: File,
    file_len: u64,
    position: RegionPos,
    header: Header,
    slots: Vec<Slot>,
}

impl Region {
    /// Open an existing region file and read its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let position = RegionPos::from_path(path)?;
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let file_len = file.metadata()?.len();

        let mut bytes = Vec::with_capacity(HEADER_BYTES as usize);
        (&file).take(HEADER_BYTES).read_to_end(&mut bytes)?;
        let header = Header::parse(&bytes);

        let slots = (0..SLOT_COUNT)
            .map(|index| match header.location(index).is_present() {
                true => Slot::Unloaded,
                false => Slot::Absent,
            })
            .collect();

        log::debug!("Opened region {} ({} bytes)", path.display(), file_len);
        Ok(Self { path: path.to_path_buf(), file, file_len, position, header, slots })
    }

    /// Create (or truncate) a region file holding only an empty header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let position = RegionPos::from_path(path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(HEADER_BYTES)?;

        log::debug!("Created region {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            file_len: HEADER_BYTES,
            position,
            header: Header::default(),
            slots: (0..SLOT_COUNT).map(|_| Slot::Absent).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn position(&self) -> RegionPos {
        self.position
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    fn check_index(index: usize) -> Result<()> {
        match index < SLOT_COUNT {
            true => Ok(()),
            false => Err(Error::SlotOutOfRange(index)),
        }
    }

    fn read_chunk(&mut self, index: usize) -> Result<Option<Chunk>> {
        let location = self.header.location(index);
        if !location.is_present() {
            return Ok(None);
        }
        let offset = location.offset();
        if offset + 5 > self.file_len {
            return Err(Error::CorruptChunk { index });
        }

        self.file.seek(SeekFrom::Start(offset))?;
        let payload_len = self.file.read_u32::<BigEndian>()? as u64;
        if payload_len == 0 || offset + 4 + payload_len > self.file_len {
            return Err(Error::CorruptChunk { index });
        }
        let compression = Compression::from_id(self.file.read_u8()?);
        let mut data = vec![0u8; (payload_len - 1) as usize];
        self.file.read_exact(&mut data)?;

        log::trace!("Loaded chunk {} ({} bytes, {})", index, data.len(), compression);
        Ok(Some(Chunk::new(compression, self.header.timestamp(index), data)))
    }

    fn load(&mut self, index: usize) -> Result<()> {
        Self::check_index(index)?;
        if matches!(self.slots[index], Slot::Unloaded) {
            self.slots[index] = match self.read_chunk(index)? {
                Some(chunk) => Slot::Present(chunk),
                None => Slot::Absent,
            };
        }
        Ok(())
    }

    /// Chunk in slot `index`, or `None` if the slot is empty.
    pub fn get(&mut self, index: usize) -> Result<Option<&Chunk>> {
        self.load(index)?;
        Ok(match &self.slots[index] {
            Slot::Present(chunk) => Some(chunk),
            _ => None,
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut Chunk>> {
        self.load(index)?;
        Ok(match &mut self.slots[index] {
            Slot::Present(chunk) => Some(chunk),
            _ => None,
        })
    }

    /// Insert or replace the chunk in slot `index`. Takes effect on [`write`](Self::write).
    pub fn put(&mut self, index: usize, chunk: Chunk) -> Result<()> {
        Self::check_index(index)?;
        self.slots[index] = Slot::Present(chunk);
        Ok(())
    }

    /// Rewrite the whole file: header, then every present chunk packed from
    /// sector 2 in slot order, then truncate to the last used sector.
    pub fn write(&mut self) -> Result<()> {
        for index in 0..SLOT_COUNT {
            self.load(index)?;
        }

        let mut header = Header::default();
        let mut next_sector = FIRST_DATA_SECTOR;
        for (index, slot) in self.slots.iter().enumerate() {
            let Slot::Present(chunk) = slot else {
                continue;
            };
            let sectors = sectors_for(chunk.payload_len());
            if sectors > MAX_CHUNK_SECTORS {
                return Err(Error::ChunkTooLarge { index, sectors });
            }
            let location = Location { sector: next_sector, count: sectors as u8 };
            header.set(index, location, chunk.timestamp());
            next_sector += sectors as u32;
        }

        self.file.seek(SeekFrom::Start(0))?;
        let mut out = BufWriter::new(&self.file);
        out.write_all(&header.encode())?;
        for (index, slot) in self.slots.iter().enumerate() {
            let Slot::Present(chunk) = slot else {
                continue;
            };
            out.write_u32::<BigEndian>(chunk.payload_len() as u32)?;
            out.write_u8(chunk.compression().id())?;
            out.write_all(chunk.data())?;

            let used = chunk.payload_len() as u64 + 4;
            let padding = header.location(index).count as u64 * SECTOR_BYTES - used;
            io::copy(&mut io::repeat(0).take(padding), &mut out)?;
        }
        out.flush()?;
        drop(out);

        let file_len = next_sector as u64 * SECTOR_BYTES;
        self.file.set_len(file_len)?;
        self.file_len = file_len;
        self.header = header;

        log::debug!("Wrote region {} ({} sectors)", self.path.display(), next_sector);
        Ok(())
    }

    /// Every slot the file header marks present, in slot order.
    pub fn present_slots(&self) -> Vec<SlotInfo> {
        (0..SLOT_COUNT)
            .filter(|&index| self.header.location(index).is_present())
            .map(|index| SlotInfo {
                index,
                pos: self.position.chunk_at(index),
                timestamp: self.header.timestamp(index),
                sectors: self.header.location(index).count,
            })
            .collect()
    }

    /// Call `visit` for every slot `selection` includes, in slot order.
    /// Returns the last visitor result, or `None` if nothing was visited.
    pub fn walk<T, E, F>(
        &mut self,
        selection: &SelectionMap,
        mut visit: F,
    ) -> std::result::Result<Option<T>, E>
    where
        F: FnMut(&mut Region, usize) -> std::result::Result<T, E>,
    {
        let mut last = None;
        for index in selection.included() {
            last = Some(visit(self, index)?);
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Area, AreaKind, Range, SelectionList};
    use tempfile::TempDir;

    fn region_path(dir: &TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    fn chunk(byte: u8, len: usize, timestamp: u32) -> Chunk {
        Chunk::new(Compression::Zlib, timestamp, vec![byte; len])
    }

    #[test]
    fn test_sector_math() {
        assert_eq!(sectors_for(1), 1);
        assert_eq!(sectors_for(4092), 1);
        assert_eq!(sectors_for(4093), 2);
        assert_eq!(sectors_for(255 * 4096 - 4), 255);
        assert_eq!(sectors_for(255 * 4096 - 3), 256);
    }

    #[test]
    fn test_create_empty() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.0.0.mca");
        let mut region = Region::create(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8192);
        assert!(region.get(0).unwrap().is_none());

        region.write().unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 8192);
        assert!(bytes.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.-1.2.mca");
        let chunks = [
            (0, Chunk::new(Compression::Gzip, 17, vec![1, 2, 3])),
            (5, chunk(0xaa, 5000, 1_700_000_000)),
            (1023, Chunk::new(Compression::Other(4), u32::MAX, vec![9; 10])),
        ];

        let mut region = Region::create(&path).unwrap();
        for (index, chunk) in &chunks {
            region.put(*index, chunk.clone()).unwrap();
        }
        region.write().unwrap();
        drop(region);

        let mut region = Region::open(&path).unwrap();
        assert_eq!(region.position(), RegionPos::new(-1, 2));
        for (index, expected) in &chunks {
            assert_eq!(region.get(*index).unwrap(), Some(expected));
        }
        for index in [1, 4, 6, 1022] {
            assert!(region.get(index).unwrap().is_none());
        }
    }

    #[test]
    fn test_layout_is_sequential() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.0.0.mca");
        let mut region = Region::create(&path).unwrap();
        region.put(40, chunk(1, 10, 3)).unwrap();
        region.put(2, chunk(2, 5000, 4)).unwrap();
        region.write().unwrap();

        // Slot 2 first (2 sectors from sector 2), then slot 40 at sector 4.
        let header = region.header();
        assert_eq!(header.location(2), Location { sector: 2, count: 2 });
        assert_eq!(header.location(40), Location { sector: 4, count: 1 });
        assert_eq!(header.timestamp(40), 3);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 5 * 4096);
        assert_eq!(&bytes[8..12], &[0, 0, 2, 2]);
        assert_eq!(&bytes[8192..8197], &[0, 0, 0x13, 0x89, 2]);
        assert_eq!(&bytes[16384..16389], &[0, 0, 0, 11, 2]);
        // Padding after the last payload is zeroed.
        assert!(bytes[16384 + 15..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_untouched_chunks_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.3.3.mca");
        let mut region = Region::create(&path).unwrap();
        region.put(0, chunk(1, 6000, 10)).unwrap();
        region.put(1, chunk(2, 6000, 11)).unwrap();
        region.put(2, chunk(3, 100, 12)).unwrap();
        region.write().unwrap();
        drop(region);

        // Shrinking slot 0 moves the unread slots 1 and 2 down.
        let mut region = Region::open(&path).unwrap();
        region.put(0, chunk(7, 10, 20)).unwrap();
        region.write().unwrap();
        drop(region);

        let mut region = Region::open(&path).unwrap();
        assert_eq!(region.get(0).unwrap(), Some(&chunk(7, 10, 20)));
        assert_eq!(region.get(1).unwrap(), Some(&chunk(2, 6000, 11)));
        assert_eq!(region.get(2).unwrap(), Some(&chunk(3, 100, 12)));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 6 * 4096);
    }

    #[test]
    fn test_edit_in_place() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.0.0.mca");
        let mut region = Region::create(&path).unwrap();
        region.put(9, chunk(1, 10, 5)).unwrap();
        region.write().unwrap();

        region.get_mut(9).unwrap().unwrap().set_timestamp(6);
        region.write().unwrap();
        drop(region);

        let mut region = Region::open(&path).unwrap();
        assert_eq!(region.get(9).unwrap().map(Chunk::timestamp), Some(6));
    }

    #[test]
    fn test_chunk_too_large() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.0.0.mca");
        let mut region = Region::create(&path).unwrap();
        region.put(0, chunk(1, 10, 0)).unwrap();
        region.put(7, chunk(0, 255 * 4096, 0)).unwrap();

        let err = region.write().unwrap_err();
        assert!(matches!(err, Error::ChunkTooLarge { index: 7, sectors: 256 }));
        // Nothing was written.
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8192);
    }

    #[test]
    fn test_slot_out_of_range() {
        let dir = TempDir::new().unwrap();
        let mut region = Region::create(region_path(&dir, "r.0.0.mca")).unwrap();
        assert!(matches!(region.get(1024), Err(Error::SlotOutOfRange(1024))));
        assert!(matches!(region.put(5000, chunk(0, 1, 0)), Err(Error::SlotOutOfRange(5000))));
    }

    #[test]
    fn test_truncated_payload() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.0.0.mca");
        let mut header = Header::default();
        header.set(3, Location { sector: 2, count: 1 }, 0);
        let mut bytes = header.encode();
        bytes.extend_from_slice(&[0, 0, 0x10, 0, 2, 1, 2]);
        std::fs::write(&path, bytes).unwrap();

        let mut region = Region::open(&path).unwrap();
        assert!(matches!(region.get(3), Err(Error::CorruptChunk { index: 3 })));
    }

    #[test]
    fn test_bad_file_name() {
        let dir = TempDir::new().unwrap();
        let result = Region::create(region_path(&dir, "level.dat"));
        assert!(matches!(result, Err(Error::InvalidFileName(_))));
    }

    #[test]
    fn test_present_slots() {
        let dir = TempDir::new().unwrap();
        let path = region_path(&dir, "r.-1.0.mca");
        let mut region = Region::create(&path).unwrap();
        region.put(33, chunk(1, 5000, 77)).unwrap();
        region.put(1, chunk(1, 10, 78)).unwrap();
        region.write().unwrap();

        let slots = region.present_slots();
        assert_eq!(
            slots,
            vec![
                SlotInfo { index: 1, pos: ChunkPos::new(-31, 0), timestamp: 78, sectors: 1 },
                SlotInfo { index: 33, pos: ChunkPos::new(-31, 1), timestamp: 77, sectors: 2 },
            ]
        );
    }

    #[test]
    fn test_walk_visits_included_slots() {
        let dir = TempDir::new().unwrap();
        let mut region = Region::create(region_path(&dir, "r.0.0.mca")).unwrap();
        let mut list = SelectionList::new();
        list.push(Area {
            kind: AreaKind::Include,
            x: Some(Range::new(0, 2)),
            z: Some(Range::new(1, 1)),
        });
        list.push(Area {
            kind: AreaKind::Exclude,
            x: Some(Range::new(1, 1)),
            z: Some(Range::new(1, 1)),
        });

        let mut seen = Vec::new();
        let last = region
            .walk(&list.selection_map(), |region, index| {
                seen.push(index);
                region.put(index, chunk(index as u8, 1, 0))?;
                Ok::<_, Error>(index * 10)
            })
            .unwrap();
        assert_eq!(seen, vec![32, 34]);
        assert_eq!(last, Some(340));
        assert!(region.get(33).unwrap().is_none());

        let nothing = region
            .walk(&SelectionMap::default(), |_, index| Ok::<_, Error>(index))
            .unwrap();
        assert_eq!(nothing, None);
    }
}
