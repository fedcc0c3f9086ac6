//! Worlds: a directory of region files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Chunk, ChunkPos, Error, REGION_WIDTH, Region, RegionPos, Result, SelectionList};

/// A directory of region files.
///
/// Nothing is cached: every lookup opens its region file again.
#[derive(Debug, Clone)]
pub struct World {
    dir: PathBuf,
    extension: String,
}

impl World {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extension(dir, "mca")
    }

    pub fn with_extension(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self { dir: dir.into(), extension: extension.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn region_path(&self, region: RegionPos) -> PathBuf {
        self.dir.join(region.file_name(&self.extension))
    }

    /// Chunk at absolute chunk coordinate `pos`, or `None` if its region file
    /// or slot is empty.
    pub fn get(&self, pos: ChunkPos) -> Result<Option<Chunk>> {
        let path = self.region_path(pos.region());
        if !path.is_file() {
            return Ok(None);
        }
        let mut region = Region::open(&path)?;
        Ok(region.get(pos.local_index())?.cloned())
    }

    /// Visit every region file whose coverage overlaps `selection`.
    ///
    /// The visitor gets the surviving areas rebased into region-local
    /// coordinates, and the file name. Order follows the directory listing.
    pub fn walk<T, E, F>(
        &self,
        selection: &SelectionList,
        mut visit: F,
    ) -> std::result::Result<Option<T>, E>
    where
        E: From<Error>,
        F: FnMut(SelectionList, &str) -> std::result::Result<T, E>,
    {
        let mut last = None;
        for entry in fs::read_dir(&self.dir).map_err(Error::from)? {
            let entry = entry.map_err(Error::from)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                log::warn!("Skipping non UTF-8 entry {:?}", entry.path());
                continue;
            };
            let Some(region) = RegionPos::from_file_name(name, &self.extension) else {
                log::debug!("Skipping {name}: not a region file");
                continue;
            };
            let Some(mut local) = selection.matching(&region.chunk_bounds()) else {
                continue;
            };
            local.transform(REGION_WIDTH);

            log::debug!("Matched {name} with {} area(s)", local.areas().len());
            last = Some(visit(local, name)?);
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Area, AreaKind, Compression, Range};
    use tempfile::TempDir;

    fn write_region(dir: &Path, name: &str, slots: &[(usize, u8)]) {
        let mut region = Region::create(dir.join(name)).unwrap();
        for (index, byte) in slots {
            region.put(*index, Chunk::new(Compression::Zlib, 1, vec![*byte; 4])).unwrap();
        }
        region.write().unwrap();
    }

    fn include(x: (i32, i32), z: (i32, i32)) -> Area {
        Area {
            kind: AreaKind::Include,
            x: Some(Range::new(x.0, x.1)),
            z: Some(Range::new(z.0, z.1)),
        }
    }

    #[test]
    fn test_get_negative_chunk() {
        let dir = TempDir::new().unwrap();
        write_region(dir.path(), "r.-1.-1.mca", &[(1023, 7)]);
        let world = World::new(dir.path());

        let chunk = world.get(ChunkPos::new(-1, -1)).unwrap().unwrap();
        assert_eq!(chunk.data(), &[7; 4]);
        assert!(world.get(ChunkPos::new(-2, -1)).unwrap().is_none());
        // No r.0.0.mca on disk.
        assert!(world.get(ChunkPos::new(0, 0)).unwrap().is_none());
    }

    #[test]
    fn test_region_path() {
        let world = World::with_extension("/srv/world/region", "mcr");
        assert_eq!(
            world.region_path(RegionPos::new(2, -3)),
            PathBuf::from("/srv/world/region/r.2.-3.mcr")
        );
    }

    #[test]
    fn test_walk_matches_and_rebases() {
        let dir = TempDir::new().unwrap();
        for name in ["r.0.0.mca", "r.-1.0.mca", "r.5.5.mca"] {
            write_region(dir.path(), name, &[]);
        }
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("r.0.0.mca.bak"), b"x").unwrap();
        let world = World::new(dir.path());

        let mut selection = SelectionList::new();
        selection.push(include((-2, 1), (3, 3)));

        let mut visited = Vec::new();
        let last = world
            .walk(&selection, |local, name| {
                visited.push((name.to_string(), local.areas()[0]));
                Ok::<_, Error>(name.len())
            })
            .unwrap();
        visited.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            visited,
            vec![
                ("r.-1.0.mca".to_string(), include((30, 31), (3, 3))),
                ("r.0.0.mca".to_string(), include((0, 1), (3, 3))),
            ]
        );
        assert!(last.is_some());
    }

    #[test]
    fn test_walk_without_matches() {
        let dir = TempDir::new().unwrap();
        write_region(dir.path(), "r.0.0.mca", &[]);
        let world = World::new(dir.path());

        let mut selection = SelectionList::new();
        selection.push(include((100, 120), (0, 0)));
        let result = world
            .walk(&selection, |_, _| -> std::result::Result<(), Error> {
                panic!("nothing should match")
            })
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_walk_missing_dir() {
        let dir = TempDir::new().unwrap();
        let world = World::new(dir.path().join("missing"));
        let result = world.walk(&SelectionList::new(), |_, _| Ok::<_, Error>(()));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
