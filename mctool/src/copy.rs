//! Copy selected chunks from one world's region files into fresh files of the
//! same name under another directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use mctool_anvil::{CHUNK_WIDTH, Region, SelectionList, SelectionMap, World};

use crate::config::CopyConfig;

/// Copy every selected present chunk of `from` into `to`. Returns the count.
pub fn copy_chunks(from: &mut Region, to: &mut Region, selection: &SelectionMap) -> Result<usize> {
    let mut copied = 0;
    from.walk(selection, |from, index| -> Result<()> {
        if let Some(chunk) = from.get(index)? {
            to.put(index, chunk.clone())?;
            copied += 1;
        }
        Ok(())
    })?;
    Ok(copied)
}

fn prepare_dst(dst: &Path) -> Result<()> {
    if dst.exists() {
        if !dst.is_dir() {
            bail!("output path {} is not a directory", dst.display());
        }
        return Ok(());
    }
    fs::create_dir_all(dst).with_context(|| format!("creating {}", dst.display()))
}

pub fn run(config: &CopyConfig) -> Result<()> {
    let mut selection = SelectionList::new();
    selection.add(&config.area, CHUNK_WIDTH);
    prepare_dst(&config.dst)?;

    let world = World::new(&config.src);
    world.walk(&selection, |local, file_name| -> Result<()> {
        log::info!("{file_name}");
        let src = world.dir().join(file_name);
        let dst = config.dst.join(file_name);

        let mut from = Region::open(&src).with_context(|| format!("opening {}", src.display()))?;
        let mut to = Region::create(&dst).with_context(|| format!("creating {}", dst.display()))?;
        let copied = copy_chunks(&mut from, &mut to, &local.selection_map())
            .with_context(|| format!("copying from {}", src.display()))?;
        to.write().with_context(|| format!("writing {}", dst.display()))?;

        log::debug!("{file_name}: copied {copied} chunk(s)");
        Ok(())
    })?;
    Ok(())
}
