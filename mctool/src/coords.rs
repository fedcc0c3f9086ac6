//! Coordinate arguments given on the command line.

use anyhow::{Context, Result, bail};
use mctool_anvil::ChunkPos;

fn parse_pair(value: &str) -> Result<Option<(i32, i32)>> {
    let Some((x, z)) = value.split_once(',') else {
        return Ok(None);
    };
    let x = x.trim().parse().with_context(|| format!("bad x coordinate in '{value}'"))?;
    let z = z.trim().parse().with_context(|| format!("bad z coordinate in '{value}'"))?;
    Ok(Some((x, z)))
}

/// `x,z` in chunk units, or a bare slot index `0..1024` read as
/// `(index mod 32, index div 32)`.
pub fn parse_chunk(value: &str) -> Result<ChunkPos> {
    if let Some((x, z)) = parse_pair(value)? {
        return Ok(ChunkPos::new(x, z));
    }
    let index: usize = value
        .trim()
        .parse()
        .with_context(|| format!("expected 'x,z' or a slot index, got '{value}'"))?;
    if index >= mctool_anvil::SLOT_COUNT {
        bail!("slot index {index} is outside 0..1024");
    }
    Ok(ChunkPos::from_local_index(index))
}

/// `x,z` in block units, mapped to the chunk containing that block.
pub fn parse_block(value: &str) -> Result<ChunkPos> {
    match parse_pair(value)? {
        Some((x, z)) => Ok(ChunkPos::from_block(x, z)),
        None => bail!("expected block coordinate 'x,z', got '{value}'"),
    }
}
