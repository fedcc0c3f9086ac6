//! Anvil (`.mca`) region files and the world directories that hold them.
//!
//! - [`Chunk`]: one compressed tag document plus its timestamp.
//! - [`Region`]: a 32x32 grid of chunk slots backed by one file.
//! - [`World`]: a directory of region files.
//! - [`SelectionList`]: include/exclude areas used to pick chunks.

mod chunk;
mod coords;
mod error;
pub mod region;
mod selection;
mod world;

pub use chunk::{Chunk, Compression};
pub use coords::{CHUNK_WIDTH, ChunkPos, REGION_WIDTH, RegionPos, SLOT_COUNT, local_index};
pub use error::{Error, Result};
pub use region::{Region, SlotInfo};
pub use selection::{Area, AreaKind, Bounds, Range, RawArea, SelectionList, SelectionMap};
pub use world::World;
