//! NBT (Named Binary Tag) codec for Minecraft save data.
//!
//! Decodes and encodes one uncompressed document at a time. A document is a
//! [`Compound`] holding a single root entry, conventionally named `""`.
//! Compression is handled by callers (see `mctool-anvil`).

mod decode;
mod display;
mod encode;
mod error;
mod path;
mod tag;

pub use decode::{MAX_DEPTH, from_bytes, from_reader};
pub use encode::{to_bytes, to_writer};
pub use error::{Error, Result};
pub use path::{PathError, PathSegment, format_path};
pub use tag::{Compound, List, Tag, TagKind};
