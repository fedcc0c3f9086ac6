use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed tag stream: {0}")]
    Nbt(#[from] mctool_nbt::Error),

    #[error("chunk slot {0} is outside 0..1024")]
    SlotOutOfRange(usize),

    #[error("unsupported compression scheme: {0}")]
    UnknownCompression(u8),

    #[error("chunk payload failed to decompress: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("chunk in slot {index} needs {sectors} sectors, at most 255 fit")]
    ChunkTooLarge { index: usize, sectors: usize },

    #[error("slot {index} points at a payload that is truncated or empty")]
    CorruptChunk { index: usize },

    #[error("not a region file name: {0}")]
    InvalidFileName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
