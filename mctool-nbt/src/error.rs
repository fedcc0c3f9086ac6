use thiserror::Error;

use crate::TagKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected end of tag stream")]
    UnexpectedEof,

    #[error("unknown tag kind id: {0}")]
    UnknownKind(u8),

    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    #[error("list of End tags declares {0} elements")]
    NonEmptyEndList(usize),

    #[error("string payload is not valid UTF-8")]
    InvalidString,

    #[error("string of {0} bytes does not fit a 16-bit length prefix")]
    StringTooLong(usize),

    #[error("sequence of {0} elements does not fit a 32-bit length prefix")]
    LengthOverflow(usize),

    #[error("nesting deeper than {0} levels")]
    DepthLimit(usize),

    #[error("list declared as {expected:?} holds a {found:?} element")]
    ListKindMismatch { expected: TagKind, found: TagKind },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
