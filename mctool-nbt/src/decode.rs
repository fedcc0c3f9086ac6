//! Tag stream decoding.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::{Compound, Error, List, Result, Tag, TagKind};

/// Maximum nesting of compounds and lists accepted from a stream.
pub const MAX_DEPTH: usize = 512;

/// Decode one document from an uncompressed buffer.
///
/// The returned compound holds the single root entry (usually named `""`).
/// A stream that starts with an End byte yields an empty document. Bytes after
/// the root tag are ignored.
pub fn from_bytes(bytes: &[u8]) -> Result<Compound> {
    let mut decoder = Decoder { input: bytes, depth: 0 };
    let mut document = Compound::new();

    let kind = decoder.read_kind()?;
    if kind == TagKind::End {
        return Ok(document);
    }
    let name = decoder.read_string()?;
    let value = decoder.read_payload(kind)?;
    document.insert(name, value);

    Ok(document)
}

/// Read `reader` to the end and decode it.
pub fn from_reader<R: Read>(mut reader: R) -> Result<Compound> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    from_bytes(&buf)
}

struct Decoder<'a> {
    input: &'a [u8],
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.input.len() < n {
            return Err(Error::UnexpectedEof);
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    fn read_kind(&mut self) -> Result<TagKind> {
        let id = self.read_u8()?;
        TagKind::from_id(id).ok_or(Error::UnknownKind(id))
    }

    fn read_length(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| Error::NegativeLength(len))
    }

    /// Element count of a fixed-width array, checked against what is left.
    fn read_array_length(&mut self, width: usize) -> Result<usize> {
        let len = self.read_length()?;
        match len.checked_mul(width) {
            Some(bytes) if bytes <= self.input.len() => Ok(len),
            _ => Err(Error::UnexpectedEof),
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let len = BigEndian::read_u16(self.take(2)?) as usize;
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidString)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::DepthLimit(MAX_DEPTH));
        }
        Ok(())
    }

    fn read_payload(&mut self, kind: TagKind) -> Result<Tag> {
        let tag = match kind {
            TagKind::End => return Err(Error::UnknownKind(0)),
            TagKind::Byte => Tag::Byte(self.read_u8()? as i8),
            TagKind::Short => Tag::Short(self.read_i16()?),
            TagKind::Int => Tag::Int(self.read_i32()?),
            TagKind::Long => Tag::Long(self.read_i64()?),
            TagKind::Float => Tag::Float(BigEndian::read_f32(self.take(4)?)),
            TagKind::Double => Tag::Double(BigEndian::read_f64(self.take(8)?)),
            TagKind::ByteArray => {
                let len = self.read_array_length(1)?;
                Tag::ByteArray(self.take(len)?.iter().map(|&b| b as i8).collect())
            }
            TagKind::String => Tag::String(self.read_string()?),
            TagKind::List => Tag::List(self.read_list()?),
            TagKind::Compound => Tag::Compound(self.read_compound()?),
            TagKind::IntArray => {
                let len = self.read_array_length(4)?;
                let mut values = vec![0i32; len];
                BigEndian::read_i32_into(self.take(len * 4)?, &mut values);
                Tag::IntArray(values)
            }
            TagKind::LongArray => {
                let len = self.read_array_length(8)?;
                let mut values = vec![0i64; len];
                BigEndian::read_i64_into(self.take(len * 8)?, &mut values);
                Tag::LongArray(values)
            }
        };
        Ok(tag)
    }

    fn read_list(&mut self) -> Result<List> {
        self.enter()?;
        let kind = self.read_kind()?;
        let len = self.read_length()?;

        if kind == TagKind::End {
            if len > 0 {
                return Err(Error::NonEmptyEndList(len));
            }
            self.depth -= 1;
            return Ok(List::new(TagKind::End));
        }
        // Every non-End payload is at least one byte long.
        if len > self.input.len() {
            return Err(Error::UnexpectedEof);
        }

        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.read_payload(kind)?);
        }
        self.depth -= 1;
        List::from_items(kind, items)
    }

    fn read_compound(&mut self) -> Result<Compound> {
        self.enter()?;
        let mut compound = Compound::new();
        loop {
            let kind = self.read_kind()?;
            if kind == TagKind::End {
                break;
            }
            let name = self.read_string()?;
            let value = self.read_payload(kind)?;
            compound.insert(name, value);
        }
        self.depth -= 1;
        Ok(compound)
    }
}
