//! Tag stream encoding.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::{Compound, Error, List, MAX_DEPTH, Result, Tag, TagKind};

/// Encode a document: every entry is written as a named tag, in order.
pub fn to_writer<W: Write>(writer: W, document: &Compound) -> Result<()> {
    let mut encoder = Encoder { out: writer, depth: 0 };
    for (name, tag) in document.iter() {
        encoder.write_named(name, tag)?;
    }
    encoder.out.flush()?;
    Ok(())
}

pub fn to_bytes(document: &Compound) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    to_writer(&mut buf, document)?;
    Ok(buf)
}

struct Encoder<W> {
    out: W,
    depth: usize,
}

impl<W: Write> Encoder<W> {
    fn write_named(&mut self, name: &str, tag: &Tag) -> Result<()> {
        self.out.write_u8(tag.kind().id())?;
        self.write_string(name)?;
        self.write_payload(tag)
    }

    fn write_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::LengthOverflow(len))?;
        self.out.write_i32::<BigEndian>(len)?;
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| Error::StringTooLong(s.len()))?;
        self.out.write_u16::<BigEndian>(len)?;
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::DepthLimit(MAX_DEPTH));
        }
        Ok(())
    }

    fn write_payload(&mut self, tag: &Tag) -> Result<()> {
        match tag {
            Tag::Byte(v) => self.out.write_i8(*v)?,
            Tag::Short(v) => self.out.write_i16::<BigEndian>(*v)?,
            Tag::Int(v) => self.out.write_i32::<BigEndian>(*v)?,
            // High word is floor(v / 2^32), low word is v mod 2^32.
            Tag::Long(v) => self.out.write_i64::<BigEndian>(*v)?,
            Tag::Float(v) => self.out.write_f32::<BigEndian>(*v)?,
            Tag::Double(v) => self.out.write_f64::<BigEndian>(*v)?,
            Tag::ByteArray(values) => {
                self.write_length(values.len())?;
                let bytes: Vec<u8> = values.iter().map(|&b| b as u8).collect();
                self.out.write_all(&bytes)?;
            }
            Tag::String(s) => self.write_string(s)?,
            Tag::List(list) => self.write_list(list)?,
            Tag::Compound(compound) => self.write_compound(compound)?,
            Tag::IntArray(values) => {
                self.write_length(values.len())?;
                for v in values {
                    self.out.write_i32::<BigEndian>(*v)?;
                }
            }
            Tag::LongArray(values) => {
                self.write_length(values.len())?;
                for v in values {
                    self.out.write_i64::<BigEndian>(*v)?;
                }
            }
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<()> {
        self.enter()?;
        let kind = list.kind();
        self.out.write_u8(kind.id())?;
        self.write_length(list.len())?;
        for item in list {
            self.write_payload(item)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn write_compound(&mut self, compound: &Compound) -> Result<()> {
        self.enter()?;
        for (name, tag) in compound.iter() {
            self.write_named(name, tag)?;
        }
        self.out.write_u8(TagKind::End.id())?;
        self.depth -= 1;
        Ok(())
    }
}
