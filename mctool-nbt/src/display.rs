//! Human-readable dump of a tag tree.
//!
//! The layout is JSON-like: compounds as objects, lists as arrays, scalars as
//! quoted strings with a kind suffix (`"12 i"`), arrays reduced to their size.

use std::fmt::{self, Display, Write};

use crate::{Compound, List, Tag};

const INDENT: &str = "    ";

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tag(f, self, 0)
    }
}

impl Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_compound(f, self, 0)
    }
}

fn write_tag<W: Write>(out: &mut W, tag: &Tag, level: usize) -> fmt::Result {
    match tag {
        Tag::Byte(v) => write!(out, "\"{v} b\""),
        Tag::Short(v) => write!(out, "\"{v} s\""),
        Tag::Int(v) => write!(out, "\"{v} i\""),
        Tag::Long(v) => write!(out, "\"{v} l\""),
        Tag::Float(v) => write!(out, "\"{v} f\""),
        Tag::Double(v) => write!(out, "\"{v} d\""),
        Tag::ByteArray(v) => write!(out, "\"Byte Array({})\"", v.len()),
        Tag::String(s) => write!(out, "\"{}\"", escape(s)),
        Tag::List(list) => write_list(out, list, level),
        Tag::Compound(compound) => write_compound(out, compound, level),
        Tag::IntArray(v) => write!(out, "\"Int Array({})\"", v.len()),
        Tag::LongArray(v) => write!(out, "\"Long Array({})\"", v.len()),
    }
}

fn write_compound<W: Write>(out: &mut W, compound: &Compound, level: usize) -> fmt::Result {
    let prefix = INDENT.repeat(level);
    out.write_str("{\n")?;
    let len = compound.len();
    for (i, (name, tag)) in compound.iter().enumerate() {
        write!(out, "{prefix}{INDENT}\"{}\" : ", escape(name))?;
        write_tag(out, tag, level + 1)?;
        if i + 1 < len {
            out.write_char(',')?;
        }
        out.write_char('\n')?;
    }
    write!(out, "{prefix}}}")
}

fn write_list<W: Write>(out: &mut W, list: &List, level: usize) -> fmt::Result {
    let prefix = INDENT.repeat(level);
    out.write_str("[\n")?;
    let len = list.len();
    for (i, tag) in list.iter().enumerate() {
        write!(out, "{prefix}{INDENT}")?;
        write_tag(out, tag, level + 1)?;
        if i + 1 < len {
            out.write_char(',')?;
        }
        out.write_char('\n')?;
    }
    write!(out, "{prefix}]")
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagKind;

    #[test]
    fn test_scalar_suffixes() {
        assert_eq!(Tag::Byte(-1).to_string(), "\"-1 b\"");
        assert_eq!(Tag::Short(2).to_string(), "\"2 s\"");
        assert_eq!(Tag::Int(3).to_string(), "\"3 i\"");
        assert_eq!(Tag::Long(-4).to_string(), "\"-4 l\"");
        assert_eq!(Tag::Float(0.5).to_string(), "\"0.5 f\"");
        assert_eq!(Tag::Double(2.25).to_string(), "\"2.25 d\"");
        assert_eq!(Tag::LongArray(vec![1, 2]).to_string(), "\"Long Array(2)\"");
        assert_eq!(Tag::String("say \"hi\"".into()).to_string(), r#""say \"hi\"""#);
    }

    #[test]
    fn test_nested_layout() {
        let list = List::from_items(TagKind::Int, vec![Tag::Int(1), Tag::Int(2)]).unwrap();
        let inner: Compound = [("id", Tag::from("minecraft:villager"))].into_iter().collect();
        let root: Compound = [("Pos", Tag::List(list)), ("Brain", Tag::Compound(inner))]
            .into_iter()
            .collect();

        let expected = "{\n\
            \x20   \"Pos\" : [\n\
            \x20       \"1 i\",\n\
            \x20       \"2 i\"\n\
            \x20   ],\n\
            \x20   \"Brain\" : {\n\
            \x20       \"id\" : \"minecraft:villager\"\n\
            \x20   }\n\
            }";
        assert_eq!(root.to_string(), expected);
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(Compound::new().to_string(), "{\n}");
        assert_eq!(Tag::List(List::new(TagKind::End)).to_string(), "[\n]");
    }
}
