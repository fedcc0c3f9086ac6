//! Path-addressed access into a document.
//!
//! A path starts at the document (so the first segment is normally the root
//! name `""`), descends into compounds by name and into lists by index.

use std::fmt;

use thiserror::Error;

use crate::{Compound, Tag, TagKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Name(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Name(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Name(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Name(name) => write!(f, "{name:?}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Render a path for error messages, e.g. `"" / "Level" / "Entities" / [3]`.
pub fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" / ")
}

#[derive(Error, Debug, PartialEq)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("nothing at {0}")]
    Missing(String),

    #[error("{path} is a {kind:?}, which cannot be descended into by {segment}")]
    NotAContainer {
        path: String,
        kind: TagKind,
        segment: String,
    },

    #[error("list at {path} holds {expected:?}, cannot store {found:?}")]
    KindMismatch {
        path: String,
        expected: TagKind,
        found: TagKind,
    },
}

impl Tag {
    fn child(&self, segment: &PathSegment) -> Option<&Tag> {
        match (self, segment) {
            (Tag::Compound(c), PathSegment::Name(name)) => c.get(name),
            (Tag::List(l), PathSegment::Index(i)) => l.get(*i),
            _ => None,
        }
    }

    fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut Tag> {
        match (self, segment) {
            (Tag::Compound(c), PathSegment::Name(name)) => c.get_mut(name),
            (Tag::List(l), PathSegment::Index(i)) => l.get_mut(*i),
            _ => None,
        }
    }
}

fn root_entry<'a>(document: &'a Compound, segment: &PathSegment) -> Option<&'a Tag> {
    match segment {
        PathSegment::Name(name) => document.get(name),
        PathSegment::Index(_) => None,
    }
}

impl Compound {
    /// Walk `path` and return the leaf only if it has kind `expected`.
    pub fn get_node(&self, path: &[PathSegment], expected: TagKind) -> Option<&Tag> {
        let (first, rest) = path.split_first()?;
        let mut node = root_entry(self, first)?;
        for segment in rest {
            node = node.child(segment)?;
        }
        (node.kind() == expected).then_some(node)
    }

    /// Walk `path` and store `value` at its end, returning what was there.
    ///
    /// Every container on the way must already exist. The last segment may
    /// name a new compound entry (appended) or an existing list index; a list
    /// only accepts values of its element kind.
    pub fn set_node(
        &mut self,
        path: &[PathSegment],
        value: Tag,
    ) -> Result<Option<Tag>, PathError> {
        let Some((last, parents)) = path.split_last() else {
            return Err(PathError::Empty);
        };

        let Some((first, middle)) = parents.split_first() else {
            return match last {
                PathSegment::Name(name) => Ok(self.insert(name.clone(), value)),
                PathSegment::Index(_) => Err(PathError::Missing(format_path(path))),
            };
        };

        let mut parent = match first {
            PathSegment::Name(name) => self.get_mut(name),
            PathSegment::Index(_) => None,
        }
        .ok_or_else(|| PathError::Missing(format_path(&path[..1])))?;

        for (depth, segment) in middle.iter().enumerate() {
            parent = parent
                .child_mut(segment)
                .ok_or_else(|| PathError::Missing(format_path(&path[..depth + 2])))?;
        }

        let parent_path = || format_path(parents);
        match (parent, last) {
            (Tag::Compound(c), PathSegment::Name(name)) => Ok(c.insert(name.clone(), value)),
            (Tag::List(l), PathSegment::Index(i)) => {
                if l.kind() != value.kind() {
                    return Err(PathError::KindMismatch {
                        path: parent_path(),
                        expected: l.kind(),
                        found: value.kind(),
                    });
                }
                match l.set(*i, value) {
                    Ok(Some(old)) => Ok(Some(old)),
                    _ => Err(PathError::Missing(format_path(path))),
                }
            }
            (other, segment) => Err(PathError::NotAContainer {
                path: parent_path(),
                kind: other.kind(),
                segment: segment.to_string(),
            }),
        }
    }
}
