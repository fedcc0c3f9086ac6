//! Include/exclude area lists.
//!
//! A [`SelectionList`] is built from block-coordinate areas, matched against
//! the chunk window of one region file, rebased into that file's local space,
//! and finally rasterised into a [`SelectionMap`] of slot indices. Areas are
//! applied in order and later ones overwrite earlier ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{REGION_WIDTH, SLOT_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    #[default]
    Include,
    Exclude,
}

/// Inclusive integer range, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: i32,
    pub max: i32,
}

impl Range {
    /// Endpoints may be given in either order.
    pub fn new(a: i32, b: i32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn intersect(self, other: Range) -> Option<Range> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(Range { min, max })
    }

    pub fn contains(self, v: i32) -> bool {
        self.min <= v && v <= self.max
    }

    fn scale_down(self, scale: i32) -> Range {
        Range {
            min: self.min.div_euclid(scale),
            max: self.max.div_euclid(scale),
        }
    }

    fn rebase(self, scale: i32) -> Range {
        Range {
            min: self.min.rem_euclid(scale),
            max: self.max.rem_euclid(scale),
        }
    }
}

/// Chunk window of a candidate (usually one region file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: Range,
    pub z: Range,
}

/// One area as written in a task file, in block coordinates.
///
/// `x`/`z` hold one or two endpoints; an empty or missing axis is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArea {
    #[serde(rename = "type", default)]
    pub kind: AreaKind,
    #[serde(default)]
    pub x: Vec<i32>,
    #[serde(default)]
    pub z: Vec<i32>,
}

fn normalize(raw: &[i32], scale: i32) -> Option<Range> {
    let range = match raw {
        [] => return None,
        [a] => Range::new(*a, *a),
        [a, b, ..] => Range::new(*a, *b),
    };
    Some(range.scale_down(scale))
}

/// An area in chunk (or region-local) coordinates. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub kind: AreaKind,
    pub x: Option<Range>,
    pub z: Option<Range>,
}

impl Area {
    pub fn from_raw(raw: &RawArea, scale: i32) -> Self {
        Self {
            kind: raw.kind,
            x: normalize(&raw.x, scale),
            z: normalize(&raw.z, scale),
        }
    }

    /// Clip to `bounds`. An unbounded axis becomes the candidate's own range.
    fn clip(&self, bounds: &Bounds) -> Option<Area> {
        let x = match self.x {
            Some(r) => r.intersect(bounds.x)?,
            None => bounds.x,
        };
        let z = match self.z {
            Some(r) => r.intersect(bounds.z)?,
            None => bounds.z,
        };
        Some(Area { kind: self.kind, x: Some(x), z: Some(z) })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionList {
    areas: Vec<Area>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalise `raw` areas and append them. `scale` converts input units to
    /// chunk units (16 for block coordinates).
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive.
    pub fn add(&mut self, raw: &[RawArea], scale: i32) {
        assert!(scale > 0, "selection scale must be positive, got {scale}");
        self.areas.extend(raw.iter().map(|area| Area::from_raw(area, scale)));
    }

    pub fn push(&mut self, area: Area) {
        self.areas.push(area);
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Areas that overlap `bounds`, clipped to it. `None` if nothing survives.
    pub fn matching(&self, bounds: &Bounds) -> Option<SelectionList> {
        let areas: Vec<Area> = self.areas.iter().filter_map(|a| a.clip(bounds)).collect();
        (!areas.is_empty()).then_some(SelectionList { areas })
    }

    /// Rebase every bounded axis by floor-modulo `scale` (world chunk
    /// coordinates to region-local ones when `scale` is 32).
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive.
    pub fn transform(&mut self, scale: i32) {
        assert!(scale > 0, "selection scale must be positive, got {scale}");
        for area in &mut self.areas {
            area.x = area.x.map(|r| r.rebase(scale));
            area.z = area.z.map(|r| r.rebase(scale));
        }
    }

    /// Rasterise region-local areas into slot decisions, last write wins.
    ///
    /// Cells outside `0..32` are ignored; an unbounded axis covers the whole
    /// region edge.
    pub fn selection_map(&self) -> SelectionMap {
        let full = Range::new(0, REGION_WIDTH - 1);
        let mut map = SelectionMap::default();
        for area in &self.areas {
            let include = area.kind == AreaKind::Include;
            let Some(xs) = area.x.unwrap_or(full).intersect(full) else {
                continue;
            };
            let Some(zs) = area.z.unwrap_or(full).intersect(full) else {
                continue;
            };
            for x in xs.min..=xs.max {
                for z in zs.min..=zs.max {
                    map.cells.insert((x + z * REGION_WIDTH) as usize, include);
                }
            }
        }
        map
    }
}

/// Per-slot decision. Slots never covered by any area are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMap {
    cells: BTreeMap<usize, bool>,
}

impl SelectionMap {
    /// `Some(true)` included, `Some(false)` excluded, `None` never covered.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.cells.get(&index).copied()
    }

    pub fn is_included(&self, index: usize) -> bool {
        self.get(index) == Some(true)
    }

    /// Included slot indices in ascending order.
    pub fn included(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .filter(|(index, included)| **included && **index < SLOT_COUNT)
            .map(|(index, _)| *index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
