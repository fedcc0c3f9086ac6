//! Villager trade reset.
//!
//! For every selected chunk, every villager (optionally filtered by custom
//! name) gets `maxUses` and/or `uses` overwritten on each of its offers.

use anyhow::{Context, Result};
use mctool_anvil::{CHUNK_WIDTH, Region, SelectionList, SelectionMap, World};
use mctool_nbt::{Compound, List, PathSegment, Tag, TagKind, format_path};

use crate::config::{TradeAction, TradeConfig, TradeTask};

const VILLAGER_ID: &str = "minecraft:villager";

fn entities_path() -> Vec<PathSegment> {
    vec!["".into(), "Level".into(), "Entities".into()]
}

fn recipes_path() -> Vec<PathSegment> {
    vec!["Offers".into(), "Recipes".into()]
}

/// Plain text of a `CustomName`: the `text` field of a JSON text component.
/// Anything else, plain strings included, has no name.
fn custom_name(entity: &Compound) -> Option<String> {
    let raw = entity
        .get_node(&["CustomName".into()], TagKind::String)
        .and_then(Tag::as_str)?;
    let Ok(serde_json::Value::Object(component)) = serde_json::from_str(raw) else {
        return None;
    };
    match component.get("text")? {
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn is_target(entity: &Compound, name: Option<&str>) -> bool {
    let id = entity.get_node(&["id".into()], TagKind::String).and_then(Tag::as_str);
    if id != Some(VILLAGER_ID) {
        return false;
    }
    match name {
        Some(name) => custom_name(entity).as_deref() == Some(name),
        None => true,
    }
}

/// Apply `action` to every offer of one villager. Returns whether any offer
/// was touched.
fn reset_offers(entity: &mut Compound, action: TradeAction) -> Result<bool> {
    let recipes_path = recipes_path();
    let count = match entity.get_node(&recipes_path, TagKind::List).and_then(Tag::as_list) {
        Some(recipes) if recipes.kind() == TagKind::Compound => recipes.len(),
        _ => return Ok(false),
    };

    let fields = [("maxUses", action.max_uses), ("uses", action.uses)];
    for index in 0..count {
        for (field, value) in fields {
            let Some(value) = value else {
                continue;
            };
            let mut path = recipes_path.clone();
            path.push(index.into());
            path.push(field.into());
            entity
                .set_node(&path, Tag::Int(value))
                .with_context(|| format!("setting {}", format_path(&path)))?;
        }
    }
    Ok(count > 0 && !action.is_empty())
}

/// Reset trades in one chunk document. Returns whether the document changed.
pub fn reset_document(
    document: &mut Compound,
    name: Option<&str>,
    action: TradeAction,
) -> Result<bool> {
    if action.is_empty() {
        return Ok(false);
    }
    let path = entities_path();
    let Some(entities) = document.get_node(&path, TagKind::List).and_then(Tag::as_list) else {
        return Ok(false);
    };
    if entities.kind() != TagKind::Compound {
        return Ok(false);
    }

    let mut updated = List::new(TagKind::Compound);
    let mut changed = false;
    for entity in entities {
        let mut entity = entity.clone();
        if let Some(compound) = entity.as_compound_mut() {
            if is_target(compound, name) {
                changed |= reset_offers(compound, action)?;
            }
        }
        updated.push(entity)?;
    }

    if changed {
        document
            .set_node(&path, Tag::List(updated))
            .with_context(|| format!("writing back {}", format_path(&path)))?;
    }
    Ok(changed)
}

/// Reset trades in every selected slot of `region`. Returns how many chunks
/// were re-encoded.
pub fn reset_region(
    region: &mut Region,
    selection: &SelectionMap,
    task: &TradeTask,
) -> Result<usize> {
    let mut changed = 0;
    region.walk(selection, |region, index| -> Result<()> {
        let Some(chunk) = region.get_mut(index)? else {
            return Ok(());
        };
        let mut document = chunk.decode().with_context(|| format!("decoding chunk {index}"))?;
        if reset_document(&mut document, task.name.as_deref(), task.action)
            .with_context(|| format!("editing chunk {index}"))?
        {
            chunk
                .set_tree(&document)
                .with_context(|| format!("encoding chunk {index}"))?;
            changed += 1;
        }
        Ok(())
    })?;
    Ok(changed)
}

pub fn run(config: &TradeConfig) -> Result<()> {
    let world = World::new(&config.src);
    for task in &config.list {
        if task.action.is_empty() {
            log::warn!("Skipping task with nothing to do");
            continue;
        }
        let mut selection = SelectionList::new();
        selection.add(&task.area, CHUNK_WIDTH);

        world.walk(&selection, |local, file_name| -> Result<()> {
            let path = world.dir().join(file_name);
            log::info!("{file_name}");
            let mut region =
                Region::open(&path).with_context(|| format!("opening {}", path.display()))?;
            let changed = reset_region(&mut region, &local.selection_map(), task)
                .with_context(|| format!("in {}", path.display()))?;
            region.write().with_context(|| format!("writing {}", path.display()))?;
            log::debug!("{file_name}: {changed} chunk(s) updated");
            Ok(())
        })?;
    }
    Ok(())
}
