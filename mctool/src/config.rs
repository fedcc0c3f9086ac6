//! JSON task files for `copy` and `reset-trade`.
//!
//! `src` and `dst` are resolved against the directory holding the task file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mctool_anvil::RawArea;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
pub struct CopyConfig {
    pub src: PathBuf,
    pub dst: PathBuf,
    #[serde(default)]
    pub area: Vec<RawArea>,
}

#[derive(Debug, Deserialize)]
pub struct TradeConfig {
    pub src: PathBuf,
    #[serde(default)]
    pub list: Vec<TradeTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeTask {
    #[serde(default)]
    pub area: Vec<RawArea>,
    /// Only villagers whose custom name text equals this.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "do", default)]
    pub action: TradeAction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TradeAction {
    pub max_uses: Option<i32>,
    pub uses: Option<i32>,
}

impl TradeAction {
    pub fn is_empty(&self) -> bool {
        self.max_uses.is_none() && self.uses.is_none()
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    match path.is_absolute() {
        true => path.to_path_buf(),
        false => base.join(path),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn config_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}

impl CopyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = read_json(path)?;
        if config.area.is_empty() {
            bail!("{}: 'area' must list at least one area", path.display());
        }
        let base = config_dir(path);
        config.src = resolve(base, &config.src);
        config.dst = resolve(base, &config.dst);
        Ok(config)
    }
}

impl TradeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = read_json(path)?;
        if config.list.is_empty() {
            bail!("{}: 'list' must contain at least one task", path.display());
        }
        if let Some(i) = config.list.iter().position(|task| task.area.is_empty()) {
            bail!("{}: task {i} has an empty 'area'", path.display());
        }
        config.src = resolve(config_dir(path), &config.src);
        Ok(config)
    }
}
