//! Application configuration loaded from an optional JSON file.

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use spritekey_effects::{ChromaKeyParams, SmoothAnimationOptions};

/// Settings shared by all subcommands. Command-line flags override them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chroma: ChromaKeyParams,
    pub animation: SmoothAnimationOptions,
    /// Skip the worker thread and key on the calling thread.
    pub force_cooperative: bool,
}

impl AppConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let mut config: Self = serde_json::from_str(text).context("parse config JSON")?;
        config.chroma = config.chroma.with_fuzz(config.chroma.fuzz);
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&text).with_context(|| format!("load config '{}'", path.display()))
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
