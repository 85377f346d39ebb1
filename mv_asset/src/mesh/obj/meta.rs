use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Per-file conversion settings, read from a sibling TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ObjMeta {
    /// External mesh compiler to run on the emitted document; overrides the
    /// CLI flag when set.
    pub(crate) compiler: Option<String>,
    /// Whether referenced material libraries are translated alongside.
    pub(crate) translate_materials: bool,
}

impl Default for ObjMeta {
    fn default() -> Self {
        Self {
            compiler: None,
            translate_materials: true,
        }
    }
}

impl ObjMeta {
    pub(crate) fn parse(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let meta: Self = toml::from_slice(&data)?;
        Ok(meta)
    }
}
