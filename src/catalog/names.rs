use ahash::AHashMap;

use crate::codec::Format;
use crate::error::{Error, Result};

/// Id → name mapping for one catalog: a default table plus optional
/// per-format overlays.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    default: AHashMap<u32, String>,
    overlays: AHashMap<Format, AHashMap<u32, String>>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: AHashMap<u32, String>) -> Self {
        Self { default, overlays: AHashMap::new() }
    }

    pub fn set_default(&mut self, table: AHashMap<u32, String>) {
        self.default = table;
    }

    pub fn set_overlay(&mut self, format: Format, table: AHashMap<u32, String>) {
        self.overlays.insert(format, table);
    }

    pub fn default_table(&self) -> &AHashMap<u32, String> {
        &self.default
    }

    pub fn overlay(&self, format: Format) -> Option<&AHashMap<u32, String>> {
        self.overlays.get(&format)
    }

    /// True when neither the default table nor any overlay has an entry
    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.overlays.values().all(|t| t.is_empty())
    }
}

/// Parse the `"<id>: <name>"` table format. Blank lines and lines starting
/// with `//` are ignored.
pub fn parse_name_table(text: &str, origin: &str) -> Result<AHashMap<u32, String>> {
    let mut table = AHashMap::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let err = |reason: String| Error::Table {
            origin: origin.to_string(),
            line: index + 1,
            reason,
        };
        let (id, name) = line
            .split_once(':')
            .ok_or_else(|| err(format!("expected \"<id>: <name>\", got {line:?}")))?;
        let id: u32 = id
            .trim()
            .parse()
            .map_err(|_| err(format!("invalid id {:?}", id.trim())))?;
        table.insert(id, name.trim().to_string());
    }
    Ok(table)
}
