//! Collection shortcut table
//!
//! Maps short aliases such as `hero` to collection addresses. Loading never
//! fails: a missing or broken file falls back to the built-in table, and an
//! unknown alias resolves to itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Built-in shortcuts used when no file is configured
const DEFAULT_SHORTCUTS: &str = r#"
[
    {
        "name": "BitVerse Portals",
        "addr": "0xe4ac52f4b4a721d1d0ad8c9c689df401c2db7291",
        "shortcut": "portal"
    },
    {
        "name": "BitVerse Heroes",
        "addr": "0x6465ef3009f3c474774f4afb607a5d600ea71d95",
        "shortcut": "hero"
    }
]
"#;

/// A single alias entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub name: String,

    #[serde(rename = "addr")]
    pub address: String,

    #[serde(rename = "shortcut")]
    pub alias: String,
}

/// Read-only alias table, built once and shared by handle
#[derive(Debug, Clone, Default)]
pub struct ShortcutResolver {
    shortcuts: HashMap<String, Shortcut>,
}

impl ShortcutResolver {
    /// Load shortcuts from `location`, falling back to the built-in table
    pub fn load(location: Option<&Path>) -> Self {
        let content = match location {
            Some(path) if !path.as_os_str().is_empty() => match fs::read_to_string(path) {
                Ok(content) => Some(content),
                Err(e) => {
                    warn!("could not load shortcuts file {:?}: {}", path, e);
                    None
                }
            },
            _ => None,
        };

        if let Some(content) = content {
            match Self::parse(&content) {
                Ok(resolver) => {
                    debug!("Loaded {} shortcuts from {:?}", resolver.len(), location);
                    return resolver;
                }
                Err(e) => warn!("could not parse shortcuts file {:?}: {}", location, e),
            }
        }

        Self::builtin()
    }

    /// The built-in shortcut table
    pub fn builtin() -> Self {
        Self::parse(DEFAULT_SHORTCUTS).unwrap_or_default()
    }

    /// A resolver with no shortcuts at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON array of shortcut entries
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        let entries: Vec<Shortcut> = serde_json::from_str(content)?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = Shortcut>) -> Self {
        let shortcuts = entries
            .into_iter()
            .map(|s| (s.alias.clone(), s))
            .collect();
        Self { shortcuts }
    }

    /// Resolve an alias to its address. Anything that is not a known alias is
    /// assumed to already be an address and is returned unchanged.
    pub fn resolve<'a>(&'a self, alias_or_address: &'a str) -> &'a str {
        match self.shortcuts.get(alias_or_address) {
            Some(shortcut) => shortcut.address.as_str(),
            None => {
                debug!("no shortcut named {}, using it as an address", alias_or_address);
                alias_or_address
            }
        }
    }

    /// Resolve every entry of a comma separated list
    pub fn resolve_list(&self, list: &str) -> String {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| self.resolve(item))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn get(&self, alias: &str) -> Option<&Shortcut> {
        self.shortcuts.get(alias)
    }

    /// All shortcuts, sorted by alias
    pub fn iter(&self) -> impl Iterator<Item = &Shortcut> {
        let mut entries: Vec<&Shortcut> = self.shortcuts.values().collect();
        entries.sort_by(|a, b| a.alias.cmp(&b.alias));
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }
}
