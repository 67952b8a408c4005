//! Project config store adapters.
//!
//! The on-disk format is a TOML document whose nested tables flatten to
//! dotted keys:
//!
//! ```toml
//! [bootstrap]
//! backup_existing_files = "true"
//!
//! [cicd]
//! provider = "github"
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use kickstart_core::{
    application::{ApplicationError, ports::ConfigStorage},
    domain::{ConfigEntry, ConfigKey},
    error::{KickstartError, KickstartResult},
};
use toml::{Table, Value};
use tracing::{debug, instrument, warn};

/// TOML-file backed config store.
#[derive(Debug, Clone)]
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn error(&self, reason: impl Into<String>) -> KickstartError {
        ApplicationError::ConfigStorage {
            path: self.path.clone(),
            reason: reason.into(),
        }
        .into()
    }
}

impl ConfigStorage for TomlConfigStorage {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> KickstartResult<Vec<ConfigEntry>> {
        if !self.path.exists() {
            debug!("No config store yet");
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| self.error(format!("Failed to read: {e}")))?;
        let table: Table = toml::from_str(&raw).map_err(|e| self.error(e.to_string()))?;

        let mut entries = Vec::new();
        flatten(&table, "", &mut entries);
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    #[instrument(skip(self, entries), fields(path = %self.path.display(), count = entries.len()))]
    fn save(&self, entries: &[ConfigEntry]) -> KickstartResult<()> {
        let table = nest(entries).map_err(|e| self.error(e))?;
        let body = toml::to_string_pretty(&table).map_err(|e| self.error(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| self.error(format!("Failed to create {}: {e}", parent.display())))?;
        }
        std::fs::write(&self.path, body).map_err(|e| self.error(format!("Failed to write: {e}")))
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Keys that are not valid [`ConfigKey`]s are left out with a warning; the
/// rest of the store still loads.
fn flatten(table: &Table, prefix: &str, out: &mut Vec<ConfigEntry>) {
    for (name, value) in table {
        let dotted = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            Value::Table(inner) => flatten(inner, &dotted, out),
            scalar => match dotted.parse::<ConfigKey>() {
                Ok(key) => out.push(ConfigEntry {
                    key,
                    value: scalar_to_string(scalar),
                }),
                Err(e) => warn!(key = %dotted, error = %e, "Ignoring malformed config key"),
            },
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn nest(entries: &[ConfigEntry]) -> Result<Table, String> {
    let mut root = Table::new();
    for entry in entries {
        let segments: Vec<&str> = entry.key.segments().collect();
        let Some((leaf, sections)) = segments.split_last() else {
            continue;
        };

        let mut table = &mut root;
        for section in sections {
            let slot = table
                .entry(section.to_string())
                .or_insert(Value::Table(Table::new()));
            table = match slot {
                Value::Table(inner) => inner,
                _ => return Err(format!("'{}' is both a value and a section", entry.key)),
            };
        }
        if matches!(table.get(*leaf), Some(Value::Table(_))) {
            return Err(format!("'{}' is both a value and a section", entry.key));
        }
        table.insert(leaf.to_string(), Value::String(entry.value.clone()));
    }
    Ok(root)
}

/// Config store kept in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStorage {
    entries: Arc<RwLock<Vec<ConfigEntry>>>,
}

impl MemoryConfigStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from `(key, value)` pairs.
    pub fn with_entries(pairs: &[(&str, &str)]) -> KickstartResult<Self> {
        let entries = pairs
            .iter()
            .map(|(k, v)| {
                Ok(ConfigEntry {
                    key: k.parse()?,
                    value: (*v).to_string(),
                })
            })
            .collect::<KickstartResult<Vec<_>>>()?;
        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
        })
    }
}

impl ConfigStorage for MemoryConfigStorage {
    fn load(&self) -> KickstartResult<Vec<ConfigEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(entries.clone())
    }

    fn save(&self, entries: &[ConfigEntry]) -> KickstartResult<()> {
        let mut stored = self
            .entries
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        *stored = entries.to_vec();
        Ok(())
    }

    fn location(&self) -> PathBuf {
        Path::new("<memory>").to_path_buf()
    }
}
