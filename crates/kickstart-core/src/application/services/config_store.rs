//! Layered configuration lookup.
//!
//! Precedence, highest first: per-invocation answers, the persisted project
//! store, the caller's default. Lookups never fail; a key nobody set yields
//! the default.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use crate::{
    application::{ApplicationError, ports::ConfigStorage},
    domain::{AnswersOverride, ConfigEntry, ConfigKey, VariableBinding},
    error::KickstartResult,
};

pub struct ConfigStore {
    storage: Box<dyn ConfigStorage>,
    entries: BTreeMap<ConfigKey, String>,
    answers: AnswersOverride,
    /// Answers names registered by script variables, mapped to their keys.
    bindings: BTreeMap<String, ConfigKey>,
}

impl ConfigStore {
    /// Load persisted entries and attach this invocation's answers.
    #[instrument(skip_all, fields(store = %storage.location().display()))]
    pub fn load(
        storage: Box<dyn ConfigStorage>,
        answers: AnswersOverride,
    ) -> KickstartResult<Self> {
        let entries = storage
            .load()?
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect::<BTreeMap<_, _>>();
        debug!(entries = entries.len(), answers = answers.len(), "Config store loaded");

        Ok(Self {
            storage,
            entries,
            answers,
            bindings: BTreeMap::new(),
        })
    }

    /// Let answers use a script variable's name for its key.
    pub fn register_bindings<'a, I>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = &'a VariableBinding>,
    {
        for binding in bindings {
            self.bindings
                .entry(binding.name.to_ascii_uppercase())
                .or_insert_with(|| binding.key.clone());
        }
    }

    /// The effective value, if any layer has one.
    pub fn lookup(&self, key: &ConfigKey) -> Option<&str> {
        self.answers
            .for_key(key)
            .or_else(|| {
                self.bindings
                    .iter()
                    .filter(|(_, bound)| *bound == key)
                    .find_map(|(name, _)| self.answers.get(name))
            })
            .or_else(|| self.entries.get(key).map(String::as_str))
    }

    pub fn get(&self, key: &ConfigKey, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }

    /// Boolean lookup. A malformed value falls back to the default.
    pub fn get_bool(&self, key: &ConfigKey, default: bool) -> bool {
        match self.lookup(key) {
            None => default,
            Some(raw) => parse_bool(raw).unwrap_or_else(|| {
                warn!(key = %key, value = raw, default, "Not a boolean, using default");
                default
            }),
        }
    }

    pub fn get_u64(&self, key: &ConfigKey, default: u64) -> u64 {
        match self.lookup(key) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(key = %key, value = raw, default, "Not a number, using default");
                default
            }),
        }
    }

    /// Amend the in-memory store. Call `persist` to write it.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    /// The entries `update_from_answers` would write, without writing them.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::ConfigKeyClash`] when an answer's key would be a
    /// section of a stored or answered key, or the other way round.
    pub fn answer_entries(&self, answers: &AnswersOverride) -> KickstartResult<Vec<ConfigEntry>> {
        let mut resolved: Vec<ConfigEntry> = Vec::with_capacity(answers.len());
        for (name, value) in answers.iter() {
            let key = match self.bindings.get(name) {
                Some(bound) => bound.clone(),
                None => ConfigKey::from_override_name(name)?,
            };
            if let Some(existing) = self
                .entries
                .keys()
                .chain(resolved.iter().map(|e| &e.key))
                .find(|other| nests(&key, other))
            {
                return Err(ApplicationError::ConfigKeyClash {
                    key: key.to_string(),
                    existing: existing.to_string(),
                }
                .into());
            }
            resolved.push(ConfigEntry {
                key,
                value: value.to_string(),
            });
        }
        Ok(resolved)
    }

    /// Copy every answer into the persisted layer. Existing keys the answers
    /// do not mention are left alone. Nothing is copied if any answer clashes.
    pub fn update_from_answers(
        &mut self,
        answers: &AnswersOverride,
    ) -> KickstartResult<Vec<ConfigKey>> {
        let resolved = self.answer_entries(answers)?;
        let mut written = Vec::with_capacity(resolved.len());
        for entry in resolved {
            self.entries.insert(entry.key.clone(), entry.value);
            written.push(entry.key);
        }
        Ok(written)
    }

    #[instrument(skip(self), fields(store = %self.storage.location().display()))]
    pub fn persist(&self) -> KickstartResult<()> {
        self.storage.save(&self.entries())?;
        debug!(entries = self.entries.len(), "Config store persisted");
        Ok(())
    }

    /// Persisted entries, sorted by key.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.entries
            .iter()
            .map(|(key, value)| ConfigEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }

    pub fn answers(&self) -> &AnswersOverride {
        &self.answers
    }

    pub fn location(&self) -> PathBuf {
        self.storage.location()
    }
}

/// `true` when one key is a dotted prefix of the other.
fn nests(a: &ConfigKey, b: &ConfigKey) -> bool {
    let section_of = |section: &str, key: &str| {
        key.strip_prefix(section)
            .is_some_and(|rest| rest.starts_with('.'))
    };
    section_of(a.as_str(), b.as_str()) || section_of(b.as_str(), a.as_str())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
