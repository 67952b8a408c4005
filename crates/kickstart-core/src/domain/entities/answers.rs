use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::value_objects::ConfigKey;

/// A persisted configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: ConfigKey,
    pub value: String,
}

/// Per-invocation answers, keyed by override name (`CICD_PROVIDER`).
///
/// Never persisted unless the caller asks for it explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswersOverride {
    values: BTreeMap<String, String>,
}

impl AnswersOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later pairs win over earlier ones with the same name.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_ascii_uppercase(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Look up the answer overriding `key`.
    pub fn for_key(&self, key: &ConfigKey) -> Option<&str> {
        self.get(&key.override_name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalised_to_upper_case() {
        let answers = AnswersOverride::from_pairs([("cicd_provider", "gitlab")]);
        assert_eq!(answers.get("CICD_PROVIDER"), Some("gitlab"));

        let key: ConfigKey = "cicd.provider".parse().unwrap();
        assert_eq!(answers.for_key(&key), Some("gitlab"));
    }

    #[test]
    fn later_pairs_win() {
        let answers = AnswersOverride::from_pairs([("A_B", "1"), ("A_B", "2")]);
        assert_eq!(answers.get("A_B"), Some("2"));
        assert_eq!(answers.len(), 1);
    }
}
