//! Typed placeholder rendering.
//!
//! Template bodies are opaque text with `{{NAME}}` placeholders. Rendering is
//! strict: every placeholder must resolve, otherwise the whole body is
//! rejected and nothing is written. `${{ ... }}` (CI expression syntax) is
//! passed through untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::error::DomainError;

/// Variables every script body can use, whatever its own bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProjectFields {
    /// `project.name` from config, else the root directory name.
    pub project_name: String,
    pub project_name_snake: String,
    pub project_name_kebab: String,
    pub project_name_pascal: String,
    pub year: i32,
}

impl ProjectFields {
    pub fn new(project_name: impl Into<String>, year: i32) -> Self {
        let project_name = project_name.into();
        Self {
            project_name_snake: to_snake_case(&project_name),
            project_name_kebab: to_kebab_case(&project_name),
            project_name_pascal: to_pascal_case(&project_name),
            project_name,
            year,
        }
    }
}

/// Named values available to a template body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from the top-level scalar fields of a struct.
    ///
    /// `null` fields are left out so that a placeholder referring to them is
    /// reported as unresolved. Nested objects and arrays are rejected.
    pub fn from_fields<T: Serialize>(fields: &T) -> Result<Self, DomainError> {
        let value = serde_json::to_value(fields).map_err(|e| DomainError::MalformedTemplate {
            reason: format!("render fields are not serializable: {e}"),
        })?;
        let serde_json::Value::Object(map) = value else {
            return Err(DomainError::MalformedTemplate {
                reason: "render fields must be a struct or map".into(),
            });
        };

        let mut ctx = Self::new();
        for (name, value) in map {
            let rendered = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(DomainError::MalformedTemplate {
                        reason: format!("render field '{name}' is not a scalar"),
                    });
                }
            };
            ctx.variables.insert(name, rendered);
        }
        Ok(ctx)
    }

    /// Add a variable, consuming self and returning a new context.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Render a body, failing if any placeholder has no value.
    ///
    /// # Errors
    ///
    /// - [`DomainError::UnresolvedPlaceholders`] naming every missing variable
    /// - [`DomainError::MalformedTemplate`] for an unterminated `{{`
    pub fn render(&self, body: &str) -> Result<String, DomainError> {
        let mut out = String::with_capacity(body.len());
        let mut missing = BTreeSet::new();
        let mut rest = body;

        while let Some(start) = rest.find("{{") {
            let (before, tail) = rest.split_at(start);
            out.push_str(before);

            let Some(end) = tail.find("}}") else {
                return Err(DomainError::MalformedTemplate {
                    reason: format!("unterminated placeholder near '{}'", preview(tail)),
                });
            };
            let raw = &tail[..end + 2];
            rest = &tail[end + 2..];

            // `${{ expr }}` belongs to the CI system, not to us. Only the
            // source text decides; a substituted value ending in `$` does not.
            if before.ends_with('$') {
                out.push_str(raw);
                continue;
            }

            let name = raw[2..raw.len() - 2].trim();
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(DomainError::MalformedTemplate {
                    reason: format!("invalid placeholder '{raw}'"),
                });
            }

            match self.variables.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    missing.insert(name.to_string());
                }
            }
        }
        out.push_str(rest);

        if missing.is_empty() {
            Ok(out)
        } else {
            Err(DomainError::UnresolvedPlaceholders {
                names: missing.into_iter().collect(),
            })
        }
    }
}

fn preview(s: &str) -> String {
    s.chars().take(24).collect()
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Split a string into lowercase words on separators, camelCase transitions
/// and acronym boundaries (`HTTPServer` → `http`, `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
