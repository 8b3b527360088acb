//! Category → name → connection string data model.
//!
//! The registry is plain data. Persistence lives in [`crate::store`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub type Category = IndexMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    servers: IndexMap<String, Category>,
    /// Top-level keys this version does not know about, kept for write-back.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Characters allowed in category names, entry names and connection strings.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-')
}

pub fn validate(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    if let Some(c) = value.chars().find(|c| !is_allowed_char(*c)) {
        return Err(Error::validation(
            field,
            format!("character '{c}' is not allowed (use letters, digits, '@', '.', '_' or '-')"),
        ));
    }
    Ok(())
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        self.servers.keys().cloned().collect()
    }

    pub fn entries(&self, category: &str) -> Result<Vec<(String, String)>> {
        let entries = self
            .servers
            .get(category)
            .ok_or_else(|| Error::NotFound(format!("category '{category}'")))?;
        Ok(entries
            .iter()
            .map(|(name, target)| (name.clone(), target.clone()))
            .collect())
    }

    /// Every `(category, name, connection string)` in display order.
    pub fn flatten(&self) -> Vec<(String, String, String)> {
        self.servers
            .iter()
            .flat_map(|(category, entries)| {
                entries
                    .iter()
                    .map(move |(name, target)| (category.clone(), name.clone(), target.clone()))
            })
            .collect()
    }

    pub fn contains_target(&self, target: &str) -> bool {
        self.servers
            .values()
            .any(|entries| entries.values().any(|t| t == target))
    }

    pub fn contains(&self, category: &str, name: &str) -> bool {
        self.servers
            .get(category)
            .is_some_and(|entries| entries.contains_key(name))
    }

    /// Inserts a new entry, creating the category when needed.
    ///
    /// Rejects invalid input and an existing `(category, name)` pair; the
    /// registry is untouched on error.
    pub fn insert(&mut self, category: &str, name: &str, target: &str) -> Result<()> {
        validate("category", category)?;
        validate("name", name)?;
        validate("connection string", target)?;
        if self.contains(category, name) {
            return Err(Error::DuplicateEntry {
                category: category.to_string(),
                name: name.to_string(),
            });
        }
        self.servers
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), target.to_string());
        Ok(())
    }

    /// Removes an entry and drops its category once it is empty.
    pub fn remove(&mut self, category: &str, name: &str) -> Result<String> {
        let entries = self
            .servers
            .get_mut(category)
            .ok_or_else(|| Error::NotFound(format!("server '{name}' in category '{category}'")))?;
        let target = entries
            .shift_remove(name)
            .ok_or_else(|| Error::NotFound(format!("server '{name}' in category '{category}'")))?;
        if entries.is_empty() {
            self.servers.shift_remove(category);
        }
        Ok(target)
    }

    /// Checks names and connection strings read from disk.
    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        for (category, entries) in &self.servers {
            validate("category", category).map_err(|e| e.to_string())?;
            for (name, target) in entries {
                validate("name", name).map_err(|e| format!("{category}: {e}"))?;
                validate("connection string", target)
                    .map_err(|e| format!("{category}/{name}: {e}"))?;
            }
        }
        Ok(())
    }
}
