//! Prompt template libraries loaded from TOML
//!
//! A library maps an action or judge criterion name to a system/user template
//! pair:
//!
//! ```toml
//! [shorten]
//! system = "You are an editor..."
//! user = "Shorten this email from {sender}: {content}"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::render::Template;
use crate::constants::DEFAULT_SYSTEM_PROMPT;
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPair {
    #[serde(default)]
    system: Option<String>,
    user: String,
}

/// System and user templates for one action or criterion
#[derive(Debug, Clone)]
pub struct PromptPair {
    pub system: Template,
    pub user: Template,
}

/// Immutable set of named prompt pairs, shared read-only after startup
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    source: String,
    entries: BTreeMap<String, PromptPair>,
}

impl PromptLibrary {
    /// Load and validate a library from a TOML file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read prompts {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&path.display().to_string(), &content)
    }

    /// Parse a library from TOML text. `source` names it in error messages.
    pub fn from_toml_str(source: &str, content: &str) -> PipelineResult<Self> {
        let raw: BTreeMap<String, RawPair> = toml::from_str(content)
            .map_err(|e| PipelineError::config(format!("malformed prompts {}: {}", source, e)))?;

        let mut entries = BTreeMap::new();
        for (key, pair) in raw {
            let system = pair.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
            let parsed = PromptPair {
                system: Template::parse(format!("{}/system", key), system)?,
                user: Template::parse(format!("{}/user", key), &pair.user)?,
            };
            entries.insert(key, parsed);
        }

        tracing::debug!("Loaded {} prompt(s) from {}", entries.len(), source);
        Ok(Self {
            source: source.to_string(),
            entries,
        })
    }

    /// Look up the pair for `key`
    pub fn get(&self, key: &str) -> PipelineResult<&PromptPair> {
        self.entries.get(key).ok_or_else(|| {
            PipelineError::config(format!("no template named '{}' in {}", key, self.source))
        })
    }

    /// Fail unless every key in `keys` is present
    pub fn require<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> PipelineResult<()> {
        for key in keys {
            self.get(key)?;
        }
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
