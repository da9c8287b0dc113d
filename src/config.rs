use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_GENERATION_MODEL, DEFAULT_JUDGE_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEED, ENV_API_BASE, ENV_API_KEY,
};
use crate::editor::FailurePolicy;
use crate::editor::synthetic::{PersonaSeed, default_seeds};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion backend and model selection
    #[serde(default)]
    pub ai: AiConfig,
    /// Where datasets and prompt libraries live
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// OpenAI-compatible backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Usually left unset and taken from `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Generation models offered in the model selector
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Model every judge call goes to
    #[serde(default = "default_judge_model")]
    pub judge_model: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            models: default_models(),
            default_model: default_model(),
            judge_model: default_judge_model(),
            seed: default_seed(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Model list for selectors, with the default model always present
    pub fn model_choices(&self) -> Vec<String> {
        let mut models = self.models.clone();
        if !models.contains(&self.default_model) {
            models.insert(0, self.default_model.clone());
        }
        models
    }
}

/// Dataset and prompt library locations. Relative paths are resolved
/// against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,
    #[serde(default = "default_prompts")]
    pub prompts: PathBuf,
    #[serde(default = "default_judge_prompts")]
    pub judge_prompts: PathBuf,
    #[serde(default = "default_synthetic_prompts")]
    pub synthetic_prompts: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            prompts: default_prompts(),
            judge_prompts: default_judge_prompts(),
            synthetic_prompts: default_synthetic_prompts(),
        }
    }
}

impl DataConfig {
    /// `<dataset_dir>/<stem>.jsonl`
    pub fn dataset_path(&self, stem: &str) -> PathBuf {
        self.dataset_dir.join(format!("{}.jsonl", stem))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Records evaluated at once (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub keybinding_mode: KeybindingMode,
    #[serde(default)]
    pub theme: ThemeVariant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeybindingMode {
    #[default]
    Vim,
    Arrows,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    /// Catppuccin Mocha
    #[default]
    Modern,
    /// Terminal palette colors only
    Dark,
    #[serde(rename = "high-contrast")]
    HighContrast,
    #[serde(rename = "tokyo-night")]
    TokyoNight,
}

/// Persona seeds for `redraft synthesize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    #[serde(default = "default_seeds")]
    pub seeds: Vec<PersonaSeed>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_models() -> Vec<String> {
    vec![
        DEFAULT_GENERATION_MODEL.to_string(),
        "gpt-4o".to_string(),
        DEFAULT_JUDGE_MODEL.to_string(),
    ]
}

fn default_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_judge_model() -> String {
    DEFAULT_JUDGE_MODEL.to_string()
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("datasets")
}

fn default_prompts() -> PathBuf {
    PathBuf::from("prompts.toml")
}

fn default_judge_prompts() -> PathBuf {
    PathBuf::from("judge_prompts.toml")
}

fn default_synthetic_prompts() -> PathBuf {
    PathBuf::from("synthetic_prompts.toml")
}

fn default_concurrency() -> usize {
    1
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("redraft");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the user config (all defaults when there is no file), then
    /// apply credential overrides from the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// `OPENAI_API_BASE` and `OPENAI_API_KEY` win over the file
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            self.ai.api_base = base;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.ai.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ai.judge_model.trim().is_empty() {
            anyhow::bail!("ai.judge_model must not be empty");
        }
        if self.ai.default_model.trim().is_empty() {
            anyhow::bail!("ai.default_model must not be empty");
        }
        if self.batch.concurrency == 0 {
            anyhow::bail!("batch.concurrency must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ai.api_base, "https://api.openai.com/v1");
        assert_eq!(config.ai.judge_model, "gpt-4.1");
        assert_eq!(config.ai.seed, 42);
        assert_eq!(config.batch.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.batch.concurrency, 1);
        assert_eq!(config.synthetic.seeds.len(), 5);
        assert_eq!(config.ui.theme, ThemeVariant::Modern);
        assert_eq!(
            config.data.dataset_path("shorten_synthetic"),
            PathBuf::from("datasets/shorten_synthetic.jsonl")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [ai]
            api_base = "http://localhost:8080/v1"
            models = ["llama3", "mistral"]
            default_model = "llama3"
            judge_model = "gpt-4.1-mini"
            seed = 7

            [data]
            dataset_dir = "/srv/emails"

            [batch]
            failure_policy = "skip"
            concurrency = 4

            [ui]
            keybinding_mode = "arrows"
            theme = "tokyo-night"

            [[synthetic.seeds]]
            topic = "late invoices"
            persona = "an accountant"
            tone = "tired"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ai.models, vec!["llama3", "mistral"]);
        assert_eq!(config.ai.judge_model, "gpt-4.1-mini");
        assert_eq!(config.ai.seed, 7);
        assert_eq!(config.ai.request_timeout_secs, 120);
        assert_eq!(config.data.prompts, PathBuf::from("prompts.toml"));
        assert_eq!(config.batch.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.batch.concurrency, 4);
        assert_eq!(config.ui.keybinding_mode, KeybindingMode::Arrows);
        assert_eq!(config.ui.theme, ThemeVariant::TokyoNight);
        assert_eq!(config.synthetic.seeds.len(), 1);
        assert_eq!(config.synthetic.seeds[0].persona, "an accountant");
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config: Config = toml::from_str(
            r#"
            [ai]
            api_base = "http://from-file/v1"
            api_key = "file-key"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_BASE", "http://from-env/v1"),
            ("OPENAI_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.ai.api_base, "http://from-env/v1");
        // Blank values do not clobber the file
        assert_eq!(config.ai.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_model_choices_include_default() {
        let mut ai = AiConfig {
            models: vec!["gpt-4o".to_string()],
            ..AiConfig::default()
        };
        ai.default_model = "gpt-4o-mini".to_string();
        assert_eq!(ai.model_choices(), vec!["gpt-4o-mini", "gpt-4o"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[batch]\nconcurrency = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.validate().is_err());

        fs::write(&path, "[batch\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
