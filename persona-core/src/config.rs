//! Application configuration.
//!
//! Built once at startup and handed to every component. Values come from the
//! built-in defaults, then an optional TOML file named by `PERSONA_CONFIG`,
//! then the environment.

use crate::error::{ConfigError, CoreError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_PATH_VAR: &str = "PERSONA_CONFIG";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";

pub const DEFAULT_USER_AGENT: &str = "reddit-persona/0.1";

#[derive(Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Not validated here; a missing key shows up as an auth failure later.
    pub openai_api_key: Option<String>,
    pub user_agent: String,
    /// No timeout unless set.
    pub request_timeout_secs: Option<u64>,
    pub output_dir: PathBuf,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub corpus: CorpusConfig,
    pub word_cloud: WordCloudConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub permalink_base: String,
    pub comment_page_size: usize,
    pub post_page_size: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorpusConfig {
    pub persona_min_words: usize,
    pub word_cloud_min_words: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub max_words: usize,
    pub relative_scaling: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    pub generate_persona: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            output_dir: PathBuf::from("."),
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
            corpus: CorpusConfig::default(),
            word_cloud: WordCloudConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pushshift.io".to_string(),
            permalink_base: "https://reddit.com".to_string(),
            comment_page_size: 100,
            post_page_size: 50,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            persona_min_words: crate::corpus::PERSONA_MIN_WORDS,
            word_cloud_min_words: crate::corpus::WORD_CLOUD_MIN_WORDS,
        }
    }
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background_color: "white".to_string(),
            max_words: 100,
            relative_scaling: 0.5,
        }
    }
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("output_dir", &self.output_dir)
            .field("search", &self.search)
            .field("llm", &self.llm)
            .field("corpus", &self.corpus)
            .field("word_cloud", &self.word_cloud)
            .field("console", &self.console)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR).filter(|v| !v.is_empty()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(key) = lookup(OPENAI_API_KEY_VAR).filter(|v| !v.is_empty()) {
            config.openai_api_key = Some(key);
        }
        if let Some(agent) = lookup(USER_AGENT_VAR).filter(|v| !v.is_empty()) {
            config.user_agent = agent;
        }
        if let Some(model) = lookup(OPENAI_MODEL_VAR).filter(|v| !v.is_empty()) {
            config.llm.model = model;
        }

        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CoreError::Io(e)
            }
        })?;
        info!("Reading configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                value: self.llm.temperature.to_string(),
            }
            .into());
        }
        if self.search.comment_page_size == 0 || self.search.post_page_size == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "page sizes must be greater than zero".to_string(),
            }
            .into());
        }
        if self.word_cloud.width == 0 || self.word_cloud.height == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "word cloud canvas must not be empty".to_string(),
            }
            .into());
        }
        if self.word_cloud.max_words == 0 {
            return Err(ConfigError::InvalidValue {
                field: "word_cloud.max_words".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.word_cloud.relative_scaling) {
            return Err(ConfigError::InvalidValue {
                field: "word_cloud.relative_scaling".to_string(),
                value: self.word_cloud.relative_scaling.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
