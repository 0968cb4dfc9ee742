use crate::agent::{EarlyStoppingMethod, ExecutorConfig, ParsingErrorPolicy, StoppingConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint override.
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub default_temperature: f64,

    #[serde(default)]
    pub executor: ExecutorSettings,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

// ── Executor settings ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// Hard cap on action/observation cycles (absent = unbounded)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: Option<u32>,
    /// Wall-clock budget for one run, in seconds
    #[serde(default)]
    pub max_execution_time_secs: Option<u64>,
    #[serde(default)]
    pub early_stopping_method: EarlyStoppingMethod,
    /// `false` raises, `true` feeds a default observation back,
    /// a string feeds that text back
    #[serde(default = "default_handle_parsing_errors")]
    pub handle_parsing_errors: HandleParsingErrors,
    #[serde(default)]
    pub return_intermediate_steps: bool,
    #[serde(default)]
    pub fail_on_unknown_tool: bool,
}

fn default_max_iterations() -> Option<u32> {
    Some(15)
}

fn default_handle_parsing_errors() -> HandleParsingErrors {
    HandleParsingErrors::Flag(true)
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_execution_time_secs: None,
            early_stopping_method: EarlyStoppingMethod::default(),
            handle_parsing_errors: default_handle_parsing_errors(),
            return_intermediate_steps: false,
            fail_on_unknown_tool: false,
        }
    }
}

/// Boolean and string forms accepted in the config file; resolved to a
/// [`ParsingErrorPolicy`] at load time. Handler-function policies are
/// code-only and never round-trip through the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandleParsingErrors {
    Flag(bool),
    Message(String),
}

impl HandleParsingErrors {
    pub fn to_policy(&self) -> ParsingErrorPolicy {
        match self {
            Self::Flag(false) => ParsingErrorPolicy::Raise,
            Self::Flag(true) => ParsingErrorPolicy::fixed_default(),
            Self::Message(text) => ParsingErrorPolicy::FixedText(text.clone()),
        }
    }
}

impl ExecutorSettings {
    pub fn to_executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            stopping: StoppingConfig {
                max_iterations: self.max_iterations,
                max_execution_time: self.max_execution_time_secs.map(Duration::from_secs),
                early_stopping_method: self.early_stopping_method,
            },
            parsing_errors: self.handle_parsing_errors.to_policy(),
            return_intermediate_steps: self.return_intermediate_steps,
            fail_on_unknown_tool: self.fail_on_unknown_tool,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────

impl Config {
    /// Load `~/.talaria/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .ok_or_else(|| ConfigError::Load("could not resolve home directory".into()))?
            .home_dir()
            .to_path_buf();
        Self::load_from_workspace(home.join(".talaria"))
    }

    /// Load from an explicit workspace directory (used by tests).
    pub fn load_from_workspace(workspace_dir: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&workspace_dir)?;
        let config_path = workspace_dir.join("config.toml");

        let mut config = if config_path.exists() {
            Self::parse(&fs::read_to_string(&config_path)?)?
        } else {
            let config = Self::initial();
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::Load(e.to_string()))?;
            fs::write(&config_path, rendered)?;
            config
        };

        config.workspace_dir = workspace_dir;
        config.config_path = config_path;
        if config.api_key.is_none() {
            config.api_key = std::env::var("TALARIA_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))
    }

    fn initial() -> Self {
        Self {
            workspace_dir: PathBuf::new(),
            config_path: PathBuf::new(),
            api_key: None,
            base_url: None,
            default_model: default_model(),
            default_temperature: 0.0,
            executor: ExecutorSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::Validation(format!(
                "default_temperature must be within 0.0..=2.0, got {}",
                self.default_temperature
            )));
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::Validation("default_model is empty".into()));
        }
        Ok(())
    }

    pub fn workspace_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.workspace_dir.join(relative)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
