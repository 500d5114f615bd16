//! Configuration management for faqbot.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.faqbot/config.yaml` or an explicit path)
//! - Environment variables (a `.env` file is loaded first, if present)
//! - Command-line flags
//!
//! Credentials are resolved once, here, and handed to the model client
//! explicitly; nothing downstream reads the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the model client factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 4] = ["groq", "openai", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .faqbot/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider (e.g., "groq", "openai", "ollama", "mock")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint for the provider
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// API key resolved at startup
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// HTTP timeout for model calls, in seconds
    pub timeout_secs: u64,

    /// Staging directory override (relative paths are resolved against the workspace)
    pub staging_dir: Option<PathBuf>,

    /// Chunking settings
    pub chunking: ChunkingConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Which chunking policy to apply to ingested text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkPolicyKind {
    /// Overlapping fixed-size windows across the whole document
    Sliding,
    /// Single chunk, cut at the character budget
    Truncate,
}

impl ChunkPolicyKind {
    /// Parse a policy name.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "sliding" | "sliding-window" | "window" => Ok(Self::Sliding),
            "truncate" | "truncation" => Ok(Self::Truncate),
            other => Err(AppError::Config(format!(
                "Unknown chunking policy: {}. Supported: sliding, truncate",
                other
            ))),
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sliding => "sliding",
            Self::Truncate => "truncate",
        }
    }
}

/// Chunking settings, all sizes in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_policy")]
    pub policy: ChunkPolicyKind,

    /// Character budget for the truncate policy
    #[serde(default = "default_budget")]
    pub budget: usize,

    /// Window size for the sliding policy
    #[serde(rename = "chunkSize", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters repeated between consecutive windows
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_policy() -> ChunkPolicyKind {
    ChunkPolicyKind::Sliding
}

fn default_budget() -> usize {
    5000
}

fn default_chunk_size() -> usize {
    5000
}

fn default_overlap() -> usize {
    400
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            budget: default_budget(),
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    chunking: Option<ChunkingConfig>,
    staging: Option<StagingSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StagingSection {
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "groq".to_string(),
            model: "llama3-8b-8192".to_string(),
            endpoint: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: None,
            timeout_secs: 60,
            staging_dir: None,
            chunking: ChunkingConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

/// Load a `.env` file from the current directory or its parents, if one exists.
///
/// Must run before [`AppConfig::load`] so that its variables are visible.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment variables.
    ///
    /// Environment variables:
    /// - `FAQBOT_PROVIDER`: LLM provider
    /// - `FAQBOT_MODEL`: Model identifier
    /// - `FAQBOT_ENDPOINT`: Provider endpoint
    /// - `FAQBOT_API_KEY`: API key (takes precedence over the provider key variable)
    /// - `<apiKeyEnv>` (default `GROQ_API_KEY`): API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use faqbot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        cf
                    )));
                }
                cf.clone()
            }
            None => config.faqbot_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("FAQBOT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("FAQBOT_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("FAQBOT_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        config.api_key = config.resolve_api_key();
        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        Ok(self.clone().merge(config_file))
    }

    fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                self.provider = provider;
            }
            if let Some(model) = llm.model {
                self.model = model;
            }
            if llm.endpoint.is_some() {
                self.endpoint = llm.endpoint;
            }
            if let Some(api_key_env) = llm.api_key_env {
                self.api_key_env = api_key_env;
            }
            if let Some(timeout) = llm.timeout_secs {
                self.timeout_secs = timeout;
            }
        }

        if let Some(chunking) = file.chunking {
            self.chunking = chunking;
        }

        if let Some(staging) = file.staging {
            if staging.dir.is_some() {
                self.staging_dir = staging.dir;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .faqbot directory.
    pub fn faqbot_dir(&self) -> PathBuf {
        self.workspace.join(".faqbot")
    }

    /// Directory uploaded documents are staged into before parsing.
    pub fn staging_dir(&self) -> PathBuf {
        match self.staging_dir {
            Some(ref dir) if dir.is_absolute() => dir.clone(),
            Some(ref dir) => self.workspace.join(dir),
            None => self.faqbot_dir().join("staging"),
        }
    }

    /// Resolve the API key from the environment.
    ///
    /// `FAQBOT_API_KEY` wins over the provider-specific variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("FAQBOT_API_KEY")
            .ok()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the provider settings.
    ///
    /// Chunking sizes are checked when the chunking policy is built.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if matches!(provider.as_str(), "groq" | "openai") && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.api_key_env
            )));
        }

        Ok(())
    }
}
