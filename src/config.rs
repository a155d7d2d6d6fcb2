use crate::types::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "o1-preview";
pub const DEFAULT_HISTORY_FILE: &str = "research_results.json";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub log_dir: Option<PathBuf>,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub api_base: Option<String>,
    pub request_timeout: Duration,
}

// Keep the credential out of logs.
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl LLMConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// What the orchestrator does when a completion call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure, record it on the phase, continue with empty text.
    #[default]
    SubstituteEmpty,
    /// Stop the run and return the failure to the caller.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substitute-empty" | "substitute_empty" | "empty" => Ok(FailurePolicy::SubstituteEmpty),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(AppError::Config(format!("unknown failure policy: {}", other))),
        }
    }
}

/// Instruction prefixes for each phase. The phase input is appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    pub literature_review: String,
    pub experimentation: String,
    pub report_writing: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            literature_review: "You are a research assistant conducting a literature review. \
                Please analyze the current state of research on: "
                .to_string(),
            experimentation: "You are a research assistant conducting experiments. \
                Please design and execute experiments for: "
                .to_string(),
            report_writing: "You are a research assistant writing a scientific report. \
                Please write a research report based on these results: "
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub failure_policy: FailurePolicy,
    pub templates: PromptTemplates,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub history_path: PathBuf,
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from(DEFAULT_HISTORY_FILE),
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Read configuration from the process environment. Loading `.env` is the
    /// binary's job and happens before this is called.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("LAB_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("LAB_REQUEST_TIMEOUT_SECS: {}", e)))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let failure_policy = match lookup("LAB_FAILURE_POLICY") {
            Some(raw) => raw.parse::<FailurePolicy>()?,
            None => FailurePolicy::default(),
        };

        Ok(Self {
            llm: LLMConfig {
                provider: lookup("LAB_PROVIDER").unwrap_or_else(|| "openai".to_string()),
                api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
                model: lookup("LAB_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base: lookup("LAB_API_BASE").filter(|s| !s.is_empty()),
                request_timeout: Duration::from_secs(timeout_secs),
            },
            pipeline: PipelineConfig {
                failure_policy,
                templates: PromptTemplates::default(),
            },
            storage: StorageConfig {
                history_path: lookup("LAB_HISTORY_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
                export_dir: lookup("LAB_EXPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
            log_dir: lookup("LAB_LOG_DIR").map(PathBuf::from),
        })
    }
}
