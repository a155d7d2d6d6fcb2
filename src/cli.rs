use agent_lab::agents::Phase;
use agent_lab::types::{AppError, AppResult};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "agent-lab", about = "Literature review, experiment plan and report from one topic")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the three-phase research pipeline and save the result
    Research {
        /// Research topic
        #[arg(long, default_value = "")]
        topic: String,

        /// Focus areas (comma-separated)
        #[arg(long, default_value = "")]
        focus_areas: String,

        /// API key; falls back to OPENAI_API_KEY
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model identifier; falls back to LAB_MODEL
        #[arg(long)]
        model: Option<String>,
    },
    /// List previous research
    History,
    /// Show a previous research entry
    Show { id: u64 },
    /// Export a previous research entry as Markdown
    Export { id: u64 },
}

/// Check the research form the way the user filled it in. Returns the api key.
pub fn validate_research_input(api_key: Option<&str>, topic: &str, focus_areas: &str) -> AppResult<String> {
    let api_key = api_key.map(str::trim).unwrap_or_default();
    if api_key.is_empty() {
        return Err(AppError::InvalidRequest("Please enter your API Key".to_string()));
    }
    if topic.trim().is_empty() {
        return Err(AppError::InvalidRequest("Please enter a research topic".to_string()));
    }
    if focus_areas.trim().is_empty() {
        return Err(AppError::InvalidRequest("Please enter focus areas".to_string()));
    }
    Ok(api_key.to_string())
}

/// Headline printed after a research run; names the phases saved as empty text.
pub fn completion_message(failed_phases: &[Phase]) -> String {
    if failed_phases.is_empty() {
        return "Research completed successfully!".to_string();
    }
    let phases: Vec<String> = failed_phases.iter().map(Phase::to_string).collect();
    format!("Research completed with empty phases: {}", phases.join(", "))
}
