mod cli;

use agent_lab::history::HistoryStore;
use agent_lab::models::{split_focus_areas, TaskNotes};
use agent_lab::{export, utils, Config, Laboratory};
use clap::Parser;
use cli::{Cli, Command};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_RESEARCH_FAILED: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;
    // Dropped on return so buffered log lines reach the file before exit.
    let _guard = utils::init_logger(config.log_dir.as_deref());
    info!("Configuration loaded: {:?}", config.llm);

    let code = run(cli.command, config).await?;
    Ok(ExitCode::from(code))
}

async fn run(command: Command, mut config: Config) -> anyhow::Result<u8> {
    match command {
        Command::Research {
            topic,
            focus_areas,
            api_key,
            model,
        } => {
            let api_key = match cli::validate_research_input(api_key.as_deref(), &topic, &focus_areas) {
                Ok(key) => key,
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(EXIT_INVALID_INPUT);
                }
            };
            config.llm.api_key = api_key;
            if let Some(model) = model {
                config.llm.model = model;
            }

            let mut history = HistoryStore::load(&config.storage.history_path).await;
            match conduct_research(&config, &topic, &focus_areas, &mut history).await {
                Ok(id) => {
                    let entry = history.get(id)?;
                    println!("{}\n", cli::completion_message(&entry.failed_phases));
                    print_entry(&history, id)?;
                }
                Err(e) => {
                    error!(error = %e, "Research failed");
                    eprintln!("An error occurred: {}", e);
                    return Ok(EXIT_RESEARCH_FAILED);
                }
            }
        }
        Command::History => {
            let history = HistoryStore::load(&config.storage.history_path).await;
            if history.entries().is_empty() {
                println!("No previous research. Start one with `agent-lab research`.");
            }
            for entry in history.entries() {
                println!("Research #{}: {}", entry.id, entry.topic);
            }
        }
        Command::Show { id } => {
            let history = HistoryStore::load(&config.storage.history_path).await;
            print_entry(&history, id)?;
        }
        Command::Export { id } => {
            let history = HistoryStore::load(&config.storage.history_path).await;
            let entry = history.get(id)?;
            let path = export::export_entry(entry, &config.storage.export_dir).await?;
            println!("Research exported as {}", path.display());
        }
    }

    Ok(0)
}

async fn conduct_research(
    config: &Config,
    topic: &str,
    focus_areas: &str,
    history: &mut HistoryStore,
) -> anyhow::Result<u64> {
    let mut lab = Laboratory::new(config)?.on_stage(|stage| info!(stage = %stage, "Pipeline progress"));
    info!(model = %lab.model_name(), policy = ?lab.failure_policy(), "Laboratory ready");
    let task_notes = TaskNotes::from_focus_areas(focus_areas);

    let run = lab.conduct_research(topic, Some(task_notes)).await?;
    let entry = history.append(split_focus_areas(focus_areas), &run).await?;
    Ok(entry.id)
}

fn print_entry(history: &HistoryStore, id: u64) -> anyhow::Result<()> {
    let entry = history.get(id)?;
    println!("Research #{}: {}", entry.id, entry.topic);
    println!("Date: {}", entry.date);
    println!("Focus Areas: {}", entry.focus_areas.join(", "));
    println!("AI Model: {}", entry.model_name);
    if !entry.failed_phases.is_empty() {
        let phases: Vec<String> = entry.failed_phases.iter().map(|p| p.to_string()).collect();
        println!("Empty phases: {}", phases.join(", "));
    }
    println!("\n## Research Results\n");
    println!("{}", entry.final_report);
    Ok(())
}
