// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Sortwise: AI-assisted file classifier & organizer
//!
//! Classifies files by name with a local model and sorts a folder's files
//! into one subdirectory per category.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use sortwise::categories::Category;
use sortwise::classifier::Classifier;
use sortwise::config::AppConfig;
use sortwise::host::local::{approve_all, deny_all, Approver, PathPicker};
use sortwise::intake::UploadedFile;
use sortwise::ollama::{OllamaClient, TextOracle};
use sortwise::session::{format_bytes, OrganizedFile, Session};
use sortwise::{FolderOutcome, Orchestrator, Result, SortwiseError};

/// Sortwise CLI - AI-assisted file classifier & organizer
#[derive(Parser, Debug)]
#[command(name = "sortwise")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Classify files by name with a local AI model and sort them into folders", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify individual files without touching them
    Classify {
        /// Files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Classify the files directly inside a folder, without moving anything
    Scan {
        /// Folder to scan
        dir: PathBuf,
    },

    /// Classify a folder's files and move them into category subfolders
    Organize {
        /// Folder to organize
        dir: PathBuf,

        /// Grant write access without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show AI engine status
    Status {
        /// Check specific model availability
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the categories files are sorted into
    Categories,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !cli.quiet {
        info!("Sortwise v1.0.0 - AI file classifier & organizer");
    }

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Classify { files } => run_classify(config, files, &cli.format).await,
        Commands::Scan { dir } => run_scan(config, dir, &cli.format).await,
        Commands::Organize { dir, yes } => run_organize(config, dir, yes, &cli.format).await,
        Commands::Status { model } => run_status(config, model).await,
        Commands::Categories => run_categories(&cli.format),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Build the orchestrator around the configured Ollama engine
async fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let client = OllamaClient::new(&config.ai_engine.url)?;

    match client.health_check().await {
        Ok(()) => info!("Ollama is running at {}", client.base_url()),
        Err(e) => warn!(
            "Ollama is not reachable at {} ({}); files will be classified as Other. Try: ollama serve",
            client.base_url(),
            e
        ),
    }

    let oracle: Arc<dyn TextOracle> = Arc::new(client);
    Ok(Orchestrator::new(Classifier::from_config(oracle, config)))
}

/// Classify files given on the command line, like a browser upload
async fn run_classify(config: AppConfig, paths: Vec<PathBuf>, format: &str) -> Result<()> {
    let mut files = Vec::new();
    for path in &paths {
        match UploadedFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("Skipping {}: {}", path.display(), e),
        }
    }

    let orchestrator = build_orchestrator(&config).await?;
    let mut session = Session::new();
    let summary = orchestrator.upload(&mut session, files).await;

    print_files(session.files(), format)?;
    report_session(&session);

    if format == "text" {
        println!("\nClassified {} files", summary.classified);
    }
    Ok(())
}

/// Classify a folder's direct files
async fn run_scan(config: AppConfig, dir: PathBuf, format: &str) -> Result<()> {
    let orchestrator = build_orchestrator(&config)
        .await?
        .with_picker(Arc::new(PathPicker::new(Some(dir), deny_all())));
    let mut session = Session::new();

    load_folder(&orchestrator, &mut session).await?;
    print_files(session.files(), format)?;

    if format == "text" {
        if let Some(name) = session.directory_name() {
            println!("\nScanned {} files in {}", session.files().len(), name);
        }
    }
    Ok(())
}

/// Classify a folder's direct files and move them into category folders
async fn run_organize(config: AppConfig, dir: PathBuf, yes: bool, format: &str) -> Result<()> {
    let approver = if yes { approve_all() } else { prompt_approver() };
    let orchestrator = build_orchestrator(&config)
        .await?
        .with_picker(Arc::new(PathPicker::new(Some(dir), approver)));
    let mut session = Session::new();

    load_folder(&orchestrator, &mut session).await?;
    print_files(session.files(), format)?;

    if !session.can_organize() {
        if format == "text" {
            println!("Nothing to organize");
        }
        return Ok(());
    }

    let outcome = match orchestrator.organize(&mut session).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report_session(&session);
            return Err(e);
        }
    };

    match outcome {
        Some(report) => match format {
            "json" => println!("{}", serde_json::to_string_pretty(&report)?),
            "jsonl" => println!("{}", serde_json::to_string(&report)?),
            _ => {
                if let Some(notice) = session.notice() {
                    println!("\n{}", notice);
                }
                if report.failed > 0 {
                    println!("{} files could not be moved", report.failed);
                }
                if report.excluded > 0 {
                    println!("{} files left in place", report.excluded);
                }
            }
        },
        None => {
            if format == "text" {
                println!("Nothing to organize");
            }
        }
    }
    Ok(())
}

async fn load_folder(orchestrator: &Orchestrator, session: &mut Session) -> Result<()> {
    match orchestrator.select_folder(session).await {
        Ok(FolderOutcome::Loaded(count)) => {
            info!("Loaded {} files", count);
            Ok(())
        }
        Ok(FolderOutcome::Cancelled) => Err(SortwiseError::PickerCancelled),
        Err(e) => {
            report_session(session);
            Err(e)
        }
    }
}

/// Ask on the terminal before granting write access
fn prompt_approver() -> Approver {
    Arc::new(|path: &Path| {
        eprint!(
            "Sortwise will create subfolders in {} and move files into them. Continue? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        match std::io::stdin().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"),
            Err(_) => false,
        }
    })
}

fn report_session(session: &Session) {
    if let Some(error) = session.error() {
        eprintln!("{}", error);
    }
}

/// Print classified files in the requested format
fn print_files(files: &[OrganizedFile], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(files)?),
        "jsonl" => {
            for file in files {
                println!("{}", serde_json::to_string(file)?);
            }
        }
        _ => {
            for group in sortwise::session::group_by_category(files) {
                if group.files.is_empty() {
                    continue;
                }
                println!("{} ({})", group.category, group.files.len());
                for file in group.files {
                    println!("  {}  {}", file.name(), format_bytes(file.size()));
                }
            }
        }
    }
    Ok(())
}

fn run_categories(format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&Category::ALL)?),
        "jsonl" => {
            for category in Category::ALL {
                println!("{}", serde_json::to_string(&category)?);
            }
        }
        _ => {
            println!("Categories:");
            for category in Category::ALL {
                let note = if category.is_movable() { "" } else { " (left in place)" };
                println!("  {}{}", category, note);
            }
        }
    }
    Ok(())
}

/// Run status check
async fn run_status(config: AppConfig, model: Option<String>) -> Result<()> {
    let client = OllamaClient::new(&config.ai_engine.url)?;
    let wanted = model.unwrap_or_else(|| config.ai_engine.model.clone());

    println!("Sortwise v1.0.0 Status");
    println!("======================");

    match client.health_check().await {
        Ok(()) => println!("Ollama: Running at {}", client.base_url()),
        Err(e) => println!("Ollama: Error - {}", e),
    }

    match client.list_models().await {
        Ok(models) => {
            println!("\nAvailable models:");
            for m in &models {
                let marker = if m.starts_with(wanted.as_str()) { "→" } else { " " };
                println!("  {} {}", marker, m);
            }
            match client.model_available(&wanted).await {
                Ok(true) => println!("\nModel '{}' is available", wanted),
                Ok(false) => println!("\nModel '{}' not found. Try: ollama pull {}", wanted, wanted),
                Err(e) => println!("\nCould not check model '{}': {}", wanted, e),
            }
        }
        Err(e) => println!("  Error listing models: {}", e),
    }

    println!("\nConfiguration:");
    println!("  Engine URL: {}", config.ai_engine.url);
    println!("  Model: {}", config.ai_engine.model);
    println!("  Web UI: http://{}:{}", config.web.host, config.web.port);

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            if output.exists() {
                return Err(SortwiseError::Config(format!(
                    "{:?} already exists; remove it first",
                    output
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Engine URL: {}", config.ai_engine.url);
            println!("  Model: {}", config.ai_engine.model);
            println!("  Folder pick in web UI: {}", config.web.allow_folder_pick);
        }
    }

    Ok(())
}
