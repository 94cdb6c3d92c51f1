//! `devassist`: terminal front end of the AI Developer Assistant.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a stack trace as logs
//! devassist analyze --task logs "Traceback (most recent call last): ..."
//!
//! # Read two files locally and show them highlighted
//! devassist upload src/app.py src/Main.java
//!
//! # Send files to the backend instead, keeping earlier results
//! devassist --merge append upload --mode upload server.log
//!
//! # Mock inline suggestions for a file
//! devassist suggest src/app.js
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use analysis_api::{ApiClient, HealthService, telemetry};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use file_intake::IntakeMode;
use lang_detect::{DetectedLanguage, detect_language};
use tokio::io::AsyncReadExt;
use tracing::{Level, debug};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use workbench::{
    AnalysisMode, EditorSession, MergePolicy, TaskSelection, Workbench, WorkbenchConfig,
};

#[derive(Parser)]
#[command(name = "devassist")]
#[command(version)]
#[command(about = "Analyze code, logs and text with the AI Developer Assistant backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides DEVASSIST_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Whether new results replace or extend the board: replace, append
    #[arg(long, global = true)]
    merge: Option<MergePolicy>,

    /// Produce canned results locally instead of calling the backend
    #[arg(long, global = true)]
    simulate: bool,

    /// Print the result board as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze free text (reads stdin if TEXT is omitted)
    Analyze {
        /// Task type: text, code, logs
        #[arg(short, long, default_value = "text")]
        task: TaskSelection,

        /// Highlight results as this language
        #[arg(short, long)]
        language: Option<DetectedLanguage>,

        text: Option<String>,
    },

    /// Summarize free text (reads stdin if TEXT is omitted)
    Summarize {
        #[arg(short, long)]
        language: Option<DetectedLanguage>,

        text: Option<String>,
    },

    /// Read or upload files; each accepted file gets its own result
    Upload {
        /// read (decode locally) or upload (send to /upload-file)
        #[arg(short, long)]
        mode: Option<IntakeMode>,

        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show the fixed sample result
    Simulate,

    /// Open a file and show mock inline suggestions
    Suggest {
        #[arg(short, long)]
        language: Option<DetectedLanguage>,

        path: PathBuf,
    },

    /// Print the detected language of each file name
    Detect {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Probe the backend (`GET /`)
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Optional: a missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    // Without -v, RUST_LOG (or "warn") alone decides.
    let level = match verbose {
        0 => None,
        1 => Some(Level::INFO),
        2 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    };
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", level))
        .with(telemetry::layer())
        .init();
}

fn load_config(cli: &Cli) -> Result<WorkbenchConfig> {
    let mut cfg = WorkbenchConfig::from_env().context("invalid DEVASSIST_* configuration")?;
    if let Some(url) = &cli.api_url {
        cfg.api.base_url = url.clone();
    }
    if let Some(merge) = cli.merge {
        cfg.merge = merge;
    }
    if cli.simulate {
        cfg.analysis = AnalysisMode::Simulated;
    }
    if let Commands::Upload {
        mode: Some(mode), ..
    } = &cli.command
    {
        cfg.intake = *mode;
    }
    cfg.validate().context("invalid command line settings")?;
    debug!(?cfg, "configuration loaded");
    Ok(cfg)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let cfg = load_config(&cli)?;
    let json = cli.json;

    let wb = match cli.command {
        Commands::Detect { names } => {
            for name in &names {
                println!("{name}\t{}", detect_language(name));
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Health => return health(&cfg, json).await,
        Commands::Suggest { language, path } => {
            let mut session = EditorSession::open(&path).await?;
            if let Some(lang) = language {
                session.set_language(lang);
            }
            let count = session.get_suggestions().len();
            print!("{}", session.render());
            println!("{count} suggestion(s)");
            session.close();
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Analyze {
            task,
            language,
            text,
        } => {
            let mut wb = build_workbench(&cfg)?;
            wb.select_task(task);
            wb.override_language(language);
            wb.set_text(text_or_stdin(text).await?);
            wb.submit_text().await;
            wb
        }
        Commands::Summarize { language, text } => {
            let mut wb = build_workbench(&cfg)?;
            wb.override_language(language);
            wb.set_text(text_or_stdin(text).await?);
            wb.summarize_text().await;
            wb
        }
        Commands::Upload { paths, .. } => {
            let mut wb = build_workbench(&cfg)?;
            let summary = wb.submit_paths(&paths).await?;
            for r in &summary.rejected {
                eprintln!("{} {r}", "skipped".yellow());
            }
            wb
        }
        Commands::Simulate => {
            let mut wb = build_workbench(&cfg)?;
            wb.simulate_results();
            wb
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&wb.snapshot())?);
    } else {
        print!("{}", wb.render());
    }
    Ok(ExitCode::SUCCESS)
}

fn build_workbench(cfg: &WorkbenchConfig) -> Result<Workbench> {
    let client = ApiClient::new(cfg.api.clone()).context("cannot build API client")?;
    Ok(Workbench::new(cfg, Arc::new(client)))
}

async fn health(cfg: &WorkbenchConfig, json: bool) -> Result<ExitCode> {
    let status = HealthService::new(cfg.api.timeout_secs).check(&cfg.api).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let flag = if status.ok {
            "OK".green().bold()
        } else {
            "DOWN".red().bold()
        };
        println!(
            "{flag} {} ({} ms): {}",
            status.endpoint, status.latency_ms, status.message
        );
    }
    Ok(if status.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn text_or_stdin(text: Option<String>) -> Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    if std::io::stdin().is_terminal() {
        return Ok(String::new());
    }
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("cannot read text from stdin")?;
    Ok(buf)
}
