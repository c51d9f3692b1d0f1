//! Callboard CLI - terminal wallboard

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use callboard::config::{DisplayConfig, UnknownTypePolicy};
use callboard::error::{DisplayError, FixSuggestion};
use callboard::markdown::{compose, line_text, render_markdown, MarkdownStyles};
use callboard::message::{Inbound, InvalidFrame};

#[derive(Parser)]
#[command(name = "callboard")]
#[command(about = "Callboard - terminal wallboard for call-center updates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a display server and show what it sends
    Run {
        /// Server base URL (http, https, ws or wss)
        #[arg(short, long)]
        server: Option<String>,

        /// Config file instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show unknown message types as raw JSON instead of ignoring them
        #[arg(long)]
        show_unknown: bool,
    },

    /// Play a scripted session without a server
    Demo {
        /// Config file instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Classify a JSON frame from a file and print how it would be shown
    Check {
        /// File holding one server frame
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            server,
            config,
            show_unknown,
        } => run_display(server, config.as_deref(), show_unknown).await,
        Commands::Demo { config } => run_demo(config.as_deref()).await,
        Commands::Check { file } => check_frame(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<DisplayError>()
            .and_then(|d| d.fix_suggestion())
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<DisplayConfig, DisplayError> {
    let config = match path {
        Some(path) => DisplayConfig::load_from(path)?,
        None => DisplayConfig::load()?,
    };
    Ok(config.with_env())
}

/// The terminal belongs to the display, so logs go to a file
fn init_file_logging(config: &DisplayConfig) -> anyhow::Result<PathBuf> {
    let path = config.log_file();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}

async fn run_display(
    server: Option<String>,
    config_path: Option<&Path>,
    show_unknown: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(server) = server {
        config.server.url = server;
    }
    if show_unknown {
        config.display.unknown_types = UnknownTypePolicy::ShowRaw;
    }
    config.validate()?;

    let log = init_file_logging(&config)?;
    tracing::info!(log = %log.display(), "logging to file");

    callboard::tui::run(&config).await
}

async fn run_demo(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;
    init_file_logging(&config)?;

    callboard::tui::demo(&config).await
}

fn check_frame(file: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(file).map_err(DisplayError::from)?;

    match Inbound::parse(raw.trim()) {
        Inbound::ConnectionStatus(notice) => {
            println!("{} connection_status", "✓".green());
            println!("  Status: {}", notice.status);
            if let Some(message) = notice.message {
                println!("  Message: {}", message);
            }
        }
        Inbound::CallUpdate(update) => {
            println!("{} new_call_update_available", "✓".green());
            println!("  Banner: Call update: {}", update.contact_name);
            println!("  {}", update.status_summary);
        }
        Inbound::Markdown(payload) => {
            println!("{} markdown", "✓".green());
            let source = compose(&payload);
            for line in render_markdown(&source, &MarkdownStyles::default()) {
                println!("  {}", line_text(&line));
            }
        }
        Inbound::Chart(spec) => {
            println!("{} graph_{}", "✓".green(), spec.kind);
            println!("  {}", spec.summary());
            if let Some(title) = &spec.title {
                println!("  Title: {}", title);
            }
        }
        Inbound::Ignored {
            message_type,
            reason,
        } => {
            println!("{} {} ignored: {}", "!".yellow(), message_type, reason);
        }
        Inbound::Unknown { message_type, .. } => {
            println!(
                "{} unknown type '{}' (ignored; shown raw with --show-unknown)",
                "!".yellow(),
                message_type
            );
        }
        Inbound::Invalid(InvalidFrame::Unparseable { error, .. })
        | Inbound::Invalid(InvalidFrame::Malformed(error))
        | Inbound::Invalid(InvalidFrame::Chart(error)) => return Err(error.into()),
    }

    Ok(())
}
