mod app_state;
mod commands;
mod config;
mod forms;
mod selector;
mod session;
mod tui;
mod ui;
mod view;

use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use telemetry_models::{AppId, ProjectId};
use telemetry_sdk::TelemetryClient;
use tracing_subscriber::EnvFilter;

use crate::app_state::AppController;
use crate::config::CliConfig;
use crate::tui::{init, restore, EventHandler};
use crate::ui::assistant::AssistantApp;

const TICK_RATE_MS: u64 = 250;

#[derive(Parser, Debug)]
#[command(name = "telemetry")]
#[command(about = "Client for the telemetry tracking API")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Tracking service base URL (defaults to $TELEMETRY_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Print raw JSON payloads
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the service is ready
    Ready,
    /// List projects
    Projects,
    /// List the applications of a project, newest first
    Apps {
        #[arg(value_parser = str::parse::<ProjectId>)]
        project: ProjectId,
    },
    /// Show the step logs of one or more applications
    Logs {
        #[arg(value_parser = str::parse::<ProjectId>)]
        project: ProjectId,
        #[arg(required = true, value_parser = str::parse::<AppId>)]
        apps: Vec<AppId>,
    },
    /// Chatbot commands
    Chat(ChatArgs),
    /// Interactive email assistant
    Assistant {
        /// Project to work in (defaults to $TELEMETRY_PROJECT)
        #[arg(long, value_parser = str::parse::<ProjectId>)]
        project: Option<ProjectId>,
    },
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Project of the chat application
    #[arg(value_parser = str::parse::<ProjectId>)]
    pub project: ProjectId,

    #[command(subcommand)]
    pub action: ChatAction,
}

#[derive(Subcommand, Debug)]
pub enum ChatAction {
    /// Print the conversation so far
    History {
        #[arg(value_parser = str::parse::<AppId>)]
        app: AppId,
    },
    /// Send a prompt and print the updated conversation
    Send {
        #[arg(value_parser = str::parse::<AppId>)]
        app: AppId,
        prompt: String,
    },
    /// Create a chat application (omit the id to let the service pick one)
    Create {
        #[arg(value_parser = str::parse::<AppId>)]
        app: Option<AppId>,
    },
}

/// Log to stderr, or to `config.log_file` when the terminal UI owns the
/// screen.
fn init_tracing(config: &CliConfig, to_file: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if to_file {
        if let Some(dir) = config.log_file.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
        }
        let file = File::create(&config.log_file)
            .with_context(|| format!("opening log file {}", config.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

async fn run_assistant(client: TelemetryClient, project: ProjectId) -> anyhow::Result<()> {
    let mut terminal = init().context("setting up the terminal")?;
    let mut events = EventHandler::new(TICK_RATE_MS);
    let mut app = AssistantApp::new(client, project, events.get_sender());
    app.start();

    let result = async {
        loop {
            terminal.draw(|f| app.render(f))?;
            let Some(action) = events.next_async().await else {
                break;
            };
            app.update(action);
            if app.should_quit() {
                break;
            }
        }
        anyhow::Ok(())
    }
    .await;

    restore().context("restoring the terminal")?;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::from_env();
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    let interactive = matches!(cli.command, Commands::Assistant { .. });
    init_tracing(&config, interactive)?;

    let client = TelemetryClient::new(&config.base_url)
        .with_context(|| format!("invalid service URL {}", config.base_url))?;
    tracing::debug!(url = %client.base_url(), "client ready");

    let json = cli.json;
    let output = match cli.command {
        Commands::Ready => commands::ready(&client).await?,
        Commands::Projects => commands::projects(&client, json).await?,
        Commands::Apps { project } => commands::apps(&client, &project, json).await?,
        Commands::Logs { project, apps } => commands::logs(&client, &project, &apps, json).await?,
        Commands::Chat(ChatArgs { project, action }) => match action {
            ChatAction::History { app } => {
                commands::chat_history(&client, &project, &app, json).await?
            }
            ChatAction::Send { app, prompt } => {
                commands::chat_send(&client, &project, &app, &prompt, json).await?
            }
            ChatAction::Create { app } => {
                let app = app.unwrap_or_else(AppId::create_new);
                commands::chat_create(&client, &project, &app).await?
            }
        },
        Commands::Assistant { project } => {
            let project = project.unwrap_or(config.project);
            tracing::info!(%project, log_file = %config.log_file.display(), "starting assistant");
            return run_assistant(client, project).await;
        }
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
