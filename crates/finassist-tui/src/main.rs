use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finassist_core::{AssistantClient, Config};

mod app;
mod ask;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "finassist")]
#[command(about = "Terminal chat client for the financial assistant")]
#[command(version)]
struct Cli {
    /// Base address of the assistant (overrides config and FINASSIST_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Address of the generated chart image
    #[arg(long, global = true)]
    chart_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        text: String,
    },
    /// Download the most recently generated chart
    Chart {
        /// Where to save the image (defaults to the configured file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Chat));

    if let Err(e) = init_logging(interactive) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Application error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to a file while the alternate screen is up, to stderr otherwise
fn init_logging(interactive: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "finassist_tui=info,finassist_core=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if interactive {
        let log_dir = Config::get_config_dir()?;
        std::fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join("finassist.log");
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("opening log file {}", log_path.display()))?;

        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(log_file)),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().context("loading config")?;
    config.apply_env();
    config.apply_overrides(cli.base_url.clone(), cli.chart_url.clone());
    Ok(config)
}

async fn execute(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    info!(base_url = %config.base_url, "starting");

    match cli.command {
        None | Some(Commands::Chat) => run_tui(config).await,
        Some(Commands::Ask { text }) => ask(&config, text).await,
        Some(Commands::Chart { output }) => download_chart(&config, output).await,
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tui(config: Config) -> Result<ExitCode> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(config);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            if let Some(event) = events.next().await {
                handler::handle_event(&mut app, event)?;
            }
            app.poll_tasks().await;
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result?;
    Ok(ExitCode::SUCCESS)
}

async fn ask(config: &Config, text: String) -> Result<ExitCode> {
    let client = AssistantClient::from_config(config);
    let succeeded = ask::ask_once(&client, client.chart_url(), text, &mut std::io::stdout()).await?;

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn download_chart(config: &Config, output: Option<PathBuf>) -> Result<ExitCode> {
    let client = AssistantClient::from_config(config);
    let path = output.unwrap_or_else(|| PathBuf::from(&config.chart_file_name));

    let bytes = client
        .download_chart(&path)
        .await
        .with_context(|| format!("downloading chart from {}", client.chart_url()))?;

    println!("Chart saved to {} ({} bytes)", path.display(), bytes);
    Ok(ExitCode::SUCCESS)
}
