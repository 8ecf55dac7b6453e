mod ask_cmd;
mod config;
mod config_cmd;
mod doctor_cmd;
mod ocr_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use mathmentor_config::{
    apply_all_defaults, config_dir, config_file_path, load_config, prepare, MathMentorConfig,
};
use mathmentor_core::ActionKind;
use mathmentor_gateway::{start_server, GatewayState};
use mathmentor_logging::{init_logger, LogOutput};

#[derive(Parser)]
#[command(name = "mathmentor")]
#[command(about = "MathMentor: an AI math tutor for the terminal and the web")]
#[command(version)]
struct Cli {
    /// Config file to use instead of `<config dir>/config.yaml`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal tutor
    Tui {
        #[arg(long, env = config::API_KEY_ENV, hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Serve the tutor over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one action (solve, hint, check, chat) and print the reply
    Ask {
        action: ActionKind,
        #[arg(long)]
        problem: Option<String>,
        /// Read the problem from an image instead
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        answer: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long, env = config::API_KEY_ENV, hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Print the text OCR finds in an image
    Ocr { image: PathBuf },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Check the local setup
    Doctor {
        #[arg(long, env = config::API_KEY_ENV, hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective config with secrets masked
    Show,
    /// Print the config file location
    Path,
    /// Write a config file filled with defaults
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    // Doctor and config report a broken file instead of refusing to start.
    let lenient = matches!(cli.command, Commands::Doctor { .. } | Commands::Config { .. });
    let (raw_config, load_error) = match load_config(&config_path).await {
        Ok(raw) => (raw, None),
        Err(e) if lenient => (MathMentorConfig::default(), Some(format!("{e:#}"))),
        Err(e) => return Err(e),
    };
    let config = if lenient {
        apply_all_defaults(raw_config.clone())
    } else {
        prepare(raw_config.clone())
            .with_context(|| format!("invalid config in {}", config_path.display()))?
    };

    let output = match cli.command {
        Commands::Tui { .. } => LogOutput::FileOnly,
        _ => LogOutput::Console,
    };
    init_logger(
        Some(config::log_dir(&config)),
        config.logging.level(),
        config.logging.json(),
        output,
    );

    match cli.command {
        Commands::Tui { api_key } => {
            let tutor = config::build_tutor(&config)?;
            mathmentor_tui::run_tui(tutor, config::initial_api_key(api_key, &config)).await?;
        }
        Commands::Serve { port, bind } => {
            let tutor = config::build_tutor(&config)?;
            let bind = bind.unwrap_or_else(|| config.gateway.bind().to_string());
            let port = port.unwrap_or_else(|| config.gateway.port());
            let addr: SocketAddr = format!("{bind}:{port}")
                .parse()
                .with_context(|| format!("invalid bind address {bind}:{port}"))?;

            info!(
                addr = %addr,
                model = %tutor.client().model(),
                ocr = %tutor.ocr().engine_name(),
                session_ttl_secs = config.gateway.session_ttl_secs(),
                "Starting MathMentor gateway"
            );
            let ttl = Duration::from_secs(config.gateway.session_ttl_secs());
            start_server(addr, GatewayState::new(tutor).with_session_ttl(ttl)).await?;
        }
        Commands::Ask {
            action,
            problem,
            image,
            answer,
            message,
            api_key,
        } => {
            let tutor = config::build_tutor(&config)?;
            let args = ask_cmd::AskArgs {
                action,
                problem,
                image,
                answer,
                message,
            };
            ask_cmd::run(&tutor, config::initial_api_key(api_key, &config), args).await?;
        }
        Commands::Ocr { image } => {
            ocr_cmd::run(&config::ocr_service(&config), &image).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => config_cmd::show(&config, &config_path, load_error.as_deref())?,
            ConfigCommand::Path => config_cmd::path(&config_path),
            ConfigCommand::Init { force } => config_cmd::init(&config_path, force).await?,
        },
        Commands::Doctor { api_key } => {
            doctor_cmd::run(raw_config, load_error, &config_path, api_key).await?;
        }
    }

    Ok(())
}
