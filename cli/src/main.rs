//! CLI entrypoint for werewolf
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use werewolf_application::{
    AiGateway, ChannelRetryNotifier, GameContext, GameController, RateLimiter, SessionRegistry,
};
use werewolf_domain::{GameMode, Phase, UserId};
use werewolf_infrastructure::{
    BackendKind, ConfigLoader, FileConfig, JsonFileTemplateStore, create_backend,
};
use werewolf_presentation::{Cli, ConsoleFormatter, ConsoleSession, ConsoleTransport, Flow};

/// The console hosts a single room
const ROOM: &str = "console";

/// The person at the keyboard when no human is seated; moderates the room
const HOST: &str = "host";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;
    let mode = config.game_mode()?;

    info!("Starting werewolf");

    // === Dependency Injection ===
    let transport = Arc::new(ConsoleTransport::new());
    let backend = create_backend(&config.ai)?;
    let limiter = Arc::new(RateLimiter::new(config.to_rate_limit()));
    let mut gateway = AiGateway::new(backend, limiter)
        .with_retry_policy(config.to_retry_policy())
        .with_notifier(Arc::new(ChannelRetryNotifier::new(transport.clone())))
        .with_language(config.game.language.clone())
        .with_cache_capacity(config.cache.capacity);
    if let Some(path) = &config.cache.file {
        gateway = gateway.with_store(Arc::new(JsonFileTemplateStore::new(path)));
    }

    let backend_name = gateway.backend_name().to_string();

    let game_config = config.to_game_config();
    let registry = SessionRegistry::new(game_config.table_limits());
    let state = registry.session(ROOM).await;
    let ctx = GameContext::new(state, transport.clone(), Arc::new(gateway), game_config);

    let host = UserId::new(HOST);
    let controller = Arc::new(GameController::new(ctx).with_admins([host.clone()]));

    transport.emit(&ConsoleFormatter::banner(&backend_name, ROOM));
    seat_table(&controller, &transport, &cli, &host, mode).await;

    let active = cli
        .humans
        .first()
        .map(|name| UserId::new(name.as_str()))
        .unwrap_or(host);
    let mut session = ConsoleSession::new(controller.clone(), transport.clone(), active);
    run_console(&mut session, &controller, &transport).await;

    Ok(())
}

/// Seat the table from the command line and start if requested
async fn seat_table(
    controller: &Arc<GameController>,
    transport: &ConsoleTransport,
    cli: &Cli,
    host: &UserId,
    mode: GameMode,
) {
    let report = |result: Result<String, werewolf_application::CommandError>| match result {
        Ok(reply) => transport.emit(&ConsoleFormatter::notice(&reply)),
        Err(e) => transport.emit(&ConsoleFormatter::error(&e.to_string())),
    };

    for name in &cli.humans {
        report(controller.join(&UserId::new(name.as_str()), name).await);
    }
    if cli.bots > 0 {
        report(controller.add_bots(cli.bots).await);
    }
    if mode != GameMode::default() {
        report(controller.set_mode(host, mode).await);
    }
    if cli.autostart() {
        report(controller.start(host).await);
    }
}

/// Read the keyboard until `/quit`, Ctrl-C, or the end of a game with
/// nobody left to type
async fn run_console(
    session: &mut ConsoleSession,
    controller: &GameController,
    transport: &ConsoleTransport,
) {
    let mut phase = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if session.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    if !phase.borrow().is_in_game() {
                        break;
                    }
                }
            },
            changed = phase.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *phase.borrow_and_update();
                if current == Phase::GameOver {
                    if !stdin_open {
                        break;
                    }
                    transport.emit(&ConsoleFormatter::notice(
                        "Game over. /reset to play again or /quit to leave.",
                    ));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                break;
            }
        }
    }
}

/// Command-line flags win over every config source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(provider) = &cli.provider {
        config.ai.provider = provider.clone();
    }
    if let Some(mode) = &cli.mode {
        config.game.mode = mode.clone();
    }
    if cli.max_days.is_some() {
        config.game.max_days = cli.max_days;
    }
    if let Some(model) = &cli.model {
        match BackendKind::parse(&config.ai.provider) {
            BackendKind::Ollama => config.ai.ollama.model = model.clone(),
            BackendKind::GeminiApi => config.ai.gemini.model = model.clone(),
            BackendKind::GeminiCli => warn!("--model is ignored by the gemini-cli backend"),
        }
    }
}

/// Initialize logging based on verbosity level
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}
