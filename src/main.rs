//! Gesture Bridge - gesture-to-card-game command pipeline
//!
//! Replays recorded hand observations through the detection pipeline and
//! fronts the card game service for explicit actions.

use gesture_bridge::app::cli::{Cli, Commands, ConfigAction};
use gesture_bridge::app::config::Config;
use gesture_bridge::game::client::GameClient;
use gesture_bridge::game::types::GuessDirection;
use gesture_bridge::observe::log::ObservationLog;
use gesture_bridge::observe::source::ReplaySource;
use gesture_bridge::protocol::messages::DestinationScheme;
use gesture_bridge::protocol::publisher::EventPublisher;
use gesture_bridge::protocol::transport::ChannelTransport;
use gesture_bridge::session::coordinator::SessionCoordinator;
use gesture_bridge::session::driver::run_detection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    match cli.command {
        Commands::Run {
            input,
            camera,
            game,
        } => {
            run_pipeline(&input, camera, game, &config).await?;
        }
        Commands::Start => {
            run_start(&config).await?;
        }
        Commands::Guess { direction, game } => {
            run_guess(&direction, &game, &config).await?;
        }
        Commands::State { game } => {
            run_state(&game, &config).await?;
        }
        Commands::ReplayInfo { input } => {
            run_replay_info(&input)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

async fn run_pipeline(
    input: &Path,
    camera: u32,
    game: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    info!("Replaying observations from {:?}", input);

    if !input.exists() {
        anyhow::bail!("Observation log not found: {:?}", input);
    }
    let log = ObservationLog::load(input)?;
    if log.is_empty() {
        return Err(gesture_bridge::Error::SourceUnavailable(format!(
            "observation log {} holds no frames",
            input.display()
        ))
        .into());
    }
    info!(
        "Loaded log '{}' with {} frames",
        log.metadata.name,
        log.len()
    );

    let scheme = DestinationScheme::new(
        config.broker.destination_prefix.clone(),
        config.broker.topic_prefix.clone(),
    );
    let transport = ChannelTransport::connected();
    let publisher = EventPublisher::new(transport.clone(), scheme);
    let client = GameClient::new(config.backend.api_base_url.clone())?;
    let coordinator = Arc::new(SessionCoordinator::new(
        publisher,
        client,
        config.pipeline_settings(),
    ));
    coordinator.set_classifier(config.build_classifier()?);

    let session_id = coordinator.register()?;
    info!("Session: {}", session_id);

    match game {
        Some(game_id) => {
            coordinator.bind_game(&session_id, &game_id)?;
            info!("Bound to existing game {}", game_id);
        }
        None => {
            let snapshot = coordinator.start_game(&session_id).await?;
            println!("{}", snapshot.status_line());
        }
    }

    coordinator.start_detection(&session_id, camera)?;

    // Ctrl+C flips the detection flag; the driver winds down at the
    // next tick.
    let signal_coordinator = coordinator.clone();
    let signal_session = session_id.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping detection");
            if let Err(e) = signal_coordinator.stop_detection(&signal_session) {
                warn!("Failed to stop detection: {}", e);
            }
        }
    });

    let frame_interval = Duration::from_millis(config.detection.frame_interval_ms);
    let source = Box::new(ReplaySource::new(log));
    let report = run_detection(
        coordinator.clone(),
        session_id.clone(),
        source,
        frame_interval,
        None,
    )
    .await?;

    println!("\nDetection run finished");
    println!("  Frames:     {}", report.frames);
    println!("  Dispatched: {}", report.dispatched);
    println!("  Suppressed: {}", report.suppressed);
    println!("  Failed:     {}", report.failed);
    for frame in transport.frames() {
        println!("  -> {} {}", frame.destination, frame.body);
    }
    if let Some(snapshot) = coordinator.snapshot(&session_id)? {
        println!("{}", snapshot.status_line());
    }

    coordinator.unregister(&session_id)?;
    Ok(())
}

async fn run_start(config: &Config) -> anyhow::Result<()> {
    let client = GameClient::new(config.backend.api_base_url.clone())?;
    let snapshot = client.start_game().await?;
    println!("{}", snapshot.status_line());
    println!("Game id: {}", snapshot.game_id);
    Ok(())
}

async fn run_guess(direction: &str, game: &str, config: &Config) -> anyhow::Result<()> {
    let direction: GuessDirection = direction.parse()?;
    let client = GameClient::new(config.backend.api_base_url.clone())?;
    let snapshot = client.make_guess(game, direction).await?;
    if let Some(message) = &snapshot.message {
        println!("{}", message);
    }
    println!("{}", snapshot.status_line());
    Ok(())
}

async fn run_state(game: &str, config: &Config) -> anyhow::Result<()> {
    let client = GameClient::new(config.backend.api_base_url.clone())?;
    let snapshot = client.get_game(game).await?;
    println!("{}", snapshot.status_line());
    Ok(())
}

fn run_replay_info(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Observation log not found: {:?}", input);
    }
    let log = ObservationLog::load(input)?;
    let m = &log.metadata;
    println!("Log: {}", m.name);
    println!("  Id:             {}", m.id);
    println!("  Captured:       {}", m.started_at);
    println!("  Frames:         {}", log.len());
    println!("  Frame interval: {}ms", m.frame_interval_ms);
    println!("  Format version: {}", m.format_version);

    let with_hands = log.frames.iter().filter(|f| f.has_hands()).count();
    println!("  Frames with hands: {}", with_hands);
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    std::fs::create_dir_all(Cli::logs_dir())?;
    println!("Created logs directory: {:?}", Cli::logs_dir());

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => {
            let value = toml::from_str::<toml::Value>(&config.to_toml()?)
                .ok()
                .and_then(|root| lookup_value(&root, &key));
            match value {
                Some(v) => println!("{} = {}", key, v),
                None => anyhow::bail!("Configuration key '{}' not found", key),
            }
        }
        ConfigAction::Set { key, value } => {
            let config_path = Config::default_path();
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'gesture-bridge init' first.");
            }

            let content = std::fs::read_to_string(&config_path)?;
            let mut root: toml::Value = toml::from_str(&content)?;
            if !set_value(&mut root, &key, &value) {
                anyhow::bail!("Failed to set '{}'. Key may not exist in config.", key);
            }

            // Re-validate before persisting
            let updated: Config = root.try_into()?;
            updated.validate()?;
            updated.save(&config_path)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}

/// Look up a dotted key in a TOML document.
fn lookup_value(root: &toml::Value, key: &str) -> Option<toml::Value> {
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current.clone())
}

/// Set a dotted key in a TOML document, coercing the value to the type
/// already stored there. Returns false if the key does not exist.
fn set_value(root: &mut toml::Value, key: &str, value: &str) -> bool {
    let mut current = root;
    let parts: Vec<&str> = key.split('.').collect();
    let (leaf, path) = match parts.split_last() {
        Some(split) => split,
        None => return false,
    };

    for part in path {
        current = match current.get_mut(*part) {
            Some(v) => v,
            None => return false,
        };
    }
    let slot = match current.get_mut(*leaf) {
        Some(v) => v,
        None => return false,
    };

    *slot = match slot {
        toml::Value::Integer(_) => match value.parse::<i64>() {
            Ok(n) => toml::Value::Integer(n),
            Err(_) => return false,
        },
        toml::Value::Float(_) => match value.parse::<f64>() {
            Ok(n) => toml::Value::Float(n),
            Err(_) => return false,
        },
        toml::Value::Boolean(_) => match value.parse::<bool>() {
            Ok(b) => toml::Value::Boolean(b),
            Err(_) => return false,
        },
        _ => toml::Value::String(value.to_string()),
    };
    true
}
