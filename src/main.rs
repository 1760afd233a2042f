mod cli;

use signage_agent::{agent::Agent, config};
use signage_player::{check_tool, require_tool, LaunchStrategy, MpvVersion, Playback, Player};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

async fn run_agent(
    config_path: Option<&Path>,
    authority_url: Option<String>,
    cache_dir: Option<PathBuf>,
) -> Result<()> {
    let overrides = config::ConfigOverrides {
        authority_url,
        cache_dir,
    };
    let config = config::load_config_with_overrides(config_path, &overrides)?;

    tracing::info!("Starting signage agent");
    tracing::info!("Authority: {}", config.authority.url);
    tracing::info!("Media cache: {:?}", config.agent.cache_dir);

    let player = Player::new(config.player.clone());
    let agent = Agent::new(&config, player);

    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let agent_handle = tokio::spawn(agent.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down...");
    let _ = shutdown_tx.send(()).await;
    agent_handle.await.context("Agent task failed")?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "signage_agent=trace,signage_player=trace".to_string()
        } else {
            "signage_agent=info,signage_player=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Run {
            authority_url,
            cache_dir,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_agent(cli.config.as_deref(), authority_url, cache_dir))
        }
        Commands::ProbePlayer => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_player(cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("signage-agent {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn probe_player(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let program = require_tool(&config.player.program)?;
    println!("Using player {}", program.display());

    let mut player = Player::new(config.player);

    player.start().await.context("Failed to start player")?;
    println!(
        "Player started in mode {}",
        player.active_mode().unwrap_or("unknown")
    );

    match player.version().await {
        Some(version) => println!("Player version: {}", version),
        None => println!("Player did not answer on {:?}", player.ipc_path()),
    }

    player.stop().await;
    println!("Player stopped");
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tool = check_tool(&config.player.program);
    let status = if tool.available() && !tool.too_old() { "✓" } else { "✗" };
    print!("{} {}", status, tool.program);

    match (tool.version, tool.banner.as_deref()) {
        (Some(version), _) => print!(" ({})", version),
        (None, Some(banner)) => print!(" ({})", banner),
        (None, None) => {}
    }

    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }

    println!();
    println!();
    if !tool.available() {
        println!("The player is missing. Install it or set player.program in the config.");
    } else if tool.too_old() {
        println!(
            "The player is too old for JSON IPC. Install mpv {} or newer.",
            MpvVersion::MIN_JSON_IPC
        );
    } else {
        println!("All required tools are available!");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, searching default locations");
            config::load_config_or_default(None)?
        }
    };

    let launch = match config.player.launch {
        LaunchStrategy::Auto => format!("auto ({:?})", config.player.launch.resolve()).to_lowercase(),
        other => format!("{:?}", other).to_lowercase(),
    };

    println!("  Authority: {}", config.authority.url);
    println!("  Poll interval: {} ms", config.agent.poll_interval_ms);
    println!("  Media cache: {}", config.agent.cache_dir.display());
    println!("  Player: {}", config.player.program);
    println!("  Launch: {}", launch);
    println!(
        "  Profiles: {}",
        config
            .player
            .profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
