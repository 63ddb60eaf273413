// ABOUTME: Entry point for the berth CLI application.
// ABOUTME: Resolves configuration, connects the control plane, and dispatches commands.

mod cli;
mod output;

use berth::config::{self, Config};
use berth::error::Result;
use berth::runtime::traits::LogOptions;
use berth::service::{self, ComposeQuery, ControlPlane, LogSink};
use berth::types::{ContainerId, ImageId, NetworkId, Source};
use clap::Parser;
use cli::{Cli, Commands};
use futures::StreamExt;
use output::{Output, OutputMode};
use std::env;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let out = Output::new(if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Normal
    });

    if let Err(e) = run(cli, &out).await {
        out.error(&e.to_string());
        std::process::exit(1);
    }
}

/// File config, then environment, then flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(&env::current_dir()?)?,
    };
    let mut config = config.with_env_overrides()?;

    if let Some(source) = &cli.source {
        config.source = source
            .parse::<Source>()
            .map_err(|e| berth::error::Error::InvalidConfig(e.to_string()))?;
    }
    if let Some(profile) = &cli.profile {
        config.bridge.profile = profile.clone();
        config.source = config.source.with_profile(Some(profile.clone()));
    }
    Ok(config)
}

async fn run(cli: Cli, out: &Output) -> Result<()> {
    if let Commands::Init { force } = &cli.command {
        let cwd = env::current_dir()?;
        config::init_config(&cwd, cli.source.as_deref(), cli.profile.as_deref(), *force)?;
        out.success(&format!("Created {}", config::CONFIG_FILENAME));
        return Ok(());
    }

    let config = resolve_config(&cli)?.to_source_config();

    if let Commands::Profiles = &cli.command {
        let profiles = service::list_profiles(&config).await?;
        out.lines(&profiles);
        return Ok(());
    }

    let plane = ControlPlane::connect(&config, Arc::new(LogSink)).await?;
    tracing::debug!(source = %plane.source(), "control plane ready");

    match cli.command {
        Commands::Init { .. } | Commands::Profiles => {}
        Commands::Ps { all } => out.containers(&plane.list_containers(all).await?),
        Commands::Get { id } => out.json(&plane.get_container(&ContainerId::from(id)).await?),
        Commands::Inspect { id } => {
            out.json(&plane.inspect_container(&ContainerId::from(id)).await?)
        }
        Commands::Start { id } => {
            plane.start_container(&ContainerId::from(id.as_str())).await?;
            out.success(&format!("Started {id}"));
        }
        Commands::Stop { id } => {
            plane.stop_container(&ContainerId::from(id.as_str())).await?;
            out.success(&format!("Stopped {id}"));
        }
        Commands::Restart { id } => {
            plane.restart_container(&ContainerId::from(id.as_str())).await?;
            out.success(&format!("Restarted {id}"));
        }
        Commands::Rm { id, force } => {
            plane.remove_container(&ContainerId::from(id.as_str()), force).await?;
            out.success(&format!("Removed container {id}"));
        }
        Commands::Logs {
            id,
            tail,
            follow,
            no_timestamps,
        } => {
            let opts = LogOptions {
                tail: Some(tail),
                timestamps: !no_timestamps,
                follow,
            };
            let id = ContainerId::from(id);
            if follow {
                let mut stream = plane.stream_logs(&id, &opts).await?;
                let mut stdout = std::io::stdout();
                while let Some(chunk) = stream.next().await {
                    stdout.write_all(chunk?.as_bytes())?;
                    stdout.flush()?;
                }
            } else {
                print!("{}", plane.fetch_logs(&id, &opts).await?);
            }
        }
        Commands::Stats { id } => {
            let stats = plane.container_stats(&ContainerId::from(id)).await?;
            if out.is_json() {
                out.json(&stats);
            } else {
                println!(
                    "CPU {:.2}%  MEM {} / {} ({:.2}%)  NET {} / {}  BLOCK {} / {}",
                    stats.cpu_percent,
                    stats.memory_usage,
                    stats.memory_limit,
                    stats.memory_percent,
                    stats.network_rx,
                    stats.network_tx,
                    stats.block_read,
                    stats.block_write
                );
            }
        }
        Commands::Ls { id, path } => {
            out.files(&plane.list_files(&ContainerId::from(id), &path).await?)
        }
        Commands::Cp { id, path, output } => {
            let archive = plane.download_file(&ContainerId::from(id), &path).await?;
            match output {
                Some(file) => tokio::fs::write(&file, &archive).await?,
                None => std::io::stdout().write_all(&archive)?,
            }
        }
        Commands::Exec { id, command } => {
            let result = plane.exec(&ContainerId::from(id), &command.join(" ")).await?;
            if out.is_json() {
                out.json(&result);
            } else {
                print!("{}", result.output);
            }
        }
        Commands::Images => out.images(&plane.list_images().await?),
        Commands::Rmi { id, force } => {
            plane.remove_image(&ImageId::from(id.as_str()), force).await?;
            out.success(&format!("Removed image {id}"));
        }
        Commands::Volumes => out.volumes(&plane.list_volumes().await?),
        Commands::VolumeRm { name, force } => {
            plane.remove_volume(&name, force).await?;
            out.success(&format!("Removed volume {name}"));
        }
        Commands::Networks => out.networks(&plane.list_networks().await?),
        Commands::NetworkRm { id } => {
            plane.remove_network(&NetworkId::from(id.as_str())).await?;
            out.success(&format!("Removed network {id}"));
        }
        Commands::Compose {
            project,
            working_dir,
            config_files,
        } => {
            let query = ComposeQuery {
                project_name: project,
                working_dir,
                config_files,
            };
            let file = plane.compose_file(&query).await?;
            if out.is_json() {
                out.json(&file);
            } else {
                eprintln!("# {}", file.file_path);
                print!("{}", file.content);
            }
        }
        Commands::Info => out.json(&plane.engine_info().await?),
        Commands::Run { command } => {
            let result = plane.run_command(&command).await?;
            if out.is_json() {
                out.json(&result);
            } else {
                print!("{}", result.output);
                if !result.success {
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
