use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use vitrine_core::VitrineConfig;
use vitrine_profiler::{ProfilerServer, ProfilerStore, ServerEvent};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the request profiler dashboard
    Profile {
        /// Port to serve on (defaults to VITRINE_PROFILER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Replay a recorded NDJSON event log into the store before serving
        #[arg(short, long)]
        replay: Option<PathBuf>,

        /// Keep replayed navigations instead of clearing per main request
        #[arg(long)]
        preserve_log: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let config = VitrineConfig::from_env();

    match cli.command {
        Commands::Profile {
            port,
            replay,
            preserve_log,
        } => {
            let port = port.unwrap_or(config.profiler_port);
            let store = Arc::new(ProfilerStore::default());
            if preserve_log {
                store.set_preserve_log(true);
            }

            if let Some(path) = replay {
                let count = replay_events(&store, &path)
                    .with_context(|| format!("Failed to replay event log {path:?}"))?;
                info!("Replayed {count} events from {path:?}");
            }

            info!("Starting profiler dashboard on port {port}");
            ProfilerServer::new(store)
                .start(port)
                .await
                .context("Profiler server failed")?;
        }
    }

    Ok(())
}

/// Replay an NDJSON event log into the store. Lines that do not decode are
/// skipped with a warning so a partially written log still replays.
fn replay_events(store: &ProfilerStore, path: &PathBuf) -> Result<usize> {
    let contents = std::fs::read_to_string(path)?;
    let mut count = 0;

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ServerEvent>(line) {
            Ok(event) => {
                store.record(event);
                count += 1;
            }
            Err(err) => warn!("Skipping line {}: {err}", number + 1),
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_skips_bad_lines() {
        let dir = std::env::temp_dir();
        let path = dir.join("vitrine-replay-test.ndjson");
        std::fs::write(
            &path,
            concat!(
                r#"{"id":"a","requestId":"a","url":"https://shop.example/"}"#,
                "\n",
                "not json\n",
                r#"{"id":"a1","requestId":"a","url":"https://api.example/q"}"#,
                "\n",
            ),
        )
        .unwrap();

        let store = ProfilerStore::default();
        store.set_preserve_log(true);
        let count = replay_events(&store, &path).unwrap();
        assert_eq!(count, 2);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.main_requests.len(), 1);
        assert_eq!(snapshot.sub_requests.len(), 1);
        std::fs::remove_file(&path).ok();
    }
}
