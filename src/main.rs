use anyhow::{Context, Result};
use std::{env, path::PathBuf, sync::Arc};
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::Notify,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use vaccination_tracker::{
    config::{Config, OutputFormat, ENV_CONFIG},
    fetch::HttpFetcher,
    tracker::scheduler::{spawn_recompute_task, spawn_refresh_task},
    Snapshot, Tracker,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) load config ──────────────────────────────────────────────
    // usage: vaccination-tracker [CONFIG.yaml]
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var(ENV_CONFIG).ok())
        .map(PathBuf::from);
    let cfg = Config::load(config_path.as_deref()).context("loading configuration")?;
    info!(
        feed = %cfg.feed_url,
        refresh_secs = cfg.refresh_interval_secs,
        recompute_secs = cfg.recompute_interval_secs,
        timeout_secs = cfg.request_timeout_secs,
        location = %cfg.location,
        "startup"
    );

    // ─── 3) spawn refresh + recompute tasks ──────────────────────────
    let tracker = Arc::new(Tracker::with_location(cfg.location.clone()));
    let fetcher = Arc::new(HttpFetcher::with_timeout(cfg.request_timeout())?);
    let updated = Arc::new(Notify::new());

    let refresh = spawn_refresh_task(
        Arc::clone(&tracker),
        fetcher,
        cfg.feed_url.clone(),
        cfg.refresh_interval(),
        Arc::clone(&updated),
    );
    let (live, output) = (cfg.estimate_live, cfg.output);
    let recompute = spawn_recompute_task(
        Arc::clone(&tracker),
        cfg.recompute_interval(),
        updated,
        move |snap| render(&snap, live, output),
    );

    // ─── 4) read location commands until quit ────────────────────────
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(cmd)) => {
                    if !handle_command(&tracker, cmd.trim(), live, output) {
                        break;
                    }
                }
                Ok(None) => {
                    // stdin closed: keep running until Ctrl-C
                    tokio::signal::ctrl_c().await?;
                    break;
                }
                Err(e) => {
                    error!("reading stdin: {}", e);
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    refresh.abort();
    recompute.abort();
    info!("shutdown");
    Ok(())
}

/// Returns false when the user asked to quit.
fn handle_command(tracker: &Tracker, cmd: &str, live: bool, output: OutputFormat) -> bool {
    match cmd {
        "" => {}
        "quit" | "exit" => return false,
        "?" => {
            for loc in tracker.sorted_locations() {
                println!("{}", loc);
            }
        }
        name => {
            tracker.change_location(name);
            render(&tracker.snapshot(), live, output);
        }
    }
    true
}

fn render(snap: &Snapshot, live: bool, output: OutputFormat) {
    match output {
        OutputFormat::Json => match serde_json::to_string(snap) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("encoding snapshot: {}", e),
        },
        OutputFormat::Text => {
            println!("[{}] {}", snap.location, snap.headline(live));
            for line in snap.lines() {
                println!("  {}", line);
            }
        }
    }
}
