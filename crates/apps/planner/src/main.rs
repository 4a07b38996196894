mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use formats::chat_output::ChatHistoryOutput;
use formats::extract::extract_summary;
use foundation::geo::LngLat;
use map_view::{CameraView, HeadlessMap, MapSurface, Marker};
use session::{HttpChatHistory, Session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{MarkerArg, PlannerConfig, parse_marker};

#[derive(Parser, Debug)]
#[command(author, version, about = "Trip planner: chat summary import and map animation")]
struct Args {
    /// Chat-history service base URL (default: $CHAT_HISTORY_URL or http://localhost:8000)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the trip summary of a group chat and print the filled form
    Import {
        /// Human-readable group name
        #[arg(long)]
        group: String,

        /// Requesting user id (default: $PLANNER_USER_ID)
        #[arg(long)]
        user: Option<String>,
    },

    /// Extract a summary from a saved chat-history result
    Extract {
        /// File holding raw text or a JSON array of fragments
        path: PathBuf,
    },

    /// Run a headless generation animation and print its trace
    Simulate {
        /// How long generation runs before it is stopped
        #[arg(long, default_value_t = 8000)]
        generate_ms: u64,

        /// Map marker, NAME:LON,LAT (repeatable)
        #[arg(long = "marker", value_parser = parse_marker)]
        markers: Vec<MarkerArg>,
    },

    /// Probe the chat-history service
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = PlannerConfig::from_env();

    match args.command {
        Command::Import { group, user } => {
            let user = user.unwrap_or_else(|| config.user_id.clone());
            import(&config, args.url, &group, &user).await
        }
        Command::Extract { path } => extract(&path).await,
        Command::Simulate {
            generate_ms,
            markers,
        } => {
            simulate(&config, generate_ms, markers);
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => health(&config, args.url).await,
    }
}

async fn import(
    config: &PlannerConfig,
    url: Option<String>,
    group: &str,
    user: &str,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = HttpChatHistory::new(config.http(url))?;
    let mut session: Session<HeadlessMap> = Session::new(config.animation, config.frame_ms);

    match session.import_summary(&source, group, user).await {
        Ok(_) => {
            println!("{}", serde_json::to_string_pretty(session.form())?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!("import failed: {err}");
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn extract(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let output = match serde_json::from_str::<Vec<String>>(&text) {
        Ok(fragments) => ChatHistoryOutput::Fragments(fragments),
        Err(_) => ChatHistoryOutput::Text(text),
    };

    match extract_summary(&output) {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn simulate(config: &PlannerConfig, generate_ms: u64, markers: Vec<MarkerArg>) {
    let start = markers
        .first()
        .map(|m| CameraView::new(m.position, 5.0, 0.0))
        .unwrap_or_else(|| CameraView::new(LngLat::new(0.0, 20.0), 3.0, 0.0));
    let map = HeadlessMap::new(start).with_markers(
        markers
            .into_iter()
            .map(|m| Marker::new(m.name, m.position)),
    );
    let mut session = Session::with_map(config.animation, config.frame_ms, map);

    session.start_generation();
    let began = session.frame().time;
    let mut reported = 0u64;
    loop {
        let elapsed = session.frame().time.since(began);
        if elapsed >= generate_ms {
            break;
        }
        let percent = elapsed.saturating_mul(100) / generate_ms.max(1);
        session.set_progress(percent as f64);
        if percent >= reported + 25 {
            reported = percent - percent % 25;
            info!(progress = reported, "generation progress");
        }
        session.advance_frame();
    }
    session.stop_generation();

    let budget = config.animation.return_ms / config.frame_ms.max(1) + 2;
    if !session.run_until_idle(budget) {
        error!(phase = ?session.phase(), "animation did not settle");
    }

    for event in session.controller().trace().iter() {
        println!(
            "frame {:>6}  t={:>7}ms  {:<12} {}",
            event.frame_index,
            event.time.as_ms(),
            event.kind,
            event.message
        );
    }
    if let Some(map) = session.map() {
        let camera = map.camera();
        println!(
            "final camera: center=({:.4}, {:.4}) zoom={:.2} bearing={:.1}; markers visible: {}",
            camera.center.lon,
            camera.center.lat,
            camera.zoom,
            camera.bearing,
            map.all_markers_visible()
        );
    }
    println!(
        "rotation ticks: {}",
        session.controller().rotation_ticks()
    );
    session.end();
}

async fn health(
    config: &PlannerConfig,
    url: Option<String>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = HttpChatHistory::new(config.http(url))?;
    match client.health().await {
        Ok(status) => {
            println!("{}: {status}", client.base_url());
            Ok(if status == "healthy" {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(err) => {
            eprintln!("{}: {err}", client.base_url());
            Ok(ExitCode::FAILURE)
        }
    }
}
