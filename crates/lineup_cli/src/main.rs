//! Lineup CLI
//!
//! 템플릿 조회, 로스터 생성, 재생 시뮬레이션

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use lineup_core::config::{load_config_from_env, PlaybackConfig};
use lineup_core::playback::{Clock, ManualClock, Millis, PlaybackEvent, PlaybackPhase, SystemClock};
use lineup_core::{
    dto_schemas_json, templates_json, PresentationSession, ProjectData, SessionSnapshot,
    SCHEMA_VERSION, TEMPLATE_CATALOG,
};

#[derive(Parser)]
#[command(name = "lineup_cli")]
#[command(about = "Inspect templates and simulate lineup presentations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the template catalog
    Templates,

    /// Print the filled roster of a project
    Roster {
        /// Project JSON file
        #[arg(long)]
        project: PathBuf,

        /// Locale for placeholder names
        #[arg(long)]
        locale: Option<String>,
    },

    /// Play a project to the end, one JSON frame per change
    Play {
        /// Project JSON file
        #[arg(long)]
        project: PathBuf,

        /// Playback config JSON (defaults to $LINEUP_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Clock step between ticks
        #[arg(long, default_value = "250")]
        step_ms: Millis,

        /// Run on the wall clock, sleeping between ticks, instead of simulating
        #[arg(long, default_value = "false")]
        realtime: bool,

        /// Acknowledge each group's entrance animation as soon as it is shown
        #[arg(long, default_value = "false")]
        animate: bool,
    },

    /// Print JSON schemas for the roster-source DTOs
    Schema,
}

#[derive(Debug, Serialize)]
struct Frame {
    at_ms: Millis,
    events: Vec<PlaybackEvent>,
    snapshot: SessionSnapshot,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Templates => {
            let json = templates_json().map_err(anyhow::Error::msg)?;
            println!("{}", json);
        }
        Commands::Roster { project, locale } => {
            let project = load_project(&project)?;
            let request = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "project": project,
                "locale": locale,
            });
            let json = lineup_core::roster_json(&request.to_string()).map_err(anyhow::Error::msg)?;
            println!("{}", json);
        }
        Commands::Play { project, config, step_ms, realtime, animate } => {
            let project = load_project(&project)?;
            let config = load_config(config.as_deref())?;
            let count = if realtime {
                let mut count = 0;
                play_realtime(&project, &config, step_ms, animate, |frame| {
                    count += 1;
                    match serde_json::to_string(&frame) {
                        Ok(json) => println!("{}", json),
                        Err(e) => log::error!("Failed to serialize frame: {}", e),
                    }
                })?;
                count
            } else {
                let frames = simulate(&project, &config, step_ms, animate)?;
                for frame in &frames {
                    println!("{}", serde_json::to_string(frame)?);
                }
                frames.len()
            };
            eprintln!("{} frames", count);
        }
        Commands::Schema => {
            let json = dto_schemas_json().map_err(anyhow::Error::msg)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn load_project(path: &Path) -> Result<ProjectData> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read project {}", path.display()))?;
    let project: ProjectData =
        serde_json::from_str(&content).with_context(|| format!("Invalid project JSON in {}", path.display()))?;
    if project.is_stale(Utc::now()) {
        log::warn!("Project {} has not been opened since {}", project.id, project.last_accessed_at);
    }
    Ok(project)
}

fn load_config(path: Option<&Path>) -> Result<PlaybackConfig> {
    let config = match path {
        Some(path) => PlaybackConfig::load_from_path(path)?,
        None => load_config_from_env()?,
    };
    Ok(config)
}

/// Run one full presentation on a simulated clock and collect a frame for
/// every state change
fn simulate(project: &ProjectData, config: &PlaybackConfig, step_ms: Millis, animate: bool) -> Result<Vec<Frame>> {
    let clock = ManualClock::new();
    let mut session =
        PresentationSession::from_project(project, &TEMPLATE_CATALOG, config, Box::new(clock.clone()))?;

    let mut frames = Vec::new();
    drive(&mut session, &clock, config, step_ms, animate, |ms| clock.advance(ms), |frame| frames.push(frame))?;
    Ok(frames)
}

/// Same run on the wall clock; frames are emitted as they happen
fn play_realtime(
    project: &ProjectData,
    config: &PlaybackConfig,
    step_ms: Millis,
    animate: bool,
    emit: impl FnMut(Frame),
) -> Result<()> {
    let clock = SystemClock::new();
    let mut session =
        PresentationSession::from_project(project, &TEMPLATE_CATALOG, config, Box::new(clock.clone()))?;

    drive(&mut session, &clock, config, step_ms, animate, |ms| thread::sleep(Duration::from_millis(ms)), emit)
}

fn drive(
    session: &mut PresentationSession,
    clock: &dyn Clock,
    config: &PlaybackConfig,
    step_ms: Millis,
    animate: bool,
    mut wait: impl FnMut(Millis),
    mut emit: impl FnMut(Frame),
) -> Result<()> {
    if step_ms == 0 {
        bail!("--step-ms must be positive");
    }

    // Upper bound: every slot plus the final hold, with slack for rounding
    let total_ms = config.advance_interval_ms * (session.roster().len() as Millis + 2);
    let max_steps = total_ms / step_ms + 1;

    let events = session.play();
    if events.is_empty() {
        log::warn!("Nothing to play for template {}", session.template().id);
        return Ok(());
    }
    acknowledge(session, animate);
    emit(Frame { at_ms: clock.now_ms(), events, snapshot: session.snapshot()? });

    for _ in 0..max_steps {
        wait(step_ms);
        let events = session.tick();
        if events.is_empty() {
            continue;
        }
        acknowledge(session, animate);
        emit(Frame { at_ms: clock.now_ms(), events, snapshot: session.snapshot()? });
        if session.phase() == PlaybackPhase::Stopped {
            break;
        }
    }

    session.teardown();
    Ok(())
}

fn acknowledge(session: &mut PresentationSession, animate: bool) {
    if !animate {
        return;
    }
    if let Some(group) = session.current_group() {
        session.animation_completed(group);
    }
}
