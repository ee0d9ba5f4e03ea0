use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vp_core::{
    ArenaSpec, GameMode, PathResult, PlayerId, Pos, Session, VpConfig, VpProfile, decide, find_path,
    find_path_adjacent, generate_arena, reachable_destinations,
};

#[derive(Parser)]
#[command(author, version, about = "Inspect virtual player planning over a session snapshot", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct Snapshot {
    /// Path to the session snapshot JSON file
    #[arg(short, long)]
    session: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a virtual player's turn and print the decision
    Decide {
        #[command(flatten)]
        snapshot: Snapshot,
        #[arg(long)]
        vp: u32,
        /// Built-in profile; defaults to the player's own profile, then offensive
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
        /// TOML profile file; overrides --profile
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print only the actions payable this turn
        #[arg(long)]
        turn_only: bool,
    },
    /// Cheapest path between two cells, as `y,x`
    Path {
        #[command(flatten)]
        snapshot: Snapshot,
        #[arg(long, value_parser = parse_pos)]
        from: Pos,
        #[arg(long, value_parser = parse_pos)]
        to: Pos,
        #[arg(long, default_value_t = 6)]
        movement: u32,
        #[arg(long, default_value_t = 1)]
        actions: u32,
        /// Stop next to the target instead of on it
        #[arg(long)]
        adjacent: bool,
    },
    /// Every cell a player can end its turn on
    Reach {
        #[command(flatten)]
        snapshot: Snapshot,
        #[arg(long)]
        vp: u32,
    },
    /// Print a generated arena snapshot
    Generate {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 16)]
        width: usize,
        #[arg(long, default_value_t = 12)]
        height: usize,
        #[arg(long, default_value_t = 4)]
        players: u32,
        #[arg(long)]
        capture_the_flag: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Offensive,
    Defensive,
}

impl From<ProfileArg> for VpProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Offensive => VpProfile::Offensive,
            ProfileArg::Defensive => VpProfile::Defensive,
        }
    }
}

fn parse_pos(text: &str) -> Result<Pos, String> {
    let (y, x) = text.split_once(',').ok_or_else(|| format!("expected `y,x`, got {text:?}"))?;
    let y = y.trim().parse().map_err(|err| format!("bad row {y:?}: {err}"))?;
    let x = x.trim().parse().map_err(|err| format!("bad column {x:?}: {err}"))?;
    Ok(Pos::new(y, x))
}

fn load_session(path: &Path) -> Result<Session> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let session = Session::from_json(&data).with_context(|| "Failed to deserialize session JSON")?;
    session.validate().with_context(|| format!("Session {} is inconsistent", path.display()))?;
    Ok(session)
}

fn resolve_config(
    session: &Session,
    vp: PlayerId,
    profile: Option<ProfileArg>,
    config: Option<&Path>,
) -> Result<VpConfig> {
    if let Some(path) = config {
        return VpConfig::load(path).with_context(|| format!("Failed to load profile {}", path.display()));
    }
    let profile = profile
        .map(VpProfile::from)
        .or_else(|| session.player(vp).and_then(|player| player.profile))
        .unwrap_or(VpProfile::Offensive);
    Ok(profile.config())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match Args::parse().command {
        Command::Decide { snapshot, vp, profile, config, turn_only } => {
            let session = load_session(&snapshot.session)?;
            let vp = PlayerId(vp);
            if session.player(vp).is_none() {
                bail!("player {} is not in the session", vp.0);
            }
            let config = resolve_config(&session, vp, profile, config.as_deref())?;
            let decision = decide(&session, vp, &config).context("Decision failed")?;
            if turn_only {
                let actions = decision.turn_actions(&session, vp).context("Planned route does not replay")?;
                print_json(&actions)
            } else {
                print_json(&decision)
            }
        }
        Command::Path { snapshot, from, to, movement, actions, adjacent } => {
            let session = load_session(&snapshot.session)?;
            if !session.grid.in_bounds(from) {
                bail!("origin {from:?} lies outside the grid");
            }
            let path = if adjacent {
                find_path_adjacent(&session, from, to, movement, actions)
            } else {
                find_path(&session, from, to, movement, actions)
            };
            print_json(&path)
        }
        Command::Reach { snapshot, vp } => {
            let session = load_session(&snapshot.session)?;
            let Some(player) = session.player(PlayerId(vp)) else {
                bail!("player {vp} is not in the session");
            };
            let reach: Vec<PathResult> =
                reachable_destinations(&session, player.position, player.movement_points, player.actions_remaining)
                    .into_values()
                    .collect();
            tracing::info!(destinations = reach.len(), "reachable set computed");
            print_json(&reach)
        }
        Command::Generate { seed, width, height, players, capture_the_flag } => {
            if width < 5 || height < 5 {
                bail!("arena must be at least 5x5");
            }
            let mode = if capture_the_flag { GameMode::CaptureTheFlag } else { GameMode::Classic };
            let flags = if capture_the_flag { 2 } else { 0 };
            let spec = ArenaSpec { width, height, players, mode, flags, ..ArenaSpec::default() };
            print_json(&generate_arena(seed, spec))
        }
    }
}
