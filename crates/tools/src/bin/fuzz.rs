use std::io;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;
use vp_core::vp::TargetCategory;
use vp_core::{ArenaSpec, GameMode, Session, VpProfile, decide, generate_arena, replay_actions};

#[derive(Parser)]
#[command(author, version, about = "Plan every player's turn on random arenas and check the plans", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    arenas: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_spec(rng: &mut ChaCha8Rng) -> ArenaSpec {
    let mode = choose(rng, &[GameMode::Classic, GameMode::CaptureTheFlag]);
    ArenaSpec {
        width: choose(rng, &[8, 12, 16, 24]),
        height: choose(rng, &[6, 10, 14]),
        mode,
        players: choose(rng, &[2, 3, 4, 6]),
        wall_percent: choose(rng, &[0, 8, 15, 25]),
        lakes: choose(rng, &[0, 1, 2]),
        ice_tiles: choose(rng, &[0, 4, 10]),
        doors: choose(rng, &[0, 2, 5]),
        teleport_pairs: choose(rng, &[0, 1, 3]),
        heal_sanctuaries: choose(rng, &[0, 1, 2]),
        fight_sanctuaries: choose(rng, &[0, 1, 2]),
        flags: if mode == GameMode::CaptureTheFlag { 2 } else { 0 },
    }
}

fn check_arena(session: &Session, arena_seed: u64) -> Result<u32> {
    let mut targets = 0;
    for player in &session.players {
        let config = player.profile.unwrap_or(VpProfile::Offensive).config();
        let decision = decide(session, player.id, &config)
            .with_context(|| format!("arena {arena_seed}: decision failed for {:?}", player.id))?;
        let Some(target) = &decision.target else {
            continue;
        };
        targets += 1;

        let path = &target.path;
        if path.actions_required > player.actions_remaining {
            bail!("arena {arena_seed}: {:?} plans more actions than it has", player.id);
        }
        let replay = replay_actions(session, player.position, &path.actions)
            .with_context(|| format!("arena {arena_seed}: plan for {:?} does not replay", player.id))?;
        if replay.position != path.destination || replay.movement_spent != path.total_cost {
            bail!("arena {arena_seed}: replay for {:?} disagrees with the plan", player.id);
        }
        if decision.use_double_action && target.objective.category() != TargetCategory::FightSanctuary {
            bail!("arena {arena_seed}: double action drawn for a non-sanctuary target");
        }

        let now = decision.turn_actions(session, player.id)?;
        let spent = replay_actions(session, player.position, &now)?;
        if spent.movement_spent > player.movement_points || spent.actions_spent > player.actions_remaining {
            bail!("arena {arena_seed}: turn slice for {:?} overspends", player.id);
        }
    }
    Ok(targets)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    println!("Starting planning fuzz on seed {} over {} arenas...", args.seed, args.arenas);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut targets = 0u32;
    for _ in 0..args.arenas {
        let arena_seed = rng.next_u64();
        let spec = random_spec(&mut rng);
        let session = generate_arena(arena_seed, spec);
        targets += check_arena(&session, arena_seed)?;
    }

    println!("Fuzzing completed successfully: {targets} targets planned and replayed.");
    Ok(())
}
