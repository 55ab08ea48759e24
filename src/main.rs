//! Frost Vault entry point
//!
//! Loads a stage, plays it from a move script or with the demo pilot, and
//! prints the final board.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use frost_vault::demo::DemoPilot;
use frost_vault::input::{Button, raw_levels};
use frost_vault::sim::Tilemap;
use frost_vault::{Session, Settings};

const USAGE: &str =
    "usage: frost-vault <stage.json|stage.txt> [--moves LRUDA..] [--demo SEED] [--frames N] [--settings FILE]";

/// Demo length when `--frames` is not given
const DEFAULT_DEMO_FRAMES: u64 = 600;
/// Upper bound on frames spent waiting for one scripted move to settle
const SETTLE_LIMIT: u32 = 10_000;

#[derive(Debug, Default)]
struct Args {
    stage: PathBuf,
    moves: Option<String>,
    demo: Option<u64>,
    frames: Option<u64>,
    settings: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut stage = None;
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "--moves" => parsed.moves = Some(value("--moves")?),
            "--demo" => {
                let seed = value("--demo")?;
                parsed.demo = Some(seed.parse().map_err(|e| format!("bad seed {:?}: {}", seed, e))?);
            }
            "--frames" => {
                let n = value("--frames")?;
                parsed.frames = Some(n.parse().map_err(|e| format!("bad frame count {:?}: {}", n, e))?);
            }
            "--settings" => parsed.settings = Some(PathBuf::from(value("--settings")?)),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            path if stage.is_none() => stage = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument {}", extra)),
        }
    }
    parsed.stage = stage.ok_or("missing stage file")?;
    Ok(parsed)
}

fn button_for(c: char) -> Option<Button> {
    match c.to_ascii_uppercase() {
        'L' => Some(Button::Left),
        'R' => Some(Button::Right),
        'U' => Some(Button::Up),
        'D' => Some(Button::Down),
        'A' => Some(Button::Action),
        _ => None,
    }
}

/// Press each scripted button once and wait for the stage to settle
fn play_script(session: &mut Session, moves: &str) {
    for c in moves.chars().filter(|c| !c.is_whitespace()) {
        let Some(button) = button_for(c) else {
            log::warn!("Skipping unknown move {:?}", c);
            continue;
        };
        session.frame(raw_levels(&[button]));
        let mut waited = 0;
        while !(session.stage().player.is_idle() && !session.stage().is_latched()) {
            if waited == SETTLE_LIMIT {
                log::warn!("Stage did not settle after move {:?}", c);
                break;
            }
            session.frame(raw_levels(&[]));
            waited += 1;
        }
        if session.cleared() {
            break;
        }
    }
}

fn play_demo(session: &mut Session, seed: u64, frames: u64) {
    let mut pilot = DemoPilot::new(seed);
    for _ in 0..frames {
        session.frame(pilot.next_levels());
        if session.cleared() {
            break;
        }
    }
}

fn run(args: Args) -> Result<(), frost_vault::sim::LoadError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let map = Tilemap::load(Path::new(&args.stage))?;
    let mut session = Session::text(&map, &settings)?;

    if let Some(moves) = &args.moves {
        play_script(&mut session, moves);
    }
    if let Some(seed) = args.demo {
        play_demo(&mut session, seed, args.frames.unwrap_or(DEFAULT_DEMO_FRAMES));
    } else if let Some(frames) = args.frames {
        for _ in 0..frames {
            session.frame(raw_levels(&[]));
        }
    }

    print!("{}", session.renderer().text());
    println!("{}", session.hud().line());
    if session.cleared() {
        println!("Stage cleared in {} frames", session.frames());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };
    log::info!("Frost Vault starting with {}", args.stage.display());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Failed to load stage: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
