mod animation;
mod car;
mod character;
mod collision;
mod components;
mod config;
mod input_handler;
mod registry;
mod render;
mod replay;
mod scene;
mod world;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use animation::AnimationLibrary;
use registry::GameState;
use replay::load_replay_from_path;
use scene::{load_scene_from_path, spawn_scene, validate_scene_clips};
use world::{build_world, run_replay, RunSummary};

const DEFAULT_SCENE_PATH: &str = "assets/scenes/level1.json";
const DEFAULT_REPLAY_PATH: &str = "assets/replays/level1_run.json";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let scene_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE_PATH));
    let replay_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPLAY_PATH));

    match run(&scene_path, &replay_path) {
        Ok(summary) => {
            let outcome = match summary.state {
                GameState::Win => "won",
                GameState::Lose => "lost",
                GameState::InProgress => "still in progress",
            };
            log::info!(
                "Run finished after {} frame(s): game {}, score {}",
                summary.frames,
                outcome,
                summary.score
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(scene_path: &Path, replay_path: &Path) -> Result<RunSummary, String> {
    let scene = load_scene_from_path(scene_path)?;
    log::info!("Loaded scene '{}' from {}", scene.scene_id, scene_path.display());

    // Animation files are listed relative to the scene file.
    let scene_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));
    let mut library = AnimationLibrary::new();
    for file in &scene.animation_files {
        library.load_file(&scene_dir.join(file))?;
    }
    validate_scene_clips(&scene, &library)?;
    log::info!("Animation library holds {} clip(s)", library.clip_count());

    let replay = load_replay_from_path(replay_path)?;
    log::info!(
        "Loaded replay {} ({} frame entries, dt {:.4}s)",
        replay_path.display(),
        replay.frames.len(),
        replay.fixed_dt
    );

    let mut ctx = build_world(scene.config);
    spawn_scene(&mut ctx, &scene, &library).map_err(|e| format!("Scene spawn failed: {e}"))?;
    let summary = run_replay(&mut ctx, &replay)
        .map_err(|e| format!("Frame {} failed: {e}", ctx.frame_count()))?;

    for item in &ctx.registry.draw_list {
        log::debug!(
            "draw {} model {} at {:?}",
            item.entity,
            item.model_index,
            item.mat.w_axis.truncate()
        );
    }
    Ok(summary)
}
