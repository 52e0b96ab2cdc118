use std::path::Path;

use anyhow::Context as _;
use app::AppConfig;
use clap::Parser;
use prism_scene::Scene;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod game;
mod hud;
mod sounds;
mod tuning;

use game::{GameApp, WINDOW_TITLE};

/// Path-traced first-person sandbox.
#[derive(Parser, Debug)]
#[command(name = "prism")]
struct Cli {
    /// Scene to load from res/scenes, without the .scene extension
    #[arg(long, default_value = "playground")]
    scene: String,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Start in fly mode
    #[arg(long)]
    fly: bool,

    /// Smooth the camera toward its look target
    #[arg(long)]
    cinematic: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let scene_path = Path::new("res/scenes").join(format!("{}.scene", cli.scene));
    let scene = Scene::parse(&scene_path)
        .with_context(|| format!("loading scene {}", scene_path.display()))?;

    info!(
        scene = %scene_path.display(),
        materials = scene.materials.len(),
        blocks = scene.blocks.len(),
        spheres = scene.spheres.len(),
        "scene loaded"
    );

    let game = GameApp::new(scene, cli.fly, cli.cinematic);
    app::run_app(
        game,
        AppConfig::new(WINDOW_TITLE).with_size(cli.width, cli.height),
    );

    Ok(())
}
