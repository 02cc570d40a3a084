use anyhow::Result;
use galaxy_scene::{GalaxyApp, SceneConfig};
use log::warn;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "scene.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SceneConfig::load(&path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => SceneConfig::load(DEFAULT_CONFIG)?,
        None => {
            warn!("No {DEFAULT_CONFIG} found, using built-in defaults");
            SceneConfig::default()
        }
    };

    GalaxyApp::new(config)?.run()
}
