use anyhow::Context;
use block_scene::{BlockSceneApp, SceneConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = SceneConfig::from_env();
    log::info!("Loading textures from {:?}", config.assets.directory);

    BlockSceneApp::new(config)
        .and_then(BlockSceneApp::run)
        .context("block scene exited with an error")?;
    Ok(())
}
