use anyhow::Result;

use ember_engine::device::GpuInit;
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::pool::PoolConfig;
use ember_engine::render::RendererConfig;
use ember_engine::paint::Color;
use ember_engine::window::{Runtime, RuntimeConfig};

mod app;
mod entities;
mod pools;
mod textures;
mod world;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "ember arcade".to_string(),
        renderer: RendererConfig {
            clear_color: Color::rgb(0.05, 0.05, 0.08),
            ..RendererConfig::default()
        },
        ..RuntimeConfig::default()
    };

    let seed = std::env::var("EMBER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);

    Runtime::run(config, GpuInit::default(), app::Arcade::new(PoolConfig::default(), seed))
}
