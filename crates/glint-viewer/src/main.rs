//! Interactive viewer: an orbiting camera over a field of animated point lights,
//! rendered with either clustered strategy. Space toggles, Escape quits.

mod app;
mod demo_scene;
mod lights;
mod orbit;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use glint_engine::config::{RendererConfig, MAX_LIGHTS};
use glint_engine::device::GpuInit;
use glint_engine::logging::{init_logging, LoggingConfig};
use glint_engine::render::StrategyKind;
use glint_engine::window::{Runtime, RuntimeConfig};

use crate::app::{ViewerApp, ViewerOptions};

#[derive(Debug, Parser)]
#[command(name = "glint-viewer", version, about = "Clustered light shading viewer")]
struct Args {
    /// Initial strategy: `forward` or `deferred`.
    #[arg(long, default_value = "forward")]
    strategy: StrategyKind,

    /// Number of animated point lights.
    #[arg(long, default_value_t = 1024)]
    lights: usize,

    /// Light set capacity. Requests above it are rejected at startup.
    #[arg(long, default_value_t = MAX_LIGHTS)]
    max_lights: u32,

    /// Log cluster occupancy alongside the frame rate.
    #[arg(long)]
    stats: bool,

    /// Log filter (env_logger syntax). Overrides `RUST_LOG`.
    #[arg(long)]
    log: Option<String>,

    /// Present without vsync.
    #[arg(long)]
    no_vsync: bool,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let runtime = RuntimeConfig {
        title: format!("glint ({} lights)", args.lights),
        initial_size: LogicalSize::new(args.width, args.height),
    };

    let gpu_init = GpuInit {
        present_mode: if args.no_vsync {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::Fifo
        },
        ..GpuInit::default()
    };

    let options = ViewerOptions {
        strategy: args.strategy,
        lights: args.lights,
        stats: args.stats,
        renderer: RendererConfig {
            max_lights: args.max_lights,
            ..RendererConfig::default()
        },
    };

    Runtime::run(runtime, gpu_init, ViewerApp::new(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["glint-viewer"]).unwrap();
        assert_eq!(args.strategy, StrategyKind::ForwardPlus);
        assert_eq!(args.lights, 1024);
        assert_eq!(args.max_lights, MAX_LIGHTS);
        assert!(!args.stats);
    }

    #[test]
    fn deferred_strategy_is_accepted() {
        let args =
            Args::try_parse_from(["glint-viewer", "--strategy", "deferred", "--lights", "4000"]).unwrap();
        assert_eq!(args.strategy, StrategyKind::ClusteredDeferred);
        assert_eq!(args.lights, 4000);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Args::try_parse_from(["glint-viewer", "--strategy", "raytraced"]).is_err());
    }
}
