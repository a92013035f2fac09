//! Terrain viewer.
//!
//! ```text
//! terrain_viewer [CONFIG.json] [--dump-texture PATH] [--capture PATH]
//! ```
//!
//! - `CONFIG.json`: overrides for any [`TerrainConfig`] field
//! - `--dump-texture`: writes the generated stripe texture as PNG and exits
//! - `--capture`: renders a few frames headless, writes the output as PNG
//!   and exits
//!
//! Without `--dump-texture` or `--capture` a window opens. Drag with the
//! left button to orbit, with the right button to pan, scroll to zoom.

use anyhow::{Context, bail};
use bokeh_terrain::{App, Engine, FrameDriver, StripeTexture, TerrainConfig, Timer, Viewport};

const CAPTURE_FRAMES: u32 = 3;
/// Logical size of the window and of captured frames.
const SIZE: (u32, u32) = (1280, 720);

#[derive(Default)]
struct Args {
    config: Option<String>,
    dump_texture: Option<String>,
    capture: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dump-texture" => {
                args.dump_texture = Some(iter.next().context("--dump-texture needs a path")?);
            }
            "--capture" => {
                args.capture = Some(iter.next().context("--capture needs a path")?);
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ => args.config = Some(arg),
        }
    }
    Ok(args)
}

fn capture(config: TerrainConfig, path: &str) -> anyhow::Result<()> {
    let viewport = Viewport::new(SIZE.0, SIZE.1, 1.0)?;
    let mut engine = pollster::block_on(Engine::new_headless(config, viewport))?;
    let mut driver = FrameDriver::new(Timer::new());
    for _ in 0..CAPTURE_FRAMES {
        driver.tick(&mut engine, None)?;
    }
    engine.renderer().capture_output()?.save(path)?;
    log::info!("Captured frame to {path}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => TerrainConfig::from_json_file(path)?,
        None => TerrainConfig::default(),
    };

    if let Some(path) = &args.dump_texture {
        StripeTexture::new(config.texture.clone())?.save_png(path)?;
        return Ok(());
    }

    if let Some(path) = &args.capture {
        return capture(config, path);
    }

    App::new(config)
        .with_title("Bokeh Terrain")
        .with_size(f64::from(SIZE.0), f64::from(SIZE.1))
        .run()?;
    Ok(())
}
