mod cli;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::Cli;
use rasterline::config::RenderConfig;
use rasterline::engine::Engine;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    if cli.headless || !cfg!(feature = "window") {
        return run_headless(&config, cli.frames, &cli.output);
    }

    #[cfg(feature = "window")]
    run_windowed(&config)?;

    Ok(())
}

fn run_headless(config: &RenderConfig, frames: u32, output: &Path) -> Result<()> {
    let mut engine = Engine::new(config).context("setting up the renderer")?;

    let started = Instant::now();
    let mut last = None;
    for _ in 0..frames.max(1) {
        last = Some(engine.render());
    }
    let elapsed = started.elapsed();
    if let Some(stats) = last {
        info!(
            "{} frame(s) in {:.1} ms; last: {} drawn, {} culled, {} rejected, {} fragments",
            stats.frame,
            elapsed.as_secs_f64() * 1000.0,
            stats.drawn,
            stats.culled,
            stats.rejected,
            stats.fragments
        );
    }

    let buffer = engine.renderer().front_buffer();
    let image = image::RgbImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgb_bytes())
        .context("frame buffer size does not match its resolution")?;
    image
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {}", output.display());
    Ok(())
}

#[cfg(feature = "window")]
fn run_windowed(config: &RenderConfig) -> Result<()> {
    use rasterline::window::{FrameLimiter, Window, WindowEvent};

    let mut engine = Engine::new(config).context("setting up the renderer")?;
    let mut window = Window::new("rasterline", config.width, config.height)?;
    let mut limiter = FrameLimiter::new(&window);

    loop {
        match window.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::Resize(width, height) => {
                engine.resize(width, height)?;
                window.resize(width, height);
            }
            WindowEvent::None => {}
        }

        let delta_ms = limiter.wait_and_get_delta(&window);
        engine.update(window.input(), delta_ms as f32 / 1000.0);

        engine.render_if_needed();
        window.present(&engine.renderer().front_buffer().to_argb_bytes())?;
    }

    Ok(())
}
