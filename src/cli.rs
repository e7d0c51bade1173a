use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use rasterline::config::RenderConfig;
use rasterline::render::RenderMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "rasterline")]
#[command(about = "Multithreaded CPU rasterizer", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Wavefront OBJ model; the unit cube when omitted
    #[arg(long)]
    pub obj: Option<PathBuf>,

    /// Diffuse (albedo) texture
    #[arg(long)]
    pub diffuse: Option<PathBuf>,

    /// Specular intensity map
    #[arg(long)]
    pub specular: Option<PathBuf>,

    /// Tangent-free normal map
    #[arg(long)]
    pub normal: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Worker threads; hardware concurrency by default
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Render without a window and write the last frame to --output
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// PNG written in headless mode
    #[arg(short, long, default_value = "frame.png")]
    pub output: PathBuf,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 1)]
    pub frames: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Filled,
    Wireframe,
    FilledWireframe,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Filled => RenderMode::Filled,
            ModeArg::Wireframe => RenderMode::Wireframe,
            ModeArg::FilledWireframe => RenderMode::FilledWireframe,
        }
    }
}

impl Cli {
    /// The config file (or defaults) with command-line overrides applied.
    pub fn load_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(obj) = &self.obj {
            config.assets.obj = Some(obj.clone());
        }
        if let Some(diffuse) = &self.diffuse {
            config.assets.diffuse = Some(diffuse.clone());
        }
        if let Some(specular) = &self.specular {
            config.assets.specular = Some(specular.clone());
        }
        if let Some(normal) = &self.normal {
            config.assets.normal = Some(normal.clone());
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if let Some(mode) = self.mode {
            config.render_mode = mode.into();
        }

        config.validate().context("invalid command-line options")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_defaults() {
        let cli = Cli::try_parse_from([
            "rasterline",
            "--obj",
            "head.obj",
            "--width",
            "320",
            "-j",
            "3",
            "--mode",
            "filled-wireframe",
            "--headless",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert!(cli.headless);
        assert_eq!(cli.output, PathBuf::from("frame.png"));
        assert_eq!(config.width, 320);
        assert_eq!(config.height, rasterline::config::DEFAULT_HEIGHT);
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.render_mode, RenderMode::FilledWireframe);
        assert_eq!(config.assets.obj, Some(PathBuf::from("head.obj")));
    }

    #[test]
    fn zero_threads_fails_validation() {
        let cli = Cli::try_parse_from(["rasterline", "-j", "0"]).unwrap();
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        assert!(Cli::try_parse_from(["rasterline", "--mode", "points"]).is_err());
    }
}
