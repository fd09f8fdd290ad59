// ABOUTME: CLI argument definitions for the termpix image viewer
// ABOUTME: Defines the command-line interface structure using clap derive macros

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;
use termpix_sdk::{Dimensions, PrinterOptions, Quiet, ScalingConfig};

#[derive(Parser, Debug)]
#[command(name = "termpix")]
#[command(about = "Show images inline in Kitty-compatible terminals", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Image file to display
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Use a fixed pixel size instead of querying the terminal (e.g. 1280x720)
    #[arg(long, value_name = "WxH")]
    pub size: Option<Dimensions>,

    /// Cap the display width in pixels
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_width: Option<u32>,

    /// Cap the display height in pixels
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_height: Option<u32>,

    /// Allow images smaller than the terminal to be enlarged
    #[arg(long)]
    pub upscale: bool,

    /// Send raw RGBA instead of zlib-compressed data
    #[arg(long)]
    pub no_compress: bool,

    /// Terminal response suppression (0 = all replies, 1 = errors only, 2 = none)
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=2))]
    pub quiet: Option<u8>,

    /// Clear the screen before drawing
    #[arg(long)]
    pub clear: bool,

    /// Draw even if the terminal does not advertise Kitty graphics support
    #[arg(long)]
    pub force: bool,

    /// Load this config file instead of the standard locations
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output for debugging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Effective settings after layering flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub compress: bool,
    pub quiet: u8,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub upscale: bool,
    pub clear: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            compress: !cli.no_compress && config.compress.unwrap_or(true),
            quiet: cli
                .quiet
                .or(config.quiet)
                .unwrap_or(Quiet::default().level()),
            max_width: cli.max_width.or(config.max_width),
            max_height: cli.max_height.or(config.max_height),
            upscale: cli.upscale || config.upscale.unwrap_or(false),
            clear: cli.clear || config.clear.unwrap_or(false),
        }
    }

    pub fn printer_options(&self) -> PrinterOptions {
        PrinterOptions {
            compress: self.compress,
            quiet: Quiet::from_level(self.quiet).unwrap_or_default(),
            trailing_newline: true,
            max_width: self.max_width,
            max_height: self.max_height,
            scaling: ScalingConfig {
                allow_upscale: self.upscale,
            },
        }
    }
}
