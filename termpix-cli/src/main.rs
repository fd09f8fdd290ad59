// ABOUTME: Main entry point for the termpix image viewer
// ABOUTME: Loads config and the image, then draws it with the Kitty graphics protocol

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{cursor::MoveTo, execute, terminal::Clear, terminal::ClearType};
use std::env;
use std::io::{self, Write};
use termpix_cli::cli::{Cli, Settings};
use termpix_cli::cli_output::CliOutput;
use termpix_cli::config::Config;
use termpix_cli::detection::TerminalCapabilities;
use termpix_cli::loader::{SourceImage, load_image};
use termpix_sdk::{FixedSize, ImageScaler, TerminalImagePrinter, TerminalSize, TermpixError};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let output = if cli.no_color || env::var_os("NO_COLOR").is_some() {
        CliOutput::with_color(false)
    } else {
        CliOutput::new()
    };

    if let Err(err) = run(&cli, &output) {
        output.error(&format!("{:#}", err));
        if let Some(help) = err
            .downcast_ref::<TermpixError>()
            .and_then(TermpixError::help_text)
        {
            output.hint(help);
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &CliOutput) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    let settings = Settings::resolve(cli, &config);
    log::debug!("Effective settings: {:?}", settings);

    let capabilities = TerminalCapabilities::detect();
    if !capabilities.supports_kitty_graphics {
        if !cli.force {
            bail!(
                "Terminal '{}' does not advertise Kitty graphics support; pass --force to draw anyway",
                capabilities.terminal_name
            );
        }
        output.warning(&format!(
            "Terminal '{}' may not support Kitty graphics",
            capabilities.terminal_name
        ));
    }

    let image = load_image(&cli.image)?;
    let options = settings.printer_options();
    let mut stdout = io::stdout().lock();

    match cli.size {
        Some(size) => display(
            &TerminalImagePrinter::new(FixedSize(size), options),
            &image,
            settings.clear,
            &mut stdout,
        ),
        None => display(
            &TerminalImagePrinter::for_tty(options),
            &image,
            settings.clear,
            &mut stdout,
        ),
    }
}

fn display<T, W>(
    printer: &TerminalImagePrinter<T>,
    image: &SourceImage,
    clear: bool,
    out: &mut W,
) -> Result<()>
where
    T: TerminalSize,
    W: Write,
{
    // Fail on the size query and target check before the screen is touched
    let bounds = printer.target_bounds()?;
    let target = ImageScaler::with_config(printer.options().scaling.clone())
        .checked_target(image.dimensions(), bounds)?;
    log::debug!(
        "Drawing {} image as {} within {}",
        image.dimensions(),
        target,
        bounds
    );

    if clear {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0)).context("Failed to clear screen")?;
    }

    image
        .print_within(printer, bounds, out)
        .with_context(|| format!("Failed to display {}", image.dimensions()))?;
    Ok(())
}
