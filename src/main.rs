use clap::{Parser, Subcommand};
use snapqr::acquire::{CommandSource, FrameSource};
use snapqr::config::{self, AppConfig, CameraBackend};
use snapqr::imaging::{FilterKind, Quality};
use snapqr::naming::ImageReference;
use snapqr::output::{self, Report};
use snapqr::pipeline::{Acquired, Pipeline};
use snapqr::store::Store;
use snapqr::{error::PipelineError, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snapqr")]
#[command(about = "Capture or upload a photo, filter it, and share it as a QR code")]
#[command(long_about = "\
Capture or upload a photo, filter it, and share it as a QR code

Every command that produces an image prints its reference: a file name in
the images directory. Pass that reference to the next command.

  snapqr capture --filter grayscale --qr
  snapqr upload holiday.png
  snapqr filter uploaded_1760600000_<token>.png blur
  snapqr qr filtered_1760600000_<token>.jpg
  snapqr export filtered_1760600000_<token>.jpg ~/Downloads

Filters: none, grayscale, blur, edge-detection.

Settings are read from snapqr.toml in the working directory if present.
Run 'snapqr gen-config' to generate a documented one.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Directory for captured, uploaded and filtered images
    #[arg(long, global = true)]
    images_dir: Option<PathBuf>,

    /// Directory for generated QR codes
    #[arg(long, global = true)]
    qr_dir: Option<PathBuf>,

    /// Base URL that stored images are served from
    #[arg(long, env = "SNAPQR_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that acquire a new image.
#[derive(clap::Args, Clone)]
struct FollowUp {
    /// Filter to apply after acquiring
    #[arg(long, value_parser = parse_filter)]
    filter: Option<FilterKind>,

    /// Also generate a share URL and QR code
    #[arg(long)]
    qr: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Grab one frame from the camera
    Capture(FollowUp),
    /// Store a JPEG or PNG file
    Upload {
        file: PathBuf,
        #[command(flatten)]
        follow_up: FollowUp,
    },
    /// Apply a filter to a stored image
    Filter {
        reference: String,
        #[arg(value_parser = parse_filter)]
        kind: FilterKind,
    },
    /// Build the share URL and QR code for a stored image
    Qr { reference: String },
    /// Copy a stored image out of the images directory
    Export { reference: String, dest: PathBuf },
    /// List supported filters
    Filters,
    /// Print a stock snapqr.toml with all options documented
    GenConfig,
}

fn parse_filter(text: &str) -> Result<FilterKind, PipelineError> {
    text.parse()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Filters => {
            output::print_filters();
            return Ok(());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        _ => {}
    }

    let config = resolve_config(&cli)?;
    logging::init_from_config(&config.logging, cli.verbose, cli.json_logs);

    let store = Store::open(
        &config.storage.images_dir,
        &config.storage.qr_dir,
        Quality::new(config.output.jpeg_quality),
    )?;
    let pipeline = Pipeline::new(store, config.share.base_url.clone(), config.qr_settings());

    let mut report = Report::default();
    match cli.command {
        Command::Capture(follow_up) => {
            let mut source = frame_source(&config)?;
            let acquired = pipeline.capture(source.as_mut())?;
            run_follow_up(&pipeline, acquired, &follow_up, &mut report)?;
        }
        Command::Upload { file, follow_up } => {
            let acquired = pipeline.upload_file(&file)?;
            run_follow_up(&pipeline, acquired, &follow_up, &mut report)?;
        }
        Command::Filter { reference, kind } => {
            let reference = ImageReference::parse(&reference)?;
            report.filtered = Some(pipeline.apply_filter(&reference, kind)?);
        }
        Command::Qr { reference } => {
            let reference = ImageReference::parse(&reference)?;
            report.shared = Some(pipeline.share(&reference)?);
        }
        Command::Export { reference, dest } => {
            let reference = ImageReference::parse(&reference)?;
            let exported = pipeline.store().export(&reference, &dest)?;
            if !cli.json {
                output::print_exported(&reference, &exported);
                return Ok(());
            }
            report.exported = Some(exported);
        }
        Command::Filters | Command::GenConfig => {}
    }

    output::print_report(&report, cli.json)?;
    Ok(())
}

/// Filter and share a freshly acquired image as requested.
fn run_follow_up(
    pipeline: &Pipeline,
    acquired: Acquired,
    follow_up: &FollowUp,
    report: &mut Report,
) -> Result<(), PipelineError> {
    let mut current = acquired.stored.reference.clone();
    if let Some(kind) = follow_up.filter {
        let filtered = pipeline.filter_image(&acquired.image, &current, kind)?;
        current = filtered.reference.clone();
        report.filtered = Some(filtered);
    }
    report.image = Some(acquired.stored);
    if follow_up.qr {
        report.shared = Some(pipeline.share(&current)?);
    }
    Ok(())
}

/// Load the config file and apply command-line overrides on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(dir) = &cli.images_dir {
        config.storage.images_dir = dir.clone();
    }
    if let Some(dir) = &cli.qr_dir {
        config.storage.qr_dir = dir.clone();
    }
    if let Some(url) = &cli.base_url {
        config.share.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn frame_source(config: &AppConfig) -> Result<Box<dyn FrameSource>, PipelineError> {
    let camera = &config.camera;
    match camera.backend {
        CameraBackend::Command => Ok(Box::new(CommandSource::new(
            &camera.device,
            camera.program.clone(),
            camera.args.clone(),
        ))),
        #[cfg(feature = "camera")]
        CameraBackend::Native => Ok(Box::new(snapqr::acquire::NativeCamera::new(camera.index))),
        #[cfg(not(feature = "camera"))]
        CameraBackend::Native => Err(PipelineError::DeviceUnavailable(
            "native camera support not compiled in (rebuild with --features camera)".into(),
        )),
    }
}
