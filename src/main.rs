//! Instant Print CLI
//!
//! Command-line interface for cropping photos to the print format and for
//! exercising the capture session against a simulated camera.

use clap::{Parser, Subcommand, ValueEnum};
use instant_print::{
    capture::{
        CaptureController, CaptureModel, FileConfig, PermissionState, SimulatedBackend,
    },
    crop::{crop_image, AspectRatio, Orientation, CARD_OUTER_RATIO, PRINT_AREA_RATIO},
    CaptureMetrics,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "instant-print", version, about = "Instant-print capture and cropping")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Crop an image file to a print ratio.
    Crop {
        /// Source image.
        input: PathBuf,
        /// Destination image; the format follows the extension.
        output: PathBuf,
        /// Target ratio.
        #[arg(long, value_enum, default_value_t = Ratio::Print)]
        ratio: Ratio,
    },
    /// Start a simulated capture session and take one photo.
    Simulate {
        /// TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where to write the captured photo.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Simulate a user declining camera access.
        #[arg(long)]
        deny: bool,
        /// Print Prometheus metrics when done.
        #[arg(long)]
        metrics: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ratio {
    /// Inner print area, 46:62.
    Print,
    /// Outer card, 54:86.
    Card,
}

impl Ratio {
    fn aspect(self) -> AspectRatio {
        match self {
            Ratio::Print => PRINT_AREA_RATIO,
            Ratio::Card => CARD_OUTER_RATIO,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Instant Print v{}", instant_print::VERSION);

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Crop {
            input,
            output,
            ratio,
        } => run_crop(&input, &output, ratio.aspect()),
        Command::Simulate {
            config,
            output,
            deny,
            metrics,
        } => run_simulation(config, output, deny, metrics).await,
    };
    std::process::exit(code);
}

fn run_crop(input: &Path, output: &Path, ratio: AspectRatio) -> i32 {
    let bytes = match std::fs::read(input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input.display(), e);
            return 1;
        }
    };
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Failed to decode {}: {}", input.display(), e);
            return 1;
        }
    };
    let orientation = Orientation::read_from_exif(&bytes).unwrap_or_default();

    let cropped = crop_image(image, orientation, ratio);
    info!(
        width = cropped.width(),
        height = cropped.height(),
        orientation = orientation.exif_value(),
        "Cropped to {}",
        ratio
    );

    if let Err(e) = cropped.save(output) {
        eprintln!("Failed to write {}: {}", output.display(), e);
        return 1;
    }
    println!("{}", output.display());
    0
}

async fn run_simulation(
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    deny: bool,
    print_metrics: bool,
) -> i32 {
    let config = match config_path {
        Some(path) => match FileConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                return 1;
            }
        },
        None => FileConfig::default(),
    };

    let sim = &config.simulation;
    let orientation = Orientation::from_exif(sim.orientation).unwrap_or_else(|| {
        warn!(value = sim.orientation, "Invalid orientation in config, using up");
        Orientation::Up
    });
    let mut backend = SimulatedBackend::new().with_sensor(
        sim.sensor_width,
        sim.sensor_height,
        orientation,
    );
    if deny {
        backend = backend
            .with_permission(PermissionState::NotDetermined)
            .grant_on_request(false);
    }

    let metrics = match CaptureMetrics::new() {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            return 1;
        }
    };
    let controller = CaptureController::new(Arc::new(backend), config.capture.clone())
        .with_metrics(Arc::clone(&metrics));
    let model = CaptureModel::new(Arc::new(controller));
    let mut errors = model.subscribe_errors();

    info!("Starting simulated capture session");
    model.start().await;

    let mut code = 0;
    if model.session().is_running() {
        model.capture().await;
    }
    while let Ok(error) = errors.try_recv() {
        eprintln!("Error: {}", error);
        code = 1;
    }

    if let Some(photo) = model.captured_photo() {
        let (width, height) = photo.dimensions();
        info!(width, height, sequence = photo.sequence, "Photo ready");
        if let Some(path) = output {
            if let Err(e) = photo.image.save(&path) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                code = 1;
            } else {
                println!("{}", path.display());
            }
        }
    }

    if print_metrics {
        match metrics.encode() {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }
    code
}
