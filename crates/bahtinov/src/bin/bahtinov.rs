//! `bahtinov` CLI: measure focus from a Bahtinov mask star image.

use bahtinov::detect::{analyze_image, analyze_image_channels, load_rgb, CropRegion};
use bahtinov::io::{FocusAnalyzeConfig, FocusReport};
use bahtinov::{FocusAnalysis, IntensityMode, OpticsCalibration};
use clap::{ArgAction, Parser};
use log::info;
use std::path::PathBuf;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "bahtinov")]
#[command(about = "Measure telescope focus error from a Bahtinov mask star image")]
#[command(version)]
struct Cli {
    /// Input image; the centered square is analyzed.
    #[arg(required_unless_present = "config")]
    image: Option<PathBuf>,

    /// JSON config file; replaces the image and optics arguments.
    #[arg(long, conflicts_with = "image")]
    config: Option<PathBuf>,

    /// Telescope aperture in millimeters.
    #[arg(long, default_value_t = 200.0)]
    aperture_mm: f64,

    /// Telescope focal length in millimeters.
    #[arg(long, default_value_t = 1000.0)]
    focal_length_mm: f64,

    /// Camera pixel size in micrometers.
    #[arg(long, default_value_t = 3.8)]
    pixel_size_um: f64,

    /// Analyze red, green and blue channels separately.
    #[arg(long)]
    channels: bool,

    /// Write a JSON report to this path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn to_config(&self) -> CliResult<FocusAnalyzeConfig> {
        if let Some(path) = &self.config {
            info!("loading config {}", path.display());
            return Ok(FocusAnalyzeConfig::load_json(path)?);
        }
        let image = self
            .image
            .as_ref()
            .ok_or("an image path or --config is required")?;
        let mut cfg = FocusAnalyzeConfig::new(
            image.to_string_lossy(),
            OpticsCalibration::new(self.aperture_mm, self.focal_length_mm, self.pixel_size_um),
        );
        cfg.channels = self.channels;
        Ok(cfg)
    }

    fn report_path(&self, cfg: &FocusAnalyzeConfig) -> Option<PathBuf> {
        self.json
            .clone()
            .or_else(|| cfg.output_path.as_ref().map(|_| cfg.output_path()))
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbosity: u8) {
    let _ = tracing_log::LogTracer::init();
    bahtinov::core::init_tracing(false);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbosity: u8) {
    let _ = bahtinov::core::init_from_verbosity(verbosity);
}

fn summary(channel: IntensityMode, analysis: &FocusAnalysis) -> String {
    let a = analysis.assessment();
    format!(
        "{:<9} error {:+.3} px  {:.2} um  critical {:.2} um  {}",
        format!("{channel:?}").to_lowercase(),
        a.signed_error_px,
        a.error_microns,
        a.critical_focus_microns,
        if a.within_critical_focus {
            "IN FOCUS"
        } else {
            "out of focus"
        }
    )
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = cli.to_config()?;
    let analyzer = cfg.build_analyzer()?;

    info!("loading image {}", cfg.image_path);
    let img = load_rgb(&cfg.image_path)?;
    let mut report = FocusReport::new(&cfg.image_path, img.width(), img.height(), cfg.optics);
    let crop = CropRegion::center_square(img.width(), img.height());
    report.crop = Some([crop.x, crop.y, crop.side]);

    if cfg.channels {
        let (channels, _) = analyze_image_channels(&img, &analyzer)?;
        for ch in &channels {
            match &ch.result {
                Ok(analysis) => println!("{}", summary(ch.channel, analysis)),
                Err(err) => println!("{:<9} {err}", format!("{:?}", ch.channel).to_lowercase()),
            }
            report.push_result(ch.channel, &ch.result);
        }
    } else {
        let intensity = analyzer.params().detector.intensity;
        let result = analyze_image(&img, &analyzer).map(|(analysis, _)| analysis);
        match &result {
            Ok(analysis) => println!("{}", summary(intensity, analysis)),
            Err(err) => eprintln!("analysis failed: {err}"),
        }
        report.push_result(intensity, &result);
    }

    if let Some(path) = cli.report_path(&cfg) {
        report.write_json(&path)?;
        info!("report written to {}", path.display());
    }

    if report.success_count() == 0 {
        return Err("no channel produced a focus assessment".into());
    }
    Ok(())
}
