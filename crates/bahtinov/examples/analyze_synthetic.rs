//! Render a synthetic defocused Bahtinov star, analyze it and print the result.
//!
//! `cargo run --example analyze_synthetic -- [out.png]` also saves the frame,
//! which can then be fed to the `bahtinov` binary.

use bahtinov::core::synthetic::{SpikePattern, SyntheticSpike};
use bahtinov::detect::rgb_image_from_slice;
use bahtinov::{FocusAnalyzer, FocusAnalyzerParams, OpticsCalibration, RgbImageView};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = bahtinov::core::init_from_verbosity(2);

    let size = 320;
    let base = SpikePattern::new(size, size)
        .with_background(18.0)
        .with_noise(6.0, 11);
    let pattern = base
        .clone()
        .with_spike(SyntheticSpike::new(70.0, base.row_at_offset(0.0), 210.0))
        .with_spike(SyntheticSpike::new(90.0, base.row_at_offset(1.7), 170.0))
        .with_spike(SyntheticSpike::new(110.0, base.row_at_offset(0.0), 140.0));
    let rgb = pattern.render_rgb();

    if let Some(path) = env::args().nth(1) {
        rgb_image_from_slice(size as u32, size as u32, &rgb)?.save(&path)?;
        println!("frame written to {path}");
    }

    let optics = OpticsCalibration::new(200.0, 1000.0, 3.8);
    let analyzer = FocusAnalyzer::new(FocusAnalyzerParams::new(optics))?;
    let analysis = analyzer.analyze(&RgbImageView::packed(size, size, &rgb)?)?;

    for (i, line) in analysis.evaluation.candidates.iter().enumerate() {
        println!(
            "line {i}: {:6.1} deg  row {:8.3}",
            line.angle_rad.to_degrees(),
            line.row
        );
    }
    let a = analysis.assessment();
    println!(
        "signed error {:+.3} px, {:.2} um (critical {:.2} um), within focus: {}",
        a.signed_error_px, a.error_microns, a.critical_focus_microns, a.within_critical_focus
    );
    Ok(())
}
