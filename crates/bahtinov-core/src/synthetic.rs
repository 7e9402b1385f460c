//! Synthetic Bahtinov frames for tests and benchmarks.
//!
//! A spike is rendered in the same coordinates the line scanner reports:
//! a line with orientation `angle_deg` whose scan-frame row is `row`, i.e.
//! the image points `p` with
//! `(p.x - cx) * sin(angle) - (p.y - cy) * cos(angle) == row - cy`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One straight diffraction spike with a Gaussian cross-section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticSpike {
    pub angle_deg: f64,
    /// Scan-frame row (absolute image row units).
    pub row: f64,
    /// Peak brightness added on top of the background (0..255 scale).
    pub amplitude: f64,
    /// Gaussian sigma of the cross-section, pixels.
    pub sigma: f64,
    /// Per-channel weights applied to `amplitude`.
    pub color: [f64; 3],
}

impl SyntheticSpike {
    pub fn new(angle_deg: f64, row: f64, amplitude: f64) -> Self {
        Self {
            angle_deg,
            row,
            amplitude,
            sigma: 1.5,
            color: [1.0; 3],
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_color(mut self, color: [f64; 3]) -> Self {
        self.color = color;
        self
    }
}

/// A frame made of a flat background, spikes and uniform noise.
#[derive(Clone, Debug)]
pub struct SpikePattern {
    pub width: usize,
    pub height: usize,
    pub background: f64,
    /// Half-width of the uniform noise added to every channel.
    pub noise: f64,
    pub seed: u64,
    pub spikes: Vec<SyntheticSpike>,
}

impl SpikePattern {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            background: 10.0,
            noise: 0.0,
            seed: 0x9E37_79B9_7F4A_7C15,
            spikes: Vec::new(),
        }
    }

    pub fn with_background(mut self, background: f64) -> Self {
        self.background = background;
        self
    }

    pub fn with_noise(mut self, noise: f64, seed: u64) -> Self {
        self.noise = noise;
        self.seed = seed;
        self
    }

    pub fn with_spike(mut self, spike: SyntheticSpike) -> Self {
        self.spikes.push(spike);
        self
    }

    /// Scan-frame row of a line passing `offset` pixels from the frame center.
    pub fn row_at_offset(&self, offset: f64) -> f64 {
        self.height as f64 / 2.0 + offset
    }

    /// Render a tightly packed RGB buffer (`stride == 3 * width`).
    pub fn render_rgb(&self) -> Vec<u8> {
        let (cx, cy) = (self.width as f64 / 2.0, self.height as f64 / 2.0);
        let spikes: Vec<_> = self
            .spikes
            .iter()
            .map(|s| {
                let (sin, cos) = s.angle_deg.to_radians().sin_cos();
                (sin, cos, s.row - cy, 0.5 / (s.sigma * s.sigma), s)
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::with_capacity(3 * self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let (dx, dy) = (x as f64 - cx, y as f64 - cy);
                let mut rgb = [self.background; 3];
                for &(sin, cos, offset, inv_two_var, spike) in &spikes {
                    let d = dx * sin - dy * cos - offset;
                    let g = spike.amplitude * (-d * d * inv_two_var).exp();
                    for (c, w) in rgb.iter_mut().zip(spike.color) {
                        *c += w * g;
                    }
                }
                for c in rgb {
                    let n = if self.noise > 0.0 {
                        rng.gen_range(-self.noise..self.noise)
                    } else {
                        0.0
                    };
                    out.push((c + n).round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        out
    }
}
