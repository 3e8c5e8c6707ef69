use crate::mode::Mode;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Diameter of every spray-pattern target.
pub const SPRAY_TARGET_SIZE: f64 = 8.0;

/// User-selected target size category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TargetSize {
    #[default]
    Large,
    Medium,
    Small,
    Tiny,
    Micro,
}

impl TargetSize {
    pub const ALL: [TargetSize; 5] = [
        TargetSize::Large,
        TargetSize::Medium,
        TargetSize::Small,
        TargetSize::Tiny,
        TargetSize::Micro,
    ];

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Uniform diameter range `[min, min + spread]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f64,
    pub spread: f64,
}

impl SizeRange {
    const fn new(min: f64, spread: f64) -> Self {
        Self { min, spread }
    }

    pub fn max(&self) -> f64 {
        self.min + self.spread
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.spread <= 0.0 {
            return self.min;
        }
        self.min + rng.gen::<f64>() * self.spread
    }
}

pub fn size_range(mode: Mode, size: TargetSize) -> SizeRange {
    match mode {
        Mode::Intensive => SizeRange::new(3.0, 2.0),
        Mode::Spray => SizeRange::new(SPRAY_TARGET_SIZE, 0.0),
        Mode::Reaction => SizeRange::new(20.0, 10.0),
        Mode::Grid => match size {
            TargetSize::Large => SizeRange::new(40.0, 10.0),
            TargetSize::Medium => SizeRange::new(28.0, 8.0),
            TargetSize::Small => SizeRange::new(20.0, 6.0),
            TargetSize::Tiny => SizeRange::new(14.0, 6.0),
            TargetSize::Micro => SizeRange::new(10.0, 8.0),
        },
        Mode::FreeAim | Mode::Letter | Mode::LetterFugitive => match size {
            TargetSize::Large => SizeRange::new(100.0, 30.0),
            TargetSize::Medium => SizeRange::new(60.0, 30.0),
            TargetSize::Small => SizeRange::new(35.0, 20.0),
            TargetSize::Tiny => SizeRange::new(20.0, 15.0),
            TargetSize::Micro => SizeRange::new(10.0, 8.0),
        },
    }
}

/// Fresh diameter for one target; sampled independently per spawn.
pub fn sample_size<R: Rng + ?Sized>(mode: Mode, size: TargetSize, rng: &mut R) -> f64 {
    size_range(mode, size).sample(rng)
}
