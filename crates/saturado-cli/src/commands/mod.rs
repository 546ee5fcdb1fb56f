//! CLI subcommand implementations.

pub mod generate;
pub mod process;

use crate::engine::FilterEngine;
use crate::preset::FilterPreset;
use clap::Args;
use std::path::PathBuf;

/// Filter configuration flags shared by every rendering subcommand.
///
/// `--preset` loads a TOML file and wins over the individual flags;
/// otherwise the flags populate a [`FilterPreset`] directly (and get the
/// same validation a file would).
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Preset TOML file (overrides the individual filter flags)
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Filter order: 1 or 2
    #[arg(long, default_value_t = 2)]
    pub order: u8,

    /// Response type (e.g. low-pass, high-shelf-c, peak, notch)
    #[arg(long, default_value = "low-pass")]
    pub kind: String,

    /// Center frequency in Hz
    #[arg(long, default_value_t = 1000.0)]
    pub frequency: f32,

    /// Gain in dB (peak and shelf modes)
    #[arg(long, default_value_t = 0.0)]
    pub gain_db: f32,

    /// Resonance 0..1 (second order only)
    #[arg(long, default_value_t = 0.5)]
    pub resonance: f32,

    /// Saturation placement: linear or nonlinear1..nonlinear4
    #[arg(long, default_value = "linear")]
    pub saturation: String,

    /// Realization topology: direct-form-1, direct-form-2,
    /// direct-form-1t or direct-form-2t
    #[arg(long, default_value = "direct-form-2t")]
    pub topology: String,

    /// Parameter ramp duration in seconds
    #[arg(long, default_value_t = 0.02)]
    pub smoothing_secs: f32,
}

impl FilterArgs {
    /// Resolve to a validated preset (from file or from the flags).
    pub fn resolve_preset(&self) -> anyhow::Result<FilterPreset> {
        if let Some(path) = &self.preset {
            let preset = FilterPreset::load(path)?;
            tracing::debug!(name = %preset.name, path = %path.display(), "loaded preset");
            return Ok(preset);
        }
        let preset = FilterPreset {
            name: String::new(),
            order: self.order,
            kind: self.kind.clone(),
            frequency: self.frequency,
            gain_db: self.gain_db,
            resonance: self.resonance,
            saturation: self.saturation.clone(),
            topology: self.topology.clone(),
            smoothing_secs: self.smoothing_secs,
        };
        preset.validate()?;
        Ok(preset)
    }

    /// Resolve and build the configured engine.
    pub fn build_engine(&self) -> anyhow::Result<FilterEngine> {
        Ok(self.resolve_preset()?.build_engine()?)
    }
}
