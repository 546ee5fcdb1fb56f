//! TOML filter presets.
//!
//! A preset captures one complete engine configuration:
//!
//! ```toml
//! name = "warm lowpass"
//! order = 2
//! kind = "low-pass"
//! frequency = 800.0
//! resonance = 0.6
//! saturation = "nonlinear2"
//! topology = "direct-form-2t"
//! ```
//!
//! Values are range-validated on load so a bad preset fails with a field
//! name instead of silently clamping inside the engine.

use crate::engine::FilterEngine;
use saturado_core::{
    BiquadKind, FirstOrderFilter, FirstOrderKind, Saturation, SecondOrderFilter, Topology,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating a preset.
#[derive(Debug, Error)]
pub enum PresetError {
    /// Failed to read the preset file.
    #[error("failed to read preset '{path}': {source}")]
    ReadFile {
        /// Path of the preset that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse preset TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field is outside its allowed range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unknown response type for the configured order.
    #[error("unknown filter kind '{0}' for order {1}")]
    UnknownKind(String, u8),

    /// Unknown saturation name.
    #[error("unknown saturation '{0}' (expected linear or nonlinear1..4)")]
    UnknownSaturation(String),

    /// Unknown topology name.
    #[error("unknown topology '{0}' (expected direct-form-1, direct-form-2, direct-form-1t or direct-form-2t)")]
    UnknownTopology(String),
}

impl PresetError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PresetError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// One complete filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterPreset {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Engine order: 1 or 2.
    #[serde(default = "defaults::order")]
    pub order: u8,
    /// Response type (names are kebab-case, e.g. `low-shelf-c`).
    #[serde(default = "defaults::kind")]
    pub kind: String,
    /// Center frequency in Hz.
    #[serde(default = "defaults::frequency")]
    pub frequency: f32,
    /// Gain in dB (peak and shelf modes).
    #[serde(default)]
    pub gain_db: f32,
    /// Resonance in `[0, 1]` (second order only).
    #[serde(default = "defaults::resonance")]
    pub resonance: f32,
    /// Saturation placement: `linear` or `nonlinear1`..`nonlinear4`.
    #[serde(default = "defaults::saturation")]
    pub saturation: String,
    /// Realization topology (second order, linear path).
    #[serde(default = "defaults::topology")]
    pub topology: String,
    /// Parameter ramp duration in seconds.
    #[serde(default = "defaults::smoothing_secs")]
    pub smoothing_secs: f32,
}

mod defaults {
    pub fn order() -> u8 {
        2
    }
    pub fn kind() -> String {
        "low-pass".into()
    }
    pub fn frequency() -> f32 {
        1000.0
    }
    pub fn resonance() -> f32 {
        0.5
    }
    pub fn saturation() -> String {
        "linear".into()
    }
    pub fn topology() -> String {
        "direct-form-2t".into()
    }
    pub fn smoothing_secs() -> f32 {
        0.02
    }
}

impl Default for FilterPreset {
    fn default() -> Self {
        Self {
            name: String::new(),
            order: defaults::order(),
            kind: defaults::kind(),
            frequency: defaults::frequency(),
            gain_db: 0.0,
            resonance: defaults::resonance(),
            saturation: defaults::saturation(),
            topology: defaults::topology(),
            smoothing_secs: defaults::smoothing_secs(),
        }
    }
}

impl FilterPreset {
    /// Load and validate a preset from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PresetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PresetError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let preset: FilterPreset = toml::from_str(&text)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), PresetError> {
        if !(self.order == 1 || self.order == 2) {
            return Err(PresetError::invalid("order", format!("{} (expected 1 or 2)", self.order)));
        }
        if !(20.0..=20000.0).contains(&self.frequency) {
            return Err(PresetError::invalid(
                "frequency",
                format!("{} Hz (expected 20 to 20000)", self.frequency),
            ));
        }
        if !(-30.0..=30.0).contains(&self.gain_db) {
            return Err(PresetError::invalid(
                "gain_db",
                format!("{} dB (expected -30 to +30)", self.gain_db),
            ));
        }
        if !(0.0..=1.0).contains(&self.resonance) {
            return Err(PresetError::invalid(
                "resonance",
                format!("{} (expected 0 to 1)", self.resonance),
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_secs) {
            return Err(PresetError::invalid(
                "smoothing_secs",
                format!("{} s (expected 0 to 1)", self.smoothing_secs),
            ));
        }
        // Catch name typos up front, before an engine exists.
        parse_saturation(&self.saturation)?;
        parse_topology(&self.topology)?;
        match self.order {
            1 => {
                parse_first_order_kind(&self.kind)?;
            }
            _ => {
                parse_biquad_kind(&self.kind)?;
            }
        }
        Ok(())
    }

    /// Build a fully configured (but not yet prepared) engine.
    pub fn build_engine(&self) -> Result<FilterEngine, PresetError> {
        let saturation = parse_saturation(&self.saturation)?;
        Ok(match self.order {
            1 => {
                let mut filter = FirstOrderFilter::<f32>::new();
                filter.set_filter_type(parse_first_order_kind(&self.kind)?);
                filter.set_saturation(saturation);
                filter.set_smoothing_secs(f64::from(self.smoothing_secs));
                filter.set_frequency(self.frequency);
                filter.set_gain_db(self.gain_db);
                FilterEngine::FirstOrder(filter)
            }
            _ => {
                let mut filter = SecondOrderFilter::<f32>::new();
                filter.set_filter_type(parse_biquad_kind(&self.kind)?);
                filter.set_topology(parse_topology(&self.topology)?);
                filter.set_saturation(saturation);
                filter.set_smoothing_secs(f64::from(self.smoothing_secs));
                filter.set_frequency(self.frequency);
                filter.set_gain_db(self.gain_db);
                filter.set_resonance(self.resonance);
                FilterEngine::SecondOrder(filter)
            }
        })
    }
}

fn parse_first_order_kind(name: &str) -> Result<FirstOrderKind, PresetError> {
    Ok(match name {
        "low-pass" => FirstOrderKind::LowPass,
        "high-pass" => FirstOrderKind::HighPass,
        "low-shelf" => FirstOrderKind::LowShelf,
        "low-shelf-c" => FirstOrderKind::LowShelfC,
        "high-shelf" => FirstOrderKind::HighShelf,
        "high-shelf-c" => FirstOrderKind::HighShelfC,
        _ => return Err(PresetError::UnknownKind(name.into(), 1)),
    })
}

fn parse_biquad_kind(name: &str) -> Result<BiquadKind, PresetError> {
    Ok(match name {
        "low-pass" => BiquadKind::LowPass2,
        "low-pass-1" => BiquadKind::LowPass1,
        "high-pass" => BiquadKind::HighPass2,
        "high-pass-1" => BiquadKind::HighPass1,
        "band-pass" => BiquadKind::BandPass,
        "band-pass-q" => BiquadKind::BandPassQ,
        "low-shelf" => BiquadKind::LowShelf2,
        "low-shelf-1" => BiquadKind::LowShelf1,
        "low-shelf-1c" => BiquadKind::LowShelf1C,
        "high-shelf" => BiquadKind::HighShelf2,
        "high-shelf-1" => BiquadKind::HighShelf1,
        "high-shelf-1c" => BiquadKind::HighShelf1C,
        "peak" => BiquadKind::Peak,
        "notch" => BiquadKind::Notch,
        "all-pass" => BiquadKind::AllPass,
        _ => return Err(PresetError::UnknownKind(name.into(), 2)),
    })
}

fn parse_saturation(name: &str) -> Result<Saturation, PresetError> {
    Ok(match name {
        "linear" => Saturation::Linear,
        "nonlinear1" => Saturation::Nonlinear1,
        "nonlinear2" => Saturation::Nonlinear2,
        "nonlinear3" => Saturation::Nonlinear3,
        "nonlinear4" => Saturation::Nonlinear4,
        _ => return Err(PresetError::UnknownSaturation(name.into())),
    })
}

fn parse_topology(name: &str) -> Result<Topology, PresetError> {
    Ok(match name {
        "direct-form-1" => Topology::DirectFormI,
        "direct-form-2" => Topology::DirectFormII,
        "direct-form-1t" => Topology::DirectFormITransposed,
        "direct-form-2t" => Topology::DirectFormIITransposed,
        _ => return Err(PresetError::UnknownTopology(name.into())),
    })
}
