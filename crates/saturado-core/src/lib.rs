//! Saturado Core - nonlinear recursive filter engines
//!
//! This crate implements a pair of IIR filter engines that derive their
//! coefficients from musical parameters (frequency, gain, resonance) via
//! the bilinear transform and run the recursion sample-by-sample with
//! optional saturating feedback paths.
//!
//! # Engines
//!
//! - [`FirstOrderFilter`] - one-pole/one-zero engine: lowpass, highpass
//!   and four shelf responses, five saturation placements
//! - [`SecondOrderFilter`] - biquad engine: the full RBJ cookbook response
//!   set plus 1-pole forms, four realization topologies (direct forms I/II
//!   and their transposes) and five saturation placements
//!
//! # Building blocks
//!
//! - [`LinearSmoothed`] - linear parameter ramps for zipper-free updates
//! - [`first_order_coefficients`] / [`biquad_coefficients`] - pure
//!   bilinear-transform coefficient calculators
//! - [`Sample`] - f32/f64 abstraction so one generic implementation serves
//!   both precisions
//! - [`flush_denormal`] - subnormal hygiene for decaying registers
//!
//! # Example
//!
//! ```rust
//! use saturado_core::{BiquadKind, Saturation, SecondOrderFilter, StreamConfig};
//!
//! let mut filter = SecondOrderFilter::<f32>::new();
//! filter.prepare(&StreamConfig::new(48000.0, 2));
//! filter.set_filter_type(BiquadKind::LowPass2);
//! filter.set_frequency(800.0);
//! filter.set_resonance(0.6);
//! filter.set_saturation(Saturation::Nonlinear2);
//!
//! // Per-sample, per-channel processing:
//! let left = filter.process_sample(0, 0.5);
//! let right = filter.process_sample(1, -0.5);
//! assert!(left.is_finite() && right.is_finite());
//! ```
//!
//! # Design notes
//!
//! - **Real-time safe**: no allocation after `prepare`, no locking, no
//!   blocking; every operation is a bounded numeric computation.
//! - **Single-writer**: an engine instance is exclusively owned by one
//!   processing call chain. Parameter setters and `prepare`/`reset` must
//!   be serialized externally relative to sample processing.
//! - **Fail fast**: invalid channel indices and unprepared processing are
//!   `debug_assert!` violations, not recoverable errors; the numeric core
//!   itself is total once preconditions hold.
//! - **no_std**: disable the default `std` feature for embedded targets;
//!   math routes through `libm` either way.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod coeffs;
pub mod first_order;
pub mod math;
pub mod sample;
pub mod second_order;
pub mod smooth;
pub mod stream;

// Re-export main types at crate root
pub use coeffs::{
    BiquadCoeffs, BiquadKind, FirstOrderCoeffs, FirstOrderKind, Saturation, Topology,
    biquad_coefficients, first_order_coefficients,
};
pub use first_order::FirstOrderFilter;
pub use math::{db_to_amplitude, db_to_amplitude_half, flush_denormal, hz_to_omega};
pub use sample::Sample;
pub use second_order::SecondOrderFilter;
pub use smooth::LinearSmoothed;
pub use stream::StreamConfig;
