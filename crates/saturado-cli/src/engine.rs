//! Order-erased wrapper around the two filter engines.
//!
//! The CLI picks the engine order at runtime from preset/flag input, so
//! the commands work through this enum instead of the concrete generic
//! types. Rendering happens in `f32`, matching the WAV pipeline.

use saturado_core::{FirstOrderFilter, SecondOrderFilter, StreamConfig};

/// A first- or second-order filter engine behind one processing surface.
#[derive(Debug, Clone)]
pub enum FilterEngine {
    /// One-pole/one-zero engine.
    FirstOrder(FirstOrderFilter<f32>),
    /// Biquad engine.
    SecondOrder(SecondOrderFilter<f32>),
}

impl FilterEngine {
    /// Size channel state and derive frequency bounds for a stream.
    pub fn prepare(&mut self, config: &StreamConfig) {
        match self {
            FilterEngine::FirstOrder(f) => f.prepare(config),
            FilterEngine::SecondOrder(f) => f.prepare(config),
        }
    }

    /// Process a block of channel buffers.
    pub fn process_block(&mut self, input: &[&[f32]], output: &mut [&mut [f32]], bypass: bool) {
        match self {
            FilterEngine::FirstOrder(f) => f.process_block(input, output, bypass),
            FilterEngine::SecondOrder(f) => f.process_block(input, output, bypass),
        }
    }

    /// Whether a parameter ramp is still in flight.
    pub fn is_smoothing(&self) -> bool {
        match self {
            FilterEngine::FirstOrder(f) => f.is_smoothing(),
            FilterEngine::SecondOrder(f) => f.is_smoothing(),
        }
    }

    /// Processing latency in samples.
    pub fn latency_samples(&self) -> usize {
        match self {
            FilterEngine::FirstOrder(f) => f.latency_samples(),
            FilterEngine::SecondOrder(f) => f.latency_samples(),
        }
    }
}
