//! First-order nonlinear filter engine.
//!
//! A one-pole/one-zero recursive filter with a selectable saturation stage
//! inside the recursion. The linear difference equation, with `x1` the
//! single per-channel delay register and feedback stored negated:
//!
//! ```text
//! y[n] = b0·x[n] + x1
//! x1   = b1·x[n] + a1·y[n]
//! ```
//!
//! # Saturation placements
//!
//! | variant | recursion |
//! |---|---|
//! | `Linear`     | as above |
//! | `Nonlinear1` | `x1 = tanh(b1·x + a1·y)` — state update saturated |
//! | `Nonlinear2` | `y = tanh(b0·x + x1)` — output node saturated |
//! | `Nonlinear3` | both of the above |
//! | `Nonlinear4` | `x' = sin(x)`, `y = asin(b0·x' + x1)`, `x1 = b1·x' + a1·y` |
//!
//! `Nonlinear4` folds the signal through the sine: the input is pre-warped,
//! the linear core runs on the warped signal, and the output node is
//! unwarped through `asin` (argument clamped to the sine's image so the
//! recursion stays total).
//!
//! Frequency and gain changes ramp linearly (see [`LinearSmoothed`]);
//! coefficients are recomputed from the ramped values once per sample
//! frame, and every channel of a frame reads the same coefficient set.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::coeffs::{FirstOrderCoeffs, FirstOrderKind, Saturation, first_order_coefficients};
use crate::math::{db_to_amplitude_half, flush_denormal, hz_to_omega};
use crate::sample::Sample;
use crate::smooth::LinearSmoothed;
use crate::stream::StreamConfig;

/// Default parameter ramp duration in seconds.
const DEFAULT_RAMP_SECS: f64 = 0.02;

/// First-order filter engine with per-channel state and saturating
/// recursion variants.
///
/// # Lifecycle
///
/// [`prepare`](Self::prepare) must be called with a positive sample rate
/// and non-zero channel count before any processing; it sizes the channel
/// state and derives the valid frequency range
/// (`sample_rate/24576 ..= sample_rate/2.125`). Processing an unprepared
/// instance or an out-of-range channel is a precondition violation,
/// checked by `debug_assert!`.
///
/// # Example
///
/// ```rust
/// use saturado_core::{FirstOrderFilter, FirstOrderKind, StreamConfig};
///
/// let mut filter = FirstOrderFilter::<f32>::new();
/// filter.prepare(&StreamConfig::new(48000.0, 2));
/// filter.set_filter_type(FirstOrderKind::HighPass);
/// filter.set_frequency(120.0);
///
/// let left = filter.process_sample(0, 0.25);
/// let right = filter.process_sample(1, 0.25);
/// assert!(left.is_finite() && right.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct FirstOrderFilter<S: Sample> {
    coeffs: FirstOrderCoeffs<S>,

    /// Delay register, one slot per channel.
    xn1: Vec<S>,

    frequency: LinearSmoothed<S>,
    gain_db: LinearSmoothed<S>,

    kind: FirstOrderKind,
    saturation: Saturation,

    sample_rate: f64,
    ramp_secs: f64,
    min_freq: S,
    max_freq: S,
}

impl<S: Sample> FirstOrderFilter<S> {
    /// Create an unprepared engine (lowpass, 1 kHz, 0 dB, no saturation).
    pub fn new() -> Self {
        Self {
            coeffs: FirstOrderCoeffs::identity(),
            xn1: Vec::new(),
            frequency: LinearSmoothed::new(S::from_f64(1000.0)),
            gain_db: LinearSmoothed::new(S::ZERO),
            kind: FirstOrderKind::default(),
            saturation: Saturation::default(),
            sample_rate: 48000.0,
            ramp_secs: DEFAULT_RAMP_SECS,
            min_freq: S::from_f64(20.0),
            max_freq: S::from_f64(20000.0),
        }
    }

    /// Size the channel state for a stream and derive frequency bounds.
    ///
    /// Resets all delay registers, flattens the parameter ramps at their
    /// targets, and recomputes coefficients. Not reentrant with respect to
    /// [`process_sample`](Self::process_sample).
    pub fn prepare(&mut self, config: &StreamConfig) {
        debug_assert!(config.sample_rate > 0.0, "sample rate must be positive");
        debug_assert!(config.channels > 0, "channel count must be non-zero");

        self.sample_rate = config.sample_rate;
        self.xn1 = vec![S::ZERO; config.channels];

        self.min_freq = S::from_f64(config.sample_rate / 24576.0);
        self.max_freq = S::from_f64(config.sample_rate / 2.125);

        self.frequency.reset(self.sample_rate, self.ramp_secs);
        self.gain_db.reset(self.sample_rate, self.ramp_secs);
        // Re-clamp into the bounds of the new rate.
        let hz = self.frequency.target().clamp(self.min_freq, self.max_freq);
        self.frequency.set_current_and_target(hz);

        self.recompute_coefficients();
    }

    /// Set the center frequency in Hz, clamped into the valid range.
    pub fn set_frequency(&mut self, hz: S) {
        let hz = hz.clamp(self.min_freq, self.max_freq);
        if hz != self.frequency.target() {
            self.frequency.set_target(hz);
            if !self.frequency.is_smoothing() {
                self.recompute_coefficients();
            }
        }
    }

    /// Set the shelf gain in dB (shelf modes only; pass modes ignore it).
    pub fn set_gain_db(&mut self, db: S) {
        if db != self.gain_db.target() {
            self.gain_db.set_target(db);
            if !self.gain_db.is_smoothing() {
                self.recompute_coefficients();
            }
        }
    }

    /// Select the response type. Clears the delay registers — state from a
    /// different response is meaningless.
    pub fn set_filter_type(&mut self, kind: FirstOrderKind) {
        if kind != self.kind {
            self.kind = kind;
            self.reset();
            self.recompute_coefficients();
        }
    }

    /// Select the saturation placement. Clears the delay registers.
    pub fn set_saturation(&mut self, saturation: Saturation) {
        if saturation != self.saturation {
            self.saturation = saturation;
            self.reset();
            self.recompute_coefficients();
        }
    }

    /// Set the parameter ramp duration in seconds (applies from the next
    /// retarget; the current ramp is flattened).
    pub fn set_smoothing_secs(&mut self, secs: f64) {
        self.ramp_secs = secs;
        self.frequency.reset(self.sample_rate, secs);
        self.gain_db.reset(self.sample_rate, secs);
        self.recompute_coefficients();
    }

    /// Zero all delay registers.
    pub fn reset(&mut self) {
        self.reset_to(S::ZERO);
    }

    /// Set all delay registers to `initial` (e.g. a DC operating point).
    pub fn reset_to(&mut self, initial: S) {
        for slot in &mut self.xn1 {
            *slot = initial;
        }
    }

    /// Flush subnormal-range register values to exact zero.
    ///
    /// Optional hygiene after sample-by-sample processing;
    /// [`process_block`](Self::process_block) runs it automatically.
    pub fn snap_to_zero(&mut self) {
        for slot in &mut self.xn1 {
            *slot = flush_denormal(*slot);
        }
    }

    /// Process one sample on one channel.
    ///
    /// Processing channel 0 advances the parameter ramps one step and, if
    /// a ramp is active, recomputes coefficients — so channels must be
    /// visited in ascending order within a sample frame and all of them
    /// see the same coefficient set.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: S) -> S {
        debug_assert!(
            channel < self.xn1.len(),
            "channel index out of range (was prepare() called?)"
        );

        if channel == 0 {
            self.tick_smoothing();
        }

        let c = self.coeffs;
        let x1 = &mut self.xn1[channel];

        match self.saturation {
            Saturation::Linear => {
                let y = input * c.b0 + *x1;
                *x1 = input * c.b1 + y * c.a1;
                y
            }
            Saturation::Nonlinear1 => {
                let y = input * c.b0 + *x1;
                *x1 = (input * c.b1 + y * c.a1).tanh();
                y
            }
            Saturation::Nonlinear2 => {
                let y = (input * c.b0 + *x1).tanh();
                *x1 = input * c.b1 + y * c.a1;
                y
            }
            Saturation::Nonlinear3 => {
                let y = (input * c.b0 + *x1).tanh();
                *x1 = (input * c.b1 + y * c.a1).tanh();
                y
            }
            Saturation::Nonlinear4 => {
                let warped = input.sin();
                let y = (warped * c.b0 + *x1).clamp(-S::ONE, S::ONE).asin();
                *x1 = warped * c.b1 + y * c.a1;
                y
            }
        }
    }

    /// Process a block of channel buffers through the filter.
    ///
    /// Iterates frame-outer/channel-inner over
    /// [`process_sample`](Self::process_sample) so parameter ramps advance
    /// once per frame. With `bypass` set the input is copied through
    /// untouched. Ends with a denormal flush of the channel state.
    pub fn process_block(&mut self, input: &[&[S]], output: &mut [&mut [S]], bypass: bool) {
        debug_assert_eq!(input.len(), output.len(), "channel count mismatch");

        if bypass {
            for (src, dst) in input.iter().zip(output.iter_mut()) {
                dst.copy_from_slice(src);
            }
            return;
        }

        let frames = input.first().map_or(0, |ch| ch.len());
        for frame in 0..frames {
            for (channel, (src, dst)) in input.iter().zip(output.iter_mut()).enumerate() {
                dst[frame] = self.process_sample(channel, src[frame]);
            }
        }

        self.snap_to_zero();
    }

    /// Current frequency target in Hz.
    pub fn frequency(&self) -> S {
        self.frequency.target()
    }

    /// Current gain target in dB.
    pub fn gain_db(&self) -> S {
        self.gain_db.target()
    }

    /// Current response type.
    pub fn filter_type(&self) -> FirstOrderKind {
        self.kind
    }

    /// Current saturation placement.
    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    /// Whether a parameter ramp is still in flight.
    pub fn is_smoothing(&self) -> bool {
        self.frequency.is_smoothing() || self.gain_db.is_smoothing()
    }

    /// Processing latency in samples (IIR: none).
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// Current coefficient set (shared by all channels).
    pub fn coefficients(&self) -> FirstOrderCoeffs<S> {
        self.coeffs
    }

    /// Advance the ramps one step; recompute coefficients only when a ramp
    /// actually moved.
    fn tick_smoothing(&mut self) {
        if self.is_smoothing() {
            self.frequency.next_value();
            self.gain_db.next_value();
            self.recompute_coefficients();
        }
    }

    fn recompute_coefficients(&mut self) {
        let omega = hz_to_omega(self.frequency.current(), self.sample_rate);
        let amp = db_to_amplitude_half(self.gain_db.current());
        self.coeffs = first_order_coefficients(self.kind, omega, amp);
    }
}

impl<S: Sample> Default for FirstOrderFilter<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(kind: FirstOrderKind, sat: Saturation) -> FirstOrderFilter<f64> {
        let mut f = FirstOrderFilter::new();
        f.set_filter_type(kind);
        f.set_saturation(sat);
        f.prepare(&StreamConfig::new(48000.0, 2));
        f
    }

    #[test]
    fn impulse_response_matches_closed_form() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        f.set_frequency(1000.0);

        let w = core::f64::consts::TAU * 1000.0 / 48000.0;
        let b0 = w / (1.0 + w);
        let b1 = b0;
        let a1 = (1.0 - w) / (1.0 + w);

        let y0 = f.process_sample(0, 1.0);
        let y1 = f.process_sample(0, 0.0);
        assert!((y0 - b0).abs() / b0 < 1e-6, "y0={y0}, b0={b0}");
        let expected_y1 = b1 + a1 * y0;
        assert!(
            (y1 - expected_y1).abs() / expected_y1.abs() < 1e-6,
            "y1={y1}, expected {expected_y1}"
        );
    }

    #[test]
    fn dc_passes_through_lowpass() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = f.process_sample(0, 1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC gain should be unity, got {out}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut f = prepared(FirstOrderKind::HighPass, Saturation::Linear);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = f.process_sample(0, 1.0);
        }
        assert!(out.abs() < 1e-4, "DC should be rejected, got {out}");
    }

    #[test]
    fn frequency_clamped_to_stream_bounds() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        f.set_frequency(1.0);
        assert!((f.frequency() - 48000.0 / 24576.0).abs() < 1e-9);
        f.set_frequency(96000.0);
        assert!((f.frequency() - 48000.0 / 2.125).abs() < 1e-9);
    }

    #[test]
    fn coefficient_recompute_is_idempotent() {
        let mut a = prepared(FirstOrderKind::HighShelf, Saturation::Linear);
        a.set_smoothing_secs(0.0);
        a.set_gain_db(6.0);
        a.set_frequency(440.0);

        let mut b = prepared(FirstOrderKind::HighShelf, Saturation::Linear);
        b.set_smoothing_secs(0.0);
        b.set_gain_db(6.0);
        b.set_frequency(440.0);
        b.set_frequency(440.0);

        assert_eq!(a.coefficients(), b.coefficients());
    }

    #[test]
    fn zero_input_stays_zero_for_all_variants() {
        for sat in [
            Saturation::Linear,
            Saturation::Nonlinear1,
            Saturation::Nonlinear2,
            Saturation::Nonlinear3,
            Saturation::Nonlinear4,
        ] {
            let mut f = prepared(FirstOrderKind::LowShelf, sat);
            f.set_gain_db(9.0);
            f.reset();
            for _ in 0..64 {
                let y = f.process_sample(0, 0.0);
                assert_eq!(y, 0.0, "variant {sat:?} leaked energy from silence");
            }
        }
    }

    #[test]
    fn linear_mode_is_homogeneous() {
        let signal: Vec<f64> = (0..128).map(|i| (f64::from(i) * 0.7).sin() * 0.3).collect();
        let k = 3.5;

        let mut a = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        let mut b = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        for &x in &signal {
            let ya = a.process_sample(0, x);
            let yb = b.process_sample(0, x * k);
            assert!((ya * k - yb).abs() < 1e-9, "scaling must commute in linear mode");
        }
    }

    #[test]
    fn saturated_variants_are_not_homogeneous() {
        let mut a = prepared(FirstOrderKind::LowPass, Saturation::Nonlinear3);
        let mut b = prepared(FirstOrderKind::LowPass, Saturation::Nonlinear3);
        let mut diverged = false;
        for i in 0..256 {
            let x = (f64::from(i) * 0.31).sin() * 0.8;
            let ya = a.process_sample(0, x);
            let yb = b.process_sample(0, x * 4.0);
            if (ya * 4.0 - yb).abs() > 1e-3 {
                diverged = true;
            }
        }
        assert!(diverged, "tanh path should break homogeneity");
    }

    #[test]
    fn channels_do_not_leak() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        f.process_sample(0, 1.0);
        let y = f.process_sample(1, 0.0);
        assert_eq!(y, 0.0, "channel 1 must not see channel 0 state");
    }

    #[test]
    fn reset_to_dc_seeds_registers() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        f.reset_to(0.5);
        let y = f.process_sample(0, 0.0);
        assert_eq!(y, 0.5, "seeded register should appear at the output");
    }

    #[test]
    fn smoothing_ramps_then_settles() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        assert!(!f.is_smoothing());
        f.set_frequency(4000.0);
        assert!(f.is_smoothing());
        // Default ramp is 20 ms = 960 frames at 48 kHz.
        for _ in 0..960 {
            f.process_sample(0, 0.0);
        }
        assert!(!f.is_smoothing());

        // Settled coefficients equal a direct computation at the target.
        let mut direct = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        direct.set_smoothing_secs(0.0);
        direct.set_frequency(4000.0);
        let a = f.coefficients();
        let b = direct.coefficients();
        assert!((a.b0 - b.b0).abs() < 1e-12);
        assert!((a.a1 - b.a1).abs() < 1e-12);
    }

    #[test]
    fn block_processing_matches_per_sample() {
        let input: Vec<f64> = (0..64).map(|i| (f64::from(i) * 0.4).sin()).collect();

        let mut per_sample = prepared(FirstOrderKind::LowPass, Saturation::Nonlinear2);
        let expected: Vec<f64> = input.iter().map(|&x| per_sample.process_sample(0, x)).collect();

        let mut blocked = prepared(FirstOrderKind::LowPass, Saturation::Nonlinear2);
        let input_right = input.clone();
        let mut out_left = vec![0.0; input.len()];
        let mut out_right = vec![0.0; input.len()];
        let in_refs: [&[f64]; 2] = [&input, &input_right];
        let mut out_refs: [&mut [f64]; 2] = [&mut out_left, &mut out_right];
        blocked.process_block(&in_refs, &mut out_refs, false);

        for (got, want) in out_left.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn bypass_copies_input() {
        let mut f = prepared(FirstOrderKind::HighPass, Saturation::Nonlinear1);
        let input: Vec<f64> = (0..32).map(|i| f64::from(i) * 0.01).collect();
        let mut out = vec![0.0; 32];
        let in_refs: [&[f64]; 1] = [&input];
        let mut out_refs: [&mut [f64]; 1] = [&mut out];
        f.process_block(&in_refs, &mut out_refs, true);
        assert_eq!(out, input);
    }

    #[test]
    fn denormal_flush_zeroes_decayed_state() {
        let mut f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        f.set_frequency(100.0);
        f.process_sample(0, 1.0);
        // Decay the register below the 1e-20 flush threshold but far above
        // the f64 underflow point, so only the flush can zero it.
        for _ in 0..6000 {
            f.process_sample(0, 0.0);
        }
        let before = f.process_sample(0, 0.0);
        assert_ne!(before, 0.0, "state should still be a tiny nonzero tail");
        f.snap_to_zero();
        let y = f.process_sample(0, 0.0);
        assert_eq!(y, 0.0, "flushed state must produce exact zero");
    }

    #[test]
    fn reports_zero_latency() {
        let f = prepared(FirstOrderKind::LowPass, Saturation::Linear);
        assert_eq!(f.latency_samples(), 0);
    }
}
