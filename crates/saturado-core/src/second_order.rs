//! Second-order (biquad) nonlinear filter engine.
//!
//! Two orthogonal configuration axes select the per-sample recursion:
//!
//! # Topology (linear path)
//!
//! Four realizations of the same transfer function, differing in which
//! intermediate values live in the delay registers. With feedback taps
//! stored negated (see [`crate::coeffs`]):
//!
//! | topology | registers | recursion |
//! |---|---|---|
//! | direct form I | `x1 x2 y1 y2` | `y = b0·x + b1·x1 + b2·x2 + a1·y1 + a2·y2` |
//! | direct form II | `w1 w2` | `w = x + a1·w1 + a2·w2; y = b0·w + b1·w1 + b2·w2` |
//! | transposed I | `w1 w2 y1 y2` | two transposed accumulator chains |
//! | transposed II | `x1 x2` | `y = b0·x + x2; x2 = b1·x + x1 + a1·y; x1 = b2·x + a2·y` |
//!
//! Algebraically equivalent, numerically distinct — and once a
//! nonlinearity is injected at a specific node they are different filters
//! entirely, which is why topology and saturation are separate axes.
//!
//! # Saturation (on the transposed direct form II structure)
//!
//! The saturating recursions are defined on the transposed-II structure,
//! the only one whose nodes the nonlinear placements are specified for;
//! selecting any nonlinear variant therefore processes through that
//! structure regardless of the configured topology.
//!
//! | variant | tanh placement |
//! |---|---|
//! | `Nonlinear1` | forward tap into the output node (`b0`) |
//! | `Nonlinear2` | input-history taps (`b1`, `b2`) |
//! | `Nonlinear3` | output-feedback taps (`a1`, `a2`) |
//! | `Nonlinear4` | all five taps |

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::coeffs::{BiquadCoeffs, BiquadKind, Saturation, Topology, biquad_coefficients};
use crate::math::{db_to_amplitude, flush_denormal, hz_to_omega};
use crate::sample::Sample;
use crate::smooth::LinearSmoothed;
use crate::stream::StreamConfig;

/// Default parameter ramp duration in seconds.
const DEFAULT_RAMP_SECS: f64 = 0.02;

/// Second-order filter engine with per-channel state, four realization
/// topologies and five saturation placements.
///
/// # Lifecycle
///
/// [`prepare`](Self::prepare) must run before any processing: it sizes the
/// six delay-register vectors (one slot per channel each) and derives the
/// valid frequency range (`sample_rate/24576 ..= sample_rate/2.125`).
/// Unprepared processing or an out-of-range channel index is a
/// precondition violation, checked by `debug_assert!`.
///
/// # Example
///
/// ```rust
/// use saturado_core::{BiquadKind, SecondOrderFilter, StreamConfig, Topology};
///
/// let mut filter = SecondOrderFilter::<f32>::new();
/// filter.prepare(&StreamConfig::new(48000.0, 2));
/// filter.set_filter_type(BiquadKind::Peak);
/// filter.set_topology(Topology::DirectFormI);
/// filter.set_frequency(2500.0);
/// filter.set_gain_db(-4.0);
/// filter.set_resonance(0.3);
///
/// let y = filter.process_sample(0, 0.5);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct SecondOrderFilter<S: Sample> {
    coeffs: BiquadCoeffs<S>,

    // Delay registers, one slot per channel. Which vectors a given
    // recursion touches depends on topology; all are kept sized so
    // topology can change without reallocation.
    xn1: Vec<S>,
    xn2: Vec<S>,
    wn1: Vec<S>,
    wn2: Vec<S>,
    yn1: Vec<S>,
    yn2: Vec<S>,

    frequency: LinearSmoothed<S>,
    gain_db: LinearSmoothed<S>,
    resonance: LinearSmoothed<S>,

    kind: BiquadKind,
    saturation: Saturation,
    topology: Topology,

    sample_rate: f64,
    ramp_secs: f64,
    min_freq: S,
    max_freq: S,
}

impl<S: Sample> SecondOrderFilter<S> {
    /// Create an unprepared engine (lowpass, 1 kHz, 0 dB, resonance 0.5,
    /// no saturation, transposed direct form II).
    pub fn new() -> Self {
        Self {
            coeffs: BiquadCoeffs::identity(),
            xn1: Vec::new(),
            xn2: Vec::new(),
            wn1: Vec::new(),
            wn2: Vec::new(),
            yn1: Vec::new(),
            yn2: Vec::new(),
            frequency: LinearSmoothed::new(S::from_f64(1000.0)),
            gain_db: LinearSmoothed::new(S::ZERO),
            resonance: LinearSmoothed::new(S::from_f64(0.5)),
            kind: BiquadKind::default(),
            saturation: Saturation::default(),
            topology: Topology::default(),
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
        let n = config.channels;
        self.xn1 = vec![S::ZERO; n];
        self.xn2 = vec![S::ZERO; n];
        self.wn1 = vec![S::ZERO; n];
        self.wn2 = vec![S::ZERO; n];
        self.yn1 = vec![S::ZERO; n];
        self.yn2 = vec![S::ZERO; n];

        self.min_freq = S::from_f64(config.sample_rate / 24576.0);
        self.max_freq = S::from_f64(config.sample_rate / 2.125);

        self.frequency.reset(self.sample_rate, self.ramp_secs);
        self.gain_db.reset(self.sample_rate, self.ramp_secs);
        self.resonance.reset(self.sample_rate, self.ramp_secs);
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

    /// Set the gain in dB (peak and shelf modes only).
    pub fn set_gain_db(&mut self, db: S) {
        if db != self.gain_db.target() {
            self.gain_db.set_target(db);
            if !self.gain_db.is_smoothing() {
                self.recompute_coefficients();
            }
        }
    }

    /// Set the resonance, clamped into `[0, 1]`. Higher values narrow the
    /// damping term `α = sin(ω)·(1−resonance)`.
    pub fn set_resonance(&mut self, resonance: S) {
        let resonance = resonance.clamp(S::ZERO, S::ONE);
        if resonance != self.resonance.target() {
            self.resonance.set_target(resonance);
            if !self.resonance.is_smoothing() {
                self.recompute_coefficients();
            }
        }
    }

    /// Select the response type. Clears the delay registers.
    pub fn set_filter_type(&mut self, kind: BiquadKind) {
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

    /// Select the realization topology (linear path). Clears the delay
    /// registers — registers mean different things in different forms.
    pub fn set_topology(&mut self, topology: Topology) {
        if topology != self.topology {
            self.topology = topology;
            self.reset();
        }
    }

    /// Set the parameter ramp duration in seconds (applies from the next
    /// retarget; the current ramps are flattened).
    pub fn set_smoothing_secs(&mut self, secs: f64) {
        self.ramp_secs = secs;
        self.frequency.reset(self.sample_rate, secs);
        self.gain_db.reset(self.sample_rate, secs);
        self.resonance.reset(self.sample_rate, secs);
        self.recompute_coefficients();
    }

    /// Zero all delay registers.
    pub fn reset(&mut self) {
        self.reset_to(S::ZERO);
    }

    /// Set all delay registers to `initial` (e.g. a DC operating point).
    pub fn reset_to(&mut self, initial: S) {
        for v in [
            &mut self.xn1,
            &mut self.xn2,
            &mut self.wn1,
            &mut self.wn2,
            &mut self.yn1,
            &mut self.yn2,
        ] {
            for slot in v.iter_mut() {
                *slot = initial;
            }
        }
    }

    /// Flush subnormal-range register values to exact zero.
    ///
    /// Optional hygiene after sample-by-sample processing;
    /// [`process_block`](Self::process_block) runs it automatically.
    pub fn snap_to_zero(&mut self) {
        for v in [
            &mut self.xn1,
            &mut self.xn2,
            &mut self.wn1,
            &mut self.wn2,
            &mut self.yn1,
            &mut self.yn2,
        ] {
            for slot in v.iter_mut() {
                *slot = flush_denormal(*slot);
            }
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

        match self.saturation {
            Saturation::Linear => match self.topology {
                Topology::DirectFormI => self.direct_form_1(channel, input),
                Topology::DirectFormII => self.direct_form_2(channel, input),
                Topology::DirectFormITransposed => self.transposed_direct_form_1(channel, input),
                Topology::DirectFormIITransposed => self.transposed_direct_form_2(channel, input),
            },
            Saturation::Nonlinear1 => self.nonlinear1(channel, input),
            Saturation::Nonlinear2 => self.nonlinear2(channel, input),
            Saturation::Nonlinear3 => self.nonlinear3(channel, input),
            Saturation::Nonlinear4 => self.nonlinear4(channel, input),
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

    /// Current resonance target.
    pub fn resonance(&self) -> S {
        self.resonance.target()
    }

    /// Current response type.
    pub fn filter_type(&self) -> BiquadKind {
        self.kind
    }

    /// Current saturation placement.
    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    /// Current realization topology.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Whether a parameter ramp is still in flight.
    pub fn is_smoothing(&self) -> bool {
        self.frequency.is_smoothing()
            || self.gain_db.is_smoothing()
            || self.resonance.is_smoothing()
    }

    /// Processing latency in samples (IIR: none).
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// Current coefficient set (shared by all channels).
    pub fn coefficients(&self) -> BiquadCoeffs<S> {
        self.coeffs
    }

    /// Advance the ramps one step; recompute coefficients only when a ramp
    /// actually moved.
    fn tick_smoothing(&mut self) {
        if self.is_smoothing() {
            self.frequency.next_value();
            self.gain_db.next_value();
            self.resonance.next_value();
            self.recompute_coefficients();
        }
    }

    fn recompute_coefficients(&mut self) {
        let omega = hz_to_omega(self.frequency.current(), self.sample_rate);
        let amp = db_to_amplitude(self.gain_db.current());
        self.coeffs = biquad_coefficients(self.kind, omega, amp, self.resonance.current());
    }

    // --- linear realizations -------------------------------------------

    #[inline]
    fn direct_form_1(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (x1, x2) = (self.xn1[ch], self.xn2[ch]);
        let (y1, y2) = (self.yn1[ch], self.yn2[ch]);

        let y = x * c.b0 + x1 * c.b1 + x2 * c.b2 + y1 * c.a1 + y2 * c.a2;

        self.xn2[ch] = x1;
        self.xn1[ch] = x;
        self.yn2[ch] = y1;
        self.yn1[ch] = y;
        y
    }

    #[inline]
    fn direct_form_2(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (w1, w2) = (self.wn1[ch], self.wn2[ch]);

        let w = x + w1 * c.a1 + w2 * c.a2;
        let y = w * c.b0 + w1 * c.b1 + w2 * c.b2;

        self.wn2[ch] = w1;
        self.wn1[ch] = w;
        y
    }

    #[inline]
    fn transposed_direct_form_1(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;

        // Feedback accumulator chain (w registers), then feedforward
        // accumulator chain (y registers); both transposed.
        let w = x + self.wn1[ch];
        let y = w * c.b0 + self.yn1[ch];

        self.wn1[ch] = w * c.a1 + self.wn2[ch];
        self.wn2[ch] = w * c.a2;
        self.yn1[ch] = w * c.b1 + self.yn2[ch];
        self.yn2[ch] = w * c.b2;
        y
    }

    #[inline]
    fn transposed_direct_form_2(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (x1, x2) = (self.xn1[ch], self.xn2[ch]);

        let y = x * c.b0 + x2;

        self.xn2[ch] = x * c.b1 + x1 + y * c.a1;
        self.xn1[ch] = x * c.b2 + y * c.a2;
        y
    }

    // --- saturating recursions (transposed direct form II nodes) -------

    #[inline]
    fn nonlinear1(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (x1, x2) = (self.xn1[ch], self.xn2[ch]);

        let y = (x * c.b0).tanh() + x2;

        self.xn2[ch] = x * c.b1 + x1 + y * c.a1;
        self.xn1[ch] = x * c.b2 + y * c.a2;
        y
    }

    #[inline]
    fn nonlinear2(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (x1, x2) = (self.xn1[ch], self.xn2[ch]);

        let y = x * c.b0 + x2;

        self.xn2[ch] = (x * c.b1).tanh() + x1 + y * c.a1;
        self.xn1[ch] = (x * c.b2).tanh() + y * c.a2;
        y
    }

    #[inline]
    fn nonlinear3(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (x1, x2) = (self.xn1[ch], self.xn2[ch]);

        let y = x * c.b0 + x2;

        self.xn2[ch] = x * c.b1 + x1 + (y * c.a1).tanh();
        self.xn1[ch] = x * c.b2 + (y * c.a2).tanh();
        y
    }

    #[inline]
    fn nonlinear4(&mut self, ch: usize, x: S) -> S {
        let c = self.coeffs;
        let (x1, x2) = (self.xn1[ch], self.xn2[ch]);

        let y = (x * c.b0).tanh() + x2;

        self.xn2[ch] = (x * c.b1).tanh() + x1 + (y * c.a1).tanh();
        self.xn1[ch] = (x * c.b2).tanh() + (y * c.a2).tanh();
        y
    }
}

impl<S: Sample> Default for SecondOrderFilter<S> {
    fn default() -> Self {
        Self::new()
    }
}
