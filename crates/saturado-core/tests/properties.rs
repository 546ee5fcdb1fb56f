//! Property-based tests for the saturado filter engines.
//!
//! Randomized checks of recursion stability, linearity of the linear
//! path, ramp convergence and parameter clamping using proptest.

use proptest::prelude::*;
use saturado_core::{
    BiquadKind, FirstOrderFilter, FirstOrderKind, LinearSmoothed, Saturation, SecondOrderFilter,
    StreamConfig, Topology,
};

const SAMPLE_RATE: f64 = 48000.0;

fn first_order_kind(variant: usize) -> FirstOrderKind {
    match variant % 6 {
        0 => FirstOrderKind::LowPass,
        1 => FirstOrderKind::HighPass,
        2 => FirstOrderKind::LowShelf,
        3 => FirstOrderKind::LowShelfC,
        4 => FirstOrderKind::HighShelf,
        _ => FirstOrderKind::HighShelfC,
    }
}

fn biquad_kind(variant: usize) -> BiquadKind {
    match variant % 15 {
        0 => BiquadKind::LowPass2,
        1 => BiquadKind::LowPass1,
        2 => BiquadKind::HighPass2,
        3 => BiquadKind::HighPass1,
        4 => BiquadKind::BandPass,
        5 => BiquadKind::BandPassQ,
        6 => BiquadKind::LowShelf2,
        7 => BiquadKind::LowShelf1,
        8 => BiquadKind::LowShelf1C,
        9 => BiquadKind::HighShelf2,
        10 => BiquadKind::HighShelf1,
        11 => BiquadKind::HighShelf1C,
        12 => BiquadKind::Peak,
        13 => BiquadKind::Notch,
        _ => BiquadKind::AllPass,
    }
}

fn saturation(variant: usize) -> Saturation {
    match variant % 5 {
        0 => Saturation::Linear,
        1 => Saturation::Nonlinear1,
        2 => Saturation::Nonlinear2,
        3 => Saturation::Nonlinear3,
        _ => Saturation::Nonlinear4,
    }
}

fn topology(variant: usize) -> Topology {
    match variant % 4 {
        0 => Topology::DirectFormI,
        1 => Topology::DirectFormII,
        2 => Topology::DirectFormITransposed,
        _ => Topology::DirectFormIITransposed,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any valid frequency, gain and saturation placement, the
    /// first-order engine produces finite output for random input.
    #[test]
    fn first_order_stability(
        freq in 20.0f32..20000.0f32,
        gain_db in -24.0f32..24.0f32,
        kind in 0usize..6,
        sat in 0usize..5,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut filter = FirstOrderFilter::<f32>::new();
        filter.set_filter_type(first_order_kind(kind));
        filter.set_saturation(saturation(sat));
        filter.prepare(&StreamConfig::new(SAMPLE_RATE, 1));
        filter.set_smoothing_secs(0.0);
        filter.set_frequency(freq);
        filter.set_gain_db(gain_db);

        for &sample in &input {
            let out = filter.process_sample(0, sample);
            prop_assert!(
                out.is_finite(),
                "first-order {:?}/{:?} (freq={}, gain={}) produced {} for input {}",
                first_order_kind(kind), saturation(sat), freq, gain_db, out, sample
            );
        }
    }

    /// For any valid frequency, gain, resonance, topology and saturation
    /// placement, the second-order engine produces finite output.
    #[test]
    fn second_order_stability(
        freq in 20.0f32..20000.0f32,
        gain_db in -24.0f32..24.0f32,
        resonance in 0.0f32..=1.0f32,
        kind in 0usize..15,
        topo in 0usize..4,
        sat in 0usize..5,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut filter = SecondOrderFilter::<f32>::new();
        filter.set_filter_type(biquad_kind(kind));
        filter.set_topology(topology(topo));
        filter.set_saturation(saturation(sat));
        filter.prepare(&StreamConfig::new(SAMPLE_RATE, 1));
        filter.set_smoothing_secs(0.0);
        filter.set_frequency(freq);
        filter.set_gain_db(gain_db);
        filter.set_resonance(resonance);

        for &sample in &input {
            let out = filter.process_sample(0, sample);
            prop_assert!(
                out.is_finite(),
                "biquad {:?}/{:?}/{:?} (freq={}, gain={}, q={}) produced {}",
                biquad_kind(kind), topology(topo), saturation(sat),
                freq, gain_db, resonance, out
            );
        }
    }

    /// The linear path is homogeneous: scaling the input scales the
    /// output, for every response type and topology.
    #[test]
    fn linear_path_is_homogeneous(
        freq in 50.0f64..18000.0f64,
        resonance in 0.0f64..0.95f64,
        scale in 0.1f64..8.0f64,
        kind in 0usize..15,
        topo in 0usize..4,
        input in prop::collection::vec(-1.0f64..=1.0f64, 64),
    ) {
        let make = || {
            let mut f = SecondOrderFilter::<f64>::new();
            f.set_filter_type(biquad_kind(kind));
            f.set_topology(topology(topo));
            f.prepare(&StreamConfig::new(SAMPLE_RATE, 1));
            f.set_smoothing_secs(0.0);
            f.set_frequency(freq);
            f.set_resonance(resonance);
            f
        };
        let mut reference = make();
        let mut scaled = make();

        for &x in &input {
            let ya = reference.process_sample(0, x);
            let yb = scaled.process_sample(0, x * scale);
            prop_assert!(
                (ya * scale - yb).abs() < 1e-6 * scale.max(1.0),
                "homogeneity broken for {:?}/{:?}: {} vs {}",
                biquad_kind(kind), topology(topo), ya * scale, yb
            );
        }
    }

    /// Linear ramps land on their target exactly after the configured
    /// number of steps, for any start, target and duration.
    #[test]
    fn ramp_lands_exactly(
        initial in -100.0f64..100.0f64,
        target in -100.0f64..100.0f64,
        ramp_ms in 1.0f64..50.0f64,
    ) {
        let mut ramp = LinearSmoothed::new(initial);
        ramp.reset(SAMPLE_RATE, ramp_ms / 1000.0);
        ramp.set_target(target);

        let steps = (ramp_ms / 1000.0 * SAMPLE_RATE) as usize;
        let mut last = initial;
        for _ in 0..steps {
            last = ramp.next_value();
        }
        prop_assert_eq!(last, target, "ramp must land bit-exactly");
        prop_assert!(!ramp.is_smoothing());
    }

    /// `set_frequency` never lets an out-of-range value reach the
    /// coefficient path: the stored target is always inside the bounds
    /// derived from the sample rate.
    #[test]
    fn frequency_always_clamped(
        freq in -1000.0f64..100_000.0f64,
        sample_rate in 8000.0f64..192_000.0f64,
    ) {
        let mut filter = SecondOrderFilter::<f64>::new();
        filter.prepare(&StreamConfig::new(sample_rate, 1));
        filter.set_frequency(freq);

        let lo = sample_rate / 24576.0;
        let hi = sample_rate / 2.125;
        let hz = filter.frequency();
        prop_assert!(
            (lo..=hi).contains(&hz),
            "target {} escaped [{}, {}] at sr {}", hz, lo, hi, sample_rate
        );
    }

    /// Reset followed by silence yields exact silence for every
    /// (topology, saturation) pair, even with hot parameters.
    #[test]
    fn silence_in_silence_out(
        gain_db in -24.0f32..24.0f32,
        resonance in 0.0f32..=1.0f32,
        topo in 0usize..4,
        sat in 0usize..5,
    ) {
        let mut filter = SecondOrderFilter::<f32>::new();
        filter.set_topology(topology(topo));
        filter.set_saturation(saturation(sat));
        filter.prepare(&StreamConfig::new(SAMPLE_RATE, 1));
        filter.set_smoothing_secs(0.0);
        filter.set_gain_db(gain_db);
        filter.set_resonance(resonance);
        filter.reset();

        for _ in 0..128 {
            let out = filter.process_sample(0, 0.0);
            prop_assert_eq!(out, 0.0);
        }
    }
}
