use crate::analysis::spectrum::{
    MAX_DECIBELS, MIN_DECIBELS, blackman_window, decibels_to_byte, magnitudes, peak_level,
    rms_level, sample_to_byte, smooth,
};

use std::f32::consts::PI;

/// WHAT: The Blackman window tapers to zero at its start
/// WHY: Tapering suppresses leakage between bins
#[test]
fn given_window_length_when_building_blackman_then_tapers_at_edges() {
    // Given: A 64-point window
    let window = blackman_window(64);

    // When: Inspecting its start and centre
    let start = window[0];
    let centre = window[32];

    // Then: Near zero at the edge, one at the centre
    assert_eq!(window.len(), 64);
    assert!(start.abs() < 1e-6);
    assert!((centre - 1.0).abs() < 1e-5);
}

/// WHAT: A pure tone peaks in its own frequency bin
/// WHY: The visualiser must put energy where the signal is
#[test]
fn given_pure_tone_when_transforming_then_peak_at_tone_bin() {
    // Given: A sine completing 8 cycles across 128 samples
    let n = 128;
    let samples: Vec<f32> = (0..n)
        .map(|i| (2.0 * PI * 8.0 * i as f32 / n as f32).sin())
        .collect();
    let window = blackman_window(n);

    // When: Transforming
    let bins = magnitudes(&samples, &window);

    // Then: Half as many bins as samples, with the maximum at bin 8
    assert_eq!(bins.len(), n / 2);
    let loudest = bins
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |best, (k, &m)| if m > best.1 { (k, m) } else { best });
    assert_eq!(loudest.0, 8);
}

/// WHAT: Smoothing blends 80% of the previous frame with the current one
/// WHY: Spectrum bars must not flicker between frames
#[test]
fn given_previous_frame_when_smoothing_then_weighted_average() {
    // Given: A previous frame of ones and a current frame of zeros
    let mut previous = vec![1.0, 1.0];
    let current = [0.0, 0.5];

    // When: Smoothing
    smooth(&mut previous, &current);

    // Then: 0.8 * prev + 0.2 * cur
    assert!((previous[0] - 0.8).abs() < 1e-6);
    assert!((previous[1] - 0.9).abs() < 1e-6);
}

/// WHAT: Decibels map linearly onto bytes over the display range
/// WHY: Byte frequency data must match the -100..-30 dB scale
#[test]
fn given_decibel_values_when_scaling_to_bytes_then_clamped_to_range() {
    // Given / When / Then: Range ends, out-of-range values and silence
    assert_eq!(decibels_to_byte(MIN_DECIBELS), 0);
    assert_eq!(decibels_to_byte(MAX_DECIBELS), 255);
    assert_eq!(decibels_to_byte(-200.0), 0);
    assert_eq!(decibels_to_byte(0.0), 255);
    assert_eq!(decibels_to_byte(f32::NEG_INFINITY), 0);
    assert_eq!(decibels_to_byte(f32::NAN), 0);
}

/// WHAT: Waveform bytes centre silence on 128
/// WHY: Oscilloscope views draw around the midline
#[test]
fn given_samples_when_scaling_to_bytes_then_silence_is_midpoint() {
    // Given / When / Then: Silence, full scale and overload
    assert_eq!(sample_to_byte(0.0), 128);
    assert_eq!(sample_to_byte(-1.0), 0);
    assert_eq!(sample_to_byte(1.0), 255);
    assert_eq!(sample_to_byte(-3.0), 0);
}

/// WHAT: Level meters report RMS and peak amplitude
/// WHY: Input meters show both loudness and clipping headroom
#[test]
fn given_samples_when_measuring_levels_then_rms_and_peak() {
    // Given: A mixed-amplitude buffer
    let samples = [0.0, -0.8, 0.6, 0.0];

    // When: Measuring
    let rms = rms_level(&samples);
    let peak = peak_level(&samples);

    // Then: sqrt((0.64 + 0.36) / 4) = 0.5, peak is |-0.8|
    assert!((rms - 0.5).abs() < 1e-6);
    assert!((peak - 0.8).abs() < 1e-6);
    assert_eq!(rms_level(&[]), 0.0);
}

/// WHAT: The fast transform agrees with a direct DFT
/// WHY: Bin magnitudes must not depend on how the transform is computed
#[test]
fn given_mixed_signal_when_transforming_then_matches_direct_dft() {
    // Given: Two tones plus an offset across 64 samples
    let n = 64;
    let samples: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            0.6 * (2.0 * PI * 3.0 * t).sin() + 0.3 * (2.0 * PI * 11.0 * t).cos() + 0.05
        })
        .collect();
    let window = blackman_window(n);

    // When: Transforming both ways
    let fast = magnitudes(&samples, &window);
    let direct: Vec<f32> = (0..n / 2)
        .map(|k| {
            let (mut re, mut im) = (0.0f32, 0.0f32);
            for (i, (&sample, &w)) in samples.iter().zip(&window).enumerate() {
                let phase = 2.0 * PI * ((k * i) % n) as f32 / n as f32;
                let x = sample * w;
                re += x * phase.cos();
                im -= x * phase.sin();
            }
            (re * re + im * im).sqrt() / n as f32
        })
        .collect();

    // Then: Every bin agrees
    assert_eq!(fast.len(), direct.len());
    for (k, (a, b)) in fast.iter().zip(&direct).enumerate() {
        assert!((a - b).abs() < 1e-4, "bin {k}: {a} vs {b}");
    }
}

/// WHAT: The largest accepted transform size resolves a tone
/// WHY: Large sizes must stay usable at UI refresh rates
#[test]
fn given_largest_transform_when_transforming_then_peak_at_tone_bin() {
    // Given: A 32768-sample sine completing 1000 cycles
    let n = 32_768;
    let samples: Vec<f32> = (0..n)
        .map(|i| (2.0 * PI * 1000.0 * i as f32 / n as f32).sin())
        .collect();
    let window = blackman_window(n);

    // When: Transforming
    let bins = magnitudes(&samples, &window);

    // Then: The maximum sits at bin 1000
    assert_eq!(bins.len(), n / 2);
    let loudest = bins
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |best, (k, &m)| if m > best.1 { (k, m) } else { best });
    assert_eq!(loudest.0, 1000);
}
