use crate::{AnalysisGraph, CaptureError, DEFAULT_FFT_SIZE, validate_fft_size};

/// WHAT: FFT sizes must be powers of two within bounds
/// WHY: The transform and bin count depend on it
#[test]
fn given_fft_sizes_when_validating_then_only_bounded_powers_of_two_pass() {
    // Given / When / Then: Accepted and rejected sizes
    for size in [32, DEFAULT_FFT_SIZE, 2048, 32_768] {
        assert!(validate_fft_size(size).is_ok(), "{size}");
    }
    for size in [0, 16, 100, 65_536] {
        assert!(
            matches!(
                validate_fft_size(size),
                Err(CaptureError::InvalidConfiguration { .. })
            ),
            "{size}"
        );
    }
}

/// WHAT: A fresh tap reads a silent, zero-padded window
/// WHY: Visualisers may poll before any audio arrived
#[test]
#[allow(clippy::unwrap_used)]
fn given_new_graph_when_reading_tap_then_silent_window() {
    // Given: A graph with no input
    let graph = AnalysisGraph::new(64).unwrap();
    let tap = graph.tap();

    // When: Reading every view
    let waveform = tap.byte_time_domain_data();
    let spectrum = tap.byte_frequency_data();
    let levels = tap.levels();

    // Then: Silence everywhere
    assert_eq!(waveform, vec![128; 64]);
    assert_eq!(spectrum, vec![0; 32]);
    assert_eq!(levels.rms, 0.0);
    assert_eq!(levels.peak, 0.0);
    assert!(tap.is_live());
}

/// WHAT: The input keeps only the newest fft_size samples
/// WHY: The tap always reflects the most recent audio
#[test]
#[allow(clippy::unwrap_used)]
fn given_more_samples_than_window_when_writing_then_newest_kept() {
    // Given: A 32-point graph
    let graph = AnalysisGraph::new(32).unwrap();
    let input = graph.input();

    // When: Writing 40 samples over two calls
    let first: Vec<f32> = (0..20).map(|i| i as f32 / 100.0).collect();
    let second: Vec<f32> = (20..40).map(|i| i as f32 / 100.0).collect();
    input.write(&first);
    input.write(&second);

    // Then: The window holds samples 8..40
    let window = graph.tap().float_time_domain_data();
    assert_eq!(window.len(), 32);
    assert!((window[0] - 0.08).abs() < 1e-6);
    assert!((window[31] - 0.39).abs() < 1e-6);
}

/// WHAT: Closing the graph freezes the tap and is reported once
/// WHY: Teardown closes the graph exactly once and stale taps stay readable
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_graph_when_closed_then_input_ignored_and_close_not_repeated() {
    // Given: A graph with a tap holding some audio
    let graph = AnalysisGraph::new(32).unwrap();
    let input = graph.input();
    let tap = graph.tap();
    input.write(&[0.25; 32]);

    // When: Closing, then writing louder audio
    let first_close = graph.close();
    let second_close = graph.close();
    input.write(&[1.0; 32]);

    // Then: The tap is stale and still shows the old window
    assert!(first_close);
    assert!(!second_close);
    assert!(graph.is_closed());
    assert!(!tap.is_live());
    assert!((tap.levels().peak - 0.25).abs() < 1e-6);
}

/// WHAT: Frequency data has one smoothed dB value per bin
/// WHY: Spectrum views size their bars from the bin count
#[test]
#[allow(clippy::unwrap_used)]
fn given_loud_input_when_reading_frequency_data_then_bins_above_floor() {
    // Given: A graph fed with a loud alternating signal
    let graph = AnalysisGraph::new(64).unwrap();
    let samples: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 0.9 } else { -0.9 }).collect();
    graph.input().write(&samples);
    let tap = graph.tap();

    // When: Reading the spectrum
    let decibels = tap.float_frequency_data();

    // Then: Bin count matches and the spectrum carries energy
    assert_eq!(decibels.len(), tap.frequency_bin_count());
    assert!(decibels.iter().any(|db| *db > -100.0));
}
