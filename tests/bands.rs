use proptest::prelude::*;
use sonic_viz::audio::bands::{compute_bands, Bands};

const SAMPLE_RATE: f32 = 44100.0;
const FFT_SIZE: usize = 2048;
const BINS: usize = FFT_SIZE / 2;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

proptest! {
    #[test]
    fn bands_stay_normalized(
        magnitudes in prop::collection::vec(any::<u8>(), 0..2048),
        sample_rate in 8000.0f32..96000.0,
    ) {
        let bands = compute_bands(&magnitudes, magnitudes.len() * 2, sample_rate);
        for value in [bands.bass, bands.mid, bands.treble, bands.total] {
            prop_assert!((0.0..=1.0).contains(&value), "{bands:?}");
        }
    }
}

#[test]
fn silence_yields_zero_bands() {
    let bands = compute_bands(&[0; BINS], FFT_SIZE, SAMPLE_RATE);
    assert_eq!(bands, Bands::default());
}

#[test]
fn full_scale_yields_unit_bands() {
    let bands = compute_bands(&[255; BINS], FFT_SIZE, SAMPLE_RATE);
    assert!(approx(bands.bass, 1.0), "{bands:?}");
    assert!(approx(bands.mid, 1.0), "{bands:?}");
    assert!(approx(bands.treble, 1.0), "{bands:?}");
    assert!(approx(bands.total, 1.0), "{bands:?}");
}

#[test]
fn low_bin_energy_lands_in_bass_only() {
    // ~21.5 Hz per bin, so bin 5 sits near 107 Hz.
    let mut magnitudes = [0u8; BINS];
    magnitudes[5] = 255;

    let bands = compute_bands(&magnitudes, FFT_SIZE, SAMPLE_RATE);
    assert!(bands.bass > 0.0);
    assert_eq!(bands.mid, 0.0);
    assert_eq!(bands.treble, 0.0);
    assert!(approx(bands.total, 1.0 / BINS as f32));
}

#[test]
fn band_means_use_only_their_own_bins() {
    // Bins 1..=11 cover [21.5, 237) Hz: the whole bass band.
    let mut magnitudes = [0u8; BINS];
    for m in &mut magnitudes[1..=11] {
        *m = 255;
    }
    let bands = compute_bands(&magnitudes, FFT_SIZE, SAMPLE_RATE);
    assert!(approx(bands.bass, 1.0), "{bands:?}");
    assert_eq!(bands.mid, 0.0);
}

#[test]
fn energy_above_treble_counts_only_toward_total() {
    // Bin 800 is ~17.2 kHz, above the treble band.
    let mut magnitudes = [0u8; BINS];
    magnitudes[800] = 255;

    let bands = compute_bands(&magnitudes, FFT_SIZE, SAMPLE_RATE);
    assert_eq!(bands.bass, 0.0);
    assert_eq!(bands.mid, 0.0);
    assert_eq!(bands.treble, 0.0);
    assert!(bands.total > 0.0);
}

#[test]
fn bands_follow_the_sample_rate() {
    // At 8 kHz each of 1024 bins spans ~3.9 Hz, so bin 100 is ~390 Hz: mid, not bass.
    let mut magnitudes = [0u8; BINS];
    magnitudes[100] = 255;

    let bands = compute_bands(&magnitudes, FFT_SIZE, 8000.0);
    assert_eq!(bands.bass, 0.0);
    assert!(bands.mid > 0.0);
}

#[test]
fn mismatched_fft_size_does_not_change_the_result() {
    let magnitudes = [10u8; BINS];
    assert_eq!(
        compute_bands(&magnitudes, 4096, SAMPLE_RATE),
        compute_bands(&magnitudes, FFT_SIZE, SAMPLE_RATE)
    );
}

#[test]
fn empty_spectrum_yields_zero_bands() {
    assert_eq!(compute_bands(&[], 0, SAMPLE_RATE), Bands::default());
}
