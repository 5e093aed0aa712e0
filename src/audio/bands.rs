//! Reduces a frequency-magnitude spectrum to bass / mid / treble / total energy.

use std::ops::Range;

use log::trace;

/// Frequency range summed into [`Bands::bass`].
pub const BASS_HZ: Range<f32> = 20.0..250.0;
/// Frequency range summed into [`Bands::mid`].
pub const MID_HZ: Range<f32> = 250.0..2000.0;
/// Frequency range summed into [`Bands::treble`].
pub const TREBLE_HZ: Range<f32> = 2000.0..16000.0;

/// Mean normalized magnitude per frequency band, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub total: f32,
}

#[derive(Default)]
struct Accumulator {
    sum: f32,
    count: u32,
}

impl Accumulator {
    fn add(&mut self, value: f32) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f32).clamp(0.0, 1.0)
        }
    }
}

/// Computes the band energies of one analyser spectrum.
///
/// `frequency` holds the byte magnitudes produced by the analyser. Bin `i`
/// sits at `i * (sample_rate / 2) / frequency.len()` Hz. `fft_size` is the
/// analyser window the spectrum came from; it is informational only, since
/// the bin width follows from the spectrum length. Each frame is computed on
/// its own; any smoothing happens in the analyser.
pub fn compute_bands(frequency: &[u8], fft_size: usize, sample_rate: f32) -> Bands {
    if frequency.is_empty() {
        return Bands::default();
    }
    if frequency.len() * 2 != fft_size {
        trace!(
            "spectrum of {} bins does not match fft size {fft_size}",
            frequency.len()
        );
    }

    let bin_width = (sample_rate / 2.0) / frequency.len() as f32;
    let mut bass = Accumulator::default();
    let mut mid = Accumulator::default();
    let mut treble = Accumulator::default();
    let mut total = Accumulator::default();

    for (bin, &magnitude) in frequency.iter().enumerate() {
        let hz = bin as f32 * bin_width;
        let value = f32::from(magnitude) / 255.0;

        if BASS_HZ.contains(&hz) {
            bass.add(value);
        } else if MID_HZ.contains(&hz) {
            mid.add(value);
        } else if TREBLE_HZ.contains(&hz) {
            treble.add(value);
        }
        total.add(value);
    }

    Bands {
        bass: bass.mean(),
        mid: mid.mean(),
        treble: treble.mean(),
        total: total.mean(),
    }
}
