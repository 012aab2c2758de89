use super::biquad::FilterStage;
use super::design::{compute_coefficients, BiquadCoefficients, FilterShape};
use crate::error::DspError;
use crate::settings::{band_index, clamp_gain_db, EqualizerSettings, BAND_COUNT};

/// Q for the interior peaking bands; the outer shelves use unit slope.
const PEAKING_Q: f32 = 1.0;
const SHELF_SLOPE: f32 = 1.0;

/// Ordered cascade of six filter stages, one per fixed band frequency:
/// low shelf at 250 Hz, peaking interiors, high shelf at 8 kHz.
///
/// The bank holds only derived coefficients and delay state; the gain
/// values themselves live in the parameter store.
pub struct FilterBank {
    sample_rate: f32,
    stages: [FilterStage; BAND_COUNT],
}

impl FilterBank {
    /// Builds all six stages for the given sample rate, with delay lines at
    /// silence.
    pub fn new(sample_rate: f32, settings: &EqualizerSettings) -> Result<Self, DspError> {
        let mut coeffs = [BiquadCoefficients::identity(); BAND_COUNT];
        for (index, (frequency, gain_db)) in settings.iter().enumerate() {
            coeffs[index] = design_band(index, frequency, gain_db, sample_rate)?;
        }
        Ok(Self {
            sample_rate,
            stages: coeffs.map(FilterStage::new),
        })
    }

    /// Feeds the sample through all stages in ascending frequency order.
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let mut current = sample;
        for stage in &mut self.stages {
            current = stage.process_sample(current);
        }
        current
    }

    /// Recomputes coefficients for one band only; every other stage keeps
    /// both its coefficients and its delay state.
    pub fn set_band_gain(&mut self, frequency: u32, gain_db: f32) -> Result<(), DspError> {
        let index = band_index(frequency)?;
        let coeffs = design_band(index, frequency, gain_db, self.sample_rate)?;
        self.stages[index].update_coefficients(coeffs);
        Ok(())
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

fn design_band(
    index: usize,
    frequency: u32,
    gain_db: f32,
    sample_rate: f32,
) -> Result<BiquadCoefficients, DspError> {
    let shape = if index == 0 {
        FilterShape::LowShelf
    } else if index == BAND_COUNT - 1 {
        FilterShape::HighShelf
    } else {
        FilterShape::Peaking
    };
    let q_factor = match shape {
        FilterShape::Peaking => PEAKING_Q,
        _ => SHELF_SLOPE,
    };
    compute_coefficients(
        shape,
        frequency as f32,
        clamp_gain_db(gain_db),
        q_factor,
        sample_rate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BAND_FREQUENCIES;
    use std::f32::consts::PI;

    fn flat_bank() -> FilterBank {
        FilterBank::new(48_000.0, &EqualizerSettings::flat()).expect("bank should build")
    }

    fn stage_coefficients(bank: &FilterBank) -> Vec<BiquadCoefficients> {
        bank.stages.iter().map(|s| s.coefficients()).collect()
    }

    #[test]
    fn flat_bank_is_bit_exact_passthrough() {
        let mut bank = flat_bank();
        for sample in [1.0, -0.5, 0.25, 0.0, 0.8_f32] {
            assert_eq!(bank.process_sample(sample), sample);
        }
    }

    #[test]
    fn rejects_invalid_sample_rate() {
        let result = FilterBank::new(0.0, &EqualizerSettings::flat());
        assert!(matches!(result, Err(DspError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_unknown_band() {
        let mut bank = flat_bank();
        assert_eq!(
            bank.set_band_gain(440, 3.0),
            Err(DspError::UnknownBand(440))
        );
    }

    #[test]
    fn changing_one_band_leaves_the_others_untouched() {
        let mut bank = flat_bank();
        let before = stage_coefficients(&bank);
        bank.set_band_gain(2000, 6.0).expect("band should exist");
        let after = stage_coefficients(&bank);
        for (index, frequency) in BAND_FREQUENCIES.iter().enumerate() {
            if *frequency == 2000 {
                assert_ne!(before[index], after[index]);
            } else {
                assert_eq!(before[index], after[index], "band {frequency} Hz changed");
            }
        }
    }

    #[test]
    fn resetting_to_flat_twice_is_idempotent() {
        let mut bank = flat_bank();
        for frequency in BAND_FREQUENCIES {
            bank.set_band_gain(frequency, 7.0).expect("band should exist");
        }
        for frequency in BAND_FREQUENCIES {
            bank.set_band_gain(frequency, 0.0).expect("band should exist");
        }
        let once = stage_coefficients(&bank);
        for frequency in BAND_FREQUENCIES {
            bank.set_band_gain(frequency, 0.0).expect("band should exist");
        }
        assert_eq!(once, stage_coefficients(&bank));
        assert_eq!(once[0], BiquadCoefficients::identity());
    }

    #[test]
    fn gain_is_clamped_at_the_bank_boundary() {
        let mut clamped = flat_bank();
        clamped.set_band_gain(1000, 50.0).expect("band should exist");
        let mut endstop = flat_bank();
        endstop.set_band_gain(1000, 20.0).expect("band should exist");
        assert_eq!(stage_coefficients(&clamped), stage_coefficients(&endstop));
    }

    #[test]
    fn boosted_band_raises_tone_energy() {
        let sample_rate = 48_000.0;
        let tone = |n: usize| (2.0 * PI * 1_000.0 * n as f32 / sample_rate).sin();

        let mut flat = flat_bank();
        let mut boosted = flat_bank();
        boosted.set_band_gain(1000, 12.0).expect("band should exist");

        let mut flat_energy = 0.0_f64;
        let mut boosted_energy = 0.0_f64;
        // Skip the first block to let the filters settle.
        for n in 0..9_600 {
            let x = tone(n);
            let flat_out = flat.process_sample(x);
            let boosted_out = boosted.process_sample(x);
            if n >= 4_800 {
                flat_energy += (flat_out as f64).powi(2);
                boosted_energy += (boosted_out as f64).powi(2);
            }
        }
        assert!(
            boosted_energy > 2.0 * flat_energy,
            "boost too weak: {boosted_energy} vs {flat_energy}"
        );
    }
}
