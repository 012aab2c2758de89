use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;

use crate::dsp::FilterBank;
use crate::error::EngineError;
use crate::params::ParameterStore;
use crate::settings::{AudioSettings, SettingsPatch};

/// The live signal path: microphone blocks go through the six-band filter
/// cascade, then the volume gain, and come back out in place.
///
/// All methods take `&self`, so a capture callback (render path) and the UI
/// (control path) can share the engine behind an `Arc`. Volume and band
/// gains sit in the lock-free parameter store; the filter bank sits behind
/// a mutex that the control path only ever holds for a single-stage
/// coefficient recompute.
pub struct DspEngine {
    params: ParameterStore,
    bank: Mutex<Option<FilterBank>>,
}

impl DspEngine {
    /// Engine with default volume (150%) and a flat equalizer.
    pub fn new() -> Self {
        Self::with_settings(AudioSettings::default())
    }

    pub fn with_settings(settings: AudioSettings) -> Self {
        Self {
            params: ParameterStore::from_settings(&settings),
            bank: Mutex::new(None),
        }
    }

    /// Allocates the filter bank at the given rate, applying the current
    /// parameter snapshot to every band. Delay state starts at silence.
    pub fn start(&self, sample_rate: f32) -> Result<(), EngineError> {
        let mut bank = self.lock_bank();
        if bank.is_some() {
            return Err(EngineError::AlreadyRunning);
        }
        let settings = self.params.settings();
        *bank = Some(FilterBank::new(sample_rate, &settings.equalizer)?);
        info!("audio engine started at {sample_rate} Hz");
        Ok(())
    }

    /// Drops the filter bank; coefficients and delay state are rebuilt from
    /// scratch on the next `start`.
    pub fn stop(&self) -> Result<(), EngineError> {
        let mut bank = self.lock_bank();
        if bank.take().is_none() {
            return Err(EngineError::NotRunning);
        }
        info!("audio engine stopped");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.lock_bank().is_some()
    }

    /// Processes one block in place: filter cascade first, volume gain
    /// after (post-EQ, matching the microphone → filters → gain → output
    /// signal order). No allocation on this path; the volume is read once
    /// per block.
    pub fn process_block(&self, samples: &mut [f32]) -> Result<(), EngineError> {
        let mut bank = self.lock_bank();
        let bank = bank.as_mut().ok_or(EngineError::NotRunning)?;
        let volume = self.params.volume();
        for sample in samples.iter_mut() {
            *sample = bank.process_sample(*sample) * volume;
        }
        Ok(())
    }

    /// Clamps to [0, 3] and takes effect on the next processed block. A
    /// hard jump in gain is accepted as-is, like a hardware volume knob.
    pub fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.params.volume()
    }

    /// Validates the frequency, clamps the gain, stores it, and recomputes
    /// the matching stage of the live bank if one exists.
    pub fn set_band_gain(&self, frequency: u32, gain_db: f32) -> Result<(), EngineError> {
        let clamped = self.params.set_band_gain(frequency, gain_db)?;
        if let Some(bank) = self.lock_bank().as_mut() {
            bank.set_band_gain(frequency, clamped)?;
        }
        Ok(())
    }

    pub fn band_gain(&self, frequency: u32) -> Result<f32, EngineError> {
        Ok(self.params.band_gain(frequency)?)
    }

    /// Value snapshot of the current volume and equalizer state.
    pub fn settings(&self) -> AudioSettings {
        self.params.settings()
    }

    /// Applies a (possibly partial) settings patch, e.g. a loaded profile,
    /// then refreshes the affected stages of the live bank.
    pub fn apply_settings(&self, patch: &SettingsPatch) -> Result<(), EngineError> {
        self.params.apply(patch)?;
        if let Some(bank) = self.lock_bank().as_mut() {
            for &frequency in patch.equalizer.keys() {
                bank.set_band_gain(frequency, self.params.band_gain(frequency)?)?;
            }
        }
        Ok(())
    }

    fn lock_bank(&self) -> MutexGuard<'_, Option<FilterBank>> {
        // A poisoned lock only means another thread panicked; the bank
        // itself holds no torn state, so keep going.
        self.bank.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DspEngine {
    fn default() -> Self {
        Self::new()
    }
}
