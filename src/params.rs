use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::DspError;
use crate::settings::{
    band_index, clamp_gain_db, clamp_volume, AudioSettings, EqualizerSettings, SettingsPatch,
    BAND_COUNT,
};

/// Authoritative live copy of the control parameters: volume plus the six
/// band gains.
///
/// Values are kept as f32 bit patterns in `AtomicU32` cells so the render
/// path reads them without taking a lock while the control path mutates
/// them from another thread.
pub struct ParameterStore {
    volume_bits: AtomicU32,
    gain_bits: [AtomicU32; BAND_COUNT],
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::from_settings(&AudioSettings::default())
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self {
            volume_bits: AtomicU32::new(clamp_volume(settings.volume).to_bits()),
            gain_bits: settings
                .equalizer
                .gains()
                .map(|gain_db| AtomicU32::new(clamp_gain_db(gain_db).to_bits())),
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume_bits
            .store(clamp_volume(volume).to_bits(), Ordering::SeqCst);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    /// Clamps and stores a band gain. Returns the stored (clamped) value so
    /// the caller can forward it to the live filter bank.
    pub fn set_band_gain(&self, frequency: u32, gain_db: f32) -> Result<f32, DspError> {
        let index = band_index(frequency)?;
        let clamped = clamp_gain_db(gain_db);
        self.gain_bits[index].store(clamped.to_bits(), Ordering::SeqCst);
        Ok(clamped)
    }

    pub fn band_gain(&self, frequency: u32) -> Result<f32, DspError> {
        let index = band_index(frequency)?;
        Ok(f32::from_bits(self.gain_bits[index].load(Ordering::Relaxed)))
    }

    /// Value snapshot of the current state. Mutating the returned copy has
    /// no effect on the store.
    pub fn settings(&self) -> AudioSettings {
        let mut equalizer = EqualizerSettings::flat();
        for (index, cell) in self.gain_bits.iter().enumerate() {
            let frequency = crate::settings::BAND_FREQUENCIES[index];
            let gain_db = f32::from_bits(cell.load(Ordering::Relaxed));
            // Stored values were clamped on the way in, so this cannot fail.
            let _ = equalizer.set_gain(frequency, gain_db);
        }
        AudioSettings {
            volume: self.volume(),
            equalizer,
        }
    }

    /// Merges only the fields present in the patch. The whole patch is
    /// validated up front, so an unknown band leaves the store untouched.
    pub fn apply(&self, patch: &SettingsPatch) -> Result<(), DspError> {
        for &frequency in patch.equalizer.keys() {
            band_index(frequency)?;
        }
        if let Some(volume) = patch.volume {
            self.set_volume(volume);
        }
        for (&frequency, &gain_db) in &patch.equalizer {
            self.set_band_gain(frequency, gain_db)?;
        }
        Ok(())
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
