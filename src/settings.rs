use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DspError;

/// The fixed, ordered band set. Every equalizer structure in the crate is
/// keyed by exactly these six center frequencies.
pub const BAND_FREQUENCIES: [u32; 6] = [250, 500, 1000, 2000, 4000, 8000];
pub const BAND_COUNT: usize = BAND_FREQUENCIES.len();

pub const MIN_GAIN_DB: f32 = -20.0;
pub const MAX_GAIN_DB: f32 = 20.0;

pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 3.0;
/// 150% default volume, chosen to suit hearing-impaired listeners.
pub const DEFAULT_VOLUME: f32 = 1.5;

pub(crate) fn band_index(frequency: u32) -> Result<usize, DspError> {
    BAND_FREQUENCIES
        .iter()
        .position(|&f| f == frequency)
        .ok_or(DspError::UnknownBand(frequency))
}

/// Gains have hardware-knob endstops: out-of-range values are clamped,
/// never rejected.
pub fn clamp_gain_db(gain_db: f32) -> f32 {
    gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB)
}

pub fn clamp_volume(volume: f32) -> f32 {
    volume.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// Gain in dB for each of the six fixed bands, stored in frequency order.
///
/// Serializes as a JSON object with the frequencies as string keys
/// (`{"250": 0.0, …, "8000": 0.0}`); deserialization requires all six bands
/// and rejects unknown frequencies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EqualizerSettings {
    gains: [f32; BAND_COUNT],
}

impl EqualizerSettings {
    /// All bands at 0 dB.
    pub fn flat() -> Self {
        Self {
            gains: [0.0; BAND_COUNT],
        }
    }

    /// Builds from gains in `BAND_FREQUENCIES` order, clamping each.
    pub fn from_gains(gains: [f32; BAND_COUNT]) -> Self {
        Self {
            gains: gains.map(clamp_gain_db),
        }
    }

    pub fn gain(&self, frequency: u32) -> Result<f32, DspError> {
        Ok(self.gains[band_index(frequency)?])
    }

    pub fn set_gain(&mut self, frequency: u32, gain_db: f32) -> Result<(), DspError> {
        self.gains[band_index(frequency)?] = clamp_gain_db(gain_db);
        Ok(())
    }

    pub fn gains(&self) -> [f32; BAND_COUNT] {
        self.gains
    }

    /// `(frequency, gain_db)` pairs in ascending frequency order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        BAND_FREQUENCIES.iter().copied().zip(self.gains.iter().copied())
    }
}

impl Default for EqualizerSettings {
    fn default() -> Self {
        Self::flat()
    }
}

impl Serialize for EqualizerSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for EqualizerSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<u32, f32>::deserialize(deserializer)?;
        let mut gains = [0.0; BAND_COUNT];
        for (&frequency, &gain_db) in &map {
            let index = band_index(frequency).map_err(D::Error::custom)?;
            gains[index] = clamp_gain_db(gain_db);
        }
        for frequency in BAND_FREQUENCIES {
            if !map.contains_key(&frequency) {
                return Err(D::Error::custom(format!(
                    "missing equalizer band: {frequency} Hz"
                )));
            }
        }
        Ok(Self { gains })
    }
}

/// A named profile's payload: volume plus the six-band equalizer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub volume: f32,
    pub equalizer: EqualizerSettings,
}

impl AudioSettings {
    pub fn new(volume: f32, equalizer: EqualizerSettings) -> Self {
        Self {
            volume: clamp_volume(volume),
            equalizer,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            equalizer: EqualizerSettings::flat(),
        }
    }
}

/// Partial settings update: only fields that are present get merged, so a
/// profile that omits the volume or some bands leaves the rest untouched.
#[derive(Clone, Debug, Default)]
pub struct SettingsPatch {
    pub volume: Option<f32>,
    pub equalizer: BTreeMap<u32, f32>,
}

impl From<AudioSettings> for SettingsPatch {
    fn from(settings: AudioSettings) -> Self {
        Self {
            volume: Some(settings.volume),
            equalizer: settings.equalizer.iter().collect(),
        }
    }
}
