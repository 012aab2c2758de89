//! KlangNah core: the real-time signal path of a hearing-assist app.
//!
//! A live microphone block stream is shaped by a six-band biquad cascade
//! (low shelf at 250 Hz, peaking interiors, high shelf at 8 kHz) followed by
//! a post-EQ volume gain, then handed back for playback. Named profiles of
//! the control parameters are persisted through an injected key-value
//! storage boundary; three presets always exist.
//!
//! Device capture/output, rendering and the storage backend itself are the
//! host application's concern.

pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;
pub mod profiles;
pub mod settings;
pub mod storage;

pub use engine::DspEngine;
pub use error::{DspError, EngineError, ProfileError, StorageError};
pub use params::ParameterStore;
pub use profiles::{ProfileStore, PRESET_NAMES, PROFILE_STORE_KEY};
pub use settings::{
    AudioSettings, EqualizerSettings, SettingsPatch, BAND_COUNT, BAND_FREQUENCIES, DEFAULT_VOLUME,
    MAX_GAIN_DB, MAX_VOLUME, MIN_GAIN_DB, MIN_VOLUME,
};
pub use storage::{FileStorage, MemoryStorage, ProfileStorage};
