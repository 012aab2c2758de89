use std::collections::BTreeMap;

use log::warn;

use crate::error::ProfileError;
use crate::settings::{AudioSettings, EqualizerSettings};
use crate::storage::ProfileStorage;

/// Key of the single persisted record in the injected key-value store.
pub const PROFILE_STORE_KEY: &str = "klangnah-profiles";

/// Built-in profiles that always exist and cannot be deleted.
pub const PRESET_NAMES: [&str; 3] = ["conversation", "tv", "street"];

fn preset_profiles() -> [(&'static str, AudioSettings); 3] {
    [
        (
            // Mid boost for speech intelligibility.
            "conversation",
            AudioSettings::new(
                2.1,
                EqualizerSettings::from_gains([-2.0, 2.0, 4.0, 6.0, 3.0, -1.0]),
            ),
        ),
        (
            // Balanced with slight bass reduction.
            "tv",
            AudioSettings::new(
                1.8,
                EqualizerSettings::from_gains([-3.0, 0.0, 2.0, 3.0, 2.0, 1.0]),
            ),
        ),
        (
            // Cut traffic rumble, lift highs, loudest volume.
            "street",
            AudioSettings::new(
                2.4,
                EqualizerSettings::from_gains([-5.0, -3.0, 0.0, 3.0, 5.0, 4.0]),
            ),
        ),
    ]
}

/// Named snapshots of volume + equalizer state, mirrored in memory and
/// persisted as one JSON record through the injected storage.
pub struct ProfileStore<S: ProfileStorage> {
    storage: S,
    profiles: BTreeMap<String, AudioSettings>,
}

impl<S: ProfileStorage> ProfileStore<S> {
    /// Loads the persisted record, injects any absent presets, and persists
    /// the merged result. A missing or corrupt record yields an empty map,
    /// never an error, so a user always ends up with at least the presets.
    pub fn new(storage: S) -> Self {
        let profiles = load_persisted(&storage);
        let mut store = Self { storage, profiles };
        for (name, settings) in preset_profiles() {
            store.profiles.entry(name.to_string()).or_insert(settings);
        }
        store.persist();
        store
    }

    /// Upserts by name (last write wins, presets included). Blank names are
    /// rejected.
    pub fn save_profile(
        &mut self,
        name: &str,
        settings: AudioSettings,
    ) -> Result<(), ProfileError> {
        if name.trim().is_empty() {
            return Err(ProfileError::InvalidName);
        }
        self.profiles.insert(name.to_string(), settings);
        self.persist();
        Ok(())
    }

    pub fn load_profile(&self, name: &str) -> Option<AudioSettings> {
        self.profiles.get(name).copied()
    }

    /// Removes a user profile. Presets and unknown names are left alone and
    /// reported as `false` without an error.
    pub fn delete_profile(&mut self, name: &str) -> bool {
        if PRESET_NAMES.contains(&name) {
            return false;
        }
        if self.profiles.remove(name).is_none() {
            return false;
        }
        self.persist();
        true
    }

    /// Read-only view of every stored profile.
    pub fn profiles(&self) -> &BTreeMap<String, AudioSettings> {
        &self.profiles
    }

    fn persist(&mut self) {
        // Persistence failures are absorbed: the in-memory state stays
        // usable and the next successful write catches up.
        match serde_json::to_vec(&self.profiles) {
            Ok(bytes) => {
                if let Err(err) = self.storage.write(PROFILE_STORE_KEY, &bytes) {
                    warn!("failed to persist profiles: {err}");
                }
            }
            Err(err) => warn!("failed to encode profiles: {err}"),
        }
    }
}

fn load_persisted<S: ProfileStorage>(storage: &S) -> BTreeMap<String, AudioSettings> {
    let bytes = match storage.read(PROFILE_STORE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return BTreeMap::new(),
        Err(err) => {
            warn!("failed to read persisted profiles, starting empty: {err}");
            return BTreeMap::new();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(profiles) => profiles,
        Err(err) => {
            warn!("persisted profiles are unreadable, starting empty: {err}");
            BTreeMap::new()
        }
    }
}
