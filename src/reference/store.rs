// ReferenceStore - durable keyed collection of reference profiles
//
// Layout: one `<id>.json` document per profile inside the storage directory.
// Writes go to `<id>.tmp`, are flushed and synced, then renamed over the
// final file, so a crash never leaves a half-written `<id>.json` behind.
//
// Concurrency:
// - `profiles` (RwLock) serves readers without blocking each other
// - `write_lock` (Mutex) serializes every disk write and every
//   read-modify-write, so concurrent updates of one id never interleave
// The in-memory map only changes after the rename succeeded.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{log_store_error, StoreError, TrainerError};
use crate::reference::profile::ReferenceProfile;

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Thread-safe persistent store of reference profiles
pub struct ReferenceStore {
    storage_dir: PathBuf,
    profiles: RwLock<HashMap<String, ReferenceProfile>>,
    write_lock: Mutex<()>,
}

impl ReferenceStore {
    /// Open (creating if needed) the storage directory and load every record
    ///
    /// # Errors
    /// `StorageUnavailable` if the directory cannot be created or scanned
    pub fn open(storage_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.into();
        fs::create_dir_all(&storage_dir).map_err(|err| StoreError::StorageUnavailable {
            path: storage_dir.display().to_string(),
            reason: err.to_string(),
        })?;

        let store = Self {
            storage_dir,
            profiles: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        };
        let loaded = store.load()?;
        log::info!(
            "Reference store opened at {} ({} profiles)",
            store.storage_dir.display(),
            loaded
        );
        Ok(store)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Final on-disk location of a profile
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    /// Rescan the storage directory and replace the in-memory map
    ///
    /// Empty or unparseable records are logged and skipped; they never
    /// abort the load. A record whose file name differs from its id is only
    /// used when `<id>.json` is absent, since `save` always writes there.
    ///
    /// # Returns
    /// Number of profiles loaded
    pub fn load(&self) -> Result<usize, StoreError> {
        let _writer = self.lock_writes()?;

        let entries = fs::read_dir(&self.storage_dir).map_err(|err| {
            StoreError::StorageUnavailable {
                path: self.storage_dir.display().to_string(),
                reason: err.to_string(),
            }
        })?;

        // id -> (profile, stored under its canonical file name)
        let mut loaded: HashMap<String, (ReferenceProfile, bool)> = HashMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let profile = match Self::read_record(&path) {
                Ok(profile) => profile,
                Err(err) => {
                    log::warn!("Skipping reference record: {}", err);
                    continue;
                }
            };

            let canonical = path == self.record_path(&profile.id);
            match loaded.get(&profile.id) {
                Some((_, true)) if !canonical => {
                    log::warn!(
                        "Skipping reference record {}: superseded by {}",
                        path.display(),
                        self.record_path(&profile.id).display()
                    );
                }
                Some((_, false)) if !canonical => {
                    log::warn!(
                        "Duplicate reference id {} in {}; keeping the first record read",
                        profile.id,
                        path.display()
                    );
                }
                _ => {
                    loaded.insert(profile.id.clone(), (profile, canonical));
                }
            }
        }

        let loaded: HashMap<String, ReferenceProfile> = loaded
            .into_iter()
            .map(|(id, (profile, _))| (id, profile))
            .collect();
        let count = loaded.len();
        *self.write_profiles()? = loaded;
        Ok(count)
    }

    /// Durably persist a profile, then publish it in memory
    ///
    /// # Errors
    /// `StoreWriteFailed` when the id cannot name a file or any step of the
    /// temp-write/rename fails; the in-memory map is left untouched.
    pub fn save(&self, profile: &ReferenceProfile) -> Result<(), StoreError> {
        let _writer = self.lock_writes()?;
        self.save_locked(profile)
    }

    /// Read-modify-write a single profile under the store write lock
    ///
    /// `apply` receives the current profile and returns the replacement.
    /// Nothing is persisted when `apply` fails.
    pub fn update<F>(&self, id: &str, apply: F) -> Result<ReferenceProfile, TrainerError>
    where
        F: FnOnce(ReferenceProfile) -> Result<ReferenceProfile, TrainerError>,
    {
        let _writer = self.lock_writes()?;
        let current = self.require(id)?;
        let updated = apply(current)?;
        self.save_locked(&updated)?;
        Ok(updated)
    }

    pub fn get(&self, id: &str) -> Result<Option<ReferenceProfile>, StoreError> {
        Ok(self.read_profiles()?.get(id).cloned())
    }

    /// Like `get`, but a missing id is an error
    pub fn require(&self, id: &str) -> Result<ReferenceProfile, StoreError> {
        self.get(id)?.ok_or_else(|| StoreError::ReferenceNotFound { id: id.to_string() })
    }

    /// All profiles, ordered by language then symbol
    pub fn list(&self) -> Result<Vec<ReferenceProfile>, StoreError> {
        let mut profiles: Vec<ReferenceProfile> =
            self.read_profiles()?.values().cloned().collect();
        profiles.sort_by(|a, b| {
            (a.language.as_str(), a.symbol.as_str(), a.id.as_str())
                .cmp(&(b.language.as_str(), b.symbol.as_str(), b.id.as_str()))
        });
        Ok(profiles)
    }

    /// True once at least one profile carries features
    pub fn is_configured(&self) -> Result<bool, StoreError> {
        Ok(self
            .read_profiles()?
            .values()
            .any(|profile| profile.features.is_some()))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_profiles()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn save_locked(&self, profile: &ReferenceProfile) -> Result<(), StoreError> {
        let final_path = self.record_path(&profile.id);
        if let Err(err) = self.write_record(profile, &final_path) {
            log_store_error(&err, "save");
            return Err(err);
        }

        self.write_profiles()?
            .insert(profile.id.clone(), profile.clone());
        log::debug!("Saved reference {} to {}", profile.id, final_path.display());
        Ok(())
    }

    fn write_record(&self, profile: &ReferenceProfile, final_path: &Path) -> Result<(), StoreError> {
        let write_failed = |reason: String| StoreError::StoreWriteFailed {
            path: final_path.display().to_string(),
            reason,
        };

        if !is_valid_id(&profile.id) {
            return Err(write_failed(format!("invalid profile id {:?}", profile.id)));
        }

        let json = serde_json::to_vec_pretty(profile).map_err(|err| write_failed(err.to_string()))?;
        let temp_path = final_path.with_extension(TEMP_EXTENSION);

        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(&json)?;
            file.flush()?;
            file.sync_all()?;
            fs::rename(&temp_path, final_path)
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(write_failed(err.to_string()));
        }
        Ok(())
    }

    fn read_record(path: &Path) -> Result<ReferenceProfile, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRecord {
            path: path.display().to_string(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|err| corrupt(err.to_string()))?;
        if contents.trim().is_empty() {
            return Err(corrupt("empty record".to_string()));
        }
        serde_json::from_str(&contents).map_err(|err| corrupt(err.to_string()))
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn read_profiles(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<String, ReferenceProfile>>, StoreError> {
        self.profiles.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_profiles(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, ReferenceProfile>>, StoreError> {
        self.profiles.write().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Ids become file names: allow only ASCII alphanumerics, '-' and '_'
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
