//! Per-key accuracy statistics with atomic persistence.
//!
//! The store maps key labels to attempt/correct counters and lives in a
//! single JSON file under the platform data directory. Key properties:
//!
//! - **Fail-soft loading**: a missing or corrupt file logs a warning and
//!   starts with an empty map, never an error
//! - **Atomic writes**: saves go through temp-file-then-rename so a crash
//!   mid-save cannot corrupt existing statistics
//! - **Derived learned status**: whether a key is "learned" is computed
//!   from the counters, never stored
//!
//! # Example
//!
//! ```no_run
//! use zmk_overlay::stats::StatsStore;
//! use zmk_overlay::core::KeyLabel;
//!
//! let mut store = StatsStore::load(StatsStore::default_path()?);
//! store.record(&KeyLabel::new("a"), true);
//! store.save()?;
//! # Ok::<(), zmk_overlay::stats::StatsError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::KeyLabel;

/// Minimum number of attempts before a key can count as learned.
pub const LEARNED_MIN_ATTEMPTS: u64 = 100;

/// Accuracy ratio at or above which a key counts as learned.
pub const LEARNED_ACCURACY: f64 = 0.90;

/// Filename for storing key statistics.
const STATS_FILENAME: &str = "key_stats.json";

/// Errors that can occur while persisting statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The platform reports no data directory to store stats in.
    #[error("No platform data directory available")]
    NoDataDir,

    /// Atomic write operation failed.
    #[error("Failed to write stats: {0}")]
    WriteFailed(String),

    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stats could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Counters for a single key.
///
/// Invariant: `correct <= attempts`. Both counters only ever increase.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeyStat {
    /// Total classified keypresses for this key.
    pub attempts: u64,
    /// Keypresses classified as correct.
    pub correct: u64,
}

impl KeyStat {
    /// Record one classified keypress.
    pub fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Fraction of attempts that were correct, 0.0 when unseen.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempts as f64
        }
    }

    /// Whether this key has crossed the mastery threshold:
    /// at least 100 attempts with 90% or better accuracy.
    pub fn is_learned(&self) -> bool {
        self.attempts >= LEARNED_MIN_ATTEMPTS && self.accuracy() >= LEARNED_ACCURACY
    }
}

/// Persisted per-key statistics.
///
/// Mutations happen in memory via [`StatsStore::record`]; callers decide
/// when to flush with [`StatsStore::save`]. The overlay flushes
/// periodically and on exit.
#[derive(Debug)]
pub struct StatsStore {
    stats: HashMap<KeyLabel, KeyStat>,
    path: PathBuf,
    testing_mode: bool,
}

impl StatsStore {
    /// Default stats file location under the platform data directory,
    /// e.g. `~/.local/share/zmk-overlay/key_stats.json` on Linux.
    pub fn default_path() -> Result<PathBuf, StatsError> {
        let dir = dirs::data_dir().ok_or(StatsError::NoDataDir)?;
        Ok(dir.join("zmk-overlay").join(STATS_FILENAME))
    }

    /// Loads the store from `path`.
    ///
    /// A missing file is normal on first run; a corrupt file is logged
    /// and discarded. Both cases start with an empty map.
    pub fn load(path: PathBuf) -> Self {
        let stats = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<KeyLabel, KeyStat>>(&content) {
                Ok(stats) => {
                    info!("Loaded key statistics for {} keys", stats.len());
                    stats
                }
                Err(e) => {
                    warn!(
                        "Corrupt stats file {}: {e}; starting fresh",
                        path.display()
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stats file found at {}", path.display());
                HashMap::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read stats file {}: {e}; starting fresh",
                    path.display()
                );
                HashMap::new()
            }
        };

        Self {
            stats,
            path,
            testing_mode: false,
        }
    }

    /// An empty store for testing mode: nothing is read from or written
    /// to disk, and every newly observed key starts at the learned
    /// threshold so one mistake is visible immediately.
    pub fn testing(path: PathBuf) -> Self {
        info!("Testing mode: stats will not be saved, new keys start learned");
        Self {
            stats: HashMap::new(),
            path,
            testing_mode: true,
        }
    }

    fn initial_stat(&self) -> KeyStat {
        if self.testing_mode {
            KeyStat {
                attempts: LEARNED_MIN_ATTEMPTS,
                correct: LEARNED_MIN_ATTEMPTS,
            }
        } else {
            KeyStat::default()
        }
    }

    /// Increments the counters for `key`, creating the entry on first
    /// observation. Returns the updated counters.
    pub fn record(&mut self, key: &KeyLabel, correct: bool) -> KeyStat {
        let initial = self.initial_stat();
        let stat = self.stats.entry(key.clone()).or_insert(initial);
        stat.record(correct);
        *stat
    }

    /// Counters for `key`, if it has ever been classified.
    pub fn get(&self, key: &KeyLabel) -> Option<KeyStat> {
        self.stats.get(key).copied()
    }

    /// Whether `key` has crossed the mastery threshold.
    pub fn is_learned(&self, key: &KeyLabel) -> bool {
        self.stats.get(key).is_some_and(|s| s.is_learned())
    }

    /// The set of all learned keys.
    pub fn learned_keys(&self) -> HashSet<KeyLabel> {
        self.stats
            .iter()
            .filter(|(_, stat)| stat.is_learned())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Iterates over all tracked keys and their counters.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyLabel, &KeyStat)> {
        self.stats.iter()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// True when no key has ever been classified.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Human-readable progress line for logs and the `stats` command.
    pub fn summary(&self) -> String {
        if self.stats.is_empty() {
            return "No typing statistics recorded yet.".to_string();
        }

        let total_keys = self.stats.len();
        let learned = self.stats.values().filter(|s| s.is_learned()).count();
        let avg_accuracy =
            self.stats.values().map(KeyStat::accuracy).sum::<f64>() / total_keys as f64;
        let total_attempts: u64 = self.stats.values().map(|s| s.attempts).sum();

        format!(
            "Learned {learned}/{total_keys} keys | Average accuracy: {:.1}% | Total keypresses: {total_attempts}",
            avg_accuracy * 100.0
        )
    }

    /// Writes the full map atomically.
    ///
    /// Returns the path written, or `None` when running in testing mode
    /// (which never persists).
    pub fn save(&self) -> Result<Option<&Path>, StatsError> {
        if self.testing_mode {
            debug!("Testing mode: skipping save of key statistics");
            return Ok(None);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.stats)?;

        let mut file = AtomicWriteFile::options().open(&self.path).map_err(|e| {
            StatsError::WriteFailed(format!("Failed to open for atomic write: {}", e))
        })?;

        file.write_all(json.as_bytes())
            .map_err(|e| StatsError::WriteFailed(format!("Failed to write content: {}", e)))?;

        file.commit()
            .map_err(|e| StatsError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

        debug!("Saved key statistics to {}", self.path.display());
        Ok(Some(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stats_path(dir: &TempDir) -> PathBuf {
        dir.path().join(STATS_FILENAME)
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = StatsStore::load(stats_path(&dir));

        assert!(store.is_empty(), "Missing file should start empty");
    }

    #[test]
    fn test_load_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = stats_path(&dir);
        std::fs::write(&path, "{ not json at all").unwrap();

        let store = StatsStore::load(path);
        assert!(store.is_empty(), "Corrupt file should start empty");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = stats_path(&dir);

        let mut store = StatsStore::load(path.clone());
        let a = KeyLabel::new("a");
        let shift = KeyLabel::new("shift");

        store.record(&a, true);
        store.record(&a, false);
        store.record(&shift, true);

        let saved = store.save().unwrap();
        assert_eq!(saved, Some(path.as_path()));

        let reloaded = StatsStore::load(path);
        assert_eq!(
            reloaded.get(&a),
            Some(KeyStat {
                attempts: 2,
                correct: 1
            })
        );
        assert_eq!(
            reloaded.get(&shift),
            Some(KeyStat {
                attempts: 1,
                correct: 1
            })
        );
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_learned_threshold_boundaries() {
        let learned = KeyStat {
            attempts: 100,
            correct: 90,
        };
        assert!(learned.is_learned(), "100 attempts at 90% is learned");

        let below_accuracy = KeyStat {
            attempts: 100,
            correct: 89,
        };
        assert!(!below_accuracy.is_learned(), "89% accuracy is not learned");

        let below_attempts = KeyStat {
            attempts: 99,
            correct: 99,
        };
        assert!(
            !below_attempts.is_learned(),
            "Fewer than 100 attempts is never learned"
        );
    }

    #[test]
    fn test_counters_only_increase_and_stay_consistent() {
        let dir = TempDir::new().unwrap();
        let mut store = StatsStore::load(stats_path(&dir));
        let key = KeyLabel::new("j");

        for i in 0..50 {
            let stat = store.record(&key, i % 3 != 0);
            assert!(stat.correct <= stat.attempts);
        }

        let stat = store.get(&key).unwrap();
        assert_eq!(stat.attempts, 50);
    }

    #[test]
    fn test_testing_mode_starts_learned_and_never_saves() {
        let dir = TempDir::new().unwrap();
        let path = stats_path(&dir);
        let mut store = StatsStore::testing(path.clone());

        let key = KeyLabel::new("a");
        let stat = store.record(&key, true);

        assert_eq!(stat.attempts, LEARNED_MIN_ATTEMPTS + 1);
        assert!(store.is_learned(&key), "Testing-mode keys start learned");

        assert_eq!(store.save().unwrap(), None);
        assert!(!path.exists(), "Testing mode must not touch disk");
    }

    #[test]
    fn test_learned_keys_set() {
        let dir = TempDir::new().unwrap();
        let mut store = StatsStore::load(stats_path(&dir));

        let a = KeyLabel::new("a");
        let b = KeyLabel::new("b");

        for _ in 0..100 {
            store.record(&a, true);
        }
        store.record(&b, true);

        let learned = store.learned_keys();
        assert!(learned.contains(&a));
        assert!(!learned.contains(&b));
    }

    #[test]
    fn test_summary_counts() {
        let dir = TempDir::new().unwrap();
        let mut store = StatsStore::load(stats_path(&dir));

        for _ in 0..100 {
            store.record(&KeyLabel::new("a"), true);
        }
        store.record(&KeyLabel::new("b"), false);

        let summary = store.summary();
        assert!(summary.contains("Learned 1/2 keys"), "got: {summary}");
        assert!(summary.contains("Total keypresses: 101"), "got: {summary}");
    }
}
