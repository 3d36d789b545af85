//! Accuracy tracker state machine tests
//!
//! Exercises the pending/correct/incorrect classification rules,
//! including the single-key backspace attribution heuristic.

use crate::core::{AccuracyTracker, KeyLabel};
use crate::stats::{KeyStat, StatsStore};
use tempfile::TempDir;

/// Helper: tracker backed by an empty store in a temp directory.
fn fresh_tracker() -> (TempDir, AccuracyTracker) {
    let dir = TempDir::new().unwrap();
    let store = StatsStore::load(dir.path().join("key_stats.json"));
    (dir, AccuracyTracker::new(store))
}

fn press(tracker: &mut AccuracyTracker, label: &str) {
    tracker.on_key_press(&KeyLabel::new(label));
}

fn stat(tracker: &AccuracyTracker, label: &str) -> Option<KeyStat> {
    tracker.store().get(&KeyLabel::new(label))
}

#[test]
fn test_next_key_marks_pending_correct() {
    let (_dir, mut tracker) = fresh_tracker();

    press(&mut tracker, "a");
    press(&mut tracker, "b");

    assert_eq!(
        stat(&tracker, "a"),
        Some(KeyStat {
            attempts: 1,
            correct: 1
        })
    );
    // 'b' is still pending, nothing recorded for it yet
    assert_eq!(stat(&tracker, "b"), None);
}

#[test]
fn test_backspace_marks_pending_incorrect() {
    let (_dir, mut tracker) = fresh_tracker();

    press(&mut tracker, "a");
    press(&mut tracker, "Bckspc");

    assert_eq!(
        stat(&tracker, "a"),
        Some(KeyStat {
            attempts: 1,
            correct: 0
        })
    );
}

#[test]
fn test_second_backspace_is_a_no_op() {
    let (_dir, mut tracker) = fresh_tracker();

    press(&mut tracker, "a");
    press(&mut tracker, "Bckspc");
    press(&mut tracker, "Bckspc");

    // Only the single most recently pending key is penalized
    assert_eq!(
        stat(&tracker, "a"),
        Some(KeyStat {
            attempts: 1,
            correct: 0
        })
    );
}

#[test]
fn test_backspace_while_idle_is_a_no_op() {
    let (_dir, mut tracker) = fresh_tracker();

    press(&mut tracker, "Bckspc");

    assert!(tracker.store().is_empty(), "No pending key to blame");
}

#[test]
fn test_backspace_itself_is_never_tracked() {
    let (_dir, mut tracker) = fresh_tracker();

    press(&mut tracker, "a");
    press(&mut tracker, "Bckspc");
    press(&mut tracker, "b");

    assert_eq!(stat(&tracker, "bckspc"), None);
    assert_eq!(stat(&tracker, "backspace"), None);
}

#[test]
fn test_typing_resumes_after_correction() {
    let (_dir, mut tracker) = fresh_tracker();

    // Type "ab", backspace over 'b', retype 'b', then 'c'
    press(&mut tracker, "a");
    press(&mut tracker, "b");
    press(&mut tracker, "Bckspc");
    press(&mut tracker, "b");
    press(&mut tracker, "c");

    assert_eq!(
        stat(&tracker, "a"),
        Some(KeyStat {
            attempts: 1,
            correct: 1
        })
    );
    assert_eq!(
        stat(&tracker, "b"),
        Some(KeyStat {
            attempts: 2,
            correct: 1
        })
    );
}

#[test]
fn test_attempts_never_below_correct() {
    let (_dir, mut tracker) = fresh_tracker();

    // Arbitrary mix of typing and corrections
    let sequence = [
        "a", "s", "d", "Bckspc", "Bckspc", "f", "g", "h", "Bckspc", "j", "a", "Bckspc", "Bckspc",
        "s", "d",
    ];
    for label in sequence {
        press(&mut tracker, label);
    }

    for (key, stat) in tracker.store().iter() {
        assert!(
            stat.correct <= stat.attempts,
            "Invariant violated for '{key}': {stat:?}"
        );
    }
}

#[test]
fn test_key_becomes_learned_through_the_tracker() {
    let (_dir, mut tracker) = fresh_tracker();
    let a = KeyLabel::new("a");

    // 100 classified presses of 'a', all correct
    for _ in 0..100 {
        press(&mut tracker, "a");
        press(&mut tracker, "Space");
        // Classify the pending space without touching 'a'
        press(&mut tracker, "Bckspc");
    }

    assert!(tracker.is_learned(&a));
    assert!(tracker.learned_keys().contains(&a));
}

#[test]
fn test_flush_persists_classifications() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("key_stats.json");

    let store = StatsStore::load(path.clone());
    let mut tracker = AccuracyTracker::new(store);

    press(&mut tracker, "a");
    press(&mut tracker, "b");
    tracker.flush().unwrap();

    let reloaded = StatsStore::load(path);
    assert_eq!(
        reloaded.get(&KeyLabel::new("a")),
        Some(KeyStat {
            attempts: 1,
            correct: 1
        })
    );
}
