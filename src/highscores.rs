//! High score and leaderboard
//!
//! Two keys in the persistence gateway: the single best score
//! (`flappy_high_score`) and a descending top-100 list (`scores_flappy`).
//! Storage failures only cost persistence; the in-memory copy stays current.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};

/// Maximum number of leaderboard entries to keep
pub const MAX_HIGH_SCORES: usize = 100;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Enemies destroyed in the run
    #[serde(default)]
    pub kills: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Result of recording a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRecord {
    /// Score beat the previous best
    pub new_best: bool,
    /// Leaderboard rank (1-indexed) if it qualified
    pub rank: Option<usize>,
    /// Both keys were written successfully
    pub persisted: bool,
}

/// Best score plus leaderboard
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    pub best: u64,
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub const BEST_KEY: &'static str = "flappy_high_score";
    pub const LIST_KEY: &'static str = "scores_flappy";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert into the leaderboard if it qualifies; returns the rank
    pub fn add_score(&mut self, score: u64, kills: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                kills,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load both keys; anything missing or unreadable starts fresh
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let best = persistence::load_json::<u64, S>(store, Self::BEST_KEY).unwrap_or(0);
        let mut entries: Vec<HighScoreEntry> =
            persistence::load_json(store, Self::LIST_KEY).unwrap_or_default();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);

        // A best score older than the list may be lower than its top entry
        let best = best.max(entries.first().map_or(0, |e| e.score));
        log::info!("High score {}, {} leaderboard entries", best, entries.len());
        Self { best, entries }
    }

    /// Record a finished run and persist what changed
    pub fn record<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        score: u64,
        kills: u32,
        timestamp: f64,
    ) -> RunRecord {
        let new_best = score > self.best;
        let mut persisted = true;
        if new_best {
            self.best = score;
            persisted &= persistence::save_json(store, Self::BEST_KEY, &score);
            log::info!("New high score: {}", score);
        }

        let rank = self.add_score(score, kills, timestamp);
        if rank.is_some() {
            persisted &= persistence::save_json(store, Self::LIST_KEY, &self.entries);
        }

        RunRecord {
            new_best,
            rank,
            persisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_leaderboard_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(50, 5, 0.0), Some(1));
        assert_eq!(scores.add_score(80, 8, 1.0), Some(1));
        assert_eq!(scores.add_score(60, 6, 2.0), Some(2));
        assert_eq!(scores.add_score(0, 0, 3.0), None);
        let list: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(list, vec![80, 60, 50]);
        assert_eq!(scores.top_score(), Some(80));
    }

    #[test]
    fn test_leaderboard_capped() {
        let mut scores = HighScores::new();
        for score in 1..=(MAX_HIGH_SCORES as u64 + 20) {
            scores.add_score(score, 0, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(20));
        assert!(scores.qualifies(21 + MAX_HIGH_SCORES as u64));
    }

    #[test]
    fn test_record_persists_and_reloads() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::load(&store);
        assert_eq!(scores.best, 0);

        let first = scores.record(&mut store, 40, 4, 1.0);
        assert!(first.new_best && first.persisted);
        let second = scores.record(&mut store, 25, 2, 2.0);
        assert!(!second.new_best);
        assert_eq!(second.rank, Some(2));

        let reloaded = HighScores::load(&store);
        assert_eq!(reloaded.best, 40);
        assert_eq!(reloaded.entries.len(), 2);
        assert_eq!(store.get(HighScores::BEST_KEY).as_deref(), Some("40"));
    }

    #[test]
    fn test_record_survives_storage_failure() {
        let mut store = MemoryStore::with_capacity_bytes(0);
        let mut scores = HighScores::new();
        let record = scores.record(&mut store, 99, 9, 0.0);
        assert!(record.new_best);
        assert!(!record.persisted);
        assert_eq!(scores.best, 99);
        assert_eq!(HighScores::load(&store).best, 0);
    }
}
