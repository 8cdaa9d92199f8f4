use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

pub type Score = i64;

/// A player's standing as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: Score,
}

impl ScoreRecord {
    pub fn new(name: impl Into<String>, score: Score) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based, dense
    pub rank: usize,
    pub record: ScoreRecord,
}

/// Top entries ordered by score, highest first. Built fresh for every query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<RankedEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Ranks `records` as handed over by the store, keeping at most `limit` of them.
    ///
    /// The sort is stable so records with equal scores keep the store's order.
    pub fn ranked(mut records: Vec<ScoreRecord>, limit: usize) -> Self {
        records.sort_by_key(|r| Reverse(r.score));
        records.truncate(limit);

        let entries = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| RankedEntry {
                rank: i + 1,
                record,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Leaderboard {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(raw: &[(&str, Score)]) -> Vec<ScoreRecord> {
        raw.iter().map(|(n, s)| ScoreRecord::new(*n, *s)).collect()
    }

    #[test]
    fn ranks_are_dense_from_one() {
        let board = Leaderboard::ranked(records(&[("Bob", 80), ("Carol", 70), ("Alice", 50)]), 10);

        let ranks: Vec<usize> = board.entries().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn never_exceeds_limit() {
        let board = Leaderboard::ranked(records(&[("Alice", 50), ("Bob", 80), ("Carol", 80)]), 2);

        assert_eq!(board.len(), 2);
        assert!(board.entries().iter().all(|e| e.record.score == 80));
        assert!(board.entries().iter().all(|e| e.record.name != "Alice"));
    }

    #[test]
    fn zero_limit_is_empty() {
        let board = Leaderboard::ranked(records(&[("Alice", 50)]), 0);
        assert!(board.is_empty());
    }

    #[test]
    fn ties_keep_incoming_order() {
        let board = Leaderboard::ranked(records(&[("Carol", 80), ("Bob", 80), ("Dave", 90)]), 3);

        let names: Vec<&str> = board.into_iter().map(|e| e.record.name.as_str()).collect();
        assert_eq!(names, vec!["Dave", "Carol", "Bob"]);
    }

    #[test]
    fn scores_never_increase() {
        let board = Leaderboard::ranked(
            records(&[("a", 3), ("b", -2), ("c", 10), ("d", 3), ("e", 0)]),
            4,
        );

        assert!(
            board
                .entries()
                .windows(2)
                .all(|w| w[0].record.score >= w[1].record.score)
        );
        assert_eq!(board.entries().last().map(|e| e.record.score), Some(0));
    }
}
