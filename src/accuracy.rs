//! Prediction accuracy by confidence bucket, for the index page chart.
//!
//! Confidence is the probability of the favored side, `max(p, 1 - p)`, so every
//! prediction lands in one of five buckets between 50% and 100%. Until any game
//! has resolved the chart shows a fixed sample instead.
use serde::Serialize;

use crate::db::models::GameResult;

const BUCKET_LABELS: [&str; 5] = ["50-60%", "60-70%", "70-80%", "80-90%", "90-100%"];

/// Shown before any prediction has been graded.
const SAMPLE_ACCURACY: [f64; 5] = [0.52, 0.61, 0.68, 0.74, 0.83];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyBucket {
    pub label: &'static str,
    pub total: u32,
    pub correct: u32,
    /// correct / total, 0.0 for an empty bucket
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub buckets: Vec<AccuracyBucket>,
    /// True when the values are the built-in sample rather than graded results
    pub placeholder: bool,
    pub resolved: usize,
}

/// The home team is the pick only when strictly favored.
pub fn favors_home(home_win_probability: f64) -> bool {
    home_win_probability > 0.5
}

fn bucket_index(home_win_probability: f64) -> usize {
    let confidence = home_win_probability.max(1.0 - home_win_probability);
    // floor, nudged so a confidence of 1 - 0.3 still lands in 70-80%
    let band = ((confidence * 10.0) + 1e-9).floor() as i64;
    (band - 5).clamp(0, 4) as usize
}

pub fn placeholder_report() -> AccuracyReport {
    let buckets = BUCKET_LABELS
        .iter()
        .zip(SAMPLE_ACCURACY)
        .map(|(&label, accuracy)| AccuracyBucket {
            label,
            total: 0,
            correct: 0,
            accuracy,
        })
        .collect();
    AccuracyReport {
        buckets,
        placeholder: true,
        resolved: 0,
    }
}

/// Grade (home win probability, result) pairs into confidence buckets.
pub fn accuracy_report(samples: &[(f64, GameResult)]) -> AccuracyReport {
    if samples.is_empty() {
        return placeholder_report();
    }

    let mut totals = [0u32; 5];
    let mut correct = [0u32; 5];
    for &(p, result) in samples {
        let idx = bucket_index(p);
        totals[idx] += 1;
        let hit = match result {
            GameResult::HomeWin => favors_home(p),
            GameResult::AwayWin => !favors_home(p),
        };
        if hit {
            correct[idx] += 1;
        }
    }

    let buckets = BUCKET_LABELS
        .iter()
        .enumerate()
        .map(|(i, &label)| AccuracyBucket {
            label,
            total: totals[i],
            correct: correct[i],
            accuracy: if totals[i] > 0 {
                correct[i] as f64 / totals[i] as f64
            } else {
                0.0
            },
        })
        .collect();

    AccuracyReport {
        buckets,
        placeholder: false,
        resolved: samples.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_input_gives_the_sample() {
        let r = accuracy_report(&[]);
        assert!(r.placeholder);
        assert_eq!(r.buckets.len(), 5);
        assert_eq!(r.buckets[0].label, "50-60%");
        assert_relative_eq!(r.buckets[4].accuracy, 0.83, epsilon = 1e-9);
    }

    #[test]
    fn bucket_edges() {
        assert_eq!(bucket_index(0.5), 0);
        assert_eq!(bucket_index(0.55), 0);
        assert_eq!(bucket_index(0.6), 1);
        assert_eq!(bucket_index(0.3), 2);
        assert_eq!(bucket_index(0.85), 3);
        assert_eq!(bucket_index(0.9), 4);
        assert_eq!(bucket_index(1.0), 4);
        assert_eq!(bucket_index(0.0), 4);
    }

    #[test]
    fn near_edge_confidence_stays_in_its_band() {
        assert_eq!(bucket_index(0.595), 0);
        assert_eq!(bucket_index(0.405), 0);
        assert_eq!(bucket_index(0.699), 1);
        assert_eq!(bucket_index(1.0 - 0.3), 2);
        assert_eq!(bucket_index(0.8999), 3);

        let r = accuracy_report(&[(0.595, GameResult::HomeWin)]);
        assert_eq!(r.buckets[0].total, 1);
        assert_eq!(r.buckets[1].total, 0);
    }

    #[test]
    fn coin_flip_counts_as_away_pick() {
        let r = accuracy_report(&[(0.5, GameResult::AwayWin), (0.5, GameResult::HomeWin)]);
        assert_eq!(r.buckets[0].total, 2);
        assert_eq!(r.buckets[0].correct, 1);
        assert_relative_eq!(r.buckets[0].accuracy, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn grades_both_sides() {
        let samples = [
            (0.72, GameResult::HomeWin),  // 70-80, hit
            (0.25, GameResult::AwayWin),  // 70-80, hit
            (0.71, GameResult::AwayWin),  // 70-80, miss
            (0.95, GameResult::HomeWin),  // 90-100, hit
        ];
        let r = accuracy_report(&samples);
        assert!(!r.placeholder);
        assert_eq!(r.resolved, 4);
        let b = &r.buckets[2];
        assert_eq!((b.total, b.correct), (3, 2));
        assert_relative_eq!(b.accuracy, 2.0 / 3.0, epsilon = 1e-9);
        assert_eq!(r.buckets[4].correct, 1);
        assert_eq!(r.buckets[1].total, 0);
        assert_relative_eq!(r.buckets[1].accuracy, 0.0, epsilon = 1e-9);
    }
}
