use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ArgumentNode, Vote, VoteValue};

/// Minimum of likes and dislikes at which a node counts as controversial
pub const CONTROVERSIAL_THRESHOLD: u64 = 3;

/// Default trailing window for popularity ranking
pub const POPULARITY_WINDOW_HOURS: i64 = 24;

/// Vote-derived numbers for one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Sum of vote weights
    pub score: i64,

    /// Number of +1 votes
    pub likes: u64,

    /// Number of -1 votes
    pub dislikes: u64,

    /// Likes and dislikes both reached the controversy threshold
    pub is_controversial: bool,
}

impl Metrics {
    /// How evenly split the votes are; the controversial sort key
    pub fn balance(&self) -> u64 {
        self.likes.min(self.dislikes)
    }
}

/// Computes [`Metrics`] from a node's votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAggregator {
    controversial_threshold: u64,
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(CONTROVERSIAL_THRESHOLD)
    }
}

impl ScoreAggregator {
    pub fn new(controversial_threshold: u64) -> Self {
        Self {
            controversial_threshold,
        }
    }

    pub fn controversial_threshold(&self) -> u64 {
        self.controversial_threshold
    }

    /// All-time metrics for a node
    pub fn aggregate(&self, node: &ArgumentNode) -> Metrics {
        self.tally(node.votes.iter())
    }

    /// Metrics counting only votes cast at or after `now - window`
    pub fn aggregate_window(
        &self,
        node: &ArgumentNode,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Metrics {
        let since = now - window;
        self.tally(
            node.votes
                .iter()
                .filter(|vote| vote.cast_at >= since),
        )
    }

    /// Windowed score plus the node's view count
    pub fn popularity(&self, node: &ArgumentNode, now: DateTime<Utc>, window: Duration) -> i64 {
        let views = i64::try_from(node.view_count).unwrap_or(i64::MAX);
        self.aggregate_window(node, now, window)
            .score
            .saturating_add(views)
    }

    fn tally<'a>(&self, votes: impl Iterator<Item = &'a Vote>) -> Metrics {
        let mut metrics = Metrics::default();
        for vote in votes {
            match vote.value {
                VoteValue::Up => metrics.likes += 1,
                VoteValue::Down => metrics.dislikes += 1,
            }
            metrics.score += vote.value.weight();
        }
        metrics.is_controversial = metrics.balance() >= self.controversial_threshold;
        metrics
    }
}
