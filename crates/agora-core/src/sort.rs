use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::score::{ScoreAggregator, POPULARITY_WINDOW_HOURS};
use crate::tree::Tree;

/// Ordering applied to one level of a forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortStrategy {
    /// Keep build order (chronological)
    #[default]
    Recent,
    /// Highest score first
    Best,
    /// Most evenly split likes and dislikes first
    Controversial,
    /// Most viewed first
    Views,
    /// Highest windowed score plus views first
    Popular,
    /// Title ascending
    Alpha,
}

impl SortStrategy {
    /// Parse a strategy name; unknown names fall back to [`SortStrategy::Recent`]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "best" | "top" => SortStrategy::Best,
            "controversial" => SortStrategy::Controversial,
            "views" => SortStrategy::Views,
            "popular" | "trend" | "hot" => SortStrategy::Popular,
            "alpha" | "name" => SortStrategy::Alpha,
            _ => SortStrategy::Recent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::Recent => "recent",
            SortStrategy::Best => "best",
            SortStrategy::Controversial => "controversial",
            SortStrategy::Views => "views",
            SortStrategy::Popular => "popular",
            SortStrategy::Alpha => "alpha",
        }
    }
}

impl FromStr for SortStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for SortStrategy {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<SortStrategy> for String {
    fn from(strategy: SortStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which levels of a forest a sort applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortScope {
    /// Only the level being displayed; replies keep build order
    #[default]
    #[serde(rename = "level")]
    Level,
    /// Every level, replies included
    #[serde(rename = "recursive")]
    Recursive,
}

/// Orders trees by a [`SortStrategy`].
///
/// Every ordering is stable: ties keep their input order, which for freshly
/// built forests is chronological.
#[derive(Debug, Clone, Copy)]
pub struct TreeSorter {
    aggregator: ScoreAggregator,
    now: DateTime<Utc>,
    popularity_window: Duration,
}

impl TreeSorter {
    /// A sorter evaluating windowed popularity at `now`
    pub fn new(aggregator: ScoreAggregator, now: DateTime<Utc>) -> Self {
        Self {
            aggregator,
            now,
            popularity_window: Duration::hours(POPULARITY_WINDOW_HOURS),
        }
    }

    pub fn with_popularity_window(mut self, window: Duration) -> Self {
        self.popularity_window = window;
        self
    }

    /// Return a new ordering of `trees`; children keep their order.
    pub fn sort(&self, trees: &[Tree], strategy: SortStrategy) -> Vec<Tree> {
        let mut sorted = trees.to_vec();
        self.sort_level(&mut sorted, strategy);
        sorted
    }

    /// Return a new ordering with `strategy` applied at every level.
    pub fn sort_recursive(&self, trees: &[Tree], strategy: SortStrategy) -> Vec<Tree> {
        self.arrange(trees.to_vec(), strategy, SortScope::Recursive)
    }

    /// Sort an owned forest in the given scope
    pub fn arrange(
        &self,
        mut trees: Vec<Tree>,
        strategy: SortStrategy,
        scope: SortScope,
    ) -> Vec<Tree> {
        match scope {
            SortScope::Level => self.sort_level(&mut trees, strategy),
            SortScope::Recursive => {
                let mut stack: Vec<&mut Vec<Tree>> = vec![&mut trees];
                while let Some(level) = stack.pop() {
                    self.sort_level(level, strategy);
                    for tree in level {
                        stack.push(&mut tree.children);
                    }
                }
            }
        }
        trees
    }

    fn sort_level(&self, level: &mut [Tree], strategy: SortStrategy) {
        let aggregator = &self.aggregator;
        match strategy {
            SortStrategy::Recent => {}
            SortStrategy::Best => {
                level.sort_by_cached_key(|tree| Reverse(aggregator.aggregate(&tree.node).score))
            }
            SortStrategy::Controversial => {
                level.sort_by_cached_key(|tree| Reverse(aggregator.aggregate(&tree.node).balance()))
            }
            SortStrategy::Views => level.sort_by_cached_key(|tree| Reverse(tree.node.view_count)),
            SortStrategy::Popular => level.sort_by_cached_key(|tree| {
                Reverse(aggregator.popularity(&tree.node, self.now, self.popularity_window))
            }),
            SortStrategy::Alpha => level.sort_by(|a, b| sort_title(a).cmp(sort_title(b))),
        }
    }
}

fn sort_title(tree: &Tree) -> &str {
    tree.node.title.as_deref().unwrap_or(&tree.node.content)
}
