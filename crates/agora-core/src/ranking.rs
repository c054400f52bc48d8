//! Topic and entity listings: "hot" topics by recent activity, topic
//! ordering for the debate index, and alphabetical community listings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::{ArgumentNode, Community, Topic};
use crate::score::ScoreAggregator;

/// Number of hot topics shown by default
pub const HOT_TOPIC_LIMIT: usize = 5;

/// Trailing window for hot-topic activity
pub const HOT_TOPIC_WINDOW_HOURS: i64 = 48;

/// Window for the "trend" topic listing
pub const TREND_WINDOW_DAYS: i64 = 7;

/// A topic with the number of items posted to it inside the activity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicActivity {
    pub id: Uuid,
    pub title: String,
    pub count: u64,
}

/// Picks the most active topics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedTopicSelector;

impl RankedTopicSelector {
    pub fn new() -> Self {
        Self
    }

    /// The `k` topics with the highest counts, most active first.
    ///
    /// Topics without any activity are dropped. Ties keep the order the
    /// topics were supplied in.
    pub fn top_k(&self, topics: &[TopicActivity], k: usize) -> Vec<TopicActivity> {
        let mut active: Vec<TopicActivity> = topics
            .iter()
            .filter(|topic| topic.count > 0)
            .cloned()
            .collect();
        active.sort_by_key(|topic| Reverse(topic.count));
        active.truncate(k);
        active
    }

    /// Count nodes created at or after `now - window` per topic.
    ///
    /// A node belongs to a topic when its `tree_id` is the topic id. The
    /// result follows the order of `topics`.
    pub fn count_in_window(
        &self,
        topics: &[Topic],
        nodes: &[ArgumentNode],
        now: DateTime<Utc>,
        window: Duration,
    ) -> Vec<TopicActivity> {
        let since = now - window;
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for node in nodes {
            if node.created_at >= since {
                *counts.entry(node.tree_id).or_insert(0) += 1;
            }
        }

        topics
            .iter()
            .map(|topic| TopicActivity {
                id: topic.id,
                title: topic.title.clone(),
                count: counts.get(&topic.id).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Ordering of the topic index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum TopicSort {
    /// Newest first
    #[default]
    New,
    /// Highest total score of the topic's nodes first
    Best,
    /// Like `Best`, restricted to topics created inside the trend window
    Trend,
}

impl TopicSort {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "best" => TopicSort::Best,
            "trend" => TopicSort::Trend,
            _ => TopicSort::New,
        }
    }
}

impl From<String> for TopicSort {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

/// A topic with its total score, as listed in the topic index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTopic {
    #[serde(flatten)]
    pub topic: Topic,
    pub score: i64,
}

/// Order topics for the index page.
///
/// `nodes` may contain nodes of any tree; only nodes whose `tree_id` is one
/// of the topics contribute to that topic's score.
pub fn rank_topics(
    topics: Vec<Topic>,
    nodes: &[ArgumentNode],
    sort: TopicSort,
    aggregator: &ScoreAggregator,
    now: DateTime<Utc>,
    trend_window: Duration,
) -> Vec<RankedTopic> {
    let mut scores: HashMap<Uuid, i64> = HashMap::new();
    for node in nodes {
        *scores.entry(node.tree_id).or_insert(0) += aggregator.aggregate(node).score;
    }

    let mut ranked: Vec<RankedTopic> = topics
        .into_iter()
        .map(|topic| {
            let score = scores.get(&topic.id).copied().unwrap_or(0);
            RankedTopic { topic, score }
        })
        .collect();

    match sort {
        TopicSort::New => ranked.sort_by_key(|r| Reverse(r.topic.created_at)),
        TopicSort::Best => ranked.sort_by_key(|r| Reverse(r.score)),
        TopicSort::Trend => {
            let since = now - trend_window;
            ranked.retain(|r| r.topic.created_at >= since);
            ranked.sort_by_key(|r| Reverse(r.score));
        }
    }
    ranked
}

/// Communities in ascending title order
pub fn sort_communities(mut communities: Vec<Community>) -> Vec<Community> {
    communities.sort_by(|a, b| a.title.cmp(&b.title));
    communities
}
