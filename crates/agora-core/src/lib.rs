/*!
# Agora Core

Argument trees, vote scoring, ranking and moderation shared by the Agora
community forum and its structured-debate views.

Everything in this crate is a pure, synchronous transform over data that has
already been fetched from a store. Nothing here performs I/O.
*/

pub mod error;
pub mod lifecycle;
pub mod model;
pub mod moderation;
pub mod ranking;
pub mod score;
pub mod slug;
pub mod sort;
pub mod tree;
pub mod view;
pub mod vote;

// Re-export for public use
pub use error::{CoreError, CoreResult};
pub use lifecycle::{plan_deletion, DeletionPlan, TOMBSTONE};
pub use model::{
    ArgumentNode, Community, Evidence, NodeId, NodeKind, Stance, Topic, UserId, Vote, VoteValue,
};
pub use moderation::{ModerationResult, ModerationScanner, TermLists, MASK};
pub use ranking::{
    rank_topics, sort_communities, RankedTopic, RankedTopicSelector, TopicActivity, TopicSort,
};
pub use score::{Metrics, ScoreAggregator, CONTROVERSIAL_THRESHOLD};
pub use slug::{is_valid_community_name, slugify};
pub use sort::{SortScope, SortStrategy, TreeSorter};
pub use tree::{Tree, TreeBuilder};
pub use view::{NodeView, ViewBuilder};
pub use vote::{apply_vote, plan_vote, VoteAction, VoteIntent};
