use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Identifier of an argument node
pub type NodeId = Uuid;

/// Opaque identifier of a user, as handed out by the session layer
pub type UserId = String;

/// The kind of content a node carries.
///
/// All kinds share the same tree, scoring and sorting logic; the tag only
/// matters to the display layer and to write-time validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "post")]
    Post,
    #[default]
    #[serde(rename = "comment")]
    Comment,
    #[serde(rename = "opinion")]
    Opinion,
    #[serde(rename = "claim")]
    Claim,
    #[serde(rename = "rebuttal")]
    Rebuttal,
}

impl NodeKind {
    /// Whether nodes of this kind carry a title
    pub fn is_titled(&self) -> bool {
        matches!(self, NodeKind::Post | NodeKind::Claim)
    }

    /// Whether a node of this kind may hang off `parent` (`None` for a root).
    ///
    /// Posts and claims are always roots. Comments reply to posts or
    /// comments, rebuttals to claims or rebuttals. Opinions sit at the top
    /// of a topic or reply to other opinions.
    pub fn accepts_parent(&self, parent: Option<NodeKind>) -> bool {
        match (self, parent) {
            (NodeKind::Post | NodeKind::Claim, parent) => parent.is_none(),
            (NodeKind::Comment, Some(NodeKind::Post | NodeKind::Comment)) => true,
            (NodeKind::Rebuttal, Some(NodeKind::Claim | NodeKind::Rebuttal)) => true,
            (NodeKind::Opinion, None | Some(NodeKind::Opinion)) => true,
            _ => false,
        }
    }
}

/// Side taken by an argument in a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    #[serde(rename = "PRO")]
    Pro,
    #[serde(rename = "CON")]
    Con,
}

impl Stance {
    /// The opposite side
    pub fn opposite(self) -> Self {
        match self {
            Stance::Pro => Stance::Con,
            Stance::Con => Stance::Pro,
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stance::Pro => write!(f, "PRO"),
            Stance::Con => write!(f, "CON"),
        }
    }
}

impl FromStr for Stance {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pro" => Ok(Stance::Pro),
            "con" => Ok(Stance::Con),
            other => Err(CoreError::InvalidStance(other.to_string())),
        }
    }
}

/// Direction of a single vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    /// A like, worth +1
    Up,
    /// A dislike, worth -1
    Down,
}

impl VoteValue {
    /// Signed weight of the vote
    pub fn weight(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.weight()
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(CoreError::InvalidVoteValue(other)),
        }
    }
}

/// A vote cast by one user on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The voter
    pub user_id: UserId,

    /// Like or dislike
    pub value: VoteValue,

    /// When the vote was cast or last changed
    pub cast_at: DateTime<Utc>,
}

/// A supporting source attached to a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Where the evidence comes from (usually a URL)
    pub source: String,

    /// Who published it
    pub publisher: String,

    /// Optional quoted passage
    pub text: Option<String>,
}

/// A post, comment, opinion, claim or rebuttal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentNode {
    /// Unique identifier of the node
    pub id: NodeId,

    /// The logical tree (post, topic or claim) this node belongs to
    pub tree_id: Uuid,

    /// Community a post was published into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<Uuid>,

    /// What kind of content this is
    pub kind: NodeKind,

    /// Parent node; `None` marks a root
    pub parent_id: Option<NodeId>,

    /// Owner of the node
    pub author_id: UserId,

    /// Title (posts and claims only)
    pub title: Option<String>,

    /// Body text, or the tombstone once deleted
    pub content: String,

    /// Stored stance, if the author picked one
    pub stance: Option<Stance>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Soft moderation flag set at creation
    pub caution: bool,

    /// Votes, at most one per user
    #[serde(default)]
    pub votes: Vec<Vote>,

    /// Evidence backing a claim
    #[serde(default)]
    pub evidence: Vec<Evidence>,

    /// Page renders counted by the store
    #[serde(default)]
    pub view_count: u64,

    /// Set once the node has been tombstoned
    #[serde(default)]
    pub deleted: bool,
}

impl ArgumentNode {
    /// Create a new node with a fresh id, stamped now
    pub fn new(
        tree_id: Uuid,
        kind: NodeKind,
        parent_id: Option<NodeId>,
        author_id: impl Into<UserId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tree_id,
            community_id: None,
            kind,
            parent_id,
            author_id: author_id.into(),
            title: None,
            content: content.into(),
            stance: None,
            created_at: Utc::now(),
            caution: false,
            votes: Vec::new(),
            evidence: Vec::new(),
            view_count: 0,
            deleted: false,
        }
    }

    /// Attach the node to a community
    pub fn in_community(mut self, community_id: Uuid) -> Self {
        self.community_id = Some(community_id);
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the stance
    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = Some(stance);
        self
    }

    /// Override the creation timestamp
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// The vote a given user has on this node, if any
    pub fn vote_of(&self, user_id: &str) -> Option<VoteValue> {
        self.votes
            .iter()
            .find(|vote| vote.user_id == user_id)
            .map(|vote| vote.value)
    }
}

/// A debate topic that opinions and claims hang off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier, also the `tree_id` of its opinions
    pub id: Uuid,

    /// Title of the topic
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Optional category (politics, economy, ...)
    pub category: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Topic {
    /// Create a new topic stamped now
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            category: None,
            created_at: Utc::now(),
        }
    }
}

/// A forum community that posts are published into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
