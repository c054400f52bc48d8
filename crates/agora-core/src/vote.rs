//! Vote transitions for one (user, node) pair.
//!
//! Repeating the same vote retracts it, a different vote replaces it, and an
//! explicit clear removes whatever the user had. Stores apply the planned
//! action under their own lock so each transition is atomic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Vote, VoteValue};

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteIntent {
    /// Like or dislike
    Cast(VoteValue),
    /// Remove any existing vote
    Clear,
}

impl TryFrom<i64> for VoteIntent {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteIntent::Clear),
            other => VoteValue::try_from(other).map(VoteIntent::Cast),
        }
    }
}

/// The change a vote intent results in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum VoteAction {
    /// No previous vote; a new one is stored
    Insert(VoteValue),
    /// The previous vote is deleted
    Retract,
    /// The previous vote is overwritten with a different value
    Replace(VoteValue),
    /// Nothing to do
    Noop,
}

impl VoteAction {
    /// The user's vote after the action, given what they had before
    pub fn resulting_vote(&self, previous: Option<VoteValue>) -> Option<VoteValue> {
        match self {
            VoteAction::Insert(value) | VoteAction::Replace(value) => Some(*value),
            VoteAction::Retract => None,
            VoteAction::Noop => previous,
        }
    }
}

/// Decide the transition from `existing` for `intent`
pub fn plan_vote(existing: Option<VoteValue>, intent: VoteIntent) -> VoteAction {
    match (existing, intent) {
        (None, VoteIntent::Cast(value)) => VoteAction::Insert(value),
        (Some(current), VoteIntent::Cast(value)) if current == value => VoteAction::Retract,
        (Some(_), VoteIntent::Cast(value)) => VoteAction::Replace(value),
        (Some(_), VoteIntent::Clear) => VoteAction::Retract,
        (None, VoteIntent::Clear) => VoteAction::Noop,
    }
}

/// Apply `intent` by `user_id` to a node's vote collection.
///
/// Keeps at most one vote per user.
pub fn apply_vote(
    votes: &mut Vec<Vote>,
    user_id: &str,
    intent: VoteIntent,
    at: DateTime<Utc>,
) -> VoteAction {
    let position = votes.iter().position(|vote| vote.user_id == user_id);
    let action = plan_vote(position.map(|pos| votes[pos].value), intent);

    match (action, position) {
        (VoteAction::Insert(value), _) => votes.push(Vote {
            user_id: user_id.to_string(),
            value,
            cast_at: at,
        }),
        (VoteAction::Replace(value), Some(pos)) => {
            votes[pos].value = value;
            votes[pos].cast_at = at;
        }
        (VoteAction::Retract, Some(pos)) => {
            votes.remove(pos);
        }
        _ => {}
    }

    action
}
