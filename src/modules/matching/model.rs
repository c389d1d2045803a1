use serde::Serialize;

use crate::{api::error, modules::user::model::UserProfile};

/// Unordered user pair, lower id first. Matches and rooms are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalPair {
    pub user_a: i64,
    pub user_b: i64,
}

impl CanonicalPair {
    pub fn new(x: i64, y: i64) -> Result<Self, error::SystemError> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Ok(Self { user_a: x, user_b: y }),
            std::cmp::Ordering::Greater => Ok(Self { user_a: y, user_b: x }),
            std::cmp::Ordering::Equal => {
                Err(error::SystemError::bad_request("A pair needs two distinct users"))
            }
        }
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    pub fn other(&self, user_id: i64) -> i64 {
        if self.user_a == user_id {
            self.user_b
        } else {
            self.user_a
        }
    }
}

/// What a signal did to the pair's match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// like recorded, waiting for the other side
    Pending,
    /// match became active with this signal
    Formed,
    AlreadyMatched,
    /// an active match was deactivated
    Retracted,
    /// non-like signal with no active match to touch
    Recorded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalOutcome {
    pub status: MatchStatus,
    pub is_match: bool,
    pub match_id: Option<i64>,
    pub room_id: Option<i64>,
}

impl SignalOutcome {
    pub fn pending() -> Self {
        Self { status: MatchStatus::Pending, is_match: false, match_id: None, room_id: None }
    }

    pub fn recorded() -> Self {
        Self { status: MatchStatus::Recorded, is_match: false, match_id: None, room_id: None }
    }

    pub fn matched(status: MatchStatus, match_id: i64, room_id: i64) -> Self {
        Self { status, is_match: true, match_id: Some(match_id), room_id: Some(room_id) }
    }

    pub fn retracted(match_id: i64, room_id: Option<i64>) -> Self {
        Self { status: MatchStatus::Retracted, is_match: false, match_id: Some(match_id), room_id }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub id: i64,
    pub other_user: UserProfile,
    pub chat_room_id: Option<i64>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        assert_eq!(CanonicalPair::new(9, 3).unwrap(), CanonicalPair::new(3, 9).unwrap());
        let pair = CanonicalPair::new(9, 3).unwrap();
        assert_eq!((pair.user_a, pair.user_b), (3, 9));
        assert_eq!(pair.other(3), 9);
        assert!(pair.contains(9));
        assert!(!pair.contains(4));
    }

    #[test]
    fn test_pair_rejects_self() {
        assert!(matches!(CanonicalPair::new(5, 5), Err(error::SystemError::BadRequest(_))));
    }

    #[test]
    fn test_outcome_serializes_snake_case_status() {
        let json = serde_json::to_value(SignalOutcome::matched(MatchStatus::AlreadyMatched, 4, 8))
            .unwrap();
        assert_eq!(json["status"], "already_matched");
        assert_eq!(json["is_match"], true);
        assert_eq!(json["room_id"], 8);
    }
}
