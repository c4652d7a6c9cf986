//! Participant votes and the stage-level reducer.

use serde::{Deserialize, Serialize};

use super::ApprovalStatus;

/// A single reviewer's decision, also used as a stage verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Approve,
    Reject,
}

impl Vote {
    /// Stage status a verdict resolves to.
    pub fn status(self) -> ApprovalStatus {
        match self {
            Vote::Approve => ApprovalStatus::Approved,
            Vote::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Reduce a stage's roster votes to a verdict.
///
/// Any reject decides the stage immediately, even with votes outstanding.
/// Approval needs every participant to have approved. Anything else is
/// undecided.
pub fn reduce_votes(votes: &[Option<Vote>]) -> Option<Vote> {
    if votes.contains(&Some(Vote::Reject)) {
        return Some(Vote::Reject);
    }
    if !votes.is_empty() && votes.iter().all(|v| *v == Some(Vote::Approve)) {
        return Some(Vote::Approve);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_approve() {
        let votes = [Some(Vote::Approve), Some(Vote::Approve), Some(Vote::Approve)];
        assert_eq!(reduce_votes(&votes), Some(Vote::Approve));
    }

    #[test]
    fn test_single_reject_wins_with_votes_outstanding() {
        let votes = [None, Some(Vote::Reject), None];
        assert_eq!(reduce_votes(&votes), Some(Vote::Reject));

        let votes = [Some(Vote::Approve), Some(Vote::Approve), Some(Vote::Reject)];
        assert_eq!(reduce_votes(&votes), Some(Vote::Reject));
    }

    #[test]
    fn test_partial_approval_is_undecided() {
        let votes = [Some(Vote::Approve), None, Some(Vote::Approve)];
        assert_eq!(reduce_votes(&votes), None);
        assert_eq!(reduce_votes(&[]), None);
    }

    #[test]
    fn test_vote_status() {
        assert_eq!(Vote::Approve.status(), ApprovalStatus::Approved);
        assert_eq!(Vote::Reject.status(), ApprovalStatus::Rejected);
    }
}
