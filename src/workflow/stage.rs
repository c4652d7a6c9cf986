//! Stage definitions and per-stage approval status.

use serde::{Deserialize, Serialize};

/// Aggregate status of a single stage within one run.
///
/// Within a run a stage only moves forward along
/// `Inactive -> Pending -> {Approved | Rejected}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Inactive,
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Position along the forward-only status order. Approved and Rejected
    /// share the terminal rank.
    pub fn rank(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Pending => 1,
            Self::Approved | Self::Rejected => 2,
        }
    }

    /// Check whether the stage has been decided.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Check whether moving from `self` to `next` keeps the forward-only order.
    pub fn can_advance_to(self, next: ApprovalStatus) -> bool {
        if self == next {
            return true;
        }
        !self.is_resolved() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Inactive => write!(f, "inactive"),
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A reviewer on a stage's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    /// Avatar image reference, used only for display
    #[serde(default)]
    pub avatar: String,
}

impl Participant {
    pub fn new(id: &str, name: &str, role: &str, department: &str, avatar: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            department: department.to_string(),
            avatar: avatar.to_string(),
        }
    }
}

/// One step of the approval pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Unique slug, also the ordering key in pacing tables
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Reviewers for this stage, in display order
    pub participants: Vec<Participant>,
    /// Whether the stage represents simultaneous multi-party review
    #[serde(default)]
    pub parallel: bool,
    /// Whether a run may end in rejection at this stage
    #[serde(default)]
    pub can_reject: bool,
}

impl Stage {
    pub fn new(id: &str, title: &str, description: &str, participants: Vec<Participant>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            participants,
            parallel: false,
            can_reject: false,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn rejectable(mut self) -> Self {
        self.can_reject = true;
        self
    }

    /// Roster position of a participant, by participant id.
    pub fn participant_index(&self, participant_id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == participant_id)
    }
}
