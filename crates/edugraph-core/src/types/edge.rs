//! Edge types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EdgeId, NodeId};
use super::kind::EdgeKind;

/// A typed relationship, carrying the attributes of its edge kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Relationship {
    /// Student is enrolled in a course.
    Enrolled,
    /// Instructor teaches a course.
    Teaches,
    /// Student submitted an assignment.
    Submitted {
        /// The score awarded for the submission.
        score: f64,
    },
    /// Student follows an instructor.
    Follows,
    /// One user messaged another.
    Messaged {
        /// The message body.
        content: String,
        /// When the message was sent.
        timestamp: DateTime<Utc>,
    },
    /// Post was written by a user.
    Authored,
    /// Post has a reply.
    Replies,
    /// Course requires another course.
    Prerequisite,
    /// Student completed a course.
    Completed,
}

impl Relationship {
    /// The edge kind of this relationship.
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        match self {
            Self::Enrolled => EdgeKind::Enrolled,
            Self::Teaches => EdgeKind::Teaches,
            Self::Submitted { .. } => EdgeKind::Submitted,
            Self::Follows => EdgeKind::Follows,
            Self::Messaged { .. } => EdgeKind::Messaged,
            Self::Authored => EdgeKind::Authored,
            Self::Replies => EdgeKind::Replies,
            Self::Prerequisite => EdgeKind::Prerequisite,
            Self::Completed => EdgeKind::Completed,
        }
    }

    /// Create a `messaged` relationship stamped with the current time.
    #[must_use]
    pub fn message(content: impl Into<String>) -> Self {
        Self::Messaged { content: content.into(), timestamp: Utc::now() }
    }
}

/// A committed directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Permanent internal identity.
    pub id: EdgeId,
    /// The node this edge starts from.
    pub source: NodeId,
    /// The node this edge points to.
    pub target: NodeId,
    /// The relationship and its attributes.
    pub relationship: Relationship,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub const fn new(id: EdgeId, source: NodeId, target: NodeId, relationship: Relationship) -> Self {
        Self { id, source, target, relationship }
    }

    /// The kind of this edge.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        self.relationship.kind()
    }

    /// The node on the other side of `node`, if `node` is an endpoint.
    #[must_use]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}
