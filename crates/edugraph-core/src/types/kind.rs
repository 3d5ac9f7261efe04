//! Node and edge kinds of the education graph.
//!
//! Kinds are closed enums: every node carries exactly one [`NodeKind`] and
//! every edge exactly one [`EdgeKind`]. Each kind has a stable one-byte tag
//! used in storage keys, so the discriminants below must never be reused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    /// A learner, keyed by `student_id`.
    Student,
    /// An instructor, keyed by `instructor_id`.
    Instructor,
    /// A course, keyed by `course_id`.
    Course,
    /// A gradable assignment, keyed by `assignment_id`.
    Assignment,
    /// A forum post, keyed by `post_id`.
    Post,
    /// A platform user taking part in messaging and forums, keyed by `user_id`.
    User,
}

impl NodeKind {
    /// All node kinds in tag order.
    pub const ALL: [Self; 6] =
        [Self::Student, Self::Instructor, Self::Course, Self::Assignment, Self::Post, Self::User];

    /// The type name as declared in the schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Instructor => "Instructor",
            Self::Course => "Course",
            Self::Assignment => "Assignment",
            Self::Post => "Post",
            Self::User => "User",
        }
    }

    /// The predicate holding this kind's domain identifier.
    #[must_use]
    pub const fn identity_predicate(self) -> &'static str {
        match self {
            Self::Student => "student_id",
            Self::Instructor => "instructor_id",
            Self::Course => "course_id",
            Self::Assignment => "assignment_id",
            Self::Post => "post_id",
            Self::User => "user_id",
        }
    }

    /// The one-byte tag used in storage keys.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Student => 1,
            Self::Instructor => 2,
            Self::Course => 3,
            Self::Assignment => 4,
            Self::Post => 5,
            Self::User => 6,
        }
    }

    /// Look up a kind by its storage tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Student),
            2 => Some(Self::Instructor),
            3 => Some(Self::Course),
            4 => Some(Self::Assignment),
            5 => Some(Self::Post),
            6 => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Validation(format!("unknown node kind: {s}")))
    }
}

/// The type of a directed relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Student -> Course.
    Enrolled,
    /// Instructor -> Course.
    Teaches,
    /// Student -> Assignment, carries a score.
    Submitted,
    /// Student -> Instructor.
    Follows,
    /// User -> User, carries content and a timestamp.
    Messaged,
    /// Post -> User.
    Authored,
    /// Post -> Post, from parent to reply.
    Replies,
    /// Course -> Course, from a course to one of its prerequisites.
    Prerequisite,
    /// Student -> Course.
    Completed,
}

impl EdgeKind {
    /// All edge kinds in tag order.
    pub const ALL: [Self; 9] = [
        Self::Enrolled,
        Self::Teaches,
        Self::Submitted,
        Self::Follows,
        Self::Messaged,
        Self::Authored,
        Self::Replies,
        Self::Prerequisite,
        Self::Completed,
    ];

    /// The predicate name of this edge kind.
    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Teaches => "teaches",
            Self::Submitted => "submitted",
            Self::Follows => "follows",
            Self::Messaged => "messaged",
            Self::Authored => "authored",
            Self::Replies => "replies",
            Self::Prerequisite => "prerequisite",
            Self::Completed => "completed",
        }
    }

    /// The one-byte tag used in storage keys.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Enrolled => 1,
            Self::Teaches => 2,
            Self::Submitted => 3,
            Self::Follows => 4,
            Self::Messaged => 5,
            Self::Authored => 6,
            Self::Replies => 7,
            Self::Prerequisite => 8,
            Self::Completed => 9,
        }
    }

    /// Look up a kind by its storage tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Enrolled),
            2 => Some(Self::Teaches),
            3 => Some(Self::Submitted),
            4 => Some(Self::Follows),
            5 => Some(Self::Messaged),
            6 => Some(Self::Authored),
            7 => Some(Self::Replies),
            8 => Some(Self::Prerequisite),
            9 => Some(Self::Completed),
            _ => None,
        }
    }

    /// The node kind an edge of this kind starts from.
    #[must_use]
    pub const fn source_kind(self) -> NodeKind {
        match self {
            Self::Enrolled | Self::Submitted | Self::Follows | Self::Completed => NodeKind::Student,
            Self::Teaches => NodeKind::Instructor,
            Self::Messaged => NodeKind::User,
            Self::Authored | Self::Replies => NodeKind::Post,
            Self::Prerequisite => NodeKind::Course,
        }
    }

    /// The node kind an edge of this kind points to.
    #[must_use]
    pub const fn target_kind(self) -> NodeKind {
        match self {
            Self::Enrolled | Self::Teaches | Self::Prerequisite | Self::Completed => {
                NodeKind::Course
            }
            Self::Submitted => NodeKind::Assignment,
            Self::Follows => NodeKind::Instructor,
            Self::Messaged | Self::Authored => NodeKind::User,
            Self::Replies => NodeKind::Post,
        }
    }

    /// Whether an edge of this kind may connect a node to itself.
    ///
    /// A course cannot be its own prerequisite and a post cannot reply to
    /// itself. Users may message themselves.
    #[must_use]
    pub const fn allows_self_loop(self) -> bool {
        !matches!(self, Self::Prerequisite | Self::Replies)
    }

    /// Check whether this edge kind may connect the given endpoint kinds.
    #[must_use]
    pub fn accepts(self, source: NodeKind, target: NodeKind) -> bool {
        self.source_kind() == source && self.target_kind() == target
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.predicate())
    }
}

impl FromStr for EdgeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.predicate().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Validation(format!("unknown edge kind: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_tags_roundtrip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NodeKind::from_tag(0), None);
    }

    #[test]
    fn edge_tags_are_unique() {
        let mut tags: Vec<u8> = EdgeKind::ALL.iter().map(|k| k.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), EdgeKind::ALL.len());
    }

    #[test]
    fn parse_kinds() {
        assert_eq!("student".parse::<NodeKind>().ok(), Some(NodeKind::Student));
        assert_eq!("Prerequisite".parse::<EdgeKind>().ok(), Some(EdgeKind::Prerequisite));
        assert!("Lecture".parse::<NodeKind>().is_err());
    }

    #[test]
    fn endpoint_rules() {
        assert!(EdgeKind::Teaches.accepts(NodeKind::Instructor, NodeKind::Course));
        assert!(!EdgeKind::Teaches.accepts(NodeKind::Student, NodeKind::Course));
        assert!(EdgeKind::Authored.accepts(NodeKind::Post, NodeKind::User));
        assert!(!EdgeKind::Replies.allows_self_loop());
        assert!(EdgeKind::Messaged.allows_self_loop());
    }
}
