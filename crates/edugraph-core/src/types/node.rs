//! Node types and their typed attributes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::NodeId;
use super::kind::NodeKind;
use crate::error::CoreError;

/// The external identity of a node: its kind plus the domain identifier.
///
/// Callers and collaborating stores only ever see domain identifiers such as
/// `"s1"`. Identity is unique per `(kind, domain_id)`, so `Student("u1")` and
/// `User("u1")` are different nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    /// The node kind.
    pub kind: NodeKind,
    /// The opaque domain identifier.
    pub domain_id: String,
}

impl NodeKey {
    /// Create a new node key.
    #[must_use]
    pub fn new(kind: NodeKind, domain_id: impl Into<String>) -> Self {
        Self { kind, domain_id: domain_id.into() }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.domain_id)
    }
}

/// Typed attributes of a node, one variant per [`NodeKind`].
///
/// Optional attributes are `Option`s: merging a patch overwrites the fields
/// it provides and never clears a field it leaves as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeFields {
    /// A student has no attributes beyond its identifier.
    Student,
    /// An instructor has no attributes beyond its identifier.
    Instructor,
    /// A user has no attributes beyond its identifier.
    User,
    /// Course attributes.
    Course {
        /// Human-readable course title.
        title: Option<String>,
    },
    /// Assignment attributes.
    Assignment {
        /// Latest submitted score.
        score: Option<f64>,
    },
    /// Post attributes. Posts are immutable once created.
    Post {
        /// The post body.
        content: String,
        /// When the post was created.
        timestamp: DateTime<Utc>,
    },
}

impl NodeFields {
    /// The node kind these fields belong to.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Student => NodeKind::Student,
            Self::Instructor => NodeKind::Instructor,
            Self::User => NodeKind::User,
            Self::Course { .. } => NodeKind::Course,
            Self::Assignment { .. } => NodeKind::Assignment,
            Self::Post { .. } => NodeKind::Post,
        }
    }

    /// Fields for a freshly referenced node with no attributes set.
    ///
    /// Returns `None` for [`NodeKind::Post`], which cannot exist without
    /// content and a timestamp.
    #[must_use]
    pub const fn empty(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Student => Some(Self::Student),
            NodeKind::Instructor => Some(Self::Instructor),
            NodeKind::User => Some(Self::User),
            NodeKind::Course => Some(Self::Course { title: None }),
            NodeKind::Assignment => Some(Self::Assignment { score: None }),
            NodeKind::Post => None,
        }
    }

    /// Merge a patch into these fields.
    ///
    /// Returns `true` if anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KindMismatch`] if the patch is for another kind, and
    /// [`CoreError::Validation`] if the patch would change an existing post.
    pub fn merge(&mut self, patch: Self) -> Result<bool, CoreError> {
        if self.kind() != patch.kind() {
            return Err(CoreError::kind_mismatch(self.kind().as_str(), patch.kind().as_str()));
        }

        match (self, patch) {
            (Self::Course { title }, Self::Course { title: Some(new) }) => {
                Ok(replace_if_changed(title, new))
            }
            (Self::Assignment { score }, Self::Assignment { score: Some(new) }) => {
                let changed = score.map_or(true, |old| old.to_bits() != new.to_bits());
                *score = Some(new);
                Ok(changed)
            }
            (
                Self::Post { content, timestamp },
                Self::Post { content: new_content, timestamp: new_timestamp },
            ) => {
                if *content == new_content && *timestamp == new_timestamp {
                    Ok(false)
                } else {
                    Err(CoreError::Validation("posts cannot be modified".to_owned()))
                }
            }
            _ => Ok(false),
        }
    }
}

fn replace_if_changed(slot: &mut Option<String>, value: String) -> bool {
    if slot.as_deref() == Some(value.as_str()) {
        return false;
    }
    *slot = Some(value);
    true
}

/// A committed node in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Permanent internal identity.
    pub id: NodeId,
    /// The domain identifier this node was created for.
    pub domain_id: String,
    /// Typed attributes, which also determine the node kind.
    pub fields: NodeFields,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub fn new(id: NodeId, domain_id: impl Into<String>, fields: NodeFields) -> Self {
        Self { id, domain_id: domain_id.into(), fields }
    }

    /// The kind of this node.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.fields.kind()
    }

    /// The external identity of this node.
    #[must_use]
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind(), self.domain_id.clone())
    }

    /// Check whether this node is the one named by `key`.
    #[must_use]
    pub fn matches(&self, key: &NodeKey) -> bool {
        self.kind() == key.kind && self.domain_id == key.domain_id
    }

    /// The course title, if this is a titled course.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match &self.fields {
            NodeFields::Course { title } => title.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_provided_fields() {
        let mut fields = NodeFields::Course { title: Some("Intro".to_owned()) };
        let changed =
            fields.merge(NodeFields::Course { title: Some("Intro to Graphs".to_owned()) }).unwrap();
        assert!(changed);
        assert_eq!(fields, NodeFields::Course { title: Some("Intro to Graphs".to_owned()) });
    }

    #[test]
    fn merge_never_clears() {
        let mut fields = NodeFields::Assignment { score: Some(90.0) };
        let changed = fields.merge(NodeFields::Assignment { score: None }).unwrap();
        assert!(!changed);
        assert_eq!(fields, NodeFields::Assignment { score: Some(90.0) });
    }

    #[test]
    fn merge_rejects_other_kind() {
        let mut fields = NodeFields::Student;
        assert!(matches!(
            fields.merge(NodeFields::Instructor),
            Err(CoreError::KindMismatch { .. })
        ));
    }

    #[test]
    fn posts_are_immutable() {
        let timestamp = Utc::now();
        let mut post = NodeFields::Post { content: "hello".to_owned(), timestamp };
        assert!(!post.merge(post.clone()).unwrap());
        assert!(post.merge(NodeFields::Post { content: "edited".to_owned(), timestamp }).is_err());
    }

    #[test]
    fn empty_fields() {
        assert_eq!(NodeFields::empty(NodeKind::Course), Some(NodeFields::Course { title: None }));
        assert_eq!(NodeFields::empty(NodeKind::Post), None);
    }

    #[test]
    fn key_display() {
        let node = Node::new(NodeId::new(3), "s1", NodeFields::Student);
        assert_eq!(node.key().to_string(), "Student(s1)");
        assert!(node.matches(&NodeKey::new(NodeKind::Student, "s1")));
        assert!(!node.matches(&NodeKey::new(NodeKind::User, "s1")));
    }
}
