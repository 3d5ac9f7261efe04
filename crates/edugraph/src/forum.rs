//! Forum posts and reply threads.
//!
//! A post is a `Post` node with an `authored` edge to its `User`. A reply is a
//! post that its parent links to with a `replies` edge. Replies are always new
//! posts, so every post has at most one parent and the `replies` edges form a
//! tree under each top-level post.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use edugraph_core::{EdgeKind, Node, NodeFields, NodeId, NodeKind, Relationship};
use edugraph_graph::store::NodeStore;
use edugraph_graph::traversal::{Direction, Expand};
use edugraph_storage::{StorageEngine, Transaction};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mutator::{EdgeMutator, MutationPlan};
use crate::resolver::EntityResolver;

/// A stored forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// The post node.
    pub node_id: NodeId,
    /// The post's domain identifier.
    pub post_id: String,
    /// The author's user identifier.
    pub author_id: String,
    /// The post body.
    pub content: String,
    /// When the post was created.
    pub timestamp: DateTime<Utc>,
    /// The post this one replies to.
    pub parent_id: Option<String>,
}

/// A post and its replies, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadNode {
    /// The post.
    pub post: Post,
    /// Direct replies, oldest first.
    pub replies: Vec<ThreadNode>,
}

impl ThreadNode {
    /// Number of posts in this subtree.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(Self::len).sum::<usize>()
    }

    /// A thread always holds at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Post IDs of the subtree in depth-first order.
    #[must_use]
    pub fn post_ids(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_ids(&mut out);
        out
    }

    /// Length of the longest reply chain below this post.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.replies.iter().map(|r| r.depth() + 1).max().unwrap_or(0)
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.post.post_id);
        for reply in &self.replies {
            reply.collect_ids(out);
        }
    }
}

/// Writes posts and replies and reads threads back.
pub struct ForumThreadBuilder<E: StorageEngine> {
    engine: Arc<E>,
    resolver: EntityResolver<E>,
    mutator: EdgeMutator<E>,
}

impl<E: StorageEngine> ForumThreadBuilder<E> {
    pub(crate) fn new(engine: Arc<E>, resolver: EntityResolver<E>, mutator: EdgeMutator<E>) -> Self {
        Self { engine, resolver, mutator }
    }

    /// Create a top-level post by `author_id`.
    ///
    /// The author's user node is created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] if `post_id` already exists.
    pub fn create_post(&self, post_id: &str, author_id: &str, content: &str) -> Result<Post> {
        self.write_post(post_id, author_id, content, None)
    }

    /// Create a post replying to `parent_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::NodeNotFound`] if the parent post does not exist
    /// - [`Error::Rejected`] if `reply_id` already exists or equals `parent_id`
    pub fn reply_to(
        &self,
        parent_id: &str,
        reply_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Post> {
        if parent_id == reply_id {
            return Err(Error::rejected(format!("post {reply_id} cannot reply to itself")));
        }
        self.write_post(reply_id, author_id, content, Some(parent_id))
    }

    /// Read the reply tree rooted at `root_post_id`.
    ///
    /// The whole tree is read from one snapshot.
    ///
    /// # Errors
    ///
    /// - [`Error::NodeNotFound`] if the root post does not exist
    /// - [`Error::IntegrityAnomaly`] if a post is reached twice or has no
    ///   single author
    pub fn thread(&self, root_post_id: &str) -> Result<ThreadNode> {
        let tx = self.engine.begin_read()?;
        let root = self.resolver.resolve_in(&tx, NodeKind::Post, root_post_id)?;
        let root = root
            .id()
            .ok_or_else(|| Error::NodeNotFound(format!("post {root_post_id}")))?;

        let parent = Expand::neighbor_ids(&tx, root, EdgeKind::Replies, Direction::Incoming)?;
        let parent_id = match parent.as_slice() {
            [] => None,
            [parent] => Some(load_node(&tx, *parent)?.domain_id),
            _ => {
                return Err(Error::IntegrityAnomaly(format!(
                    "post {root_post_id} has {} parents",
                    parent.len()
                )))
            }
        };

        let mut visited = HashSet::new();
        build_thread(&tx, root, parent_id, &mut visited)
    }

    fn write_post(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Post> {
        let timestamp = Utc::now();
        let fields = NodeFields::Post { content: content.to_owned(), timestamp };

        let outcome = self.mutator.retry(|| {
            let tx = self.engine.begin_read()?;
            let post = self.resolver.resolve_in(&tx, NodeKind::Post, post_id)?;
            if !post.is_pending() {
                return Err(Error::rejected(format!("post {post_id} already exists")));
            }
            let author = self.resolver.resolve_in(&tx, NodeKind::User, author_id)?;
            let parent = match parent_id {
                Some(parent_id) => {
                    let parent = self.resolver.resolve_in(&tx, NodeKind::Post, parent_id)?;
                    if parent.is_pending() {
                        return Err(Error::NodeNotFound(format!("post {parent_id}")));
                    }
                    Some(parent)
                }
                None => None,
            };
            drop(tx);

            let mut plan = MutationPlan::new();
            let post_slot = plan.node(post.with_fields(fields.clone()));
            let author_slot = plan.node(author);
            plan.edge(Relationship::Authored, post_slot, author_slot);
            if let Some(parent) = parent {
                let parent_slot = plan.node(parent);
                plan.edge(Relationship::Replies, parent_slot, post_slot);
            }
            self.mutator.commit(&plan)
        })?;

        let node = outcome
            .nodes
            .first()
            .ok_or_else(|| Error::Internal("committed post plan returned no node".to_owned()))?;
        debug!(post_id, author_id, reply = parent_id.is_some(), "post created");

        Ok(Post {
            node_id: node.id,
            post_id: post_id.to_owned(),
            author_id: author_id.to_owned(),
            content: content.to_owned(),
            timestamp,
            parent_id: parent_id.map(str::to_owned),
        })
    }
}

fn build_thread<T: Transaction>(
    tx: &T,
    id: NodeId,
    parent_id: Option<String>,
    visited: &mut HashSet<NodeId>,
) -> Result<ThreadNode> {
    if !visited.insert(id) {
        return Err(Error::IntegrityAnomaly(format!("post {id} is reachable by more than one path")));
    }

    let post = load_post(tx, id, parent_id)?;

    let mut children = Vec::new();
    for child in Expand::neighbor_ids(tx, id, EdgeKind::Replies, Direction::Outgoing)? {
        children.push(load_post(tx, child, Some(post.post_id.clone()))?);
    }
    children.sort_by(|a, b| (a.timestamp, &a.post_id).cmp(&(b.timestamp, &b.post_id)));

    let mut replies = Vec::with_capacity(children.len());
    for child in children {
        let reply = build_thread(tx, child.node_id, child.parent_id, visited)?;
        replies.push(reply);
    }

    Ok(ThreadNode { post, replies })
}

fn load_post<T: Transaction>(tx: &T, id: NodeId, parent_id: Option<String>) -> Result<Post> {
    let node = load_node(tx, id)?;
    let key = node.key();
    let Node { domain_id, fields, .. } = node;
    let NodeFields::Post { content, timestamp } = fields else {
        return Err(Error::IntegrityAnomaly(format!("replies edge leads to {key} instead of a post")));
    };

    let authors = Expand::neighbor_ids(tx, id, EdgeKind::Authored, Direction::Outgoing)?;
    let [author] = authors.as_slice() else {
        return Err(Error::IntegrityAnomaly(format!(
            "post {domain_id} has {} authors",
            authors.len()
        )));
    };
    let author = load_node(tx, *author)?;

    Ok(Post {
        node_id: id,
        post_id: domain_id,
        author_id: author.domain_id,
        content,
        timestamp,
        parent_id,
    })
}

fn load_node<T: Transaction>(tx: &T, id: NodeId) -> Result<Node> {
    NodeStore::get(tx, id)?
        .ok_or_else(|| Error::IntegrityAnomaly(format!("edge refers to missing node {id}")))
}
