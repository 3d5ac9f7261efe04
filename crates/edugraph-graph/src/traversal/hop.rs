//! Fixed-shape multi-hop traversal with cascade pruning.
//!
//! A [`HopQuery`] starts from a set of nodes and follows an ordered list of
//! hops. Layer `i + 1` holds every node reached from layer `i` by hop `i`.
//! After the forward pass, any node that does not lead all the way to the
//! last layer is dropped, together with its links. A hop that matches nothing
//! therefore empties the whole result: no partial paths survive.

use std::collections::{BTreeMap, BTreeSet};

use edugraph_core::{EdgeKind, NodeId};
use edugraph_storage::Transaction;

use super::{Direction, Expand};
use crate::store::GraphResult;

/// One step of a [`HopQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    /// The edge kind to follow.
    pub kind: EdgeKind,
    /// Which way to follow it.
    pub direction: Direction,
    /// Nodes that may not appear in this hop's layer.
    pub exclude: BTreeSet<NodeId>,
}

impl Hop {
    /// A hop over `kind` in `direction`.
    #[must_use]
    pub fn new(kind: EdgeKind, direction: Direction) -> Self {
        Self { kind, direction, exclude: BTreeSet::new() }
    }
}

/// A multi-hop traversal query.
#[derive(Debug, Clone, Default)]
pub struct HopQuery {
    start: BTreeSet<NodeId>,
    hops: Vec<Hop>,
}

impl HopQuery {
    /// Start a query from the given nodes.
    #[must_use]
    pub fn from_nodes(start: impl IntoIterator<Item = NodeId>) -> Self {
        Self { start: start.into_iter().collect(), hops: Vec::new() }
    }

    /// Append a hop.
    #[must_use]
    pub fn hop(mut self, kind: EdgeKind, direction: Direction) -> Self {
        self.hops.push(Hop::new(kind, direction));
        self
    }

    /// Append a hop whose layer may not contain any of `exclude`.
    #[must_use]
    pub fn hop_excluding(
        mut self,
        kind: EdgeKind,
        direction: Direction,
        exclude: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let mut hop = Hop::new(kind, direction);
        hop.exclude = exclude.into_iter().collect();
        self.hops.push(hop);
        self
    }

    /// The hops of this query.
    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Run the query inside `tx`.
    ///
    /// # Errors
    ///
    /// Returns an error if an adjacency scan fails.
    pub fn execute<T: Transaction>(&self, tx: &T) -> GraphResult<HopResult> {
        let depth = self.hops.len();
        let mut layers = Vec::with_capacity(depth + 1);
        let mut links: Vec<BTreeSet<(NodeId, NodeId)>> = Vec::with_capacity(depth);

        layers.push(self.start.clone());
        if self.start.is_empty() {
            return Ok(HopResult::pruned(depth));
        }

        for hop in &self.hops {
            let mut next = BTreeSet::new();
            let mut hop_links = BTreeSet::new();

            for &from in layers.last().into_iter().flatten() {
                for to in Expand::neighbor_ids(tx, from, hop.kind, hop.direction)? {
                    if hop.exclude.contains(&to) {
                        continue;
                    }
                    next.insert(to);
                    hop_links.insert((from, to));
                }
            }

            if next.is_empty() {
                return Ok(HopResult::pruned(depth));
            }
            layers.push(next);
            links.push(hop_links);
        }

        Ok(HopResult::cascade(layers, links))
    }
}

/// The surviving layers and links of a [`HopQuery`].
///
/// Layer 0 is the start set. `links(i)` holds the `(from, to)` pairs of hop
/// `i`, connecting layer `i` to layer `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopResult {
    layers: Vec<BTreeSet<NodeId>>,
    links: Vec<BTreeSet<(NodeId, NodeId)>>,
}

impl HopResult {
    fn pruned(depth: usize) -> Self {
        Self { layers: vec![BTreeSet::new(); depth + 1], links: vec![BTreeSet::new(); depth] }
    }

    /// Drop every node that does not reach the last layer.
    fn cascade(
        mut layers: Vec<BTreeSet<NodeId>>,
        mut links: Vec<BTreeSet<(NodeId, NodeId)>>,
    ) -> Self {
        for i in (0..links.len()).rev() {
            let alive_next = &layers[i + 1];
            links[i].retain(|(_, to)| alive_next.contains(to));
            let alive: BTreeSet<NodeId> = links[i].iter().map(|(from, _)| *from).collect();
            layers[i].retain(|node| alive.contains(node));
        }
        Self { layers, links }
    }

    /// Whether the traversal was pruned away entirely.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().any(BTreeSet::is_empty)
    }

    /// The number of hops.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    /// The surviving nodes of layer `i`.
    #[must_use]
    pub fn layer(&self, i: usize) -> Option<&BTreeSet<NodeId>> {
        self.layers.get(i)
    }

    /// The surviving nodes of the last layer.
    #[must_use]
    pub fn last(&self) -> &BTreeSet<NodeId> {
        static EMPTY: BTreeSet<NodeId> = BTreeSet::new();
        self.layers.last().unwrap_or(&EMPTY)
    }

    /// The surviving links of hop `i`.
    #[must_use]
    pub fn links(&self, i: usize) -> Option<&BTreeSet<(NodeId, NodeId)>> {
        self.links.get(i)
    }

    /// For each node of the last layer, the distinct nodes of the previous
    /// layer that reach it.
    #[must_use]
    pub fn last_predecessors(&self) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
        let mut out: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        if let Some(last_links) = self.links.last() {
            for &(from, to) in last_links {
                out.entry(to).or_default().insert(from);
            }
        }
        out
    }
}
