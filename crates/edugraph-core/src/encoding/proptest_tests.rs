//! Property-based tests for key ordering.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use super::keys::{
    encode_edge_by_source_key, encode_edge_by_source_kind_prefix, encode_identity_key,
    encode_node_key, prefix_end,
};
use crate::types::{EdgeId, EdgeKind, NodeId, NodeKind};

fn arb_edge_kind() -> impl Strategy<Value = EdgeKind> {
    prop::sample::select(EdgeKind::ALL.to_vec())
}

fn arb_node_kind() -> impl Strategy<Value = NodeKind> {
    prop::sample::select(NodeKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn node_keys_sort_like_ids(a in any::<u64>(), b in any::<u64>()) {
        let ka = encode_node_key(NodeId::new(a));
        let kb = encode_node_key(NodeId::new(b));
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }

    #[test]
    fn adjacency_keys_fall_inside_their_prefix_range(
        source in any::<u64>(),
        edge in any::<u64>(),
        kind in arb_edge_kind(),
    ) {
        let prefix = encode_edge_by_source_kind_prefix(NodeId::new(source), kind);
        let key = encode_edge_by_source_key(NodeId::new(source), kind, EdgeId::new(edge));
        let end = prefix_end(&prefix);
        prop_assert!(key >= prefix);
        prop_assert!(key < end);
    }

    #[test]
    fn adjacency_keys_of_other_sources_stay_outside(
        source in 0..u64::MAX,
        edge in any::<u64>(),
        kind in arb_edge_kind(),
    ) {
        let prefix = encode_edge_by_source_kind_prefix(NodeId::new(source), kind);
        let end = prefix_end(&prefix);
        let next = encode_edge_by_source_key(NodeId::new(source + 1), kind, EdgeId::new(edge));
        prop_assert!(next >= end);
    }

    #[test]
    fn identity_keys_are_injective(
        ka in arb_node_kind(),
        kb in arb_node_kind(),
        a in "[a-z0-9_-]{1,12}",
        b in "[a-z0-9_-]{1,12}",
    ) {
        let same = ka == kb && a == b;
        prop_assert_eq!(same, encode_identity_key(ka, &a) == encode_identity_key(kb, &b));
    }
}
