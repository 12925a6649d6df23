// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat-arena BVH over per-triangle bounding boxes
//!
//! Nodes live in one contiguous array and address each other by index; `-1`
//! marks an absent child. Leaves occupy the first `triangle_count` slots in
//! face order, internal nodes are appended behind them during construction,
//! and the subtree root returned by the top-level build call is always the
//! last node written.

use super::BoundingBox;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Node in the flat BVH arena
///
/// A node is a leaf iff `face_index >= 0`, in which case it points into the
/// triangle table and has `left == right == -1`. Internal nodes carry
/// `face_index == -1` and two valid children.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BvhNode {
    /// Bounding box of the subtree rooted here
    pub aabb: BoundingBox,
    /// Box centroid, used only as the partition sort key
    pub center: Point3<f64>,
    /// Left child index, -1 if absent
    pub left: i32,
    /// Right child index, -1 if absent
    pub right: i32,
    /// Face index for leaves, -1 for internal nodes
    pub face_index: i32,
}

impl BvhNode {
    /// Leaf node over a single face
    pub fn leaf(aabb: BoundingBox, face_index: usize) -> Self {
        Self {
            aabb,
            center: aabb.center(),
            left: -1,
            right: -1,
            face_index: face_index as i32,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.face_index >= 0
    }
}

/// Build the hierarchy over `nodes`, which holds exactly `leaf_count` leaf
/// nodes on entry. Internal nodes are appended; the root ends up last.
/// Returns the maximum tree depth in levels (a lone leaf counts as 1).
pub(crate) fn build(nodes: &mut Vec<BvhNode>, leaf_count: usize) -> usize {
    let mut order: Vec<usize> = (0..leaf_count).collect();
    let mut max_depth = 0;
    build_range(nodes, &mut order, 1, &mut max_depth);
    max_depth
}

/// Partition one slice of the leaf order and emit the subtree's internal
/// nodes. Returns the subtree root's index, or -1 for an empty slice.
///
/// The median-index split keeps both halves non-empty, so recursion depth is
/// bounded by `ceil(log2(leaf_count)) + 1` regardless of input geometry.
fn build_range(
    nodes: &mut Vec<BvhNode>,
    order: &mut [usize],
    depth: usize,
    max_depth: &mut usize,
) -> i32 {
    if order.is_empty() {
        return -1;
    }
    if depth > *max_depth {
        *max_depth = depth;
    }
    if order.len() == 1 {
        // A singleton subtree is the leaf itself, no wrapping node
        return order[0] as i32;
    }

    let mut aabb = nodes[order[0]].aabb;
    for &index in &order[1..] {
        aabb = aabb.union(&nodes[index].aabb);
    }
    let axis = aabb.longest_axis();

    // nth_element-style partition at the median; only the two disjoint
    // halves matter, not their internal order
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        nodes[a].center[axis]
            .partial_cmp(&nodes[b].center[axis])
            .unwrap_or(Ordering::Equal)
    });

    let (lower, upper) = order.split_at_mut(mid);
    let left = build_range(nodes, lower, depth + 1, max_depth);
    let right = build_range(nodes, upper, depth + 1, max_depth);

    let index = nodes.len() as i32;
    nodes.push(BvhNode {
        aabb,
        center: aabb.center(),
        left,
        right,
        face_index: -1,
    });
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn leaf_at(face: usize, x: f64) -> BvhNode {
        let min = Point3::new(x, 0.0, 0.0);
        let max = Point3::new(x + 1.0, 1.0, 1.0);
        BvhNode::leaf(BoundingBox::new(min, max), face)
    }

    #[test]
    fn test_single_leaf() {
        let mut nodes = vec![leaf_at(0, 0.0)];
        let max_depth = build(&mut nodes, 1);

        assert_eq!(nodes.len(), 1);
        assert_eq!(max_depth, 1);
        assert!(nodes[0].is_leaf());
    }

    #[test]
    fn test_node_count_bound() {
        for count in [2usize, 3, 7, 16, 33] {
            let mut nodes: Vec<BvhNode> = (0..count).map(|i| leaf_at(i, i as f64 * 2.0)).collect();
            let max_depth = build(&mut nodes, count);

            assert_eq!(nodes.len(), 2 * count - 1);
            assert!(!nodes[nodes.len() - 1].is_leaf());
            assert!(max_depth >= 2);
            // Median split keeps the tree balanced
            assert!(max_depth <= (count as f64).log2().ceil() as usize + 1);
        }
    }

    #[test]
    fn test_internal_boxes_cover_children() {
        let count = 12;
        let mut nodes: Vec<BvhNode> = (0..count).map(|i| leaf_at(i, i as f64 * 3.0)).collect();
        build(&mut nodes, count);

        for node in nodes.iter().filter(|n| !n.is_leaf()) {
            let left = &nodes[node.left as usize];
            let right = &nodes[node.right as usize];
            let union = left.aabb.union(&right.aabb);

            assert_eq!(node.aabb.min, union.min);
            assert_eq!(node.aabb.max, union.max);
        }
    }

    #[test]
    fn test_equal_centers_still_partition() {
        // All centroids identical on every axis: the partition halves must
        // stay disjoint and exhaustive even though the tie order is arbitrary
        let count = 9;
        let mut nodes: Vec<BvhNode> = (0..count).map(|i| leaf_at(i, 0.0)).collect();
        let max_depth = build(&mut nodes, count);

        assert_eq!(nodes.len(), 2 * count - 1);
        assert!(max_depth <= (count as f64).log2().ceil() as usize + 1);
    }
}
