//! Build a rooted call tree from flat call-frame records.
//!
//! Frames link to their parent by id only. The builder indexes them,
//! rejects parent cycles, picks the root and emits the nested tree once,
//! so no node ever holds a reference back to its parent.

use super::node::CallTreeNode;
use super::warning::TraceWarning;
use crate::parser::schema::CallFrame;
use crate::utils::error::TraceError;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// A built call tree plus the frame index it was built from
#[derive(Debug, Clone)]
pub struct CallTree {
    /// Root node; value is the transaction's total gas
    pub root: CallTreeNode,

    /// Anomalies found while building
    pub warnings: Vec<TraceWarning>,

    frames: BTreeMap<u64, CallFrame>,
    children: BTreeMap<u64, Vec<u64>>,
    reachable: HashSet<u64>,
    root_frame_id: u64,
    height: usize,
}

/// Build a call tree from a transaction's frames
///
/// **Public** - main entry point for tree building
///
/// # Algorithm
/// 1. Index frames by id and build the parent -> children adjacency
/// 2. Reject parent-pointer cycles
/// 3. Pick the root (lowest id without a parent), report other parentless frames
/// 4. Walk from the root and emit nodes, children ascending by frame id
/// 5. Report every frame the walk left out
///
/// # Errors
/// * `TraceError::MalformedTrace` - no parentless frame, or duplicate frame ids
/// * `TraceError::CyclicTrace` - a frame is its own ancestor
pub fn build_call_tree(frames: &[CallFrame]) -> Result<CallTree, TraceError> {
    debug!("Building call tree from {} frames", frames.len());

    let mut index: BTreeMap<u64, CallFrame> = BTreeMap::new();
    for frame in frames {
        if index.insert(frame.frame_id, frame.clone()).is_some() {
            return Err(TraceError::MalformedTrace(format!(
                "duplicate frame id {}",
                frame.frame_id
            )));
        }
    }

    check_parent_cycles(&index)?;

    let mut warnings = Vec::new();
    let mut children: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    let mut roots = Vec::new();
    let mut detached_heads = Vec::new();

    // BTreeMap iteration keeps every child list ascending by frame id
    for frame in index.values() {
        match frame.parent_frame_id {
            Some(parent) if index.contains_key(&parent) => {
                children.entry(parent).or_default().push(frame.frame_id);
            }
            Some(parent) => {
                detached_heads.push(frame.frame_id);
                warnings.push(TraceWarning::UnreachableFrame {
                    frame_id: frame.frame_id,
                    parent_frame_id: parent,
                });
            }
            None => roots.push(frame.frame_id),
        }
    }

    let Some((&root_frame_id, orphans)) = roots.split_first() else {
        return Err(TraceError::MalformedTrace(
            "no frame without a parent".to_string(),
        ));
    };

    warnings.extend(
        orphans
            .iter()
            .map(|&frame_id| TraceWarning::OrphanRoot { frame_id }),
    );
    detached_heads.extend_from_slice(orphans);

    // Preorder walk; a revisit can only come from corrupt adjacency
    let mut order = Vec::with_capacity(index.len());
    let mut reachable = HashSet::with_capacity(index.len());
    let mut height = 0usize;
    let mut stack = vec![(root_frame_id, 1usize)];

    while let Some((id, level)) = stack.pop() {
        if !reachable.insert(id) {
            return Err(TraceError::CyclicTrace { frame_id: id });
        }
        order.push(id);
        height = height.max(level);

        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev().map(|&k| (k, level + 1)));
        }
    }

    warnings.extend(detached_frames(&children, &detached_heads));

    if let Some(root) = index.get(&root_frame_id) {
        if root.depth != 0 {
            warnings.push(TraceWarning::DepthMismatch {
                frame_id: root_frame_id,
                expected: 0,
                actual: root.depth,
            });
        }
    }

    // Children precede parents in reverse preorder
    let mut built: HashMap<u64, CallTreeNode> = HashMap::with_capacity(order.len());
    for &id in order.iter().rev() {
        let Some(frame) = index.get(&id) else {
            continue;
        };

        let kid_ids = children.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        let mut child_gas = 0u64;

        for kid in kid_ids.iter().filter_map(|k| index.get(k)) {
            child_gas = child_gas.saturating_add(kid.gas_cumulative);
            let expected = frame.depth + 1;
            if kid.depth != expected {
                warnings.push(TraceWarning::DepthMismatch {
                    frame_id: kid.frame_id,
                    expected,
                    actual: kid.depth,
                });
            }
        }

        // The root may also carry gas spent outside any frame (intrinsic cost)
        let expected = frame.gas_self.saturating_add(child_gas);
        let is_root = id == root_frame_id;
        if frame.gas_cumulative != expected && !(is_root && frame.gas_cumulative > expected) {
            warnings.push(TraceWarning::CumulativeMismatch {
                frame_id: id,
                expected,
                actual: frame.gas_cumulative,
            });
        }

        let mut node = CallTreeNode::from_frame(frame);
        node.children = kid_ids.iter().filter_map(|k| built.remove(k)).collect();
        built.insert(id, node);
    }

    let root = built.remove(&root_frame_id).ok_or_else(|| {
        TraceError::MalformedTrace(format!("root frame {} was not emitted", root_frame_id))
    })?;

    for warning in &warnings {
        warn!("{}", warning);
    }

    debug!(
        "Built call tree: {} reachable frames, height {}, {} warnings",
        order.len(),
        height,
        warnings.len()
    );

    Ok(CallTree {
        root,
        warnings,
        frames: index,
        children,
        reachable,
        root_frame_id,
        height,
    })
}

/// Descendants of frames that are already reported as cut off, ascending by id
///
/// **Private** - the heads themselves carry their own warning
fn detached_frames(children: &BTreeMap<u64, Vec<u64>>, heads: &[u64]) -> Vec<TraceWarning> {
    let mut detached: Vec<(u64, u64)> = Vec::new();

    for &head in heads {
        let mut stack: Vec<u64> = children.get(&head).cloned().unwrap_or_default();
        while let Some(id) = stack.pop() {
            detached.push((id, head));
            stack.extend(children.get(&id).into_iter().flatten());
        }
    }

    detached.sort_unstable();
    detached
        .into_iter()
        .map(|(frame_id, subtree_root)| TraceWarning::DetachedFrame {
            frame_id,
            subtree_root,
        })
        .collect()
}

/// Fail if following parent links from any frame ever revisits a frame
///
/// **Private** - each chain is walked at most once thanks to `cleared`
fn check_parent_cycles(index: &BTreeMap<u64, CallFrame>) -> Result<(), TraceError> {
    let mut cleared: HashSet<u64> = HashSet::with_capacity(index.len());

    for &start in index.keys() {
        let mut path: HashSet<u64> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if cleared.contains(&id) {
                break;
            }
            if !path.insert(id) {
                return Err(TraceError::CyclicTrace { frame_id: id });
            }
            current = index.get(&id).and_then(|f| f.parent_frame_id);
        }

        cleared.extend(path);
    }

    Ok(())
}

impl CallTree {
    pub fn root_frame_id(&self) -> u64 {
        self.root_frame_id
    }

    /// Total gas of the transaction as seen by the root frame
    pub fn total_gas(&self) -> u64 {
        self.root.value
    }

    /// Number of frame levels below and including the root
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn frame(&self, frame_id: u64) -> Option<&CallFrame> {
        self.frames.get(&frame_id)
    }

    /// Frames reachable from the root, ascending by id
    pub fn frames(&self) -> impl Iterator<Item = &CallFrame> {
        self.frames
            .values()
            .filter(move |f| self.reachable.contains(&f.frame_id))
    }

    pub fn contains(&self, frame_id: u64) -> bool {
        self.reachable.contains(&frame_id)
    }

    /// All frames below `frame_id`, ascending by id
    ///
    /// The target itself is not included. Frames outside the tree yield an
    /// empty list.
    pub fn descendants_of(&self, frame_id: u64) -> Vec<&CallFrame> {
        if !self.contains(frame_id) {
            return Vec::new();
        }

        let mut visited: HashSet<u64> = HashSet::new();
        visited.insert(frame_id);
        let mut queue: VecDeque<u64> = VecDeque::from([frame_id]);
        let mut found = Vec::new();

        while let Some(id) = queue.pop_front() {
            for &kid in self.children.get(&id).into_iter().flatten() {
                if visited.insert(kid) {
                    queue.push_back(kid);
                    if let Some(frame) = self.frames.get(&kid) {
                        found.push(frame);
                    }
                }
            }
        }

        found.sort_by_key(|f| f.frame_id);
        found
    }

    /// Frames from the root down to `frame_id`, both included
    ///
    /// Walks parent links, never more steps than the tree is high.
    /// Frames outside the tree yield an empty list.
    pub fn path_to(&self, frame_id: u64) -> Vec<&CallFrame> {
        if !self.contains(frame_id) {
            return Vec::new();
        }

        let mut path = Vec::with_capacity(self.height);
        let mut current = self.frames.get(&frame_id);

        while let Some(frame) = current {
            if path.len() >= self.height {
                warn!("Parent walk from frame {} exceeded tree height", frame_id);
                break;
            }
            path.push(frame);
            current = frame.parent_frame_id.and_then(|p| self.frames.get(&p));
        }

        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::CallType;

    fn frame(
        id: u64,
        parent: Option<u64>,
        depth: u64,
        self_gas: u64,
        cumulative: u64,
    ) -> CallFrame {
        CallFrame::new(id, parent, depth, CallType::Call, self_gas, cumulative)
    }

    #[test]
    fn test_children_sorted_by_frame_id() {
        let frames = vec![
            frame(0, None, 0, 10, 40),
            frame(9, Some(0), 1, 10, 10),
            frame(3, Some(0), 1, 20, 20),
        ];
        let tree = build_call_tree(&frames).unwrap();
        let ids: Vec<Option<u64>> = tree.root.children.iter().map(|c| c.frame_id()).collect();
        assert_eq!(ids, vec![Some(3), Some(9)]);
        assert!(tree.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_malformed() {
        let frames = vec![frame(0, None, 0, 1, 1), frame(0, None, 0, 1, 1)];
        assert!(matches!(
            build_call_tree(&frames),
            Err(TraceError::MalformedTrace(_))
        ));
    }

    #[test]
    fn test_self_parent_is_cyclic() {
        let frames = vec![frame(0, None, 0, 1, 1), frame(1, Some(1), 1, 1, 1)];
        assert_eq!(
            build_call_tree(&frames).unwrap_err(),
            TraceError::CyclicTrace { frame_id: 1 }
        );
    }

    #[test]
    fn test_missing_parent_is_reported() {
        let frames = vec![frame(0, None, 0, 5, 5), frame(4, Some(77), 1, 1, 1)];
        let tree = build_call_tree(&frames).unwrap();
        assert_eq!(
            tree.warnings,
            vec![TraceWarning::UnreachableFrame {
                frame_id: 4,
                parent_frame_id: 77
            }]
        );
        assert!(!tree.contains(4));
    }

    #[test]
    fn test_frames_below_orphans_are_reported() {
        let frames = vec![
            frame(0, None, 0, 5, 5),
            frame(4, Some(77), 1, 2, 3),
            frame(5, Some(4), 2, 1, 1),
            frame(7, None, 0, 3, 5),
            frame(8, Some(7), 1, 1, 2),
            frame(9, Some(8), 2, 1, 1),
        ];
        let tree = build_call_tree(&frames).unwrap();

        for (frame_id, subtree_root) in [(5, 4), (8, 7), (9, 7)] {
            assert!(
                tree.warnings.contains(&TraceWarning::DetachedFrame {
                    frame_id,
                    subtree_root
                }),
                "frame {} not reported",
                frame_id
            );
        }
        assert_eq!(tree.warnings.len(), 5);
        assert_eq!(tree.frames().count(), 1);
    }

    #[test]
    fn test_lookups_ignore_detached_frames() {
        let frames = vec![
            frame(0, None, 0, 5, 5),
            frame(7, None, 0, 3, 4),
            frame(8, Some(7), 1, 1, 1),
        ];
        let tree = build_call_tree(&frames).unwrap();

        assert!(tree.descendants_of(7).is_empty());
        assert!(tree.path_to(7).is_empty());
        assert!(tree.path_to(8).is_empty());
        assert!(tree.frame(8).is_some());
    }

    #[test]
    fn test_depth_and_cumulative_mismatch_warnings() {
        let frames = vec![
            frame(0, None, 0, 10, 30),
            frame(1, Some(0), 2, 15, 20),
        ];
        let tree = build_call_tree(&frames).unwrap();

        assert!(tree.warnings.contains(&TraceWarning::DepthMismatch {
            frame_id: 1,
            expected: 1,
            actual: 2
        }));
        assert!(tree.warnings.contains(&TraceWarning::CumulativeMismatch {
            frame_id: 1,
            expected: 15,
            actual: 20
        }));
    }

    #[test]
    fn test_root_may_exceed_children_sum() {
        // 21000 intrinsic gas is charged to the root only
        let frames = vec![frame(0, None, 0, 100, 21_150), frame(1, Some(0), 1, 50, 50)];
        let tree = build_call_tree(&frames).unwrap();
        assert!(tree.warnings.is_empty());
        assert_eq!(tree.total_gas(), 21_150);
    }

    #[test]
    fn test_height() {
        let frames = vec![
            frame(0, None, 0, 1, 3),
            frame(1, Some(0), 1, 1, 2),
            frame(2, Some(1), 2, 1, 1),
        ];
        assert_eq!(build_call_tree(&frames).unwrap().height(), 3);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let n = 20_000u64;
        let frames: Vec<CallFrame> = (0..n)
            .map(|i| {
                let parent = if i == 0 { None } else { Some(i - 1) };
                frame(i, parent, i, 1, n - i)
            })
            .collect();

        let tree = build_call_tree(&frames).unwrap();
        assert_eq!(tree.height(), n as usize);
        assert_eq!(tree.path_to(n - 1).len(), n as usize);
        // Unwind by hand so dropping the chain stays shallow
        let mut node = tree.root;
        while let Some(child) = node.children.pop() {
            node = child;
        }
    }
}
