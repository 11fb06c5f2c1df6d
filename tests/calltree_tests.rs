use evm_gas_profiler::calltree::{build_call_tree, CallTreeNode, TraceWarning};
use evm_gas_profiler::flamegraph::{with_opcode_leaves, MergeOptions};
use evm_gas_profiler::parser::{CallFrame, CallType, OpcodeRecord};
use evm_gas_profiler::utils::TraceError;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn frame(id: u64, parent: Option<u64>, depth: u64, self_gas: u64, cumulative: u64) -> CallFrame {
    CallFrame::new(id, parent, depth, CallType::Call, self_gas, cumulative)
}

fn sample_frames() -> Vec<CallFrame> {
    vec![
        frame(0, None, 0, 100, 1_000),
        frame(1, Some(0), 1, 150, 450),
        frame(2, Some(1), 2, 200, 200),
        frame(3, Some(1), 2, 100, 100),
        frame(4, Some(0), 1, 450, 450),
    ]
}

fn assert_cumulative_consistency(node: &CallTreeNode, is_root: bool) {
    if !is_root {
        assert_eq!(
            node.value,
            node.self_value.unwrap() + node.children_value(),
            "node {}",
            node.id
        );
    }
    for child in &node.children {
        assert_cumulative_consistency(child, false);
    }
}

fn assert_proportional(node: &CallTreeNode, exact: bool) {
    if !node.children.is_empty() {
        if exact {
            assert_eq!(node.children_value(), node.value, "node {}", node.id);
        } else {
            assert!(node.children_value() <= node.value, "node {}", node.id);
        }
    }
    for child in &node.children {
        assert_proportional(child, exact);
    }
}

#[test]
fn test_scenario_basic_tree() {
    let frames = vec![
        frame(0, None, 0, 100, 300),
        frame(1, Some(0), 1, 150, 150),
        frame(2, Some(0), 1, 50, 50),
    ];
    let tree = build_call_tree(&frames).unwrap();

    assert_eq!(tree.root.value, 300);
    let kids: Vec<(Option<u64>, u64)> = tree
        .root
        .children
        .iter()
        .map(|c| (c.frame_id(), c.value))
        .collect();
    assert_eq!(kids, vec![(Some(1), 150), (Some(2), 50)]);
    assert_eq!(
        tree.root.self_value.unwrap() + tree.root.children_value(),
        300
    );
}

#[test]
fn test_scenario_cycle_does_not_hang() {
    let frames = vec![frame(2, Some(3), 1, 10, 10), frame(3, Some(2), 1, 10, 10)];
    assert!(matches!(
        build_call_tree(&frames),
        Err(TraceError::CyclicTrace { .. })
    ));
}

#[test]
fn test_cycle_next_to_valid_root() {
    let mut frames = sample_frames();
    frames.push(frame(8, Some(9), 3, 1, 1));
    frames.push(frame(9, Some(8), 3, 1, 1));
    assert!(matches!(
        build_call_tree(&frames),
        Err(TraceError::CyclicTrace { .. })
    ));
}

#[test]
fn test_no_root_is_malformed() {
    let frames = vec![frame(1, Some(0), 1, 10, 10)];
    assert!(matches!(
        build_call_tree(&frames),
        Err(TraceError::MalformedTrace(_))
    ));
    assert!(matches!(
        build_call_tree(&[]),
        Err(TraceError::MalformedTrace(_))
    ));
}

#[test]
fn test_multiple_roots_pick_lowest_and_report_rest() {
    let mut frames = sample_frames();
    frames.push(frame(7, None, 0, 5, 5));
    let tree = build_call_tree(&frames).unwrap();

    assert_eq!(tree.root_frame_id(), 0);
    assert_eq!(tree.warnings, vec![TraceWarning::OrphanRoot { frame_id: 7 }]);
    assert!(!tree.contains(7));
}

#[test]
fn test_cumulative_consistency_and_root_total() {
    let tree = build_call_tree(&sample_frames()).unwrap();

    assert_cumulative_consistency(&tree.root, true);
    assert_proportional(&tree.root, false);
    assert_eq!(tree.total_gas(), 1_000);
    assert!(tree.warnings.is_empty());
}

#[test]
fn test_build_is_deterministic() {
    let mut shuffled = sample_frames();
    shuffled.reverse();

    let a = build_call_tree(&sample_frames()).unwrap();
    let b = build_call_tree(&sample_frames()).unwrap();
    let c = build_call_tree(&shuffled).unwrap();

    assert_eq!(a.root, b.root);
    assert_eq!(a.root, c.root);
}

#[test]
fn test_descendants_of() {
    let tree = build_call_tree(&sample_frames()).unwrap();

    let ids: Vec<u64> = tree.descendants_of(1).iter().map(|f| f.frame_id).collect();
    assert_eq!(ids, vec![2, 3]);

    let all: Vec<u64> = tree.descendants_of(0).iter().map(|f| f.frame_id).collect();
    assert_eq!(all, vec![1, 2, 3, 4]);

    assert!(tree.descendants_of(4).is_empty());
    assert!(tree.descendants_of(99).is_empty());
}

#[test]
fn test_path_to() {
    let tree = build_call_tree(&sample_frames()).unwrap();

    let ids: Vec<u64> = tree.path_to(3).iter().map(|f| f.frame_id).collect();
    assert_eq!(ids, vec![0, 1, 3]);

    let root_only: Vec<u64> = tree.path_to(0).iter().map(|f| f.frame_id).collect();
    assert_eq!(root_only, vec![0]);

    assert!(tree.path_to(42).is_empty());
}

#[test]
fn test_scenario_opcode_merge() {
    let frames = vec![frame(0, None, 0, 30, 30)];
    let tree = build_call_tree(&frames).unwrap();
    let opcodes = HashMap::from([(
        0u64,
        vec![
            OpcodeRecord::new("0", "SLOAD", 20, 1),
            OpcodeRecord::new("0", "ADD", 5, 1),
        ],
    )]);

    let merged = with_opcode_leaves(&tree.root, &opcodes, &MergeOptions::default()).unwrap();
    let leaves: Vec<(&str, u64)> = merged
        .root
        .children
        .iter()
        .map(|c| (c.label.as_str(), c.value))
        .collect();

    assert_eq!(leaves, vec![("SLOAD", 20), ("ADD", 5), ("Uncategorized", 5)]);
    assert_eq!(merged.root.children_value(), 30);
}

#[test]
fn test_merged_tree_is_exactly_proportional() {
    let tree = build_call_tree(&sample_frames()).unwrap();
    let opcodes = HashMap::from([
        (0u64, vec![OpcodeRecord::new("0", "CALL", 60, 2)]),
        (1u64, vec![OpcodeRecord::new("1", "SSTORE", 150, 1)]),
        (2u64, vec![OpcodeRecord::new("2", "PUSH1", 30, 10)]),
    ]);

    let merged = with_opcode_leaves(&tree.root, &opcodes, &MergeOptions::default()).unwrap();

    // Root carries 100 self gas plus 450 + 450 of children
    assert_proportional(&merged.root, true);
    assert_eq!(merged.root.value, 1_000);

    // Frame 2 has opcode data, frame 3 has none and no children
    let f2 = merged.root.find_frame(2).unwrap();
    assert_eq!(f2.children.len(), 2);
    assert!(merged.root.find_frame(3).unwrap().children.is_empty());
}

#[test]
fn test_intrinsic_gas_root_stays_proportional() {
    // 21000 intrinsic gas sits on the root outside any frame
    let frames = vec![frame(0, None, 0, 100, 21_150), frame(1, Some(0), 1, 50, 50)];
    let tree = build_call_tree(&frames).unwrap();
    assert!(tree.warnings.is_empty());

    let merged = with_opcode_leaves(&tree.root, &HashMap::new(), &MergeOptions::default()).unwrap();
    let leaves: Vec<(&str, u64)> = merged
        .root
        .children
        .iter()
        .map(|c| (c.label.as_str(), c.value))
        .collect();

    assert_eq!(leaves, vec![("CALL", 50), ("Uncategorized", 21_100)]);
    assert_proportional(&merged.root, true);

    let opcodes = HashMap::from([(0u64, vec![OpcodeRecord::new("0", "SSTORE", 80, 1)])]);
    let merged = with_opcode_leaves(&tree.root, &opcodes, &MergeOptions::default()).unwrap();
    assert_eq!(merged.root.children_value(), 21_150);
    assert_eq!(merged.root.children[1].value, 80);
}

#[test]
fn test_mismatched_frame_is_filled_after_merge() {
    // Frame 1 reports more cumulative gas than its self gas and children explain
    let frames = vec![
        frame(0, None, 0, 10, 110),
        frame(1, Some(0), 1, 40, 100),
        frame(2, Some(1), 2, 20, 20),
    ];
    let tree = build_call_tree(&frames).unwrap();
    assert_eq!(tree.warnings.len(), 1);

    let opcodes = HashMap::from([(1u64, vec![OpcodeRecord::new("1", "MSTORE", 40, 4)])]);
    let merged = with_opcode_leaves(&tree.root, &opcodes, &MergeOptions::default()).unwrap();

    assert_proportional(&merged.root, true);
    let f1 = merged.root.find_frame(1).unwrap();
    let uncategorized = f1.children.last().unwrap();
    assert_eq!((uncategorized.label.as_str(), uncategorized.value), ("Uncategorized", 40));
}

#[test]
fn test_error_flag_propagates() {
    let mut frames = sample_frames();
    frames[3].has_error = true;
    let tree = build_call_tree(&frames).unwrap();

    assert!(tree.root.find_frame(3).unwrap().has_error);
    assert!(!tree.root.find_frame(2).unwrap().has_error);
}
