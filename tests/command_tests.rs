use evm_gas_profiler::commands::{build_profile, execute_profile, ProfileArgs, ProfileOptions};
use evm_gas_profiler::flamegraph::MergeOptions;
use evm_gas_profiler::output::read_profile;
use evm_gas_profiler::parser::{parse_snapshot, read_snapshot};
use serde_json::json;
use std::fs;

fn snapshot_json() -> serde_json::Value {
    json!({
        "transactionHash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060",
        "blockNumber": 15000000,
        "chainId": 1,
        "receiptGasUsed": 2000,
        "frames": [
            {"frameId": 0, "parentFrameId": null, "depth": 0, "callType": "CREATE",
             "targetAddress": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984",
             "gasSelf": 100, "gasCumulative": 300, "gasRefund": 900},
            {"frameId": 1, "parentFrameId": 0, "depth": 1, "callType": "STATICCALL",
             "gasSelf": 150, "gasCumulative": 150, "gasRefund": 100},
            {"frameId": 2, "parentFrameId": 0, "depth": 1, "callType": "CALL",
             "gasSelf": 50, "gasCumulative": 50, "hasError": true}
        ],
        "opcodes": [
            {"scopeKey": 0, "opcode": "SSTORE", "gas": 60, "count": 1},
            {"scopeKey": 1, "opcode": "SLOAD", "gas": 100, "count": 1},
            {"scopeKey": 1, "opcode": "PUSH1", "gas": 30, "count": 10},
            {"scopeKey": 2, "opcode": "LOG1", "gas": 50, "count": 1}
        ]
    })
}

#[test]
fn test_build_profile_without_leaves() {
    let snapshot = parse_snapshot(&snapshot_json()).unwrap();
    let (profile, stacks) = build_profile(&snapshot, &ProfileOptions::default()).unwrap();

    assert_eq!(profile.total_gas, 300);
    assert_eq!(profile.call_tree.children.len(), 2);
    assert_eq!(profile.opcodes[0].opcode, "SLOAD");
    assert_eq!(profile.hot_frames[0].frame_id, 1);
    assert!(profile.warnings.is_empty());

    // Mainnet block after London: cap is receipt / 4
    assert!(profile.refund.is_post_london);
    assert_eq!(profile.refund.cap, 500);
    assert_eq!(profile.refund.effective, 500);
    assert!(profile.refund.is_capped);

    assert_eq!(stacks.iter().map(|s| s.weight).sum::<u64>(), 300);
}

#[test]
fn test_build_profile_with_leaves_and_code_deposit() {
    let snapshot = parse_snapshot(&snapshot_json()).unwrap();
    let options = ProfileOptions {
        opcode_leaves: true,
        merge: MergeOptions::new().with_code_deposit_gas(1_000),
        ..ProfileOptions::default()
    };
    let (profile, stacks) = build_profile(&snapshot, &options).unwrap();

    assert_eq!(profile.total_gas, 1_300);
    assert_eq!(profile.call_tree.children_value(), 1_300);
    let labels: Vec<&str> = profile
        .call_tree
        .children
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["STATICCALL", "CALL", "SSTORE", "Uncategorized", "Code Deposit"]
    );
    assert!(stacks.iter().any(|s| s.stack.ends_with(";Code Deposit") && s.weight == 1_000));
}

#[test]
fn test_build_profile_reports_inconsistent_opcodes() {
    let mut raw = snapshot_json();
    raw["opcodes"][3]["gas"] = json!(80);
    let snapshot = parse_snapshot(&raw).unwrap();
    let options = ProfileOptions {
        opcode_leaves: true,
        ..ProfileOptions::default()
    };

    assert!(build_profile(&snapshot, &options).is_err());

    let lenient = ProfileOptions {
        opcode_leaves: true,
        merge: MergeOptions::new().with_tolerance(50),
        ..ProfileOptions::default()
    };
    let (profile, _) = build_profile(&snapshot, &lenient).unwrap();
    assert_eq!(profile.warnings.len(), 1);
}

#[test]
fn test_execute_profile_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("snapshot.json");
    let output = dir.path().join("out/profile.json");
    let stacks = dir.path().join("out/stacks.txt");
    fs::write(&input, serde_json::to_string(&snapshot_json()).unwrap()).unwrap();

    let args = ProfileArgs {
        input: input.clone(),
        output_json: output.clone(),
        output_stacks: Some(stacks.clone()),
        opcode_leaves: true,
        ..Default::default()
    };
    execute_profile(args).unwrap();

    let profile = read_profile(&output).unwrap();
    assert_eq!(profile.total_gas, 300);
    assert_eq!(read_snapshot(&input).unwrap().frames.len(), 3);

    let text = fs::read_to_string(&stacks).unwrap();
    assert!(text.lines().count() >= 3);
    assert!(text.contains("CREATE 0x1f98…f984;STATICCALL;SLOAD 100"));
}
