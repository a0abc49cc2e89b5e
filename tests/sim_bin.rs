use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "sim", "--", "1", "1"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run sim binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert_eq!(v["games"], 1);
    let shots = v["shots"].as_array().expect("shots array");
    assert_eq!(shots.len(), 1);
    let n = shots[0].as_u64().expect("shot count");
    assert!((17..=100).contains(&n));
    assert_eq!(v["mean"].as_f64(), Some(n as f64));
}
