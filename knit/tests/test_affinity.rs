mod common;

use common::{knit, stderr, stdout, FakeHost};

#[test]
fn test_irqaff_json_effective() {
    let host = FakeHost::new();
    host.irq(0, "0-1", "0", "timer");
    host.irq(16, "0-1", "1", "ehci_hcd:usb1");
    host.irq(24, "0", "0", "nvme0q0");

    let out = host.knit(&["-C", "1", "-e", "-J", "irqaff"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("Invalid JSON");
    assert_eq!(parsed, serde_json::json!([{"irq": 16, "name": "ehci_hcd:usb1", "cpus": [1]}]));
}

#[test]
fn test_irqaff_text_configured() {
    let host = FakeHost::new();
    host.irq(16, "0-1", "1", "ehci_hcd:usb1");
    host.irq(24, "0", "0", "nvme0q0");

    let out = host.knit(&["irqaff", "-C", "1"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("IRQ  16"));
    assert!(text.contains("can run on 0-1"));
}

#[test]
fn test_cpuaff_uses_online_cpus_by_default() {
    let host = FakeHost::new();
    host.thread(1, 1, "init", "0-1");
    host.thread(300, 300, "rt-app", "1");
    host.thread(300, 301, "rt-worker", "1");
    host.thread(400, 400, "offline-only", "5");

    let out = host.knit(&["-J", "cpuaff"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("Invalid JSON");
    let tids: Vec<u64> =
        parsed.as_array().unwrap().iter().map(|t| t["tid"].as_u64().unwrap()).collect();
    assert_eq!(tids, vec![1, 300, 301]);
}

#[test]
fn test_invalid_cpulist_is_usage_error() {
    let host = FakeHost::new();
    let out = host.knit(&["-C", "1-x", "cpuaff"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("invalid cpu"));
}

#[test]
fn test_missing_procfs() {
    let out = knit(&["-P", "/nonexistent/proc", "-C", "0", "cpuaff"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("procfs root not found"));
}

#[test]
fn test_no_subcommand_prints_usage() {
    let out = knit(&[]);

    assert!(out.status.success());
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("Usage"));
}
