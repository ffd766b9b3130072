mod common;

use common::{stderr, stdout, FakeHost};

#[test]
fn test_irqwatch_text_summary() {
    let host = FakeHost::new();
    let out = host.knit(&["irqwatch", "-T", "2", "-W", "10ms"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("\nIRQ summary on cpus 0-1 after "), "got {text:?}");
    // counters never move in a static file: nothing but the header
    assert_eq!(text.trim().lines().count(), 1);
}

#[test]
fn test_irqwatch_zero_times_json() {
    let host = FakeHost::new();
    let out = host.knit(&["-J", "irqwatch", "-T", "0"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert_eq!(text.lines().count(), 1);
    let parsed: serde_json::Value = serde_json::from_str(&text).expect("Invalid JSON");
    assert!(parsed["elapsed"].is_string());
    assert_eq!(parsed["counters"], serde_json::json!({}));
}

#[test]
fn test_irqwatch_per_tick_json() {
    let host = FakeHost::new();
    let out = host.knit(&["-J", "-C", "1", "irqwatch", "-T", "3", "-W", "5ms", "-v", "2"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let records: Vec<serde_json::Value> = stdout(&out)
        .lines()
        .map(|l| serde_json::from_str(l).expect("Invalid JSON line"))
        .collect();
    assert_eq!(records.len(), 4, "three ticks and a summary");
    for tick in &records[..3] {
        assert!(tick["timestamp"].is_string());
    }
    assert!(records[3]["elapsed"].is_string());
}

#[test]
fn test_irqwatch_silent() {
    let host = FakeHost::new();
    let out = host.knit(&["irqwatch", "-T", "1", "-W", "1ms", "-v", "0"]);

    assert!(out.status.success());
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_irqwatch_negative_verbosity_is_silent() {
    let host = FakeHost::new();
    let out = host.knit(&["irqwatch", "-T", "1", "-W", "1ms", "-v", "-1"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_irqwatch_out_of_range_cpu_is_usage_error() {
    let host = FakeHost::new();
    for cpulist in ["4294967295", "0-4294967295"] {
        let out = host.knit(&["-C", cpulist, "irqwatch", "-T", "0"]);

        assert_eq!(out.status.code(), Some(2), "cpulist {cpulist}");
        assert!(stderr(&out).contains("out of range"), "stderr: {}", stderr(&out));
    }
}

#[test]
fn test_irqwatch_invalid_period_is_usage_error() {
    let host = FakeHost::new();
    let out = host.knit(&["irqwatch", "-W", "soon"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("invalid period"));
}

#[test]
fn test_irqwatch_missing_interrupts() {
    let host = FakeHost::new();
    std::fs::remove_file(host.procfs().join("interrupts")).unwrap();
    let out = host.knit(&["irqwatch", "-T", "1"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("interrupts"));
}
